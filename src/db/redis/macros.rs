/// Read-through caching for provider lookups.
///
/// Returns the cached value when present. Otherwise awaits `$lookup`, queues
/// the result for a background write under the key's TTL and returns it.
/// A failed cache read is logged and treated as a miss, so a Redis outage only
/// costs latency. Lookup errors are returned as-is and never cached.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::TvBasic(id), self.inner.tv_basic(id))
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $lookup:expr) => {{
        let key = $key;
        match $cache.get(&key).await {
            Ok(Some(hit)) => {
                tracing::trace!(key = %key, "Cache hit");
                Ok(hit)
            }
            read => {
                if let Err(e) = read {
                    tracing::warn!(key = %key, error = %e, "Cache read failed");
                }
                let fresh = $lookup.await?;
                $cache.set_in_background(&key, &fresh);
                Ok(fresh)
            }
        }
    }};
}
