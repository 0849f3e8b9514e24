use std::{fmt::Display, future::Future};

use futures::{stream, StreamExt};

/// Number of lookups allowed in flight at once
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

/// Why a single lookup produced no value
#[derive(Debug, Clone, PartialEq)]
pub enum FetchFailure<E> {
    /// The lookup returned an error
    Lookup(E),
    /// The lookup task panicked or was cancelled
    Aborted(String),
}

impl<E: Display> Display for FetchFailure<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Lookup(e) => write!(f, "{}", e),
            FetchFailure::Aborted(reason) => write!(f, "lookup task aborted: {}", reason),
        }
    }
}

/// Result of one lookup in a fan-out batch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<R, E> {
    Fetched(R),
    Failed(FetchFailure<E>),
}

impl<R, E> FetchOutcome<R, E> {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    /// The lookup error, if the lookup itself failed
    pub fn lookup_error(&self) -> Option<&E> {
        match self {
            FetchOutcome::Failed(FetchFailure::Lookup(e)) => Some(e),
            _ => None,
        }
    }
}

/// Runs independent lookups with bounded parallelism
///
/// Results come back in input order no matter which lookup finishes first,
/// and a failed lookup never aborts the rest of the batch.
#[derive(Debug, Clone, Copy)]
pub struct FetchCoordinator {
    width: usize,
}

impl Default for FetchCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_CONCURRENCY)
    }
}

impl FetchCoordinator {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Runs `lookup` for every item and returns one outcome per item, in input order
    ///
    /// Each lookup runs on its own tokio task; a new task is only spawned once
    /// one of the `width` in-flight lookups has finished.
    pub async fn run<I, R, E, F, Fut>(&self, items: Vec<I>, lookup: F) -> Vec<FetchOutcome<R, E>>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
    {
        let total = items.len();
        let mut slots: Vec<Option<FetchOutcome<R, E>>> = (0..total).map(|_| None).collect();

        let mut completed = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let task = tokio::spawn(lookup(item));
                async move {
                    let outcome = match task.await {
                        Ok(Ok(value)) => FetchOutcome::Fetched(value),
                        Ok(Err(e)) => FetchOutcome::Failed(FetchFailure::Lookup(e)),
                        Err(join_error) => {
                            tracing::error!(index, error = %join_error, "Lookup task join error");
                            FetchOutcome::Failed(FetchFailure::Aborted(join_error.to_string()))
                        }
                    };
                    (index, outcome)
                }
            })
            .buffer_unordered(self.width);

        while let Some((index, outcome)) = completed.next().await {
            slots[index] = Some(outcome);
        }

        let outcomes: Vec<FetchOutcome<R, E>> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    FetchOutcome::Failed(FetchFailure::Aborted("lookup never completed".to_string()))
                })
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        tracing::debug!(total, failed, width = self.width, "Fan-out completed");

        outcomes
    }

    /// Like [`run`](Self::run), but replaces every failed lookup with `default`
    pub async fn fan_out<I, R, E, F, Fut>(&self, items: Vec<I>, lookup: F, default: R) -> Vec<R>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Clone + Send + 'static,
        E: Display + Send + 'static,
    {
        absorb_failures(self.run(items, lookup).await, default)
    }
}

/// Unwraps successful outcomes and substitutes `default` for failures
pub fn absorb_failures<R: Clone, E: Display>(outcomes: Vec<FetchOutcome<R, E>>, default: R) -> Vec<R> {
    outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| match outcome {
            FetchOutcome::Fetched(value) => value,
            FetchOutcome::Failed(failure) => {
                tracing::warn!(index, error = %failure, "Lookup failed, using default");
                default.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let coordinator = FetchCoordinator::new(3);
        // Later items finish first
        let items: Vec<u64> = (1..=6).collect();

        let results = coordinator
            .fan_out(
                items,
                |n| async move {
                    tokio::time::sleep(Duration::from_millis(60 - n * 10)).await;
                    Ok::<_, String>(n * 100)
                },
                0,
            )
            .await;

        assert_eq!(results, vec![100, 200, 300, 400, 500, 600]);
    }

    #[tokio::test]
    async fn test_failures_become_default() {
        let coordinator = FetchCoordinator::default();
        let items = vec![1, 2, 3, 4];

        let results = coordinator
            .fan_out(
                items,
                |n| async move {
                    if n % 2 == 0 {
                        Err(format!("lookup {} failed", n))
                    } else {
                        Ok(vec![n])
                    }
                },
                Vec::new(),
            )
            .await;

        assert_eq!(results, vec![vec![1], vec![], vec![3], vec![]]);
    }

    #[tokio::test]
    async fn test_run_reports_outcomes() {
        let coordinator = FetchCoordinator::new(2);

        let outcomes = coordinator
            .run(vec!["ok", "bad"], |s| async move {
                if s == "ok" {
                    Ok(s.len())
                } else {
                    Err("boom".to_string())
                }
            })
            .await;

        assert_eq!(outcomes[0], FetchOutcome::Fetched(2));
        assert!(outcomes[1].is_failed());
        assert_eq!(outcomes[1].lookup_error().map(String::as_str), Some("boom"));
    }

    #[tokio::test]
    async fn test_panicking_lookup_is_isolated() {
        let coordinator = FetchCoordinator::new(2);

        let outcomes = coordinator
            .run(vec![1, 2, 3], |n| async move {
                if n == 2 {
                    panic!("lookup exploded");
                }
                Ok::<_, String>(n)
            })
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], FetchOutcome::Fetched(1));
        assert!(matches!(
            outcomes[1],
            FetchOutcome::Failed(FetchFailure::Aborted(_))
        ));
        assert_eq!(outcomes[1].lookup_error(), None);
        assert_eq!(outcomes[2], FetchOutcome::Fetched(3));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let coordinator = FetchCoordinator::new(2);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = coordinator
            .fan_out(
                (0..10).collect::<Vec<usize>>(),
                |n| {
                    let in_flight = in_flight.clone();
                    let peak = peak.clone();
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, String>(n)
                    }
                },
                usize::MAX,
            )
            .await;

        assert_eq!(results, (0..10).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let coordinator = FetchCoordinator::default();
        let results = coordinator
            .fan_out(Vec::<u8>::new(), |n| async move { Ok::<_, String>(n) }, 0)
            .await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_width_is_at_least_one() {
        assert_eq!(FetchCoordinator::new(0).width(), 1);
        assert_eq!(FetchCoordinator::default().width(), DEFAULT_FETCH_CONCURRENCY);
    }
}
