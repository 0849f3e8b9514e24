use good_lp::{
    constraint::Constraint, default_solver, variable, Expression, ProblemVariables, Solution,
    SolverModel, Variable,
};
use thiserror::Error;

use crate::{
    config::StreamingConfig,
    models::{Platform, PlatformCombination, TitleProviders},
    services::availability::ProviderCatalogue,
};

/// Error types for the optimizer
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("Solver failed for {size}-platform combinations: {message}")]
    Solver { size: usize, message: String },
}

/// Coverage and cost of one platform subset
#[derive(Debug, Clone, PartialEq)]
struct Evaluation {
    /// Indices into the title list, in watchlist order
    covered: Vec<usize>,
    cost: f64,
}

/// Finds the best-value platform combination for each combination size
///
/// For every size `n` the chosen subset covers the most watchlist titles and,
/// among those, costs the least. Unpriced platforms cost nothing. Platforms are
/// considered in ascending provider id order and only a strictly better subset
/// replaces the current best, so full ties resolve to the lexicographically
/// smallest id list.
pub struct Optimizer<'a> {
    /// Platforms sorted by provider id
    platforms: Vec<&'a Platform>,
    titles: &'a [TitleProviders],
    /// For each title, indices into `platforms`
    offered_by: Vec<Vec<usize>>,
    max_combination_size: usize,
    exhaustive_limit: usize,
}

impl<'a> Optimizer<'a> {
    pub fn new(catalogue: &'a ProviderCatalogue, config: &StreamingConfig) -> Self {
        let mut platforms: Vec<&Platform> = catalogue.platforms.iter().collect();
        platforms.sort_by_key(|p| p.id);

        let offered_by = catalogue
            .titles
            .iter()
            .map(|title| {
                title
                    .provider_ids
                    .iter()
                    .filter_map(|id| platforms.binary_search_by_key(id, |p| p.id).ok())
                    .collect()
            })
            .collect();

        Self {
            platforms,
            titles: &catalogue.titles,
            offered_by,
            max_combination_size: config.max_combination_size,
            exhaustive_limit: config.exhaustive_limit,
        }
    }

    /// Best combination for every size from 1 up to the configured maximum
    pub fn optimize(&self) -> Result<Vec<PlatformCombination>, OptimizerError> {
        let max_n = self.max_combination_size.min(self.platforms.len());
        let exhaustive = self.platforms.len() <= self.exhaustive_limit;

        tracing::debug!(
            platforms = self.platforms.len(),
            titles = self.titles.len(),
            max_n,
            exhaustive,
            "Searching platform combinations"
        );

        let mut combinations = Vec::with_capacity(max_n);
        for n in 1..=max_n {
            let subset = if exhaustive {
                self.best_exhaustive(n)
            } else {
                self.best_by_solver(n)?
            };

            if let Some(subset) = subset {
                combinations.push(self.describe(n, &subset));
            }
        }

        Ok(combinations)
    }

    /// Coverage and cost of a subset of platform indices
    fn evaluate(&self, subset: &[usize]) -> Evaluation {
        let mut selected = vec![false; self.platforms.len()];
        for &p in subset {
            selected[p] = true;
        }

        let covered = self
            .offered_by
            .iter()
            .enumerate()
            .filter(|(_, providers)| providers.iter().any(|&p| selected[p]))
            .map(|(t, _)| t)
            .collect();

        let cost = subset
            .iter()
            .map(|&p| self.platforms[p].price.unwrap_or(0.0))
            .sum();

        Evaluation { covered, cost }
    }

    fn is_better(candidate: &Evaluation, best: &Evaluation) -> bool {
        candidate.covered.len() > best.covered.len()
            || (candidate.covered.len() == best.covered.len() && candidate.cost < best.cost)
    }

    /// Enumerates every `n`-subset in lexicographic order
    fn best_exhaustive(&self, n: usize) -> Option<Vec<usize>> {
        let mut best: Option<(Vec<usize>, Evaluation)> = None;

        for subset in Combinations::new(self.platforms.len(), n) {
            let evaluation = self.evaluate(&subset);
            let replace = match &best {
                Some((_, incumbent)) => Self::is_better(&evaluation, incumbent),
                None => true,
            };
            if replace {
                best = Some((subset, evaluation));
            }
        }

        best.map(|(subset, _)| subset)
    }

    /// Solves the maximum-coverage problem for `n` platforms as an integer program
    ///
    /// The first solve maximises covered titles; the second minimises cost
    /// while keeping that coverage.
    fn best_by_solver(&self, n: usize) -> Result<Option<Vec<usize>>, OptimizerError> {
        let coverage_subset = self.solve(n, None)?;
        let target = self.evaluate(&coverage_subset).covered.len();

        let subset = match self.solve(n, Some(target)) {
            Ok(cheapest) if self.evaluate(&cheapest).covered.len() >= target => cheapest,
            Ok(_) => coverage_subset,
            Err(e) => {
                tracing::warn!(error = %e, size = n, "Cost pass failed, keeping coverage solution");
                coverage_subset
            }
        };

        Ok(Some(subset))
    }

    /// Builds and solves one integer program; `min_coverage` switches to the cost objective
    fn solve(&self, n: usize, min_coverage: Option<usize>) -> Result<Vec<usize>, OptimizerError> {
        let mut vars = ProblemVariables::new();

        // Binary variable per platform (1 = subscribed) and per title (1 = covered)
        let platform_vars: Vec<Variable> = (0..self.platforms.len())
            .map(|_| vars.add(variable().binary()))
            .collect();
        let title_vars: Vec<Variable> = (0..self.titles.len())
            .map(|_| vars.add(variable().binary()))
            .collect();

        let mut constraints: Vec<Constraint> = Vec::new();

        // A title only counts as covered if one of its platforms is selected
        for (t, providers) in self.offered_by.iter().enumerate() {
            let mut offered = Expression::from(0);
            for &p in providers {
                offered = offered + platform_vars[p];
            }
            constraints.push(offered.geq(title_vars[t]));
        }

        // Exactly n platforms
        let mut size = Expression::from(0);
        for &var in &platform_vars {
            size = size + var;
        }
        constraints.push(size.clone().leq(n as f64));
        constraints.push(size.geq(n as f64));

        let mut coverage = Expression::from(0);
        for &var in &title_vars {
            coverage = coverage + var;
        }

        let mut cost = Expression::from(0);
        for (p, platform) in self.platforms.iter().enumerate() {
            cost = cost + platform.price.unwrap_or(0.0) * platform_vars[p];
        }

        let solution = match min_coverage {
            None => {
                let mut problem = vars.maximise(coverage).using(default_solver);
                for constraint in constraints {
                    problem = problem.with(constraint);
                }
                problem.solve()
            }
            Some(target) => {
                // Integral coverage, so relax by half a title for floating point slack
                constraints.push(coverage.geq(target as f64 - 0.5));
                let mut problem = vars.minimise(cost).using(default_solver);
                for constraint in constraints {
                    problem = problem.with(constraint);
                }
                problem.solve()
            }
        }
        .map_err(|e| OptimizerError::Solver {
            size: n,
            message: e.to_string(),
        })?;

        // Binary variables might be slightly off from 1.0 due to floating point
        Ok(platform_vars
            .iter()
            .enumerate()
            .filter(|(_, &var)| solution.value(var) > 0.5)
            .map(|(p, _)| p)
            .collect())
    }

    fn describe(&self, n: usize, subset: &[usize]) -> PlatformCombination {
        let evaluation = self.evaluate(subset);
        let total = self.titles.len();
        let coverage = evaluation.covered.len();

        PlatformCombination {
            num_platforms: n,
            platforms: subset.iter().map(|&p| self.platforms[p].clone()).collect(),
            coverage,
            total,
            percentage: coverage_percentage(coverage, total),
            monthly_cost: evaluation.cost,
            covered_titles: evaluation
                .covered
                .iter()
                .map(|&t| self.titles[t].title.clone())
                .collect(),
        }
    }
}

/// `covered / total` as a percentage rounded to one decimal place; 0 when there are no titles
pub fn coverage_percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    // One decimal, ties to the even digit (1/16 is 6.2)
    let percentage = covered as f64 / total as f64 * 100.0;
    (percentage * 10.0).round_ties_even() / 10.0
}

/// Lexicographic iterator over the `k`-subsets of `0..n`
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k == 0 || k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self.indices.clone();
        let k = self.indices.len();

        // Rightmost index that can still move forward
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(id: i64, name: &str, price: Option<f64>) -> Platform {
        Platform {
            id,
            name: name.to_string(),
            logo_path: None,
            price,
        }
    }

    fn title(key: &str, providers: &[i64]) -> TitleProviders {
        TitleProviders {
            key: key.to_string(),
            title: key.to_uppercase(),
            provider_ids: providers.to_vec(),
        }
    }

    fn ids(combination: &PlatformCombination) -> Vec<i64> {
        combination.platforms.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_combinations_enumerates_lexicographically() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(5, 3).count(), 10);
        assert_eq!(Combinations::new(3, 3).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(3, 0).count(), 0);
    }

    #[test]
    fn test_two_platform_example() {
        let catalogue = ProviderCatalogue {
            platforms: vec![platform(1, "A", Some(10.0)), platform(2, "B", Some(20.0))],
            titles: vec![title("t1", &[1]), title("t2", &[1]), title("t3", &[2])],
        };

        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();

        assert_eq!(combos.len(), 2);

        assert_eq!(ids(&combos[0]), vec![1]);
        assert_eq!(combos[0].coverage, 2);
        assert_eq!(combos[0].total, 3);
        assert_eq!(combos[0].monthly_cost, 10.0);
        assert_eq!(combos[0].percentage, 66.7);
        assert_eq!(combos[0].covered_titles, vec!["T1", "T2"]);

        assert_eq!(ids(&combos[1]), vec![1, 2]);
        assert_eq!(combos[1].coverage, 3);
        assert_eq!(combos[1].monthly_cost, 30.0);
        assert_eq!(combos[1].percentage, 100.0);
    }

    #[test]
    fn test_empty_catalogue_yields_no_combinations() {
        let catalogue = ProviderCatalogue {
            platforms: vec![],
            titles: vec![title("t1", &[])],
        };
        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();
        assert!(combos.is_empty());
    }

    #[test]
    fn test_one_entry_per_size_up_to_five() {
        let platforms: Vec<Platform> = (1..=7)
            .map(|id| platform(id, &format!("P{}", id), Some(id as f64)))
            .collect();
        let titles: Vec<TitleProviders> = (1..=7)
            .map(|id| title(&format!("t{}", id), &[id]))
            .collect();
        let catalogue = ProviderCatalogue { platforms, titles };

        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();

        assert_eq!(combos.len(), 5);
        for (i, combo) in combos.iter().enumerate() {
            assert_eq!(combo.num_platforms, i + 1);
            assert_eq!(combo.platforms.len(), i + 1);
        }
        // Every platform covers one title, so the cheapest ones win
        assert_eq!(ids(&combos[2]), vec![1, 2, 3]);
        assert_eq!(combos[2].monthly_cost, 6.0);
    }

    #[test]
    fn test_coverage_is_monotonic() {
        let catalogue = ProviderCatalogue {
            platforms: vec![
                platform(8, "Netflix", Some(169.0)),
                platform(119, "Prime", Some(45.0)),
                platform(337, "Disney", Some(100.0)),
                platform(350, "Apple", None),
            ],
            titles: vec![
                title("a", &[8, 119]),
                title("b", &[8]),
                title("c", &[337]),
                title("d", &[350, 337]),
                title("e", &[]),
                title("f", &[119]),
            ],
        };

        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();

        assert_eq!(combos.len(), 4);
        for pair in combos.windows(2) {
            assert!(pair[1].coverage >= pair[0].coverage);
        }
        // The unavailable title is never covered
        assert_eq!(combos[3].coverage, 5);
        assert_eq!(combos[3].percentage, 83.3);
    }

    #[test]
    fn test_cost_breaks_coverage_ties() {
        let catalogue = ProviderCatalogue {
            platforms: vec![
                platform(8, "Netflix", Some(169.0)),
                platform(119, "Prime", Some(45.0)),
            ],
            titles: vec![title("a", &[8, 119]), title("b", &[8, 119])],
        };

        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();

        assert_eq!(ids(&combos[0]), vec![119]);
        assert_eq!(combos[0].monthly_cost, 45.0);
    }

    #[test]
    fn test_unpriced_platform_costs_nothing() {
        let catalogue = ProviderCatalogue {
            platforms: vec![
                platform(8, "Netflix", Some(169.0)),
                platform(9999, "Free With Ads", None),
            ],
            titles: vec![title("a", &[8, 9999])],
        };

        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();

        assert_eq!(ids(&combos[0]), vec![9999]);
        assert_eq!(combos[0].monthly_cost, 0.0);
        assert_eq!(combos[1].monthly_cost, 169.0);
    }

    #[test]
    fn test_full_ties_pick_smallest_ids() {
        // Catalogue order differs from id order; the result must not depend on it
        let catalogue = ProviderCatalogue {
            platforms: vec![
                platform(30, "C", Some(5.0)),
                platform(10, "A", Some(5.0)),
                platform(20, "B", Some(5.0)),
            ],
            titles: vec![title("x", &[30, 10, 20])],
        };

        let combos = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();

        assert_eq!(ids(&combos[0]), vec![10]);
        assert_eq!(ids(&combos[1]), vec![10, 20]);
        assert_eq!(ids(&combos[2]), vec![10, 20, 30]);
    }

    #[test]
    fn test_max_combination_size_is_configurable() {
        let platforms: Vec<Platform> = (1..=4).map(|id| platform(id, "P", None)).collect();
        let catalogue = ProviderCatalogue {
            platforms,
            titles: vec![title("x", &[1])],
        };
        let config = StreamingConfig {
            max_combination_size: 2,
            ..Default::default()
        };

        let combos = Optimizer::new(&catalogue, &config).optimize().unwrap();
        assert_eq!(combos.len(), 2);
    }

    #[test]
    fn test_solver_matches_exhaustive_search() {
        let platforms: Vec<Platform> = (1..=6)
            .map(|id| platform(id, &format!("P{}", id), Some((7 - id) as f64 * 3.0)))
            .collect();
        let titles = vec![
            title("a", &[1, 2]),
            title("b", &[2, 3]),
            title("c", &[3]),
            title("d", &[4, 5]),
            title("e", &[6]),
            title("f", &[1, 6]),
            title("g", &[]),
        ];
        let catalogue = ProviderCatalogue { platforms, titles };

        let exhaustive = Optimizer::new(&catalogue, &StreamingConfig::default())
            .optimize()
            .unwrap();
        let solver_config = StreamingConfig {
            exhaustive_limit: 0,
            ..Default::default()
        };
        let solved = Optimizer::new(&catalogue, &solver_config)
            .optimize()
            .unwrap();

        assert_eq!(solved.len(), exhaustive.len());
        for (s, e) in solved.iter().zip(&exhaustive) {
            assert_eq!(s.num_platforms, e.num_platforms);
            assert_eq!(s.coverage, e.coverage);
            assert!((s.monthly_cost - e.monthly_cost).abs() < 1e-6);
        }
    }

    #[test]
    fn test_coverage_percentage() {
        assert_eq!(coverage_percentage(0, 0), 0.0);
        assert_eq!(coverage_percentage(2, 3), 66.7);
        assert_eq!(coverage_percentage(1, 3), 33.3);
        assert_eq!(coverage_percentage(3, 3), 100.0);
        assert_eq!(coverage_percentage(1, 8), 12.5);
    }

    #[test]
    fn test_coverage_percentage_ties_round_to_even() {
        assert_eq!(coverage_percentage(1, 16), 6.2);
        assert_eq!(coverage_percentage(5, 16), 31.2);
        assert_eq!(coverage_percentage(3, 16), 18.8);
        assert_eq!(coverage_percentage(1, 80), 1.2);
        assert_eq!(coverage_percentage(3, 80), 3.8);
    }
}
