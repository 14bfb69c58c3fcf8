use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::instance::CuttingStockInstance;
use crate::misc::HashMap;

/// Every pattern costs one roll
pub const PATTERN_COST: f64 = 1.0;

/// One way of cutting a roll.
///
/// Only strictly positive counts are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    counts: HashMap<usize, f64>,
    cost: f64,
    ub: f64,
}

impl Pattern {
    /// Builds a pattern from `(item, count)` pairs, dropping zero entries
    /// and computing the usage upper bound from the demands.
    pub fn new<I>(instance: &CuttingStockInstance, counts: I) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut stored: HashMap<usize, f64> = HashMap::default();
        for (item, count) in counts {
            if count > 0.0 {
                *stored.entry(item).or_insert(0.0) += count;
            }
        }

        let ub = stored
            .iter()
            .map(|(&item, &count)| (f64::from(instance.demands[item]) / count).ceil())
            .fold(0.0, f64::max);

        Pattern {
            counts: stored,
            cost: PATTERN_COST,
            ub,
        }
    }

    pub fn counts(&self) -> &HashMap<usize, f64> {
        &self.counts
    }

    pub fn count(&self, item: usize) -> f64 {
        self.counts.get(&item).copied().unwrap_or(0.0)
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Maximum number of times the pattern is worth using
    pub fn ub(&self) -> f64 {
        self.ub
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total width cut from the roll
    pub fn usage(&self, instance: &CuttingStockInstance) -> f64 {
        self.counts
            .iter()
            .map(|(&item, &count)| count * f64::from(instance.widths[item]))
            .sum()
    }

    /// Left hand side of the knife row
    pub fn knife_usage(&self, instance: &CuttingStockInstance) -> f64 {
        self.counts
            .iter()
            .map(|(&item, &count)| count * instance.knife_slack(item))
            .sum()
    }

    /// `cost - sum(dual[item] * count)`
    pub fn reduced_cost(&self, dual: &[f64]) -> f64 {
        self.cost
            - self
                .counts
                .iter()
                .map(|(&item, &count)| dual[item] * count)
                .sum::<f64>()
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .counts
            .iter()
            .sorted_by_key(|(item, _)| **item)
            .map(|(item, count)| format!("{} x #{}", count, item))
            .join(", ");
        write!(f, "{}", parts)
    }
}
