use std::slice::Iter;

use crate::misc::FullHashMap;

/// Two pooled values closer than this are considered equal
pub const POOL_VALUE_TOL: f64 = 1e-3;

#[derive(Clone, Debug, PartialEq)]
pub struct PoolEntry {
    pub solution: Vec<bool>,
    pub value: f64,
}

/// Holds the dense 0/1 solutions found during one pricing call.
///
/// An entry is a duplicate if an earlier entry has the same vector and a
/// value within `POOL_VALUE_TOL`. Duplicates are dropped silently.
#[derive(Default, Clone, Debug)]
pub struct SolutionPool {
    entries: Vec<PoolEntry>,
    // solution vector -> indices of entries carrying it
    index: FullHashMap<Vec<bool>, Vec<usize>>,
}

impl SolutionPool {
    pub fn new() -> Self {
        SolutionPool::default()
    }

    /// Total number of solutions in pool
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> &PoolEntry {
        &self.entries[index]
    }

    pub fn iter(&self) -> Iter<PoolEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Adds a solution unless the same one is already pooled.
    /// Returns whether the solution was new.
    pub fn add(&mut self, solution: Vec<bool>, value: f64) -> bool {
        if let Some(existing) = self.index.get(&solution) {
            let is_duplicate = existing
                .iter()
                .any(|&i| (self.entries[i].value - value).abs() < POOL_VALUE_TOL);
            if is_duplicate {
                return false;
            }
        }

        let position = self.entries.len();
        self.index.entry(solution.clone()).or_default().push(position);
        self.entries.push(PoolEntry { solution, value });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_dropped() {
        let mut pool = SolutionPool::new();
        assert!(pool.add(vec![true, false, true], 1.5));
        assert!(!pool.add(vec![true, false, true], 1.5));
        assert!(!pool.add(vec![true, false, true], 1.5004));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn same_vector_with_other_value_is_kept() {
        let mut pool = SolutionPool::new();
        assert!(pool.add(vec![true, false], 1.0));
        assert!(pool.add(vec![true, false], 2.0));
        assert!(pool.add(vec![false, true], 1.0));
        assert_eq!(pool.len(), 3);

        pool.clear();
        assert!(pool.is_empty());
        assert!(pool.add(vec![true, false], 1.0));
    }
}
