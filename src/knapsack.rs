//! Exact 0/1 knapsack by Horowitz-Sahni depth-first branch and bound.
//!
//! Variables are visited in order of decreasing profit/weight ratio. The
//! search alternates a greedy forward phase with backtracking to the last
//! item packed, pruning every suffix whose Dantzig bound cannot beat the
//! incumbent by at least `min_improvement`.

use std::cmp::Ordering;

use compare::Compare;

use crate::error::{PricingError, Result};

/// Iterations the oracle may spend before it declares its bounding logic broken
pub const DEFAULT_ORACLE_ITERATION_LIMIT: u64 = 1 << 30;

/// Best assignment found, in original variable order
#[derive(Clone, Debug, PartialEq)]
pub struct KnapsackSolution {
    pub value: f64,
    pub x: Vec<bool>,
    /// `false` if nothing beat the supplied lower bound, `value` is that bound then
    pub improved: bool,
}

/// Orders variable indices by decreasing profit/weight, ties by decreasing index
struct RatioOrder<'a> {
    profit: &'a [f64],
    weight: &'a [f64],
}

impl Compare<usize> for RatioOrder<'_> {
    fn compare(&self, l: &usize, r: &usize) -> Ordering {
        let ratio_l = self.profit[*l] / self.weight[*l];
        let ratio_r = self.profit[*r] / self.weight[*r];
        ratio_r.total_cmp(&ratio_l).then(r.cmp(l))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Bound,
    Forward,
    Update,
    Backtrack,
}

/// Reusable knapsack oracle. Buffers survive between calls.
pub struct KnapsackSolver {
    iteration_limit: u64,
    order: Vec<usize>,
    p: Vec<f64>,
    w: Vec<f64>,
    xhat: Vec<bool>,
    best: Vec<bool>,
}

impl Default for KnapsackSolver {
    fn default() -> Self {
        KnapsackSolver::new()
    }
}

impl KnapsackSolver {
    pub fn new() -> Self {
        KnapsackSolver::with_iteration_limit(DEFAULT_ORACLE_ITERATION_LIMIT)
    }

    pub fn with_iteration_limit(iteration_limit: u64) -> Self {
        KnapsackSolver {
            iteration_limit,
            order: Vec::new(),
            p: Vec::new(),
            w: Vec::new(),
            xhat: Vec::new(),
            best: Vec::new(),
        }
    }

    pub fn iteration_limit(&self) -> u64 {
        self.iteration_limit
    }

    /// Maximizes `profit * x` subject to `weight * x <= capacity`.
    ///
    /// Only assignments worth more than `lb` are reported; with
    /// `lb = f64::NEG_INFINITY` the optimum is always returned.
    pub fn solve(
        &mut self,
        capacity: f64,
        profit: &[f64],
        weight: &[f64],
        lb: f64,
        min_improvement: f64,
    ) -> Result<KnapsackSolution> {
        debug_assert_eq!(profit.len(), weight.len());
        let num_vars = profit.len();

        // items that cannot contribute never enter the search
        self.order.clear();
        self.order.extend(
            (0..num_vars).filter(|&v| profit[v] > 0.0 && weight[v] <= capacity),
        );
        debug_assert!(self.order.iter().all(|&v| weight[v] > 0.0));
        let ratio = RatioOrder { profit, weight };
        self.order.sort_by(|l, r| ratio.compare(l, r));

        let n = self.order.len();
        self.p.clear();
        self.p.extend(self.order.iter().map(|&v| profit[v]));
        self.w.clear();
        self.w.extend(self.order.iter().map(|&v| weight[v]));
        self.xhat.clear();
        self.xhat.resize(n, false);
        self.best.clear();
        self.best.resize(n, false);

        let (z, improved) = if n == 0 {
            if 0.0 > lb {
                (0.0, true)
            } else {
                (lb, false)
            }
        } else {
            self.search(capacity, lb, min_improvement)?
        };

        let mut x = vec![false; num_vars];
        if improved {
            for (&v, &taken) in self.order.iter().zip(&self.best) {
                x[v] = taken;
            }
        }

        Ok(KnapsackSolution { value: z, x, improved })
    }

    /// Dantzig bound of the sorted suffix starting at `j`
    fn upper_bound(p: &[f64], w: &[f64], j: usize, capacity: f64) -> f64 {
        let mut residual = capacity;
        let mut bound = 0.0;
        for k in j..p.len() {
            if w[k] <= residual {
                residual -= w[k];
                bound += p[k];
            } else {
                return bound + residual * p[k] / w[k];
            }
        }
        bound
    }

    fn search(&mut self, capacity: f64, lb: f64, min_improvement: f64) -> Result<(f64, bool)> {
        let KnapsackSolver {
            iteration_limit,
            p,
            w,
            xhat,
            best,
            ..
        } = self;
        let n = p.len();

        let mut z = lb;
        let mut improved = false;
        let mut zhat = 0.0;
        let mut caphat = capacity;
        let mut j = 0;
        let mut step = Step::Bound;
        let mut iterations: u64 = 0;

        loop {
            iterations += 1;
            if iterations > *iteration_limit {
                return Err(PricingError::OracleIterationLimit {
                    limit: *iteration_limit,
                    num_vars: n,
                });
            }

            match step {
                Step::Bound => {
                    let u = Self::upper_bound(&p[..], &w[..], j, caphat);
                    step = if z + min_improvement >= zhat + u {
                        Step::Backtrack
                    } else {
                        Step::Forward
                    };
                }
                Step::Forward => {
                    while j < n && w[j] <= caphat {
                        caphat -= w[j];
                        zhat += p[j];
                        xhat[j] = true;
                        j += 1;
                    }
                    if j < n {
                        xhat[j] = false;
                        j += 1;
                    }

                    step = match (j + 1).cmp(&n) {
                        Ordering::Less => Step::Bound,
                        // the last item needs no bound, just try to pack it
                        Ordering::Equal => Step::Forward,
                        Ordering::Greater => Step::Update,
                    };
                }
                Step::Update => {
                    if zhat > z {
                        z = zhat;
                        best.copy_from_slice(&xhat[..]);
                        improved = true;
                    }

                    j = n - 1;
                    if xhat[j] {
                        caphat += w[j];
                        zhat -= p[j];
                        xhat[j] = false;
                    }
                    step = Step::Backtrack;
                }
                Step::Backtrack => match (0..j).rev().find(|&k| xhat[k]) {
                    None => break,
                    Some(i) => {
                        caphat += w[i];
                        zhat -= p[i];
                        xhat[i] = false;
                        j = i + 1;
                        step = Step::Bound;
                    }
                },
            }
        }

        Ok((z, improved))
    }
}
