//! Exact best-first branch and bound for the pricing model.
//!
//! Variables are fixed one at a time in decreasing objective/capacity-weight
//! order. A node is dropped as soon as some row can no longer be satisfied
//! by any completion, and the open node with the largest Dantzig bound on the
//! capacity row is expanded next.

use std::cmp::Ordering;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::misc::ROW_FEAS_TOL;
use crate::model::{PricingModel, Row};
use crate::solvers::SubproblemSolver;

#[derive(Clone, Debug)]
struct Node {
    bound: f64,
    value: f64,
    // assignment of the first `assignment.len()` variables in search order
    assignment: Vec<bool>,
    activities: Vec<f64>,
}

/// Larger bound first, deeper node on ties
#[derive(Clone, Copy, Default)]
struct NodeByBound;

impl Compare<Node> for NodeByBound {
    fn compare(&self, l: &Node, r: &Node) -> Ordering {
        l.bound
            .total_cmp(&r.bound)
            .then(l.assignment.len().cmp(&r.assignment.len()))
    }
}

/// Search data shared by all nodes of one solve
struct SearchSpace<'a> {
    model: &'a PricingModel,
    order: Vec<usize>,
    // per search position: (row, coef) pairs of that variable
    columns: Vec<Vec<(usize, f64)>>,
    // per row: suffix sums of negative / positive coefficients in search order
    min_rest: Vec<Vec<f64>>,
    max_rest: Vec<Vec<f64>>,
}

impl<'a> SearchSpace<'a> {
    fn new(model: &'a PricingModel) -> Self {
        let objective = model.objective();
        let weights = model.expansion().weights();

        let mut order: Vec<usize> = (0..model.num_vars()).collect();
        order.sort_by(|&l, &r| {
            let score = |v: usize| {
                if objective[v] > 0.0 {
                    objective[v] / weights[v]
                } else {
                    f64::NEG_INFINITY
                }
            };
            score(r).total_cmp(&score(l)).then(r.cmp(&l))
        });

        let mut position = vec![0; model.num_vars()];
        for (pos, &v) in order.iter().enumerate() {
            position[v] = pos;
        }

        let n = order.len();
        let mut columns = vec![Vec::new(); n];
        let mut min_rest = Vec::with_capacity(model.rows().len());
        let mut max_rest = Vec::with_capacity(model.rows().len());

        for (r, row) in model.rows().iter().enumerate() {
            let mut dense = vec![0.0; n];
            for &(v, c) in &row.coefficients {
                dense[position[v]] += c;
                columns[position[v]].push((r, c));
            }

            let mut lo = vec![0.0; n + 1];
            let mut hi = vec![0.0; n + 1];
            for pos in (0..n).rev() {
                lo[pos] = lo[pos + 1] + dense[pos].min(0.0);
                hi[pos] = hi[pos + 1] + dense[pos].max(0.0);
            }
            min_rest.push(lo);
            max_rest.push(hi);
        }

        SearchSpace {
            model,
            order,
            columns,
            min_rest,
            max_rest,
        }
    }

    /// Some completion of the node can still satisfy every row
    fn can_complete(&self, depth: usize, activities: &[f64]) -> bool {
        self.model.rows().iter().enumerate().all(|(r, row)| {
            activities[r] + self.min_rest[r][depth] <= row.upper + ROW_FEAS_TOL
                && activities[r] + self.max_rest[r][depth] >= row.lower - ROW_FEAS_TOL
        })
    }

    /// Value plus the Dantzig bound of the remaining variables on the capacity row
    fn bound(&self, depth: usize, value: f64, activities: &[f64]) -> f64 {
        let objective = self.model.objective();
        let weights = self.model.expansion().weights();
        let mut residual = self.model.capacity_row().upper - activities[0];
        let mut bound = value;

        for &v in &self.order[depth..] {
            if objective[v] <= 0.0 {
                break;
            }
            if weights[v] <= residual {
                residual -= weights[v];
                bound += objective[v];
            } else {
                bound += residual.max(0.0) * objective[v] / weights[v];
                break;
            }
        }
        bound
    }

    fn child(&self, node: &Node, take: bool) -> Option<Node> {
        let depth = node.assignment.len();
        let mut activities = node.activities.clone();
        let mut value = node.value;

        if take {
            for &(r, c) in &self.columns[depth] {
                activities[r] += c;
            }
            value += self.model.objective()[self.order[depth]];
        }

        if !self.can_complete(depth + 1, &activities) {
            return None;
        }

        let mut assignment = Vec::with_capacity(depth + 1);
        assignment.extend_from_slice(&node.assignment);
        assignment.push(take);

        Some(Node {
            bound: self.bound(depth + 1, value, &activities),
            value,
            assignment,
            activities,
        })
    }
}

/// Dantzig bound of `max objective * x` subject to a single row with nonnegative coefficients
fn single_row_bound(objective: &[f64], row: &Row) -> f64 {
    let dense = row.dense(objective.len());
    let mut bound = 0.0;
    let mut items = Vec::new();

    for (&profit, &weight) in objective.iter().zip(&dense) {
        if profit <= 0.0 {
            continue;
        }
        // variables outside the row are unconstrained by it
        if weight <= 0.0 {
            bound += profit;
        } else {
            items.push((profit, weight));
        }
    }

    items.sort_by(|a, b| (b.0 / b.1).total_cmp(&(a.0 / a.1)));

    let mut residual = row.upper;
    for (profit, weight) in items {
        if weight <= residual {
            residual -= weight;
            bound += profit;
        } else {
            bound += residual * profit / weight;
            break;
        }
    }
    bound
}

/// Built-in exact backend, needs no external solver
#[derive(Default)]
pub struct CombinatorialSolver {
    nodes_explored: usize,
}

impl CombinatorialSolver {
    pub fn new() -> Self {
        CombinatorialSolver::default()
    }

    /// Nodes expanded by the last `branch_and_bound` call
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }
}

impl SubproblemSolver for CombinatorialSolver {
    fn solve_relaxation(&mut self, model: &PricingModel) -> Option<f64> {
        let objective = model.objective();
        let mut best = objective.iter().filter(|p| **p > 0.0).sum::<f64>();

        for row in model.rows() {
            if row.coefficients.iter().any(|(_, c)| *c < 0.0) || !row.upper.is_finite() {
                continue;
            }
            if row.upper < -ROW_FEAS_TOL {
                return None;
            }
            best = best.min(single_row_bound(objective, row));
        }

        Some(best)
    }

    fn branch_and_bound(&mut self, model: &PricingModel, cutoff: f64) -> Option<Vec<f64>> {
        let space = SearchSpace::new(model);
        let n = space.order.len();
        self.nodes_explored = 0;

        let root_activities = vec![0.0; model.rows().len()];
        if !space.can_complete(0, &root_activities) {
            return None;
        }

        let mut open = BinaryHeap::from_vec_cmp(Vec::new(), NodeByBound);
        open.push(Node {
            bound: space.bound(0, 0.0, &root_activities),
            value: 0.0,
            assignment: Vec::new(),
            activities: root_activities,
        });

        let mut incumbent_value = cutoff;
        let mut incumbent: Option<Vec<bool>> = None;

        while let Some(node) = open.pop() {
            // best first: nothing left can beat the incumbent
            if node.bound <= incumbent_value {
                break;
            }
            self.nodes_explored += 1;

            if node.assignment.len() == n {
                if node.value > incumbent_value {
                    incumbent_value = node.value;
                    incumbent = Some(node.assignment);
                }
                continue;
            }

            for take in [true, false] {
                if let Some(child) = space.child(&node, take) {
                    if child.bound > incumbent_value {
                        open.push(child);
                    }
                }
            }
        }

        incumbent.map(|assignment| {
            let mut x = vec![0.0; n];
            for (&v, &taken) in space.order.iter().zip(&assignment) {
                x[v] = if taken { 1.0 } else { 0.0 };
            }
            x
        })
    }
}
