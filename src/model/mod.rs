use std::fmt::{Display, Formatter};

use crate::error::Result;
use crate::expansion::BitExpansion;
use crate::instance::CuttingStockInstance;
use crate::misc::ROW_FEAS_TOL;

pub mod cuts;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Origin of a row in the pricing model
pub enum RowKind {
    Capacity,
    Knife,
    Exclusion,
    Parity,
    RoundedParity,
    KnapsackMir,
    KnifeMir,
}

impl Display for RowKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKind::Capacity => write!(f, "capacity"),
            RowKind::Knife => write!(f, "knife"),
            RowKind::Exclusion => write!(f, "exclusion"),
            RowKind::Parity => write!(f, "parity"),
            RowKind::RoundedParity => write!(f, "rounded_parity"),
            RowKind::KnapsackMir => write!(f, "knapsack_mir"),
            RowKind::KnifeMir => write!(f, "knife_mir"),
        }
    }
}

/// Sparse row `lower <= sum(coef * x) <= upper`
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub coefficients: Vec<(usize, f64)>,
    pub lower: f64,
    pub upper: f64,
}

impl Row {
    pub fn activity(&self, x: &[bool]) -> f64 {
        self.coefficients
            .iter()
            .filter(|(v, _)| x[*v])
            .map(|(_, c)| c)
            .sum()
    }

    /// Activity for a fractional point
    pub fn activity_f64(&self, x: &[f64]) -> f64 {
        self.coefficients.iter().map(|(v, c)| c * x[*v]).sum()
    }

    pub fn is_satisfied(&self, x: &[bool]) -> bool {
        let activity = self.activity(x);
        activity <= self.upper + ROW_FEAS_TOL && activity >= self.lower - ROW_FEAS_TOL
    }

    /// Dense coefficient vector of length `num_vars`
    pub fn dense(&self, num_vars: usize) -> Vec<f64> {
        let mut dense = vec![0.0; num_vars];
        for &(v, c) in &self.coefficients {
            dense[v] += c;
        }
        dense
    }
}

/// The knapsack-type integer program solved for pricing.
///
/// The base rows (capacity and, with a knife limit, the knife row) are built
/// once per instance. Everything after them is node-local and rebuilt by
/// [`PricingModel::apply_exclusions`].
#[derive(Debug, Clone)]
pub struct PricingModel {
    expansion: BitExpansion,
    objective: Vec<f64>,
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    rows: Vec<Row>,
    num_base_rows: usize,
    roll_length: f64,
    knife_capacity: Option<f64>,
}

impl PricingModel {
    pub fn build(instance: &CuttingStockInstance) -> Result<Self> {
        let expansion = BitExpansion::build(instance)?;
        let num_vars = expansion.num_vars();

        let mut rows = vec![Row {
            kind: RowKind::Capacity,
            coefficients: expansion.weights().iter().copied().enumerate().collect(),
            lower: f64::NEG_INFINITY,
            upper: instance.roll(),
        }];

        if let Some(knife_capacity) = instance.knife_capacity() {
            rows.push(Row {
                kind: RowKind::Knife,
                coefficients: expansion
                    .knife_weights()
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|(_, c)| *c != 0.0)
                    .collect(),
                lower: 0.0,
                upper: knife_capacity,
            });
        }

        Ok(PricingModel {
            num_base_rows: rows.len(),
            rows,
            // placeholder until the first pricing call sets real profits
            objective: vec![f64::INFINITY; num_vars],
            col_lower: vec![0.0; num_vars],
            col_upper: vec![1.0; num_vars],
            roll_length: instance.roll(),
            knife_capacity: instance.knife_capacity(),
            expansion,
        })
    }

    pub fn expansion(&self) -> &BitExpansion {
        &self.expansion
    }

    pub fn num_vars(&self) -> usize {
        self.expansion.num_vars()
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Objective is maximized
    pub fn set_objective(&mut self, objective: &[f64]) {
        debug_assert_eq!(objective.len(), self.num_vars());
        self.objective.clear();
        self.objective.extend_from_slice(objective);
    }

    pub fn col_bounds(&self) -> (&[f64], &[f64]) {
        (&self.col_lower, &self.col_upper)
    }

    pub fn roll_length(&self) -> f64 {
        self.roll_length
    }

    pub fn knife_capacity(&self) -> Option<f64> {
        self.knife_capacity
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn base_rows(&self) -> &[Row] {
        &self.rows[..self.num_base_rows]
    }

    /// Node-local rows: exclusions, parity and MIR rows
    pub fn cut_rows(&self) -> &[Row] {
        &self.rows[self.num_base_rows..]
    }

    pub fn capacity_row(&self) -> &Row {
        &self.rows[0]
    }

    pub fn knife_row(&self) -> Option<&Row> {
        self.base_rows().iter().find(|r| r.kind == RowKind::Knife)
    }

    /// First row violated by `x`, if any
    pub fn violated_row(&self, x: &[bool]) -> Option<&Row> {
        self.rows.iter().find(|row| !row.is_satisfied(x))
    }

    pub fn is_feasible(&self, x: &[bool]) -> bool {
        self.violated_row(x).is_none()
    }

    /// Objective value of `x`
    pub fn evaluate(&self, x: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(x)
            .filter(|(_, set)| **set)
            .map(|(p, _)| p)
            .sum()
    }

    pub(crate) fn clear_cut_rows(&mut self) {
        self.rows.truncate(self.num_base_rows);
    }

    pub(crate) fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}
