//! Node-local rows of the pricing model.
//!
//! Every search tree node forbids the patterns its branching decisions
//! excluded. Each excluded pattern becomes a tightened no-good row, pairs of
//! them can be merged into parity rows, and the base rows can additionally
//! be strengthened with MIR rows at every power-of-two scale.

use itertools::Itertools;

use crate::error::Result;
use crate::instance::CuttingStockInstance;
use crate::misc::power_of_two;
use crate::model::{PricingModel, Row, RowKind};
use crate::pattern::Pattern;

/// Scales whose right hand side is closer than this to an integer give no MIR row
pub const MIR_MIN_FRACTIONALITY: f64 = 1e-3;

/// Number of node-local rows per kind after a rebuild
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CutSummary {
    pub exclusions: usize,
    pub parity: usize,
    pub rounded_parity: usize,
    pub knapsack_mir: usize,
    pub knife_mir: usize,
}

impl CutSummary {
    pub fn total(&self) -> usize {
        self.exclusions + self.parity + self.rounded_parity + self.knapsack_mir + self.knife_mir
    }
}

/// Tightened no-good row of one excluded pattern, kept dense so pairs can be combined
#[derive(Clone, Debug)]
struct ExclusionCut {
    coefs: Vec<i32>,
    ones: usize,
}

impl ExclusionCut {
    fn to_row(&self) -> Row {
        Row {
            kind: RowKind::Exclusion,
            coefficients: sparse(&self.coefs),
            lower: f64::NEG_INFINITY,
            upper: self.ones as f64 - 1.0,
        }
    }

    /// Parity row of a pair with an odd combined one-count: keeps the
    /// coefficients both rows agree on, right hand side `floor((o0 + o1) / 2)`.
    fn parity(&self, other: &ExclusionCut) -> Option<Row> {
        let ones = self.ones + other.ones;
        if ones % 2 == 0 {
            return None;
        }

        let coefs: Vec<i32> = self
            .coefs
            .iter()
            .zip(&other.coefs)
            .map(|(&a, &b)| if a == b { a } else { 0 })
            .collect();

        Some(Row {
            kind: RowKind::Parity,
            coefficients: sparse(&coefs),
            lower: f64::NEG_INFINITY,
            upper: (ones / 2) as f64,
        })
    }

    /// Chvatal-Gomory rounding of the sum of two exclusion rows halved.
    /// Only an odd combined one-count leaves a fractional right hand side to round.
    fn rounded_parity(&self, other: &ExclusionCut) -> Option<Row> {
        let ones = self.ones + other.ones;
        if ones % 2 == 0 {
            return None;
        }

        let coefs: Vec<i32> = self
            .coefs
            .iter()
            .zip(&other.coefs)
            .map(|(a, b)| (a + b).div_euclid(2))
            .collect();

        Some(Row {
            kind: RowKind::RoundedParity,
            coefficients: sparse(&coefs),
            lower: f64::NEG_INFINITY,
            upper: ((ones as i64 - 2).div_euclid(2)) as f64,
        })
    }
}

fn sparse(coefs: &[i32]) -> Vec<(usize, f64)> {
    coefs
        .iter()
        .enumerate()
        .filter(|(_, c)| **c != 0)
        .map(|(v, c)| (v, f64::from(*c)))
        .collect()
}

/// MIR rounding function for a `<=` row scaled so that its right hand side has fractionality `f`
fn mir_coefficient(value: f64, f: f64) -> f64 {
    let floor = value.floor();
    floor + ((value - floor - f) / (1.0 - f)).max(0.0)
}

impl PricingModel {
    /// Replaces every node-local row by the rows derived from `excluded`.
    ///
    /// `epsilon` is the slack tolerance used when deciding whether an unset bit
    /// of an excluded pattern could still be set without breaking a base row.
    pub fn apply_exclusions(
        &mut self,
        instance: &CuttingStockInstance,
        excluded: &[Pattern],
        epsilon: f64,
    ) -> Result<CutSummary> {
        self.clear_cut_rows();

        let encodings = excluded
            .iter()
            .map(|pattern| self.expansion().encode_pattern(pattern))
            .collect::<Result<Vec<_>>>()?;

        let cuts: Vec<ExclusionCut> = encodings
            .iter()
            .map(|x| self.exclusion_cut(x, epsilon))
            .collect();

        let mut summary = CutSummary::default();

        #[cfg(feature = "validity_assertions")]
        for (cut, x) in cuts.iter().zip(&encodings) {
            let row = cut.to_row();
            assert!(
                row.activity(x) > row.upper,
                "exclusion row does not cut off its own pattern"
            );
        }

        for cut in &cuts {
            self.push_row(cut.to_row());
            summary.exclusions += 1;
        }

        if instance.combine_exclusions || instance.round_parity {
            for (a, b) in cuts.iter().tuple_combinations() {
                if instance.combine_exclusions {
                    if let Some(row) = a.parity(b) {
                        self.push_row(row);
                        summary.parity += 1;
                    }
                }
                if instance.round_parity {
                    if let Some(row) = a.rounded_parity(b) {
                        self.push_row(row);
                        summary.rounded_parity += 1;
                    }
                }
            }
        }

        if instance.add_knapsack_mir {
            let rows = self.mir_rows(RowKind::KnapsackMir, self.expansion().weights(), self.roll_length());
            summary.knapsack_mir = rows.len();
            rows.into_iter().for_each(|row| self.push_row(row));
        }

        if let (true, Some(knife_capacity)) = (instance.add_knife_mir, self.knife_capacity()) {
            let rows = self.mir_rows(RowKind::KnifeMir, self.expansion().knife_weights(), knife_capacity);
            summary.knife_mir = rows.len();
            rows.into_iter().for_each(|row| self.push_row(row));
        }

        Ok(summary)
    }

    /// Set bits get `+1`. An unset bit gets `-1` only if it still fits the
    /// slack the pattern leaves on every base row, otherwise setting it on top
    /// of the pattern is infeasible anyway and its coefficient stays `0`.
    fn exclusion_cut(&self, x: &[bool], epsilon: f64) -> ExclusionCut {
        let expansion = self.expansion();

        let set_vars = || x.iter().enumerate().filter(|(_, set)| **set).map(|(v, _)| v);
        let usage: f64 = set_vars().map(|v| expansion.weight(v)).sum();
        let diff = self.roll_length() - usage;
        let knife_diff = match self.knife_capacity() {
            Some(capacity) => capacity - set_vars().map(|v| expansion.knife_weight(v)).sum::<f64>(),
            None => f64::INFINITY,
        };

        let coefs = x
            .iter()
            .enumerate()
            .map(|(v, &set)| {
                if set {
                    1
                } else if diff + epsilon >= expansion.weight(v)
                    && knife_diff + epsilon >= expansion.knife_weight(v)
                {
                    -1
                } else {
                    0
                }
            })
            .collect();

        ExclusionCut {
            coefs,
            ones: set_vars().count(),
        }
    }

    /// One MIR row per scale `2^b`, `1 <= b < max_bits`, of the row
    /// `sum(weights * x) <= total`.
    fn mir_rows(&self, kind: RowKind, weights: &[f64], total: f64) -> Vec<Row> {
        let expansion = self.expansion();
        let mut rows = Vec::new();

        for scale in 1..expansion.max_bits() {
            let twopower = power_of_two(scale);
            let scaled = total / twopower;
            let rhs = scaled.floor();
            let f = scaled - rhs;
            if f < MIR_MIN_FRACTIONALITY {
                continue;
            }

            let coefficients = weights
                .iter()
                .enumerate()
                .map(|(v, &weight)| {
                    let value = weight / twopower;
                    // bits at or above the scale already have integral coefficients
                    let coef = if expansion.var(v).bit >= scale {
                        value
                    } else {
                        mir_coefficient(value, f)
                    };
                    (v, coef)
                })
                .filter(|(_, coef)| *coef != 0.0)
                .collect();

            rows.push(Row {
                kind,
                coefficients,
                lower: f64::NEG_INFINITY,
                upper: rhs,
            });
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mir_coefficient_rounds_down_small_fractions() {
        assert_eq!(mir_coefficient(2.0, 0.5), 2.0);
        assert_eq!(mir_coefficient(2.25, 0.5), 2.0);
        assert!((mir_coefficient(2.75, 0.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn parity_needs_odd_one_count() {
        let a = ExclusionCut { coefs: vec![1, -1, 0, 1], ones: 2 };
        let b = ExclusionCut { coefs: vec![1, 1, -1, 0], ones: 2 };
        assert!(a.parity(&b).is_none());
        assert!(a.rounded_parity(&b).is_none());

        let c = ExclusionCut { coefs: vec![1, -1, 1, -1], ones: 3 };
        let row = a.parity(&c).unwrap();
        assert_eq!(row.kind, RowKind::Parity);
        assert_eq!(row.upper, 2.0);
        // only positions 0 and 1 agree
        assert_eq!(row.coefficients, vec![(0, 1.0), (1, -1.0)]);
    }

    #[test]
    fn rounded_parity_halves_the_sum() {
        let a = ExclusionCut { coefs: vec![1, -1, 0, 1], ones: 2 };
        let c = ExclusionCut { coefs: vec![1, 1, 1, -1], ones: 3 };
        let row = a.rounded_parity(&c).unwrap();
        assert_eq!(row.kind, RowKind::RoundedParity);
        assert_eq!(row.upper, 1.0);
        // sums 2, 0, 1, 0 halve and round down to 1, 0, 0, 0
        assert_eq!(row.coefficients, vec![(0, 1.0)]);
    }
}
