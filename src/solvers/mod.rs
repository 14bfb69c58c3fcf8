use crate::model::PricingModel;

pub mod combinatorial;
#[cfg(feature = "gurobi")]
pub mod gurobi;

pub use combinatorial::CombinatorialSolver;

/// Backend for the full multi-row pricing subproblem.
///
/// Used only when the single-row knapsack oracle cannot certify its answer.
/// The model is maximized with its current objective, all variables binary.
pub trait SubproblemSolver {
    /// Upper bound on the LP relaxation value, `None` if the relaxation is infeasible
    fn solve_relaxation(&mut self, model: &PricingModel) -> Option<f64>;

    /// Best integer solution with objective strictly above `cutoff`, or `None`.
    /// The vector is indexed like the model's variables.
    fn branch_and_bound(&mut self, model: &PricingModel, cutoff: f64) -> Option<Vec<f64>>;
}
