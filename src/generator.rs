use std::time::Instant;

use crate::error::{PricingError, Result};
use crate::instance::CuttingStockInstance;
use crate::knapsack::{KnapsackSolver, DEFAULT_ORACLE_ITERATION_LIMIT};
use crate::model::PricingModel;
use crate::pattern::{Pattern, PATTERN_COST};
use crate::pool::SolutionPool;
use crate::solvers::SubproblemSolver;
use crate::ui::{InstanceUIState, NodeUIState, PricingPath, PricingUIState, UISender, UIUserMessage};

/// Oracle lower bound when the master already has a feasible incumbent:
/// only strictly improving columns are of interest
pub const FEASIBLE_LOWER_BOUND: f64 = 1.00001;

/// Oracle lower bound while the master is still primal infeasible
pub const INFEASIBLE_LOWER_BOUND: f64 = 0.00001;

#[derive(Clone, Debug)]
/// Settings of the pricing driver
pub struct PricingSettings {
    /// Multiplier applied to the profits of already pooled solutions, in (0, 1)
    pub perturb_factor: f64,
    /// Number of perturbation rounds after a successful knapsack solve
    pub perturb_num: usize,
    /// Stopping gap of the knapsack oracle
    pub min_improvement: f64,
    pub oracle_iteration_limit: u64,
    /// Slack tolerance used when tightening exclusion rows
    pub exclusion_epsilon: f64,
    /// Reduced cost the fallback solver has to undercut
    pub fallback_tolerance: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            perturb_factor: 0.5,
            perturb_num: 0,
            min_improvement: 1e-9,
            oracle_iteration_limit: DEFAULT_ORACLE_ITERATION_LIMIT,
            exclusion_epsilon: 1e-6,
            fallback_tolerance: 1e-8,
        }
    }
}

/// State tied to one configured instance
struct PricingContext {
    instance: CuttingStockInstance,
    model: PricingModel,
}

/// Generates negative reduced cost patterns for the cutting stock master problem.
///
/// Lifecycle: [`configure`](Self::configure) once per instance,
/// [`apply_exclusions`](Self::apply_exclusions) once per search tree node and
/// [`generate_columns`](Self::generate_columns) once per LP solve.
pub struct ColumnGenerator<Solver: SubproblemSolver> {
    ui: UISender,
    solver: Solver,
    settings: PricingSettings,
    knapsack: KnapsackSolver,
    pool: SolutionPool,
    context: Option<PricingContext>,
    last_path: PricingPath,
}

impl<Solver: SubproblemSolver> ColumnGenerator<Solver> {
    pub fn new(solver: Solver, ui: UISender) -> Self {
        ColumnGenerator::with_settings(solver, ui, PricingSettings::default())
    }

    pub fn with_settings(solver: Solver, ui: UISender, settings: PricingSettings) -> Self {
        ColumnGenerator {
            ui,
            solver,
            knapsack: KnapsackSolver::with_iteration_limit(settings.oracle_iteration_limit),
            settings,
            pool: SolutionPool::new(),
            context: None,
            last_path: PricingPath::NoColumn,
        }
    }

    /// (Re)builds the binary expansion and the base rows of the pricing model.
    /// Any state of a previously configured instance is dropped.
    pub fn configure(&mut self, instance: CuttingStockInstance, perturb_factor: f64, perturb_num: i32) -> Result<()> {
        self.context = None;
        self.pool.clear();
        self.last_path = PricingPath::NoColumn;

        let perturb_num = usize::try_from(perturb_num).unwrap_or(0);
        if perturb_num > 0 && !(perturb_factor > 0.0 && perturb_factor < 1.0) {
            return Err(PricingError::InvalidPerturbation { factor: perturb_factor });
        }

        let model = PricingModel::build(&instance)?;
        self.settings.perturb_factor = perturb_factor;
        self.settings.perturb_num = perturb_num;

        self.ui.send(UIUserMessage::InstanceConfigured(InstanceUIState {
            num_items: instance.num_items(),
            num_vars: model.num_vars(),
            max_bits: model.expansion().max_bits(),
            knife_limit: instance.knife_limit,
        }));

        self.context = Some(PricingContext { instance, model });
        Ok(())
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn instance(&self) -> Option<&CuttingStockInstance> {
        self.context.as_ref().map(|c| &c.instance)
    }

    pub fn model(&self) -> Option<&PricingModel> {
        self.context.as_ref().map(|c| &c.model)
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Path taken by the last `generate_columns` call
    pub fn last_path(&self) -> PricingPath {
        self.last_path
    }

    /// Rebuilds the node-local rows forbidding every pattern in `excluded`
    pub fn apply_exclusions(&mut self, excluded: &[Pattern]) -> Result<()> {
        let context = self.context.as_mut().ok_or(PricingError::NotConfigured)?;
        let summary = context
            .model
            .apply_exclusions(&context.instance, excluded, self.settings.exclusion_epsilon)?;

        self.ui.send(UIUserMessage::NodeRowsRebuilt(NodeUIState {
            excluded: excluded.len(),
            exclusion_rows: summary.exclusions,
            parity_rows: summary.parity + summary.rounded_parity,
            mir_rows: summary.knapsack_mir + summary.knife_mir,
        }));
        Ok(())
    }

    /// Prices the current dual vector.
    ///
    /// Returns every pooled pattern whose reduced cost is below `-dual_tol`.
    /// An empty list means no improving column exists for this node.
    pub fn generate_columns(&mut self, dual: &[f64], dual_tol: f64, primal_feasible: bool) -> Result<Vec<Pattern>> {
        let start = Instant::now();
        let ColumnGenerator {
            ui,
            solver,
            settings,
            knapsack,
            pool,
            context,
            last_path,
        } = self;
        let PricingContext { instance, model } = context.as_mut().ok_or(PricingError::NotConfigured)?;

        if dual.len() != instance.num_items() {
            return Err(PricingError::DualLengthMismatch {
                expected: instance.num_items(),
                got: dual.len(),
            });
        }

        pool.clear();

        let expansion = model.expansion();
        let profit: Vec<f64> = (0..expansion.num_vars())
            .map(|v| dual[expansion.var(v).item] * expansion.value(v))
            .collect();
        model.set_objective(&profit);

        let lb = if primal_feasible {
            FEASIBLE_LOWER_BOUND
        } else {
            INFEASIBLE_LOWER_BOUND
        };

        let capacity = model.roll_length();
        let best = knapsack.solve(capacity, &profit, model.expansion().weights(), lb, settings.min_improvement)?;

        let mut path = PricingPath::NoColumn;
        let mut perturbation_rounds = 0;

        if best.improved && best.x.iter().any(|set| *set) {
            if model.is_feasible(&best.x) {
                path = PricingPath::FastPath;
                pool.add(best.x, best.value);

                perturbation_rounds = perturb(knapsack, pool, model, settings, &profit)?;
            } else {
                path = PricingPath::Fallback;
                ui.send(UIUserMessage::LogS("knapsack optimum violates the pricing model, solving exactly"));

                let cutoff = PATTERN_COST + settings.fallback_tolerance;
                let relaxation = solver.solve_relaxation(model);
                if relaxation.map_or(false, |bound| bound > cutoff) {
                    if let Some(x) = solver.branch_and_bound(model, cutoff) {
                        let x: Vec<bool> = x.iter().map(|value| *value > 0.5).collect();
                        if x.iter().any(|set| *set) && model.is_feasible(&x) {
                            let value = model.evaluate(&x);
                            pool.add(x, value);
                        }
                    }
                }
            }
        }

        let columns = materialize(instance, model, pool, dual, dual_tol);
        *last_path = path;

        ui.send(UIUserMessage::PricingFinish(PricingUIState {
            runtime: start.elapsed().as_secs_f64(),
            path,
            pool_size: pool.len(),
            perturbation_rounds,
            num_columns: columns.len(),
            best_reduced_cost: columns
                .iter()
                .map(|c| c.reduced_cost(dual))
                .min_by(|a, b| a.total_cmp(b)),
        }));

        Ok(columns)
    }
}

/// Re-runs the oracle with the profits of pooled solutions scaled down, to
/// collect further distinct columns. Each round scales the solution found by
/// the previous round, or every pooled solution again if it found nothing new.
fn perturb(
    knapsack: &mut KnapsackSolver,
    pool: &mut SolutionPool,
    model: &PricingModel,
    settings: &PricingSettings,
    profit: &[f64],
) -> Result<usize> {
    let mut perturbed = profit.to_vec();
    let mut newest = pool.len().checked_sub(1);

    for _ in 0..settings.perturb_num {
        let scaled: Vec<usize> = match newest {
            Some(entry) => vec![entry],
            None => (0..pool.len()).collect(),
        };
        for entry in scaled {
            for (v, set) in pool.get(entry).solution.iter().enumerate() {
                if *set {
                    perturbed[v] *= settings.perturb_factor;
                }
            }
        }

        let candidate = knapsack.solve(
            model.roll_length(),
            &perturbed,
            model.expansion().weights(),
            f64::NEG_INFINITY,
            settings.min_improvement,
        )?;

        newest = None;
        if candidate.x.iter().any(|set| *set) && model.is_feasible(&candidate.x) {
            let value = model.evaluate(&candidate.x);
            if pool.add(candidate.x, value) {
                newest = Some(pool.len() - 1);
            }
        }
    }

    Ok(settings.perturb_num)
}

/// Decodes pooled solutions into patterns and keeps those pricing out below `-dual_tol`
fn materialize(
    instance: &CuttingStockInstance,
    model: &PricingModel,
    pool: &SolutionPool,
    dual: &[f64],
    dual_tol: f64,
) -> Vec<Pattern> {
    let mut columns = Vec::new();

    for entry in pool.iter() {
        #[cfg(feature = "validity_assertions")]
        assert!(model.is_feasible(&entry.solution), "pooled solution violates the pricing model");

        let counts = model.expansion().decode_counts(&entry.solution);
        let pattern = Pattern::new(instance, counts.into_iter().enumerate());
        if pattern.is_empty() {
            continue;
        }

        let dj = pattern.reduced_cost(dual);
        if dj < -dual_tol {
            columns.push(pattern);
        }
    }

    columns
}
