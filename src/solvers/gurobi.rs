use gurobi::{attr, param, ConstrSense, LinExpr, Maximize, Model, Var, VarType};

use crate::model::PricingModel;
use crate::solvers::SubproblemSolver;

/// Gurobi backed fallback for the pricing subproblem.
/// Panics on gurobi errors, like every other gurobi call site.
pub struct GurobiSolver(pub gurobi::Env);

impl GurobiSolver {
    pub fn new_with_seed(seed: i32) -> Self {
        let mut env = gurobi::Env::new("").unwrap();
        env.set(param::Threads, 1).unwrap();
        env.set(param::Seed, seed).unwrap();
        env.set(param::OutputFlag, 0).unwrap();
        GurobiSolver(env)
    }

    pub fn set_time_limit(&mut self, seconds: f64) {
        self.0.set(param::TimeLimit, seconds).unwrap()
    }

    /// Mirrors every row of the pricing model, including node-local ones
    fn build(&self, model: &PricingModel, vtype: VarType) -> (Model, Vec<Var>) {
        let mut grb = Model::new("pricing", &self.0).unwrap();
        grb.set_objective(LinExpr::new(), Maximize).unwrap();

        let mut columns: Vec<(Vec<gurobi::Constr>, Vec<f64>)> =
            vec![(Vec::new(), Vec::new()); model.num_vars()];

        for (r, row) in model.rows().iter().enumerate() {
            let sides = [
                (row.upper, ConstrSense::Less, "ub"),
                (row.lower, ConstrSense::Greater, "lb"),
            ];
            for (rhs, sense, side) in sides {
                if !rhs.is_finite() {
                    continue;
                }
                let constr = grb
                    .add_constr(&format!("{}[{}]_{}", row.kind, r, side), LinExpr::new(), sense, rhs)
                    .unwrap();
                for &(v, c) in &row.coefficients {
                    columns[v].0.push(constr.clone());
                    columns[v].1.push(c);
                }
            }
        }

        let (lower, upper) = model.col_bounds();
        let vars = columns
            .iter()
            .enumerate()
            .map(|(v, (constrs, coefs))| {
                let bit = model.expansion().var(v);
                grb.add_var(
                    &format!("x[{},{}]", bit.item, bit.bit),
                    vtype.clone(),
                    model.objective()[v],
                    lower[v],
                    upper[v],
                    constrs,
                    coefs,
                )
                .unwrap()
            })
            .collect();

        grb.update().unwrap();
        (grb, vars)
    }
}

impl SubproblemSolver for GurobiSolver {
    fn solve_relaxation(&mut self, model: &PricingModel) -> Option<f64> {
        let (mut grb, _vars) = self.build(model, VarType::Continuous);
        grb.optimize().unwrap();

        let solutions: i32 = grb.get(attr::SolCount).unwrap();
        if solutions > 0 {
            Some(grb.get(attr::ObjVal).unwrap())
        } else {
            None
        }
    }

    fn branch_and_bound(&mut self, model: &PricingModel, cutoff: f64) -> Option<Vec<f64>> {
        let (mut grb, vars) = self.build(model, VarType::Binary);
        grb.optimize().unwrap();

        let solutions: i32 = grb.get(attr::SolCount).unwrap();
        if solutions == 0 {
            return None;
        }

        let objective: f64 = grb.get(attr::ObjVal).unwrap();
        if objective <= cutoff {
            return None;
        }

        Some(grb.get_values(attr::X, &vars).unwrap())
    }
}
