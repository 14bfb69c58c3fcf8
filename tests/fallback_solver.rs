#[cfg(test)]
mod tests {
    use csp_pricing::{CombinatorialSolver, CuttingStockInstance, Pattern, PricingModel, SubproblemSolver};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(model: &PricingModel) -> Option<f64> {
        let n = model.num_vars();
        (0u32..1 << n)
            .map(|mask| (0..n).map(|i| mask >> i & 1 == 1).collect::<Vec<bool>>())
            .filter(|x| model.is_feasible(x))
            .map(|x| model.evaluate(&x))
            .max_by(|a, b| a.total_cmp(b))
    }

    fn random_model(rng: &mut StdRng) -> PricingModel {
        let roll_length = rng.gen_range(10u32..=30);
        let num_items = rng.gen_range(1..=3);
        let widths: Vec<u32> = (0..num_items)
            .map(|_| rng.gen_range(roll_length / 6 + 1..=roll_length))
            .collect();
        let demands = vec![4; num_items];

        let instance = CuttingStockInstance::new(roll_length, widths, demands)
            .with_knife_limit(rng.gen_range(-1..=2))
            .with_combined_exclusions(rng.gen_bool(0.5))
            .with_rounded_parity(rng.gen_bool(0.5))
            .with_knapsack_mir(rng.gen_bool(0.5))
            .with_knife_mir(rng.gen_bool(0.5));

        let excluded: Vec<Pattern> = (0..rng.gen_range(0..=3))
            .map(|_| {
                let counts: Vec<(usize, f64)> = (0..num_items)
                    .map(|item| (item, f64::from(rng.gen_range(0..=instance.max_copies(item)))))
                    .collect();
                Pattern::new(&instance, counts)
            })
            .filter(|p| !p.is_empty())
            .collect();

        let mut model = PricingModel::build(&instance).unwrap();
        model.apply_exclusions(&instance, &excluded, 1e-6).unwrap();

        let objective: Vec<f64> = (0..model.num_vars()).map(|_| rng.gen_range(-0.5..1.5)).collect();
        model.set_objective(&objective);
        model
    }

    #[test]
    fn branch_and_bound_is_exact() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut solver = CombinatorialSolver::new();

        for _ in 0..300 {
            let model = random_model(&mut rng);
            let optimum = brute_force(&model);

            match solver.branch_and_bound(&model, f64::NEG_INFINITY) {
                Some(x) => {
                    let x: Vec<bool> = x.iter().map(|v| *v > 0.5).collect();
                    assert!(model.is_feasible(&x));
                    let optimum = optimum.unwrap();
                    assert!((model.evaluate(&x) - optimum).abs() < 1e-9, "{} vs {}", model.evaluate(&x), optimum);
                }
                None => assert!(optimum.is_none()),
            }
        }
    }

    #[test]
    fn cutoff_filters_weak_solutions() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut solver = CombinatorialSolver::new();

        for _ in 0..200 {
            let model = random_model(&mut rng);
            let Some(optimum) = brute_force(&model) else { continue };

            let result = solver.branch_and_bound(&model, 1.0);
            if optimum > 1.0 + 1e-9 {
                assert!(result.is_some());
            } else if optimum < 1.0 - 1e-9 {
                assert!(result.is_none());
            }
        }
    }

    #[test]
    fn relaxation_bounds_the_optimum() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut solver = CombinatorialSolver::new();

        for _ in 0..300 {
            let model = random_model(&mut rng);
            if let (Some(optimum), Some(bound)) = (brute_force(&model), solver.solve_relaxation(&model)) {
                assert!(bound >= optimum - 1e-9, "relaxation {} below optimum {}", bound, optimum);
            }
        }
    }

    #[test]
    fn search_counts_nodes() {
        let instance = CuttingStockInstance::new(100, vec![45, 36], vec![3, 5]);
        let mut model = PricingModel::build(&instance).unwrap();
        model.set_objective(&[0.6, 1.2, 0.45, 0.9]);

        let mut solver = CombinatorialSolver::new();
        let x = solver.branch_and_bound(&model, 1.0).unwrap();
        assert_eq!(x, vec![0.0, 1.0, 0.0, 0.0]);
        assert!(solver.nodes_explored() > 0);
    }
}
