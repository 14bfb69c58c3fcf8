#[cfg(test)]
mod tests {
    use csp_pricing::expansion::bits_for;
    use csp_pricing::{BitExpansion, CuttingStockInstance, KnapsackSolver, PricingError};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(capacity: f64, profit: &[f64], weight: &[f64]) -> f64 {
        let n = profit.len();
        (0u32..1 << n)
            .filter(|mask| (0..n).filter(|i| mask >> i & 1 == 1).map(|i| weight[i]).sum::<f64>() <= capacity)
            .map(|mask| (0..n).filter(|i| mask >> i & 1 == 1).map(|i| profit[i]).sum::<f64>())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut solver = KnapsackSolver::new();

        for _ in 0..400 {
            let n = rng.gen_range(1..=16);
            let profit: Vec<f64> = (0..n)
                .map(|_| if rng.gen_bool(0.2) { -rng.gen_range(0.0..2.0) } else { rng.gen_range(0.0..10.0) })
                .collect();
            let weight: Vec<f64> = (0..n).map(|_| f64::from(rng.gen_range(1u32..40))).collect();
            let capacity = f64::from(rng.gen_range(1u32..120));

            let optimum = brute_force(capacity, &profit, &weight);
            let solution = solver.solve(capacity, &profit, &weight, f64::NEG_INFINITY, 0.0).unwrap();

            assert!(solution.improved);
            assert!((solution.value - optimum).abs() < 1e-7, "oracle {} vs brute force {}", solution.value, optimum);

            let used: f64 = weight.iter().zip(&solution.x).filter(|(_, x)| **x).map(|(w, _)| w).sum();
            let value: f64 = profit.iter().zip(&solution.x).filter(|(_, x)| **x).map(|(p, _)| p).sum();
            assert!(used <= capacity);
            assert!((value - solution.value).abs() < 1e-7);
        }
    }

    #[test]
    fn respects_lower_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut solver = KnapsackSolver::new();

        for _ in 0..200 {
            let n = rng.gen_range(1..=12);
            let profit: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..3.0)).collect();
            let weight: Vec<f64> = (0..n).map(|_| f64::from(rng.gen_range(1u32..30))).collect();
            let capacity = f64::from(rng.gen_range(1u32..60));
            let lb = rng.gen_range(0.0..6.0);

            let optimum = brute_force(capacity, &profit, &weight);
            let solution = solver.solve(capacity, &profit, &weight, lb, 1e-9).unwrap();

            if optimum > lb + 1e-6 {
                assert!(solution.improved);
                assert!((solution.value - optimum).abs() < 1e-7);
            } else if !solution.improved {
                assert_eq!(solution.value, lb);
                assert!(solution.x.iter().all(|x| !x));
            }
        }
    }

    #[test]
    fn equal_ratios_resolve_consistently() {
        // every variable has ratio one; the capacity fits exactly one of them
        let profit = [5.0, 5.0, 5.0];
        let weight = [5.0, 5.0, 5.0];
        let mut solver = KnapsackSolver::new();

        let first = solver.solve(7.0, &profit, &weight, f64::NEG_INFINITY, 0.0).unwrap();
        let second = solver.solve(7.0, &profit, &weight, f64::NEG_INFINITY, 0.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.x, vec![false, false, true]);
    }

    #[test]
    fn binary_expanded_items_fill_the_roll() {
        // five copies of width 19 fit a roll of 100, encoded as 101 in three bits
        let instance = CuttingStockInstance::new(100, vec![19], vec![10]);
        let expansion = BitExpansion::build(&instance).unwrap();
        assert_eq!(expansion.bits(0), bits_for(100, 19));
        assert_eq!(expansion.num_vars(), 3);

        let profit: Vec<f64> = (0..3).map(|v| 0.3 * expansion.value(v)).collect();
        let mut solver = KnapsackSolver::new();
        let solution = solver.solve(100.0, &profit, expansion.weights(), 1.00001, 1e-9).unwrap();

        assert!(solution.improved);
        assert_eq!(expansion.decode_counts(&solution.x), vec![5.0]);
    }

    #[test]
    fn iteration_ceiling_is_an_error() {
        let profit: Vec<f64> = (0..20).map(|i| 1.0 + f64::from(i) * 0.01).collect();
        let weight: Vec<f64> = (0..20).map(|i| 10.0 + f64::from(i % 7)).collect();
        let mut solver = KnapsackSolver::with_iteration_limit(10);

        match solver.solve(95.0, &profit, &weight, f64::NEG_INFINITY, 0.0) {
            Err(PricingError::OracleIterationLimit { limit, num_vars }) => {
                assert_eq!(limit, 10);
                assert_eq!(num_vars, 20);
            }
            other => panic!("expected the iteration ceiling, got {:?}", other),
        }
    }
}
