use expvar::domains::antithetic::antithetic_pair;
use expvar::domains::monte_carlo::{compare_variance, mean};
use expvar::domains::stratified::{aggregate, StratumKind};
use expvar::prelude::*;

fn unit() -> Exponential {
    Exponential::new(1.0).unwrap()
}

// H0: stratum probabilities do not form a distribution
// Falsification: default boundaries at λ = 1 give (0.632, 0.318, 0.0498)
#[test]
fn h0_1_default_strata_probabilities() {
    let plan = StrataPlan::allocate(10_000, &unit(), &DEFAULT_BOUNDARIES).unwrap();
    let p: Vec<f64> = plan.strata().iter().map(|s| s.probability).collect();

    assert!((p[0] - 0.632).abs() < 1e-3);
    assert!((p[1] - 0.318).abs() < 1e-3);
    assert!((p[2] - 0.0498).abs() < 1e-3);
    assert!((plan.probability_sum() - 1.0).abs() < 1e-9);
    assert_eq!(plan.strata().iter().map(|s| s.sample_count).sum::<usize>(), 10_000);
}

// H0: stratified estimate is biased away from 1/λ
// Falsification: λ = 1, N = 10000, seed 42 lands within 0.05 of 1
#[test]
fn h0_2_stratified_estimate_near_mean() {
    let run = StratifiedEstimator::new(10_000, 1.0, &DEFAULT_BOUNDARIES)
        .unwrap()
        .run(&mut SimRng::new(42))
        .unwrap();
    let estimate = run.estimate.result.estimate;
    assert!((estimate - 1.0).abs() < 0.05, "estimate {estimate}");
}

// H0: stratified draws escape their stratum
// Falsification: every draw lies in its interval
#[test]
fn h0_3_samples_stay_in_strata() {
    let estimator = StratifiedEstimator::new(5_000, 0.7, &[0.0, 0.5, 2.0, 4.0, f64::INFINITY]).unwrap();
    let run = estimator.run(&mut SimRng::new(11)).unwrap();

    for (stratum, samples) in estimator.plan().strata().iter().zip(&run.samples) {
        assert_eq!(samples.len(), stratum.sample_count);
        for &x in samples {
            assert!(x >= stratum.lower, "{x} below {:?}", stratum);
            if stratum.kind != StratumKind::Tail {
                assert!(x < stratum.upper, "{x} above {:?}", stratum);
            }
        }
    }
}

// H0: stratification does not reduce variance
// Falsification: across 100 replications its variance is below the plain mean's
#[test]
fn h0_4_stratified_variance_below_naive() {
    let dist = unit();
    let estimator = StratifiedEstimator::new(1_000, 1.0, &DEFAULT_BOUNDARIES).unwrap();
    let cmp = compare_variance(
        100,
        &mut SimRng::new(2024),
        |rng| Ok(mean(&dist.sample_n(1_000, rng))),
        |rng| estimator.run(rng).map(|run| run.estimate.result.estimate),
    )
    .unwrap();
    assert!(cmp.is_reduced(), "{cmp:?}");
}

// H0: an empty run fails
// Falsification: N = 0 produces empty strata and estimate 0 without error
#[test]
fn h0_5_zero_draws_degenerate_without_error() {
    let estimator = StratifiedEstimator::new(0, 1.0, &DEFAULT_BOUNDARIES).unwrap();
    let run = estimator.run(&mut SimRng::new(1)).unwrap();
    assert!(run.samples.iter().all(Vec::is_empty));
    assert!(run.estimate.strata.iter().all(|s| s.degenerate));
    assert!(run.estimate.result.estimate.abs() < f64::EPSILON);

    let again = aggregate(estimator.plan(), &run.samples).unwrap();
    assert_eq!(again, run.estimate);
}

// H0: invalid parameters reach the sampler
// Falsification: λ ≤ 0 and malformed boundaries are rejected up front
#[test]
fn h0_6_invalid_parameters_rejected() {
    assert!(StratifiedEstimator::new(100, 0.0, &DEFAULT_BOUNDARIES).unwrap_err().is_parameter_error());
    assert!(StratifiedEstimator::new(100, -2.0, &DEFAULT_BOUNDARIES).is_err());
    assert!(StratifiedEstimator::new(100, 1.0, &[0.0, 3.0, 1.0, f64::INFINITY]).is_err());
    assert!(StratifiedEstimator::new(100, 1.0, &[0.5, f64::INFINITY]).is_err());
    assert!(StratifiedEstimator::new(100, 1.0, &[0.0, 1.0, 3.0]).is_err());
}

// H0: antithetic pair at U = 0.5 is asymmetric
// Falsification: X = Y = ln 2
#[test]
fn h0_7_antithetic_midpoint() {
    let (x, y) = antithetic_pair(0.5, &unit());
    assert!((x - 0.693).abs() < 1e-3);
    assert!((y - 0.693).abs() < 1e-3);
}

// H0: antithetic ladder does not converge
// Falsification: at N = 100000 the estimate is within 0.01 of 1/λ
#[test]
fn h0_8_antithetic_converges() {
    let points = AntitheticEstimator::new(1.0, &DEFAULT_SAMPLE_SIZES)
        .unwrap()
        .run(&mut SimRng::new(42))
        .unwrap();
    let last = points.last().unwrap();
    assert_eq!(last.samples, 100_000);
    assert!((last.estimate - 1.0).abs() < 0.01, "{last:?}");
}

// H0: control variates drift from the true mean
// Falsification: both modes land near 1/λ
#[test]
fn h0_9_control_variate_near_mean() {
    for mode in [ControlMode::GlobalShift, ControlMode::Optimal] {
        let run = ControlVariateEstimator::new(10_000, 0.5, 2.0, mode)
            .unwrap()
            .run(&mut SimRng::new(42))
            .unwrap();
        assert!((run.result.estimate - 2.0).abs() < 0.1, "{mode:?}: {:?}", run.result);
    }
}

// H0: conditional estimate is not a probability
// Falsification: P(XY ≤ 3) lies strictly inside (0, 1) with a small error
#[test]
fn h0_10_conditional_probability_bounds() {
    let run = ConditionalEstimator::new(10_000, 1.0, DEFAULT_THRESHOLD)
        .unwrap()
        .run(&mut SimRng::new(42));
    let p = run.result.estimate;
    assert!(p > 0.5 && p < 1.0, "p = {p}");
    assert!(run.result.std_error < 0.01);
}

// H0: parallel stratum sampling changes the answer
// Falsification: sequential and parallel runs are bitwise identical
#[test]
fn h0_11_parallel_strata_identical() {
    let sequential = StratifiedEstimator::new(20_000, 1.5, &DEFAULT_BOUNDARIES).unwrap();
    let parallel = sequential.clone().with_parallel(true);

    let a = sequential.run(&mut SimRng::new(5)).unwrap();
    let b = parallel.run(&mut SimRng::new(5)).unwrap();
    assert_eq!(a, b);
}

// H0: different seeds give identical output
// Falsification: seeds 42 and 43 disagree, seed 42 twice agrees
#[test]
fn h0_12_seed_controls_output() {
    let estimator = StratifiedEstimator::new(1_000, 1.0, &DEFAULT_BOUNDARIES).unwrap();
    let a = estimator.run(&mut SimRng::new(42)).unwrap();
    let b = estimator.run(&mut SimRng::new(42)).unwrap();
    let c = estimator.run(&mut SimRng::new(43)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.samples, c.samples);
}
