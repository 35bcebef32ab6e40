//! Whole-solver behaviour on the test functions.

use std::cell::Cell;
use std::rc::Rc;

use math_test_functions::{sinusoidal, sphere};
use ndarray::{Array1, array};

use crate::{
    CallbackAction, DEConfigBuilder, DEReport, DifferentialEvolution, Init, PolishConfig,
    Strategy, differential_evolution,
};

const SQUARE: [(f64, f64); 2] = [(-5.0, 5.0), (-5.0, 5.0)];

fn solve(builder: DEConfigBuilder, f: fn(&Array1<f64>) -> f64) -> DEReport {
    let config = builder.build().unwrap();
    differential_evolution(&f, &SQUARE, config).unwrap()
}

#[test]
fn every_strategy_reaches_the_sphere_minimum() {
    for (k, strategy) in Strategy::ALL.into_iter().enumerate() {
        let builder = DEConfigBuilder::new()
            .seed(42 + k as u64)
            .maxiter(300)
            .popsize(20)
            .tol(0.0)
            .strategy(strategy);
        let report = solve(builder, sphere);
        assert!(report.fun < 1e-3, "{strategy}: f = {}", report.fun);
    }
}

#[test]
fn one_generation_costs_two_population_evaluations() {
    let builder = DEConfigBuilder::new()
        .seed(7)
        .maxiter(1)
        .popsize(20)
        .strategy(Strategy::Rand1Bin);
    let report = solve(builder, sinusoidal);

    assert_eq!(report.nit, 1);
    assert_eq!(report.history, vec![report.fun]);
    assert_eq!(report.population.nrows(), 40);
    assert_eq!(report.nfev, 80);
    assert!(report.x.iter().all(|v| (-5.0..=5.0).contains(v)));
    assert_eq!(report.fun, sinusoidal(&report.x));
}

#[test]
fn history_only_improves() {
    let builder = DEConfigBuilder::new()
        .seed(5)
        .maxiter(40)
        .popsize(10)
        .tol(0.0)
        .strategy(Strategy::Rand2Exp);
    let report = solve(builder, sinusoidal);

    assert_eq!(report.history.len(), report.nit);
    assert!(report.history.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(report.history.last().copied(), Some(report.fun));
}

#[test]
fn tiny_problems_still_get_a_full_population() {
    let config = DEConfigBuilder::new()
        .seed(42)
        .maxiter(100)
        .popsize(4)
        .tol(0.0)
        .build()
        .unwrap();
    let report =
        differential_evolution(&|x: &Array1<f64>| x[0] * x[0], &[(-5.0, 5.0)], config).unwrap();

    assert_eq!(report.population.nrows(), crate::MIN_POPULATION);
    assert!(report.fun < 1e-2);
}

#[test]
fn pinned_coordinates_stay_put() {
    let f = |x: &Array1<f64>| x.dot(x);
    let mut de = DifferentialEvolution::new(&f, array![-5.0, 3.0], array![5.0, 3.0]).unwrap();
    *de.config_mut() = DEConfigBuilder::new()
        .seed(42)
        .maxiter(50)
        .popsize(10)
        .init(Init::Random)
        .build()
        .unwrap();
    let report = de.solve();
    assert!(report.population.column(1).iter().all(|&v| v == 3.0));
    assert_eq!(report.x[1], 3.0);

    let mut pinned =
        DifferentialEvolution::new(&sphere, array![1.0, 2.0], array![1.0, 2.0]).unwrap();
    let report = pinned.solve();
    assert_eq!((report.nit, report.nfev), (0, 1));
    assert_eq!(report.fun, 5.0);
    assert!(report.success);
}

#[test]
fn malformed_bounds_are_rejected() {
    let config = DEConfigBuilder::new().build().unwrap();
    let err = differential_evolution(&sphere, &[(-1.0, 1.0), (2.0, -2.0)], config).unwrap_err();
    assert!(matches!(err, crate::DEError::InvalidBounds { index: 1, .. }));

    let err = DifferentialEvolution::new(&sphere, array![0.0], array![1.0, 2.0])
        .err()
        .unwrap();
    assert!(err.is_bounds_error());
}

#[test]
fn a_seed_fixes_the_whole_run() {
    let run = || {
        let builder = DEConfigBuilder::new()
            .seed(42)
            .maxiter(50)
            .popsize(15)
            .strategy(Strategy::CurrentToBest1Exp);
        solve(builder, sinusoidal)
    };
    let (a, b) = (run(), run());
    assert_eq!(a.x, b.x);
    assert_eq!(a.history, b.history);
}

#[test]
fn rayon_evaluation_does_not_change_the_run() {
    let run = |parallel: bool| {
        let builder = DEConfigBuilder::new()
            .seed(3)
            .maxiter(20)
            .popsize(30)
            .enable_parallel(parallel);
        solve(builder, sinusoidal).history
    };
    assert_eq!(run(false), run(true));
}

#[test]
fn callback_can_end_the_run() {
    let calls = Rc::new(Cell::new(0usize));
    let seen = Rc::clone(&calls);
    let builder = DEConfigBuilder::new()
        .seed(42)
        .maxiter(1000)
        .popsize(10)
        .tol(0.0)
        .callback(Box::new(move |snapshot| {
            seen.set(seen.get() + 1);
            if snapshot.iter == 5 {
                CallbackAction::Stop
            } else {
                CallbackAction::Continue
            }
        }));
    let report = solve(builder, sphere);

    assert_eq!(calls.get(), 5);
    assert_eq!(report.nit, 5);
    assert!(report.success);
}

#[test]
fn polishing_never_hurts() {
    let run = |polish: bool| {
        let mut builder = DEConfigBuilder::new().seed(42).maxiter(3).popsize(10);
        if polish {
            builder = builder.polish(PolishConfig {
                enabled: true,
                maxeval: 400,
            });
        }
        solve(builder, sphere)
    };
    let (plain, polished) = (run(false), run(true));

    assert!(polished.fun <= plain.fun);
    assert!(polished.nfev > plain.nfev);
    assert!(polished.nfev <= plain.nfev + 400);
    assert_eq!(polished.fun, sphere(&polished.x));
}
