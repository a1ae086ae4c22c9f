use approx::assert_abs_diff_eq;
use bullseye::dynamics::*;
use bullseye::linalg::Vector3;
use bullseye::md::{make_time_grid, TimeGrid};
use rstest::*;

use crate::{circular_chief, circular_speed, eccentric_chief, mean_motion, LEO_RADIUS_M};

#[fixture]
fn x0() -> RelStateRic {
    RelStateRic::new(Vector3::new(10.0, -25.0, 4.0), Vector3::new(0.012, -0.021, 0.003))
}

#[fixture]
fn grid() -> TimeGrid {
    make_time_grid(60.0, 1.0)
}

fn hcw() -> Hcw {
    Hcw::new(mean_motion(LEO_RADIUS_M))
}

fn eccentric(max_substep_s: f64) -> EccentricLtv {
    let chief = circular_chief(0.0);
    EccentricLtv::new(
        YaStmParams::builder()
            .chief_r0_i(chief.r_i)
            .chief_v0_i(chief.v_i)
            .max_substep_s(max_substep_s)
            .build(),
    )
}

fn run(model: &dyn RelativeModel, x0: &RelStateRic, grid: &TimeGrid) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
    let mut r = vec![Vector3::zeros(); grid.len()];
    let mut v = vec![Vector3::zeros(); grid.len()];
    let steps = model.predict(x0, grid, &mut r, Some(&mut v)).unwrap();
    assert_eq!(steps, grid.len());
    (r, v)
}

#[rstest]
fn zero_state_stays_zero(grid: TimeGrid) {
    let zero = RelStateRic::zeros();
    let ecc_chief = eccentric_chief(0.0);
    let ecc = EccentricLtv::new(
        YaStmParams::builder()
            .chief_r0_i(ecc_chief.r_i)
            .chief_v0_i(ecc_chief.v_i)
            .build(),
    );

    let models: [&dyn RelativeModel; 3] = [&hcw(), &eccentric(0.25), &ecc];
    for model in models {
        let (r, v) = run(model, &zero, &grid);
        assert!(r.iter().all(|r| *r == Vector3::zeros()));
        assert!(v.iter().all(|v| *v == Vector3::zeros()));
    }
}

#[rstest]
fn eccentric_matches_hcw_on_circular_reference(x0: RelStateRic, grid: TimeGrid) {
    let (r_hcw, v_hcw) = run(&hcw(), &x0, &grid);
    let (r_ecc, v_ecc) = run(&eccentric(0.02), &x0, &grid);

    for k in 0..grid.len() {
        assert_abs_diff_eq!(r_ecc[k], r_hcw[k], epsilon = 5e-3);
        assert_abs_diff_eq!(v_ecc[k], v_hcw[k], epsilon = 5e-6);
    }
    // Both start at the initial state
    assert_abs_diff_eq!(r_ecc[0], x0.r_ric, epsilon = 1e-12);
    assert_abs_diff_eq!(r_hcw[0], x0.r_ric, epsilon = 1e-9);
}

#[rstest]
fn deterministic(x0: RelStateRic, grid: TimeGrid) {
    let models: [&dyn RelativeModel; 2] = [&hcw(), &eccentric(0.25)];
    for model in models {
        let first = run(model, &x0, &grid);
        let second = run(model, &x0, &grid);
        assert_eq!(first, second);
    }
}

#[rstest]
fn hcw_along_track_offset_is_stationary(grid: TimeGrid) {
    let x0 = RelStateRic::new(Vector3::new(0.0, 100.0, 0.0), Vector3::zeros());
    let (r, v) = run(&hcw(), &x0, &grid);
    for (r, v) in r.iter().zip(v.iter()) {
        assert_abs_diff_eq!(*r, x0.r_ric, epsilon = 1e-9);
        assert_abs_diff_eq!(*v, Vector3::zeros(), epsilon = 1e-12);
    }
}

#[rstest]
fn hcw_lower_deputy_moves_ahead(grid: TimeGrid) {
    let x0 = RelStateRic::new(Vector3::new(-100.0, 0.0, 0.0), Vector3::zeros());
    let (r, _) = run(&hcw(), &x0, &grid);
    assert!(r[grid.len() - 1].y > 0.0);
    let n = mean_motion(LEO_RADIUS_M);
    let t: f64 = 60.0;
    let expected_y = 6.0 * ((n * t).sin() - n * t) * x0.r_ric.x;
    assert_abs_diff_eq!(r[grid.len() - 1].y, expected_y, epsilon = 1e-9);
}

#[rstest]
fn insufficient_capacity(x0: RelStateRic, grid: TimeGrid) {
    let mut r = vec![Vector3::zeros(); grid.len() - 1];
    let models: [&dyn RelativeModel; 2] = [&hcw(), &eccentric(0.25)];
    for model in models {
        assert_eq!(
            model.predict(&x0, &grid, &mut r, None),
            Err(ModelError::InsufficientCapacity {
                required: grid.len(),
                available: grid.len() - 1
            })
        );
    }
}

#[rstest]
fn empty_grid_writes_nothing(x0: RelStateRic) {
    let mut r: [Vector3<f64>; 0] = [];
    assert_eq!(hcw().predict(&x0, &TimeGrid::default(), &mut r, None), Ok(0));
    assert_eq!(eccentric(0.25).predict(&x0, &TimeGrid::default(), &mut r, None), Ok(0));
}

#[rstest]
fn invalid_inputs(x0: RelStateRic) {
    let mut r = vec![Vector3::zeros(); 4];

    let err = Hcw::new(0.0).predict(&x0, &make_time_grid(3.0, 1.0), &mut r, None).unwrap_err();
    assert_eq!(err.steps_written(), 0);

    let nan = RelStateRic::new(Vector3::new(f64::NAN, 0.0, 0.0), Vector3::zeros());
    assert!(hcw().predict(&nan, &make_time_grid(3.0, 1.0), &mut r, None).is_err());

    // The first two offsets are complete before the bad one is found
    let bad_grid = TimeGrid::from(vec![0.0, 1.0, -2.0, 3.0]);
    let models: [&dyn RelativeModel; 2] = [&hcw(), &eccentric(0.25)];
    for model in models {
        let err = model.predict(&x0, &bad_grid, &mut r, None).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput { steps_written: 2, .. }), "{err}");
    }

    let decreasing = TimeGrid::from(vec![0.0, 2.0, 1.0]);
    let err = eccentric(0.25).predict(&x0, &decreasing, &mut r, None).unwrap_err();
    assert_eq!(err.steps_written(), 2);

    let mut bad_substep = eccentric(0.25);
    bad_substep.params.max_substep_s = 0.0;
    assert!(bad_substep.predict(&x0, &make_time_grid(3.0, 1.0), &mut r, None).is_err());
}

#[test]
fn circular_speed_is_consistent() {
    assert_abs_diff_eq!(circular_speed(LEO_RADIUS_M), mean_motion(LEO_RADIUS_M) * LEO_RADIUS_M, epsilon = 1e-9);
}
