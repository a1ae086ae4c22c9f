use approx::assert_abs_diff_eq;
use bullseye::cosmic::*;
use bullseye::dynamics::{Hcw, RelStateRic, RelativeModel};
use bullseye::io::{ModelKind, PredictorConfig, MAX_STEPS};
use bullseye::linalg::Vector3;
use bullseye::md::{PredictorError, RelativePredictor};
use bullseye::providers::*;
use bullseye::time::Unit;
use rstest::*;

use crate::{circular_chief, eme2000, init_logger, mean_motion, LEO_RADIUS_M};

const T0: f64 = 100.0;

fn config(model: ModelKind) -> PredictorConfig {
    PredictorConfig::builder()
        .horizon(Unit::Minute * 1)
        .cadence(Unit::Second * 1)
        .model(model)
        .build()
}

/// Chief on a circular orbit whose state at T0 is the one of `circular_chief`
fn two_body_chief() -> TwoBodyChiefProvider {
    let chief = circular_chief(T0);
    TwoBodyChiefProvider::new(Some(eme2000()), EARTH_MU_M3_S2, T0, chief.r_i, chief.v_i)
}

/// Deputies at a given RIC offset from the chief at T0, co-moving with the RIC frame
fn deputies(offsets: &[(u64, Vector3<f64>)]) -> CartesianVehicleProvider {
    let chief = circular_chief(T0);
    let frame = construct_ric_from_chief(&chief);
    let mut prov = CartesianVehicleProvider::current(eme2000());
    for (id, r_ric) in offsets {
        let state = ric_to_inertial_relative(
            r_ric,
            &Vector3::zeros(),
            &chief.r_i,
            &chief.v_i,
            &frame.c_from_ric_to_inertial,
            &frame.omega_ric,
        );
        prov.set_current(*id, T0, state.r, state.v);
    }
    prov
}

#[fixture]
fn offsets() -> Vec<(u64, Vector3<f64>)> {
    vec![
        (11, Vector3::new(100.0, 0.0, 0.0)),
        (22, Vector3::new(0.0, -250.0, 10.0)),
    ]
}

#[rstest]
fn end_to_end_hcw(offsets: Vec<(u64, Vector3<f64>)>) {
    init_logger();
    let mut predictor = RelativePredictor::new(
        two_body_chief(),
        None::<NoAdoptedFrame>,
        deputies(&offsets),
        config(ModelKind::Hcw),
    )
    .unwrap();

    for (id, _) in &offsets {
        predictor.registry_mut().register(*id).unwrap();
    }
    // Registered but never fed
    predictor.registry_mut().register(33).unwrap();

    assert_eq!(predictor.step(T0), Ok(1));

    let buf = predictor.latest();
    assert_eq!(buf.seqno, 1);
    assert_eq!(buf.t0, T0);
    assert_eq!(buf.steps, 61);
    assert!(buf.trajectory(2).is_none());

    let hcw = Hcw::new(mean_motion(LEO_RADIUS_M));
    let grid = predictor.grid().clone();
    for (idx, (_, r_ric)) in offsets.iter().enumerate() {
        let traj = buf.trajectory(idx).unwrap();
        assert_eq!(traj.len(), 61);
        assert_abs_diff_eq!(traj[0], *r_ric, epsilon = 1e-6);

        let mut expected = vec![Vector3::zeros(); grid.len()];
        hcw.predict(&RelStateRic::new(*r_ric, Vector3::zeros()), &grid, &mut expected, None)
            .unwrap();
        for (got, want) in traj.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
        }
    }
}

#[rstest]
fn eccentric_model_agrees_on_circular_chief(offsets: Vec<(u64, Vector3<f64>)>) {
    init_logger();
    let mut by_model = Vec::new();
    for model in [ModelKind::Hcw, ModelKind::earth_eccentric()] {
        let mut predictor = RelativePredictor::new(
            two_body_chief(),
            None::<NoAdoptedFrame>,
            deputies(&offsets),
            config(model),
        )
        .unwrap();
        for (id, _) in &offsets {
            predictor.registry_mut().register(*id).unwrap();
        }
        predictor.step(T0).unwrap();
        by_model.push(predictor.latest().clone());
    }

    for idx in 0..offsets.len() {
        let hcw = by_model[0].trajectory(idx).unwrap();
        let ecc = by_model[1].trajectory(idx).unwrap();
        for (a, b) in hcw.iter().zip(ecc.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 5e-3);
        }
    }
}

#[rstest]
fn fail_fast_does_not_publish(offsets: Vec<(u64, Vector3<f64>)>) {
    init_logger();
    let chief = circular_chief(T0);
    let mut chief_prov = CartesianChiefProvider::current(eme2000());
    chief_prov.set_current(T0, chief.r_i, chief.v_i);

    let mut predictor = RelativePredictor::new(
        chief_prov,
        None::<NoAdoptedFrame>,
        deputies(&offsets),
        config(ModelKind::Hcw),
    )
    .unwrap();
    predictor.registry_mut().register(11).unwrap();

    assert_eq!(predictor.step(T0), Ok(1));
    assert_eq!(
        predictor.step(T0 + 1.0),
        Err(PredictorError::ChiefUnavailable {
            t0: T0 + 1.0,
            status: ProviderCode::TimeMissing
        })
    );
    assert_eq!(predictor.publisher().published_seqno(), 1);
    assert_eq!(predictor.latest().t0, T0);

    // The chief is fed but the deputy is stale: the tick is published without it
    predictor
        .frame_mut()
        .chief_provider_mut()
        .set_current(T0 + 1.0, chief.r_i, chief.v_i);
    assert_eq!(predictor.step(T0 + 1.0), Ok(2));
    assert!(predictor.latest().trajectory(0).is_none());

    predictor
        .vehicle_provider_mut()
        .set_current(11, T0 + 1.0, chief.r_i + Vector3::new(10.0, 0.0, 0.0), chief.v_i);
    assert_eq!(predictor.step(T0 + 1.0), Ok(3));
    assert!(predictor.latest().trajectory(0).is_some());
}

#[rstest]
fn adopted_frame_policies(offsets: Vec<(u64, Vector3<f64>)>) {
    init_logger();
    for (policy, expected) in [
        (OnAdoptedInvalid::FallbackConstructedDegraded, Ok(1)),
        (
            OnAdoptedInvalid::AbortTick,
            Err(PredictorError::FrameUnavailable {
                t0: T0,
                status: ProviderCode::InvalidInput,
            }),
        ),
    ] {
        // Never fed, so always time missing
        let frames = CartesianFrameProvider::current("nav_filter".into());
        let mut cfg = config(ModelKind::Hcw);
        cfg.on_adopted_invalid = policy;

        let mut predictor =
            RelativePredictor::new(two_body_chief(), Some(frames), deputies(&offsets), cfg).unwrap();
        predictor.registry_mut().register(11).unwrap();
        assert_eq!(predictor.step(T0), expected);
    }
}

#[rstest]
fn adopted_frame_is_used(offsets: Vec<(u64, Vector3<f64>)>) {
    init_logger();
    let chief = circular_chief(T0);
    let constructed = construct_ric_from_chief(&chief);
    let mut frames = CartesianFrameProvider::current("nav_filter".into());
    frames.set_current(T0, chief.r_i, constructed.c_from_ric_to_inertial);
    frames.set_current_omega_ric(constructed.omega_ric);

    let mut cfg = config(ModelKind::Hcw);
    cfg.on_adopted_invalid = OnAdoptedInvalid::AbortTick;
    let mut predictor = RelativePredictor::new(two_body_chief(), Some(frames), deputies(&offsets), cfg).unwrap();
    predictor.registry_mut().register(11).unwrap();

    assert_eq!(predictor.step(T0), Ok(1));
    assert_abs_diff_eq!(
        predictor.latest().trajectory(0).unwrap()[0],
        offsets[0].1,
        epsilon = 1e-6
    );
}

#[rstest]
fn injected_model(offsets: Vec<(u64, Vector3<f64>)>) {
    init_logger();
    let mut predictor = RelativePredictor::new(
        two_body_chief(),
        None::<NoAdoptedFrame>,
        deputies(&offsets),
        config(ModelKind::Hcw),
    )
    .unwrap();
    predictor.registry_mut().register(22).unwrap();

    // A much faster reference orbit gives a different prediction
    let fast = Hcw::new(10.0 * mean_motion(LEO_RADIUS_M));
    assert_eq!(predictor.step_with_model(T0, &fast), Ok(1));
    let with_fast = predictor.latest().trajectory(0).unwrap().to_vec();
    assert_eq!(predictor.step(T0), Ok(2));
    let nominal = predictor.latest().trajectory(0).unwrap();
    assert_abs_diff_eq!(with_fast[0], nominal[0], epsilon = 1e-9);
    assert!((with_fast[60] - nominal[60]).norm() > 1.0);
}

#[test]
fn grid_must_fit_buffers() {
    let cfg = PredictorConfig::builder()
        .horizon(Unit::Second * (MAX_STEPS as i64))
        .cadence(Unit::Second * 1)
        .build();
    assert!(RelativePredictor::new(
        two_body_chief(),
        None::<NoAdoptedFrame>,
        deputies(&[]),
        cfg
    )
    .is_err());
}

#[test]
fn deterministic_ticks() {
    let offsets = [(5, Vector3::new(30.0, 40.0, -5.0))];
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let mut predictor = RelativePredictor::new(
            two_body_chief(),
            None::<NoAdoptedFrame>,
            deputies(&offsets),
            config(ModelKind::earth_eccentric()),
        )
        .unwrap();
        predictor.registry_mut().register(5).unwrap();
        predictor.step(T0).unwrap();
        outputs.push(predictor.latest().trajectory(0).unwrap().to_vec());
    }
    assert_eq!(outputs[0], outputs[1]);
}
