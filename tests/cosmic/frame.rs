use bullseye::cosmic::*;
use bullseye::linalg::Vector3;
use bullseye::providers::{AdoptedFrameProvider, CartesianChiefProvider, CartesianFrameProvider};
use bullseye::utils::{handedness_error, orthonormality_error};
use rstest::*;

use crate::{circular_chief, eccentric_chief, eme2000, init_logger};

/// Adopted frame provider returning the same frame at every requested time.
struct FixedFrame(AdoptedRicFrame);

impl AdoptedFrameProvider for FixedFrame {
    fn get(&mut self, t0: f64) -> AdoptedRicFrame {
        AdoptedRicFrame {
            time_tag: t0,
            ..self.0.clone()
        }
    }
}

fn frame_matching(chief: &ChiefState) -> AdoptedRicFrame {
    let constructed = construct_ric_from_chief(chief);
    AdoptedRicFrame {
        time_tag: chief.time_tag,
        origin_i: chief.r_i,
        c_from_ric_to_inertial: constructed.c_from_ric_to_inertial,
        has_omega: true,
        omega_ric: constructed.omega_ric,
        omega_coords: OmegaCoords::Ric,
        frame_kind: FrameKind::BullseyeRic,
        axis_order: AxisOrder::Ric,
        frame_source_id: Some("nav_filter".into()),
        status: ProviderCode::Ok,
    }
}

fn chief_provider(chief: &ChiefState) -> CartesianChiefProvider {
    let mut prov = CartesianChiefProvider::current(eme2000());
    prov.set_current(chief.time_tag, chief.r_i, chief.v_i);
    prov
}

#[rstest]
#[case::circular(circular_chief(0.0))]
#[case::eccentric(eccentric_chief(0.0))]
#[case::retrograde(ChiefState::new(
    0.0,
    Vector3::new(-4_000e3, 5_000e3, 1_000e3),
    Vector3::new(5.0e3, 4.0e3, -1.5e3),
    eme2000()
))]
#[case::hyperbolic(ChiefState::new(
    0.0,
    Vector3::new(7_000e3, 0.0, 0.0),
    Vector3::new(0.0, 12.0e3, 3.0e3),
    eme2000()
))]
fn constructed_frame_is_a_rotation(#[case] chief: ChiefState) {
    let frame = construct_ric_from_chief(&chief);
    assert!(frame.ok());

    let c = frame.c_from_ric_to_inertial;
    assert!(orthonormality_error(&c) < DCM_ORTHONORMALITY_TOL);
    assert!(handedness_error(&c) < DETERMINANT_ONE_TOL);

    // R along the position, C along the angular momentum
    let e_r = c.column(0).into_owned();
    let e_c = c.column(2).into_owned();
    assert!((e_r - chief.r_i.normalize()).norm() < 1e-14);
    assert!((e_c - chief.r_i.cross(&chief.v_i).normalize()).norm() < 1e-14);
    // In-track has a positive projection on the velocity
    assert!(c.column(1).dot(&chief.v_i) > 0.0);

    assert!(frame.has_omega);
    assert_eq!(frame.omega_coords, OmegaCoords::Ric);
    let expected_rate = chief.r_i.cross(&chief.v_i).norm() / chief.r_i.norm_squared();
    assert_eq!(frame.omega_ric.x, 0.0);
    assert_eq!(frame.omega_ric.y, 0.0);
    assert!((frame.omega_ric.z - expected_rate).abs() < 1e-15);
}

#[rstest]
#[case::radial_velocity(
    Vector3::new(7_000e3, 0.0, 0.0),
    Vector3::new(7.5e3, 0.0, 0.0),
    ProviderCode::NotAvailable
)]
#[case::tiny_radius(Vector3::new(0.5, 0.0, 0.0), Vector3::new(0.0, 7.5e3, 0.0), ProviderCode::NotAvailable)]
#[case::at_rest(Vector3::new(7_000e3, 0.0, 0.0), Vector3::zeros(), ProviderCode::NotAvailable)]
#[case::nan(
    Vector3::new(f64::NAN, 0.0, 0.0),
    Vector3::new(0.0, 7.5e3, 0.0),
    ProviderCode::InvalidInput
)]
fn degenerate_chief(#[case] r: Vector3<f64>, #[case] v: Vector3<f64>, #[case] expected: ProviderCode) {
    let frame = construct_ric_from_chief(&ChiefState::new(3.0, r, v, eme2000()));
    assert_eq!(frame.status, expected);
    assert!(!frame.has_omega);
    assert_eq!(frame.time_tag, 3.0);
}

#[test]
fn failed_chief_is_not_available() {
    let frame = construct_ric_from_chief(&ChiefState::failed(ProviderCode::TimeMissing, Some(eme2000())));
    assert_eq!(frame.status, ProviderCode::NotAvailable);
}

#[test]
fn constructed_only_ignores_adopted() {
    init_logger();
    let chief = circular_chief(10.0);
    let mut bullseye = BullseyeFrame::new(
        chief_provider(&chief),
        Some(FixedFrame(frame_matching(&chief))),
        BullseyeFrameMode::ConstructedOnly,
        OnAdoptedInvalid::AbortTick,
        FrameValidationTolerances::default(),
    );

    let snapshot = bullseye.update(10.0);
    assert!(snapshot.ok());
    assert!(!snapshot.used_adopted);
    assert!(!snapshot.degraded.any());
    assert_eq!(snapshot.inertial_frame_id, Some(eme2000()));
    assert_eq!(snapshot.time_tag, 10.0);
}

#[test]
fn valid_adopted_frame_is_used() {
    init_logger();
    let chief = eccentric_chief(10.0);
    let mut bullseye = BullseyeFrame::new(
        chief_provider(&chief),
        Some(FixedFrame(frame_matching(&chief))),
        BullseyeFrameMode::AdoptedPreferred,
        OnAdoptedInvalid::AbortTick,
        FrameValidationTolerances::default(),
    );

    let (state, snapshot) = bullseye.update_with_chief(10.0);
    assert_eq!(state, chief);
    assert!(snapshot.ok());
    assert!(snapshot.used_adopted);
    assert!(!snapshot.degraded.any());
    assert_eq!(snapshot.adopted_frame_source_id, Some("nav_filter".into()));
}

#[rstest]
fn invalid_axis_order_falls_back() {
    init_logger();
    let chief = circular_chief(10.0);
    let mut adopted = frame_matching(&chief);
    adopted.axis_order = AxisOrder::Unspecified;

    let mut bullseye = BullseyeFrame::new(
        chief_provider(&chief),
        Some(FixedFrame(adopted)),
        BullseyeFrameMode::AdoptedPreferred,
        OnAdoptedInvalid::FallbackConstructedDegraded,
        FrameValidationTolerances::default(),
    );

    let snapshot = bullseye.update(10.0);
    assert!(snapshot.ok());
    assert!(!snapshot.used_adopted);
    assert!(snapshot.degraded.any());
    assert!(snapshot.degraded.contains(DegradeReason::ADOPTED_INVALID));
    assert!(!snapshot.degraded.contains(DegradeReason::DEGENERATE_CHIEF));
    assert_eq!(
        snapshot.c_from_ric_to_inertial,
        construct_ric_from_chief(&chief).c_from_ric_to_inertial
    );
}

#[test]
fn invalid_adopted_frame_and_degenerate_chief() {
    init_logger();
    // Purely radial velocity: no angular momentum
    let chief = ChiefState::new(
        10.0,
        Vector3::new(7_000e3, 0.0, 0.0),
        Vector3::new(-100.0, 0.0, 0.0),
        eme2000(),
    );
    let adopted = AdoptedRicFrame {
        time_tag: 10.0,
        origin_i: chief.r_i,
        frame_kind: FrameKind::BullseyeRic,
        axis_order: AxisOrder::Unspecified,
        ..Default::default()
    };

    let mut bullseye = BullseyeFrame::new(
        chief_provider(&chief),
        Some(FixedFrame(adopted)),
        BullseyeFrameMode::AdoptedPreferred,
        OnAdoptedInvalid::FallbackConstructedDegraded,
        FrameValidationTolerances::default(),
    );

    let snapshot = bullseye.update(10.0);
    assert!(!snapshot.ok());
    assert_eq!(snapshot.status, ProviderCode::NotAvailable);
    assert!(!snapshot.used_adopted);
    assert_eq!(
        snapshot.degraded,
        DegradeReason::ADOPTED_INVALID | DegradeReason::DEGENERATE_CHIEF
    );
}

#[test]
fn invalid_adopted_frame_aborts() {
    init_logger();
    let chief = circular_chief(10.0);
    let mut adopted = frame_matching(&chief);
    adopted.origin_i += Vector3::new(1.0, 0.0, 0.0);

    let mut bullseye = BullseyeFrame::new(
        chief_provider(&chief),
        Some(FixedFrame(adopted)),
        BullseyeFrameMode::AdoptedPreferred,
        OnAdoptedInvalid::AbortTick,
        FrameValidationTolerances::default(),
    );

    let snapshot = bullseye.update(10.0);
    assert!(!snapshot.ok());
    assert_eq!(snapshot.status, ProviderCode::InvalidInput);
    assert!(!snapshot.used_adopted);
}

#[test]
fn adopted_frame_at_another_time() {
    init_logger();
    let chief = circular_chief(10.0);
    let mut frames = CartesianFrameProvider::current("nav_filter".into());
    let constructed = construct_ric_from_chief(&chief);
    frames.set_current(9.0, chief.r_i, constructed.c_from_ric_to_inertial);

    let mut bullseye = BullseyeFrame::new(
        chief_provider(&chief),
        Some(frames),
        BullseyeFrameMode::AdoptedPreferred,
        OnAdoptedInvalid::FallbackConstructedDegraded,
        FrameValidationTolerances::default(),
    );

    let snapshot = bullseye.update(10.0);
    assert!(snapshot.ok());
    assert!(!snapshot.used_adopted);
    assert!(snapshot.degraded.contains(DegradeReason::ADOPTED_INVALID));

    // Now feed the frame at the right time
    bullseye
        .adopted_provider_mut()
        .unwrap()
        .set_current(10.0, chief.r_i, constructed.c_from_ric_to_inertial);
    let snapshot = bullseye.update(10.0);
    assert!(snapshot.used_adopted);
    // No angular rate declared by the adopted frame
    assert!(!snapshot.has_omega);
}

#[test]
fn chief_time_missing_fails_snapshot() {
    init_logger();
    let mut bullseye = BullseyeFrame::constructed_only(chief_provider(&circular_chief(10.0)));
    let snapshot = bullseye.update(11.0);
    assert!(!snapshot.ok());
    assert_eq!(snapshot.status, ProviderCode::TimeMissing);
}

#[test]
fn degenerate_chief_is_flagged() {
    init_logger();
    let chief = ChiefState::new(
        1.0,
        Vector3::new(7_000e3, 0.0, 0.0),
        Vector3::new(-100.0, 0.0, 0.0),
        eme2000(),
    );
    let mut bullseye = BullseyeFrame::constructed_only(chief_provider(&chief));
    let snapshot = bullseye.update(1.0);
    assert_eq!(snapshot.status, ProviderCode::NotAvailable);
    assert!(snapshot.degraded.contains(DegradeReason::DEGENERATE_CHIEF));
}
