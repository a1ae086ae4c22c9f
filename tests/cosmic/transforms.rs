use bullseye::cosmic::*;
use bullseye::linalg::Vector3;
use rstest::*;

use crate::{circular_chief, eccentric_chief};

#[rstest]
#[case::circular_radial(circular_chief(0.0), Vector3::new(100.0, 0.0, 0.0), Vector3::new(0.0, -0.2, 0.0))]
#[case::circular_mixed(circular_chief(0.0), Vector3::new(-35.0, 1_200.0, 8.5), Vector3::new(0.01, -0.3, 0.05))]
#[case::eccentric_far(eccentric_chief(0.0), Vector3::new(12_000.0, -40_000.0, 3_000.0), Vector3::new(-5.0, 2.0, 1.0))]
#[case::eccentric_close(eccentric_chief(0.0), Vector3::new(0.5, 0.25, -0.1), Vector3::new(1e-4, 0.0, -2e-4))]
fn round_trip(#[case] chief: ChiefState, #[case] dr_i: Vector3<f64>, #[case] dv_i: Vector3<f64>) {
    let frame = construct_ric_from_chief(&chief);
    assert!(frame.ok());

    let deputy_r = chief.r_i + dr_i;
    let deputy_v = chief.v_i + dv_i;

    let rel = inertial_to_ric_relative(
        &deputy_r,
        &deputy_v,
        &chief.r_i,
        &chief.v_i,
        &frame.c_from_inertial_to_ric(),
        &frame.omega_ric,
    );
    let back = ric_to_inertial_relative(
        &rel.r,
        &rel.v,
        &chief.r_i,
        &chief.v_i,
        &frame.c_from_ric_to_inertial,
        &frame.omega_ric,
    );

    assert!((back.r - deputy_r).norm() <= 1e-12 * deputy_r.norm());
    assert!((back.v - deputy_v).norm() <= 1e-12 * deputy_v.norm());
    // A rotation preserves the separation
    assert!((rel.r.norm() - dr_i.norm()).abs() <= 1e-12 * dr_i.norm());
}

#[test]
fn co_rotating_deputy_has_no_relative_velocity() {
    let chief = eccentric_chief(0.0);
    let frame = construct_ric_from_chief(&chief);
    let r_ric = Vector3::new(50.0, -120.0, 30.0);

    // Deputy rigidly attached to the rotating frame
    let dr_i = frame.c_from_ric_to_inertial * r_ric;
    let dv_i = frame.c_from_ric_to_inertial * frame.omega_ric.cross(&r_ric);

    let rel = inertial_to_ric_relative(
        &(chief.r_i + dr_i),
        &(chief.v_i + dv_i),
        &chief.r_i,
        &chief.v_i,
        &frame.c_from_inertial_to_ric(),
        &frame.omega_ric,
    );

    assert!((rel.r - r_ric).norm() < 1e-8);
    assert!(rel.v.norm() < 1e-10, "{}", rel.v.norm());
}

#[test]
fn chief_maps_to_origin() {
    let chief = circular_chief(0.0);
    let frame = construct_ric_from_chief(&chief);
    let rel = inertial_to_ric_relative(
        &chief.r_i,
        &chief.v_i,
        &chief.r_i,
        &chief.v_i,
        &frame.c_from_inertial_to_ric(),
        &frame.omega_ric,
    );
    assert_eq!(rel.r, Vector3::zeros());
    assert_eq!(rel.v, Vector3::zeros());
}
