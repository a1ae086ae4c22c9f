use bullseye::io::{Publisher, MAX_STEPS, MAX_VEHICLES};
use bullseye::linalg::Vector3;

use crate::init_logger;

#[test]
fn seqno_is_monotonic() {
    init_logger();
    let mut publisher = Publisher::new();
    assert_eq!(publisher.published_seqno(), 0);

    let mut last = 0;
    for tick in 0..5 {
        let t0 = f64::from(tick) * 0.5;
        let buf = publisher.begin_write();
        buf.reset(t0, 3);
        buf.row_mut(tick as usize)[0] = Vector3::new(f64::from(tick), 0.0, 0.0);
        buf.valid[tick as usize] = true;

        let seqno = publisher.publish(t0);
        assert_eq!(seqno, last + 1);
        last = seqno;

        let front = publisher.read();
        assert_eq!(front.seqno, seqno);
        assert_eq!(front.t0, t0);
        assert_eq!(front.steps, 3);
        assert_eq!(front.trajectory(tick as usize).unwrap()[0].x, f64::from(tick));
    }
    assert_eq!(publisher.published_seqno(), 5);
}

#[test]
fn back_buffer_is_not_visible() {
    let mut publisher = Publisher::new();
    publisher.begin_write().row_mut(0)[0] = Vector3::new(1.0, 2.0, 3.0);
    publisher.publish(10.0);

    publisher.begin_write().row_mut(0)[0] = Vector3::new(4.0, 5.0, 6.0);
    assert_eq!(publisher.read().row(0)[0], Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(publisher.read().t0, 10.0);

    publisher.publish(20.0);
    assert_eq!(publisher.read().row(0)[0], Vector3::new(4.0, 5.0, 6.0));
}

#[test]
fn buffer_layout() {
    let mut publisher = Publisher::new();
    let buf = publisher.begin_write();
    assert!(MAX_STEPS >= 61);
    assert_eq!(buf.row(MAX_VEHICLES - 1).len(), MAX_STEPS);
    buf.reset(0.0, MAX_STEPS + 10);
    assert_eq!(buf.steps, MAX_STEPS);
}
