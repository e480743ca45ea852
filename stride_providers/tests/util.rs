use rstest::rstest;
use stride_providers::util::{EARTH_RADIUS_M, XorShift32, offset};

#[test]
fn xorshift_is_deterministic_and_in_range() {
    let mut a = XorShift32::new(7);
    let mut b = XorShift32::new(7);
    for _ in 0..1_000 {
        let x = a.next_f64();
        assert_eq!(x, b.next_f64());
        assert!((0.0..1.0).contains(&x));
    }
}

#[test]
fn zero_seed_does_not_stick() {
    let mut r = XorShift32::new(0);
    assert_ne!(r.next_u32(), 0);
}

#[rstest]
#[case(0.0)]
#[case(90.0)]
#[case(225.0)]
fn offset_moves_requested_distance(#[case] bearing: f64) {
    let (lat, lon) = offset(10.0, 20.0, 100.0, bearing);
    // Equirectangular distance back to the origin.
    let x = (lon - 20.0).to_radians() * ((lat + 10.0) / 2.0).to_radians().cos();
    let y = (lat - 10.0).to_radians();
    let d = (x * x + y * y).sqrt() * EARTH_RADIUS_M;
    assert!((d - 100.0).abs() < 0.1, "d={d}");
}
