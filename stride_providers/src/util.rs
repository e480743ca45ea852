/// Mean Earth radius used to turn meters into degrees, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Small deterministic PRNG (xorshift32). Not for cryptographic use.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// A zero seed would lock the generator at zero, so it is remapped.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform in [lo, hi).
    #[inline]
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Move `meters` from (`lat`, `lon`) along `bearing_deg` on a spherical Earth.
///
/// Uses the flat-Earth approximation, which is plenty for run-scale offsets.
pub fn offset(lat: f64, lon: f64, meters: f64, bearing_deg: f64) -> (f64, f64) {
    let b = bearing_deg.to_radians();
    let dlat = (meters * b.cos() / EARTH_RADIUS_M).to_degrees();
    let cos_lat = lat.to_radians().cos().abs().max(1e-9);
    let dlon = (meters * b.sin() / (EARTH_RADIUS_M * cos_lat)).to_degrees();
    (lat + dlat, lon + dlon)
}
