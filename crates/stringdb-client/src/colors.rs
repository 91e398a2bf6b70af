//! Sequential color ramps for node halos
//!
//! The 9-class ColorBrewer `Reds` and `Blues` schemes, linearly interpolated.

/// Color ramp used for a group of annotation values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Reds,
    Blues,
}

const REDS: [[u8; 3]; 9] = [
    [0xff, 0xf5, 0xf0],
    [0xfe, 0xe0, 0xd2],
    [0xfc, 0xbb, 0xa1],
    [0xfc, 0x92, 0x72],
    [0xfb, 0x6a, 0x4a],
    [0xef, 0x3b, 0x2c],
    [0xcb, 0x18, 0x1d],
    [0xa5, 0x0f, 0x15],
    [0x67, 0x00, 0x0d],
];

const BLUES: [[u8; 3]; 9] = [
    [0xf7, 0xfb, 0xff],
    [0xde, 0xeb, 0xf7],
    [0xc6, 0xdb, 0xef],
    [0x9e, 0xca, 0xe1],
    [0x6b, 0xae, 0xd6],
    [0x42, 0x92, 0xc6],
    [0x21, 0x71, 0xb5],
    [0x08, 0x51, 0x9c],
    [0x08, 0x30, 0x6b],
];

impl Ramp {
    fn stops(&self) -> &'static [[u8; 3]; 9] {
        match self {
            Ramp::Reds => &REDS,
            Ramp::Blues => &BLUES,
        }
    }

    /// `#rrggbb` at position `x`, clamped to `[0, 1]`
    pub fn hex(&self, x: f64) -> String {
        let stops = self.stops();
        let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = x * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let t = scaled - lower as f64;

        let channel = |i: usize| {
            let a = f64::from(stops[lower][i]);
            let b = f64::from(stops[lower + 1][i]);
            (a + (b - a) * t).round() as u8
        };
        format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
    }
}

/// Ramp positions for one group of values.
///
/// Each value becomes `exp(v) / exp(max)`, then the group is stretched over
/// the full ramp. A group without spread maps to the ramp start.
pub fn ramp_positions(values: &[f64]) -> Vec<f64> {
    let Some(max) = values.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };
    let norm: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let low = norm.iter().copied().fold(f64::INFINITY, f64::min);
    let high = norm.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if high - low <= f64::EPSILON {
        return vec![0.0; norm.len()];
    }
    norm.iter().map(|n| (n - low) / (high - low)).collect()
}
