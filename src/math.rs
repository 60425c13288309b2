//! Small numeric helpers shared by the oscillators and detectors.
//!
//! Everything here is a pure function over `f32` with no state and no
//! allocation, safe to call from the audio thread.

/// Linear interpolation between `a` and `b`.
///
/// `t` is the fractional position in [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Four-point cubic (Catmull-Rom style) interpolation.
///
/// Interpolates between `y1` and `y2` with `y0`/`y3` as outer support
/// points. `t` is the fractional position between `y1` and `y2`.
#[inline]
pub fn cubic_interp(y0: f32, y1: f32, y2: f32, y3: f32, t: f32) -> f32 {
    let c0 = y1;
    let c1 = 0.5 * (y2 - y0);
    let c2 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let c3 = 0.5 * (y3 - y0) + 1.5 * (y1 - y2);
    ((c3 * t + c2) * t + c1) * t + c0
}

/// Clips `x` into `[lo, hi]`.
#[inline]
pub fn clip(lo: f32, x: f32, hi: f32) -> f32 {
    x.clamp(lo, hi)
}

/// Cheap rational approximation of `tanh`.
///
/// Accurate to a few thousandths over roughly [-4.5, 4.5] and clamped to
/// ±1 outside, which is plenty for waveshaping duty.
#[inline]
pub fn fast_tanh(x: f32) -> f32 {
    if x < -4.5 {
        return -1.0;
    }
    if x > 4.5 {
        return 1.0;
    }
    let x2 = x * x;
    let num = x * (135_135.0 + x2 * (17_325.0 + x2 * (378.0 + x2)));
    let den = 135_135.0 + x2 * (62_370.0 + x2 * (3_150.0 + x2 * 28.0));
    num / den
}

/// Polynomial waveshaper with a `drive` control.
///
/// A smooth saturating curve (the shape used by the neuron oscillator's
/// third output mode). Input is prescaled by 2, clipped to ±√8, and run
/// through a cubic soft clipper whose output level tracks `drive`. The
/// curve is deliberately not odd: the small even term adds second-harmonic
/// color, and callers that care remove the resulting DC downstream.
#[inline]
pub fn drive_shape(input: f32, drive: f32) -> f32 {
    const SQRT8: f32 = 2.828_427_1;
    const WSCALE: f32 = 1.306_12;

    let fx = input * 2.0;
    let xc = clip(-SQRT8, fx, SQRT8);
    let xc2 = xc * xc;
    let c = 0.5 * fx * (3.0 - xc2);
    let xc4 = xc2 * xc2;
    let w = (1.0 - xc2 * 0.25 + xc4 * 0.015_625) * WSCALE;
    let out = w * (c + 0.05 * xc2) * (drive + 0.75);
    out * 2.0
}
