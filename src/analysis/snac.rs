//! SNAC period estimator (special normalized autocorrelation).

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::arena::{Arena, ArenaBuf};
use crate::error::{Error, Result};
use crate::ring::RingBuffer;

/// Default analysis frame length in samples.
pub const SNAC_FRAME_SIZE: usize = 1024;

/// Fraction of the frame searched for period candidates.
const SEEK: f32 = 0.85;

/// Default bias slope favoring shorter lags over subharmonics.
const DEF_BIAS: f32 = 0.2;

/// Default RMS floor below which a frame is treated as unvoiced.
const DEF_MIN_RMS: f32 = 0.003;

/// Largest supported overlap factor.
const MAX_OVERLAP: usize = 32;

/// Near-equal tolerance for the smallest-lag tie-break.
const TIE_TOLERANCE: f32 = 1e-6;

/// A normalized-autocorrelation period estimator.
///
/// Samples stream in through [`Snac::io_samples`]; once per hop (frame
/// size over the overlap factor) the estimator autocorrelates the most
/// recent frame, normalizes each lag by the energy actually present at
/// that lag, and picks the peak. Normalization keeps the score in [-1, 1]
/// regardless of level, so the peak height doubles as a confidence
/// measure: [`Snac::fidelity`] near 1.0 means strongly periodic input,
/// near 0.0 means noise or silence.
///
/// Two details matter for pitch duty. A downward bias ramp over lag makes
/// the fundamental win against its subharmonics, which score almost as
/// high; and among near-equal peaks the smallest lag is kept, for the
/// same reason. The winning lag is refined by parabolic interpolation to
/// sub-sample precision.
///
/// Frames below the RMS floor set fidelity to zero and leave the last
/// period estimate untouched.
///
/// # Examples
///
/// ```
/// use overtone::analysis::Snac;
///
/// let mut snac = Snac::new(1024).unwrap();
/// let signal: Vec<f32> = (0..4096)
///     .map(|i| (std::f32::consts::TAU * 220.0 * i as f32 / 44_100.0).sin())
///     .collect();
/// snac.io_samples(&signal);
/// assert!((snac.period() - 44_100.0 / 220.0).abs() < 2.0);
/// ```
pub struct Snac {
    input: RingBuffer,
    framesize: usize,
    /// Samples consumed since the last analysis.
    timeindex: usize,
    /// Analyses per frame; hop = framesize / overlap.
    overlap: usize,
    bias: f32,
    min_rms: f32,
    /// Latest period estimate in samples (sub-sample precision).
    periodlength: f32,
    /// Peak normalized autocorrelation of the latest voiced frame.
    fidelity: f32,

    // Preplanned transforms and preallocated scratch; analysis allocates
    // nothing.
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    fft_buf: Vec<Complex<f32>>,
    fft_scratch: Vec<Complex<f32>>,
    frame: ArenaBuf,
    nac: ArenaBuf,
    biasbuf: ArenaBuf,
}

impl Snac {
    /// Creates an estimator with its own storage. `framesize` must be a
    /// power of two of at least 64 samples.
    pub fn new(framesize: usize) -> Result<Self> {
        let mut arena = Arena::new(3 * framesize);
        Self::new_in(framesize, &mut arena)
    }

    /// Creates an estimator whose analysis buffers are drawn from `arena`
    /// (3 x `framesize` samples). `framesize` must be a power of two of at
    /// least 64 samples.
    pub fn new_in(framesize: usize, arena: &mut Arena) -> Result<Self> {
        if framesize < 64 || !framesize.is_power_of_two() {
            return Err(Error::InvalidArgument(
                "SNAC frame size must be a power of two of at least 64",
            ));
        }

        let mut planner = FftPlanner::new();
        // Zero-padded to 2N so the circular autocorrelation is linear.
        let fft = planner.plan_fft_forward(2 * framesize);
        let ifft = planner.plan_fft_inverse(2 * framesize);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());

        let frame = arena.allocate(framesize)?;
        let nac = arena.allocate(framesize)?;
        let biasbuf = arena.allocate(framesize)?;

        let mut snac = Self {
            input: RingBuffer::new(framesize),
            framesize,
            timeindex: 0,
            overlap: 1,
            bias: DEF_BIAS,
            min_rms: DEF_MIN_RMS,
            periodlength: 0.0,
            fidelity: 0.0,
            fft,
            ifft,
            fft_buf: vec![Complex::new(0.0, 0.0); 2 * framesize],
            fft_scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            frame,
            nac,
            biasbuf,
        };
        snac.rebuild_bias();
        Ok(snac)
    }

    /// Feeds a block of samples, running one analysis per completed hop.
    pub fn io_samples(&mut self, block: &[f32]) {
        let hop = self.framesize / self.overlap;
        for &x in block {
            self.input.push(x);
            self.timeindex += 1;
            if self.timeindex >= hop {
                self.timeindex = 0;
                if self.input.len() == self.framesize {
                    self.analyze();
                }
            }
        }
    }

    /// Latest period estimate in samples. Zero until the first voiced
    /// frame has been analyzed.
    pub fn period(&self) -> f32 {
        self.periodlength
    }

    /// Confidence of the latest analysis in [0, 1].
    pub fn fidelity(&self) -> f32 {
        self.fidelity
    }

    /// Frame length in samples.
    pub fn frame_size(&self) -> usize {
        self.framesize
    }

    /// Sets the overlap factor. It must be between 1 and 32 and divide the
    /// frame size; otherwise the request is rejected and the previous
    /// overlap kept.
    pub fn set_overlap(&mut self, overlap: usize) -> Result<()> {
        if overlap == 0 || overlap > MAX_OVERLAP || self.framesize % overlap != 0 {
            return Err(Error::InvalidArgument(
                "overlap must be in 1..=32 and divide the frame size",
            ));
        }
        self.overlap = overlap;
        Ok(())
    }

    /// Sets the lag bias slope in [0, 1]. Out-of-range values are rejected
    /// and the previous bias kept.
    pub fn set_bias(&mut self, bias: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(Error::OutOfRange {
                param: "SNAC bias",
                min: 0.0,
                max: 1.0,
                value: bias,
            });
        }
        self.bias = bias;
        self.rebuild_bias();
        Ok(())
    }

    /// Sets the unvoiced RMS floor in [0, 1]. Out-of-range values are
    /// rejected and the previous floor kept.
    pub fn set_min_rms(&mut self, min_rms: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&min_rms) {
            return Err(Error::OutOfRange {
                param: "SNAC minimum RMS",
                min: 0.0,
                max: 1.0,
                value: min_rms,
            });
        }
        self.min_rms = min_rms;
        Ok(())
    }

    /// Clears the input history and the estimate.
    pub fn reset(&mut self) {
        self.input.reset();
        self.timeindex = 0;
        self.periodlength = 0.0;
        self.fidelity = 0.0;
    }

    fn rebuild_bias(&mut self) {
        let n = self.framesize as f32;
        for (tau, b) in self.biasbuf.iter_mut().enumerate() {
            *b = 1.0 - self.bias * tau as f32 / n;
        }
    }

    fn analyze(&mut self) {
        let n = self.framesize;
        self.input.copy_latest(&mut self.frame);

        // Autocorrelation by FFT: r(tau) = IFFT(|FFT(x)|^2), zero-padded
        // to avoid circular wrap.
        for (slot, &x) in self.fft_buf.iter_mut().zip(self.frame.iter()) {
            *slot = Complex::new(x, 0.0);
        }
        for slot in self.fft_buf.iter_mut().skip(n) {
            *slot = Complex::new(0.0, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buf, &mut self.fft_scratch);
        for c in self.fft_buf.iter_mut() {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        self.ifft
            .process_with_scratch(&mut self.fft_buf, &mut self.fft_scratch);
        let scale = 1.0 / (2 * n) as f32;

        let r0 = self.fft_buf[0].re * scale;
        let rms = (r0 / n as f32).sqrt();
        if rms < self.min_rms || !rms.is_finite() {
            self.fidelity = 0.0;
            return;
        }

        // Normalize each lag by the energy of the two segments actually
        // being compared, maintained as a running sum.
        let mut m = 2.0 * r0;
        self.nac[0] = 1.0;
        for tau in 1..n {
            m -= self.frame[tau - 1] * self.frame[tau - 1];
            m -= self.frame[n - tau] * self.frame[n - tau];
            self.nac[tau] = if m > 0.0 {
                2.0 * self.fft_buf[tau].re * scale / m
            } else {
                0.0
            };
        }

        // Pick the best biased local maximum; ties go to the smaller lag.
        let seek_len = ((n as f32 * SEEK) as usize).min(n - 1);
        let mut best_tau = 0;
        let mut best_score = f32::MIN;
        for tau in 2..seek_len {
            if self.nac[tau] >= self.nac[tau - 1] && self.nac[tau] > self.nac[tau + 1] {
                let score = self.nac[tau] * self.biasbuf[tau];
                if score > best_score + TIE_TOLERANCE {
                    best_score = score;
                    best_tau = tau;
                }
            }
        }
        if best_tau == 0 {
            // No peak at all: flat or pathological frame.
            self.fidelity = 0.0;
            return;
        }

        // Parabolic refinement on the unbiased scores around the peak.
        let l = self.nac[best_tau - 1];
        let c = self.nac[best_tau];
        let r = self.nac[best_tau + 1];
        let denom = l - 2.0 * c + r;
        let offset = if denom.abs() > 1e-12 {
            (0.5 * (l - r) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };
        self.periodlength = best_tau as f32 + offset;
        self.fidelity = (c - 0.25 * (l - r) * offset).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_pure_sine_period_within_one_percent() {
        let sr = 44_100.0;
        let f0 = 220.0;
        let mut snac = Snac::new(1024).unwrap();
        snac.io_samples(&sine(f0, sr, 4096));

        let expected = sr / f0;
        let got = snac.period();
        assert!(
            (got - expected).abs() / expected < 0.01,
            "period {got} vs {expected}"
        );
        assert!(snac.fidelity() > 0.95, "fidelity {}", snac.fidelity());
    }

    #[test]
    fn test_various_frequencies() {
        let sr = 48_000.0;
        for f0 in [110.0, 220.0, 440.0, 880.0] {
            let mut snac = Snac::new(1024).unwrap();
            snac.io_samples(&sine(f0, sr, 4096));
            let expected = sr / f0;
            let got = snac.period();
            assert!(
                (got - expected).abs() / expected < 0.01,
                "{f0} Hz: period {got} vs {expected}"
            );
        }
    }

    #[test]
    fn test_silence_gives_zero_fidelity_and_keeps_period() {
        let sr = 44_100.0;
        let mut snac = Snac::new(1024).unwrap();
        snac.io_samples(&sine(220.0, sr, 2048));
        let period = snac.period();
        assert!(period > 0.0);

        snac.io_samples(&vec![0.0; 2048]);
        assert_eq!(snac.fidelity(), 0.0);
        assert_eq!(snac.period(), period, "silence must not move the estimate");
    }

    #[test]
    fn test_noise_scores_low_fidelity() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let noise: Vec<f32> = (0..4096).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        let mut snac = Snac::new(1024).unwrap();
        snac.io_samples(&noise);
        assert!(snac.fidelity() < 0.7, "fidelity {}", snac.fidelity());
    }

    #[test]
    fn test_harmonic_rich_signal_finds_fundamental_not_subharmonic() {
        let sr = 48_000.0;
        let f0 = 200.0;
        let signal: Vec<f32> = (0..4096)
            .map(|i| {
                let t = i as f32 / sr;
                0.6 * (TAU * f0 * t).sin()
                    + 0.3 * (TAU * 2.0 * f0 * t).sin()
                    + 0.1 * (TAU * 3.0 * f0 * t).sin()
            })
            .collect();
        let mut snac = Snac::new(1024).unwrap();
        snac.io_samples(&signal);
        let expected = sr / f0; // 240 samples; the 480-sample subharmonic must lose
        let got = snac.period();
        assert!(
            (got - expected).abs() / expected < 0.02,
            "period {got} vs {expected}"
        );
    }

    #[test]
    fn test_frame_size_validation() {
        assert!(Snac::new(0).is_err());
        assert!(Snac::new(100).is_err());
        assert!(Snac::new(32).is_err());
        assert!(Snac::new(1024).is_ok());
    }

    #[test]
    fn test_setter_validation_keeps_state() {
        let mut snac = Snac::new(1024).unwrap();
        assert!(snac.set_bias(1.5).is_err());
        assert!(snac.set_min_rms(-0.1).is_err());
        assert!(snac.set_overlap(0).is_err());
        assert!(snac.set_overlap(33).is_err());
        assert!(snac.set_overlap(3).is_err(), "3 does not divide 1024");
        assert!(snac.set_overlap(4).is_ok());
        assert!(snac.set_bias(0.3).is_ok());
        assert!(snac.set_min_rms(0.01).is_ok());
    }

    #[test]
    fn test_arena_backed_construction() {
        let mut arena = Arena::new(3 * 1024);
        let snac = Snac::new_in(1024, &mut arena).unwrap();
        assert_eq!(arena.available(), 0);
        assert_eq!(snac.frame_size(), 1024);

        // Not enough budget left for a second estimator.
        assert!(Snac::new_in(1024, &mut arena).is_err());
    }

    #[test]
    fn test_overlap_analyzes_more_often() {
        let sr = 44_100.0;
        let mut snac = Snac::new(1024).unwrap();
        snac.set_overlap(4).unwrap();
        // One frame fills the buffer; the next hop (256 samples) is enough
        // to trigger a fresh analysis.
        snac.io_samples(&sine(220.0, sr, 1024));
        let first = snac.period();
        assert!(first > 0.0);
        snac.io_samples(&sine(220.0, sr, 256));
        assert!(snac.period() > 0.0);
    }
}
