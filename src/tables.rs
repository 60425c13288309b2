//! Precomputed lookup tables: multi-octave wavetables and the BLEP step.
//!
//! Both kinds of table are built once, up front, and are immutable
//! afterwards; the wavetable banks use `rustfft` for their octave trimming.
//! The audio thread only ever reads them. The BLEP residual is process-wide
//! (lazily built behind a `OnceLock`); wavetable banks are built per base
//! waveform and shared by reference between any number of oscillators.

use std::sync::OnceLock;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{Error, Result};
use crate::math::{cubic_interp, lerp};

/// A multi-octave set of bandlimited wavetables built from one base cycle.
///
/// Table 0 holds the full harmonic content of the base cycle; each further
/// table halves the harmonic budget, so table `o` is alias-free up to twice
/// the frequency of table `o - 1`. Selection is therefore monotonic in
/// frequency: the higher the pitch, the higher the octave index and the
/// fewer the harmonics.
///
/// # Examples
///
/// ```
/// use overtone::tables::WavetableBank;
///
/// let bank = WavetableBank::saw(2048, 48_000.0, 12_000.0).unwrap();
/// assert!(bank.num_tables() > 1);
///
/// // Higher frequency never selects a lower-index (richer) table.
/// let (low, _) = bank.select(60.0);
/// let (high, _) = bank.select(6_000.0);
/// assert!(high >= low);
/// ```
pub struct WavetableBank {
    tables: Vec<Box<[f32]>>,
    size: usize,
    base_freq: f32,
    inv_base_freq: f32,
}

impl WavetableBank {
    /// Builds a bank from a single-cycle base table.
    ///
    /// `max_freq` is the highest fundamental the bank must cover without
    /// aliasing; it determines how many octave tables are generated.
    ///
    /// # Arguments
    ///
    /// * `base` - One cycle of the waveform (at least 4 samples)
    /// * `sample_rate` - Sample rate in Hz
    /// * `max_freq` - Highest fundamental frequency to support, in Hz
    pub fn new(base: &[f32], sample_rate: f32, max_freq: f32) -> Result<Self> {
        if base.len() < 4 {
            return Err(Error::InvalidArgument("wavetable needs at least 4 samples"));
        }
        if sample_rate <= 0.0 {
            return Err(Error::InvalidArgument("sample rate must be positive"));
        }
        if max_freq <= 0.0 {
            return Err(Error::InvalidArgument("max frequency must be positive"));
        }

        let size = base.len();
        // Frequency at which the full table is still alias-free: its highest
        // harmonic (size / 2) must not cross Nyquist.
        let base_freq = sample_rate / size as f32;
        let octaves = (max_freq / base_freq).max(1.0).log2().ceil() as usize;
        let num_tables = octaves + 1;

        // One forward transform of the base cycle, then progressively
        // truncated inverse transforms, one per octave.
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        let mut spectrum: Vec<Complex<f32>> =
            base.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut spectrum);

        let mut tables = Vec::with_capacity(num_tables);
        for oct in 0..num_tables {
            // Harmonic budget for this octave, never below the fundamental.
            let max_harmonic = ((size / 2) >> oct).max(1);

            let mut trimmed = spectrum.clone();
            trimmed[0] = Complex::new(0.0, 0.0); // drop DC
            for (bin, slot) in trimmed.iter_mut().enumerate().skip(1) {
                let harmonic = bin.min(size - bin);
                if harmonic > max_harmonic {
                    *slot = Complex::new(0.0, 0.0);
                }
            }
            ifft.process(&mut trimmed);

            let scale = 1.0 / size as f32;
            let table: Box<[f32]> = trimmed.iter().map(|c| c.re * scale).collect();
            tables.push(table);
        }

        log::debug!(
            "built wavetable bank: {} tables of {} samples, base {base_freq:.2} Hz",
            tables.len(),
            size
        );

        Ok(Self {
            tables,
            size,
            base_freq,
            inv_base_freq: 1.0 / base_freq,
        })
    }

    /// Bank built from a naive sawtooth cycle.
    pub fn saw(size: usize, sample_rate: f32, max_freq: f32) -> Result<Self> {
        let base: Vec<f32> = (0..size)
            .map(|i| 2.0 * i as f32 / size as f32 - 1.0)
            .collect();
        Self::new(&base, sample_rate, max_freq)
    }

    /// Bank built from a naive square cycle.
    pub fn square(size: usize, sample_rate: f32, max_freq: f32) -> Result<Self> {
        let base: Vec<f32> = (0..size)
            .map(|i| if i < size / 2 { 1.0 } else { -1.0 })
            .collect();
        Self::new(&base, sample_rate, max_freq)
    }

    /// Bank built from a triangle cycle.
    pub fn triangle(size: usize, sample_rate: f32, max_freq: f32) -> Result<Self> {
        let base: Vec<f32> = (0..size)
            .map(|i| {
                let t = i as f32 / size as f32;
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            })
            .collect();
        Self::new(&base, sample_rate, max_freq)
    }

    /// Bank built from one sine cycle (a single table suffices, but the
    /// shared reader path is reused unchanged).
    pub fn sine(size: usize, sample_rate: f32, max_freq: f32) -> Result<Self> {
        let base: Vec<f32> = (0..size)
            .map(|i| (std::f32::consts::TAU * i as f32 / size as f32).sin())
            .collect();
        Self::new(&base, sample_rate, max_freq)
    }

    /// Number of octave tables in the bank.
    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Samples per table.
    pub fn table_size(&self) -> usize {
        self.size
    }

    /// Fundamental frequency below which table 0 is fully alias-free.
    pub fn base_freq(&self) -> f32 {
        self.base_freq
    }

    /// Chooses the octave table for `freq`, returning the nearest-below
    /// octave index and the fractional position toward the next table
    /// (used for crossfading between adjacent octaves).
    pub fn select(&self, freq: f32) -> (usize, f32) {
        let last = self.tables.len() - 1;
        let ratio = freq * self.inv_base_freq;
        if ratio <= 1.0 {
            return (0, 0.0);
        }
        let r = ratio.log2();
        let oct = r as usize;
        if oct >= last {
            (last, 0.0)
        } else {
            (oct, r - oct as f32)
        }
    }

    /// Reads table `oct` at `phase` in [0, 1) with linear interpolation.
    #[inline]
    pub fn lookup(&self, oct: usize, phase: f32) -> f32 {
        let table = &self.tables[oct];
        let pos = phase * self.size as f32;
        let i = pos as usize % self.size;
        let j = (i + 1) % self.size;
        lerp(table[i], table[j], pos - pos.floor())
    }

    /// Reads table `oct` at `phase` in [0, 1) with four-point cubic
    /// interpolation, wrapping around the cycle ends.
    #[inline]
    pub fn lookup_cubic(&self, oct: usize, phase: f32) -> f32 {
        let table = &self.tables[oct];
        let pos = phase * self.size as f32;
        let i1 = pos as usize % self.size;
        let i0 = (i1 + self.size - 1) % self.size;
        let i2 = (i1 + 1) % self.size;
        let i3 = (i1 + 2) % self.size;
        cubic_interp(table[i0], table[i1], table[i2], table[i3], pos - pos.floor())
    }
}

/// Length of the future-correction window each BLEP discontinuity spreads
/// over, in output samples. Equals `STEP_RISE + STEP_SETTLE`.
pub(crate) const MINBLEP_LENGTH: usize = 200;

/// Oversampling factor of the stored residual (phases per output sample).
pub(crate) const MINBLEP_PHASES: usize = 64;

/// Rise time of the bandlimited step, in output samples.
const STEP_RISE: f64 = 3.0;

/// Peak overshoot of the step above its target. The settle tail returns
/// exactly this much area, so the residual integrates to zero and an
/// injected edge contributes no net DC.
const STEP_OVERSHOOT: f64 = STEP_RISE / MINBLEP_LENGTH as f64;

/// The precomputed causal bandlimited step, stored as a residual against
/// the ideal unit step so that it decays to zero.
pub(crate) struct MinBlepTable {
    /// Oversampled residual, `MINBLEP_LENGTH * MINBLEP_PHASES + 1` entries.
    residual: Box<[f32]>,
}

impl MinBlepTable {
    /// Residual at `t` output samples after the discontinuity, `t` in
    /// [0, MINBLEP_LENGTH). Linear interpolation between stored phases.
    #[inline]
    pub(crate) fn residual(&self, t: f32) -> f32 {
        let pos = t * MINBLEP_PHASES as f32;
        let i = pos as usize;
        if i + 1 >= self.residual.len() {
            return 0.0;
        }
        lerp(self.residual[i], self.residual[i + 1], pos - pos.floor())
    }
}

static MINBLEP: OnceLock<MinBlepTable> = OnceLock::new();

/// Process-wide BLEP residual table, built on first use.
pub(crate) fn minblep_table() -> &'static MinBlepTable {
    MINBLEP.get_or_init(build_minblep)
}

/// Value of the step `t` samples after the discontinuity.
///
/// The step is causal and minimum-delay: a raised-cosine rise over
/// `STEP_RISE` samples up to `1 + STEP_OVERSHOOT`, then a long shallow
/// raised-cosine settle back to 1. With the settle span at
/// `STEP_RISE * (1 - d) / d` for overshoot `d`, the area the rise misses
/// below the target equals the area the settle returns above it, so the
/// residual has zero net area. Peak excursion beyond the target never
/// exceeds `STEP_OVERSHOOT`, which keeps corrected waveforms inside their
/// naive range plus a small margin even when many corrections overlap.
fn step_value(t: f64) -> f64 {
    use std::f64::consts::PI;
    let settle = STEP_RISE * (1.0 - STEP_OVERSHOOT) / STEP_OVERSHOOT;
    if t <= 0.0 {
        0.0
    } else if t < STEP_RISE {
        (1.0 + STEP_OVERSHOOT) * 0.5 * (1.0 - (PI * t / STEP_RISE).cos())
    } else if t < STEP_RISE + settle {
        1.0 + STEP_OVERSHOOT * 0.5 * (1.0 + (PI * (t - STEP_RISE) / settle).cos())
    } else {
        1.0
    }
}

/// Samples the step residual onto the oversampled grid. Runs once per
/// process, in `f64`, off the audio thread.
fn build_minblep() -> MinBlepTable {
    let n = MINBLEP_LENGTH * MINBLEP_PHASES;
    let mut residual = vec![0.0f32; n + 1];
    for (i, slot) in residual.iter_mut().take(n).enumerate() {
        let t = i as f64 / MINBLEP_PHASES as f64;
        *slot = (step_value(t) - 1.0) as f32;
    }
    residual[n] = 0.0;

    MinBlepTable {
        residual: residual.into_boxed_slice(),
    }
}
