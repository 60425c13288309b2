//! Period detector: SNAC analysis over a live stream, with rate-limited
//! tracking.

use crate::analysis::snac::{Snac, SNAC_FRAME_SIZE};
use crate::arena::{Arena, ArenaBuf};
use crate::error::{Error, Result};
use crate::ring::RingBuffer;

/// Default hop between state-machine steps, in samples.
const DEF_HOP_SIZE: usize = 64;

/// Default tracking time constant in milliseconds.
const DEF_TIME_CONSTANT: f32 = 100.0;

/// Default fidelity below which a candidate is ignored.
const DEF_FIDELITY_THRESHOLD: f32 = 0.6;

/// Input history capacity in samples.
const CAPACITY: usize = 4096;

/// One analysis cycle, advanced one state per hop boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accumulating input until a full analysis window exists.
    WaitFrame,
    /// Feed the completed window to SNAC.
    Analyze,
    /// Fold the raw candidate into the tracked estimate.
    Track,
}

/// A pitch tracker driven one sample at a time.
///
/// [`PeriodDetector::find_period`] appends the sample to an internal ring
/// and, at each hop boundary, advances a three-state cycle: wait for a
/// full window, analyze it with [`Snac`], then fold the candidate into
/// the tracked period. The fold is exponential with a time constant, so a
/// single noisy frame cannot throw the estimate across an octave; the
/// reported period trails the raw analysis by design. Candidates whose
/// fidelity falls below the threshold are discarded outright, which keeps
/// silence and noise from eroding the last good estimate.
///
/// Hop and window geometry are adjustable at control time within the
/// fixed capacity; oversized requests are rejected with the previous
/// geometry left active.
///
/// # Examples
///
/// ```
/// use overtone::analysis::PeriodDetector;
///
/// let sr = 44_100.0;
/// let mut det = PeriodDetector::new(sr).unwrap();
/// let mut period = 0.0;
/// for i in 0..8192 {
///     let x = (std::f32::consts::TAU * 220.0 * i as f32 / sr).sin();
///     period = det.find_period(x);
/// }
/// assert!((period - sr / 220.0).abs() < 4.0);
/// ```
pub struct PeriodDetector {
    snac: Snac,
    input: RingBuffer,
    /// Scratch for handing a completed window to SNAC.
    frame: ArenaBuf,
    hop_size: usize,
    window_size: usize,
    hop_counter: usize,
    state: State,
    /// Tracked period in samples; zero until the first voiced frame.
    period: f32,
    fidelity_threshold: f32,
    time_constant: f32,
    /// Per-track-step smoothing factor derived from the time constant.
    radius: f32,
    sample_rate: f32,
}

impl PeriodDetector {
    /// Creates a detector with its own storage.
    pub fn new(sample_rate: f32) -> Result<Self> {
        let mut arena = Arena::new(3 * SNAC_FRAME_SIZE + CAPACITY);
        Self::new_in(sample_rate, &mut arena)
    }

    /// Creates a detector whose analysis buffers come from `arena`
    /// (`3 * 1024 + 4096` samples).
    pub fn new_in(sample_rate: f32, arena: &mut Arena) -> Result<Self> {
        if sample_rate <= 0.0 {
            return Err(Error::InvalidArgument("sample rate must be positive"));
        }
        let snac = Snac::new_in(SNAC_FRAME_SIZE, arena)?;
        let frame = arena.allocate(CAPACITY)?;
        let mut det = Self {
            snac,
            input: RingBuffer::new(CAPACITY),
            frame,
            hop_size: DEF_HOP_SIZE,
            window_size: SNAC_FRAME_SIZE,
            hop_counter: 0,
            state: State::WaitFrame,
            period: 0.0,
            fidelity_threshold: DEF_FIDELITY_THRESHOLD,
            time_constant: DEF_TIME_CONSTANT,
            radius: 0.0,
            sample_rate,
        };
        det.recompute_radius();
        Ok(det)
    }

    /// Feeds one sample and returns the tracked period in samples (zero
    /// until the first voiced frame has been analyzed). The estimate can
    /// lag the input by up to one analysis cycle.
    pub fn find_period(&mut self, sample: f32) -> f32 {
        self.input.push(sample);
        self.hop_counter += 1;
        if self.hop_counter >= self.hop_size {
            self.hop_counter = 0;
            self.step();
        }
        self.period
    }

    /// Tracked period in samples.
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Tracked fundamental in Hz, or zero before the first estimate.
    pub fn frequency(&self) -> f32 {
        if self.period > 0.0 {
            self.sample_rate / self.period
        } else {
            0.0
        }
    }

    /// Fidelity of the most recent analysis.
    pub fn fidelity(&self) -> f32 {
        self.snac.fidelity()
    }

    /// Current hop size in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Current analysis window in samples.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Sets the hop between state-machine steps. Fails on zero or anything
    /// beyond the input capacity; the previous hop stays active on failure.
    pub fn set_hop_size(&mut self, size: usize) -> Result<()> {
        if size == 0 || size > CAPACITY {
            return Err(Error::CapacityExceeded {
                what: "period detector hop",
                requested: size,
                available: CAPACITY,
            });
        }
        self.hop_size = size;
        self.recompute_radius();
        Ok(())
    }

    /// Sets the analysis window length. It must cover at least one SNAC
    /// frame and fit the input capacity; otherwise the request is rejected
    /// and the previous window kept.
    pub fn set_window_size(&mut self, size: usize) -> Result<()> {
        if size < self.snac.frame_size() || size > CAPACITY {
            return Err(Error::CapacityExceeded {
                what: "period detector window",
                requested: size,
                available: CAPACITY,
            });
        }
        self.window_size = size;
        Ok(())
    }

    /// Sets the tracking time constant in milliseconds. Nonpositive values
    /// are rejected and the previous constant kept.
    pub fn set_time_constant(&mut self, ms: f32) -> Result<()> {
        if ms <= 0.0 {
            return Err(Error::InvalidArgument("time constant must be positive"));
        }
        self.time_constant = ms;
        self.recompute_radius();
        Ok(())
    }

    /// Sets the fidelity gate in [0, 1]. Out-of-range values are rejected
    /// and the previous gate kept.
    pub fn set_fidelity_threshold(&mut self, threshold: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::OutOfRange {
                param: "fidelity threshold",
                min: 0.0,
                max: 1.0,
                value: threshold,
            });
        }
        self.fidelity_threshold = threshold;
        Ok(())
    }

    /// Clears all history and the tracked estimate.
    pub fn reset(&mut self) {
        self.input.reset();
        self.snac.reset();
        self.hop_counter = 0;
        self.state = State::WaitFrame;
        self.period = 0.0;
    }

    fn recompute_radius(&mut self) {
        let hop_ms = 1_000.0 * self.hop_size as f32 / self.sample_rate;
        self.radius = (-hop_ms / self.time_constant).exp();
    }

    fn step(&mut self) {
        match self.state {
            State::WaitFrame => {
                if self.input.len() >= self.window_size {
                    self.state = State::Analyze;
                }
            }
            State::Analyze => {
                let window = &mut self.frame[..self.window_size];
                self.input.copy_latest(window);
                self.snac.io_samples(window);
                self.state = State::Track;
            }
            State::Track => {
                if self.snac.fidelity() >= self.fidelity_threshold {
                    let candidate = self.snac.period();
                    self.period = if self.period > 0.0 {
                        // Exponential approach; one noisy frame moves the
                        // estimate only a fraction of the way.
                        candidate + self.radius * (self.period - candidate)
                    } else {
                        candidate
                    };
                }
                self.state = State::WaitFrame;
            }
        }
    }
}
