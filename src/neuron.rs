//! Neuron oscillator: a spiking membrane model used as a sound source.

use crate::filters::PoleZero;
use crate::math::{clip, drive_shape, fast_tanh};
use crate::Signal;

/// Output shaping applied to the membrane voltage each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeuronMode {
    /// Raw membrane voltage.
    #[default]
    Normal,
    /// Voltage squashed through a tanh, taming runaway spikes.
    Tanh,
    /// Voltage run through a polynomial drive shaper for a harder edge.
    AaltoShaper,
}

/// A three-gate membrane model integrated with explicit Euler steps.
///
/// Potassium, sodium, and leak channels pull the membrane voltage toward
/// their reversal potentials; an injected current pushes it away. With
/// enough current the voltage spikes and recovers periodically, producing
/// a waveform somewhere between a relaxation oscillator and an analog
/// drum circuit. The channel parameters all have audible, if chaotic,
/// effects, and extreme settings are part of the instrument.
///
/// The raw voltage rides on a large offset, so the output is scaled down
/// and DC-blocked before it leaves the tick.
///
/// # Examples
///
/// ```
/// use overtone::{Signal, neuron::Neuron};
///
/// let mut n = Neuron::new(48_000.0);
/// n.set_current(80.0);
/// let sample = n.next_sample();
/// assert!(sample.abs() <= 1.0);
/// ```
pub struct Neuron {
    dc_blocker: PoleZero,
    mode: NeuronMode,
    /// Membrane voltage, in the model's millivolt-like units.
    voltage: f32,
    /// Injected current driving the spiking.
    current: f32,
    /// Euler step size.
    time_step: f32,
    /// Gate activations: potassium n, sodium m, sodium inactivation h.
    gates: [f32; 3],
    /// Reversal potentials per channel.
    potentials: [f32; 3],
    /// Channel conductances: potassium, sodium, leak.
    g_k: f32,
    g_n: f32,
    g_l: f32,
    /// Membrane capacitance.
    capacitance: f32,
}

impl Neuron {
    /// Creates a neuron with the classic squid-axon channel constants.
    ///
    /// With no injected current the membrane rests near zero; call
    /// [`Neuron::set_current`] to make it fire.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            dc_blocker: PoleZero::block_dc(0.99),
            mode: NeuronMode::Normal,
            voltage: 0.0,
            current: 0.0,
            // The model is tuned for steps much shorter than one sample at
            // 44.1 kHz; scale to keep behavior rate-independent.
            time_step: (44_100.0 / sample_rate) / 128.0,
            gates: [0.0; 3],
            potentials: [-12.0, 115.0, 10.613],
            g_k: 36.0,
            g_n: 120.0,
            g_l: 0.3,
            capacitance: 1.0,
        }
    }

    /// Sets the injected current. More current, faster spiking.
    pub fn set_current(&mut self, current: f32) {
        self.current = current;
    }

    /// Sets the potassium conductance.
    pub fn set_k(&mut self, g_k: f32) {
        self.g_k = g_k;
    }

    /// Sets the sodium conductance.
    pub fn set_n(&mut self, g_n: f32) {
        self.g_n = g_n;
    }

    /// Sets the leak conductance.
    pub fn set_l(&mut self, g_l: f32) {
        self.g_l = g_l;
    }

    /// Sets the membrane capacitance. Values at or below zero are rejected
    /// and the previous capacitance kept.
    pub fn set_c(&mut self, capacitance: f32) -> crate::Result<()> {
        if capacitance <= 0.0 {
            return Err(crate::Error::InvalidArgument(
                "capacitance must be positive",
            ));
        }
        self.capacitance = capacitance;
        Ok(())
    }

    /// Sets the potassium reversal potential.
    pub fn set_v1(&mut self, v: f32) {
        self.potentials[0] = v;
    }

    /// Sets the sodium reversal potential.
    pub fn set_v2(&mut self, v: f32) {
        self.potentials[1] = v;
    }

    /// Sets the leak reversal potential.
    pub fn set_v3(&mut self, v: f32) {
        self.potentials[2] = v;
    }

    /// Sets the Euler step size directly. Values at or below zero are
    /// rejected and the previous step kept.
    pub fn set_time_step(&mut self, time_step: f32) -> crate::Result<()> {
        if time_step <= 0.0 {
            return Err(crate::Error::InvalidArgument(
                "time step must be positive",
            ));
        }
        self.time_step = time_step;
        Ok(())
    }

    /// Selects the output shaping mode.
    pub fn set_mode(&mut self, mode: NeuronMode) {
        self.mode = mode;
    }

    /// Current output shaping mode.
    pub fn mode(&self) -> NeuronMode {
        self.mode
    }

    /// Returns the membrane to rest and clears the DC blocker.
    pub fn reset(&mut self) {
        self.voltage = 0.0;
        self.gates = [0.0; 3];
        self.dc_blocker.reset();
    }
}

/// Channel opening rate, with the 0/0 limit patched at the singular point.
fn gate_alpha(scale: f32, offset: f32, v: f32) -> f32 {
    let x = v + offset;
    let d = (x / 10.0).exp() - 1.0;
    if d.abs() < 1e-5 {
        // L'Hopital limit of scale * x / (e^(x/10) - 1) as x -> 0.
        scale * 10.0
    } else {
        scale * x / d
    }
}

impl Signal for Neuron {
    fn next_sample(&mut self) -> f32 {
        let v = self.voltage;

        let alpha = [
            gate_alpha(0.01, 10.0, v),
            gate_alpha(0.1, 25.0, v),
            0.07 * (v / 20.0).exp(),
        ];
        let beta = [
            0.125 * (v / 80.0).exp(),
            4.0 * (v / 18.0).exp(),
            1.0 / (((v + 30.0) / 10.0).exp() + 1.0),
        ];

        // Euler step of each gate; blow-ups are snapped back to closed.
        for i in 0..3 {
            let g = self.gates[i];
            let next = alpha[i] * self.time_step
                + (1.0 - (alpha[i] + beta[i]) * self.time_step) * g;
            self.gates[i] = if next.abs() > 1.0 { 0.0 } else { next };
        }

        let [n, m, h] = self.gates;
        let conductances = [
            self.g_k * n * n * n * n,
            self.g_n * m * m * m * h,
            self.g_l,
        ];

        let mut new_voltage = v;
        for (rate, potential) in conductances.iter().zip(self.potentials) {
            new_voltage += (potential - v) * rate * self.time_step / self.capacitance;
        }

        match self.mode {
            NeuronMode::Normal => {}
            NeuronMode::Tanh => {
                new_voltage = 100.0 * fast_tanh(new_voltage * 0.01);
            }
            NeuronMode::AaltoShaper => {
                new_voltage = 100.0 * drive_shape(new_voltage * 0.01, 1.0);
            }
        }

        new_voltage += self.current * self.time_step / self.capacitance;
        self.voltage = new_voltage;

        let out = self.dc_blocker.tick(new_voltage * 0.01);
        clip(-1.0, out, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stays_in_unit_range() {
        let mut n = Neuron::new(48_000.0);
        n.set_current(100.0);
        for _ in 0..48_000 {
            let s = n.next_sample();
            assert!(s.abs() <= 1.0, "sample {s}");
            assert!(s.is_finite());
        }
    }

    #[test]
    fn test_injected_current_makes_it_fire() {
        let mut n = Neuron::new(48_000.0);
        n.set_current(80.0);
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..48_000 {
            let s = n.next_sample();
            min = min.min(s);
            max = max.max(s);
        }
        assert!(max - min > 0.01, "no oscillation: span {}", max - min);
    }

    #[test]
    fn test_resting_membrane_is_quiet() {
        let mut n = Neuron::new(48_000.0);
        // No current: after the initial transient the output settles.
        for _ in 0..48_000 {
            n.next_sample();
        }
        let mut max = 0.0f32;
        for _ in 0..4_800 {
            max = max.max(n.next_sample().abs());
        }
        assert!(max < 0.05, "resting output {max}");
    }

    #[test]
    fn test_all_modes_stay_finite() {
        for mode in [NeuronMode::Normal, NeuronMode::Tanh, NeuronMode::AaltoShaper] {
            let mut n = Neuron::new(48_000.0);
            n.set_mode(mode);
            n.set_current(150.0);
            n.set_k(40.0);
            n.set_l(1.0);
            for _ in 0..24_000 {
                let s = n.next_sample();
                assert!(s.is_finite(), "{mode:?} diverged");
                assert!(s.abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_bad_parameters_are_rejected_without_change() {
        let mut n = Neuron::new(48_000.0);
        let step = n.time_step;
        assert!(n.set_time_step(0.0).is_err());
        assert!(n.set_time_step(-1.0).is_err());
        assert_eq!(n.time_step, step);

        assert!(n.set_c(0.0).is_err());
        assert_eq!(n.capacitance, 1.0);
        assert!(n.set_c(2.0).is_ok());
        assert_eq!(n.capacitance, 2.0);
    }

    #[test]
    fn test_reset_restores_rest() {
        let mut n = Neuron::new(48_000.0);
        n.set_current(80.0);
        for _ in 0..10_000 {
            n.next_sample();
        }
        n.reset();
        assert_eq!(n.voltage, 0.0);
        assert_eq!(n.gates, [0.0; 3]);
    }
}
