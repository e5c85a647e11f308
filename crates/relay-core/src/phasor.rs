//! Phasor estimation: full-cycle cosine filter + quarter-cycle phasor
//! reconstruction, reference rotation, and three-phase symmetrical
//! components.

use crate::port::{PortSet, PortType, PortValue};

fn cadd(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    (a.0 + b.0, a.1 + b.1)
}

fn cmul(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    (a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0)
}

fn cscale(a: (f32, f32), s: f32) -> (f32, f32) {
    (a.0 * s, a.1 * s)
}

/// Single-phase phasor estimator. `samples_per_cycle` is clamped to a
/// minimum of 4 so the quarter-cycle tap is always defined.
pub struct Analog1PWinding {
    pub ports: PortSet,
    samples_per_cycle: usize,
    coefficients: Vec<f32>,
    raw_ring: Vec<f32>,
    filtered_ring: Vec<f32>,
    cursor: usize,
}

impl Analog1PWinding {
    pub fn new(samples_per_cycle: usize) -> Self {
        let s = samples_per_cycle.max(4);
        // c_k = (2/S) cos(2 pi k / S)
        let coefficients: Vec<f32> = (0..s)
            .map(|k| (2.0 / s as f32) * (2.0 * std::f32::consts::PI * k as f32 / s as f32).cos())
            .collect();
        let ports = PortSet::new()
            .with_input("raw", PortType::Analog)
            .with_input("reference", PortType::Complex)
            .with_output("output", PortType::Complex);
        Self {
            ports,
            samples_per_cycle: s,
            coefficients,
            raw_ring: vec![0.0; s],
            filtered_ring: vec![0.0; s],
            cursor: 0,
        }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let raw = inputs[0].as_analog();
        let reference = inputs[1].as_complex();
        let s = self.samples_per_cycle;

        self.raw_ring[self.cursor] = raw;

        let mut filtered = 0.0f32;
        for k in 0..s {
            let idx = (self.cursor + s - k) % s;
            filtered += self.raw_ring[idx] * self.coefficients[k];
        }
        self.filtered_ring[self.cursor] = filtered;

        let quarter = s / 4;
        let real = self.filtered_ring[self.cursor];
        let imag = self.filtered_ring[(self.cursor + s - quarter) % s];

        let (out_re, out_im) = rotate_to_reference((real, imag), reference);
        self.ports.outputs[0].value = PortValue::Complex(out_re, out_im);

        self.cursor = (self.cursor + 1) % s;
    }
}

/// Rotates `phasor` by `conj(reference)/|reference|`, i.e. measures its
/// angle relative to `reference`. Passes through unrotated when the
/// reference magnitude is negligible.
fn rotate_to_reference(phasor: (f32, f32), reference: (f32, f32)) -> (f32, f32) {
    let mag = (reference.0 * reference.0 + reference.1 * reference.1).sqrt();
    if mag < 1e-6 {
        return phasor;
    }
    let conj_over_mag = (reference.0 / mag, -reference.1 / mag);
    cmul(phasor, conj_over_mag)
}

/// Three-phase winding: three independent single-phase estimators sharing a
/// reference, plus zero/positive/negative sequence symmetrical components.
pub struct Analog3PWinding {
    pub ports: PortSet,
    a: Analog1PWinding,
    b: Analog1PWinding,
    c: Analog1PWinding,
}

impl Analog3PWinding {
    pub fn new(samples_per_cycle: usize) -> Self {
        let ports = PortSet::new()
            .with_input("raw_a", PortType::Analog)
            .with_input("raw_b", PortType::Analog)
            .with_input("raw_c", PortType::Analog)
            .with_input("reference", PortType::Complex)
            .with_output("phase_a", PortType::Complex)
            .with_output("phase_b", PortType::Complex)
            .with_output("phase_c", PortType::Complex)
            .with_output("seq_0", PortType::Complex)
            .with_output("seq_1", PortType::Complex)
            .with_output("seq_2", PortType::Complex);
        Self {
            ports,
            a: Analog1PWinding::new(samples_per_cycle),
            b: Analog1PWinding::new(samples_per_cycle),
            c: Analog1PWinding::new(samples_per_cycle),
        }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let reference = inputs[3];
        self.a.update(&[inputs[0], reference]);
        self.b.update(&[inputs[1], reference]);
        self.c.update(&[inputs[2], reference]);

        let va = self.a.ports.outputs[0].value.as_complex();
        let vb = self.b.ports.outputs[0].value.as_complex();
        let vc = self.c.ports.outputs[0].value.as_complex();

        self.ports.outputs[0].value = PortValue::Complex(va.0, va.1);
        self.ports.outputs[1].value = PortValue::Complex(vb.0, vb.1);
        self.ports.outputs[2].value = PortValue::Complex(vc.0, vc.1);

        // a-operator rotations: e^{j120} and e^{j240}
        let half_sqrt3 = 3f32.sqrt() / 2.0;
        let op_a = (-0.5, half_sqrt3);
        let op_a2 = (-0.5, -half_sqrt3);

        let v0 = cadd(cadd(va, vb), vc);
        let v1 = cscale(cadd(cadd(va, cmul(vb, op_a)), cmul(vc, op_a2)), 1.0 / 3.0);
        let v2 = cscale(cadd(cadd(va, cmul(vb, op_a2)), cmul(vc, op_a)), 1.0 / 3.0);

        self.ports.outputs[3].value = PortValue::Complex(v0.0, v0.1);
        self.ports.outputs[4].value = PortValue::Complex(v1.0, v1.1);
        self.ports.outputs[5].value = PortValue::Complex(v2.0, v2.1);
    }
}

/// Multiplies the input phasor by `magnitude * e^{-j*angle}` (clockwise
/// angle convention in degrees).
pub struct PhasorShift {
    pub ports: PortSet,
    multiplier: (f32, f32),
}

impl PhasorShift {
    pub fn new(magnitude: f32, angle_deg_clockwise: f32) -> Self {
        let rad = -angle_deg_clockwise.to_radians();
        let ports = PortSet::new().with_input("input", PortType::Complex).with_output("output", PortType::Complex);
        Self { ports, multiplier: (magnitude * rad.cos(), magnitude * rad.sin()) }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let phasor = inputs[0].as_complex();
        let out = cmul(phasor, self.multiplier);
        self.ports.outputs[0].value = PortValue::Complex(out.0, out.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeding a pure cosine at the fundamental should converge to a stable
    /// phasor whose magnitude tracks the input amplitude once the cosine
    /// filter window has filled.
    #[test]
    fn single_phase_winding_tracks_steady_state_amplitude() {
        let s = 16usize;
        let mut w = Analog1PWinding::new(s);
        let unity_reference = PortValue::Complex(1.0, 0.0);
        let mut last_mag = 0.0f32;
        for n in 0..(s * 4) {
            let theta = 2.0 * std::f32::consts::PI * (n as f32) / s as f32;
            let raw = theta.cos();
            w.update(&[PortValue::Analog(raw), unity_reference]);
            let (re, im) = w.ports.outputs[0].value.as_complex();
            last_mag = (re * re + im * im).sqrt();
        }
        assert!((last_mag - 1.0).abs() < 0.05, "expected ~unity magnitude, got {last_mag}");
    }

    #[test]
    fn phasor_shift_scales_and_rotates() {
        let mut shift = PhasorShift::new(2.0, 90.0);
        shift.update(&[PortValue::Complex(1.0, 0.0)]);
        let (re, im) = shift.ports.outputs[0].value.as_complex();
        assert!(re.abs() < 1e-4);
        assert!((im - (-2.0)).abs() < 1e-4);
    }

    #[test]
    fn balanced_three_phase_has_zero_zero_and_negative_sequence() {
        let s = 16usize;
        let mut w = Analog3PWinding::new(s);
        let unity_reference = PortValue::Complex(1.0, 0.0);
        for n in 0..(s * 4) {
            let theta = 2.0 * std::f32::consts::PI * (n as f32) / s as f32;
            let a = theta.cos();
            let b = (theta - 2.0 * std::f32::consts::PI / 3.0).cos();
            let c = (theta + 2.0 * std::f32::consts::PI / 3.0).cos();
            w.update(&[PortValue::Analog(a), PortValue::Analog(b), PortValue::Analog(c), unity_reference]);
        }
        let v0 = w.ports.outputs[3].value.as_complex();
        let v2 = w.ports.outputs[5].value.as_complex();
        assert!(v0.0.abs() < 0.05 && v0.1.abs() < 0.05);
        assert!(v2.0.abs() < 0.05 && v2.1.abs() < 0.05);
    }
}
