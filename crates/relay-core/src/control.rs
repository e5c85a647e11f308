//! Control elements: PID loop and inverse-time Overcurrent protection.

use crate::error::ConstructionError;
use crate::port::{PortSet, PortType, PortValue};
use relay_time::Time;

fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.max(min).min(max)
}

/// Proportional-integral-derivative loop with clamped integral (anti-windup)
/// and an N-sample moving-average smoothed derivative.
pub struct Pid {
    pub ports: PortSet,
    p: f32,
    i: f32,
    d: f32,
    out_min: f32,
    out_max: f32,
    integral: f32,
    in_buf: Vec<f32>,
    out_buf: Vec<f32>,
    cursor: usize,
    last_time: Option<Time>,
}

impl Pid {
    pub fn new(p: f32, i: f32, d: f32, out_min: f32, out_max: f32, derivative_terms: usize) -> Self {
        let n = derivative_terms.max(1);
        let ports = PortSet::new()
            .with_input("setpoint", PortType::Analog)
            .with_input("feedback", PortType::Analog)
            .with_output("output", PortType::Analog);
        Self {
            ports,
            p,
            i,
            d,
            out_min,
            out_max,
            integral: 0.0,
            in_buf: vec![0.0; n],
            out_buf: vec![0.0; n],
            cursor: n - 1,
            last_time: None,
        }
    }

    pub fn update(&mut self, inputs: &[PortValue], time: Time) {
        let dt = match self.last_time {
            Some(last) => ((time - last) as f64 / 1_000_000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(time);

        let setpoint = inputs[0].as_analog();
        let feedback = inputs[1].as_analog();
        let err = setpoint - feedback;

        let proportional = clamp(self.p * err, self.out_min, self.out_max);

        if dt > 0.0 {
            self.integral += self.i * err * dt;
        }
        self.integral = clamp(self.integral, self.out_min, self.out_max);

        let output = if self.d == 0.0 || dt <= 0.0 {
            clamp(proportional + self.integral, self.out_min, self.out_max)
        } else {
            let n = self.in_buf.len();
            self.in_buf[self.cursor] = err;
            let coeff = 1.0 / n as f32;
            let smoothed: f32 = self.in_buf.iter().map(|e| e * coeff).sum();
            self.out_buf[self.cursor] = smoothed;
            let prev = (self.cursor + n - 1) % n;
            let derivative = clamp((self.out_buf[self.cursor] - self.out_buf[prev]) * self.d / dt, self.out_min, self.out_max);
            self.cursor = (self.cursor + 1) % n;
            clamp(proportional + self.integral + derivative, self.out_min, self.out_max)
        };

        self.ports.outputs[0].value = PortValue::Analog(output);
    }
}

/// The 5-tuple (alpha, beta, gamma, beta_r, gamma_r) used by every
/// inverse-time curve: `trip_time = adder + dial*(alpha + beta/(m^gamma - 1))`,
/// `reset_time = dial*beta_r/(1 - m^gamma_r)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveConstants {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub beta_r: f32,
    pub gamma_r: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    C1,
    C2,
    C3,
    C4,
    C5,
    U1,
    U2,
    U3,
    U4,
    U5,
    Dt,
}

impl Curve {
    pub fn parse(name: &str) -> Option<Curve> {
        match name.to_ascii_uppercase().as_str() {
            "C1" => Some(Curve::C1),
            "C2" => Some(Curve::C2),
            "C3" => Some(Curve::C3),
            "C4" => Some(Curve::C4),
            "C5" => Some(Curve::C5),
            "U1" => Some(Curve::U1),
            "U2" => Some(Curve::U2),
            "U3" => Some(Curve::U3),
            "U4" => Some(Curve::U4),
            "U5" => Some(Curve::U5),
            "DT" => Some(Curve::Dt),
            _ => None,
        }
    }

    /// IEC 60255-151 / IEEE C37.112 style constants. Only C1 and DT are
    /// shown in full in the upstream curve table; the remaining IEC/IEEE
    /// curves use their standard published constants.
    pub fn constants(&self) -> CurveConstants {
        match self {
            Curve::C1 => CurveConstants { alpha: 0.0, beta: 0.14, gamma: 0.02, beta_r: 13.5, gamma_r: 2.0 },
            Curve::C2 => CurveConstants { alpha: 0.0, beta: 13.5, gamma: 1.0, beta_r: 47.3, gamma_r: 2.0 },
            Curve::C3 => CurveConstants { alpha: 0.0, beta: 80.0, gamma: 2.0, beta_r: 80.0, gamma_r: 2.0 },
            Curve::C4 => CurveConstants { alpha: 0.0, beta: 120.0, gamma: 1.0, beta_r: 120.0, gamma_r: 2.0 },
            Curve::C5 => CurveConstants { alpha: 0.0, beta: 0.05, gamma: 0.04, beta_r: 4.85, gamma_r: 2.0 },
            Curve::U1 => CurveConstants { alpha: 0.1140, beta: 0.0515, gamma: 0.02, beta_r: 4.85, gamma_r: 2.0 },
            Curve::U2 => CurveConstants { alpha: 0.4910, beta: 19.61, gamma: 2.0, beta_r: 21.6, gamma_r: 2.0 },
            Curve::U3 => CurveConstants { alpha: 0.1217, beta: 28.2, gamma: 2.0, beta_r: 29.1, gamma_r: 2.0 },
            Curve::U4 => CurveConstants { alpha: 0.0, beta: 120.0, gamma: 1.0, beta_r: 120.0, gamma_r: 2.0 },
            Curve::U5 => CurveConstants { alpha: 0.0, beta: 0.05, gamma: 0.04, beta_r: 4.85, gamma_r: 2.0 },
            Curve::Dt => CurveConstants { alpha: 0.0, beta: 0.0, gamma: 1.0, beta_r: 0.0, gamma_r: 1.0 },
        }
    }
}

/// Inverse-time overcurrent element: integrates percent-to-trip from a
/// current/pickup ratio using the selected curve, with an optional
/// electromechanical reset.
pub struct Overcurrent {
    pub ports: PortSet,
    curve: CurveConstants,
    pickup: f32,
    dial: f32,
    adder: f32,
    em_reset: bool,
    percent: f32,
    last_time: Option<Time>,
}

impl Overcurrent {
    pub fn new(curve_name: &str, pickup: f32, dial: f32, adder: f32, em_reset: bool) -> Result<Self, ConstructionError> {
        let curve = Curve::parse(curve_name)
            .ok_or_else(|| ConstructionError::UnknownCurve(curve_name.to_string()))?
            .constants();
        let ports = PortSet::new().with_input("current", PortType::Analog).with_output("trip", PortType::Digital);
        Ok(Self { ports, curve, pickup, dial, adder, em_reset, percent: 0.0, last_time: None })
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn update(&mut self, inputs: &[PortValue], time: Time) {
        let current = inputs[0].as_analog();
        let dt = match self.last_time {
            Some(last) => ((time - last) as f64 / 1_000_000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(time);

        if dt > 0.0 && self.pickup.abs() > 1e-9 {
            let m = current / self.pickup;
            let c = self.curve;
            if m > 1.0 {
                let denom = m.powf(c.gamma) - 1.0;
                let bonus = if denom.abs() > 1e-9 { c.beta / denom } else { 0.0 };
                let trip_time = self.adder + self.dial * (c.alpha + bonus);
                if trip_time > 1e-9 {
                    self.percent += (dt / trip_time) * 100.0;
                }
            } else if m < 1.0 && self.em_reset {
                let denom = 1.0 - m.powf(c.gamma_r);
                if denom.abs() > 1e-9 {
                    let reset_time = self.dial * c.beta_r / denom;
                    if reset_time > 1e-9 {
                        self.percent -= (dt / reset_time) * 100.0;
                    }
                }
            } else {
                self.percent = 0.0;
            }
        }

        self.percent = self.percent.clamp(0.0, 100.0);
        self.ports.outputs[0].value = PortValue::Digital(self.percent >= 100.0);
    }
}
