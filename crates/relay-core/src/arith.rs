//! Arithmetic elements (Analog and Complex variants) and the heterogeneous
//! Magnitude element (Complex in, Analog out).

use crate::port::{PortSet, PortType, PortValue};

/// Divisor magnitudes below this are treated as zero to avoid blowing up the
/// graph on a transient near-zero reading.
pub const DIVIDE_GUARD: f32 = 1e-10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Abs,
}

/// Two-input Analog arithmetic element.
pub struct AnalogBinary {
    pub ports: PortSet,
    op: BinaryOp,
}

impl AnalogBinary {
    pub fn new(op: BinaryOp) -> Self {
        let ports = PortSet::new()
            .with_input("input_0", PortType::Analog)
            .with_input("input_1", PortType::Analog)
            .with_output("output", PortType::Analog);
        Self { ports, op }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let a = inputs[0].as_analog();
        let b = inputs[1].as_analog();
        let result = match self.op {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => if b.abs() < DIVIDE_GUARD { 0.0 } else { a / b },
        };
        self.ports.outputs[0].value = PortValue::Analog(result);
    }
}

/// Single-input Analog Negate/Abs element.
pub struct AnalogUnary {
    pub ports: PortSet,
    op: UnaryOp,
}

impl AnalogUnary {
    pub fn new(op: UnaryOp) -> Self {
        let ports = PortSet::new().with_input("input", PortType::Analog).with_output("output", PortType::Analog);
        Self { ports, op }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let a = inputs[0].as_analog();
        let result = match self.op {
            UnaryOp::Negate => -a,
            UnaryOp::Abs => a.abs(),
        };
        self.ports.outputs[0].value = PortValue::Analog(result);
    }
}

fn complex_div((ar, ai): (f32, f32), (br, bi): (f32, f32)) -> (f32, f32) {
    let denom = br * br + bi * bi;
    if denom.sqrt() < DIVIDE_GUARD {
        return (0.0, 0.0);
    }
    ((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom)
}

/// Two-input Complex arithmetic element.
pub struct ComplexBinary {
    pub ports: PortSet,
    op: BinaryOp,
}

impl ComplexBinary {
    pub fn new(op: BinaryOp) -> Self {
        let ports = PortSet::new()
            .with_input("input_0", PortType::Complex)
            .with_input("input_1", PortType::Complex)
            .with_output("output", PortType::Complex);
        Self { ports, op }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let (ar, ai) = inputs[0].as_complex();
        let (br, bi) = inputs[1].as_complex();
        let result = match self.op {
            BinaryOp::Add => (ar + br, ai + bi),
            BinaryOp::Subtract => (ar - br, ai - bi),
            BinaryOp::Multiply => (ar * br - ai * bi, ar * bi + ai * br),
            BinaryOp::Divide => complex_div((ar, ai), (br, bi)),
        };
        self.ports.outputs[0].value = PortValue::Complex(result.0, result.1);
    }
}

/// Single-input Complex Negate/Abs element. Abs is componentwise (preserves
/// Complex type); use `Magnitude` for the scalar |z|.
pub struct ComplexUnary {
    pub ports: PortSet,
    op: UnaryOp,
}

impl ComplexUnary {
    pub fn new(op: UnaryOp) -> Self {
        let ports = PortSet::new().with_input("input", PortType::Complex).with_output("output", PortType::Complex);
        Self { ports, op }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let (re, im) = inputs[0].as_complex();
        let result = match self.op {
            UnaryOp::Negate => (-re, -im),
            UnaryOp::Abs => (re.abs(), im.abs()),
        };
        self.ports.outputs[0].value = PortValue::Complex(result.0, result.1);
    }
}

/// Heterogeneous element: Complex input, Analog output, |z|.
pub struct Magnitude {
    pub ports: PortSet,
}

impl Magnitude {
    pub fn new() -> Self {
        let ports = PortSet::new().with_input("input", PortType::Complex).with_output("output", PortType::Analog);
        Self { ports }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let (re, im) = inputs[0].as_complex();
        self.ports.outputs[0].value = PortValue::Analog((re * re + im * im).sqrt());
    }
}

impl Default for Magnitude {
    fn default() -> Self {
        Self::new()
    }
}
