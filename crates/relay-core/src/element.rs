//! Sum-type dispatch over every concrete element kind. Using one enum
//! variant per kind (rather than a trait object) makes `Engine::update`'s
//! hot loop a plain match with no indirect calls, and makes "predecessor
//! element" in the order-discovery walk a plain integer index.

use crate::arith::{AnalogBinary, AnalogUnary, ComplexBinary, ComplexUnary, Magnitude};
use crate::control::{Overcurrent, Pid};
use crate::convert::Conversion;
use crate::digital::{Counter, EdgeTrigger, Gate, Mux, Not, Ser, Timer};
use crate::math_expr::Math;
use crate::node::Node;
use crate::phasor::{Analog1PWinding, Analog3PWinding, PhasorShift};
use crate::port::{PortSet, PortValue};
use relay_time::Time;

pub enum ElementKind {
    And(Gate),
    Or(Gate),
    Not(Not),
    RTrig(EdgeTrigger),
    FTrig(EdgeTrigger),
    Timer(Timer),
    Counter(Counter),
    Mux(Mux),
    Ser(Ser),
    Node(Node),
    AnalogBinary(AnalogBinary),
    AnalogUnary(AnalogUnary),
    ComplexBinary(ComplexBinary),
    ComplexUnary(ComplexUnary),
    Magnitude(Magnitude),
    Convert(Conversion),
    Analog1PWinding(Analog1PWinding),
    Analog3PWinding(Analog3PWinding),
    PhasorShift(PhasorShift),
    Pid(Pid),
    Overcurrent(Overcurrent),
    Math(Math),
}

impl ElementKind {
    pub fn ports(&self) -> &PortSet {
        match self {
            ElementKind::And(e) | ElementKind::Or(e) => &e.ports,
            ElementKind::Not(e) => &e.ports,
            ElementKind::RTrig(e) | ElementKind::FTrig(e) => &e.ports,
            ElementKind::Timer(e) => &e.ports,
            ElementKind::Counter(e) => &e.ports,
            ElementKind::Mux(e) => &e.ports,
            ElementKind::Ser(e) => &e.ports,
            ElementKind::Node(e) => &e.ports,
            ElementKind::AnalogBinary(e) => &e.ports,
            ElementKind::AnalogUnary(e) => &e.ports,
            ElementKind::ComplexBinary(e) => &e.ports,
            ElementKind::ComplexUnary(e) => &e.ports,
            ElementKind::Magnitude(e) => &e.ports,
            ElementKind::Convert(e) => &e.ports,
            ElementKind::Analog1PWinding(e) => &e.ports,
            ElementKind::Analog3PWinding(e) => &e.ports,
            ElementKind::PhasorShift(e) => &e.ports,
            ElementKind::Pid(e) => &e.ports,
            ElementKind::Overcurrent(e) => &e.ports,
            ElementKind::Math(e) => &e.ports,
        }
    }

    pub fn ports_mut(&mut self) -> &mut PortSet {
        match self {
            ElementKind::And(e) | ElementKind::Or(e) => &mut e.ports,
            ElementKind::Not(e) => &mut e.ports,
            ElementKind::RTrig(e) | ElementKind::FTrig(e) => &mut e.ports,
            ElementKind::Timer(e) => &mut e.ports,
            ElementKind::Counter(e) => &mut e.ports,
            ElementKind::Mux(e) => &mut e.ports,
            ElementKind::Ser(e) => &mut e.ports,
            ElementKind::Node(e) => &mut e.ports,
            ElementKind::AnalogBinary(e) => &mut e.ports,
            ElementKind::AnalogUnary(e) => &mut e.ports,
            ElementKind::ComplexBinary(e) => &mut e.ports,
            ElementKind::ComplexUnary(e) => &mut e.ports,
            ElementKind::Magnitude(e) => &mut e.ports,
            ElementKind::Convert(e) => &mut e.ports,
            ElementKind::Analog1PWinding(e) => &mut e.ports,
            ElementKind::Analog3PWinding(e) => &mut e.ports,
            ElementKind::PhasorShift(e) => &mut e.ports,
            ElementKind::Pid(e) => &mut e.ports,
            ElementKind::Overcurrent(e) => &mut e.ports,
            ElementKind::Math(e) => &mut e.ports,
        }
    }

    /// Every element's update is total: it produces a defined output for
    /// any input, even a disconnected or mistyped one.
    pub fn update(&mut self, inputs: &[PortValue], time: Time) {
        match self {
            ElementKind::And(e) | ElementKind::Or(e) => e.update(inputs),
            ElementKind::Not(e) => e.update(inputs),
            ElementKind::RTrig(e) | ElementKind::FTrig(e) => e.update(inputs),
            ElementKind::Timer(e) => e.update(inputs, time),
            ElementKind::Counter(e) => e.update(inputs),
            ElementKind::Mux(e) => e.update(inputs),
            ElementKind::Ser(e) => e.update(inputs, time),
            ElementKind::Node(e) => e.update(inputs, time),
            ElementKind::AnalogBinary(e) => e.update(inputs),
            ElementKind::AnalogUnary(e) => e.update(inputs),
            ElementKind::ComplexBinary(e) => e.update(inputs),
            ElementKind::ComplexUnary(e) => e.update(inputs),
            ElementKind::Magnitude(e) => e.update(inputs),
            ElementKind::Convert(e) => e.update(inputs),
            ElementKind::Analog1PWinding(e) => e.update(inputs),
            ElementKind::Analog3PWinding(e) => e.update(inputs),
            ElementKind::PhasorShift(e) => e.update(inputs),
            ElementKind::Pid(e) => e.update(inputs, time),
            ElementKind::Overcurrent(e) => e.update(inputs, time),
            ElementKind::Math(e) => e.update(inputs),
        }
    }
}

/// One element inside an `Engine`: its declared name, its rank in the
/// topological update order, and its concrete behavior.
pub struct ElementSlot {
    pub name: String,
    pub order: usize,
    pub kind: ElementKind,
}
