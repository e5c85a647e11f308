//! Soft real-time logic-graph execution core for protective relaying and
//! industrial control.
//!
//! A graph is built from named elements (gates, timers, phasor estimators,
//! PID loops, inverse-time overcurrent curves, ...) wired together through
//! typed, named ports. [`Engine::update`] drives the whole graph forward one
//! tick at a time: every element runs exactly once, in a topologically valid
//! order, consuming the outputs its predecessors produced on the same tick.
//!
//! ```ignore
//! use relay_core::prelude::*;
//! use relay_time::Time;
//!
//! let mut engine = Engine::new("demo", 8);
//! engine.add_element("a", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
//! engine.add_element("b", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
//! engine.add_element("gate", ElementKind::And(Gate::new(2, false))).unwrap();
//! engine.connect("a", "output", "gate", "input_0").unwrap();
//! engine.connect("b", "output", "gate", "input_1").unwrap();
//! engine.update(Time::get_time());
//! ```
//!
//! External collaborators (board I/O, a command server, a DNP3 outstation)
//! are not part of this crate: they interact with a running graph only
//! through designated [`Node`] elements between ticks.

pub mod arith;
pub mod builder;
pub mod control;
pub mod convert;
pub mod digital;
pub mod element;
pub mod engine;
pub mod error;
pub mod math_expr;
pub mod node;
pub mod phasor;
pub mod port;

pub use builder::{build_element, build_engine};
pub use element::{ElementKind, ElementSlot};
pub use engine::Engine;
pub use error::{ConstructionError, WiringError};
pub use node::{IndexedSample, Node};
pub use port::{InputPort, OutputPort, PortSet, PortType, PortValue, Source};

pub mod prelude {
    pub use crate::arith::{AnalogBinary, AnalogUnary, BinaryOp, ComplexBinary, ComplexUnary, Magnitude, UnaryOp};
    pub use crate::builder::{build_element, build_engine};
    pub use crate::control::{Curve, CurveConstants, Overcurrent, Pid};
    pub use crate::convert::{Conversion, ConversionKind};
    pub use crate::digital::{Counter, EdgeTrigger, Gate, Mux, Not, Ser, SerEdge, SerEvent, Timer};
    pub use crate::element::ElementKind;
    pub use crate::engine::Engine;
    pub use crate::error::{ConstructionError, WiringError};
    pub use crate::math_expr::Math;
    pub use crate::node::{IndexedSample, Node};
    pub use crate::phasor::{Analog1PWinding, Analog3PWinding, PhasorShift};
    pub use crate::port::{PortSet, PortType, PortValue};
}
