//! Builds a running [`Engine`] from a declarative [`GraphDescription`] —
//! the only surface an outer layer (config loader, command handler, tests)
//! uses to assemble a graph, per the element/net definitions the core
//! exposes instead of exposing its internals directly.
//!
//! Construction failures and unresolved nets are reported through `tracing`
//! and collected as warnings rather than aborting the load: a config loader
//! that refuses to start because one element's arguments were malformed
//! would take down every other element with it, which is exactly the
//! failure mode the engine's total-update discipline exists to avoid.

use crate::arith::{AnalogBinary, AnalogUnary, BinaryOp, ComplexBinary, ComplexUnary, Magnitude, UnaryOp};
use crate::control::{Overcurrent, Pid};
use crate::convert::{Conversion, ConversionKind};
use crate::digital::{Counter, EdgeTrigger, Gate, Mux, Not, Ser, Timer};
use crate::element::ElementKind;
use crate::engine::Engine;
use crate::error::ConstructionError;
use crate::math_expr::Math;
use crate::node::Node;
use crate::phasor::{Analog1PWinding, Analog3PWinding, PhasorShift};
use crate::port::PortType;
use relay_config::{ArgValue, ElementTypeDef, GraphDescription};

const MAX_NAME_LEN: usize = 8;
const MAX_TEXT_ARG_LEN: usize = 64;

fn arg_error(def: &ElementTypeDef, reason: impl Into<String>) -> ConstructionError {
    ConstructionError::ArgumentOutOfRange { element: def.name.clone(), reason: reason.into() }
}

fn float_at(def: &ElementTypeDef, i: usize) -> Result<f32, ConstructionError> {
    match def.args.get(i) {
        Some(ArgValue::Float(v)) => Ok(*v),
        Some(ArgValue::UInt(v)) => Ok(*v as f32),
        other => Err(arg_error(def, format!("expected float argument at position {i}, got {other:?}"))),
    }
}

fn uint_at(def: &ElementTypeDef, i: usize) -> Result<u16, ConstructionError> {
    match def.args.get(i) {
        Some(ArgValue::UInt(v)) => Ok(*v),
        other => Err(arg_error(def, format!("expected unsigned integer argument at position {i}, got {other:?}"))),
    }
}

fn bool_at(def: &ElementTypeDef, i: usize) -> Result<bool, ConstructionError> {
    match def.args.get(i) {
        Some(ArgValue::Bool(v)) => Ok(*v),
        other => Err(arg_error(def, format!("expected boolean argument at position {i}, got {other:?}"))),
    }
}

fn text_at<'a>(def: &'a ElementTypeDef, i: usize) -> Result<&'a str, ConstructionError> {
    match def.args.get(i) {
        Some(ArgValue::Text(v)) if v.len() <= MAX_TEXT_ARG_LEN => Ok(v.as_str()),
        Some(ArgValue::Text(v)) => Err(arg_error(def, format!("text argument '{v}' exceeds {MAX_TEXT_ARG_LEN} characters"))),
        other => Err(arg_error(def, format!("expected text argument at position {i}, got {other:?}"))),
    }
}

/// Dispatches one [`ElementTypeDef`] to its concrete [`ElementKind`]
/// constructor by `kind` tag. Unknown tags and malformed arguments are
/// reported as [`ConstructionError`]; the element is never half-built.
pub fn build_element(def: &ElementTypeDef, default_history_len: usize) -> Result<ElementKind, ConstructionError> {
    if def.name.len() > MAX_NAME_LEN {
        return Err(arg_error(def, format!("element name exceeds {MAX_NAME_LEN} characters")));
    }

    match def.kind.as_str() {
        "and" => Ok(ElementKind::And(Gate::new(uint_at(def, 0)? as usize, false))),
        "or" => Ok(ElementKind::Or(Gate::new(uint_at(def, 0)? as usize, true))),
        "not" => Ok(ElementKind::Not(Not::new())),
        "rtrig" => Ok(ElementKind::RTrig(EdgeTrigger::new(true))),
        "ftrig" => Ok(ElementKind::FTrig(EdgeTrigger::new(false))),
        "timer" => Ok(ElementKind::Timer(Timer::new(float_at(def, 0)?, float_at(def, 1)?))),
        "counter" => Ok(ElementKind::Counter(Counter::new(uint_at(def, 0)? as u32))),
        "mux_digital" => Ok(ElementKind::Mux(Mux::new(uint_at(def, 0)? as usize, PortType::Digital))),
        "mux_analog" => Ok(ElementKind::Mux(Mux::new(uint_at(def, 0)? as usize, PortType::Analog))),
        "mux_complex" => Ok(ElementKind::Mux(Mux::new(uint_at(def, 0)? as usize, PortType::Complex))),
        "ser" => Ok(ElementKind::Ser(Ser::new(uint_at(def, 0)? as usize))),
        "node_digital" => Ok(ElementKind::Node(Node::new(PortType::Digital, history_len(def, default_history_len)?))),
        "node_analog" => Ok(ElementKind::Node(Node::new(PortType::Analog, history_len(def, default_history_len)?))),
        "node_complex" => Ok(ElementKind::Node(Node::new(PortType::Complex, history_len(def, default_history_len)?))),
        "add_analog" => Ok(ElementKind::AnalogBinary(AnalogBinary::new(BinaryOp::Add))),
        "sub_analog" => Ok(ElementKind::AnalogBinary(AnalogBinary::new(BinaryOp::Subtract))),
        "mul_analog" => Ok(ElementKind::AnalogBinary(AnalogBinary::new(BinaryOp::Multiply))),
        "div_analog" => Ok(ElementKind::AnalogBinary(AnalogBinary::new(BinaryOp::Divide))),
        "neg_analog" => Ok(ElementKind::AnalogUnary(AnalogUnary::new(UnaryOp::Negate))),
        "abs_analog" => Ok(ElementKind::AnalogUnary(AnalogUnary::new(UnaryOp::Abs))),
        "add_complex" => Ok(ElementKind::ComplexBinary(ComplexBinary::new(BinaryOp::Add))),
        "sub_complex" => Ok(ElementKind::ComplexBinary(ComplexBinary::new(BinaryOp::Subtract))),
        "mul_complex" => Ok(ElementKind::ComplexBinary(ComplexBinary::new(BinaryOp::Multiply))),
        "div_complex" => Ok(ElementKind::ComplexBinary(ComplexBinary::new(BinaryOp::Divide))),
        "neg_complex" => Ok(ElementKind::ComplexUnary(ComplexUnary::new(UnaryOp::Negate))),
        "abs_complex" => Ok(ElementKind::ComplexUnary(ComplexUnary::new(UnaryOp::Abs))),
        "magnitude" => Ok(ElementKind::Magnitude(Magnitude::new())),
        "rect2polar" => Ok(ElementKind::Convert(Conversion::new(ConversionKind::Rect2Polar))),
        "polar2rect" => Ok(ElementKind::Convert(Conversion::new(ConversionKind::Polar2Rect))),
        "rect2complex" => Ok(ElementKind::Convert(Conversion::new(ConversionKind::Rect2Complex))),
        "complex2rect" => Ok(ElementKind::Convert(Conversion::new(ConversionKind::Complex2Rect))),
        "polar2complex" => Ok(ElementKind::Convert(Conversion::new(ConversionKind::Polar2Complex))),
        "complex2polar" => Ok(ElementKind::Convert(Conversion::new(ConversionKind::Complex2Polar))),
        "winding1p" => Ok(ElementKind::Analog1PWinding(Analog1PWinding::new(uint_at(def, 0)? as usize))),
        "winding3p" => Ok(ElementKind::Analog3PWinding(Analog3PWinding::new(uint_at(def, 0)? as usize))),
        "phasor_shift" => Ok(ElementKind::PhasorShift(PhasorShift::new(float_at(def, 0)?, float_at(def, 1)?))),
        "pid" => Ok(ElementKind::Pid(Pid::new(
            float_at(def, 0)?,
            float_at(def, 1)?,
            float_at(def, 2)?,
            float_at(def, 3)?,
            float_at(def, 4)?,
            3,
        ))),
        "overcurrent" => Ok(ElementKind::Overcurrent(Overcurrent::new(
            text_at(def, 0)?,
            float_at(def, 1)?,
            float_at(def, 2)?,
            float_at(def, 3)?,
            bool_at(def, 4)?,
        )?)),
        "math" => Ok(ElementKind::Math(Math::new(text_at(def, 0)?, uint_at(def, 1)? as usize)?)),
        other => Err(ConstructionError::UnknownType(other.to_string())),
    }
}

fn history_len(def: &ElementTypeDef, default_history_len: usize) -> Result<usize, ConstructionError> {
    match def.args.first() {
        None => Ok(default_history_len),
        Some(ArgValue::UInt(v)) => Ok(*v as usize),
        Some(other) => Err(arg_error(def, format!("expected unsigned integer history length, got {other:?}"))),
    }
}

/// Builds an [`Engine`] from a [`GraphDescription`]: constructs every
/// element, then wires every net. Unknown element types, malformed
/// arguments, and unresolved net endpoints are logged and skipped rather
/// than failing the whole load -- mirroring the core's own policy that an
/// in-graph condition is reported, never fatal. Returns the engine plus the
/// list of warnings encountered, so a caller (or a test) can assert on the
/// graph being wired as expected without swallowing problems silently.
pub fn build_engine(graph: &GraphDescription) -> (Engine, Vec<String>) {
    let mut engine = Engine::new(graph.name.clone(), graph.default_history_len);
    let mut warnings = Vec::new();

    for def in &graph.elements {
        match build_element(def, graph.default_history_len) {
            Ok(kind) => {
                if let Err(err) = engine.add_element(def.name.clone(), kind) {
                    tracing::warn!(element = %def.name, error = %err, "skipping element");
                    warnings.push(format!("{}: {err}", def.name));
                }
            }
            Err(err) => {
                tracing::warn!(element = %def.name, error = %err, "skipping element");
                warnings.push(format!("{}: {err}", def.name));
            }
        }
    }

    for net in &graph.nets {
        for input in &net.inputs {
            if let Err(err) = engine.connect(&net.output.element, &net.output.port, &input.element, &input.port) {
                tracing::warn!(
                    src = %format!("{}.{}", net.output.element, net.output.port),
                    dst = %format!("{}.{}", input.element, input.port),
                    error = %err,
                    "skipping net"
                );
                warnings.push(format!("{}.{} -> {}.{}: {err}", net.output.element, net.output.port, input.element, input.port));
            }
        }
    }

    (engine, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortValue;
    use relay_time::Time;

    fn load(doc: &str) -> GraphDescription {
        toml::from_str(doc).expect("valid graph toml")
    }

    #[test]
    fn builds_and_wires_and_of_two_from_toml() {
        let graph = load(
            r#"
            name = "and_demo"
            default_history_len = 4

            [[elements]]
            name = "a"
            kind = "node_digital"

            [[elements]]
            name = "b"
            kind = "node_digital"

            [[elements]]
            name = "gate"
            kind = "and"
            args = [2]

            [[elements]]
            name = "out"
            kind = "node_digital"

            [[nets]]
            output = { element = "a", port = "output" }
            inputs = [{ element = "gate", port = "input_0" }]

            [[nets]]
            output = { element = "b", port = "output" }
            inputs = [{ element = "gate", port = "input_1" }]

            [[nets]]
            output = { element = "gate", port = "output" }
            inputs = [{ element = "out", port = "input" }]
            "#,
        );

        let (mut engine, warnings) = build_engine(&graph);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        if let Some(ElementKind::Node(n)) = engine.element_mut("a") {
            n.set_current(PortValue::Digital(true));
        }
        if let Some(ElementKind::Node(n)) = engine.element_mut("b") {
            n.set_current(PortValue::Digital(true));
        }
        engine.update(Time::new(0, 0, 0, 0, 0, 0));
        assert!(engine.output_value("out", "output").unwrap().as_digital());
    }

    #[test]
    fn skipped_element_warning_is_observable_through_tracing_subscriber() {
        use tracing_subscriber::EnvFilter;

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("WARN")))
            .with_test_writer()
            .try_init();

        let graph = load(
            r#"
            [[elements]]
            name = "mystery"
            kind = "not_a_real_kind"
            "#,
        );
        let (engine, warnings) = build_engine(&graph);
        assert_eq!(engine.element_count(), 0);
        assert_eq!(warnings, vec!["mystery: unknown element type 'not_a_real_kind'"]);
    }

    #[test]
    fn unknown_element_type_is_skipped_with_a_warning() {
        let graph = load(
            r#"
            [[elements]]
            name = "mystery"
            kind = "not_a_real_kind"
            "#,
        );
        let (engine, warnings) = build_engine(&graph);
        assert_eq!(engine.element_count(), 0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unresolved_net_endpoint_is_skipped_with_a_warning() {
        let graph = load(
            r#"
            [[elements]]
            name = "a"
            kind = "node_digital"

            [[nets]]
            output = { element = "a", port = "output" }
            inputs = [{ element = "does_not_exist", port = "input" }]
            "#,
        );
        let (engine, warnings) = build_engine(&graph);
        assert_eq!(engine.element_count(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn overcurrent_element_builds_from_declarative_args() {
        let graph = load(
            r#"
            [[elements]]
            name = "oc"
            kind = "overcurrent"
            args = ["C1", 100.0, 1.0, 0.0, false]
            "#,
        );
        let (engine, warnings) = build_engine(&graph);
        assert!(warnings.is_empty());
        assert!(engine.element("oc").is_some());
    }
}
