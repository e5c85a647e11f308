//! Typed port values and the named input/output port registry every element
//! carries. Wiring is type-checked once at `connect` time; the hot path
//! (`Engine::update`) never inspects a type tag again.

/// The three value shapes a port can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortType {
    Digital,
    Analog,
    Complex,
}

/// A concrete value flowing across a connection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PortValue {
    Digital(bool),
    Analog(f32),
    Complex(f32, f32),
}

impl PortValue {
    pub fn port_type(&self) -> PortType {
        match self {
            PortValue::Digital(_) => PortType::Digital,
            PortValue::Analog(_) => PortType::Analog,
            PortValue::Complex(..) => PortType::Complex,
        }
    }

    pub fn default_for(port_type: PortType) -> PortValue {
        match port_type {
            PortType::Digital => PortValue::Digital(false),
            PortType::Analog => PortValue::Analog(0.0),
            PortType::Complex => PortValue::Complex(0.0, 0.0),
        }
    }

    pub fn as_digital(&self) -> bool {
        match self {
            PortValue::Digital(v) => *v,
            _ => false,
        }
    }

    pub fn as_analog(&self) -> f32 {
        match self {
            PortValue::Analog(v) => *v,
            _ => 0.0,
        }
    }

    pub fn as_complex(&self) -> (f32, f32) {
        match self {
            PortValue::Complex(re, im) => (*re, *im),
            _ => (0.0, 0.0),
        }
    }
}

/// Identifies an output port belonging to some element, by element index and
/// output-port index inside that element. Resolved once by the engine at
/// `connect` time and never re-looked-up by name on the hot path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Source {
    pub element_index: usize,
    pub output_index: usize,
}

/// A single named input port. `source` is `None` when disconnected, in which
/// case the element reads `PortValue::default_for(port_type)`.
#[derive(Clone, Debug)]
pub struct InputPort {
    pub name: &'static str,
    pub port_type: PortType,
    pub source: Option<Source>,
}

impl InputPort {
    pub fn new(name: &'static str, port_type: PortType) -> Self {
        Self { name, port_type, source: None }
    }
}

/// A single named output port, owning its current value.
#[derive(Clone, Debug)]
pub struct OutputPort {
    pub name: &'static str,
    pub port_type: PortType,
    pub value: PortValue,
}

impl OutputPort {
    pub fn new(name: &'static str, port_type: PortType) -> Self {
        Self { name, port_type, value: PortValue::default_for(port_type) }
    }
}

/// The port registry every element embeds: an ordered list of named input
/// ports and an ordered list of named output ports.
#[derive(Clone, Debug, Default)]
pub struct PortSet {
    pub inputs: Vec<InputPort>,
    pub outputs: Vec<OutputPort>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: &'static str, port_type: PortType) -> Self {
        self.inputs.push(InputPort::new(name, port_type));
        self
    }

    pub fn with_output(mut self, name: &'static str, port_type: PortType) -> Self {
        self.outputs.push(OutputPort::new(name, port_type));
        self
    }

    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.name == name)
    }

    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.name == name)
    }
}
