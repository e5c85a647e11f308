//! Error taxonomy. The engine never aborts on in-graph conditions -- every
//! one of these is reported so a caller can observe it, but the graph stays
//! in a valid, degraded state either way (see `RuntimeGuard` kinds, which
//! never even reach a `Result`).

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WiringError {
    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("element '{element}' has no port named '{port}'")]
    UnknownPort { element: String, port: String },

    #[error("cannot connect {src_type:?} output '{src}' to {dst_type:?} input '{dst}'")]
    TypeMismatch { src: String, src_type: crate::port::PortType, dst: String, dst_type: crate::port::PortType },

    #[error("element name '{0}' is already in use")]
    DuplicateName(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConstructionError {
    #[error("unknown element type '{0}'")]
    UnknownType(String),

    #[error("argument out of range for '{element}': {reason}")]
    ArgumentOutOfRange { element: String, reason: String },

    #[error("could not compile expression '{0}'")]
    ExpressionParse(String),

    #[error("unrecognized overcurrent curve '{0}'")]
    UnknownCurve(String),
}
