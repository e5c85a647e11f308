//! Declarative graph description: the on-disk surface that builds an engine
//! graph from a TOML document instead of hand-written `add_element`/`add_net`
//! calls.

use serde::Deserialize;
use std::path::Path;

/// One of the up to five positional constructor arguments an element type
/// accepts. Kept as a small tagged union rather than a free-form TOML value
/// so construction errors surface before an element is even built.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    UInt(u16),
    Float(f32),
    Text(String),
}

/// One element to be constructed, by name and type, with its constructor
/// arguments in declaration order.
#[derive(Clone, Debug, Deserialize)]
pub struct ElementTypeDef {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub args: Vec<ArgValue>,
}

/// A single wiring endpoint: an element name plus one of its port names.
#[derive(Clone, Debug, Deserialize)]
pub struct PortRef {
    pub element: String,
    pub port: String,
}

/// One net: a single output port feeding any number of input ports.
#[derive(Clone, Debug, Deserialize)]
pub struct NetDef {
    pub output: PortRef,
    pub inputs: Vec<PortRef>,
}

/// A full graph description as deserialized from TOML: the engine's own
/// attributes (name, default node history length) plus the elements to
/// construct and the nets to wire between them.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphDescription {
    #[serde(default = "defaults::engine_name")]
    pub name: String,
    #[serde(default = "defaults::default_history_len")]
    pub default_history_len: usize,
    #[serde(default)]
    pub elements: Vec<ElementTypeDef>,
    #[serde(default)]
    pub nets: Vec<NetDef>,
}

impl Default for GraphDescription {
    fn default() -> Self {
        Self {
            name: defaults::engine_name(),
            default_history_len: defaults::default_history_len(),
            elements: Vec::new(),
            nets: Vec::new(),
        }
    }
}

mod defaults {
    pub fn engine_name() -> String {
        "graph".to_string()
    }

    pub fn default_history_len() -> usize {
        8
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph description")]
    Parse(#[from] toml::de::Error),
}

impl GraphDescription {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let graph: GraphDescription = toml::from_str(&text)?;
        Ok(graph)
    }
}
