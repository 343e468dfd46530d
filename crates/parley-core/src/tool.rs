use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

/// A tool the model may call
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    /// Name the model uses to call the tool
    pub name: String,
    /// What the tool does, for the model's benefit
    pub description: String,
    /// Parameter schema
    pub schema: ToolSchema,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: ToolSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// Loosely-typed tool parameter schema
///
/// `None` properties means the tool takes no arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSchema {
    pub properties: Option<ToolProperties>,
}

impl ToolSchema {
    pub const fn new(properties: ToolProperties) -> Self {
        Self {
            properties: Some(properties),
        }
    }
}

/// Parameter definitions in one of the two accepted shapes
///
/// Either a JSON object built directly, or JSON bytes produced by
/// serializing an arbitrary value. Both resolve to the same object form via
/// [`ToolProperties::canonicalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolProperties {
    /// Property definitions as a JSON object
    Map(Map<String, Value>),
    /// Serialized JSON, expected to decode to an object
    Opaque(Vec<u8>),
}

impl ToolProperties {
    /// Serialize any value into the opaque form
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(value).map(Self::Opaque)
    }

    /// Resolve to a JSON object
    pub fn canonicalize(&self) -> Result<Cow<'_, Map<String, Value>>, serde_json::Error> {
        match self {
            Self::Map(map) => Ok(Cow::Borrowed(map)),
            Self::Opaque(bytes) => serde_json::from_slice(bytes).map(Cow::Owned),
        }
    }
}

impl From<Map<String, Value>> for ToolProperties {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}
