use std::fmt;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::catalog::FieldDefinition;

/// Built-in scalar tags produced by type resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    String,
    Number,
    Boolean,
    /// The "anything goes" tag every malformed or unknown reference
    /// degrades to.
    Dynamic,
}

impl fmt::Display for PrimitiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            PrimitiveTag::String => "string",
            PrimitiveTag::Number => "number",
            PrimitiveTag::Boolean => "boolean",
            PrimitiveTag::Dynamic => "dynamic",
        };
        write!(f, "{}", tag)
    }
}

/// A symbolic reference to a type, in its parsed form.
///
/// The wire format is a plain string: `struct:<id>` for catalog records by
/// id, `generic:<param>` for generic-parameter references, and any other
/// non-empty string (record name, qualified name, or primitive keyword) as
/// [`TypeRef::Name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Struct(String),
    Generic(String),
    Name(String),
}

impl TypeRef {
    /// Parses a reference string; blank input is no reference at all.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if let Some(id) = reference.strip_prefix("struct:") {
            return Some(TypeRef::Struct(id.to_string()));
        }
        if let Some(param) = reference.strip_prefix("generic:") {
            return Some(TypeRef::Generic(param.to_string()));
        }
        Some(TypeRef::Name(reference.to_string()))
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, TypeRef::Generic(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Struct(id) => write!(f, "struct:{}", id),
            TypeRef::Generic(param) => write!(f, "generic:{}", param),
            TypeRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TypeRef::parse(&raw).ok_or_else(|| serde::de::Error::custom("empty type reference"))
    }
}

/// Deserializes an optional reference field, treating blank strings as
/// absent. For use with `#[serde(deserialize_with)]`.
pub(crate) fn opt_type_ref<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TypeRef>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(TypeRef::parse))
}

/// The display/selection tag attached to every referenceable variable.
///
/// `Named` carries record names and full generic type renderings (such as
/// `List<Order>`) that flow through assignment passthrough without losing
/// their precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Dynamic,
    #[default]
    Unknown,
    Named(String),
}

impl VariableType {
    /// Parses a type tag; unrecognized names become [`VariableType::Named`],
    /// so this never fails.
    pub fn from_name(raw: &str) -> Self {
        match raw.trim() {
            "string" => VariableType::String,
            "number" => VariableType::Number,
            "boolean" => VariableType::Boolean,
            "object" => VariableType::Object,
            "array" | "list" => VariableType::Array,
            "dynamic" => VariableType::Dynamic,
            "" | "unknown" => VariableType::Unknown,
            name => VariableType::Named(name.to_string()),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, VariableType::Array)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::String => write!(f, "string"),
            VariableType::Number => write!(f, "number"),
            VariableType::Boolean => write!(f, "boolean"),
            VariableType::Object => write!(f, "object"),
            VariableType::Array => write!(f, "array"),
            VariableType::Dynamic => write!(f, "dynamic"),
            VariableType::Unknown => write!(f, "unknown"),
            VariableType::Named(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for VariableType {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(VariableType::from_name(raw))
    }
}

impl From<PrimitiveTag> for VariableType {
    fn from(tag: PrimitiveTag) -> Self {
        match tag {
            PrimitiveTag::String => VariableType::String,
            PrimitiveTag::Number => VariableType::Number,
            PrimitiveTag::Boolean => VariableType::Boolean,
            PrimitiveTag::Dynamic => VariableType::Dynamic,
        }
    }
}

impl Serialize for VariableType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VariableType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(VariableType::from_name(&raw))
    }
}

/// The structural shape a symbolic type reference resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Primitive(PrimitiveTag),
    /// A record shape. `origin` carries the catalog id when the shape came
    /// from a catalog lookup; it is what the cycle guard keys on.
    Record {
        fields: Vec<FieldDefinition>,
        origin: Option<String>,
    },
    List {
        item: Box<ResolvedType>,
    },
    /// An unresolved reference to an in-scope generic parameter.
    GenericRef(String),
}

impl ResolvedType {
    pub fn dynamic() -> Self {
        ResolvedType::Primitive(PrimitiveTag::Dynamic)
    }

    pub fn empty_record() -> Self {
        ResolvedType::Record {
            fields: Vec::new(),
            origin: None,
        }
    }
}

/// One flattened row of a resolved record: a dotted path and the resolved
/// tag of the value found there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub path: String,
    #[serde(rename = "type")]
    pub value_type: VariableType,
    #[serde(default, deserialize_with = "opt_type_ref")]
    pub type_ref: Option<TypeRef>,
    #[serde(default, deserialize_with = "opt_type_ref")]
    pub item_type_ref: Option<TypeRef>,
    #[serde(default)]
    pub description: Option<String>,
}
