use serde::{Deserialize, Serialize};

use crate::resolve::VariableType;

/// A named structural type with ordered fields, optionally generic.
///
/// Definitions are owned and edited by an external structure-management
/// subsystem; the engine treats them as a read-only snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDefinition {
    pub id: String,
    pub name: String,
    /// Namespaced name, e.g. `global.Order` or `billing.Result<T>`.
    #[serde(alias = "fullName")]
    pub qualified_name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub type_parameters: Vec<TypeParameter>,
    pub is_generic: bool,
}

/// A single field of a [`RecordDefinition`].
///
/// `type_name` carries the declared type tag: a primitive keyword,
/// `"object"`, `"array"`/`"list"`, a generic-parameter name declared by the
/// owning record, or a catalog reference. `ref_structure`, when present,
/// overrides the tag with an explicit catalog reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: Option<String>,
    pub required: bool,
    /// Element type for list fields; may itself be a generic-parameter name.
    pub item_type: Option<String>,
    /// Referenced record (id, qualified name, or simple name).
    #[serde(alias = "refType")]
    pub ref_structure: Option<String>,
    /// Inline nested fields, used by inline objects and list elements.
    #[serde(alias = "nestedFields", alias = "itemFields")]
    pub children: Vec<FieldDefinition>,
}

impl FieldDefinition {
    /// Convenience constructor for the common name + tag case.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// A generic type parameter declared by a record, e.g. the `T` in `List<T>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named constant made referenceable as `const.<name>`.
///
/// A constant with a `flow_id` is scoped to that workflow and shadows a
/// same-named project-wide constant in the project-wide listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstantDefinition {
    pub name: String,
    pub value_type: VariableType,
    pub flow_id: Option<String>,
    pub description: Option<String>,
}
