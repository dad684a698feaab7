use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::resolve::{opt_type_ref, TypeRef, VariableType};

pub const GROUP_WORKFLOW_INPUTS: &str = "Workflow Inputs";
pub const GROUP_EXECUTION_CONTEXT: &str = "Execution Context";
pub const GROUP_PROJECT_CONSTANTS: &str = "Project Constants";
pub const GROUP_WORKFLOW_CONSTANTS: &str = "Workflow Constants";
pub const GROUP_FLOW_VARIABLES: &str = "Flow Variables";
pub const GROUP_ITERATION_VARIABLES: &str = "Iteration Variables";

/// One value expression referenceable at a node, with its resolved type.
///
/// `key` is the addressable form stored into expressions (for example
/// `nodes.<id>.<path>`, `input.<name>`, `const.<name>`); it is unique
/// within one collected list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableVariable {
    pub key: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub value_type: VariableType,
    #[serde(default, deserialize_with = "opt_type_ref")]
    pub type_ref: Option<TypeRef>,
    #[serde(default, deserialize_with = "opt_type_ref")]
    pub item_type_ref: Option<TypeRef>,
    #[serde(default)]
    pub description: Option<String>,
    pub group: String,
    #[serde(default)]
    pub source_node_id: Option<String>,
}

impl SelectableVariable {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        value_type: VariableType,
        group: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            key: key.into(),
            label: name.clone(),
            name,
            value_type,
            type_ref: None,
            item_type_ref: None,
            description: None,
            group: group.into(),
            source_node_id: None,
        }
    }

    /// The reference to expand this variable's record shape through:
    /// list-typed variables expand their element, everything else its own
    /// type reference.
    pub fn structure_ref(&self) -> Option<&TypeRef> {
        if self.value_type.is_list() {
            self.item_type_ref.as_ref().or(self.type_ref.as_ref())
        } else {
            self.type_ref.as_ref()
        }
    }
}

/// An ordered, named slice of the variable listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableGroup {
    pub name: String,
    pub variables: Vec<SelectableVariable>,
}

impl VariableGroup {
    pub fn new(name: impl Into<String>, variables: Vec<SelectableVariable>) -> Self {
        Self {
            name: name.into(),
            variables,
        }
    }
}

/// Options for a collection pass.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Suppresses subflow-output inference for subflow-kind predecessors.
    /// Used by the restricted "available variables only" mode and
    /// internally when computing call-site variables for binding
    /// inference, which guarantees that inference terminates.
    pub skip_subflow_inference: bool,
    /// Subflow ids already being inferred on this call chain. A call site
    /// whose subflow id is in here yields no inferred outputs, so a
    /// subflow that reaches itself through any number of intermediates
    /// cannot recurse.
    pub visited_subflows: AHashSet<String>,
}

impl CollectOptions {
    /// The restricted mode: available variables only, no subflow-output
    /// inference.
    pub fn restricted() -> Self {
        Self {
            skip_subflow_inference: true,
            visited_subflows: AHashSet::new(),
        }
    }
}
