//! Loop-context variables for the for-each node being configured.

use ahash::AHashMap;

use super::variable::{SelectableVariable, VariableGroup, GROUP_ITERATION_VARIABLES};
use crate::catalog::StructureCatalog;
use crate::graph::{reference_token, NodeConfig, WorkflowNode};
use crate::outputs::nested_structure_variables;
use crate::resolve::{TypeRef, VariableType};

/// Builds the iteration group for a for-each node: the per-item variable
/// typed from the configured collection source, plus the numeric index.
/// Both names are user-configurable; keys are the bare names.
pub(crate) fn iteration_group(
    current: &WorkflowNode,
    groups: &[VariableGroup],
    catalog: &StructureCatalog,
) -> Option<VariableGroup> {
    let NodeConfig::ForEach(config) = &current.config else {
        return None;
    };
    let items_expression = config
        .items_expression
        .as_deref()
        .map(str::trim)
        .filter(|expression| !expression.is_empty())?;

    let available: AHashMap<&str, &SelectableVariable> = groups
        .iter()
        .flat_map(|group| &group.variables)
        .map(|variable| (variable.key.as_str(), variable))
        .collect();

    let token = reference_token(items_expression).unwrap_or(items_expression);
    let source = available.get(token).copied();

    let item_name = config
        .item_variable
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("item");
    let index_name = config
        .index_variable
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("index");

    let mut variables = Vec::new();

    let (item_type, item_type_ref) = match source {
        Some(variable) if variable.value_type.is_list() => {
            let inferred = variable
                .item_type_ref
                .as_ref()
                .or(variable.type_ref.as_ref());
            match inferred {
                Some(TypeRef::Name(name))
                    if matches!(name.as_str(), "string" | "number" | "boolean" | "array") =>
                {
                    (VariableType::from_name(name), None)
                }
                Some(reference) => (VariableType::Object, Some(reference.clone())),
                None => (VariableType::Object, None),
            }
        }
        _ => (VariableType::Unknown, None),
    };

    let mut item_variable = SelectableVariable::new(
        item_name,
        item_name,
        item_type,
        GROUP_ITERATION_VARIABLES,
    );
    item_variable.type_ref = item_type_ref;
    item_variable.description = Some(match source {
        Some(variable) => format!("Source: {}", variable.label),
        None => "Loop item variable".to_string(),
    });

    let nested = nested_structure_variables(&item_variable, catalog);
    variables.push(item_variable);
    variables.extend(nested);

    let mut index_variable = SelectableVariable::new(
        index_name,
        index_name,
        VariableType::Number,
        GROUP_ITERATION_VARIABLES,
    );
    index_variable.description = Some("Loop index".to_string());
    variables.push(index_variable);

    Some(VariableGroup::new(GROUP_ITERATION_VARIABLES, variables))
}
