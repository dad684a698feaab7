//! Flow-scoped variable inference.
//!
//! Assignment nodes introduce names visible to every downstream successor.
//! The reported type depends on the assignment mode; when the same name is
//! assigned more than once upstream, the assignment nearest the target (by
//! BFS discovery distance) wins. Discovery distance is an approximation of
//! control flow dominance: on diamond graphs the reported type may belong
//! to a path not taken at runtime.

use ahash::AHashMap;

use super::variable::{SelectableVariable, VariableGroup, GROUP_FLOW_VARIABLES};
use crate::graph::{AssignmentItem, AssignmentMode, NodeConfig, TransformOp, WorkflowNode};
use crate::resolve::VariableType;

/// The result type of a derived-transform assignment, from the fixed
/// per-operation table.
fn transform_result_type(item: &AssignmentItem) -> VariableType {
    use TransformOp::*;

    match item.operation {
        Some(GetFirst | GetLast | GetIndex) => item
            .element_type
            .as_deref()
            .map(str::trim)
            .filter(|element| !element.is_empty())
            .map(VariableType::from_name)
            .unwrap_or(VariableType::Object),
        Some(Length) => VariableType::Number,
        Some(Join) => VariableType::String,
        Some(Keys | Values | Slice | Reverse | Unique | Append | RemoveFirst | RemoveLast) => {
            VariableType::Array
        }
        Some(Not) => VariableType::Boolean,
        Some(Add | Subtract | Multiply | Divide | Round | Floor | Ceil | Abs) => {
            VariableType::Number
        }
        Some(Trim | Uppercase | Lowercase | RegexReplace | RegexExtract) => VariableType::String,
        Some(GetField) | None => item
            .source_type
            .clone()
            .unwrap_or(VariableType::Unknown),
    }
}

/// The type a single assignment gives its variable.
fn assignment_type(item: &AssignmentItem) -> VariableType {
    match item.mode {
        AssignmentMode::Set => item.value_type.clone().unwrap_or(VariableType::String),
        AssignmentMode::Assign => item
            .source_full_type
            .as_deref()
            .map(str::trim)
            .filter(|full| !full.is_empty())
            .map(|full| VariableType::Named(full.to_string()))
            .or_else(|| item.source_type.clone())
            .unwrap_or(VariableType::Unknown),
        AssignmentMode::Transform => transform_result_type(item),
    }
}

/// Scans upstream assignment nodes and builds the flow-variable group.
///
/// Predecessors arrive in BFS discovery order, nearest-to-target first;
/// walking them reversed makes an assignment closer to the target override
/// a farther one, and within one node later list entries override earlier
/// ones. First-introduction order is preserved for display.
pub(crate) fn flow_variable_group(predecessors: &[&WorkflowNode]) -> Option<VariableGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: AHashMap<String, (VariableType, String)> = AHashMap::new();

    for node in predecessors.iter().rev() {
        let NodeConfig::Assigner(config) = &node.config else {
            continue;
        };
        for item in &config.assignments {
            let name = item.variable_name.trim();
            if name.is_empty() {
                continue;
            }
            let value_type = assignment_type(item);
            if !by_name.contains_key(name) {
                order.push(name.to_string());
            }
            by_name.insert(name.to_string(), (value_type, node.label.clone()));
        }
    }

    if order.is_empty() {
        return None;
    }

    let variables = order
        .into_iter()
        .filter_map(|name| {
            let (value_type, source_label) = by_name.remove(&name)?;
            let mut variable = SelectableVariable::new(
                format!("var.{}", name),
                name,
                value_type,
                GROUP_FLOW_VARIABLES,
            );
            variable.description = Some(format!("Flow variable (source: {})", source_label));
            Some(variable)
        })
        .collect();

    Some(VariableGroup::new(GROUP_FLOW_VARIABLES, variables))
}
