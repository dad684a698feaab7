//! Generic-binding inference across a subflow call boundary.
//!
//! A subflow declares inputs on its entry node and outputs on its exit
//! nodes; outputs may reference the subflow's generic parameters. At each
//! call site the caller's argument expressions determine what those
//! parameters mean, so the declared outputs are re-resolved against the
//! bindings before being offered downstream.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collect::{CollectOptions, SelectableVariable, VariableCollector};
use crate::graph::{
    parse_graph_data, reference_token, InputVariable, NodeConfig, NodeKind, WorkflowNode,
};
use crate::outputs::nested_structure_variables;
use crate::resolve::{TypeRef, VariableType};

/// A callable subflow as supplied by the host: its identity plus the
/// opaque serialized graph it was authored as.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubflowDefinition {
    pub id: String,
    pub name: String,
    pub graph_data: String,
}

/// Generic parameter names implied by a declared input's structure
/// reference: list/set shapes bind one parameter, maps two, user-defined
/// generic records their declared list.
fn generic_param_names(
    structure_ref: Option<&str>,
    collector: &VariableCollector<'_>,
) -> Vec<String> {
    let Some(reference) = structure_ref.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    let normalized = reference.to_lowercase();
    if normalized.contains("list") || normalized.contains("set") {
        return vec!["T".to_string()];
    }
    if normalized.contains("map") {
        return vec!["K".to_string(), "V".to_string()];
    }

    match collector.catalog().get_by_ref(reference) {
        Some(record) if record.is_generic => record
            .type_parameters
            .iter()
            .map(|param| param.name.clone())
            .filter(|name| !name.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Rewrites a declared output's type through a binding: record and generic
/// references become objects carrying the reference, primitive keywords
/// become that primitive, and any other name is kept as an opaque
/// reference alongside the declared type.
fn apply_type_binding(
    binding: Option<&TypeRef>,
    current: VariableType,
) -> (VariableType, Option<TypeRef>) {
    match binding {
        None => (current, None),
        Some(reference @ (TypeRef::Struct(_) | TypeRef::Generic(_))) => {
            (VariableType::Object, Some(reference.clone()))
        }
        Some(TypeRef::Name(name)) => match name.as_str() {
            "string" => (VariableType::String, None),
            "number" => (VariableType::Number, None),
            "boolean" => (VariableType::Boolean, None),
            "array" => (VariableType::Array, None),
            "object" => (VariableType::Object, None),
            other => (current, Some(TypeRef::Name(other.to_string()))),
        },
    }
}

/// The item-reference counterpart of [`apply_type_binding`]: only concrete
/// references and primitive keywords survive as element types.
fn apply_item_type_binding(binding: Option<&TypeRef>) -> Option<TypeRef> {
    match binding {
        Some(reference @ (TypeRef::Struct(_) | TypeRef::Generic(_))) => Some(reference.clone()),
        Some(TypeRef::Name(name)) if matches!(name.as_str(), "string" | "number" | "boolean") => {
            Some(TypeRef::Name(name.clone()))
        }
        _ => None,
    }
}

/// Collects the called subflow's declared outputs with generic parameters
/// bound from the call-site arguments, expanded into nested rows.
///
/// Degradation rules: a missing or unknown subflow id, an unparsable graph
/// blob, a subflow without exit nodes, and a subflow already being
/// inferred on this call chain all yield an empty list. Unresolvable
/// parameters are simply absent from the binding map, so the affected
/// outputs resolve dynamic.
pub fn subflow_output_variables(
    node: &WorkflowNode,
    collector: &VariableCollector<'_>,
    options: &CollectOptions,
) -> Vec<SelectableVariable> {
    let NodeConfig::Subflow(config) = &node.config else {
        return Vec::new();
    };
    let Some(subflow_id) = config
        .subflow_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return Vec::new();
    };

    if options.visited_subflows.contains(subflow_id) {
        trace!(subflow_id, "subflow already on the inference chain, skipping");
        return Vec::new();
    }

    let Some(subflow) = collector
        .subflows()
        .iter()
        .find(|subflow| subflow.id == subflow_id)
    else {
        return Vec::new();
    };

    let graph = match parse_graph_data(&subflow.graph_data) {
        Ok(graph) => graph,
        Err(error) => {
            debug!(subflow_id, %error, "unparsable subflow graph, no inferred outputs");
            return Vec::new();
        }
    };

    // Declared outputs: name-deduplicated union across all exit nodes,
    // first occurrence wins.
    let mut output_names: Vec<String> = Vec::new();
    let mut outputs_by_name = AHashMap::new();
    for exit in graph.nodes.iter().filter(|n| n.kind == NodeKind::End) {
        let NodeConfig::End(end_config) = &exit.config else {
            continue;
        };
        for output in &end_config.output_variables {
            let name = output.name.trim();
            if name.is_empty() || outputs_by_name.contains_key(name) {
                continue;
            }
            output_names.push(name.to_string());
            outputs_by_name.insert(name.to_string(), output.clone());
        }
    }
    if output_names.is_empty() {
        return Vec::new();
    }

    let declared_inputs: &[InputVariable] = graph
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Start)
        .and_then(|start| match &start.config {
            NodeConfig::Start(start_config) => Some(start_config.variables.as_slice()),
            _ => None,
        })
        .unwrap_or(&[]);

    // Variables available at the call site, with subflow inference
    // suppressed so this lookup terminates.
    let mut restricted = options.clone();
    restricted.skip_subflow_inference = true;
    restricted.visited_subflows.insert(subflow_id.to_string());
    let available: AHashMap<String, SelectableVariable> = collector
        .collect_with(Some(&node.id), &restricted)
        .into_iter()
        .flat_map(|group| group.variables)
        .map(|variable| (variable.key.clone(), variable))
        .collect();

    // Bind generic parameters from the argument expressions.
    let mut bindings: AHashMap<String, TypeRef> = AHashMap::new();
    for mapping in &config.input_mappings {
        let target = mapping.target_variable.trim();
        if target.is_empty() {
            continue;
        }
        let Some(input) = declared_inputs.iter().find(|input| input.name == target) else {
            continue;
        };
        let params = generic_param_names(input.structure_ref.as_deref(), collector);
        if params.len() != 1 {
            // Map K/V and N-ary parameters cannot be told apart from one
            // source expression; they stay unbound and resolve dynamic.
            continue;
        }
        let Some(token) = mapping
            .source_expression
            .as_deref()
            .and_then(reference_token)
        else {
            continue;
        };
        let Some(source) = available.get(token) else {
            trace!(target, token, "argument source not found at call site");
            continue;
        };

        let bound = source
            .item_type_ref
            .clone()
            .or_else(|| source.type_ref.clone())
            .unwrap_or_else(|| TypeRef::Name(source.value_type.to_string()));
        bindings.insert(params[0].clone(), bound);
    }

    // Re-resolve each declared output through the bindings and expand.
    output_names
        .iter()
        .flat_map(|name| {
            let output = &outputs_by_name[name];
            let mut value_type = output.value_type.clone();
            if value_type == VariableType::Unknown {
                value_type = VariableType::Object;
            }
            let mut type_ref = output.type_ref.clone();
            let mut item_type_ref = output.item_type_ref.clone();

            if let Some(TypeRef::Generic(param)) = &type_ref {
                let (next_type, next_ref) =
                    apply_type_binding(bindings.get(param), value_type.clone());
                value_type = next_type;
                type_ref = next_ref;
            }
            if let Some(TypeRef::Generic(param)) = &item_type_ref {
                item_type_ref = apply_item_type_binding(bindings.get(param));
            }

            let base = SelectableVariable {
                key: format!("nodes.{}.{}", node.id, name),
                name: name.clone(),
                label: if output.label.trim().is_empty() {
                    name.clone()
                } else {
                    output.label.clone()
                },
                value_type,
                type_ref,
                item_type_ref,
                description: output.description.clone().or_else(|| {
                    Some(format!("Source: {}", output.expression))
                }),
                group: node.label.clone(),
                source_node_id: Some(node.id.clone()),
            };

            let nested = nested_structure_variables(&base, collector.catalog());
            std::iter::once(base).chain(nested)
        })
        .collect()
}
