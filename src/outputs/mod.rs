//! Per-node-kind output policy.
//!
//! Every node kind carries a fixed table of declared outputs; several kinds
//! augment or filter that table from their configuration (callback gating,
//! vector-store operation policy, structured-output fields, output-schema
//! substitution). The policy is pure over `(node, catalog)` and never
//! inspects other nodes.

use ahash::AHashSet;

use crate::catalog::StructureCatalog;
use crate::collect::SelectableVariable;
use crate::graph::{NodeConfig, NodeKind, WorkflowNode};
use crate::resolve::{record_fields_by_ref, SchemaField, TypeRef, VariableType};

/// One declared output of a node kind, before it is keyed to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputField {
    pub name: String,
    pub label: String,
    pub value_type: VariableType,
    pub description: Option<String>,
}

/// Declares a node kind's fixed output table.
macro_rules! output_fields {
    ( $( ($name:expr, $label:expr, $ty:ident, $desc:expr) ),* $(,)? ) => {
        vec![ $( OutputField {
            name: $name.to_string(),
            label: $label.to_string(),
            value_type: VariableType::$ty,
            description: Some($desc.to_string()),
        } ),* ]
    };
}

/// The fixed output table of a node kind, unfiltered.
pub fn static_output_fields(kind: NodeKind) -> Vec<OutputField> {
    match kind {
        NodeKind::Api => output_fields![
            ("statusCode", "Status Code", Number, "HTTP response status code"),
            ("body", "Response Body", Object, "HTTP response content"),
            ("headers", "Response Headers", Object, "HTTP response headers"),
            ("callbackKey", "Callback Key", String, "Correlation key for the awaited callback"),
            ("callbackData", "Callback Data", Object, "Payload returned by the callback"),
        ],
        NodeKind::Kafka => output_fields![
            ("topic", "Topic", String, "Topic the message was published to"),
            ("messageKey", "Message Key", String, "Key of the published message"),
            ("callbackKey", "Callback Key", String, "Correlation key for the awaited callback"),
            ("callbackData", "Callback Data", Object, "Payload returned by the callback"),
        ],
        NodeKind::Code => output_fields![
            ("result", "Result", Object, "Structured data returned by the script"),
            ("stdout", "Standard Output", String, "Captured standard output"),
            ("stderr", "Error Output", String, "Captured error output"),
            ("durationMs", "Duration", Number, "Execution time in milliseconds"),
        ],
        NodeKind::Condition => output_fields![
            ("result", "Result", Boolean, "Outcome of the condition expression"),
        ],
        NodeKind::Transform => output_fields![
            ("data", "Mapped Data", Object, "Result of the configured mappings"),
        ],
        NodeKind::Subflow => output_fields![
            ("_status", "Status", String, "Completion status of the called subflow"),
            ("_executionId", "Execution Id", String, "Execution instance id of the called subflow"),
        ],
        NodeKind::ForEach => output_fields![
            ("mode", "Mode", String, "Serial or parallel execution"),
            ("total", "Total", Number, "Number of iterated elements"),
            ("successCount", "Succeeded", Number, "Number of successful iterations"),
            ("failedCount", "Failed", Number, "Number of failed iterations"),
            ("results", "Results", Array, "Per-item outputs (index/item/output/error)"),
        ],
        NodeKind::Llm => output_fields![
            ("text", "Text", String, "Text content returned by the model"),
            ("model", "Model", String, "Model that served the request"),
            ("usage", "Usage", Object, "Token usage statistics"),
            ("response", "Raw Response", Object, "Raw provider response"),
        ],
        NodeKind::VectorStore => output_fields![
            ("operation", "Operation", String, "Vector store operation performed"),
            ("count", "Count", Number, "Number of written or deleted entries"),
            ("matches", "Matches", Array, "Similarity search results"),
            ("matchedIds", "Matched Ids", Array, "Ids meeting the similarity threshold"),
            ("raw", "Raw Response", Object, "Raw vector store response"),
        ],
        NodeKind::Simhash => output_fields![
            ("simhash", "Simhash", String, "64-bit simhash, hex encoded"),
            ("stored", "Stored", Boolean, "Whether the hash was persisted"),
            ("matchedContentIds", "Matched Content Ids", Array, "Content ids within the distance threshold"),
            ("matches", "Matches", Array, "Match details (contentId/flowId/distance/simhash)"),
        ],
        NodeKind::KeywordMatch => output_fields![
            ("hit", "Hit", Boolean, "Whether any keyword matched"),
            ("actionLevel", "Action Level", String, "Highest action level among matched groups"),
            ("matchedTerms", "Matched Terms", Array, "Matched keyword terms"),
            ("matchedGroups", "Matched Groups", Array, "Matched rule group details"),
        ],
        NodeKind::Start
        | NodeKind::End
        | NodeKind::VariableAssigner
        | NodeKind::JsonParser
        | NodeKind::Note => Vec::new(),
    }
}

fn retain_not_named(fields: &mut Vec<OutputField>, names: &[&str]) {
    fields.retain(|field| !names.contains(&field.name.as_str()));
}

/// The fixed table after configuration-driven filtering and augmentation:
/// vector-store operation policy, callback gating, LLM structured-output
/// fields, and the collection-type rewrite of the primary field.
pub fn declared_output_fields(node: &WorkflowNode) -> Vec<OutputField> {
    let mut fields = static_output_fields(node.kind);

    match &node.config {
        NodeConfig::VectorStore(config) => {
            let has_threshold = config.has_score_threshold();
            match config.operation {
                Some(crate::graph::VectorStoreOperation::Search) => {
                    retain_not_named(&mut fields, &["count"]);
                    if !has_threshold {
                        retain_not_named(&mut fields, &["matchedIds"]);
                    }
                }
                Some(_) => retain_not_named(&mut fields, &["matches", "matchedIds"]),
                None => {
                    if !has_threshold {
                        retain_not_named(&mut fields, &["matchedIds"]);
                    }
                }
            }
        }
        NodeConfig::Llm(config) => {
            if config.output_json_enabled && !config.output_json_fields.is_empty() {
                let existing: AHashSet<&str> =
                    fields.iter().map(|field| field.name.as_str()).collect();
                let mut dynamic: Vec<OutputField> = config
                    .output_json_fields
                    .iter()
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty() && !existing.contains(name))
                    .map(|name| OutputField {
                        name: name.to_string(),
                        label: name.to_string(),
                        value_type: VariableType::Object,
                        description: Some("Parsed from the structured JSON output".to_string()),
                    })
                    .collect();
                dynamic.extend(fields);
                fields = dynamic;
            }
        }
        _ => {
            if matches!(node.kind, NodeKind::Api | NodeKind::Kafka)
                && !node.config.waits_for_callback()
            {
                retain_not_named(&mut fields, &["callbackKey", "callbackData"]);
            }
            if let Some(schema) = node.config.output_schema() {
                if schema
                    .output_collection_type
                    .is_some_and(|kind| kind.is_list_like())
                {
                    let target = if node.kind == NodeKind::Api { "body" } else { "result" };
                    for field in &mut fields {
                        if field.name == target {
                            field.value_type = VariableType::Array;
                        }
                    }
                }
            }
        }
    }

    fields
}

/// Flattens the node's configured output record, with its generic
/// arguments bound. Generic structure references and map collections
/// expose no rows.
pub fn schema_output_fields(node: &WorkflowNode, catalog: &StructureCatalog) -> Vec<SchemaField> {
    let Some(schema) = node.config.output_schema() else {
        return Vec::new();
    };
    let Some(reference) = schema.structure_ref() else {
        return Vec::new();
    };
    if reference.is_generic() {
        return Vec::new();
    }
    if schema
        .output_collection_type
        .is_some_and(|kind| !kind.is_list_like())
    {
        return Vec::new();
    }

    let id = match &reference {
        TypeRef::Struct(id) => id.clone(),
        TypeRef::Name(name) => name.clone(),
        TypeRef::Generic(_) => return Vec::new(),
    };

    record_fields_by_ref(
        &TypeRef::Struct(id),
        catalog,
        Some(&schema.generic_type_args),
    )
}

/// Expands a record-shaped variable into one row per nested leaf/branch.
pub fn nested_structure_variables(
    base: &SelectableVariable,
    catalog: &StructureCatalog,
) -> Vec<SelectableVariable> {
    let Some(reference) = base.structure_ref() else {
        return Vec::new();
    };

    record_fields_by_ref(reference, catalog, None)
        .into_iter()
        .map(|row| SelectableVariable {
            key: format!("{}.{}", base.key, row.path),
            name: format!("{}.{}", base.name, row.path),
            label: format!("{}.{}", base.name, row.path),
            value_type: row.value_type,
            type_ref: row.type_ref,
            item_type_ref: row.item_type_ref,
            description: row
                .description
                .or_else(|| Some(format!("{} field", base.label))),
            group: base.group.clone(),
            source_node_id: base.source_node_id.clone(),
        })
        .collect()
}

fn node_scoped(node: &WorkflowNode, name: &str) -> String {
    format!("nodes.{}.{}", node.id, name)
}

fn plain_variable(node: &WorkflowNode, field: &OutputField) -> SelectableVariable {
    SelectableVariable {
        key: node_scoped(node, &field.name),
        name: field.name.clone(),
        label: field.label.clone(),
        value_type: field.value_type.clone(),
        type_ref: None,
        item_type_ref: None,
        description: field.description.clone(),
        group: node.label.clone(),
        source_node_id: Some(node.id.clone()),
    }
}

/// A node's resolved outputs: the declared table with dynamic augmentation
/// applied, as addressable variables.
///
/// Subflow-call nodes yield only their metadata fields here; inferred
/// outputs come from binding inference, which needs call-site context this
/// policy deliberately does not have.
pub fn node_outputs(node: &WorkflowNode, catalog: &StructureCatalog) -> Vec<SelectableVariable> {
    match &node.config {
        NodeConfig::Transform(config) => transform_outputs(node, config),
        NodeConfig::JsonParser(config) => json_parser_outputs(node, config),
        NodeConfig::Code(config) if config.output_mode == crate::graph::CodeOutputMode::Custom => {
            code_custom_outputs(node, config)
        }
        _ => standard_outputs(node, catalog),
    }
}

fn transform_outputs(
    node: &WorkflowNode,
    config: &crate::graph::TransformConfig,
) -> Vec<SelectableVariable> {
    config
        .mappings
        .iter()
        .filter(|mapping| !mapping.target.trim().is_empty())
        .map(|mapping| {
            let target = mapping.target.trim();
            let description = match (&mapping.source, &mapping.expression) {
                (Some(source), _) if !source.trim().is_empty() => {
                    format!("Source: {}", source.trim())
                }
                (_, Some(expression)) if !expression.trim().is_empty() => {
                    format!("Expression: {}", expression.trim())
                }
                _ => "Mapped output field".to_string(),
            };
            let mut variable = SelectableVariable::new(
                node_scoped(node, target),
                target,
                VariableType::Dynamic,
                node.label.clone(),
            );
            variable.description = Some(description);
            variable.source_node_id = Some(node.id.clone());
            variable
        })
        .collect()
}

fn json_parser_outputs(
    node: &WorkflowNode,
    config: &crate::graph::JsonParserConfig,
) -> Vec<SelectableVariable> {
    fn flatten(
        fields: &[crate::graph::JsonOutputField],
        parent: &str,
        node: &WorkflowNode,
        out: &mut Vec<SelectableVariable>,
    ) {
        for field in fields {
            let path = field.path.trim();
            if path.is_empty() {
                continue;
            }
            let full_path = if parent.is_empty() {
                path.to_string()
            } else {
                format!("{}.{}", parent, path)
            };

            let mut variable = SelectableVariable::new(
                node_scoped(node, &full_path),
                full_path.clone(),
                field.value_type.clone(),
                node.label.clone(),
            );
            variable.description = Some(
                field
                    .description
                    .clone()
                    .unwrap_or_else(|| "JSON extraction field".to_string()),
            );
            variable.source_node_id = Some(node.id.clone());
            out.push(variable);

            flatten(&field.children, &full_path, node, out);
        }
    }

    let mut out = Vec::new();
    flatten(&config.output_fields, "", node, &mut out);
    out
}

fn code_custom_outputs(
    node: &WorkflowNode,
    config: &crate::graph::CodeConfig,
) -> Vec<SelectableVariable> {
    let custom: Vec<_> = config
        .custom_outputs
        .iter()
        .filter(|output| !output.name.trim().is_empty())
        .collect();
    let custom_names: AHashSet<&str> =
        custom.iter().map(|output| output.name.trim()).collect();

    let mut variables: Vec<SelectableVariable> = custom
        .iter()
        .map(|output| {
            let name = output.name.trim();
            let mut variable = SelectableVariable::new(
                node_scoped(node, &format!("result.{}", name)),
                name,
                output.value_type.clone(),
                node.label.clone(),
            );
            variable.label = output.label.clone().unwrap_or_else(|| name.to_string());
            variable.description = Some(
                output
                    .description
                    .clone()
                    .unwrap_or_else(|| "Custom output field".to_string()),
            );
            variable.source_node_id = Some(node.id.clone());
            variable
        })
        .collect();

    variables.extend(
        static_output_fields(node.kind)
            .iter()
            .filter(|field| !custom_names.contains(field.name.as_str()))
            .map(|field| plain_variable(node, field)),
    );

    variables
}

/// The common path: declared table plus output-schema substitution.
///
/// When flattening produced rows, they replace the primary field (first of
/// `body`, `result` present), prefixed with its name; with a list/set
/// collection configured the primary itself survives as an array whose
/// item reference names the schema record, so loops can still address the
/// collection root. A `generic:` structure reference rewrites the primary
/// in place instead, since an unbound generic has nothing to flatten.
fn standard_outputs(node: &WorkflowNode, catalog: &StructureCatalog) -> Vec<SelectableVariable> {
    let statics = declared_output_fields(node);
    let schema = node.config.output_schema();
    let schema_ref = schema.and_then(|config| config.structure_ref());
    let collection = schema.and_then(|config| config.output_collection_type);
    let schema_rows = schema_output_fields(node, catalog);

    let primary: Option<String> = ["body", "result"]
        .into_iter()
        .find(|name| statics.iter().any(|field| field.name == *name))
        .map(str::to_string);

    let mut variables = Vec::new();
    let mut used: AHashSet<String> = AHashSet::new();

    if !schema_rows.is_empty() {
        if let (Some(primary_name), Some(kind)) = (&primary, collection) {
            if kind.is_list_like() {
                if let Some(field) = statics.iter().find(|field| &field.name == primary_name) {
                    let mut root = plain_variable(node, field);
                    root.value_type = VariableType::Array;
                    root.item_type_ref = schema_ref
                        .as_ref()
                        .map(|reference| struct_ref(reference));
                    variables.push(root);
                    used.insert(primary_name.clone());
                }
            }
        }

        for row in schema_rows {
            let name = match &primary {
                Some(primary_name) => format!("{}.{}", primary_name, row.path),
                None => row.path.clone(),
            };
            variables.push(SelectableVariable {
                key: node_scoped(node, &name),
                name: name.clone(),
                label: name.clone(),
                value_type: row.value_type,
                type_ref: row.type_ref,
                item_type_ref: row.item_type_ref,
                description: Some(
                    row.description
                        .unwrap_or_else(|| "Output structure field".to_string()),
                ),
                group: node.label.clone(),
                source_node_id: Some(node.id.clone()),
            });
            used.insert(name);
        }

        for field in &statics {
            if Some(&field.name) == primary.as_ref() || used.contains(&field.name) {
                continue;
            }
            variables.push(plain_variable(node, field));
        }
        return variables;
    }

    let generic_ref = schema_ref.filter(|reference| reference.is_generic());
    for field in &statics {
        if let (Some(reference), Some(primary_name)) = (&generic_ref, &primary) {
            if &field.name == primary_name {
                let mut variable = plain_variable(node, field);
                if collection.is_some_and(|kind| kind.is_list_like()) {
                    variable.value_type = VariableType::Array;
                    variable.item_type_ref = Some(reference.clone());
                } else {
                    variable.value_type = VariableType::Object;
                    variable.type_ref = Some(reference.clone());
                }
                variables.push(variable);
                continue;
            }
        }
        variables.push(plain_variable(node, field));
    }

    variables
}

/// Normalizes a schema reference to the id-addressed form used for item
/// references.
fn struct_ref(reference: &TypeRef) -> TypeRef {
    match reference {
        TypeRef::Name(name) => TypeRef::Struct(name.clone()),
        other => other.clone(),
    }
}
