//! Common test utilities for building catalog, graph, and subflow
//! snapshots.
use flowscope::graph::{
    ApiConfig, AssignerConfig, AssignmentItem, ForEachConfig, InputKind, InputMapping,
    InputVariable, NodeConfig, NodeKind, OutputSchemaConfig, SubflowConfig, WorkflowEdge,
    WorkflowNode,
};
use flowscope::prelude::*;
use serde_json::json;

/// `Order { id: string, total: number, tags: list<string> }`: two scalar
/// leaves plus a string-list field used by the loop-typing tests.
#[allow(dead_code)]
pub fn order_record() -> RecordDefinition {
    RecordDefinition {
        id: "struct-order".to_string(),
        name: "Order".to_string(),
        qualified_name: "global.Order".to_string(),
        fields: vec![
            FieldDefinition::new("id", "string"),
            FieldDefinition::new("total", "number"),
            FieldDefinition {
                item_type: Some("string".to_string()),
                ..FieldDefinition::new("tags", "array")
            },
        ],
        ..RecordDefinition::default()
    }
}

/// A record whose `parent` field references its own definition.
#[allow(dead_code)]
pub fn category_record() -> RecordDefinition {
    RecordDefinition {
        id: "struct-category".to_string(),
        name: "Category".to_string(),
        qualified_name: "global.Category".to_string(),
        fields: vec![
            FieldDefinition::new("name", "string"),
            FieldDefinition {
                ref_structure: Some("struct-category".to_string()),
                ..FieldDefinition::new("parent", "object")
            },
        ],
        ..RecordDefinition::default()
    }
}

/// The built-in generic list shape used by structure-typed inputs.
#[allow(dead_code)]
pub fn list_record() -> RecordDefinition {
    RecordDefinition {
        id: "struct-list".to_string(),
        name: "List".to_string(),
        qualified_name: "global.List<T>".to_string(),
        type_parameters: vec![TypeParameter::new("T")],
        is_generic: true,
        ..RecordDefinition::default()
    }
}

/// `Result<T> { code: number, data: T }`, a user-defined generic record.
#[allow(dead_code)]
pub fn result_record() -> RecordDefinition {
    RecordDefinition {
        id: "struct-result".to_string(),
        name: "Result".to_string(),
        qualified_name: "global.Result<T>".to_string(),
        type_parameters: vec![TypeParameter::new("T")],
        is_generic: true,
        fields: vec![
            FieldDefinition::new("code", "number"),
            FieldDefinition::new("data", "T"),
        ],
        ..RecordDefinition::default()
    }
}

#[allow(dead_code)]
pub fn sample_catalog() -> StructureCatalog {
    StructureCatalog::new(vec![
        order_record(),
        category_record(),
        list_record(),
        result_record(),
    ])
}

#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge::new(source, target)
}

/// A start node declaring the given plain-text inputs.
#[allow(dead_code)]
pub fn start_node(id: &str, variables: Vec<InputVariable>) -> WorkflowNode {
    WorkflowNode::new(id, NodeKind::Start, "Start").with_config(NodeConfig::Start(
        flowscope::graph::StartConfig { variables },
    ))
}

#[allow(dead_code)]
pub fn text_input(name: &str) -> InputVariable {
    InputVariable {
        name: name.to_string(),
        label: name.to_string(),
        kind: InputKind::Text,
        required: true,
        ..InputVariable::default()
    }
}

#[allow(dead_code)]
pub fn structure_input(name: &str, structure_ref: &str) -> InputVariable {
    InputVariable {
        name: name.to_string(),
        label: name.to_string(),
        kind: InputKind::Structure,
        required: true,
        structure_ref: Some(structure_ref.to_string()),
        ..InputVariable::default()
    }
}

/// An API node; callback fields stay hidden unless enabled via config.
#[allow(dead_code)]
pub fn api_node(id: &str, label: &str) -> WorkflowNode {
    WorkflowNode::new(id, NodeKind::Api, label)
}

#[allow(dead_code)]
pub fn api_config(wait_for_callback: bool, schema: OutputSchemaConfig) -> NodeConfig {
    NodeConfig::Api(ApiConfig {
        wait_for_callback,
        schema,
    })
}

/// Schema config pointing the node's primary output at a catalog record.
#[allow(dead_code)]
pub fn schema_config(structure_id: &str) -> OutputSchemaConfig {
    OutputSchemaConfig {
        enable_output_schema: true,
        output_structure_id: Some(structure_id.to_string()),
        ..OutputSchemaConfig::default()
    }
}

#[allow(dead_code)]
pub fn assigner_node(id: &str, label: &str, assignments: Vec<AssignmentItem>) -> WorkflowNode {
    WorkflowNode::new(id, NodeKind::VariableAssigner, label)
        .with_config(NodeConfig::Assigner(AssignerConfig { assignments }))
}

#[allow(dead_code)]
pub fn set_assignment(name: &str, value_type: VariableType) -> AssignmentItem {
    AssignmentItem {
        variable_name: name.to_string(),
        mode: flowscope::graph::AssignmentMode::Set,
        value_type: Some(value_type),
        ..AssignmentItem::default()
    }
}

#[allow(dead_code)]
pub fn subflow_call_node(
    id: &str,
    label: &str,
    subflow_id: &str,
    mappings: Vec<(&str, &str)>,
) -> WorkflowNode {
    WorkflowNode::new(id, NodeKind::Subflow, label).with_config(NodeConfig::Subflow(
        SubflowConfig {
            subflow_id: Some(subflow_id.to_string()),
            input_mappings: mappings
                .into_iter()
                .map(|(target, expression)| InputMapping {
                    target_variable: target.to_string(),
                    source_expression: Some(expression.to_string()),
                })
                .collect(),
        },
    ))
}

#[allow(dead_code)]
pub fn foreach_node(id: &str, label: &str, items_expression: &str) -> WorkflowNode {
    WorkflowNode::new(id, NodeKind::ForEach, label).with_config(NodeConfig::ForEach(
        ForEachConfig {
            items_expression: Some(items_expression.to_string()),
            ..ForEachConfig::default()
        },
    ))
}

/// A serialized subflow graph in the canvas wire format: one entry node
/// declaring `items` (a generic list input) and one exit node returning
/// `first`, typed by the list's element parameter.
#[allow(dead_code)]
pub fn generic_subflow_blob() -> String {
    json!({
        "nodes": [
            {
                "id": "sf-start",
                "data": {
                    "label": "Start",
                    "nodeType": "start",
                    "config": {
                        "variables": [
                            {
                                "name": "items",
                                "label": "Items",
                                "type": "structure",
                                "required": true,
                                "structureRef": "List"
                            }
                        ]
                    }
                }
            },
            {
                "id": "sf-end",
                "data": {
                    "label": "End",
                    "nodeType": "end",
                    "config": {
                        "outputVariables": [
                            {
                                "name": "first",
                                "label": "First Item",
                                "type": "object",
                                "typeRef": "generic:T",
                                "expression": "{{item}}"
                            },
                            {
                                "name": "count",
                                "label": "Count",
                                "type": "number",
                                "expression": "{{context.total}}"
                            }
                        ]
                    }
                }
            }
        ],
        "edges": [
            { "source": "sf-start", "target": "sf-end" }
        ]
    })
    .to_string()
}

#[allow(dead_code)]
pub fn generic_subflow() -> SubflowDefinition {
    SubflowDefinition {
        id: "sf-1".to_string(),
        name: "Pick First".to_string(),
        graph_data: generic_subflow_blob(),
    }
}

/// A collector over borrowed parts, with empty subflows/constants elided
/// at the call sites that do not need them.
#[allow(dead_code)]
pub struct Snapshot {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    pub subflows: Vec<SubflowDefinition>,
    pub catalog: StructureCatalog,
    pub constants: Vec<ConstantDefinition>,
}

#[allow(dead_code)]
impl Snapshot {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self {
            nodes,
            edges,
            subflows: Vec::new(),
            catalog: sample_catalog(),
            constants: Vec::new(),
        }
    }

    pub fn with_subflows(mut self, subflows: Vec<SubflowDefinition>) -> Self {
        self.subflows = subflows;
        self
    }

    pub fn with_constants(mut self, constants: Vec<ConstantDefinition>) -> Self {
        self.constants = constants;
        self
    }

    pub fn collector(&self) -> VariableCollector<'_> {
        VariableCollector::new(
            &self.nodes,
            &self.edges,
            &self.subflows,
            &self.catalog,
            &self.constants,
        )
    }
}

/// Flattens groups into `(key, type)` pairs for compact assertions.
#[allow(dead_code)]
pub fn keys_and_types(groups: &[VariableGroup]) -> Vec<(String, String)> {
    groups
        .iter()
        .flat_map(|group| &group.variables)
        .map(|variable| (variable.key.clone(), variable.value_type.to_string()))
        .collect()
}

#[allow(dead_code)]
pub fn find_variable<'a>(groups: &'a [VariableGroup], key: &str) -> Option<&'a SelectableVariable> {
    groups
        .iter()
        .flat_map(|group| &group.variables)
        .find(|variable| variable.key == key)
}
