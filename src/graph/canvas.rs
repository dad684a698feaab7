use serde::Deserialize;
use tracing::debug;

use super::node::{NodeConfig, NodeKind, WorkflowEdge, WorkflowNode};
use crate::error::GraphDataError;

/// The wire shape of a serialized canvas graph, as stored by the authoring
/// subsystem. Only the engine-relevant parts are decoded; positions,
/// selection state, and render hints are ignored.
#[derive(Debug, Deserialize)]
struct CanvasGraph {
    #[serde(default)]
    nodes: Vec<CanvasNode>,
    #[serde(default)]
    edges: Vec<CanvasEdge>,
}

#[derive(Debug, Deserialize)]
struct CanvasNode {
    id: String,
    data: CanvasNodeData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasNodeData {
    #[serde(default)]
    label: String,
    node_type: NodeKind,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    config: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CanvasEdge {
    source: String,
    target: String,
}

/// A parsed workflow graph: the canonical node/edge lists every engine
/// entry point consumes.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

/// Decodes one kind-specific config payload, degrading to the kind's empty
/// config when the payload does not match the expected shape.
fn decode_config(kind: NodeKind, node_id: &str, value: Option<serde_json::Value>) -> NodeConfig {
    let Some(value) = value else {
        return NodeConfig::empty_for(kind);
    };

    fn decode<T: serde::de::DeserializeOwned + Default>(node_id: &str, value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap_or_else(|error| {
            debug!(node_id, %error, "malformed node config, using defaults");
            T::default()
        })
    }

    match kind {
        NodeKind::Start => NodeConfig::Start(decode(node_id, value)),
        NodeKind::End => NodeConfig::End(decode(node_id, value)),
        NodeKind::Api => NodeConfig::Api(decode(node_id, value)),
        NodeKind::Kafka => NodeConfig::Kafka(decode(node_id, value)),
        NodeKind::Code => NodeConfig::Code(decode(node_id, value)),
        NodeKind::Transform => NodeConfig::Transform(decode(node_id, value)),
        NodeKind::Subflow => NodeConfig::Subflow(decode(node_id, value)),
        NodeKind::ForEach => NodeConfig::ForEach(decode(node_id, value)),
        NodeKind::Llm => NodeConfig::Llm(decode(node_id, value)),
        NodeKind::VectorStore => NodeConfig::VectorStore(decode(node_id, value)),
        NodeKind::VariableAssigner => NodeConfig::Assigner(decode(node_id, value)),
        NodeKind::JsonParser => NodeConfig::JsonParser(decode(node_id, value)),
        NodeKind::Condition | NodeKind::Simhash | NodeKind::KeywordMatch | NodeKind::Note => {
            NodeConfig::None
        }
    }
}

/// Parses a serialized canvas payload into canonical nodes and edges.
///
/// This is the only fallible engine surface; internal callers (subflow
/// inference) swallow the error into an empty result.
pub fn parse_graph_data(raw: &str) -> Result<WorkflowGraph, GraphDataError> {
    let canvas: CanvasGraph =
        serde_json::from_str(raw).map_err(|error| GraphDataError::Json(error.to_string()))?;

    let nodes = canvas
        .nodes
        .into_iter()
        .map(|node| {
            let config = decode_config(node.data.node_type, &node.id, node.data.config);
            WorkflowNode {
                id: node.id,
                kind: node.data.node_type,
                label: node.data.label,
                alias: node.data.alias,
                config,
            }
        })
        .collect();

    let edges = canvas
        .edges
        .into_iter()
        .map(|edge| WorkflowEdge::new(edge.source, edge.target))
        .collect();

    Ok(WorkflowGraph { nodes, edges })
}
