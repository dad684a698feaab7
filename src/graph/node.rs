use serde::{Deserialize, Serialize};

use crate::resolve::{opt_collection_kind, opt_type_ref, CollectionKind, GenericTypeArgs, TypeRef, VariableType};

/// The closed set of node kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Start,
    End,
    Api,
    Kafka,
    Code,
    Condition,
    Transform,
    Subflow,
    #[serde(rename = "foreach")]
    ForEach,
    Llm,
    VectorStore,
    VariableAssigner,
    JsonParser,
    Simhash,
    KeywordMatch,
    Note,
}

/// A single node of an authored workflow graph.
///
/// Position and other canvas concerns are owned by the authoring subsystem
/// and never reach the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// User-assigned short name giving this node's outputs an alternate
    /// addressing root.
    pub alias: Option<String>,
    pub config: NodeConfig,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            alias: None,
            config: NodeConfig::empty_for(kind),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    /// The trimmed alias, if one is assigned and non-blank.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub source: String,
    pub target: String,
}

impl WorkflowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Kind-specific node configuration, holding only the fields the resolution
/// engine consults. Execution-only settings in the authored payload are
/// ignored by the canvas parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeConfig {
    Start(StartConfig),
    End(EndConfig),
    Api(ApiConfig),
    Kafka(KafkaConfig),
    Code(CodeConfig),
    Transform(TransformConfig),
    Subflow(SubflowConfig),
    ForEach(ForEachConfig),
    Llm(LlmConfig),
    VectorStore(VectorStoreConfig),
    Assigner(AssignerConfig),
    JsonParser(JsonParserConfig),
    None,
}

impl NodeConfig {
    /// The default (empty) configuration for a node kind.
    pub fn empty_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodeConfig::Start(StartConfig::default()),
            NodeKind::End => NodeConfig::End(EndConfig::default()),
            NodeKind::Api => NodeConfig::Api(ApiConfig::default()),
            NodeKind::Kafka => NodeConfig::Kafka(KafkaConfig::default()),
            NodeKind::Code => NodeConfig::Code(CodeConfig::default()),
            NodeKind::Transform => NodeConfig::Transform(TransformConfig::default()),
            NodeKind::Subflow => NodeConfig::Subflow(SubflowConfig::default()),
            NodeKind::ForEach => NodeConfig::ForEach(ForEachConfig::default()),
            NodeKind::Llm => NodeConfig::Llm(LlmConfig::default()),
            NodeKind::VectorStore => NodeConfig::VectorStore(VectorStoreConfig::default()),
            NodeKind::VariableAssigner => NodeConfig::Assigner(AssignerConfig::default()),
            NodeKind::JsonParser => NodeConfig::JsonParser(JsonParserConfig::default()),
            NodeKind::Condition | NodeKind::Simhash | NodeKind::KeywordMatch | NodeKind::Note => {
                NodeConfig::None
            }
        }
    }

    /// The output-schema payload, for kinds that can declare one.
    pub fn output_schema(&self) -> Option<&OutputSchemaConfig> {
        match self {
            NodeConfig::Api(config) => Some(&config.schema),
            NodeConfig::Kafka(config) => Some(&config.schema),
            NodeConfig::Code(config) => Some(&config.schema),
            _ => None,
        }
    }

    /// Whether this node is configured to wait for an asynchronous
    /// callback before continuing.
    pub fn waits_for_callback(&self) -> bool {
        match self {
            NodeConfig::Api(config) => config.wait_for_callback,
            NodeConfig::Kafka(config) => config.wait_for_callback,
            _ => false,
        }
    }
}

/// The widget kind of a declared workflow input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Paragraph,
    Select,
    Number,
    Structure,
}

/// One declared input of the workflow, authored on the entry node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputVariable {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub required: bool,
    pub description: Option<String>,
    /// Referenced record for structure-typed inputs.
    pub structure_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartConfig {
    pub variables: Vec<InputVariable>,
}

/// One declared output of the workflow, authored on an exit node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputVariableConfig {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub value_type: VariableType,
    #[serde(deserialize_with = "opt_type_ref")]
    pub type_ref: Option<TypeRef>,
    #[serde(deserialize_with = "opt_type_ref")]
    pub item_type_ref: Option<TypeRef>,
    /// Source expression, e.g. `{{nodes.api-1.body.data}}`.
    pub expression: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndConfig {
    pub output_variables: Vec<OutputVariableConfig>,
}

/// Declares that a node's primary output follows a catalog record,
/// optionally wrapped in a collection and with generic arguments bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputSchemaConfig {
    pub enable_output_schema: bool,
    pub output_structure_id: Option<String>,
    pub generic_type_args: GenericTypeArgs,
    #[serde(deserialize_with = "opt_collection_kind")]
    pub output_collection_type: Option<CollectionKind>,
}

impl OutputSchemaConfig {
    /// The configured structure reference, when schema output is enabled.
    pub fn structure_ref(&self) -> Option<TypeRef> {
        if !self.enable_output_schema {
            return None;
        }
        self.output_structure_id
            .as_deref()
            .and_then(TypeRef::parse)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub wait_for_callback: bool,
    #[serde(flatten)]
    pub schema: OutputSchemaConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KafkaConfig {
    pub wait_for_callback: bool,
    #[serde(flatten)]
    pub schema: OutputSchemaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeOutputMode {
    #[default]
    Auto,
    Schema,
    Custom,
}

/// A hand-declared output field of a code node in custom mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomOutput {
    pub name: String,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub value_type: VariableType,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeConfig {
    pub output_mode: CodeOutputMode,
    pub custom_outputs: Vec<CustomOutput>,
    #[serde(flatten)]
    pub schema: OutputSchemaConfig,
}

/// One target of a free-form mapping node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformMapping {
    pub target: String,
    pub source: Option<String>,
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub mappings: Vec<TransformMapping>,
}

/// Binds one declared input of a called subflow to a source expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputMapping {
    pub target_variable: String,
    pub source_expression: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubflowConfig {
    pub subflow_id: Option<String>,
    pub input_mappings: Vec<InputMapping>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForEachConfig {
    pub items_expression: Option<String>,
    pub item_variable: Option<String>,
    pub index_variable: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub output_json_enabled: bool,
    pub output_json_fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreOperation {
    Upsert,
    Delete,
    Search,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorStoreConfig {
    pub operation: Option<VectorStoreOperation>,
    /// A number, or an expression string; blank strings do not count as a
    /// configured threshold.
    pub score_threshold: Option<serde_json::Value>,
}

impl VectorStoreConfig {
    pub fn has_score_threshold(&self) -> bool {
        match &self.score_threshold {
            Some(serde_json::Value::Number(_)) => true,
            Some(serde_json::Value::String(raw)) => !raw.trim().is_empty(),
            _ => false,
        }
    }
}

/// How an assignment node computes the value it stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    /// Store a fixed literal of a declared type.
    #[default]
    Set,
    /// Copy another variable unchanged.
    Assign,
    /// Derive a value by applying an operation to a source variable.
    Transform,
}

/// The closed set of derivation operations an assignment may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    GetFirst,
    GetLast,
    GetIndex,
    Length,
    Slice,
    Reverse,
    Unique,
    Join,
    Append,
    RemoveFirst,
    RemoveLast,
    RegexReplace,
    RegexExtract,
    Trim,
    Uppercase,
    Lowercase,
    Add,
    Subtract,
    Multiply,
    Divide,
    Round,
    Floor,
    Ceil,
    Abs,
    GetField,
    Keys,
    Values,
    Not,
}

/// One assignment performed by an assignment node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentItem {
    pub variable_name: String,
    pub mode: AssignmentMode,
    /// Declared value type for `Set` mode.
    pub value_type: Option<VariableType>,
    /// Detected simple type of the copied source for `Assign` mode.
    pub source_type: Option<VariableType>,
    /// Full type rendering of the source (e.g. `List<Order>`), preferred
    /// over `source_type` when present.
    pub source_full_type: Option<String>,
    /// Element type used by element-extraction operations.
    pub element_type: Option<String>,
    pub operation: Option<TransformOp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignerConfig {
    pub assignments: Vec<AssignmentItem>,
}

/// One extraction path declared on a JSON-extraction node. `children`
/// describe nested fields and are flattened recursively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonOutputField {
    pub path: String,
    #[serde(rename = "type")]
    pub value_type: VariableType,
    pub description: Option<String>,
    pub children: Vec<JsonOutputField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonParserConfig {
    pub output_fields: Vec<JsonOutputField>,
}
