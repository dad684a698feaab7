//! Prelude module for convenient imports
//!
//! Re-exports the types most hosts need: snapshot building, graph parsing,
//! and variable collection.

// Catalog snapshot
pub use crate::catalog::{
    ConstantDefinition, FieldDefinition, RecordDefinition, StructureCatalog, TypeParameter,
};

// Graph model and parsing
pub use crate::graph::{
    parse_graph_data, predecessors, reference_token, NodeConfig, NodeKind, WorkflowEdge,
    WorkflowGraph, WorkflowNode,
};

// Variable collection
pub use crate::collect::{
    CollectOptions, SelectableVariable, VariableCollector, VariableGroup,
};

// Type resolution
pub use crate::resolve::{
    CollectionKind, GenericTypeArg, GenericTypeArgs, PrimitiveTag, ResolvedType, SchemaField,
    TypeRef, VariableType,
};

// Subflow inference
pub use crate::subflow::SubflowDefinition;

// Error types
pub use crate::error::GraphDataError;
