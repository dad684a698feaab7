//! # Flowscope - Workflow Variable & Type Resolution Engine
//!
//! **Flowscope** computes, for any node of a visually-authored workflow
//! graph, the complete list of value expressions that may legally be
//! referenced at that point, together with each expression's resolved
//! structural type: primitives, nested records, lists, user-defined
//! generics, and generics propagated across subflow call boundaries.
//!
//! The engine is a pure static-analysis library. It never executes a
//! workflow, performs no I/O, and holds no state between calls; every
//! invocation works over immutable snapshots supplied by the caller.
//!
//! ## Core Workflow
//!
//! 1.  **Materialize your snapshots**: the workflow's nodes and edges, the
//!     record catalog, the callable subflows, and the constant definitions.
//!     Serialized canvas payloads are parsed with [`graph::parse_graph_data`].
//! 2.  **Index the catalog**: build a [`catalog::StructureCatalog`] once per
//!     snapshot.
//! 3.  **Collect**: create a [`collect::VariableCollector`] and ask it for
//!     the grouped variable list of the node being configured.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowscope::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Parse the authored graph (or build nodes/edges directly).
//!     let graph_json = std::fs::read_to_string("path/to/workflow.json")?;
//!     let graph = parse_graph_data(&graph_json)?;
//!
//!     // 2. Index the record definitions supplied by the host.
//!     let catalog = StructureCatalog::new(Vec::new());
//!
//!     // 3. Collect the variables referenceable at a node.
//!     let collector = VariableCollector::new(
//!         &graph.nodes,
//!         &graph.edges,
//!         &[], // callable subflows
//!         &catalog,
//!         &[], // constants
//!     );
//!     for group in collector.collect(Some("api-1")) {
//!         println!("{}", group.name);
//!         for variable in &group.variables {
//!             println!("  {} ({})", variable.key, variable.value_type);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Degradation Policy
//!
//! Every malformed-input path reachable from user data degrades instead of
//! failing: unparsable subflow blobs yield no inferred outputs, dangling
//! structure references resolve `dynamic`, blank names are omitted. The
//! only fallible public surface is [`graph::parse_graph_data`]. Each
//! degradation emits a `tracing` event so hosts can observe it.

pub mod catalog;
pub mod collect;
pub mod error;
pub mod graph;
pub mod outputs;
pub mod prelude;
pub mod resolve;
pub mod subflow;
