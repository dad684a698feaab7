//! The variable collector: assembles the ordered, grouped list of every
//! value expression referenceable at a node.

mod assignment;
mod iteration;
pub mod variable;

pub use variable::*;

use itertools::Itertools;

use crate::catalog::{ConstantDefinition, StructureCatalog};
use crate::graph::{
    predecessors, InputKind, NodeConfig, NodeKind, WorkflowEdge, WorkflowNode,
};
use crate::outputs::{nested_structure_variables, node_outputs};
use crate::resolve::{TypeRef, VariableType};
use crate::subflow::{subflow_output_variables, SubflowDefinition};

/// Borrows one immutable snapshot of everything variable collection reads:
/// the graph being edited, the callable subflows, the record catalog, and
/// the constant definitions.
///
/// The collector holds no state of its own, so one instance can serve any
/// number of [`collect`](Self::collect) calls, including re-entrant ones
/// made while a call is computing subflow bindings.
pub struct VariableCollector<'a> {
    nodes: &'a [WorkflowNode],
    edges: &'a [WorkflowEdge],
    subflows: &'a [SubflowDefinition],
    catalog: &'a StructureCatalog,
    constants: &'a [ConstantDefinition],
}

impl<'a> VariableCollector<'a> {
    pub fn new(
        nodes: &'a [WorkflowNode],
        edges: &'a [WorkflowEdge],
        subflows: &'a [SubflowDefinition],
        catalog: &'a StructureCatalog,
        constants: &'a [ConstantDefinition],
    ) -> Self {
        Self {
            nodes,
            edges,
            subflows,
            catalog,
            constants,
        }
    }

    pub fn catalog(&self) -> &StructureCatalog {
        self.catalog
    }

    pub fn subflows(&self) -> &[SubflowDefinition] {
        self.subflows
    }

    /// Collects the full grouped variable list for a node with default
    /// options. `None` yields only the position-independent groups.
    pub fn collect(&self, current_node_id: Option<&str>) -> Vec<VariableGroup> {
        self.collect_with(current_node_id, &CollectOptions::default())
    }

    /// Collects the grouped variable list. The group order is a display
    /// contract: workflow inputs, execution context, constants, alias
    /// groups, flow variables, one group per upstream node, and loop
    /// variables when the target is a for-each node. Later steps only add
    /// groups, never remove earlier ones.
    pub fn collect_with(
        &self,
        current_node_id: Option<&str>,
        options: &CollectOptions,
    ) -> Vec<VariableGroup> {
        let mut groups = Vec::new();

        if let Some(group) = self.workflow_input_group() {
            groups.push(group);
        }
        groups.push(execution_context_group());
        groups.extend(self.constant_groups());
        groups.extend(self.alias_groups());

        if let Some(current_node_id) = current_node_id {
            let upstream = predecessors(current_node_id, self.nodes, self.edges);

            if let Some(group) = assignment::flow_variable_group(&upstream) {
                groups.push(group);
            }

            for node in &upstream {
                if let Some(group) = self.predecessor_group(node, options) {
                    groups.push(group);
                }
            }

            if let Some(current) = self.nodes.iter().find(|node| node.id == current_node_id) {
                if let Some(group) = iteration::iteration_group(current, &groups, self.catalog) {
                    groups.push(group);
                }
            }
        }

        groups
    }

    /// Group 1: declared workflow inputs from the entry node, structurally
    /// expanded where their declared type is a record or collection.
    fn workflow_input_group(&self) -> Option<VariableGroup> {
        let start = self.nodes.iter().find(|node| node.kind == NodeKind::Start)?;
        let NodeConfig::Start(config) = &start.config else {
            return None;
        };
        if config.variables.is_empty() {
            return None;
        }

        let variables = config
            .variables
            .iter()
            .flat_map(|input| {
                let mut base = SelectableVariable::new(
                    format!("input.{}", input.name),
                    input.name.clone(),
                    match input.kind {
                        InputKind::Number => VariableType::Number,
                        InputKind::Structure => VariableType::Object,
                        InputKind::Text | InputKind::Paragraph | InputKind::Select => {
                            VariableType::String
                        }
                    },
                    GROUP_WORKFLOW_INPUTS,
                );
                base.label = input.label.clone();
                base.description = input.description.clone();

                if input.kind != InputKind::Structure {
                    return vec![base];
                }
                let Some(record) = input
                    .structure_ref
                    .as_deref()
                    .and_then(|reference| self.catalog.get_by_ref(reference))
                else {
                    return vec![base];
                };

                match record.name.to_lowercase().as_str() {
                    "list" | "set" => {
                        base.value_type = VariableType::Array;
                        base.item_type_ref = record
                            .type_parameters
                            .first()
                            .map(|param| TypeRef::Generic(param.name.clone()));
                    }
                    "map" => {
                        base.type_ref = record
                            .type_parameters
                            .get(1)
                            .or_else(|| record.type_parameters.first())
                            .map(|param| TypeRef::Generic(param.name.clone()));
                    }
                    _ => {
                        base.type_ref = Some(TypeRef::Struct(record.id.clone()));
                    }
                }

                let nested = nested_structure_variables(&base, self.catalog);
                let mut expanded = vec![base];
                expanded.extend(nested);
                expanded
            })
            .collect();

        Some(VariableGroup::new(GROUP_WORKFLOW_INPUTS, variables))
    }

    /// Group 3: constants, split into project-wide and workflow-local. A
    /// workflow-local constant shadows a same-named project-wide entry in
    /// the project-wide listing.
    fn constant_groups(&self) -> Vec<VariableGroup> {
        if self.constants.is_empty() {
            return Vec::new();
        }

        let workflow_names: Vec<&str> = self
            .constants
            .iter()
            .filter(|constant| constant.flow_id.is_some())
            .map(|constant| constant.name.as_str())
            .collect();

        let constant_variable = |constant: &ConstantDefinition, group: &str| {
            let mut variable = SelectableVariable::new(
                format!("const.{}", constant.name),
                constant.name.clone(),
                constant.value_type.clone(),
                group,
            );
            variable.description = constant.description.clone();
            variable
        };

        let mut groups = Vec::new();

        let project: Vec<SelectableVariable> = self
            .constants
            .iter()
            .filter(|constant| constant.flow_id.is_none())
            .filter(|constant| !constant.name.trim().is_empty())
            .filter(|constant| !workflow_names.contains(&constant.name.as_str()))
            .map(|constant| constant_variable(constant, GROUP_PROJECT_CONSTANTS))
            .collect();
        if !project.is_empty() {
            groups.push(VariableGroup::new(GROUP_PROJECT_CONSTANTS, project));
        }

        let workflow: Vec<SelectableVariable> = self
            .constants
            .iter()
            .filter(|constant| constant.flow_id.is_some())
            .filter(|constant| !constant.name.trim().is_empty())
            .map(|constant| constant_variable(constant, GROUP_WORKFLOW_CONSTANTS))
            .collect();
        if !workflow.is_empty() {
            groups.push(VariableGroup::new(GROUP_WORKFLOW_CONSTANTS, workflow));
        }

        groups
    }

    /// Group 4: one synthetic group per distinct alias, in first-seen
    /// order. The first aliased node supplies the shape; the rest only
    /// widen the source description.
    fn alias_groups(&self) -> Vec<VariableGroup> {
        let mut aliases: Vec<(String, Vec<&WorkflowNode>)> = Vec::new();
        for node in self.nodes {
            if node.kind == NodeKind::Start {
                continue;
            }
            let Some(alias) = node.alias_name() else {
                continue;
            };
            match aliases.iter_mut().find(|(name, _)| name == alias) {
                Some((_, nodes)) => nodes.push(node),
                None => aliases.push((alias.to_string(), vec![node])),
            }
        }

        aliases
            .into_iter()
            .filter_map(|(alias, alias_nodes)| {
                let representative = alias_nodes[0];
                let sources = alias_nodes.iter().map(|node| node.label.as_str()).join(", ");

                let prefix = format!("nodes.{}.", representative.id);
                let variables: Vec<SelectableVariable> =
                    node_outputs(representative, self.catalog)
                        .into_iter()
                        .map(|mut variable| {
                            if let Some(rest) = variable.key.strip_prefix(&prefix) {
                                variable.key = format!("{}.{}", alias, rest);
                            }
                            variable.group = alias.clone();
                            variable.description = Some(match variable.description {
                                Some(description) => {
                                    format!("{} (source: {})", description, sources)
                                }
                                None => format!("Source: {}", sources),
                            });
                            variable
                        })
                        .collect();

                if variables.is_empty() {
                    return None;
                }
                Some(VariableGroup::new(alias, variables))
            })
            .collect()
    }

    /// Group 6: one group per transitive predecessor, excluding the kinds
    /// that never contribute node outputs.
    fn predecessor_group(
        &self,
        node: &WorkflowNode,
        options: &CollectOptions,
    ) -> Option<VariableGroup> {
        match node.kind {
            NodeKind::Start | NodeKind::VariableAssigner => return None,
            NodeKind::Subflow if options.skip_subflow_inference => return None,
            _ => {}
        }

        let mut outputs = Vec::new();
        if node.kind == NodeKind::Subflow {
            outputs.extend(subflow_output_variables(node, self, options));
        }
        outputs.extend(node_outputs(node, self.catalog));

        if outputs.is_empty() {
            return None;
        }
        Some(VariableGroup::new(node.label.clone(), outputs))
    }
}

/// Group 2: fixed execution-context pseudo-variables.
fn execution_context_group() -> VariableGroup {
    let mut execution_id = SelectableVariable::new(
        "context.executionId",
        "executionId",
        VariableType::String,
        GROUP_EXECUTION_CONTEXT,
    );
    execution_id.label = "Execution Id".to_string();
    execution_id.description = Some("Unique id of the current execution".to_string());

    let mut flow_id = SelectableVariable::new(
        "context.flowId",
        "flowId",
        VariableType::String,
        GROUP_EXECUTION_CONTEXT,
    );
    flow_id.label = "Workflow Id".to_string();
    flow_id.description = Some("Id of the workflow definition".to_string());

    let mut timestamp = SelectableVariable::new(
        "context.timestamp",
        "timestamp",
        VariableType::Number,
        GROUP_EXECUTION_CONTEXT,
    );
    timestamp.label = "Timestamp".to_string();
    timestamp.description = Some("Timestamp at the start of the execution".to_string());

    VariableGroup::new(
        GROUP_EXECUTION_CONTEXT,
        vec![execution_id, flow_id, timestamp],
    )
}
