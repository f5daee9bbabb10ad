//! The pipeline graph.
//!
//! A `Workflow` is a compiled set of edges between `Stage`s. Edges are either
//! direct, a two-way branch decided by a router function, or the end of the
//! run. `WorkflowBuilder::compile` rejects graphs without an entry, with
//! dangling stages, or with cycles, so every compiled workflow terminates.

use std::collections::{HashMap, HashSet};
use std::fmt;

use ordo_contracts::{
    agent::AgentState,
    error::{OrdoError, OrdoResult},
};

/// One pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ParseQuery,
    CheckPermissions,
    SelectTools,
    ExecuteTools,
    FilterResults,
    AggregateResults,
    GenerateResponse,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ParseQuery => "parse_query",
            Stage::CheckPermissions => "check_permissions",
            Stage::SelectTools => "select_tools",
            Stage::ExecuteTools => "execute_tools",
            Stage::FilterResults => "filter_results",
            Stage::AggregateResults => "aggregate_results",
            Stage::GenerateResponse => "generate_response",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of a branch router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Continue,
    Error,
}

/// Decides which side of a branch a state takes.
pub type Router = fn(&AgentState) -> Route;

#[derive(Clone, Copy)]
enum Edge {
    Direct(Stage),
    Branch {
        router: Router,
        on_continue: Stage,
        on_error: Stage,
    },
    End,
}

impl Edge {
    fn targets(&self) -> Vec<Stage> {
        match self {
            Edge::Direct(next) => vec![*next],
            Edge::Branch { on_continue, on_error, .. } => vec![*on_continue, *on_error],
            Edge::End => Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct WorkflowBuilder {
    entry: Option<Stage>,
    edges: HashMap<Stage, Edge>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, stage: Stage) -> Self {
        self.entry = Some(stage);
        self
    }

    pub fn edge(mut self, from: Stage, to: Stage) -> Self {
        self.edges.insert(from, Edge::Direct(to));
        self
    }

    pub fn branch(mut self, from: Stage, router: Router, on_continue: Stage, on_error: Stage) -> Self {
        self.edges.insert(from, Edge::Branch { router, on_continue, on_error });
        self
    }

    pub fn finish(mut self, stage: Stage) -> Self {
        self.edges.insert(stage, Edge::End);
        self
    }

    /// Validate the graph and freeze it.
    pub fn compile(self) -> OrdoResult<Workflow> {
        let entry = self.entry.ok_or_else(|| OrdoError::WorkflowError {
            reason: "no entry stage set".to_string(),
        })?;

        // Depth-first walk: every reachable stage needs an outgoing edge and
        // no path may revisit a stage.
        let mut on_path = HashSet::new();
        check_acyclic(entry, &self.edges, &mut on_path)?;

        Ok(Workflow { entry, edges: self.edges })
    }
}

fn check_acyclic(
    stage: Stage,
    edges: &HashMap<Stage, Edge>,
    on_path: &mut HashSet<Stage>,
) -> OrdoResult<()> {
    let edge = edges.get(&stage).ok_or_else(|| OrdoError::WorkflowError {
        reason: format!("stage '{}' has no outgoing edge", stage),
    })?;
    if !on_path.insert(stage) {
        return Err(OrdoError::WorkflowError {
            reason: format!("cycle through stage '{}'", stage),
        });
    }
    for next in edge.targets() {
        check_acyclic(next, edges, on_path)?;
    }
    on_path.remove(&stage);
    Ok(())
}

/// A compiled, immutable pipeline graph.
pub struct Workflow {
    entry: Stage,
    edges: HashMap<Stage, Edge>,
}

impl Workflow {
    pub fn entry(&self) -> Stage {
        self.entry
    }

    /// The stage to run after `stage`, or `None` when the run is over.
    pub fn next(&self, stage: Stage, state: &AgentState) -> Option<Stage> {
        match self.edges.get(&stage)? {
            Edge::Direct(next) => Some(*next),
            Edge::Branch { router, on_continue, on_error } => match router(state) {
                Route::Continue => Some(*on_continue),
                Route::Error => Some(*on_error),
            },
            Edge::End => None,
        }
    }

    /// Upper bound on stages visited in one run.
    pub fn max_steps(&self) -> usize {
        self.edges.len()
    }
}
