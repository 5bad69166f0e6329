//! Structured diagnostics collected while flattening an order
//!
//! Problems local to one component or line item never abort the order. They
//! are recorded here, attached to the plan, and shown to the operator.

use serde::Serialize;
use thiserror::Error;

/// What went wrong
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    #[error("Component {child_id} listed as a child of {parent_id} is not part of the line item")]
    DanglingChild { parent_id: u64, child_id: u64 },

    #[error("Component {position} of the line item has no ID; it and its subtree are skipped")]
    MissingIdentity { position: usize },

    #[error("Component is reachable from more than one parent; only the first occurrence gets a job")]
    SharedComponent,

    #[error("Component is not reachable from the root component")]
    Unreachable,

    #[error("Make quantity is zero; scrap quantity and percentage default to 0")]
    ZeroMakeQuantity,

    #[error("Hardware component has no parents; no material requirement created")]
    OrphanedHardware,

    #[error("Hardware parent {parent_id} has no job")]
    ParentWithoutJob { parent_id: u64 },

    #[error("Hardware lists parent {parent_id} more than once; linked once")]
    RepeatedParent { parent_id: u64 },

    #[error("Parent {parent_id} does not list this hardware as a child; using innate quantity {fallback}")]
    MissingEdgeQuantity { parent_id: u64, fallback: u32 },

    #[error("Operation '{operation}' was routed to default work center {work_center}")]
    DefaultWorkCenter {
        operation: String,
        work_center: String,
    },

    #[error("Operation '{operation}' was routed to default vendor {vendor}")]
    DefaultVendor { operation: String, vendor: String },
}

/// An issue located in the order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Zero-based line item index
    pub line_item: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<u64>,

    pub issue: Issue,
}

impl Diagnostic {
    pub fn new(line_item: usize, component_id: Option<u64>, issue: Issue) -> Self {
        Self {
            line_item,
            component_id,
            issue,
        }
    }

    /// Short location label, e.g. `item 1 / component 204`
    pub fn location(&self) -> String {
        match self.component_id {
            Some(id) => format!("item {} / component {}", self.line_item + 1, id),
            None => format!("item {}", self.line_item + 1),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location(), self.issue)
    }
}
