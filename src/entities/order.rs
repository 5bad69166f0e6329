//! Order entity - sales orders as delivered by the quoting service
//!
//! An order holds one or more line items. Each line item carries its assembly
//! tree as a flat component list: components reference their children through
//! [`ChildLink`]s and their parents through `parent_ids`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Order lifecycle status reported by the quoting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    #[default]
    Confirmed,
    OnHold,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::OnHold => write!(f, "on_hold"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A sales order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order number in the quoting service
    pub number: u64,

    /// Quote the order was placed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_number: Option<u64>,

    #[serde(default)]
    pub status: OrderStatus,

    /// Internal notes, not shown to the customer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_notes: Option<String>,

    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Cancelled orders never produce jobs
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}

/// One ordered quantity of a top-level part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,

    /// Quantity ordered by the customer
    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ships_on: Option<NaiveDate>,

    /// Every component of the assembly tree, root included
    #[serde(default)]
    pub components: Vec<OrderComponent>,

    /// Order-level add-ons, routed after the root component's own operations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordered_add_ons: Vec<AddOn>,
}

impl OrderItem {
    /// Look up a component of this line item by ID
    pub fn get_component(&self, id: u64) -> Option<&OrderComponent> {
        self.components.iter().find(|c| c.id == Some(id))
    }

    /// Public and private notes joined for the job's note text
    pub fn notes(&self) -> Option<String> {
        let notes: Vec<&str> = [self.public_notes.as_deref(), self.private_notes.as_deref()]
            .into_iter()
            .flatten()
            .filter(|n| !n.trim().is_empty())
            .collect();
        if notes.is_empty() {
            None
        } else {
            Some(notes.join("\n\n"))
        }
    }
}

/// A node of the assembly tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderComponent {
    /// Missing on malformed payloads; such components are skipped when flattening
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Purchased component: consumed by its parents, never gets a job
    #[serde(default)]
    pub is_hardware: bool,

    #[serde(default)]
    pub is_root_component: bool,

    /// Quantity to build, extras included
    #[serde(default)]
    pub make_quantity: u32,

    #[serde(default)]
    pub deliver_quantity: u32,

    /// Units consumed per unit of the parent
    #[serde(default = "default_innate_quantity")]
    pub innate_quantity: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shop_operations: Vec<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
}

fn default_innate_quantity() -> u32 {
    1
}

impl OrderComponent {
    /// Quantity per parent declared on the edge to `child_id`
    pub fn quantity_of_child(&self, child_id: u64) -> Option<u32> {
        self.children
            .iter()
            .find(|c| c.child_id == child_id)
            .map(|c| c.quantity)
    }
}

/// Parent-to-child edge with its quantity per parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub child_id: u64,
    pub quantity: u32,
}

/// A named shop operation on a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Run time per part, in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<f64>,

    /// Setup time, in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_time: Option<f64>,
}

/// Order-level add-on (inspection reports, packaging...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOn {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Raw material of a manufactured component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
}
