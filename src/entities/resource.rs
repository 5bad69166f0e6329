//! Shop resources - work centers, vendors and operation definitions
//!
//! These are the records of the ERP reference directory, plus the
//! [`RoutingEntry`] that ties one occurrence of a named operation to either an
//! internal work center or an outside vendor.

use serde::{Deserialize, Serialize};

/// Internal work center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCenter {
    pub name: String,

    /// Default queue time before work starts, in hours
    #[serde(default)]
    pub queue_hrs: f64,
}

impl WorkCenter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue_hrs: 0.0,
        }
    }
}

/// Outside vendor performing services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Vendor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Operation code defined in the ERP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDef {
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_center: Option<String>,

    /// Standard instructions copied onto job operations using this code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_text: Option<String>,
}

/// Where a routed operation is performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Routing {
    Inside {
        work_center: WorkCenter,
        /// Set only when the configured code exists in the directory
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operation_code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operation_note: Option<String>,
    },
    Outside {
        vendor: Vendor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<String>,
    },
}

/// Resolved routing for one occurrence of a named operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingEntry {
    /// Operation name as quoted
    pub description: String,

    pub routing: Routing,

    /// False when a default work center or vendor was substituted
    pub matched: bool,

    /// Message for the operator when the operation could not be matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RoutingEntry {
    pub fn is_inside(&self) -> bool {
        matches!(self.routing, Routing::Inside { .. })
    }

    /// Work center or vendor name, whichever applies
    pub fn resource_name(&self) -> &str {
        match &self.routing {
            Routing::Inside { work_center, .. } => &work_center.name,
            Routing::Outside { vendor, .. } => &vendor.name,
        }
    }

    /// Operation code (inside) or service code (outside)
    pub fn code(&self) -> Option<&str> {
        match &self.routing {
            Routing::Inside { operation_code, .. } => operation_code.as_deref(),
            Routing::Outside { service, .. } => service.as_deref(),
        }
    }
}
