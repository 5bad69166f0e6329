//! Routing resolution - operation names to work centers or outside vendors
//!
//! A quoted operation name resolves in this order:
//! 1. an `outside` mapping: one outside entry per configured vendor/service
//! 2. an `inside` mapping: one inside entry per configured work center/operation
//! 3. otherwise a single inside entry using the name itself as work center
//!
//! Referenced work centers and vendors that are missing from the directory are
//! replaced by the configured defaults, so an order always gets a routing. A
//! work center miss also carries [`UNMATCHED_OPERATION_NOTE`] for the operator.
//!
//! Every resolved name and every directory lookup is cached for the lifetime
//! of the resolver, misses included. Create one resolver per run.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::resource::{OperationDef, Routing, RoutingEntry, Vendor, WorkCenter};

/// Note attached to operations routed to the default work center
pub const UNMATCHED_OPERATION_NOTE: &str = "This operation could not be matched to a work \
center or outside service. If it is a new operation, add the work center or service to the \
ERP. To change how quoted operation names map to work centers and services, update the \
routing section of the connector configuration.";

/// Lookup interface over the ERP reference data
pub trait Directory {
    fn work_center(&self, name: &str) -> Option<WorkCenter>;

    fn vendor(&self, name: &str) -> Option<Vendor>;

    fn operation(&self, code: &str) -> Option<OperationDef>;

    /// Substituted when a referenced work center does not exist
    fn default_work_center(&self) -> &WorkCenter;

    /// Substituted when a referenced vendor does not exist
    fn default_vendor(&self) -> &Vendor;
}

/// Inside mapping target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsideTarget {
    pub work_center: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Outside mapping target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutsideTarget {
    pub vendor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Configured operation name mappings
///
/// ```yaml
/// inside:
///   Saw: [{ work_center: SAW, operation: SC }]
/// outside:
///   Anodize: [{ vendor: PLATECO, service: AnA-8624 }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingMap {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inside: BTreeMap<String, Vec<InsideTarget>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outside: BTreeMap<String, Vec<OutsideTarget>>,
}

impl RoutingMap {
    pub fn is_outside(&self, name: &str) -> bool {
        self.outside.contains_key(name)
    }

    pub fn is_inside(&self, name: &str) -> bool {
        self.inside.contains_key(name)
    }

    /// Add an inside mapping target, keeping configured order
    pub fn map_inside(&mut self, name: &str, work_center: &str, operation: Option<&str>) {
        self.inside
            .entry(name.to_string())
            .or_default()
            .push(InsideTarget {
                work_center: work_center.to_string(),
                operation: operation.map(str::to_string),
            });
    }

    /// Add an outside mapping target, keeping configured order
    pub fn map_outside(&mut self, name: &str, vendor: &str, service: Option<&str>) {
        self.outside
            .entry(name.to_string())
            .or_default()
            .push(OutsideTarget {
                vendor: vendor.to_string(),
                service: service.map(str::to_string),
            });
    }
}

/// Resolves operation names against a routing map and a directory
pub struct RoutingResolver<'a, D: Directory> {
    directory: &'a D,
    map: &'a RoutingMap,
    routes: HashMap<String, Vec<RoutingEntry>>,
    work_centers: HashMap<String, Option<WorkCenter>>,
    vendors: HashMap<String, Option<Vendor>>,
    operations: HashMap<String, Option<OperationDef>>,
}

impl<'a, D: Directory> RoutingResolver<'a, D> {
    pub fn new(directory: &'a D, map: &'a RoutingMap) -> Self {
        Self {
            directory,
            map,
            routes: HashMap::new(),
            work_centers: HashMap::new(),
            vendors: HashMap::new(),
            operations: HashMap::new(),
        }
    }

    /// Resolve an operation name into its ordered routing entries
    ///
    /// The result may be empty when the name maps to an empty target list.
    pub fn resolve(&mut self, name: &str) -> Vec<RoutingEntry> {
        if let Some(entries) = self.routes.get(name) {
            debug!(operation = name, "routing cache hit");
            return entries.clone();
        }

        let map = self.map;
        let entries: Vec<RoutingEntry> = if let Some(targets) = map.outside.get(name) {
            targets
                .iter()
                .map(|t| self.outside_entry(name, &t.vendor, t.service.as_deref()))
                .collect()
        } else if let Some(targets) = map.inside.get(name) {
            targets
                .iter()
                .map(|t| self.inside_entry(name, &t.work_center, t.operation.as_deref()))
                .collect()
        } else {
            vec![self.inside_entry(name, name, None)]
        };

        debug!(operation = name, entries = entries.len(), "resolved routing");
        self.routes.insert(name.to_string(), entries.clone());
        entries
    }

    /// Number of distinct operation names resolved so far
    pub fn resolved_names(&self) -> usize {
        self.routes.len()
    }

    fn inside_entry(&mut self, name: &str, work_center: &str, operation: Option<&str>) -> RoutingEntry {
        let (work_center, matched) = match self.lookup_work_center(work_center) {
            Some(wc) => (wc, true),
            None => (self.directory.default_work_center().clone(), false),
        };
        let operation = operation.and_then(|code| self.lookup_operation(code));
        let (operation_code, operation_note) = match operation {
            Some(op) => (Some(op.code), op.note_text),
            None => (None, None),
        };

        RoutingEntry {
            description: name.to_string(),
            routing: Routing::Inside {
                work_center,
                operation_code,
                operation_note,
            },
            matched,
            note: (!matched).then(|| UNMATCHED_OPERATION_NOTE.to_string()),
        }
    }

    fn outside_entry(&mut self, name: &str, vendor: &str, service: Option<&str>) -> RoutingEntry {
        let (vendor, matched) = match self.lookup_vendor(vendor) {
            Some(v) => (v, true),
            None => (self.directory.default_vendor().clone(), false),
        };

        RoutingEntry {
            description: name.to_string(),
            routing: Routing::Outside {
                vendor,
                service: service.map(str::to_string),
            },
            matched,
            note: None,
        }
    }

    fn lookup_work_center(&mut self, name: &str) -> Option<WorkCenter> {
        let directory = self.directory;
        self.work_centers
            .entry(name.to_string())
            .or_insert_with(|| directory.work_center(name))
            .clone()
    }

    fn lookup_vendor(&mut self, name: &str) -> Option<Vendor> {
        let directory = self.directory;
        self.vendors
            .entry(name.to_string())
            .or_insert_with(|| directory.vendor(name))
            .clone()
    }

    fn lookup_operation(&mut self, code: &str) -> Option<OperationDef> {
        let directory = self.directory;
        self.operations
            .entry(code.to_string())
            .or_insert_with(|| directory.operation(code))
            .clone()
    }
}
