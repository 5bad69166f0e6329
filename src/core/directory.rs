//! In-memory reference directory of work centers, vendors and operations
//!
//! The directory is fully loaded before any order is flattened, so routing
//! resolution never touches the database.

use std::collections::HashMap;

use thiserror::Error;

use crate::core::routing::Directory;
use crate::entities::resource::{OperationDef, Vendor, WorkCenter};

/// Errors building a directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Default work center '{0}' does not exist. Import it or change 'defaults.work_center'")]
    MissingDefaultWorkCenter(String),

    #[error("Default vendor '{0}' does not exist. Import it or change 'defaults.vendor'")]
    MissingDefaultVendor(String),
}

/// Name-keyed reference data plus the designated defaults
#[derive(Debug, Clone)]
pub struct ReferenceDirectory {
    work_centers: HashMap<String, WorkCenter>,
    vendors: HashMap<String, Vendor>,
    operations: HashMap<String, OperationDef>,
    default_work_center: WorkCenter,
    default_vendor: Vendor,
}

impl ReferenceDirectory {
    /// Build a directory, resolving the default work center and vendor by name
    pub fn new(
        work_centers: Vec<WorkCenter>,
        vendors: Vec<Vendor>,
        operations: Vec<OperationDef>,
        default_work_center: &str,
        default_vendor: &str,
    ) -> Result<Self, DirectoryError> {
        let work_centers: HashMap<String, WorkCenter> = work_centers
            .into_iter()
            .map(|wc| (wc.name.clone(), wc))
            .collect();
        let vendors: HashMap<String, Vendor> =
            vendors.into_iter().map(|v| (v.name.clone(), v)).collect();
        let operations: HashMap<String, OperationDef> = operations
            .into_iter()
            .map(|op| (op.code.clone(), op))
            .collect();

        let default_work_center = work_centers
            .get(default_work_center)
            .cloned()
            .ok_or_else(|| DirectoryError::MissingDefaultWorkCenter(default_work_center.to_string()))?;
        let default_vendor = vendors
            .get(default_vendor)
            .cloned()
            .ok_or_else(|| DirectoryError::MissingDefaultVendor(default_vendor.to_string()))?;

        Ok(Self {
            work_centers,
            vendors,
            operations,
            default_work_center,
            default_vendor,
        })
    }

    pub fn work_center_count(&self) -> usize {
        self.work_centers.len()
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn has_work_center(&self, name: &str) -> bool {
        self.work_centers.contains_key(name)
    }

    pub fn has_vendor(&self, name: &str) -> bool {
        self.vendors.contains_key(name)
    }

    pub fn has_operation(&self, code: &str) -> bool {
        self.operations.contains_key(code)
    }
}

impl Directory for ReferenceDirectory {
    fn work_center(&self, name: &str) -> Option<WorkCenter> {
        self.work_centers.get(name).cloned()
    }

    fn vendor(&self, name: &str) -> Option<Vendor> {
        self.vendors.get(name).cloned()
    }

    fn operation(&self, code: &str) -> Option<OperationDef> {
        self.operations.get(code).cloned()
    }

    fn default_work_center(&self) -> &WorkCenter {
        &self.default_work_center
    }

    fn default_vendor(&self) -> &Vendor {
        &self.default_vendor
    }
}
