//! SQLite-backed ERP store
//!
//! Holds the reference data (work centers, vendors, operation codes), the job
//! autonumber and every committed job, link and operation. A flattened order is
//! written in a single transaction, so an order is either fully present or not
//! present at all.

mod schema;
pub mod serialize;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::{ConnectorConfig, DefaultsConfig};
use crate::core::directory::{DirectoryError, ReferenceDirectory};
use crate::core::flatten::OrderPlan;
use crate::entities::job::LinkChild;
use crate::entities::resource::{OperationDef, Routing, Vendor, WorkCenter};

pub use schema::SCHEMA_VERSION;
use serialize::{fit, split_at_width};

/// ERP column widths
pub const DESCRIPTION_WIDTH: usize = 30;
pub const OPERATION_DESCRIPTION_WIDTH: usize = 25;
pub const CODE_WIDTH: usize = 10;

const JOB_AUTO_NUMBER: &str = "Job";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Job {0} already exists")]
    DuplicateJob(String),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaVersion { found: i32, supported: i32 },
}

/// Identity of the order payload being committed
#[derive(Debug, Clone)]
pub struct OrderRecord {
    /// SHA-256 of the raw order JSON
    pub payload_hash: String,
    pub source: Option<String>,
}

/// Rows written by [`Store::commit_plan`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub jobs: usize,
    pub bill_of_jobs: usize,
    pub material_reqs: usize,
    pub operations: usize,
}

/// Job summary row, as listed in reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRow {
    pub job: String,
    pub top_lvl_job: String,
    pub order_number: u64,
    pub part_number: Option<String>,
    pub make_quantity: u32,
    pub scrap_quantity: i64,
}

/// Previously committed order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedOrder {
    pub payload_hash: String,
    pub order_number: u64,
    pub jobs: usize,
    pub source: Option<String>,
    pub processed_at: String,
}

#[derive(Debug, Deserialize)]
struct WorkCenterRecord {
    work_center: String,
    #[serde(default)]
    queue_hrs: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VendorRecord {
    vendor: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationRecord {
    operation: String,
    #[serde(default)]
    work_center: Option<String>,
    #[serde(default)]
    note_text: Option<String>,
}

/// ERP database handle
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database at `path`
    ///
    /// A fresh database starts numbering top-level jobs at `first_job_number`.
    pub fn open(path: &Path, first_job_number: u64) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened database");
        Self::init(conn, first_job_number)
    }

    pub fn open_in_memory(first_job_number: u64) -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, first_job_number)
    }

    fn init(conn: Connection, first_job_number: u64) -> Result<Self, StoreError> {
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }
        conn.execute_batch(schema::SCHEMA)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
        conn.execute(
            "INSERT OR IGNORE INTO auto_number (type, last_nbr) VALUES (?1, ?2)",
            params![JOB_AUTO_NUMBER, first_job_number.saturating_sub(1) as i64],
        )?;
        Ok(Self { conn })
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    pub fn upsert_work_center(&self, wc: &WorkCenter) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO work_center (name, queue_hrs) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET queue_hrs = excluded.queue_hrs",
            params![wc.name, wc.queue_hrs],
        )?;
        Ok(())
    }

    pub fn upsert_vendor(&self, vendor: &Vendor) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO vendor (name, description) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET description = excluded.description",
            params![vendor.name, vendor.description],
        )?;
        Ok(())
    }

    pub fn upsert_operation(&self, op: &OperationDef) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO operation (code, work_center, note_text) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO UPDATE SET work_center = excluded.work_center,
                                             note_text = excluded.note_text",
            params![op.code, op.work_center, op.note_text],
        )?;
        Ok(())
    }

    pub fn work_centers(&self) -> Result<Vec<WorkCenter>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, queue_hrs FROM work_center ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(WorkCenter {
                name: row.get(0)?,
                queue_hrs: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, description FROM vendor ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Vendor {
                name: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn operations(&self) -> Result<Vec<OperationDef>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT code, work_center, note_text FROM operation ORDER BY code")?;
        let rows = stmt.query_map([], |row| {
            Ok(OperationDef {
                code: row.get(0)?,
                work_center: row.get(1)?,
                note_text: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Materialize the reference directory before any order is flattened
    pub fn load_directory(&self, defaults: &DefaultsConfig) -> Result<ReferenceDirectory, StoreError> {
        let directory = ReferenceDirectory::new(
            self.work_centers()?,
            self.vendors()?,
            self.operations()?,
            &defaults.work_center,
            &defaults.vendor,
        )?;
        info!(
            work_centers = directory.work_center_count(),
            vendors = directory.vendor_count(),
            operations = directory.operation_count(),
            "loaded reference directory"
        );
        Ok(directory)
    }

    /// Import work centers from CSV with columns `work_center[,queue_hrs]`
    pub fn import_work_centers(&self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut count = 0;
        for record in reader.deserialize() {
            let record: WorkCenterRecord = record?;
            let mut wc = WorkCenter::new(record.work_center.trim());
            wc.queue_hrs = record.queue_hrs.unwrap_or(0.0);
            self.upsert_work_center(&wc)?;
            count += 1;
        }
        info!(count, path = %path.display(), "imported work centers");
        Ok(count)
    }

    /// Import vendors from CSV with columns `vendor[,description]`
    pub fn import_vendors(&self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut count = 0;
        for record in reader.deserialize() {
            let record: VendorRecord = record?;
            let mut vendor = Vendor::new(record.vendor.trim());
            vendor.description = record.description.filter(|d| !d.trim().is_empty());
            self.upsert_vendor(&vendor)?;
            count += 1;
        }
        info!(count, path = %path.display(), "imported vendors");
        Ok(count)
    }

    /// Import operation codes from CSV with columns `operation[,work_center,note_text]`
    pub fn import_operations(&self, path: &Path) -> Result<usize, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut count = 0;
        for record in reader.deserialize() {
            let record: OperationRecord = record?;
            self.upsert_operation(&OperationDef {
                code: record.operation.trim().to_string(),
                work_center: record.work_center.filter(|w| !w.trim().is_empty()),
                note_text: record.note_text.filter(|n| !n.trim().is_empty()),
            })?;
            count += 1;
        }
        info!(count, path = %path.display(), "imported operations");
        Ok(count)
    }

    // =========================================================================
    // Numbering and orders
    // =========================================================================

    /// Next top-level job number from the autonumber table
    pub fn next_job_number(&self) -> Result<u64, StoreError> {
        let last: i64 = self.conn.query_row(
            "SELECT last_nbr FROM auto_number WHERE type = ?1",
            params![JOB_AUTO_NUMBER],
            |row| row.get(0),
        )?;
        Ok(last.max(0) as u64 + 1)
    }

    pub fn is_processed(&self, payload_hash: &str) -> Result<bool, StoreError> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT payload_hash FROM processed_order WHERE payload_hash = ?1",
                params![payload_hash],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn processed_orders(&self) -> Result<Vec<ProcessedOrder>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT payload_hash, order_number, jobs, source, processed_at
             FROM processed_order ORDER BY processed_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProcessedOrder {
                payload_hash: row.get(0)?,
                order_number: row.get::<_, i64>(1)? as u64,
                jobs: row.get::<_, i64>(2)? as usize,
                source: row.get(3)?,
                processed_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Write a flattened order in one transaction
    ///
    /// Advances the job autonumber past the plan's top-level jobs and records
    /// the payload hash. Any failure rolls back every row of the order.
    pub fn commit_plan(
        &mut self,
        plan: &OrderPlan,
        record: &OrderRecord,
        connector: &ConnectorConfig,
    ) -> Result<CommitSummary, StoreError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut summary = CommitSummary::default();

        for job in plan.jobs() {
            let exists: Option<String> = tx
                .query_row("SELECT job FROM job WHERE job = ?1", params![job.job_number], |row| row.get(0))
                .optional()?;
            if exists.is_some() {
                return Err(StoreError::DuplicateJob(job.job_number.clone()));
            }

            let (description, ext_description) = match job.description.as_deref() {
                Some(d) => {
                    let (head, tail) = split_at_width(d, DESCRIPTION_WIDTH);
                    (Some(head), tail)
                }
                None => (None, None),
            };
            let material = if connector.import_material {
                job.material.clone()
            } else {
                None
            };

            tx.execute(
                "INSERT INTO job (job, top_lvl_job, order_number, component_id, job_type,
                    assembly_level, part_number, revision, description, ext_description,
                    order_quantity, make_quantity, scrap_quantity, scrap_percent, material,
                    note_text, sales_code, created_by, object_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20)",
                params![
                    job.job_number,
                    job.top_level_job,
                    plan.order_number as i64,
                    job.component_id as i64,
                    job.job_type,
                    job.assembly_level,
                    job.part_number.as_deref().map(|p| fit(p, DESCRIPTION_WIDTH)),
                    job.revision,
                    description,
                    ext_description,
                    job.order_quantity,
                    job.make_quantity,
                    job.scrap.quantity,
                    job.scrap.percent,
                    material,
                    job.notes,
                    connector.sales_code,
                    connector.erp_user,
                    job.object_id,
                    now,
                ],
            )?;
            summary.jobs += 1;
        }

        for link in plan.links() {
            match &link.child {
                LinkChild::Job { job_number } => {
                    tx.execute(
                        "INSERT INTO bill_of_jobs (root_job, parent_job, component_job, quantity)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![link.root_job, link.parent_job, job_number, link.quantity],
                    )?;
                    summary.bill_of_jobs += 1;
                }
                LinkChild::Hardware {
                    component_id,
                    part_number,
                    description,
                } => {
                    let material = part_number
                        .clone()
                        .unwrap_or_else(|| format!("COMPONENT-{}", component_id));
                    tx.execute(
                        "INSERT INTO material_req (root_job, job, material, description,
                            quantity_per, location)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            link.root_job,
                            link.parent_job,
                            fit(&material, DESCRIPTION_WIDTH),
                            description.as_deref().map(|d| fit(d, DESCRIPTION_WIDTH)),
                            link.quantity,
                            connector.default_location,
                        ],
                    )?;
                    summary.material_reqs += 1;
                }
            }
        }

        for op in plan.operations() {
            let (work_center, vendor, code) = match &op.routing.routing {
                Routing::Inside {
                    work_center,
                    operation_code,
                    ..
                } => (Some(work_center.name.as_str()), None, operation_code.as_deref()),
                Routing::Outside { vendor, service } => (None, Some(vendor.name.as_str()), service.as_deref()),
            };
            tx.execute(
                "INSERT INTO job_operation (job, sequence, description, inside, work_center,
                    vendor, operation_service, runtime, setup_time, note_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    op.job_number,
                    op.sequence,
                    fit(&op.routing.description, OPERATION_DESCRIPTION_WIDTH),
                    op.routing.is_inside(),
                    work_center,
                    vendor,
                    code.map(|c| fit(c, CODE_WIDTH)),
                    op.runtime,
                    op.setup_time,
                    op.note_text(),
                ],
            )?;
            summary.operations += 1;
        }

        let last_used = plan.next_job_number.saturating_sub(1) as i64;
        tx.execute(
            "UPDATE auto_number SET last_nbr = MAX(last_nbr, ?2) WHERE type = ?1",
            params![JOB_AUTO_NUMBER, last_used],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO processed_order (payload_hash, order_number, jobs, source,
                processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.payload_hash,
                plan.order_number as i64,
                summary.jobs as i64,
                record.source,
                now,
            ],
        )?;

        tx.commit()?;
        info!(
            order = plan.order_number,
            jobs = summary.jobs,
            links = summary.bill_of_jobs + summary.material_reqs,
            operations = summary.operations,
            "committed order"
        );
        Ok(summary)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Connection check
    pub fn job_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM job", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn jobs(&self) -> Result<Vec<JobRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT job, top_lvl_job, order_number, part_number, make_quantity, scrap_quantity
             FROM job ORDER BY top_lvl_job, rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(JobRow {
                job: row.get(0)?,
                top_lvl_job: row.get(1)?,
                order_number: row.get::<_, i64>(2)? as u64,
                part_number: row.get(3)?,
                make_quantity: row.get(4)?,
                scrap_quantity: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Operation rows of a job in sequence order: (description, resource, code)
    pub fn job_operations(&self, job: &str) -> Result<Vec<(String, String, Option<String>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT description, COALESCE(work_center, vendor), operation_service
             FROM job_operation WHERE job = ?1 ORDER BY sequence",
        )?;
        let rows = stmt.query_map(params![job], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Components of a job: (component job, quantity)
    pub fn bill_of_jobs(&self, parent_job: &str) -> Result<Vec<(String, u32)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT component_job, quantity FROM bill_of_jobs WHERE parent_job = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![parent_job], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Hardware of a job: (material, quantity per)
    pub fn material_reqs(&self, job: &str) -> Result<Vec<(String, u32)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT material, quantity_per FROM material_req WHERE job = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![job], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
