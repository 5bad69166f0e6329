//! CSV exports of the reference data and committed jobs
//!
//! Used when setting up the routing maps: the exported names are exactly the
//! strings the `routing` section has to reference.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::core::store::{Store, StoreError};

#[derive(Debug, Serialize)]
struct OperationRow<'a> {
    work_center: &'a str,
    operation: &'a str,
    note_text: &'a str,
}

/// Files written by [`write_reports`]
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub files: Vec<PathBuf>,
    pub work_centers: usize,
    pub vendors: usize,
    pub operations: usize,
    pub jobs: usize,
    pub processed_orders: usize,
}

/// Write `work_centers.csv`, `operations.csv`, `vendors.csv`, `jobs.csv` and
/// `summary.txt` into `out_dir`
pub fn write_reports(store: &Store, out_dir: &Path) -> Result<ReportSummary, StoreError> {
    fs::create_dir_all(out_dir)?;
    let mut files = Vec::new();

    let work_centers = store.work_centers()?;
    let path = out_dir.join("work_centers.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["work_center", "queue_hrs"])?;
    for wc in &work_centers {
        writer.write_record([wc.name.clone(), wc.queue_hrs.to_string()])?;
    }
    writer.flush()?;
    files.push(path);

    let operations = store.operations()?;
    let path = out_dir.join("operations.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    for op in &operations {
        writer.serialize(OperationRow {
            work_center: op.work_center.as_deref().unwrap_or(""),
            operation: &op.code,
            note_text: op.note_text.as_deref().unwrap_or(""),
        })?;
    }
    writer.flush()?;
    files.push(path);

    let vendors = store.vendors()?;
    let path = out_dir.join("vendors.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["vendor", "description"])?;
    for vendor in &vendors {
        writer.write_record([vendor.name.as_str(), vendor.description.as_deref().unwrap_or("")])?;
    }
    writer.flush()?;
    files.push(path);

    let jobs = store.jobs()?;
    let path = out_dir.join("jobs.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    for job in &jobs {
        writer.serialize(job)?;
    }
    writer.flush()?;
    files.push(path);

    let processed = store.processed_orders()?;
    let path = out_dir.join("summary.txt");
    fs::write(
        &path,
        format!(
            "work centers: {}\noperations: {}\nvendors: {}\njobs: {}\nprocessed orders: {}\n",
            work_centers.len(),
            operations.len(),
            vendors.len(),
            jobs.len(),
            processed.len()
        ),
    )?;
    files.push(path);

    info!(dir = %out_dir.display(), files = files.len(), "wrote reports");
    Ok(ReportSummary {
        files,
        work_centers: work_centers.len(),
        vendors: vendors.len(),
        operations: operations.len(),
        jobs: jobs.len(),
        processed_orders: processed.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::resource::{OperationDef, Vendor, WorkCenter};
    use tempfile::tempdir;

    #[test]
    fn test_write_reports() {
        let store = Store::open_in_memory(1).unwrap();
        store.upsert_work_center(&WorkCenter::new("SAW")).unwrap();
        store.upsert_vendor(&Vendor::new("PLATECO")).unwrap();
        store
            .upsert_operation(&OperationDef {
                code: "SC".to_string(),
                work_center: Some("SAW".to_string()),
                note_text: None,
            })
            .unwrap();

        let tmp = tempdir().unwrap();
        let out = tmp.path().join("reports");
        let summary = write_reports(&store, &out).unwrap();

        assert_eq!(summary.files.len(), 5);
        assert_eq!(summary.jobs, 0);

        let centers = fs::read_to_string(out.join("work_centers.csv")).unwrap();
        assert_eq!(centers, "work_center,queue_hrs\nSAW,0\n");
        let ops = fs::read_to_string(out.join("operations.csv")).unwrap();
        assert_eq!(ops, "work_center,operation,note_text\nSAW,SC,\n");
        let vendors = fs::read_to_string(out.join("vendors.csv")).unwrap();
        assert_eq!(vendors, "vendor,description\nPLATECO,\n");
        let text = fs::read_to_string(out.join("summary.txt")).unwrap();
        assert!(text.contains("jobs: 0"));
    }
}
