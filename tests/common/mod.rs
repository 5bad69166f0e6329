//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a jobflow command with a clean environment
pub fn jobflow() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("jobflow"));
    cmd.env_remove("JOBFLOW_CONFIG").env_remove("RUST_LOG");
    cmd
}

pub const CONFIG: &str = r#"connector:
  active: true
  import_operations: true
database:
  path: jobflow.db
numbering:
  job_number_width: 10
  first_job_number: 1000
defaults:
  work_center: GENERAL
  vendor: MISC
routing:
  inside:
    Saw:
      - work_center: SAW
        operation: SC
    Deburr: []
  outside:
    Anodize:
      - vendor: PLATECO
        service: ANODIZE
logging:
  level: warn
"#;

pub const WORK_CENTERS: &str = "work_center,queue_hrs\nSAW,1\nMILL,0\nGENERAL,0\n";
pub const VENDORS: &str = "vendor,description\nPLATECO,Plating Co\nMISC,Miscellaneous\n";
pub const OPERATIONS: &str = "operation,work_center,note_text\nSC,SAW,Cut to length\n";

/// Order 42: a bracket assembly with one machined child and a screw
///
/// ```text
/// 1 BRK-100 (root, make 10 for 8)   ops: Saw, Anodize, Laser Etch
/// ├── 2 BRK-110 (x2)                ops: MILL
/// └── 3 SCREW (hardware, x4)
/// ```
pub const ORDER_42: &str = r#"{
  "number": 42,
  "status": "confirmed",
  "order_items": [
    {
      "id": 900,
      "quantity": 8,
      "public_notes": "Ship together",
      "components": [
        {
          "id": 1,
          "part_number": "BRK-100",
          "revision": "B",
          "description": "Bracket assembly",
          "is_root_component": true,
          "make_quantity": 10,
          "innate_quantity": 1,
          "children": [
            {"child_id": 2, "quantity": 2},
            {"child_id": 3, "quantity": 4}
          ],
          "shop_operations": [
            {"name": "Saw", "runtime": 2.5, "setup_time": 0.5},
            {"name": "Anodize"},
            {"name": "Laser Etch", "notes": "Logo on front"}
          ]
        },
        {
          "id": 2,
          "part_number": "BRK-110",
          "make_quantity": 16,
          "innate_quantity": 2,
          "parent_ids": [1],
          "shop_operations": [{"name": "MILL"}]
        },
        {
          "id": 3,
          "part_number": "SCREW-M4",
          "is_hardware": true,
          "make_quantity": 32,
          "innate_quantity": 4,
          "parent_ids": [1]
        }
      ]
    }
  ]
}"#;

pub const CANCELLED_ORDER: &str = r#"{"number": 43, "status": "cancelled", "order_items": []}"#;

pub const ROOTLESS_ORDER: &str = r#"{
  "number": 44,
  "order_items": [
    {"id": 1, "quantity": 1, "components": [{"id": 5, "make_quantity": 1}]}
  ]
}"#;

/// Workspace with a config file and imported reference data
pub fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("jobflow.yaml"), CONFIG).unwrap();
    fs::write(tmp.path().join("work_centers.csv"), WORK_CENTERS).unwrap();
    fs::write(tmp.path().join("vendors.csv"), VENDORS).unwrap();
    fs::write(tmp.path().join("operations.csv"), OPERATIONS).unwrap();

    jobflow()
        .current_dir(tmp.path())
        .args([
            "directory",
            "import",
            "--work-centers",
            "work_centers.csv",
            "--vendors",
            "vendors.csv",
            "--operations",
            "operations.csv",
        ])
        .assert()
        .success();
    tmp
}

/// Write an order file into the workspace
pub fn write_order(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
