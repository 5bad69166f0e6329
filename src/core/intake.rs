//! Order intake - reading order payloads and managing the spool directory
//!
//! New order notifications arrive as JSON files dropped into a spool
//! directory. After processing, each file is moved to `processed/` or
//! `failed/` below the spool directory so it is never picked up twice.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::entities::order::Order;

pub const PROCESSED_DIR: &str = "processed";
pub const FAILED_DIR: &str = "failed";

/// Errors reading an order payload
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid order JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An order payload with its identity
#[derive(Debug, Clone)]
pub struct OrderFile {
    pub path: Option<PathBuf>,
    /// SHA-256 of the raw payload, hex encoded
    pub hash: String,
    pub order: Order,
}

impl OrderFile {
    pub fn source(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.display().to_string())
    }
}

/// Hex-encoded SHA-256 of a payload
pub fn payload_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Parse an order payload; `name` is used in error messages
pub fn parse_order(raw: &str, name: &str) -> Result<OrderFile, IntakeError> {
    let order: Order = serde_json::from_str(raw).map_err(|source| IntakeError::Json {
        file: name.to_string(),
        source,
    })?;
    Ok(OrderFile {
        path: None,
        hash: payload_hash(raw),
        order,
    })
}

/// Read and parse an order JSON file
pub fn read_order(path: &Path) -> Result<OrderFile, IntakeError> {
    let raw = fs::read_to_string(path)?;
    let mut file = parse_order(&raw, &path.display().to_string())?;
    file.path = Some(path.to_path_buf());
    Ok(file)
}

/// Pending order files directly inside `dir`, oldest name first
pub fn pending_orders(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Move a handled file into `processed/` or `failed/` next to it
pub fn archive(path: &Path, succeeded: bool) -> Result<PathBuf, IntakeError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let target_dir = parent.join(if succeeded { PROCESSED_DIR } else { FAILED_DIR });
    fs::create_dir_all(&target_dir)?;

    let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let mut target = target_dir.join(&name);
    // keep earlier copies of a re-delivered file
    let mut n = 1;
    while target.exists() {
        target = target_dir.join(format!("{}.{}", name.to_string_lossy(), n));
        n += 1;
    }
    fs::rename(path, &target)?;
    debug!(from = %path.display(), to = %target.display(), "archived order file");
    Ok(target)
}
