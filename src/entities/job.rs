//! Job entities - the flattened output of an order line item
//!
//! A line item expands into one [`Job`] per manufactured component, the
//! [`AssemblyLink`]s connecting those jobs (and hardware) to their parents, and
//! an ordered list of [`JobOperation`]s per job.

use serde::{Deserialize, Serialize};

use crate::entities::resource::RoutingEntry;

/// Job type as the ERP knows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    /// Job with component jobs or hardware below it
    Assembly,
    Regular,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::Assembly => write!(f, "Assembly"),
            JobType::Regular => write!(f, "Regular"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assembly" => Ok(JobType::Assembly),
            "Regular" => Ok(JobType::Regular),
            _ => Err(format!("Invalid job type: {}. Use Assembly or Regular", s)),
        }
    }
}

/// Estimated scrap: extra units built beyond the required quantity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scrap {
    /// make quantity minus required quantity; negative when under-built
    pub quantity: i64,
    pub percent: f64,
}

impl Scrap {
    /// Compute scrap for a component
    ///
    /// Required quantity is `line_quantity * innate_quantity`. Returns `None`
    /// when `make_quantity` is zero, since the percentage is undefined.
    pub fn compute(make_quantity: u32, line_quantity: u32, innate_quantity: u32) -> Option<Self> {
        if make_quantity == 0 {
            return None;
        }
        let required = i64::from(line_quantity) * i64::from(innate_quantity);
        let quantity = i64::from(make_quantity) - required;
        Some(Self {
            quantity,
            percent: quantity as f64 / f64::from(make_quantity) * 100.0,
        })
    }
}

/// Manufacturing job for one manufactured component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Top-level job number plus the allocated suffix
    pub job_number: String,

    pub top_level_job: String,

    /// Source component in the order
    pub component_id: u64,

    pub job_type: JobType,

    /// Depth below the root (root = 0)
    pub assembly_level: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Line item quantity
    pub order_quantity: u32,

    pub make_quantity: u32,

    pub scrap: Scrap,

    /// Raw material name, upper-cased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Stable row identity for the ERP
    pub object_id: String,
}

impl Job {
    pub fn is_top_level(&self) -> bool {
        self.job_number == self.top_level_job
    }
}

/// Child side of an assembly link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkChild {
    /// Component job built for the parent
    Job { job_number: String },
    /// Purchased material consumed by the parent
    Hardware {
        component_id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        part_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Parent/child relationship between a job and a component job or hardware
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyLink {
    pub root_job: String,
    pub parent_job: String,
    pub child: LinkChild,
    /// Units of the child per unit of the parent
    pub quantity: u32,
}

impl AssemblyLink {
    pub fn is_hardware(&self) -> bool {
        matches!(self.child, LinkChild::Hardware { .. })
    }

    /// Job number of the child, for component links
    pub fn child_job(&self) -> Option<&str> {
        match &self.child {
            LinkChild::Job { job_number } => Some(job_number),
            LinkChild::Hardware { .. } => None,
        }
    }
}

/// One routed step of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOperation {
    pub job_number: String,

    /// Position within the job's routing, starting at 0
    pub sequence: u32,

    /// Run time per part, in minutes
    #[serde(default)]
    pub runtime: f64,

    /// Setup time, in hours
    #[serde(default)]
    pub setup_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub routing: RoutingEntry,
}

impl JobOperation {
    /// Notes to print on the traveler: routing note first, then instructions
    pub fn note_text(&self) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(note) = self.routing.note.as_deref() {
            parts.push(note);
        }
        if let Some(notes) = self.notes.as_deref() {
            parts.push(notes);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}
