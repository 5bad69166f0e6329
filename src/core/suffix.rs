//! Job number suffix allocation
//!
//! Every manufactured component below the root of a line item gets a suffix
//! appended to the top-level job number. Suffixes follow the assembly path
//! while they fit the job number column (`-1`, `-1-2`, `-2`), and fall back to
//! a compact sequential form (`.B`, `.1C`) once the path would overflow it.
//!
//! Path suffixes start with `-`, compact ones with `.`. Neither character
//! appears in an autonumbered top-level job, so the two forms never collide
//! with each other or with another line item's top-level number.

use std::collections::HashSet;

use thiserror::Error;

const PATH_SEPARATOR: char = '-';
const COMPACT_MARKER: char = '.';
const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Errors raised while numbering a line item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuffixError {
    #[error("Root suffix was already allocated for this line item")]
    DuplicateRoot,

    #[error("Root suffix must be allocated before numbering level {level}")]
    RootNotAllocated { level: u32 },

    #[error("Invalid assembly position: index {index} of {count} at level {level}")]
    InvalidPosition { level: u32, index: usize, count: usize },

    #[error("Cannot number component #{sequence} at level {level} within {budget} characters")]
    Exhausted {
        level: u32,
        sequence: u32,
        budget: usize,
    },
}

/// Allocates unique suffixes for one line item's traversal
///
/// Create one allocator per line item and drop it afterwards; suffixes are
/// only unique within a single allocator.
#[derive(Debug)]
pub struct SuffixAllocator {
    /// Characters available after the top-level job number
    budget: usize,
    root_allocated: bool,
    /// 1-based sibling positions from level 1 down to the last allocation
    path: Vec<usize>,
    /// Non-root allocations so far
    sequence: u32,
    issued: HashSet<String>,
}

impl SuffixAllocator {
    /// Create an allocator with `budget` characters available for suffixes
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            root_allocated: false,
            path: Vec::new(),
            sequence: 0,
            issued: HashSet::new(),
        }
    }

    /// Create an allocator for a top-level job in a column `width` wide
    pub fn for_job(top_level_job: &str, width: usize) -> Self {
        Self::new(width.saturating_sub(top_level_job.len()))
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Number of suffixes handed out, root included
    pub fn allocated(&self) -> usize {
        self.issued.len()
    }

    /// Allocate the suffix for the next component in pre-order
    ///
    /// `level` is the depth below the root, `level_index` the zero-based
    /// position among the manufactured siblings and `level_count` their
    /// number. The root call `(0, 0, 1)` returns the empty suffix.
    pub fn allocate(
        &mut self,
        level: u32,
        level_index: usize,
        level_count: usize,
    ) -> Result<String, SuffixError> {
        if level_count == 0 || level_index >= level_count {
            return Err(SuffixError::InvalidPosition {
                level,
                index: level_index,
                count: level_count,
            });
        }

        if level == 0 {
            if level_count != 1 {
                return Err(SuffixError::InvalidPosition {
                    level,
                    index: level_index,
                    count: level_count,
                });
            }
            if self.root_allocated {
                return Err(SuffixError::DuplicateRoot);
            }
            self.root_allocated = true;
            self.issued.insert(String::new());
            return Ok(String::new());
        }

        if !self.root_allocated {
            return Err(SuffixError::RootNotAllocated { level });
        }
        self.sequence += 1;

        // A skipped level leaves no parent path to extend
        let depth = level as usize;
        let by_path = if depth <= self.path.len() + 1 {
            self.path.truncate(depth - 1);
            self.path.push(level_index + 1);
            Some(encode_path(&self.path))
        } else {
            None
        };

        let suffix = match by_path {
            Some(s) if s.len() <= self.budget && !self.issued.contains(&s) => s,
            _ => {
                let compact = format!("{}{}", COMPACT_MARKER, to_base36(self.sequence));
                if compact.len() > self.budget {
                    return Err(SuffixError::Exhausted {
                        level,
                        sequence: self.sequence,
                        budget: self.budget,
                    });
                }
                compact
            }
        };

        self.issued.insert(suffix.clone());
        Ok(suffix)
    }
}

fn encode_path(path: &[usize]) -> String {
    let mut out = String::new();
    for &position in path {
        out.push(PATH_SEPARATOR);
        out.push_str(&to_base36(position as u32));
    }
    out
}

/// Upper-case base 36, no leading zeros
fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
