//! Core module - the flattening engine and its plumbing

pub mod config;
pub mod diagnostic;
pub mod directory;
pub mod flatten;
pub mod hardware;
pub mod intake;
pub mod logging;
pub mod processor;
pub mod report;
pub mod routing;
pub mod store;
pub mod suffix;

pub use config::{Config, ConfigError};
pub use diagnostic::{Diagnostic, Issue};
pub use directory::{DirectoryError, ReferenceDirectory};
pub use flatten::{FlattenError, FlattenOptions, Flattener, ItemFailure, ItemPlan, OrderPlan};
pub use hardware::link_hardware;
pub use intake::{read_order, IntakeError, OrderFile};
pub use processor::{OrderProcessor, Outcome, ProcessOptions};
pub use routing::{Directory, RoutingMap, RoutingResolver, UNMATCHED_OPERATION_NOTE};
pub use store::{CommitSummary, OrderRecord, Store, StoreError};
pub use suffix::{SuffixAllocator, SuffixError};
