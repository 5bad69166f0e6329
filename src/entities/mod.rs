//! Entity type definitions
//!
//! **Input:**
//! - [`Order`] - Sales order with line items and their assembly trees
//!
//! **Output:**
//! - [`Job`] - Manufacturing job for one manufactured component
//! - [`AssemblyLink`] - Parent/child link between jobs, or job and hardware
//! - [`JobOperation`] - Routed operation of a job
//!
//! **Reference data:**
//! - [`WorkCenter`], [`Vendor`], [`OperationDef`] - ERP directory records

pub mod job;
pub mod order;
pub mod resource;

pub use job::{AssemblyLink, Job, JobOperation, JobType, LinkChild, Scrap};
pub use order::{AddOn, ChildLink, Material, Operation, Order, OrderComponent, OrderItem, OrderStatus};
pub use resource::{OperationDef, Routing, RoutingEntry, Vendor, WorkCenter};
