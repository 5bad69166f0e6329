//! jobflow: order-to-job connector
//!
//! Flattens the assembly trees of quoted sales orders into numbered shop jobs,
//! with routed operations and hardware material requirements, and commits them
//! to the ERP store.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
