//! Order processing - flatten an order payload and commit the plan
//!
//! One [`OrderProcessor`] serves a batch of orders against a loaded reference
//! directory. Cancelled orders and payloads that were already committed are
//! skipped; everything else is flattened and written in one transaction.

use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::ConnectorConfig;
use crate::core::directory::ReferenceDirectory;
use crate::core::flatten::{Flattener, OrderPlan};
use crate::core::intake::OrderFile;
use crate::core::store::{CommitSummary, OrderRecord, Store, StoreError};

/// What happened to one order payload
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Plan written to the store
    Committed {
        order_number: u64,
        plan: OrderPlan,
        summary: CommitSummary,
    },
    /// Plan built but not written
    Planned { order_number: u64, plan: OrderPlan },
    /// Every line item was aborted; nothing written
    Rejected { order_number: u64, plan: OrderPlan },
    Cancelled { order_number: u64 },
    /// Same payload committed before
    Duplicate { order_number: u64 },
}

impl Outcome {
    pub fn order_number(&self) -> u64 {
        match self {
            Outcome::Committed { order_number, .. }
            | Outcome::Planned { order_number, .. }
            | Outcome::Rejected { order_number, .. }
            | Outcome::Cancelled { order_number }
            | Outcome::Duplicate { order_number } => *order_number,
        }
    }

    pub fn plan(&self) -> Option<&OrderPlan> {
        match self {
            Outcome::Committed { plan, .. }
            | Outcome::Planned { plan, .. }
            | Outcome::Rejected { plan, .. } => Some(plan),
            Outcome::Cancelled { .. } | Outcome::Duplicate { .. } => None,
        }
    }

    /// False when the order needs operator attention
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Rejected { .. })
    }
}

/// Batch options
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Build plans without writing
    pub dry_run: bool,
    /// Ignore the processed-payload check
    pub force: bool,
}

pub struct OrderProcessor<'a> {
    store: &'a mut Store,
    flattener: Flattener<'a, ReferenceDirectory>,
    connector: &'a ConnectorConfig,
    options: ProcessOptions,
    /// Next number for dry runs, which never advance the store
    next_planned: Option<u64>,
}

impl<'a> OrderProcessor<'a> {
    pub fn new(
        store: &'a mut Store,
        flattener: Flattener<'a, ReferenceDirectory>,
        connector: &'a ConnectorConfig,
        options: ProcessOptions,
    ) -> Self {
        Self {
            store,
            flattener,
            connector,
            options,
            next_planned: None,
        }
    }

    pub fn process(&mut self, file: &OrderFile) -> Result<Outcome, StoreError> {
        let order = &file.order;
        let order_number = order.number;

        if order.is_cancelled() {
            info!(order = order_number, "skipping cancelled order");
            return Ok(Outcome::Cancelled { order_number });
        }
        if !self.options.force && self.store.is_processed(&file.hash)? {
            info!(order = order_number, "skipping already processed order");
            return Ok(Outcome::Duplicate { order_number });
        }

        let first = match self.next_planned {
            Some(next) if self.options.dry_run => next,
            _ => self.store.next_job_number()?,
        };
        let plan = self.flattener.flatten_order(order, first);

        if !plan.failures.is_empty() && plan.is_empty() {
            warn!(order = order_number, failures = plan.failures.len(), "every line item aborted");
            return Ok(Outcome::Rejected { order_number, plan });
        }

        if self.options.dry_run {
            self.next_planned = Some(plan.next_job_number);
            return Ok(Outcome::Planned { order_number, plan });
        }

        let record = OrderRecord {
            payload_hash: file.hash.clone(),
            source: file.source(),
        };
        let summary = self.store.commit_plan(&plan, &record, self.connector)?;
        Ok(Outcome::Committed {
            order_number,
            plan,
            summary,
        })
    }
}
