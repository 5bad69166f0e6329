//! Hardware fan-out - material requirements for purchased components
//!
//! Hardware never gets a job of its own. Once every manufactured component of
//! a line item has a job, each hardware component is linked to the job of
//! every parent consuming it, with the quantity declared on that parent's edge.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::core::diagnostic::{Diagnostic, Issue};
use crate::entities::job::{AssemblyLink, LinkChild};
use crate::entities::order::OrderItem;

/// Link every hardware component of `item` to its parents' jobs
///
/// `jobs` maps component IDs to job numbers. Problems are appended to
/// `diagnostics`; a parent without a job is skipped, a missing edge falls back
/// to the hardware's innate quantity and a parent listed twice is linked once.
/// Hardware without an ID is skipped; the flattener reports it.
pub fn link_hardware(
    line_item: usize,
    item: &OrderItem,
    root_job: &str,
    jobs: &HashMap<u64, String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<AssemblyLink> {
    let mut links = Vec::new();

    for hardware in item.components.iter().filter(|c| c.is_hardware) {
        let Some(hardware_id) = hardware.id else {
            continue;
        };
        if hardware.parent_ids.is_empty() {
            diagnostics.push(Diagnostic::new(
                line_item,
                Some(hardware_id),
                Issue::OrphanedHardware,
            ));
            continue;
        }

        let mut linked = HashSet::new();
        for &parent_id in &hardware.parent_ids {
            if !linked.insert(parent_id) {
                diagnostics.push(Diagnostic::new(
                    line_item,
                    Some(hardware_id),
                    Issue::RepeatedParent { parent_id },
                ));
                continue;
            }

            let Some(parent_job) = jobs.get(&parent_id) else {
                diagnostics.push(Diagnostic::new(
                    line_item,
                    Some(hardware_id),
                    Issue::ParentWithoutJob { parent_id },
                ));
                continue;
            };

            let quantity = match item
                .get_component(parent_id)
                .and_then(|parent| parent.quantity_of_child(hardware_id))
            {
                Some(q) => q,
                None => {
                    diagnostics.push(Diagnostic::new(
                        line_item,
                        Some(hardware_id),
                        Issue::MissingEdgeQuantity {
                            parent_id,
                            fallback: hardware.innate_quantity,
                        },
                    ));
                    hardware.innate_quantity
                }
            };

            debug!(
                parent_job = parent_job.as_str(),
                hardware = hardware.part_number.as_deref().unwrap_or("-"),
                quantity,
                "linked hardware"
            );
            links.push(AssemblyLink {
                root_job: root_job.to_string(),
                parent_job: parent_job.clone(),
                child: LinkChild::Hardware {
                    component_id: hardware_id,
                    part_number: hardware.part_number.clone(),
                    description: hardware.description.clone(),
                },
                quantity,
            });
        }
    }

    links
}
