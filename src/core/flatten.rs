//! Assembly flattening - order line items to numbered jobs
//!
//! Each line item's assembly tree is walked depth-first from its root
//! component, siblings in declared order. Every manufactured component gets a
//! [`Job`] numbered from the line item's top-level job plus a suffix, an
//! [`AssemblyLink`] to its parent's job, and one [`JobOperation`] per routing
//! entry of each of its operations. Hardware is linked afterwards by
//! [`link_hardware`].
//!
//! Line items are independent: a line item that cannot be numbered or has no
//! usable root is aborted and reported, and the next one is processed.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::diagnostic::{Diagnostic, Issue};
use crate::core::hardware::link_hardware;
use crate::core::routing::{Directory, RoutingResolver};
use crate::core::suffix::{SuffixAllocator, SuffixError};
use crate::entities::job::{AssemblyLink, Job, JobOperation, JobType, LinkChild, Scrap};
use crate::entities::order::{Order, OrderComponent, OrderItem};
use crate::entities::resource::Routing;

/// Errors that abort a single line item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("No root component")]
    NoRoot,

    #[error("Multiple root components: {0:?}")]
    MultipleRoots(Vec<u64>),

    #[error("Root component {0} is hardware")]
    HardwareRoot(u64),

    #[error("Component ID {0} appears more than once")]
    DuplicateComponent(u64),

    #[error("Assembly is nested deeper than {max} levels below component {component}")]
    TooDeep { component: u64, max: u32 },

    #[error("Top-level job number '{job}' is longer than {width} characters")]
    JobNumberTooLong { job: String, width: usize },

    #[error("Job numbering failed: {0}")]
    Numbering(#[from] SuffixError),
}

/// Deepest assembly level walked below a line item's root
pub const MAX_ASSEMBLY_DEPTH: u32 = 64;

/// Knobs for a flattening run
#[derive(Debug, Clone, Copy)]
pub struct FlattenOptions {
    /// Width of the ERP job number column
    pub job_number_width: usize,
    /// Emit job operations
    pub import_operations: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            job_number_width: 10,
            import_operations: true,
        }
    }
}

/// Flattened output of one line item
#[derive(Debug, Clone, Serialize)]
pub struct ItemPlan {
    pub line_item: usize,
    pub order_item_id: u64,
    pub top_level_job: String,
    pub jobs: Vec<Job>,
    pub links: Vec<AssemblyLink>,
    pub operations: Vec<JobOperation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ItemPlan {
    /// Operations of one job, in sequence order
    pub fn operations_for<'p>(&'p self, job_number: &'p str) -> impl Iterator<Item = &'p JobOperation> {
        self.operations.iter().filter(move |op| op.job_number == job_number)
    }
}

/// A line item that was aborted
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub line_item: usize,
    pub order_item_id: u64,
    pub reason: String,
}

/// Flattened output of a whole order
#[derive(Debug, Clone, Serialize)]
pub struct OrderPlan {
    pub order_number: u64,
    pub items: Vec<ItemPlan>,
    pub failures: Vec<ItemFailure>,
    /// First top-level job number not used by this plan
    pub next_job_number: u64,
}

impl OrderPlan {
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.items.iter().flat_map(|i| i.jobs.iter())
    }

    pub fn links(&self) -> impl Iterator<Item = &AssemblyLink> {
        self.items.iter().flat_map(|i| i.links.iter())
    }

    pub fn operations(&self) -> impl Iterator<Item = &JobOperation> {
        self.items.iter().flat_map(|i| i.operations.iter())
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().flat_map(|i| i.diagnostics.iter())
    }

    pub fn job_count(&self) -> usize {
        self.items.iter().map(|i| i.jobs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Flattens orders, sharing one routing cache across the run
pub struct Flattener<'a, D: Directory> {
    resolver: RoutingResolver<'a, D>,
    options: FlattenOptions,
}

impl<'a, D: Directory> Flattener<'a, D> {
    pub fn new(resolver: RoutingResolver<'a, D>, options: FlattenOptions) -> Self {
        Self { resolver, options }
    }

    pub fn resolver(&self) -> &RoutingResolver<'a, D> {
        &self.resolver
    }

    /// Flatten every line item of an order
    ///
    /// Line items get consecutive top-level job numbers starting at
    /// `first_job_number`; an aborted line item does not consume a number.
    pub fn flatten_order(&mut self, order: &Order, first_job_number: u64) -> OrderPlan {
        info!(order = order.number, items = order.order_items.len(), "flattening order");

        let mut next = first_job_number;
        let mut items = Vec::new();
        let mut failures = Vec::new();

        for (index, item) in order.order_items.iter().enumerate() {
            let top_level_job = next.to_string();
            match self.flatten_item(index, item, &top_level_job) {
                Ok(plan) => {
                    next += 1;
                    items.push(plan);
                }
                Err(e) => {
                    warn!(order = order.number, line_item = index + 1, error = %e, "line item aborted");
                    failures.push(ItemFailure {
                        line_item: index,
                        order_item_id: item.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        OrderPlan {
            order_number: order.number,
            items,
            failures,
            next_job_number: next,
        }
    }

    /// Flatten one line item under the given top-level job number
    pub fn flatten_item(
        &mut self,
        line_item: usize,
        item: &OrderItem,
        top_level_job: &str,
    ) -> Result<ItemPlan, FlattenError> {
        debug!(line_item = line_item + 1, top_level_job, "starting line item");

        if top_level_job.len() > self.options.job_number_width {
            return Err(FlattenError::JobNumberTooLong {
                job: top_level_job.to_string(),
                width: self.options.job_number_width,
            });
        }

        // components without an ID cannot be referenced; edges to them surface as dangling
        let mut components: HashMap<u64, &OrderComponent> = HashMap::new();
        let mut identified: Vec<(u64, &OrderComponent)> = Vec::new();
        let mut unidentified: Vec<usize> = Vec::new();
        for (position, comp) in item.components.iter().enumerate() {
            let Some(id) = comp.id else {
                unidentified.push(position);
                continue;
            };
            if components.insert(id, comp).is_some() {
                return Err(FlattenError::DuplicateComponent(id));
            }
            identified.push((id, comp));
        }

        let roots: Vec<(u64, &OrderComponent)> = identified
            .iter()
            .copied()
            .filter(|(_, c)| c.is_root_component)
            .collect();
        let (root_id, root) = match roots.as_slice() {
            [] => return Err(FlattenError::NoRoot),
            [root] => *root,
            many => return Err(FlattenError::MultipleRoots(many.iter().map(|(id, _)| *id).collect())),
        };
        if root.is_hardware {
            return Err(FlattenError::HardwareRoot(root_id));
        }

        let mut walk = Walk {
            line_item,
            item,
            components,
            top_level_job,
            options: self.options,
            allocator: SuffixAllocator::for_job(top_level_job, self.options.job_number_width),
            visited: HashSet::new(),
            jobs_by_component: HashMap::new(),
            jobs: Vec::new(),
            links: Vec::new(),
            operations: Vec::new(),
            diagnostics: Vec::new(),
        };
        for position in unidentified {
            walk.diagnostics.push(Diagnostic::new(
                line_item,
                None,
                Issue::MissingIdentity { position: position + 1 },
            ));
        }

        walk.visit(&mut self.resolver, (root_id, root), None, 0, 0, 1)?;

        for (id, comp) in &identified {
            if !comp.is_hardware && !walk.visited.contains(id) {
                walk.report(*id, Issue::Unreachable);
            }
        }

        let hardware_links = link_hardware(
            line_item,
            item,
            top_level_job,
            &walk.jobs_by_component,
            &mut walk.diagnostics,
        );
        walk.links.extend(hardware_links);

        for diag in &walk.diagnostics {
            warn!(top_level_job, "{}", diag);
        }
        info!(
            top_level_job,
            jobs = walk.jobs.len(),
            links = walk.links.len(),
            operations = walk.operations.len(),
            "line item flattened"
        );

        Ok(ItemPlan {
            line_item,
            order_item_id: item.id,
            top_level_job: top_level_job.to_string(),
            jobs: walk.jobs,
            links: walk.links,
            operations: walk.operations,
            diagnostics: walk.diagnostics,
        })
    }
}

/// Traversal state for one line item
struct Walk<'o> {
    line_item: usize,
    item: &'o OrderItem,
    components: HashMap<u64, &'o OrderComponent>,
    top_level_job: &'o str,
    options: FlattenOptions,
    allocator: SuffixAllocator,
    visited: HashSet<u64>,
    jobs_by_component: HashMap<u64, String>,
    jobs: Vec<Job>,
    links: Vec<AssemblyLink>,
    operations: Vec<JobOperation>,
    diagnostics: Vec<Diagnostic>,
}

impl<'o> Walk<'o> {
    fn report(&mut self, component_id: u64, issue: Issue) {
        self.diagnostics
            .push(Diagnostic::new(self.line_item, Some(component_id), issue));
    }

    fn visit<D: Directory>(
        &mut self,
        resolver: &mut RoutingResolver<'_, D>,
        (id, node): (u64, &'o OrderComponent),
        parent_job: Option<&str>,
        level: u32,
        level_index: usize,
        level_count: usize,
    ) -> Result<(), FlattenError> {
        if level > MAX_ASSEMBLY_DEPTH {
            return Err(FlattenError::TooDeep {
                component: id,
                max: MAX_ASSEMBLY_DEPTH,
            });
        }
        if !self.visited.insert(id) {
            self.report(id, Issue::SharedComponent);
            return Ok(());
        }

        let suffix = self.allocator.allocate(level, level_index, level_count)?;
        let job_number = format!("{}{}", self.top_level_job, suffix);

        let scrap = match Scrap::compute(node.make_quantity, self.item.quantity, node.innate_quantity) {
            Some(scrap) => scrap,
            None => {
                self.report(id, Issue::ZeroMakeQuantity);
                Scrap::default()
            }
        };

        let mut manufactured: Vec<(u64, &'o OrderComponent)> = Vec::new();
        let mut has_hardware = false;
        for edge in &node.children {
            match self.components.get(&edge.child_id) {
                Some(child) if child.is_hardware => has_hardware = true,
                Some(child) => manufactured.push((edge.child_id, *child)),
                None => self.report(
                    id,
                    Issue::DanglingChild {
                        parent_id: id,
                        child_id: edge.child_id,
                    },
                ),
            }
        }

        self.jobs.push(Job {
            job_number: job_number.clone(),
            top_level_job: self.top_level_job.to_string(),
            component_id: id,
            job_type: if manufactured.is_empty() && !has_hardware {
                JobType::Regular
            } else {
                JobType::Assembly
            },
            assembly_level: level,
            part_number: node.part_number.clone(),
            revision: node.revision.clone(),
            description: node.description.clone(),
            order_quantity: self.item.quantity,
            make_quantity: node.make_quantity,
            scrap,
            material: node.material.as_ref().map(|m| m.name.to_uppercase()),
            notes: self.item.notes(),
            object_id: ulid::Ulid::new().to_string(),
        });
        self.jobs_by_component.insert(id, job_number.clone());
        info!(job = job_number.as_str(), component = id, "created job");

        if let Some(parent_job) = parent_job {
            self.links.push(AssemblyLink {
                root_job: self.top_level_job.to_string(),
                parent_job: parent_job.to_string(),
                child: LinkChild::Job {
                    job_number: job_number.clone(),
                },
                quantity: node.innate_quantity,
            });
        }

        if self.options.import_operations {
            self.route(resolver, id, node, &job_number, level == 0);
        }

        let count = manufactured.len();
        for (index, child) in manufactured.into_iter().enumerate() {
            self.visit(resolver, child, Some(&job_number), level + 1, index, count)?;
        }

        Ok(())
    }

    /// Emit job operations for a component's operations (and add-ons at the root)
    fn route<D: Directory>(
        &mut self,
        resolver: &mut RoutingResolver<'_, D>,
        id: u64,
        node: &OrderComponent,
        job_number: &str,
        is_root: bool,
    ) {
        let mut steps: Vec<(&str, Option<&str>, f64, f64)> = node
            .shop_operations
            .iter()
            .map(|op| {
                (
                    op.name.as_str(),
                    op.notes.as_deref(),
                    op.runtime.unwrap_or(0.0),
                    op.setup_time.unwrap_or(0.0),
                )
            })
            .collect();
        if is_root {
            steps.extend(
                self.item
                    .ordered_add_ons
                    .iter()
                    .map(|a| (a.name.as_str(), a.notes.as_deref(), 0.0, 0.0)),
            );
        }

        let mut sequence = 0u32;
        for (name, notes, runtime, setup_time) in steps {
            for entry in resolver.resolve(name) {
                if !entry.matched {
                    let issue = if entry.is_inside() {
                        Issue::DefaultWorkCenter {
                            operation: name.to_string(),
                            work_center: entry.resource_name().to_string(),
                        }
                    } else {
                        Issue::DefaultVendor {
                            operation: name.to_string(),
                            vendor: entry.resource_name().to_string(),
                        }
                    };
                    self.report(id, issue);
                }

                // a matched operation code's standard note replaces the quoted notes
                let notes = match &entry.routing {
                    Routing::Inside { operation_note: Some(std), .. } => Some(std.clone()),
                    _ => notes.map(str::to_string),
                };

                debug!(job = job_number, sequence, operation = name, "routed operation");
                self.operations.push(JobOperation {
                    job_number: job_number.to_string(),
                    sequence,
                    runtime,
                    setup_time,
                    notes,
                    routing: entry,
                });
                sequence += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::ReferenceDirectory;
    use crate::core::routing::{RoutingMap, UNMATCHED_OPERATION_NOTE};
    use crate::entities::order::{AddOn, ChildLink, Operation};
    use crate::entities::resource::{OperationDef, Vendor, WorkCenter};

    fn directory() -> ReferenceDirectory {
        ReferenceDirectory::new(
            vec![
                WorkCenter::new("SAW"),
                WorkCenter::new("MILL"),
                WorkCenter::new("GENERAL"),
            ],
            vec![Vendor::new("PLATECO"), Vendor::new("MISC")],
            vec![],
            "GENERAL",
            "MISC",
        )
        .unwrap()
    }

    fn routing_map() -> RoutingMap {
        let mut map = RoutingMap::default();
        map.map_inside("Saw", "SAW", None);
        map.map_outside("Anodize", "PLATECO", Some("AnA-8624"));
        map
    }

    fn comp(id: u64, make: u32) -> OrderComponent {
        OrderComponent {
            id: Some(id),
            part_number: Some(format!("PN-{}", id)),
            revision: Some("A".to_string()),
            description: None,
            is_hardware: false,
            is_root_component: false,
            make_quantity: make,
            deliver_quantity: make,
            innate_quantity: 1,
            parent_ids: Vec::new(),
            children: Vec::new(),
            shop_operations: Vec::new(),
            material: None,
        }
    }

    fn op(name: &str) -> Operation {
        Operation {
            name: name.to_string(),
            notes: None,
            runtime: None,
            setup_time: None,
        }
    }

    fn item(quantity: u32, components: Vec<OrderComponent>) -> OrderItem {
        OrderItem {
            id: 9,
            quantity,
            public_notes: None,
            private_notes: None,
            lead_days: None,
            ships_on: None,
            components,
            ordered_add_ons: Vec::new(),
        }
    }

    fn link(parent: &mut OrderComponent, child: &mut OrderComponent, quantity: u32) {
        parent.children.push(ChildLink {
            child_id: child.id.unwrap(),
            quantity,
        });
        child.parent_ids.extend(parent.id);
    }

    #[test]
    fn test_single_root_with_inside_and_outside_operations() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 10);
        root.is_root_component = true;
        root.shop_operations = vec![op("Saw"), op("Anodize")];
        let item = item(8, vec![root]);

        let plan = flattener.flatten_item(0, &item, "1000").unwrap();

        assert_eq!(plan.jobs.len(), 1);
        let job = &plan.jobs[0];
        assert_eq!(job.job_number, "1000");
        assert!(job.is_top_level());
        assert_eq!(job.job_type, JobType::Regular);
        assert_eq!(job.scrap.quantity, 2);
        assert!((job.scrap.percent - 20.0).abs() < 1e-9);
        assert!(plan.links.is_empty());

        assert_eq!(plan.operations.len(), 2);
        assert!(plan.operations[0].routing.is_inside());
        assert_eq!(plan.operations[0].routing.resource_name(), "SAW");
        assert!(!plan.operations[1].routing.is_inside());
        assert_eq!(plan.operations[1].routing.code(), Some("AnA-8624"));
        assert_eq!(plan.operations[0].sequence, 0);
        assert_eq!(plan.operations[1].sequence, 1);
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_root_with_hardware_child() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 5);
        root.is_root_component = true;
        let mut screw = comp(2, 15);
        screw.is_hardware = true;
        link(&mut root, &mut screw, 3);
        let item = item(5, vec![root, screw]);

        let plan = flattener.flatten_item(0, &item, "1000").unwrap();

        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].job_type, JobType::Assembly);
        assert_eq!(plan.links.len(), 1);
        assert!(plan.links[0].is_hardware());
        assert_eq!(plan.links[0].parent_job, "1000");
        assert_eq!(plan.links[0].quantity, 3);
    }

    #[test]
    fn test_multi_level_numbering_and_links() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        //  1
        //  ├── 2 (x2)
        //  │   └── 4
        //  ├── 5 (hardware)
        //  └── 3
        let mut root = comp(1, 4);
        root.is_root_component = true;
        let mut a = comp(2, 8);
        a.innate_quantity = 2;
        let mut b = comp(3, 4);
        let mut a1 = comp(4, 8);
        let mut hw = comp(5, 4);
        hw.is_hardware = true;
        link(&mut root, &mut a, 2);
        link(&mut root, &mut hw, 1);
        link(&mut root, &mut b, 1);
        link(&mut a, &mut a1, 1);
        let item = item(4, vec![root, a, b, a1, hw]);

        let plan = flattener.flatten_item(0, &item, "1000").unwrap();

        let numbers: Vec<(u64, &str)> = plan
            .jobs
            .iter()
            .map(|j| (j.component_id, j.job_number.as_str()))
            .collect();
        assert_eq!(
            numbers,
            vec![(1, "1000"), (2, "1000-1"), (4, "1000-1-1"), (3, "1000-2")]
        );
        assert_eq!(plan.jobs[2].assembly_level, 2);

        let component_links: Vec<(&str, &str, u32)> = plan
            .links
            .iter()
            .filter_map(|l| l.child_job().map(|c| (l.parent_job.as_str(), c, l.quantity)))
            .collect();
        assert_eq!(
            component_links,
            vec![
                ("1000", "1000-1", 2),
                ("1000-1", "1000-1-1", 1),
                ("1000", "1000-2", 1)
            ]
        );
        assert_eq!(plan.links.iter().filter(|l| l.is_hardware()).count(), 1);
    }

    #[test]
    fn test_add_ons_continue_root_sequence() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 1);
        root.is_root_component = true;
        root.shop_operations = vec![op("Saw")];
        let mut child = comp(2, 1);
        child.shop_operations = vec![op("Saw")];
        link(&mut root, &mut child, 1);
        let mut item = item(1, vec![root, child]);
        item.ordered_add_ons = vec![AddOn {
            name: "Anodize".to_string(),
            notes: Some("Clear".to_string()),
        }];

        let plan = flattener.flatten_item(0, &item, "77").unwrap();

        let root_ops: Vec<_> = plan.operations_for("77").collect();
        assert_eq!(root_ops.len(), 2);
        assert_eq!(root_ops[1].sequence, 1);
        assert_eq!(root_ops[1].routing.description, "Anodize");
        assert_eq!(root_ops[1].notes.as_deref(), Some("Clear"));

        let child_ops: Vec<_> = plan.operations_for("77-1").collect();
        assert_eq!(child_ops.len(), 1);
        assert_eq!(child_ops[0].sequence, 0);
    }

    #[test]
    fn test_unknown_operation_reports_default_work_center() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 1);
        root.is_root_component = true;
        root.shop_operations = vec![op("Laser Etch")];
        let item = item(1, vec![root]);

        let plan = flattener.flatten_item(0, &item, "1").unwrap();

        assert_eq!(plan.operations.len(), 1);
        let entry = &plan.operations[0].routing;
        assert!(entry.is_inside());
        assert_eq!(entry.resource_name(), "GENERAL");
        assert_eq!(entry.note.as_deref(), Some(UNMATCHED_OPERATION_NOTE));
        assert_eq!(
            plan.diagnostics[0].issue,
            Issue::DefaultWorkCenter {
                operation: "Laser Etch".to_string(),
                work_center: "GENERAL".to_string()
            }
        );
    }

    #[test]
    fn test_import_operations_disabled() {
        let dir = directory();
        let map = routing_map();
        let options = FlattenOptions {
            import_operations: false,
            ..FlattenOptions::default()
        };
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), options);

        let mut root = comp(1, 1);
        root.is_root_component = true;
        root.shop_operations = vec![op("Saw")];
        let plan = flattener.flatten_item(0, &item(1, vec![root]), "1").unwrap();

        assert_eq!(plan.jobs.len(), 1);
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn test_zero_make_quantity_reported() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 0);
        root.is_root_component = true;
        let plan = flattener.flatten_item(0, &item(3, vec![root]), "1").unwrap();

        assert_eq!(plan.jobs[0].scrap, Scrap::default());
        assert_eq!(plan.diagnostics[0].issue, Issue::ZeroMakeQuantity);
    }

    #[test]
    fn test_structural_problems_are_contained() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        // root -> 2 -> 3, root -> 3 (shared), root -> 99 (dangling), 4 unreachable
        let mut root = comp(1, 1);
        root.is_root_component = true;
        let mut a = comp(2, 1);
        let mut shared = comp(3, 1);
        link(&mut a, &mut shared, 1);
        link(&mut root, &mut a, 1);
        link(&mut root, &mut shared, 1);
        root.children.push(ChildLink {
            child_id: 99,
            quantity: 1,
        });
        let stray = comp(4, 1);
        let item = item(1, vec![root, a, shared, stray]);

        let plan = flattener.flatten_item(0, &item, "1").unwrap();

        assert_eq!(plan.jobs.len(), 3);
        let issues: Vec<&Issue> = plan.diagnostics.iter().map(|d| &d.issue).collect();
        assert!(issues.contains(&&Issue::DanglingChild {
            parent_id: 1,
            child_id: 99
        }));
        assert!(issues.contains(&&Issue::SharedComponent));
        assert!(issues.contains(&&Issue::Unreachable));
        // shared component is linked once, under its first parent
        assert_eq!(plan.links.iter().filter(|l| l.child_job() == Some("1-1-1")).count(), 1);
    }

    #[test]
    fn test_invalid_roots_abort_item() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let no_root = item(1, vec![comp(1, 1)]);
        assert_eq!(flattener.flatten_item(0, &no_root, "1").unwrap_err(), FlattenError::NoRoot);

        let mut r1 = comp(1, 1);
        r1.is_root_component = true;
        let mut r2 = comp(2, 1);
        r2.is_root_component = true;
        let two_roots = item(1, vec![r1, r2]);
        assert_eq!(
            flattener.flatten_item(0, &two_roots, "1").unwrap_err(),
            FlattenError::MultipleRoots(vec![1, 2])
        );

        let mut hw_root = comp(1, 1);
        hw_root.is_root_component = true;
        hw_root.is_hardware = true;
        assert_eq!(
            flattener.flatten_item(0, &item(1, vec![hw_root]), "1").unwrap_err(),
            FlattenError::HardwareRoot(1)
        );

        let mut dup = comp(1, 1);
        dup.is_root_component = true;
        assert_eq!(
            flattener.flatten_item(0, &item(1, vec![dup, comp(1, 1)]), "1").unwrap_err(),
            FlattenError::DuplicateComponent(1)
        );
    }

    #[test]
    fn test_numbering_exhaustion_aborts_only_that_item() {
        let dir = directory();
        let map = routing_map();
        let options = FlattenOptions {
            job_number_width: 5,
            ..FlattenOptions::default()
        };
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), options);

        // 40 children need three characters after a 4 digit job number
        let mut root = comp(1, 1);
        root.is_root_component = true;
        let mut components = Vec::new();
        for id in 2..42 {
            let mut child = comp(id, 1);
            link(&mut root, &mut child, 1);
            components.push(child);
        }
        components.insert(0, root);
        let wide = item(1, components);

        let mut simple_root = comp(100, 1);
        simple_root.is_root_component = true;
        let simple = item(1, vec![simple_root]);

        let order = Order {
            number: 5,
            quote_number: None,
            status: Default::default(),
            private_notes: None,
            order_items: vec![wide, simple],
        };

        let plan = flattener.flatten_order(&order, 1000);

        assert_eq!(plan.failures.len(), 1);
        assert_eq!(plan.failures[0].line_item, 0);
        assert!(plan.failures[0].reason.contains("Job numbering failed"));
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].line_item, 1);
        assert_eq!(plan.items[0].top_level_job, "1000");
        assert_eq!(plan.next_job_number, 1001);
    }

    #[test]
    fn test_job_number_too_long() {
        let dir = directory();
        let map = routing_map();
        let options = FlattenOptions {
            job_number_width: 3,
            ..FlattenOptions::default()
        };
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), options);

        let mut root = comp(1, 1);
        root.is_root_component = true;
        assert!(matches!(
            flattener.flatten_item(0, &item(1, vec![root]), "1000"),
            Err(FlattenError::JobNumberTooLong { .. })
        ));
    }

    #[test]
    fn test_operation_code_note_replaces_quoted_notes() {
        let dir = ReferenceDirectory::new(
            vec![WorkCenter::new("SAW"), WorkCenter::new("GENERAL")],
            vec![Vendor::new("PLATECO"), Vendor::new("MISC")],
            vec![OperationDef {
                code: "SC".to_string(),
                work_center: Some("SAW".to_string()),
                note_text: Some("Cut to length".to_string()),
            }],
            "GENERAL",
            "MISC",
        )
        .unwrap();
        let mut map = RoutingMap::default();
        map.map_inside("Saw", "SAW", Some("SC"));
        map.map_inside("Deburr", "SAW", None);
        map.map_outside("Anodize", "PLATECO", None);
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 1);
        root.is_root_component = true;
        root.shop_operations = ["Saw", "Deburr", "Anodize"]
            .into_iter()
            .map(|name| Operation {
                notes: Some(format!("{} quoted", name)),
                ..op(name)
            })
            .collect();

        let plan = flattener.flatten_item(0, &item(1, vec![root]), "1").unwrap();

        let notes: Vec<Option<&str>> = plan.operations.iter().map(|o| o.notes.as_deref()).collect();
        assert_eq!(
            notes,
            vec![Some("Cut to length"), Some("Deburr quoted"), Some("Anodize quoted")]
        );
    }

    #[test]
    fn test_component_without_id_is_skipped_and_reported() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let mut root = comp(1, 1);
        root.is_root_component = true;
        let mut sibling = comp(2, 1);
        link(&mut root, &mut sibling, 1);
        root.children.push(ChildLink {
            child_id: 5,
            quantity: 1,
        });
        let mut loose = comp(5, 1);
        loose.id = None;
        loose.parent_ids = vec![1];
        let item = item(1, vec![root, loose, sibling]);

        let plan = flattener.flatten_item(0, &item, "1").unwrap();

        let jobs: Vec<u64> = plan.jobs.iter().map(|j| j.component_id).collect();
        assert_eq!(jobs, vec![1, 2]);
        let missing = plan
            .diagnostics
            .iter()
            .find(|d| d.issue == Issue::MissingIdentity { position: 2 })
            .unwrap();
        assert_eq!(missing.component_id, None);
        assert!(plan.diagnostics.iter().any(|d| d.issue
            == Issue::DanglingChild {
                parent_id: 1,
                child_id: 5
            }));
    }

    #[test]
    fn test_too_deep_chain_aborts_item() {
        let dir = directory();
        let map = routing_map();
        let mut flattener = Flattener::new(RoutingResolver::new(&dir, &map), FlattenOptions::default());

        let last = u64::from(MAX_ASSEMBLY_DEPTH) + 2;
        let components: Vec<OrderComponent> = (1..=last)
            .map(|id| {
                let mut c = comp(id, 1);
                c.is_root_component = id == 1;
                if id > 1 {
                    c.parent_ids = vec![id - 1];
                }
                if id < last {
                    c.children = vec![ChildLink {
                        child_id: id + 1,
                        quantity: 1,
                    }];
                }
                c
            })
            .collect();

        assert_eq!(
            flattener.flatten_item(0, &item(1, components), "1").unwrap_err(),
            FlattenError::TooDeep {
                component: last,
                max: MAX_ASSEMBLY_DEPTH
            }
        );
    }
}
