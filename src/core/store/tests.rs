//! Unit tests for the store module

use super::*;
use crate::core::flatten::{FlattenOptions, Flattener};
use crate::core::routing::{RoutingMap, RoutingResolver};
use crate::entities::order::{ChildLink, Operation, Order, OrderComponent, OrderItem};
use tempfile::tempdir;

fn seeded_store() -> Store {
    let store = Store::open_in_memory(1000).unwrap();
    for name in ["SAW", "GENERAL"] {
        store.upsert_work_center(&WorkCenter::new(name)).unwrap();
    }
    for name in ["PLATECO", "MISC"] {
        store.upsert_vendor(&Vendor::new(name)).unwrap();
    }
    store
}

fn component(id: u64) -> OrderComponent {
    OrderComponent {
        id: Some(id),
        part_number: Some(format!("PN-{}", id)),
        revision: None,
        description: Some("A bracket with a description well over thirty characters".to_string()),
        is_hardware: false,
        is_root_component: false,
        make_quantity: 2,
        deliver_quantity: 2,
        innate_quantity: 1,
        parent_ids: Vec::new(),
        children: Vec::new(),
        shop_operations: Vec::new(),
        material: None,
    }
}

fn sample_order() -> Order {
    let mut root = component(1);
    root.is_root_component = true;
    root.children = vec![
        ChildLink { child_id: 2, quantity: 1 },
        ChildLink { child_id: 3, quantity: 4 },
    ];
    root.shop_operations = vec![
        Operation {
            name: "Saw".to_string(),
            notes: None,
            runtime: Some(1.5),
            setup_time: Some(0.25),
        },
        Operation {
            name: "Anodize".to_string(),
            notes: None,
            runtime: None,
            setup_time: None,
        },
    ];
    let mut child = component(2);
    child.parent_ids = vec![1];
    let mut screw = component(3);
    screw.is_hardware = true;
    screw.parent_ids = vec![1];

    Order {
        number: 42,
        quote_number: None,
        status: Default::default(),
        private_notes: None,
        order_items: vec![OrderItem {
            id: 7,
            quantity: 2,
            public_notes: None,
            private_notes: None,
            lead_days: None,
            ships_on: None,
            components: vec![root, child, screw],
            ordered_add_ons: Vec::new(),
        }],
    }
}

fn plan_for(store: &Store, order: &Order) -> OrderPlan {
    let directory = store.load_directory(&DefaultsConfig::default()).unwrap();
    let mut map = RoutingMap::default();
    map.map_inside("Saw", "SAW", None);
    map.map_outside("Anodize", "PLATECO", Some("ANODIZE-CLEAR"));
    let mut flattener = Flattener::new(
        RoutingResolver::new(&directory, &map),
        FlattenOptions::default(),
    );
    flattener.flatten_order(order, store.next_job_number().unwrap())
}

fn record(hash: &str) -> OrderRecord {
    OrderRecord {
        payload_hash: hash.to_string(),
        source: Some("order-42.json".to_string()),
    }
}

#[test]
fn test_fresh_store_numbering() {
    let store = Store::open_in_memory(1000).unwrap();
    assert_eq!(store.next_job_number().unwrap(), 1000);
    assert_eq!(store.job_count().unwrap(), 0);
}

#[test]
fn test_reopen_keeps_numbering() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("data").join("jobflow.db");

    let mut store = Store::open(&path, 500).unwrap();
    store.upsert_work_center(&WorkCenter::new("GENERAL")).unwrap();
    store.upsert_vendor(&Vendor::new("MISC")).unwrap();
    let plan = plan_for(&store, &sample_order());
    store.commit_plan(&plan, &record("abc"), &ConnectorConfig::default()).unwrap();
    drop(store);

    // seed is ignored once the autonumber row exists
    let store = Store::open(&path, 1).unwrap();
    assert_eq!(store.next_job_number().unwrap(), 501);
    assert!(store.is_processed("abc").unwrap());
}

#[test]
fn test_load_directory_requires_defaults() {
    let store = Store::open_in_memory(1).unwrap();
    let err = store.load_directory(&DefaultsConfig::default()).unwrap_err();
    assert!(matches!(err, StoreError::Directory(_)));
}

#[test]
fn test_commit_plan_writes_everything() {
    let mut store = seeded_store();
    let plan = plan_for(&store, &sample_order());

    let summary = store
        .commit_plan(&plan, &record("hash-1"), &ConnectorConfig::default())
        .unwrap();

    assert_eq!(
        summary,
        CommitSummary {
            jobs: 2,
            bill_of_jobs: 1,
            material_reqs: 1,
            operations: 2,
        }
    );
    assert_eq!(store.job_count().unwrap(), 2);
    assert_eq!(store.next_job_number().unwrap(), 1001);
    assert!(store.is_processed("hash-1").unwrap());
    assert!(!store.is_processed("hash-2").unwrap());

    assert_eq!(store.bill_of_jobs("1000").unwrap(), vec![("1000-1".to_string(), 1)]);
    assert_eq!(store.material_reqs("1000").unwrap(), vec![("PN-3".to_string(), 4)]);

    let ops = store.job_operations("1000").unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].1, "SAW");
    assert_eq!(ops[1].1, "PLATECO");
    // service code fitted to the ERP column
    assert_eq!(ops[1].2.as_deref(), Some("ANODIZE-CL"));

    let jobs = store.jobs().unwrap();
    assert_eq!(jobs[0].job, "1000");
    assert_eq!(jobs[0].order_number, 42);
    assert_eq!(jobs[0].scrap_quantity, 0);

    let processed = store.processed_orders().unwrap();
    assert_eq!(processed.len(), 1);
    assert_eq!(processed[0].jobs, 2);
}

#[test]
fn test_description_overflow_goes_to_ext_description() {
    let mut store = seeded_store();
    let plan = plan_for(&store, &sample_order());
    store
        .commit_plan(&plan, &record("h"), &ConnectorConfig::default())
        .unwrap();

    let (description, ext): (String, Option<String>) = store
        .conn
        .query_row(
            "SELECT description, ext_description FROM job WHERE job = '1000'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(description.chars().count(), DESCRIPTION_WIDTH);
    assert_eq!(
        format!("{}{}", description, ext.unwrap()),
        "A bracket with a description well over thirty characters"
    );
}

#[test]
fn test_duplicate_job_rolls_back() {
    let mut store = seeded_store();
    let plan = plan_for(&store, &sample_order());
    store
        .commit_plan(&plan, &record("first"), &ConnectorConfig::default())
        .unwrap();

    // same plan again: job 1000 already exists
    let err = store
        .commit_plan(&plan, &record("second"), &ConnectorConfig::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateJob(ref j) if j == "1000"));
    assert_eq!(store.job_count().unwrap(), 2);
    assert!(!store.is_processed("second").unwrap());
}

#[test]
fn test_material_only_when_enabled() {
    let mut store = seeded_store();
    let mut order = sample_order();
    order.order_items[0].components[0].material = Some(crate::entities::order::Material {
        name: "6061-t6".to_string(),
    });
    let plan = plan_for(&store, &order);
    let connector = ConnectorConfig {
        import_material: true,
        ..ConnectorConfig::default()
    };
    store.commit_plan(&plan, &record("m"), &connector).unwrap();

    let material: Option<String> = store
        .conn
        .query_row("SELECT material FROM job WHERE job = '1000'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(material.as_deref(), Some("6061-T6"));
}

#[test]
fn test_import_csv() {
    let tmp = tempdir().unwrap();
    let wc = tmp.path().join("work_centers.csv");
    let vendors = tmp.path().join("vendors.csv");
    let ops = tmp.path().join("operations.csv");
    std::fs::write(&wc, "work_center,queue_hrs\nSAW,1.5\nMILL,\n").unwrap();
    std::fs::write(&vendors, "vendor,description\nPLATECO,Plating Co\nMISC,\n").unwrap();
    std::fs::write(&ops, "operation,work_center,note_text\nSC,SAW,Cut to length\n").unwrap();

    let store = Store::open_in_memory(1).unwrap();
    assert_eq!(store.import_work_centers(&wc).unwrap(), 2);
    assert_eq!(store.import_vendors(&vendors).unwrap(), 2);
    assert_eq!(store.import_operations(&ops).unwrap(), 1);

    let centers = store.work_centers().unwrap();
    assert_eq!(centers[0].name, "MILL");
    assert_eq!(centers[1].queue_hrs, 1.5);
    assert_eq!(store.vendors().unwrap()[0].description, None);
    assert_eq!(
        store.operations().unwrap()[0].note_text.as_deref(),
        Some("Cut to length")
    );

    // re-import updates in place
    std::fs::write(&wc, "work_center,queue_hrs\nSAW,3\n").unwrap();
    store.import_work_centers(&wc).unwrap();
    assert_eq!(store.work_centers().unwrap().len(), 2);
}
