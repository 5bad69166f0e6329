//! Database schema

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS auto_number (
    type TEXT PRIMARY KEY,
    last_nbr INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS work_center (
    name TEXT PRIMARY KEY,
    queue_hrs REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS vendor (
    name TEXT PRIMARY KEY,
    description TEXT
);

CREATE TABLE IF NOT EXISTS operation (
    code TEXT PRIMARY KEY,
    work_center TEXT,
    note_text TEXT
);

CREATE TABLE IF NOT EXISTS job (
    job TEXT PRIMARY KEY,
    top_lvl_job TEXT NOT NULL,
    order_number INTEGER NOT NULL,
    component_id INTEGER NOT NULL,
    job_type TEXT NOT NULL,
    assembly_level INTEGER NOT NULL,
    part_number TEXT,
    revision TEXT,
    description TEXT,
    ext_description TEXT,
    order_quantity INTEGER NOT NULL,
    make_quantity INTEGER NOT NULL,
    scrap_quantity INTEGER NOT NULL,
    scrap_percent REAL NOT NULL,
    material TEXT,
    note_text TEXT,
    sales_code TEXT,
    created_by TEXT,
    object_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_job_top ON job(top_lvl_job);

CREATE TABLE IF NOT EXISTS bill_of_jobs (
    root_job TEXT NOT NULL,
    parent_job TEXT NOT NULL,
    component_job TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    PRIMARY KEY (parent_job, component_job)
);

CREATE TABLE IF NOT EXISTS material_req (
    root_job TEXT NOT NULL,
    job TEXT NOT NULL,
    material TEXT NOT NULL,
    description TEXT,
    quantity_per INTEGER NOT NULL,
    location TEXT
);

CREATE TABLE IF NOT EXISTS job_operation (
    job TEXT NOT NULL,
    sequence INTEGER NOT NULL,
    description TEXT NOT NULL,
    inside INTEGER NOT NULL,
    work_center TEXT,
    vendor TEXT,
    operation_service TEXT,
    runtime REAL NOT NULL,
    setup_time REAL NOT NULL,
    note_text TEXT,
    PRIMARY KEY (job, sequence)
);

CREATE TABLE IF NOT EXISTS processed_order (
    payload_hash TEXT PRIMARY KEY,
    order_number INTEGER NOT NULL,
    jobs INTEGER NOT NULL,
    source TEXT,
    processed_at TEXT NOT NULL
);
"#;
