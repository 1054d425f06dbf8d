//! SQLite-backed work order store
//!
//! One `work_order` table, schema created idempotently on open. The
//! listing is scoped to out-of-service alarms (退服 in the alarm
//! standard name), newest first, with an optional keyword narrowing
//! on the alarm name or the work order id.

use anyhow::{Context, Result};
use noc_common::work_order::{WorkOrder, WorkOrderStore};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Listing scope: only out-of-service work orders.
const OUT_OF_SERVICE: &str = "%退服%";

pub struct SqliteWorkOrderStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWorkOrderStore {
    /// Open or create the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS work_order (
                work_order_id   TEXT PRIMARY KEY,
                created_time    TEXT,
                GJ00008         TEXT,
                GJ00010         TEXT,
                GJ00011         TEXT,
                GJ00014         TEXT,
                GJ00017         TEXT,
                GJ00021         TEXT,
                order_subject   TEXT,
                order_status    TEXT,
                process_region  TEXT,
                warning_level   TEXT,
                network_level_1 TEXT,
                network_level_3 TEXT,
                source_name     TEXT,
                city_name_1     TEXT,
                city_name_2     TEXT,
                ne_name         TEXT,
                nms_alarm_id    TEXT,
                details         TEXT
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_work_order_alarm ON work_order (GJ00008)",
            [],
        )?;
        Ok(())
    }

    /// Insert or replace one work order (seeding and tests).
    pub fn upsert(&self, order: &WorkOrder) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO work_order (
                work_order_id, created_time,
                GJ00008, GJ00010, GJ00011, GJ00014, GJ00017, GJ00021,
                order_subject, order_status, process_region, warning_level,
                network_level_1, network_level_3, source_name,
                city_name_1, city_name_2, ne_name, nms_alarm_id, details
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                      ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                order.work_order_id,
                order.created_time,
                order.gj00008,
                order.gj00010,
                order.gj00011,
                order.gj00014,
                order.gj00017,
                order.gj00021,
                order.order_subject,
                order.order_status,
                order.process_region,
                order.warning_level,
                order.network_level_1,
                order.network_level_3,
                order.source_name,
                order.city_name_1,
                order.city_name_2,
                order.ne_name,
                order.nms_alarm_id,
                order.details,
            ],
        )?;
        Ok(())
    }
}

fn query_orders(
    stmt: &mut rusqlite::Statement<'_>,
    bind: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<WorkOrder>> {
    let rows = stmt.query_map(bind, row_to_order)?;
    rows.collect()
}

fn row_to_order(row: &Row<'_>) -> rusqlite::Result<WorkOrder> {
    Ok(WorkOrder {
        work_order_id: row.get("work_order_id")?,
        created_time: row.get("created_time")?,
        gj00008: row.get("GJ00008")?,
        gj00010: row.get("GJ00010")?,
        gj00011: row.get("GJ00011")?,
        gj00014: row.get("GJ00014")?,
        gj00017: row.get("GJ00017")?,
        gj00021: row.get("GJ00021")?,
        order_subject: row.get("order_subject")?,
        order_status: row.get("order_status")?,
        process_region: row.get("process_region")?,
        warning_level: row.get("warning_level")?,
        network_level_1: row.get("network_level_1")?,
        network_level_3: row.get("network_level_3")?,
        source_name: row.get("source_name")?,
        city_name_1: row.get("city_name_1")?,
        city_name_2: row.get("city_name_2")?,
        ne_name: row.get("ne_name")?,
        nms_alarm_id: row.get("nms_alarm_id")?,
        details: row.get("details")?,
    })
}

impl WorkOrderStore for SqliteWorkOrderStore {
    fn fetch(&self, work_order_id: &str) -> Result<Option<WorkOrder>> {
        let conn = self.conn.lock().unwrap();
        let order = conn
            .query_row(
                "SELECT * FROM work_order WHERE work_order_id = ?1",
                params![work_order_id],
                row_to_order,
            )
            .optional()
            .with_context(|| format!("failed to fetch work order '{}'", work_order_id))?;
        Ok(order)
    }

    fn list(&self, keyword: &str, offset: u64, limit: u64) -> Result<(u64, Vec<WorkOrder>)> {
        let conn = self.conn.lock().unwrap();
        let pattern = format!("%{}%", keyword);

        let total: u64 = if keyword.is_empty() {
            conn.query_row(
                "SELECT COUNT(*) FROM work_order WHERE GJ00008 LIKE ?1",
                params![OUT_OF_SERVICE],
                |row| row.get(0),
            )?
        } else {
            conn.query_row(
                "SELECT COUNT(*) FROM work_order
                 WHERE GJ00008 LIKE ?1 AND (GJ00008 LIKE ?2 OR work_order_id LIKE ?2)",
                params![OUT_OF_SERVICE, pattern],
                |row| row.get(0),
            )?
        };

        let items = if keyword.is_empty() {
            let mut stmt = conn.prepare(
                "SELECT * FROM work_order WHERE GJ00008 LIKE ?1
                 ORDER BY created_time DESC LIMIT ?2 OFFSET ?3",
            )?;
            query_orders(&mut stmt, &[&OUT_OF_SERVICE, &(limit as i64), &(offset as i64)])?
        } else {
            let mut stmt = conn.prepare(
                "SELECT * FROM work_order
                 WHERE GJ00008 LIKE ?1 AND (GJ00008 LIKE ?2 OR work_order_id LIKE ?2)
                 ORDER BY created_time DESC LIMIT ?3 OFFSET ?4",
            )?;
            query_orders(
                &mut stmt,
                &[&OUT_OF_SERVICE, &pattern, &(limit as i64), &(offset as i64)],
            )?
        };

        Ok((total, items))
    }
}
