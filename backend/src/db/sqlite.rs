use super::{select_sql, upsert_sql, ShipmentStore, StoreError, CREATE_TABLE_SQL, TABLE};
use async_trait::async_trait;
use common::model::shipment::ShipmentRecord;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// rusqlite connection shared behind a mutex. Every call runs on tokio's
/// blocking pool so the actix workers never wait on SQLite I/O.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    upsert_sql: Arc<str>,
    select_sql: Arc<str>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        info!("opened sqlite database {}", path.display());
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            upsert_sql: upsert_sql(|n| format!("?{}", n)).into(),
            select_sql: select_sql("?1").into(),
        }
    }

    async fn run<T, F>(&self, job: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Statements) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let statements = Statements {
            upsert: Arc::clone(&self.upsert_sql),
            select: Arc::clone(&self.select_sql),
        };
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Task("sqlite connection lock poisoned".to_string()))?;
            job(&mut guard, &statements)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

struct Statements {
    upsert: Arc<str>,
    select: Arc<str>,
}

#[async_trait]
impl ShipmentStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.run(|conn, _| {
            conn.execute_batch(CREATE_TABLE_SQL)?;
            Ok(())
        })
        .await
    }

    async fn upsert_batch(&self, records: &[ShipmentRecord]) -> Result<usize, StoreError> {
        let records = records.to_vec();
        self.run(move |conn, statements| {
            // Dropping `tx` without commit rolls the batch back.
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&statements.upsert)?;
                for (i, r) in records.iter().enumerate() {
                    stmt.execute(params![
                        r.shipment_number,
                        r.air_waybill,
                        r.registration_date,
                        r.created_date,
                        r.arrival_scan_time,
                        r.gateway_code,
                        r.shipper_name,
                        r.last_signature,
                        r.product_code,
                        r.line_item_count,
                        r.hold_code,
                        r.hold_code_date,
                        r.customs_status,
                        r.customs_status_time,
                        r.control_check,
                        r.control_date,
                        r.bpo_check,
                        r.bpo_date,
                        r.error_check,
                        r.error_date,
                        r.image,
                        r.image_date,
                    ])
                    .map_err(|e| StoreError::Row {
                        row: i + 1,
                        shipment_number: r.shipment_number,
                        message: e.to_string(),
                    })?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
        .await
    }

    async fn count(&self) -> Result<i64, StoreError> {
        self.run(|conn, _| {
            let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", TABLE), [], |row| {
                row.get(0)
            })?;
            Ok(count)
        })
        .await
    }

    async fn fetch(&self, shipment_number: i32) -> Result<Option<ShipmentRecord>, StoreError> {
        self.run(move |conn, statements| {
            let record = conn
                .query_row(&statements.select, params![shipment_number], record_from_row)
                .optional()?;
            Ok(record)
        })
        .await
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ShipmentRecord> {
    let flag = |i: usize| -> rusqlite::Result<bool> {
        Ok(row.get::<_, Option<bool>>(i)?.unwrap_or_default())
    };
    Ok(ShipmentRecord {
        shipment_number: row.get(0)?,
        air_waybill: row.get(1)?,
        registration_date: row.get(2)?,
        created_date: row.get(3)?,
        arrival_scan_time: row.get(4)?,
        gateway_code: row.get(5)?,
        shipper_name: row.get(6)?,
        last_signature: row.get(7)?,
        product_code: row.get(8)?,
        line_item_count: row.get(9)?,
        hold_code: row.get(10)?,
        hold_code_date: row.get(11)?,
        customs_status: row.get(12)?,
        customs_status_time: row.get(13)?,
        control_check: flag(14)?,
        control_date: row.get(15)?,
        bpo_check: flag(16)?,
        bpo_date: row.get(17)?,
        error_check: flag(18)?,
        error_date: row.get(19)?,
        image: row.get(20)?,
        image_date: row.get(21)?,
    })
}
