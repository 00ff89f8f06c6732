use super::{select_sql, upsert_sql, ShipmentStore, StoreError, CREATE_TABLE_SQL, TABLE};
use crate::config::PostgresSettings;
use async_trait::async_trait;
use common::model::shipment::ShipmentRecord;
use log::{info, warn};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

pub struct PostgresStore {
    pool: PgPool,
    upsert_sql: String,
    select_sql: String,
}

impl PostgresStore {
    /// Connects eagerly so a wrong host or password fails at startup rather
    /// than on the first import.
    pub async fn connect(settings: &PostgresSettings) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.username)
            .password(&settings.password)
            .database(&settings.database)
            .ssl_mode(settings.ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(120))
            .connect_with(options)
            .await?;

        info!(
            "connected to postgres at {}:{}/{}",
            settings.host, settings.port, settings.database
        );
        Ok(Self::with_pool(pool))
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            pool,
            upsert_sql: upsert_sql(|n| format!("${}", n)),
            select_sql: select_sql("$1"),
        }
    }
}

#[async_trait]
impl ShipmentStore for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_batch(&self, records: &[ShipmentRecord]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        // sqlx prepares the statement once per connection and reuses it for
        // every execution with the same SQL text.
        for (i, r) in records.iter().enumerate() {
            let result = sqlx::query(&self.upsert_sql)
                .bind(r.shipment_number)
                .bind(r.air_waybill.as_deref())
                .bind(r.registration_date)
                .bind(r.created_date)
                .bind(r.arrival_scan_time)
                .bind(r.gateway_code.as_deref())
                .bind(r.shipper_name.as_deref())
                .bind(r.last_signature.as_deref())
                .bind(r.product_code.as_deref())
                .bind(r.line_item_count)
                .bind(r.hold_code.as_deref())
                .bind(r.hold_code_date)
                .bind(r.customs_status.as_deref())
                .bind(r.customs_status_time)
                .bind(r.control_check)
                .bind(r.control_date)
                .bind(r.bpo_check)
                .bind(r.bpo_date)
                .bind(r.error_check)
                .bind(r.error_date)
                .bind(r.image.as_deref())
                .bind(r.image_date)
                .execute(&mut *tx)
                .await;

            if let Err(e) = result {
                if let Err(rollback) = tx.rollback().await {
                    warn!("rollback after failed upsert also failed: {}", rollback);
                }
                return Err(StoreError::Row {
                    row: i + 1,
                    shipment_number: r.shipment_number,
                    message: e.to_string(),
                });
            }
        }

        tx.commit().await?;
        Ok(records.len())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", TABLE))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch(&self, shipment_number: i32) -> Result<Option<ShipmentRecord>, StoreError> {
        let row = sqlx::query(&self.select_sql)
            .bind(shipment_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row).transpose()?)
    }
}

fn record_from_row(row: &PgRow) -> Result<ShipmentRecord, sqlx::Error> {
    let flag = |i: usize| -> Result<bool, sqlx::Error> {
        Ok(row.try_get::<Option<bool>, _>(i)?.unwrap_or_default())
    };
    Ok(ShipmentRecord {
        shipment_number: row.try_get(0)?,
        air_waybill: row.try_get(1)?,
        registration_date: row.try_get(2)?,
        created_date: row.try_get(3)?,
        arrival_scan_time: row.try_get(4)?,
        gateway_code: row.try_get(5)?,
        shipper_name: row.try_get(6)?,
        last_signature: row.try_get(7)?,
        product_code: row.try_get(8)?,
        line_item_count: row.try_get(9)?,
        hold_code: row.try_get(10)?,
        hold_code_date: row.try_get(11)?,
        customs_status: row.try_get(12)?,
        customs_status_time: row.try_get(13)?,
        control_check: flag(14)?,
        control_date: row.try_get(15)?,
        bpo_check: flag(16)?,
        bpo_date: row.try_get(17)?,
        error_check: flag(18)?,
        error_date: row.try_get(19)?,
        image: row.try_get(20)?,
        image_date: row.try_get(21)?,
    })
}
