use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

use crate::config::StoreConfig;
use crate::error::{PipelineError, Result};
use crate::transform::ShipRecord;

/// Canonical column definitions, in field order. `seq` is internal: it
/// records load order so a re-read can reproduce the input sequence.
const FLEET_COLUMNS: &str = "seq BIGSERIAL, \
     company_name TEXT NOT NULL, \
     ship_name TEXT NOT NULL, \
     built_year INTEGER NOT NULL, \
     gross_tonnage DOUBLE PRECISION NOT NULL, \
     deadweight_tonnage DOUBLE PRECISION NOT NULL, \
     length DOUBLE PRECISION NOT NULL, \
     width DOUBLE PRECISION NOT NULL";

/// Postgres-backed fleet table. Exclusive writer of the table it is
/// configured with; every load fully replaces the previous extent.
pub struct PgFleet {
    client: Client,
    table: String,
}

impl PgFleet {
    /// Connect with the given parameters. The connection task is spawned
    /// onto the runtime; all I/O is driven through it.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self> {
        if !super::valid_table_name(&cfg.table) {
            return Err(PipelineError::Config(format!(
                "invalid table name `{}`",
                cfg.table
            )));
        }

        let (client, connection) = tokio_postgres::Config::new()
            .host(&cfg.host)
            .port(cfg.port)
            .dbname(&cfg.database)
            .user(&cfg.user)
            .password(&cfg.password)
            .connect(NoTls)
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("postgres connection error: {e}");
            }
        });

        info!(host = %cfg.host, database = %cfg.database, table = %cfg.table, "store connected");
        Ok(Self {
            client,
            table: cfg.table.clone(),
        })
    }

    /// Atomically replace the fleet table's entire content with `rows`.
    ///
    /// The rows are inserted into a shadow table and swapped in (drop old,
    /// rename staged) inside a single transaction, so a concurrent reader
    /// sees either the full prior extent or the full new one, never a mix.
    /// Any insertion failure rolls the whole load back and surfaces as
    /// `WriteFailed`.
    #[tracing::instrument(level = "info", skip(self, rows), fields(table = %self.table, rows = rows.len()))]
    pub async fn replace_all(&mut self, rows: &[ShipRecord]) -> Result<u64> {
        let table = self.table.clone();
        let stage = format!("{table}__stage");

        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        // 1) stage: fresh shadow table, invisible to readers of `table`
        tx.batch_execute(&format!(
            "DROP TABLE IF EXISTS {stage}; CREATE TABLE {stage} ({FLEET_COLUMNS});"
        ))
        .await
        .map_err(write_failed)?;

        // 2) bulk insert into the shadow table
        let insert = tx
            .prepare(&format!(
                "INSERT INTO {stage} \
                 (company_name, ship_name, built_year, gross_tonnage, \
                  deadweight_tonnage, length, width) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ))
            .await
            .map_err(write_failed)?;

        for row in rows {
            tx.execute(
                &insert,
                &[
                    &row.company_name,
                    &row.ship_name,
                    &row.built_year,
                    &row.gross_tonnage,
                    &row.deadweight_tonnage,
                    &row.length,
                    &row.width,
                ],
            )
            .await
            .map_err(write_failed)?;
        }

        // 3) swap: old extent disappears and the staged rows appear in the
        //    same commit
        tx.batch_execute(&format!(
            "DROP TABLE IF EXISTS {table}; ALTER TABLE {stage} RENAME TO {table};"
        ))
        .await
        .map_err(write_failed)?;
        tx.commit().await.map_err(write_failed)?;

        info!("fleet table replaced");
        Ok(rows.len() as u64)
    }

    /// Read the full table back in load order.
    pub async fn fetch_all(&self) -> Result<Vec<ShipRecord>> {
        let rows = self
            .client
            .query(
                &format!(
                    "SELECT company_name, ship_name, built_year, gross_tonnage, \
                     deadweight_tonnage, length, width FROM {} ORDER BY seq",
                    self.table
                ),
                &[],
            )
            .await
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|r| ShipRecord {
                company_name: r.get(0),
                ship_name: r.get(1),
                built_year: r.get(2),
                gross_tonnage: r.get(3),
                deadweight_tonnage: r.get(4),
                length: r.get(5),
                width: r.get(6),
            })
            .collect())
    }
}

fn write_failed(e: tokio_postgres::Error) -> PipelineError {
    PipelineError::WriteFailed(e.to_string())
}
