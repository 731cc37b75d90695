//! Postgres game store
//!
//! Expects the ingestion collaborator's tables:
//!
//! ```sql
//! live_ticks           (id BIGSERIAL PRIMARY KEY, game_id TEXT, tick_id BIGINT, payload JSONB)
//! pregame_priors       (game_id TEXT PRIMARY KEY, payload JSONB)
//! projection_snapshots (game_id TEXT, tick_id BIGINT, payload JSONB,
//!                       created_at TIMESTAMPTZ DEFAULT now(),
//!                       PRIMARY KEY (game_id, tick_id))
//! ```
//!
//! Payloads are the serde JSON form of [`Tick`], the sport's priors type and
//! [`ProjectionSnapshot`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::common::errors::{EngineError, Result};
use crate::common::traits::GameStore;
use crate::common::types::{ProjectionSnapshot, Tick};
use crate::config::types::DatabaseConfig;

/// Postgres-backed store for one sport's stats and priors types
pub struct PostgresStore<S, P> {
    pool: PgPool,
    _types: PhantomData<fn() -> (S, P)>,
}

impl<S, P> PostgresStore<S, P> {
    /// Create a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _types: PhantomData,
        }
    }

    /// Open a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database (max {} connections)", config.max_connections);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl<S, P> GameStore<S, P> for PostgresStore<S, P>
where
    S: DeserializeOwned + Send + Sync + 'static,
    P: DeserializeOwned + Serialize + Send + Sync + 'static,
{
    #[instrument(skip(self))]
    async fn load_ticks(&self, game_id: &str) -> Result<Vec<Tick<S>>> {
        let rows = sqlx::query(
            r#"
            SELECT payload
            FROM live_ticks
            WHERE game_id = $1
            ORDER BY id
            "#,
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(EngineError::GameNotFound(game_id.to_string()));
        }

        let ticks = rows
            .into_iter()
            .map(|row| {
                let payload: serde_json::Value = row.get("payload");
                serde_json::from_value(payload).map_err(EngineError::from)
            })
            .collect::<Result<Vec<Tick<S>>>>()?;

        debug!("Loaded {} ticks for {}", ticks.len(), game_id);
        Ok(ticks)
    }

    #[instrument(skip(self))]
    async fn load_priors(&self, game_id: &str) -> Result<P> {
        let row = sqlx::query("SELECT payload FROM pregame_priors WHERE game_id = $1")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.get("payload");
                Ok(serde_json::from_value(payload)?)
            }
            None => Err(EngineError::PriorsNotFound(game_id.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn load_snapshots(&self, game_id: &str) -> Result<Vec<ProjectionSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT payload
            FROM projection_snapshots
            WHERE game_id = $1
            ORDER BY tick_id
            "#,
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let payload: serde_json::Value = row.get("payload");
                serde_json::from_value(payload).map_err(EngineError::from)
            })
            .collect()
    }

    #[instrument(skip(self, snapshot), fields(game_id = %snapshot.game_id, tick_id = snapshot.tick_id))]
    async fn save_snapshot(&self, snapshot: &ProjectionSnapshot) -> Result<()> {
        let payload = serde_json::to_value(snapshot)?;

        let result = sqlx::query(
            r#"
            INSERT INTO projection_snapshots (game_id, tick_id, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (game_id, tick_id) DO NOTHING
            "#,
        )
        .bind(&snapshot.game_id)
        .bind(snapshot.tick_id)
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::SnapshotExists {
                game_id: snapshot.game_id.clone(),
                tick_id: snapshot.tick_id,
            });
        }
        Ok(())
    }
}
