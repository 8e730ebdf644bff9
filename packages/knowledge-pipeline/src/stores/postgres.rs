//! Postgres-backed repository implementation.
//!
//! Attribute lists serialize to JSONB columns. Upserts use
//! `ON CONFLICT ... DO UPDATE` keyed on the natural key, so two
//! concurrent pipelines writing the same record resolve to last write
//! wins inside the database, never a duplicate row.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE free_zones (
//!     name TEXT PRIMARY KEY,
//!     description TEXT NOT NULL DEFAULT '',
//!     location TEXT NOT NULL DEFAULT '',
//!     benefits JSONB NOT NULL DEFAULT '[]',
//!     requirements JSONB NOT NULL DEFAULT '[]',
//!     industries JSONB NOT NULL DEFAULT '[]',
//!     last_updated TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE guides (
//!     category TEXT NOT NULL,
//!     title TEXT NOT NULL,
//!     body TEXT NOT NULL DEFAULT '',
//!     requirements JSONB NOT NULL DEFAULT '[]',
//!     documents JSONB NOT NULL DEFAULT '[]',
//!     steps JSONB NOT NULL DEFAULT '[]',
//!     last_updated TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (category, title)
//! );
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::traits::{KnowledgeRepository, UpsertOutcome};
use crate::types::{FreeZone, Guide, GuideStep, FREE_ZONES_CATEGORY};

pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn zone_from_row(row: &sqlx::postgres::PgRow) -> FreeZone {
    FreeZone {
        name: row.get("name"),
        description: row.get("description"),
        location: row.get("location"),
        benefits: serde_json::from_value(row.get("benefits")).unwrap_or_default(),
        requirements: serde_json::from_value(row.get("requirements")).unwrap_or_default(),
        industries: serde_json::from_value(row.get("industries")).unwrap_or_default(),
        last_updated: row.get("last_updated"),
    }
}

fn guide_from_row(row: &sqlx::postgres::PgRow) -> Guide {
    let steps: Vec<GuideStep> = serde_json::from_value(row.get("steps")).unwrap_or_default();
    Guide {
        category: row.get("category"),
        title: row.get("title"),
        body: row.get("body"),
        requirements: serde_json::from_value(row.get("requirements")).unwrap_or_default(),
        documents: serde_json::from_value(row.get("documents")).unwrap_or_default(),
        steps,
        last_updated: row.get("last_updated"),
    }
}

#[async_trait]
impl KnowledgeRepository for PostgresRepository {
    async fn upsert_zone(&self, zone: FreeZone) -> Result<UpsertOutcome> {
        let row = sqlx::query(
            r#"
            INSERT INTO free_zones (name, description, location, benefits, requirements, industries, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO UPDATE SET
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                benefits = EXCLUDED.benefits,
                requirements = EXCLUDED.requirements,
                industries = EXCLUDED.industries,
                last_updated = EXCLUDED.last_updated
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&zone.name)
        .bind(&zone.description)
        .bind(&zone.location)
        .bind(serde_json::to_value(&zone.benefits)?)
        .bind(serde_json::to_value(&zone.requirements)?)
        .bind(serde_json::to_value(&zone.industries)?)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(PipelineError::storage)?;

        let inserted: bool = row.get("inserted");
        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn upsert_guide(&self, guide: Guide) -> Result<UpsertOutcome> {
        let row = sqlx::query(
            r#"
            INSERT INTO guides (category, title, body, requirements, documents, steps, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (category, title) DO UPDATE SET
                body = EXCLUDED.body,
                requirements = EXCLUDED.requirements,
                documents = EXCLUDED.documents,
                steps = EXCLUDED.steps,
                last_updated = EXCLUDED.last_updated
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&guide.category)
        .bind(&guide.title)
        .bind(&guide.body)
        .bind(serde_json::to_value(&guide.requirements)?)
        .bind(serde_json::to_value(&guide.documents)?)
        .bind(serde_json::to_value(&guide.steps)?)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(PipelineError::storage)?;

        let inserted: bool = row.get("inserted");
        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn get_zone(&self, name: &str) -> Result<Option<FreeZone>> {
        let row = sqlx::query("SELECT * FROM free_zones WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(PipelineError::storage)?;
        Ok(row.as_ref().map(zone_from_row))
    }

    async fn get_guide(&self, category: &str, title: &str) -> Result<Option<Guide>> {
        let row = sqlx::query("SELECT * FROM guides WHERE category = $1 AND title = $2")
            .bind(category)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(PipelineError::storage)?;
        Ok(row.as_ref().map(guide_from_row))
    }

    async fn list_zones(&self) -> Result<Vec<FreeZone>> {
        let rows = sqlx::query("SELECT * FROM free_zones ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(PipelineError::storage)?;
        Ok(rows.iter().map(zone_from_row).collect())
    }

    async fn list_guides(&self, category: &str) -> Result<Vec<Guide>> {
        let rows = sqlx::query("SELECT * FROM guides WHERE category = $1 ORDER BY title")
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(PipelineError::storage)?;
        Ok(rows.iter().map(guide_from_row).collect())
    }

    async fn category_counts(&self) -> Result<HashMap<String, usize>> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        let zone_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM free_zones")
            .fetch_one(&self.pool)
            .await
            .map_err(PipelineError::storage)?
            .get("n");
        if zone_count > 0 {
            counts.insert(FREE_ZONES_CATEGORY.to_string(), zone_count as usize);
        }

        let rows = sqlx::query("SELECT category, COUNT(*) AS n FROM guides GROUP BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(PipelineError::storage)?;
        for row in rows {
            let category: String = row.get("category");
            let n: i64 = row.get("n");
            *counts.entry(category).or_insert(0) += n as usize;
        }

        Ok(counts)
    }
}
