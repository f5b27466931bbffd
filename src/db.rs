use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::ScoreEvent;
use crate::store::{CsvScoreRow, ScoreStore};

pub async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let events = vec![
        ("seed-001", 1, 331, "exam", 86.0),
        ("seed-002", 1, 331, "quiz", 78.0),
        ("seed-003", 1, 331, "homework", 92.0),
        ("seed-004", 1, 414, "exam", 71.0),
        ("seed-005", 1, 414, "exam", 79.0),
        ("seed-006", 1, 414, "homework", 88.0),
        ("seed-007", 2, 331, "exam", 64.0),
        ("seed-008", 2, 331, "quiz", 70.0),
        ("seed-009", 2, 331, "project", 95.0),
        ("seed-010", 3, 502, "quiz", 90.0),
        ("seed-011", 3, 502, "homework", 97.0),
    ];

    let mut inserted = 0usize;
    for (source_key, learner_id, class_id, score_type, score) in events {
        inserted += insert_event(pool, learner_id, class_id, score_type, score, source_key).await?;
    }

    Ok(inserted)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for result in reader.deserialize::<CsvScoreRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .clone()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        let score_type = row.score_type.clone();

        let Some(event) = row.into_event() else {
            skipped += 1;
            continue;
        };

        inserted += insert_event(
            pool,
            event.learner_id,
            event.class_id,
            &score_type,
            event.score,
            &source_key,
        )
        .await?;
    }

    info!(inserted, skipped, path = %csv_path.display(), "imported score events");
    Ok(inserted)
}

async fn insert_event(
    pool: &PgPool,
    learner_id: i64,
    class_id: i64,
    score_type: &str,
    score: f64,
    source_key: &str,
) -> anyhow::Result<usize> {
    let result = sqlx::query(
        r#"
        INSERT INTO weighted_grades.score_events
        (id, learner_id, class_id, score_type, score, source_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(learner_id)
    .bind(class_id)
    .bind(score_type)
    .bind(score)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() as usize)
}

/// Postgres-backed score reader with a per-query deadline.
pub struct PgScoreStore {
    pool: PgPool,
    fetch_timeout: Duration,
}

impl PgScoreStore {
    pub fn new(pool: PgPool, fetch_timeout: Duration) -> Self {
        Self {
            pool,
            fetch_timeout,
        }
    }

    async fn fetch(&self, learner_id: Option<i64>) -> anyhow::Result<Vec<ScoreEvent>> {
        let mut query = String::from(
            "SELECT learner_id, class_id, score_type, score \
             FROM weighted_grades.score_events",
        );
        if learner_id.is_some() {
            query.push_str(" WHERE learner_id = $1");
        }

        let mut rows = sqlx::query(&query);
        if let Some(value) = learner_id {
            rows = rows.bind(value);
        }

        let records = tokio::time::timeout(self.fetch_timeout, rows.fetch_all(&self.pool))
            .await
            .with_context(|| format!("score query timed out after {:?}", self.fetch_timeout))??;

        Ok(records.iter().filter_map(event_from_row).collect())
    }
}

fn event_from_row(row: &PgRow) -> Option<ScoreEvent> {
    let learner_id: i64 = row.get("learner_id");
    let class_id: i64 = row.get("class_id");
    let score_type: String = row.get("score_type");

    match row.get::<Option<f64>, _>("score") {
        Some(score) => Some(ScoreEvent::new(learner_id, class_id, &score_type, score)),
        None => {
            warn!(
                learner_id,
                class_id,
                score_type = %score_type,
                "skipping score event without a score"
            );
            None
        }
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn fetch_scores_by_learner(&self, learner_id: i64) -> anyhow::Result<Vec<ScoreEvent>> {
        self.fetch(Some(learner_id)).await
    }

    async fn fetch_all_scores(&self) -> anyhow::Result<Vec<ScoreEvent>> {
        self.fetch(None).await
    }
}
