use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use crate::models::ScoreEvent;

/// Read access to recorded score events.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn fetch_scores_by_learner(&self, learner_id: i64) -> anyhow::Result<Vec<ScoreEvent>>;

    async fn fetch_all_scores(&self) -> anyhow::Result<Vec<ScoreEvent>>;
}

#[async_trait]
impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    async fn fetch_scores_by_learner(&self, learner_id: i64) -> anyhow::Result<Vec<ScoreEvent>> {
        (**self).fetch_scores_by_learner(learner_id).await
    }

    async fn fetch_all_scores(&self) -> anyhow::Result<Vec<ScoreEvent>> {
        (**self).fetch_all_scores().await
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<ScoreEvent>,
}

impl MemoryStore {
    pub fn new(events: Vec<ScoreEvent>) -> Self {
        Self { events }
    }

    pub fn from_csv(path: &Path) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut events = Vec::new();
        let mut skipped = 0usize;

        for result in reader.deserialize::<CsvScoreRow>() {
            match result?.into_event() {
                Some(event) => events.push(event),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, path = %path.display(), "skipped CSV rows without a score");
        }

        Ok(Self::new(events))
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn fetch_scores_by_learner(&self, learner_id: i64) -> anyhow::Result<Vec<ScoreEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.learner_id == learner_id)
            .cloned()
            .collect())
    }

    async fn fetch_all_scores(&self) -> anyhow::Result<Vec<ScoreEvent>> {
        Ok(self.events.clone())
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct CsvScoreRow {
    pub learner_id: i64,
    pub class_id: i64,
    #[serde(rename = "type")]
    pub score_type: String,
    pub score: Option<f64>,
    pub source_key: Option<String>,
}

impl CsvScoreRow {
    /// `None` when the row carries no score.
    pub fn into_event(self) -> Option<ScoreEvent> {
        let Some(score) = self.score else {
            warn!(
                learner_id = self.learner_id,
                class_id = self.class_id,
                score_type = %self.score_type,
                "skipping score event without a score"
            );
            return None;
        };
        Some(ScoreEvent::new(
            self.learner_id,
            self.class_id,
            &self.score_type,
            score,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::models::ScoreKind;

    #[tokio::test]
    async fn filters_by_learner() {
        let store = MemoryStore::new(vec![
            ScoreEvent::new(1, 10, "exam", 80.0),
            ScoreEvent::new(2, 10, "exam", 60.0),
        ]);

        let events = store.fetch_scores_by_learner(2).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].score, 60.0);
        assert_eq!(store.fetch_all_scores().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn loads_events_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "learner_id,class_id,type,score,source_key").unwrap();
        writeln!(file, "7,331,exam,88.5,").unwrap();
        writeln!(file, "7,331,project,100,p-1").unwrap();
        file.flush().unwrap();

        let store = MemoryStore::from_csv(file.path()).unwrap();
        let events = store.fetch_scores_by_learner(7).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ScoreEvent::new(7, 331, "exam", 88.5));
        assert_eq!(events[1].kind, ScoreKind::Unrecognized("project".to_string()));
    }

    #[tokio::test]
    async fn rows_without_a_score_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "learner_id,class_id,type,score,source_key").unwrap();
        writeln!(file, "7,331,exam,88.5,").unwrap();
        writeln!(file, "7,331,quiz,,").unwrap();
        writeln!(file, "8,331,homework,,h-1").unwrap();
        file.flush().unwrap();

        let store = MemoryStore::from_csv(file.path()).unwrap();
        let events = store.fetch_all_scores().await.unwrap();
        assert_eq!(events, vec![ScoreEvent::new(7, 331, "exam", 88.5)]);
    }

    #[tokio::test]
    async fn boxed_store_delegates() {
        let store: Box<dyn ScoreStore> =
            Box::new(MemoryStore::new(vec![ScoreEvent::new(3, 10, "quiz", 50.0)]));

        assert_eq!(store.fetch_scores_by_learner(3).await.unwrap().len(), 1);
        assert!(store.fetch_scores_by_learner(4).await.unwrap().is_empty());
    }
}
