use std::collections::HashMap;

use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::EngineError;
use crate::models::{
    ClassAverage, CohortAverage, LearnerOverallAverage, PerClassAverages, ScoreEvent,
};
use crate::store::ScoreStore;
use crate::weighting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    ByClass,
    ByLearner,
}

impl GroupKey {
    fn key_of(self, event: &ScoreEvent) -> i64 {
        match self {
            GroupKey::ByClass => event.class_id,
            GroupKey::ByLearner => event.learner_id,
        }
    }
}

/// Weighted average per group, sorted by group key.
pub fn group_weighted(events: &[ScoreEvent], key: GroupKey) -> Vec<(i64, f64)> {
    let mut groups: HashMap<i64, Vec<&ScoreEvent>> = HashMap::new();
    for event in events {
        groups.entry(key.key_of(event)).or_default().push(event);
    }

    let mut averages: Vec<(i64, f64)> = groups
        .into_iter()
        .map(|(id, group)| {
            let buckets = classify(group);
            if buckets.skipped > 0 {
                debug!(
                    ?key,
                    id,
                    skipped = buckets.skipped,
                    "dropped unclassified score events"
                );
            }
            (id, buckets.weighted_average())
        })
        .collect();

    averages.sort_by_key(|(id, _)| *id);
    averages
}

pub struct Aggregator<S> {
    store: S,
}

impl<S: ScoreStore> Aggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn per_class_averages(
        &self,
        learner_id: i64,
    ) -> Result<Option<PerClassAverages>, EngineError> {
        let events = self
            .store
            .fetch_scores_by_learner(learner_id)
            .await
            .map_err(EngineError::Store)?;

        Ok(per_class_from_events(learner_id, &events))
    }

    pub async fn overall_average(
        &self,
        learner_id: i64,
    ) -> Result<Option<LearnerOverallAverage>, EngineError> {
        let events = self
            .store
            .fetch_scores_by_learner(learner_id)
            .await
            .map_err(EngineError::Store)?;

        let Some(per_class) = per_class_from_events(learner_id, &events) else {
            return Ok(None);
        };

        let averages: Vec<f64> = per_class
            .classes
            .iter()
            .map(|class| class.weighted_average)
            .collect();

        Ok(weighting::mean(&averages).map(|overall_average| LearnerOverallAverage {
            learner_id,
            overall_average,
            class_count: averages.len(),
        }))
    }

    pub async fn cohort_average(&self) -> Result<Option<CohortAverage>, EngineError> {
        let events = self
            .store
            .fetch_all_scores()
            .await
            .map_err(EngineError::Store)?;

        let averages: Vec<f64> = group_weighted(&events, GroupKey::ByLearner)
            .into_iter()
            .map(|(_, average)| average)
            .collect();

        if averages.is_empty() {
            warn!("score store holds no events, cohort average unavailable");
        }

        Ok(weighting::mean(&averages).map(|cohort_average| CohortAverage {
            cohort_average,
            learner_count: averages.len(),
        }))
    }
}

fn per_class_from_events(learner_id: i64, events: &[ScoreEvent]) -> Option<PerClassAverages> {
    if events.is_empty() {
        debug!(learner_id, "no score events for learner");
        return None;
    }

    let classes = group_weighted(events, GroupKey::ByClass)
        .into_iter()
        .map(|(class_id, weighted_average)| ClassAverage {
            class_id,
            weighted_average,
        })
        .collect();

    Some(PerClassAverages {
        learner_id,
        classes,
    })
}
