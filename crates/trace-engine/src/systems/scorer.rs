use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::config::EngineConfig;
use crate::api::error::PersistError;
use crate::api::types::{ResultSummary, RoundOutcome, SessionState};
use crate::systems::lifecycle::AttemptStats;

/// Record handed to the persistence collaborator once per completed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub correct: u32,
    pub total: u32,
    pub accuracy: u32,
    pub xp_awarded: u32,
    pub skill_tags: Vec<String>,
    pub meta: serde_json::Value,
}

/// Reply from the persistence collaborator: `{ "last": { "at": ... } }`.
/// Any part may be missing; `at` may be a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogReceipt {
    #[serde(default)]
    pub last: Option<LastEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LastEntry {
    #[serde(default)]
    pub at: serde_json::Value,
}

impl LogReceipt {
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Timestamp of the saved entry, rendered as text.
    pub fn saved_at(&self) -> Option<String> {
        match &self.last.as_ref()?.at {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Persistence collaborator (XP / session log API).
pub trait SessionLogger {
    fn log_session(&mut self, record: &SessionRecord) -> Result<LogReceipt, PersistError>;
}

/// Logger for hosts without persistence. Every call is rejected as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl SessionLogger for NullLogger {
    fn log_session(&mut self, _record: &SessionRecord) -> Result<LogReceipt, PersistError> {
        Err(PersistError::Unavailable)
    }
}

/// Percentage of correct rounds, rounded to the nearest integer. Zero rounds score 0.
pub fn accuracy(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

pub fn summarize(session: &SessionState, per_round_xp: u32) -> ResultSummary {
    let correct = session.correct_count();
    let total = session.total_rounds();
    ResultSummary {
        correct,
        total,
        accuracy: accuracy(correct, total),
        xp_awarded: correct.saturating_mul(per_round_xp),
    }
}

/// Computes the session result and persists it exactly once.
#[derive(Debug, Clone)]
pub struct SessionScorer {
    kind: String,
    per_round_xp: u32,
    skill_tags: Vec<String>,
    summary: Option<ResultSummary>,
    saved_at: Option<String>,
}

impl SessionScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            kind: config.kind.clone(),
            per_round_xp: config.per_round_xp,
            skill_tags: config.skill_tags.clone(),
            summary: None,
            saved_at: None,
        }
    }

    pub fn summary(&self) -> Option<ResultSummary> {
        self.summary
    }

    pub fn saved_at(&self) -> Option<&str> {
        self.saved_at.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.summary.is_some()
    }

    pub fn record(
        &self,
        summary: &ResultSummary,
        outcomes: &[RoundOutcome],
        stats: AttemptStats,
    ) -> SessionRecord {
        SessionRecord {
            kind: self.kind.clone(),
            correct: summary.correct,
            total: summary.total,
            accuracy: summary.accuracy,
            xp_awarded: summary.xp_awarded,
            skill_tags: self.skill_tags.clone(),
            meta: json!({
                "variant": self.kind,
                "attempts": stats.attempts,
                "failedAttempts": stats.failures,
                "offPathExcursions": stats.off_path_excursions,
                "rounds": outcomes,
            }),
        }
    }

    /// Score a finished session and hand it to `logger`. Later calls return the
    /// first summary without logging again. A failed log leaves no timestamp.
    pub fn complete(
        &mut self,
        session: &SessionState,
        outcomes: &[RoundOutcome],
        stats: AttemptStats,
        logger: &mut dyn SessionLogger,
    ) -> ResultSummary {
        if let Some(summary) = self.summary {
            return summary;
        }
        let summary = summarize(session, self.per_round_xp);
        self.summary = Some(summary);

        let record = self.record(&summary, outcomes, stats);
        match logger.log_session(&record) {
            Ok(receipt) => {
                self.saved_at = receipt.saved_at();
                log::info!(
                    "session logged: {}/{} ({}%), {} xp",
                    summary.correct,
                    summary.total,
                    summary.accuracy,
                    summary.xp_awarded
                );
            }
            Err(err) => log::debug!("{err} (results shown without timestamp)"),
        }
        summary
    }

    /// Timestamp reported later by a host whose logger answers asynchronously.
    pub fn record_saved_at(&mut self, at: impl Into<String>) {
        if self.summary.is_some() {
            self.saved_at = Some(at.into());
        }
    }

    /// Clear the result for a new session.
    pub fn reset(&mut self) {
        self.summary = None;
        self.saved_at = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::types::RoundResult;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Logger that records every record and answers with a fixed reply.
    #[derive(Clone)]
    pub(crate) struct FakeLogger {
        pub records: Rc<RefCell<Vec<SessionRecord>>>,
        pub reply: Option<&'static str>,
    }

    impl FakeLogger {
        pub fn answering(reply: &'static str) -> Self {
            Self { records: Rc::default(), reply: Some(reply) }
        }

        pub fn rejecting() -> Self {
            Self { records: Rc::default(), reply: None }
        }
    }

    impl SessionLogger for FakeLogger {
        fn log_session(&mut self, record: &SessionRecord) -> Result<LogReceipt, PersistError> {
            self.records.borrow_mut().push(record.clone());
            match self.reply {
                Some(json) => LogReceipt::from_json(json),
                None => Err(PersistError::Rejected("offline".into())),
            }
        }
    }

    fn finished(total: u32, correct: u32) -> SessionState {
        let mut s = SessionState::new(total);
        for i in 0..total {
            s.resolve_round(i < correct);
        }
        s.finish();
        s
    }

    #[test]
    fn accuracy_rounds_to_nearest() {
        assert_eq!(accuracy(8, 8), 100);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(1, 8), 13);
        assert_eq!(accuracy(0, 0), 0);
    }

    #[test]
    fn summary_awards_xp_per_correct_round() {
        let s = summarize(&finished(8, 6), 15);
        assert_eq!(s, ResultSummary { correct: 6, total: 8, accuracy: 75, xp_awarded: 90 });
    }

    #[test]
    fn logs_exactly_once_and_keeps_timestamp() {
        let mut logger = FakeLogger::answering(r#"{"last":{"at":"2026-10-18T10:00:00Z"}}"#);
        let mut scorer = SessionScorer::new(&EngineConfig::default());
        let session = finished(2, 2);
        let outcomes = [
            RoundOutcome { index: 0, result: RoundResult::Success, final_progress: 100.0 },
            RoundOutcome { index: 1, result: RoundResult::Success, final_progress: 98.0 },
        ];
        let stats = AttemptStats { attempts: 2, failures: 0, off_path_excursions: 1 };

        let first = scorer.complete(&session, &outcomes, stats, &mut logger);
        let second = scorer.complete(&session, &outcomes, stats, &mut logger);
        assert_eq!(first, second);
        assert_eq!(logger.records.borrow().len(), 1);
        assert_eq!(scorer.saved_at(), Some("2026-10-18T10:00:00Z"));

        let record = &logger.records.borrow()[0];
        assert_eq!(record.kind, "line-trace");
        assert_eq!(record.xp_awarded, 30);
        assert_eq!(record.meta["offPathExcursions"], 1);
        assert_eq!(record.meta["rounds"][1]["finalProgress"], 98.0);
    }

    #[test]
    fn record_serializes_type_field() {
        let scorer = SessionScorer::new(&EngineConfig::default());
        let summary = summarize(&finished(1, 1), 15);
        let json = serde_json::to_value(scorer.record(&summary, &[], AttemptStats::default())).unwrap();
        assert_eq!(json["type"], "line-trace");
        assert_eq!(json["xpAwarded"], 15);
        assert_eq!(json["skillTags"][0], "visual-motor");
    }

    #[test]
    fn rejected_log_still_returns_summary() {
        let mut logger = FakeLogger::rejecting();
        let mut scorer = SessionScorer::new(&EngineConfig::default());
        let summary = scorer.complete(&finished(4, 3), &[], AttemptStats::default(), &mut logger);
        assert_eq!(summary.accuracy, 75);
        assert_eq!(scorer.saved_at(), None);
        assert!(scorer.is_submitted());
    }

    #[test]
    fn receipt_accepts_numeric_or_missing_timestamp() {
        assert_eq!(
            LogReceipt::from_json(r#"{"last":{"at":1760781600000}}"#).unwrap().saved_at(),
            Some("1760781600000".to_string())
        );
        assert_eq!(LogReceipt::from_json("{}").unwrap().saved_at(), None);
        assert!(LogReceipt::from_json("not json").is_err());
    }

    #[test]
    fn late_timestamp_only_after_completion() {
        let mut scorer = SessionScorer::new(&EngineConfig::default());
        scorer.record_saved_at("early");
        assert_eq!(scorer.saved_at(), None);
        scorer.complete(&finished(1, 1), &[], AttemptStats::default(), &mut NullLogger);
        scorer.record_saved_at("2026-10-18");
        assert_eq!(scorer.saved_at(), Some("2026-10-18"));
    }
}
