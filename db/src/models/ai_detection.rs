//! Recording of externally produced AI-writing detection results.
//!
//! No detection happens here. A detector outside this system produces a
//! score in `[0, 100]` plus an arbitrary JSON result; this module validates
//! it and decides the flag against the configured threshold.

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Payload accepted from a detector.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionReport {
    pub score: f64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub flag_reason: Option<String>,
}

/// Values written into the AI-detection columns of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub score: f64,
    pub result: Value,
    pub flagged: bool,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub fn evaluate(report: DetectionReport, threshold: f64) -> Result<Verdict, ModelError> {
    if !report.score.is_finite() || !(0.0..=100.0).contains(&report.score) {
        return Err(ModelError::invalid("AI detection score must be between 0 and 100"));
    }

    let result = match report.result {
        Some(value @ Value::Object(_)) => value,
        Some(other) => serde_json::json!({ "value": other }),
        None => serde_json::json!({}),
    };

    let flagged = report.score >= threshold;
    let reason = if flagged {
        Some(report.flag_reason.unwrap_or_else(|| {
            format!(
                "AI detection score {:.1} is at or above the threshold of {:.1}",
                report.score, threshold
            )
        }))
    } else {
        None
    };

    Ok(Verdict {
        score: report.score,
        result,
        flagged,
        reason,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(score: f64) -> DetectionReport {
        DetectionReport { score, result: None, flag_reason: None }
    }

    #[test]
    fn flags_at_threshold() {
        let verdict = evaluate(report(70.0), 70.0).unwrap();
        assert!(verdict.flagged);
        assert!(verdict.reason.unwrap().contains("70.0"));
        assert_eq!(verdict.result, json!({}));
    }

    #[test]
    fn below_threshold_is_not_flagged() {
        let verdict = evaluate(report(69.9), 70.0).unwrap();
        assert!(!verdict.flagged);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn keeps_supplied_reason_and_result() {
        let verdict = evaluate(
            DetectionReport {
                score: 91.0,
                result: Some(json!({"model": "x", "segments": 3})),
                flag_reason: Some("copied phrasing".into()),
            },
            70.0,
        )
        .unwrap();
        assert_eq!(verdict.reason.as_deref(), Some("copied phrasing"));
        assert_eq!(verdict.result["segments"], 3);
    }

    #[test]
    fn non_object_result_is_wrapped() {
        let verdict = evaluate(
            DetectionReport { score: 10.0, result: Some(json!([1, 2])), flag_reason: None },
            70.0,
        )
        .unwrap();
        assert_eq!(verdict.result, json!({"value": [1, 2]}));
    }

    #[test]
    fn rejects_out_of_range_scores() {
        assert!(matches!(evaluate(report(-0.1), 70.0), Err(ModelError::Invalid(_))));
        assert!(matches!(evaluate(report(100.5), 70.0), Err(ModelError::Invalid(_))));
        assert!(matches!(evaluate(report(f64::NAN), 70.0), Err(ModelError::Invalid(_))));
    }
}
