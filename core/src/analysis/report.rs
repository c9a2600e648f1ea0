use crate::analysis::category::ErrorCategory;
use crate::prelude::{TargetError, TargetResult};
use serde::{Deserialize, Serialize};

/// Confidence under which a classification is shown as uncertain.
pub const UNCERTAIN_BELOW: f64 = 0.5;

/// Result returned by the remote image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub category: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub solution: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisVerdict {
    Detected {
        category: ErrorCategory,
        confidence: f64,
    },
    Uncertain {
        confidence: f64,
    },
    Unrecognised {
        label: String,
        confidence: f64,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnalysisResponse {
    Failure { error: String },
    Report(AnalysisReport),
}

impl AnalysisReport {
    pub fn validate(&self) -> TargetResult<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(TargetError::Analysis(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }

    pub fn verdict(&self) -> AnalysisVerdict {
        let confidence = self.confidence;
        if confidence < UNCERTAIN_BELOW {
            return AnalysisVerdict::Uncertain { confidence };
        }
        match self.category.as_deref().map(str::parse::<ErrorCategory>) {
            Some(Ok(category)) => AnalysisVerdict::Detected {
                category,
                confidence,
            },
            Some(Err(_)) | None => AnalysisVerdict::Unrecognised {
                label: self.category.clone().unwrap_or_default(),
                confidence,
            },
        }
    }

    /// Description from the service, falling back to the local catalogue.
    pub fn description_text(&self) -> String {
        match self.verdict() {
            AnalysisVerdict::Detected { category, .. } if self.description.is_empty() => {
                category.description().to_string()
            }
            _ => self.description.clone(),
        }
    }

    pub fn solution_text(&self) -> String {
        match self.verdict() {
            AnalysisVerdict::Detected { category, .. } if self.solution.is_empty() => {
                category.solution().to_string()
            }
            _ => self.solution.clone(),
        }
    }
}

/// Parses a classifier response body, surfacing `{"error": ...}` replies.
pub fn parse_response(body: &str) -> TargetResult<AnalysisReport> {
    let response: AnalysisResponse = serde_json::from_str(body)
        .map_err(|err| TargetError::Analysis(format!("unreadable response: {err}")))?;
    match response {
        AnalysisResponse::Failure { error } => Err(TargetError::Analysis(error)),
        AnalysisResponse::Report(report) => {
            report.validate()?;
            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_confident_report() {
        let report = parse_response(
            r#"{"category": "overtight_grip", "confidence": 0.91,
                "description": "Extra pressure exercised on the grip", "solution": "Relax."}"#,
        )
        .unwrap();
        assert_eq!(
            report.verdict(),
            AnalysisVerdict::Detected {
                category: ErrorCategory::OvertightGrip,
                confidence: 0.91
            }
        );
        assert_eq!(report.solution_text(), "Relax.");
    }

    #[test]
    fn low_confidence_is_uncertain() {
        let report = parse_response(r#"{"category": "early_recoil", "confidence": 0.3}"#).unwrap();
        assert_eq!(report.verdict(), AnalysisVerdict::Uncertain { confidence: 0.3 });
    }

    #[test]
    fn missing_texts_fall_back_to_catalogue() {
        let report = parse_response(r#"{"category": "breath_control", "confidence": 0.8}"#).unwrap();
        assert_eq!(
            report.description_text(),
            ErrorCategory::BreathControl.description()
        );
    }

    #[test]
    fn service_error_is_surfaced() {
        let err = parse_response(r#"{"error": "No image uploaded"}"#).unwrap_err();
        assert_eq!(err, TargetError::Analysis("No image uploaded".into()));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(parse_response(r#"{"category": "stance_position", "confidence": 1.4}"#).is_err());
        assert!(parse_response("<html>").is_err());
    }
}
