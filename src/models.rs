//! Data types that cross the service boundary.
//!
//! These are the shapes serialized over HTTP (`/query`, `/seed`) plus the
//! seed-corpus document that feeds the vector store.

use serde::{Deserialize, Serialize};

/// A reference document: a stable id and the text stored as vector metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question. Must be at least three characters.
    pub question: String,
}

/// Response of `POST /query`.
///
/// Constructed fresh per query, never persisted. `degraded` is set when the
/// context documents were substituted (synthetic embedding or fallback
/// context); the answer text itself carries generation failures inline.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub source_documents: Vec<String>,
    /// Elapsed wall-clock seconds for the full retrieve-and-generate chain.
    pub processing_time: f64,
    pub degraded: bool,
}

/// Result of a seeding run.
///
/// `count` is present on success, `detail` on upsert failure — the two are
/// mutually exclusive on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SeedReport {
    pub fn seeded(count: usize) -> Self {
        Self {
            status: "seeded".to_string(),
            count: Some(count),
            detail: None,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            count: None,
            detail: Some(detail.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_report_success_shape() {
        let report = SeedReport::seeded(4);
        assert!(!report.is_error());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "seeded");
        assert_eq!(json["count"], 4);
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_seed_report_error_shape() {
        let report = SeedReport::error("upstream refused");
        assert!(report.is_error());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["detail"], "upstream refused");
        assert!(json.get("count").is_none());
    }
}
