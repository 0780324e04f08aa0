use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::verify::{VerificationRequest, VerificationResult};

/// The document stored in the activity log for each user action
#[derive(Debug, Serialize)]
pub struct ActivityRecord {
    kind: &'static str,
    input: Value,
    output: Value,
    at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn from_verification(request: &VerificationRequest, result: &VerificationResult) -> serde_json::Result<Self> {
        Ok(
            Self {
                kind: "verifier",
                input: serde_json::to_value(request)?,
                output: serde_json::to_value(result)?,
                at: Utc::now(),
            }
        )
    }
}
