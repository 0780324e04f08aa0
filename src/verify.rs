use std::collections::HashSet;

use log::info;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auspost::model::Locality;
use crate::auspost::LocalityDirectory;
use crate::error::DirectoryError;

/// A claimed suburb/postcode/state triple, exactly as the caller typed it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub suburb: String,
    pub postcode: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub best_match: Option<Locality>,
}

/// comparison forms of a request: trimmed, names and states upper-cased
struct Normalized {
    suburb: String,
    postcode: String,
    state: String,
}

impl From<&VerificationRequest> for Normalized {
    fn from(request: &VerificationRequest) -> Self {
        Self {
            suburb: request.suburb.trim().to_uppercase(),
            postcode: request.postcode.trim().to_string(),
            state: request.state.trim().to_uppercase(),
        }
    }
}

impl Normalized {
    fn is_complete(&self) -> bool {
        !self.suburb.is_empty() && !self.postcode.is_empty() && !self.state.is_empty()
    }
}

/// Checks claimed addresses against the locality directory
#[derive(Clone)]
pub struct AddressReconciler {
    directory: LocalityDirectory,
}

impl AddressReconciler {
    pub fn new(directory: LocalityDirectory) -> Self {
        Self { directory }
    }

    /// verify a suburb/postcode/state triple with a single directory lookup by postcode
    #[instrument(skip(self))]
    pub async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResult, DirectoryError> {
        let postcode = request.postcode.trim();
        let localities = if postcode.is_empty() {
            Vec::new()
        } else {
            self.directory.by_postcode(postcode).await?
        };

        let result = reconcile(request, &localities);
        info!(
            "verified [{} {} {}]: valid={} errors={}",
            request.suburb, request.postcode, request.state, result.is_valid, result.errors.len()
        );
        Ok(result)
    }

    /// raw directory search, no reconciliation
    pub async fn search_localities(&self, text: &str, state: Option<&str>) -> Result<Vec<Locality>, DirectoryError> {
        self.directory.search(text, state).await
    }
}

/// Reconcile a request against every locality registered under its postcode.
pub fn reconcile(request: &VerificationRequest, localities: &[Locality]) -> VerificationResult {
    let target = Normalized::from(request);

    // nothing else is worth reporting for a fictitious postcode
    if localities.is_empty() {
        return VerificationResult {
            is_valid: false,
            errors: vec![format!("The postcode {} does not exist", target.postcode)],
            best_match: None,
        };
    }

    let suburb_matches = localities.iter()
        .filter(|l| l.is_named(&target.suburb))
        .collect::<Vec<_>>();
    let postcode_matches = localities.iter()
        .filter(|l| l.has_postcode(&target.postcode))
        .collect::<Vec<_>>();

    let mut errors = Vec::new();

    if !target.suburb.is_empty() && !target.postcode.is_empty()
        && !suburb_matches.iter().any(|l| l.has_postcode(&target.postcode))
    {
        if suburb_matches.is_empty() {
            errors.push(format!("The suburb {} does not exist", request.suburb));
        } else {
            errors.push(format!("The postcode {} does not match the suburb {}", target.postcode, request.suburb));
        }
    }

    if !target.suburb.is_empty() && !target.state.is_empty()
        && !suburb_matches.iter().any(|l| l.in_state(&target.state))
    {
        if suburb_matches.is_empty() {
            errors.push(format!("The suburb {} does not exist", request.suburb));
        } else {
            errors.push(format!("The suburb {} does not exist in the state {}", request.suburb, request.state));
        }
    }

    let errors = dedup_in_order(errors);
    let is_valid = errors.is_empty() && target.is_complete();

    let best_match = suburb_matches.iter()
        .find(|l| l.has_postcode(&target.postcode) && l.in_state(&target.state))
        .or_else(|| postcode_matches.first())
        .copied()
        .or_else(|| localities.first())
        .cloned();

    VerificationResult {
        is_valid,
        errors,
        best_match,
    }
}

fn dedup_in_order(mut errors: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    errors.retain(|e| seen.insert(e.clone()));
    errors
}
