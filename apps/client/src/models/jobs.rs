use std::collections::BTreeMap;

use serde::Deserialize;

/// `GET /jobs/applications/tracker` payload. Only the summary is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerResponse {
    pub summary: ApplicationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApplicationSummary {
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub recent_applications: u64,
    #[serde(default)]
    pub status_counts: BTreeMap<String, u64>,
}
