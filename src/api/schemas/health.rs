use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

impl HealthResponse {
    /// The database is the only dependency, so overall status follows it.
    #[must_use]
    pub fn reporting(database_up: bool) -> Self {
        let label = if database_up { "ok" } else { "error" };
        Self { status: label.to_string(), database: label.to_string() }
    }
}
