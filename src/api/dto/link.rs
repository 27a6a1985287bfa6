//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Request to create a short link.
///
/// A missing `url` deserializes to an empty string and is rejected as an
/// invalid URL. An empty `code` means "generate one".
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub code: Option<String>,
}

impl CreateLinkRequest {
    /// The custom code, if one was actually supplied.
    pub fn custom_code(&self) -> Option<String> {
        self.code.clone().filter(|code| !code.is_empty())
    }
}

/// Serialized link record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub url: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            url: link.target_url,
            clicks: link.clicks,
            last_clicked: link.last_clicked_at,
            created_at: link.created_at,
        }
    }
}

/// Confirmation returned after a delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}
