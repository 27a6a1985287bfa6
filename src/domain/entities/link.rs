//! Link entity representing a short-code mapping.

use chrono::{DateTime, Utc};

/// A stored short link with its usage counters.
///
/// `code` is the unique key. `clicks` and `last_clicked_at` only move forward,
/// and `created_at` is fixed when the record is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub code: String,
    pub target_url: String,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        code: String,
        target_url: String,
        clicks: i64,
        last_clicked_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            target_url,
            clicks,
            last_clicked_at,
            created_at,
        }
    }

    /// Applies one successful resolution to the counters.
    ///
    /// `last_clicked_at` never moves backwards, even if a click recorded with
    /// an older timestamp commits after a newer one.
    pub fn apply_click(&mut self, clicked_at: DateTime<Utc>) {
        self.clicks += 1;
        self.last_clicked_at = Some(match self.last_clicked_at {
            Some(previous) if previous > clicked_at => previous,
            _ => clicked_at,
        });
    }
}

impl From<NewLink> for Link {
    fn from(new_link: NewLink) -> Self {
        Self::new(
            new_link.code,
            new_link.target_url,
            0,
            None,
            new_link.created_at,
        )
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewLink {
    /// Prepares a record stamped with the current time.
    pub fn new(code: String, target_url: String) -> Self {
        Self {
            code,
            target_url,
            created_at: Utc::now(),
        }
    }
}
