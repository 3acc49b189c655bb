use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

use super::kv::{read_json_or_default, write_json};
use super::{INTERACTIONS_KEY, KeyValueStore};

/// Interactions kept per session; older entries are dropped first.
pub const MAX_STORED_INTERACTIONS: usize = 100;

/// One user interaction with an embedded report (click, filter, drill...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInteraction {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct InteractionLog {
    kv: Arc<dyn KeyValueStore>,
}

impl InteractionLog {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written.
    pub fn record(
        &self,
        kind: &str,
        target: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ReportInteraction, StoreError> {
        let mut interactions = self.read_all()?;
        let interaction = ReportInteraction {
            kind: kind.to_owned(),
            target: target.map(str::to_owned),
            timestamp: now,
        };
        interactions.push(interaction.clone());
        let overflow = interactions.len().saturating_sub(MAX_STORED_INTERACTIONS);
        if overflow > 0 {
            interactions = interactions.split_off(overflow);
        }
        write_json(self.kv.as_ref(), INTERACTIONS_KEY, &interactions)?;
        Ok(interaction)
    }

    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn read_all(&self) -> Result<Vec<ReportInteraction>, StoreError> {
        read_json_or_default(self.kv.as_ref(), INTERACTIONS_KEY)
    }

    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(INTERACTIONS_KEY)
    }
}
