//! JSON file-backed cursor state with atomic writes.
//!
//! The state file is a flat object mapping string channel ids to the last
//! message id seen for that channel. A missing or unreadable file means a
//! cold start for every channel, never an error.

use std::{collections::BTreeMap, io, path::PathBuf};

use {
    tokio::fs,
    tracing::{debug, warn},
};

use crate::error::Result;

/// In-memory map from channel id to last-seen message id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursors(BTreeMap<String, i64>);

impl Cursors {
    /// Cursor for a channel; 0 means never observed.
    #[must_use]
    pub fn get(&self, channel_id: i64) -> i64 {
        self.0.get(&channel_id.to_string()).copied().unwrap_or(0)
    }

    /// Advance a channel's cursor. Cursors never move backwards.
    pub fn advance(&mut self, channel_id: i64, message_id: i64) {
        let entry = self.0.entry(channel_id.to_string()).or_insert(0);
        *entry = (*entry).max(message_id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Loads and saves [`Cursors`] from a single JSON file.
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load cursors. A missing or unparsable file yields an empty map.
    /// Entries whose value is not an integer are ignored so newer state
    /// file revisions still load.
    pub async fn load(&self) -> Cursors {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file, cold start");
                return Cursors::default();
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file unreadable, cold start");
                return Cursors::default();
            },
        };

        match serde_json::from_str::<serde_json::Value>(&data) {
            Ok(serde_json::Value::Object(map)) => {
                let mut cursors = BTreeMap::new();
                for (key, value) in map {
                    if let Some(id) = value.as_i64() {
                        cursors.insert(key, id);
                    }
                }
                Cursors(cursors)
            },
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "state file is not a JSON object, cold start");
                Cursors::default()
            },
        }
    }

    /// Atomic save: write the whole map to a temp file, then rename it over
    /// the target so a crash mid-write cannot corrupt known-good cursors.
    pub async fn save(&self, cursors: &Cursors) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&cursors.0).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
