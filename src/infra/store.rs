//! Best-effort local snapshot store.
//!
//! Each concern persists as one JSON blob under the data dir: raw feed
//! rows (with sync stamp and fingerprint), the full event list, the
//! release-assignment map, and the dashboard filter selections. Writes go
//! through a tempfile in the same directory followed by a rename, so a
//! crash never leaves a half-written snapshot. Issues themselves are
//! never persisted; they are recomputed from the cached rows.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::core::model::{Event, RawRow};

const ROWS_FILE: &str = "rows.json";
const EVENTS_FILE: &str = "events.json";
const ASSIGNMENTS_FILE: &str = "assignments.json";
const FILTERS_FILE: &str = "filters.json";

/// Cached raw feed rows plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsSnapshot {
    pub rows: Vec<RawRow>,
    pub synced_at: DateTime<Utc>,
    /// xxh64 of the serialized rows, hex-encoded.
    pub fingerprint: String,
}

/// Persisted dashboard filter selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelections {
    pub module: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

/// Release event id → assigned issue ids.
pub type Assignments = IndexMap<String, BTreeSet<String>>;

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn write_atomic(&self, name: &str, payload: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create data dir {}", self.dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .context("create snapshot tempfile")?;
        tmp.write_all(payload.as_bytes()).context("write snapshot")?;
        tmp.persist(self.path(name))
            .with_context(|| format!("persist {name}"))?;
        debug!(file = name, bytes = payload.len(), "snapshot written");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let parsed =
            serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(parsed))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string_pretty(value).context("serialize snapshot")?;
        self.write_atomic(name, &payload)
    }

    // --- raw rows cache ---

    pub fn save_rows(&self, rows: &[RawRow], now: DateTime<Utc>) -> Result<RowsSnapshot> {
        let serialized = serde_json::to_string(rows).context("serialize rows")?;
        let snapshot = RowsSnapshot {
            rows: rows.to_vec(),
            synced_at: now,
            fingerprint: format!("{:016x}", xxh64(serialized.as_bytes(), 0)),
        };
        self.write_json(ROWS_FILE, &snapshot)?;
        Ok(snapshot)
    }

    pub fn load_rows(&self) -> Result<Option<RowsSnapshot>> {
        self.read_json(ROWS_FILE)
    }

    // --- events (full snapshot list on every mutation) ---

    pub fn save_events(&self, events: &[Event]) -> Result<()> {
        self.write_json(EVENTS_FILE, &events)
    }

    pub fn load_events(&self) -> Result<Vec<Event>> {
        Ok(self.read_json(EVENTS_FILE)?.unwrap_or_default())
    }

    // --- release assignments (append-only union merge) ---

    pub fn load_assignments(&self) -> Result<Assignments> {
        Ok(self.read_json(ASSIGNMENTS_FILE)?.unwrap_or_default())
    }

    /// Merge issue ids into a release's assignment set and persist the
    /// whole map. Returns the release's new assignment count.
    pub fn assign(&self, release_id: &str, issue_ids: &[String]) -> Result<usize> {
        let mut map = self.load_assignments()?;
        let set = map.entry(release_id.to_string()).or_default();
        for id in issue_ids {
            let id = id.trim();
            if !id.is_empty() {
                set.insert(id.to_string());
            }
        }
        let count = set.len();
        self.write_json(ASSIGNMENTS_FILE, &map)?;
        Ok(count)
    }

    // --- dashboard filter selections ---

    pub fn save_filters(&self, filters: &FilterSelections) -> Result<()> {
        self.write_json(FILTERS_FILE, filters)
    }

    pub fn load_filters(&self) -> Result<FilterSelections> {
        Ok(self.read_json(FILTERS_FILE)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{EventEnv, EventKind, ImpactType};
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(dir.path().join("snapshots"));
        (dir, store)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn rows_round_trip_with_stable_fingerprint() {
        let (_guard, store) = store();
        let rows: Vec<RawRow> = vec![
            [("id".to_string(), "A-1".to_string()), ("title".to_string(), "x".to_string())]
                .into_iter()
                .collect(),
        ];
        let saved = store.save_rows(&rows, now()).unwrap();
        let loaded = store.load_rows().unwrap().unwrap();
        assert_eq!(loaded, saved);

        // identical rows → identical fingerprint
        let again = store.save_rows(&rows, now()).unwrap();
        assert_eq!(again.fingerprint, saved.fingerprint);
    }

    #[test]
    fn missing_snapshots_read_as_empty_not_errors() {
        let (_guard, store) = store();
        assert!(store.load_rows().unwrap().is_none());
        assert!(store.load_events().unwrap().is_empty());
        assert!(store.load_assignments().unwrap().is_empty());
        assert_eq!(store.load_filters().unwrap(), FilterSelections::default());
    }

    #[test]
    fn events_round_trip_through_rfc3339() {
        let (_guard, store) = store();
        let ev = Event {
            id: "evt-1".into(),
            title: "Deploy".into(),
            kind: EventKind::Deployment,
            env: EventEnv::Prod,
            status: "planned".into(),
            owner: "ops".into(),
            description: String::new(),
            modules: "Reporting".into(),
            impact_type: ImpactType::CustomerVisible,
            issue_id: Some("A-1".into()),
            start: now(),
            end: Some(now() + chrono::Duration::hours(1)),
            all_day: false,
            risk_score: 7.2,
        };
        store.save_events(std::slice::from_ref(&ev)).unwrap();
        assert_eq!(store.load_events().unwrap(), vec![ev]);
    }

    #[test]
    fn assignment_merge_is_a_union() {
        let (_guard, store) = store();
        store.assign("rel-1", &["a".into(), "b".into()]).unwrap();
        let count = store.assign("rel-1", &["b".into(), "c".into(), " ".into()]).unwrap();
        assert_eq!(count, 3);
        let map = store.load_assignments().unwrap();
        let got: Vec<&str> = map["rel-1"].iter().map(String::as_str).collect();
        assert_eq!(got, vec!["a", "b", "c"]);
    }
}
