use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::tempdir;

use super::{
    FileStore, InteractionLog, KeyValueStore, MAX_STORED_INTERACTIONS, METRICS_KEY, MemoryStore,
    MetricStore, SESSION_ID_KEY, SessionBook, SessionRegistry, SqliteStore, StoreBackend,
    USER_TOKEN_KEY, open_store,
};
use crate::metrics::{MetricRecord, PerformanceMetrics, ReportMetrics, SystemContext, UserContext};

fn at(secs: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| format!("invalid timestamp {}", secs))
}

fn record(report_name: &str, secs: i64) -> Result<MetricRecord, String> {
    Ok(MetricRecord {
        timestamp: at(secs)?,
        session_id: "abc".to_owned(),
        report_name: report_name.to_owned(),
        performance: PerformanceMetrics {
            page_load_time: 100.0,
            render_time: 50.0,
            ..PerformanceMetrics::default()
        },
        system: SystemContext::default(),
        powerbi: ReportMetrics::default(),
        user: UserContext::default(),
        errors: None,
        error: None,
    })
}

fn memory_kv() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

#[test]
fn memory_store_get_set_remove() -> Result<(), String> {
    let kv = MemoryStore::new();
    if kv.get("missing").map_err(|err| err.to_string())?.is_some() {
        return Err("Expected missing key to read as None".to_owned());
    }
    kv.set("key", "value").map_err(|err| err.to_string())?;
    if kv.get("key").map_err(|err| err.to_string())?.as_deref() != Some("value") {
        return Err("Expected stored value".to_owned());
    }
    kv.remove("key").map_err(|err| err.to_string())?;
    kv.remove("key").map_err(|err| err.to_string())?;
    if kv.get("key").map_err(|err| err.to_string())?.is_some() {
        return Err("Expected value to be removed".to_owned());
    }
    Ok(())
}

#[test]
fn metric_store_evicts_oldest_first() -> Result<(), String> {
    let store = MetricStore::with_capacity(memory_kv(), 3);
    for index in 0..5 {
        store
            .append(&record(&format!("report-{}", index), index)?)
            .map_err(|err| err.to_string())?;
    }

    let names: Vec<String> = store
        .read_all()
        .map_err(|err| err.to_string())?
        .into_iter()
        .map(|record| record.report_name)
        .collect();
    if names != ["report-2", "report-3", "report-4"] {
        return Err(format!("Unexpected retained records: {:?}", names));
    }
    Ok(())
}

#[test]
fn metric_store_zero_capacity_keeps_latest() -> Result<(), String> {
    let store = MetricStore::with_capacity(memory_kv(), 0);
    if store.capacity() != 1 {
        return Err(format!("Unexpected capacity: {}", store.capacity()));
    }
    store
        .append(&record("first", 1)?)
        .map_err(|err| err.to_string())?;
    store
        .append(&record("second", 2)?)
        .map_err(|err| err.to_string())?;
    let records = store.read_all().map_err(|err| err.to_string())?;
    match records.as_slice() {
        [only] if only.report_name == "second" => Ok(()),
        other => Err(format!("Unexpected records: {:?}", other)),
    }
}

#[test]
fn metric_store_reads_corrupt_content_as_empty() -> Result<(), String> {
    let kv = memory_kv();
    kv.set(METRICS_KEY, "{not json").map_err(|err| err.to_string())?;
    let store = MetricStore::new(Arc::clone(&kv));

    if !store.is_empty().map_err(|err| err.to_string())? {
        return Err("Expected corrupt store to read as empty".to_owned());
    }
    store
        .append(&record("fresh", 10)?)
        .map_err(|err| err.to_string())?;
    if store.len().map_err(|err| err.to_string())? != 1 {
        return Err("Expected append to replace corrupt content".to_owned());
    }
    Ok(())
}

#[test]
fn metric_store_clear_drops_records() -> Result<(), String> {
    let store = MetricStore::new(memory_kv());
    store
        .append(&record("report", 1)?)
        .map_err(|err| err.to_string())?;
    store.clear().map_err(|err| err.to_string())?;
    if !store.is_empty().map_err(|err| err.to_string())? {
        return Err("Expected empty store after clear".to_owned());
    }
    Ok(())
}

#[test]
fn file_store_persists_across_reopen() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    {
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open(dir.path()).map_err(|err| err.to_string())?);
        let store = MetricStore::new(kv);
        store
            .append(&record("persisted", 5)?)
            .map_err(|err| err.to_string())?;
    }

    let reopened = FileStore::open(dir.path()).map_err(|err| err.to_string())?;
    if reopened.root() != dir.path() {
        return Err("Unexpected store root".to_owned());
    }
    if !dir.path().join(format!("{}.json", METRICS_KEY)).exists() {
        return Err("Expected one file per key".to_owned());
    }
    let store = MetricStore::new(Arc::new(reopened));
    let records = store.read_all().map_err(|err| err.to_string())?;
    match records.first() {
        Some(first) if first.report_name == "persisted" => Ok(()),
        other => Err(format!("Unexpected records after reopen: {:?}", other)),
    }
}

#[test]
fn file_store_overwrite_leaves_no_temp_files() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let kv = FileStore::open(dir.path()).map_err(|err| err.to_string())?;
    kv.set("key", "one").map_err(|err| err.to_string())?;
    kv.set("key", "two").map_err(|err| err.to_string())?;

    let on_disk = std::fs::read_to_string(dir.path().join("key.json"))
        .map_err(|err| format!("read failed: {}", err))?;
    if on_disk != "two" {
        return Err(format!("Unexpected file content: {}", on_disk));
    }
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .map_err(|err| format!("read_dir failed: {}", err))?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    if names != ["key.json"] {
        return Err(format!("Unexpected directory entries: {:?}", names));
    }
    Ok(())
}

#[test]
fn file_store_rejects_path_like_keys() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let kv = FileStore::open(dir.path()).map_err(|err| err.to_string())?;
    match kv.set("../escape", "value") {
        Err(crate::error::StoreError::InvalidKey { .. }) => Ok(()),
        other => Err(format!("Expected InvalidKey, got {:?}", other)),
    }
}

#[test]
fn file_store_remove_missing_key_is_ok() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let kv = FileStore::open(dir.path()).map_err(|err| err.to_string())?;
    kv.remove("never_written").map_err(|err| err.to_string())
}

#[test]
fn sqlite_store_upserts_values() -> Result<(), String> {
    let kv = SqliteStore::open_in_memory().map_err(|err| err.to_string())?;
    kv.set("key", "one").map_err(|err| err.to_string())?;
    kv.set("key", "two").map_err(|err| err.to_string())?;
    if kv.get("key").map_err(|err| err.to_string())?.as_deref() != Some("two") {
        return Err("Expected upserted value".to_owned());
    }
    kv.remove("key").map_err(|err| err.to_string())?;
    if kv.get("key").map_err(|err| err.to_string())?.is_some() {
        return Err("Expected value to be removed".to_owned());
    }
    Ok(())
}

#[test]
fn open_store_sqlite_backend_persists() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let root = dir.path().join("nested");
    {
        let kv = open_store(StoreBackend::Sqlite, &root).map_err(|err| err.to_string())?;
        MetricStore::new(kv)
            .append(&record("sqlite", 1)?)
            .map_err(|err| err.to_string())?;
    }
    let kv = open_store(StoreBackend::Sqlite, &root).map_err(|err| err.to_string())?;
    let len = MetricStore::new(kv).len().map_err(|err| err.to_string())?;
    if len != 1 {
        return Err(format!("Unexpected record count: {}", len));
    }
    Ok(())
}

#[test]
fn registry_sweeps_stale_sessions_on_write() -> Result<(), String> {
    let registry = SessionRegistry::with_ttl(memory_kv(), Duration::from_secs(60));
    registry
        .refresh("old", at(1_000)?)
        .map_err(|err| err.to_string())?;
    registry
        .refresh("recent", at(1_030)?)
        .map_err(|err| err.to_string())?;

    let count = registry
        .refresh("new", at(1_061)?)
        .map_err(|err| err.to_string())?;
    if count != 2 {
        return Err(format!("Expected stale session to be swept, got {}", count));
    }
    let ids: Vec<String> = registry
        .sessions()
        .map_err(|err| err.to_string())?
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    if ids != ["new", "recent"] {
        return Err(format!("Unexpected sessions: {:?}", ids));
    }
    Ok(())
}

#[test]
fn registry_keeps_session_seen_exactly_at_ttl() -> Result<(), String> {
    let registry = SessionRegistry::with_ttl(memory_kv(), Duration::from_secs(60));
    registry
        .refresh("edge", at(0)?)
        .map_err(|err| err.to_string())?;
    let count = registry
        .refresh("other", at(60)?)
        .map_err(|err| err.to_string())?;
    if count != 2 {
        return Err(format!("Expected boundary session to survive, got {}", count));
    }
    Ok(())
}

#[test]
fn registry_refresh_updates_last_seen() -> Result<(), String> {
    let registry = SessionRegistry::with_ttl(memory_kv(), Duration::from_secs(60));
    registry.refresh("a", at(0)?).map_err(|err| err.to_string())?;
    registry.refresh("a", at(50)?).map_err(|err| err.to_string())?;
    let count = registry.refresh("b", at(100)?).map_err(|err| err.to_string())?;
    if count != 2 {
        return Err(format!("Expected refreshed session to survive, got {}", count));
    }
    Ok(())
}

#[test]
fn registry_end_removes_session() -> Result<(), String> {
    let registry = SessionRegistry::new(memory_kv());
    registry.refresh("a", at(0)?).map_err(|err| err.to_string())?;
    if !registry.end("a").map_err(|err| err.to_string())? {
        return Err("Expected session to be removed".to_owned());
    }
    if registry.end("a").map_err(|err| err.to_string())? {
        return Err("Expected second end to report nothing removed".to_owned());
    }
    if registry.active_count().map_err(|err| err.to_string())? != 0 {
        return Err("Expected no active sessions".to_owned());
    }
    Ok(())
}

#[test]
fn session_book_id_is_stable_until_ended() -> Result<(), String> {
    let kv = memory_kv();
    let book = SessionBook::new(Arc::clone(&kv));
    let first = book.session_id().map_err(|err| err.to_string())?;
    if first.len() != 11 || !first.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(format!("Unexpected session id shape: {}", first));
    }
    let second = book.session_id().map_err(|err| err.to_string())?;
    if first != second {
        return Err("Expected session id to persist".to_owned());
    }
    if kv.get(SESSION_ID_KEY).map_err(|err| err.to_string())?.as_deref() != Some(first.as_str()) {
        return Err("Expected session id under its key".to_owned());
    }

    book.end().map_err(|err| err.to_string())?;
    if book
        .current_session_id()
        .map_err(|err| err.to_string())?
        .is_some()
    {
        return Err("Expected session id to be cleared".to_owned());
    }
    Ok(())
}

#[test]
fn session_book_duration_starts_at_zero() -> Result<(), String> {
    let book = SessionBook::new(memory_kv());
    let first = book
        .session_duration_ms(at(100)?)
        .map_err(|err| err.to_string())?;
    if first != 0 {
        return Err(format!("Expected zero on first call, got {}", first));
    }
    let later = book
        .session_duration_ms(at(103)?)
        .map_err(|err| err.to_string())?;
    if later != 3_000 {
        return Err(format!("Unexpected duration: {}", later));
    }
    Ok(())
}

#[test]
fn session_book_reports_authentication_from_token() -> Result<(), String> {
    let kv = memory_kv();
    let book = SessionBook::new(Arc::clone(&kv));
    if book.is_authenticated().map_err(|err| err.to_string())? {
        return Err("Expected anonymous without token".to_owned());
    }
    kv.set(USER_TOKEN_KEY, "token").map_err(|err| err.to_string())?;
    if !book.is_authenticated().map_err(|err| err.to_string())? {
        return Err("Expected authenticated with token".to_owned());
    }
    Ok(())
}

#[test]
fn interaction_log_appends_in_order() -> Result<(), String> {
    let log = InteractionLog::new(memory_kv());
    log.record("click", Some("chart-1"), at(1)?)
        .map_err(|err| err.to_string())?;
    log.record("filter", None, at(2)?)
        .map_err(|err| err.to_string())?;

    let interactions = log.read_all().map_err(|err| err.to_string())?;
    let kinds: Vec<&str> = interactions
        .iter()
        .map(|interaction| interaction.kind.as_str())
        .collect();
    if kinds != ["click", "filter"] {
        return Err(format!("Unexpected interactions: {:?}", kinds));
    }
    log.clear().map_err(|err| err.to_string())?;
    if !log.read_all().map_err(|err| err.to_string())?.is_empty() {
        return Err("Expected cleared interactions".to_owned());
    }
    Ok(())
}

#[test]
fn interaction_log_keeps_most_recent_entries() -> Result<(), String> {
    let log = InteractionLog::new(memory_kv());
    let total = MAX_STORED_INTERACTIONS + 5;
    for secs in 0..total {
        let secs = i64::try_from(secs).map_err(|err| err.to_string())?;
        log.record("click", Some(format!("v{}", secs).as_str()), at(secs)?)
            .map_err(|err| err.to_string())?;
    }

    let interactions = log.read_all().map_err(|err| err.to_string())?;
    if interactions.len() != MAX_STORED_INTERACTIONS {
        return Err(format!("Unexpected interaction count: {}", interactions.len()));
    }
    let first = interactions.first().and_then(|interaction| interaction.target.as_deref());
    let last = interactions.last().and_then(|interaction| interaction.target.as_deref());
    if first != Some("v5") || last != Some("v104") {
        return Err(format!("Unexpected retained range: {:?}..{:?}", first, last));
    }
    Ok(())
}
