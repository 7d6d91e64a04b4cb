use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use serde::{Deserialize, Serialize};

/// Published locations of the two dataset tables.
pub const DEFAULT_MATCHES_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRy2DUdUbaKx_Co9F0FSnIlyS-8kp4aKv_I0-qzNeghiZHAI_hw94gKG22XTxNJHMFnFVKsO4xWOdIs/pub?gid=1655759976&single=true&output=csv";
pub const DEFAULT_DELIVERIES_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRu6cb6Pj8C9elJc5ubswjVTObommsITlNsFy5X0EiBY7S-lsHEUqx3g_M16r50Ytjc0XQCdGDyzE_Y/pub?output=csv";

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "cricstat";
const CACHE_FILE: &str = "source_cache.json";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_AGE_SECS: u64 = 24 * 60 * 60;

static CLIENT: OnceCell<Client> = OnceCell::new();
static CACHE: Mutex<Option<SourceCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SourceCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

fn client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Downloads a source table, or serves it from the on-disk cache.
///
/// Entries younger than the max age (`CRICSTAT_FETCH_TTL_SECS`, a day by
/// default) skip the network entirely. Older entries revalidate with a
/// conditional GET; a 304 or a failed request falls back to the cached
/// body, so the tool keeps working offline once it has fetched the data
/// at least once.
pub fn fetch_csv_cached(url: &str) -> Result<String> {
    let max_age = std::env::var("CRICSTAT_FETCH_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_AGE_SECS);

    let cached_entry = {
        let mut guard = CACHE.lock().expect("source cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        cache.entries.get(url).cloned()
    };
    if let Some(entry) = cached_entry.as_ref() {
        if entry_age_secs(entry) < max_age {
            return Ok(entry.body.clone());
        }
    }

    let mut req = client()?.get(url).header(USER_AGENT, "cricstat/0.1");
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = match req.send() {
        Ok(resp) => resp,
        Err(err) => {
            if let Some(entry) = cached_entry {
                return Ok(entry.body);
            }
            return Err(err).context("request failed");
        }
    };
    let status = resp.status();
    let headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached_entry {
            refresh_cache_entry(url, entry.clone());
            return Ok(entry.body);
        }
        return Err(anyhow::anyhow!("received 304 without cache body"));
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, snippet(&body)));
    }

    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let entry = CacheEntry {
        body: body.clone(),
        etag,
        last_modified,
        fetched_at: now_secs(),
    };
    refresh_cache_entry(url, entry);
    Ok(body)
}

fn entry_age_secs(entry: &CacheEntry) -> u64 {
    now_secs().saturating_sub(entry.fetched_at)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn refresh_cache_entry(key: &str, entry: CacheEntry) {
    let mut guard = CACHE.lock().expect("source cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(key.to_string(), entry);
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> SourceCacheFile {
    let Some(path) = cache_path() else {
        return SourceCacheFile::default();
    };
    let Some(raw) = fs::read_to_string(path).ok() else {
        return SourceCacheFile::default();
    };
    let cache = serde_json::from_str::<SourceCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return SourceCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &SourceCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize source cache")?;
    fs::write(&tmp, json).context("write source cache")?;
    fs::rename(&tmp, &path).context("swap source cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}

fn snippet(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}
