//! Loading job results for the viewer
//!
//! A job is identified by an opaque id and yields the alignment text plus the
//! per-row variant metadata. Where that data comes from is behind
//! `JobSource`; `CachedSource` keeps recent results in a TTL cache.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::analysis::SeqInfoDict;
use crate::config::CacheConfig;
use crate::error::{Result, ViewerError};

/// Alignment text and variant metadata for one job
#[derive(Debug, Clone, PartialEq)]
pub struct JobData {
    pub job_id: String,
    pub alignment_text: String,
    pub seq_info: SeqInfoDict,
}

// Trait for fetching job results from different backends
pub trait JobSource: Send + Sync {
    fn alignment(&self, job: &str) -> Result<String>;

    fn seq_info(&self, job: &str) -> Result<SeqInfoDict>;

    fn load(&self, job: &str) -> Result<JobData> {
        Ok(JobData {
            job_id: job.to_string(),
            alignment_text: self.alignment(job)?,
            seq_info: self.seq_info(job)?,
        })
    }
}

/// Results stored as `<dir>/<job>.aln` and `<dir>/<job>.seqinfo.json`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub const ALIGNMENT_EXT: &'static str = "aln";
    pub const SEQ_INFO_EXT: &'static str = "seqinfo.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn job_path(&self, job: &str, ext: &str) -> Result<PathBuf> {
        let valid = !job.is_empty()
            && job
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !job.starts_with('.');
        if !valid {
            return Err(ViewerError::UnknownJob {
                job: job.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.{}", job, ext)))
    }
}

impl JobSource for DirectorySource {
    fn alignment(&self, job: &str) -> Result<String> {
        let path = self.job_path(job, Self::ALIGNMENT_EXT)?;
        log::debug!("Reading alignment for job {} from {}", job, path.display());
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ViewerError::UnknownJob {
                job: job.to_string(),
            },
            _ => ViewerError::io(&path, e),
        })
    }

    /// A job without a metadata file simply has no variants
    fn seq_info(&self, job: &str) -> Result<SeqInfoDict> {
        let path = self.job_path(job, Self::SEQ_INFO_EXT)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No variant metadata for job {}", job);
                Ok(SeqInfoDict::new())
            }
            Err(e) => Err(ViewerError::io(&path, e)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded key-value cache whose entries expire after a fixed TTL.
///
/// When full, the oldest entry is evicted to make room.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, (V, Instant)>,
    ttl: Duration,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let fresh = match self.entries.get(key) {
            Some((_, stored)) => now.duration_since(*stored) < self.ttl,
            None => {
                self.misses += 1;
                return None;
            }
        };
        if !fresh {
            self.entries.remove(key);
            self.misses += 1;
            return None;
        }
        self.hits += 1;
        self.entries.get(key).map(|(value, _)| value.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: impl Into<String>, value: V, now: Instant) {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            self.purge_expired(now);
            while self.entries.len() >= self.max_entries {
                let Some(oldest) = self
                    .entries
                    .iter()
                    .min_by_key(|(_, (_, stored))| *stored)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, (value, now));
    }

    /// Cached value for `key`, or the result of `fetch`, which is stored on success
    pub fn get_or_fetch<F>(&mut self, key: &str, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = fetch()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (_, stored)| now.duration_since(*stored) < ttl);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Any `JobSource` with its results kept in TTL caches
pub struct CachedSource<S> {
    inner: S,
    alignments: Mutex<TtlCache<String>>,
    seq_infos: Mutex<TtlCache<SeqInfoDict>>,
}

impl<S: JobSource> CachedSource<S> {
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        Self {
            inner,
            alignments: Mutex::new(TtlCache::from_config(config)),
            seq_infos: Mutex::new(TtlCache::from_config(config)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        let a = self.alignments.lock().unwrap_or_else(|e| e.into_inner()).stats();
        let s = self.seq_infos.lock().unwrap_or_else(|e| e.into_inner()).stats();
        CacheStats {
            hits: a.hits + s.hits,
            misses: a.misses + s.misses,
            entries: a.entries + s.entries,
        }
    }
}

impl<S: JobSource> JobSource for CachedSource<S> {
    fn alignment(&self, job: &str) -> Result<String> {
        let mut cache = self.alignments.lock().unwrap_or_else(|e| e.into_inner());
        cache.get_or_fetch(job, || self.inner.alignment(job))
    }

    fn seq_info(&self, job: &str) -> Result<SeqInfoDict> {
        let mut cache = self.seq_infos.lock().unwrap_or_else(|e| e.into_inner());
        cache.get_or_fetch(job, || self.inner.seq_info(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const ALN: &str = "CLUSTAL W (1.83) multiple sequence alignment\n\nseq1 MKLV\nseq2 MK-V\n";

    fn job_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("job-1.aln"), ALN).unwrap();
        std::fs::write(
            dir.path().join("job-1.seqinfo.json"),
            r#"{"seq2": {"embedded_variants": [{"alignment_start_pos": 2, "alignment_end_pos": 3, "variant_id": "rs7"}]}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("job-2.aln"), ALN).unwrap();
        dir
    }

    #[test]
    fn test_directory_source_loads_job() {
        let dir = job_dir();
        let source = DirectorySource::new(dir.path());
        let data = source.load("job-1").unwrap();
        assert_eq!(data.alignment_text, ALN);
        assert_eq!(data.seq_info["seq2"].variants()[0].variant_id, "rs7");
    }

    #[test]
    fn test_missing_seq_info_is_empty() {
        let dir = job_dir();
        let source = DirectorySource::new(dir.path());
        assert!(source.seq_info("job-2").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_and_invalid_jobs() {
        let dir = job_dir();
        let source = DirectorySource::new(dir.path());
        assert!(matches!(
            source.alignment("job-9"),
            Err(ViewerError::UnknownJob { .. })
        ));
        assert!(matches!(
            source.alignment("../job-1"),
            Err(ViewerError::UnknownJob { .. })
        ));
    }

    #[test]
    fn test_cache_expires_entries() {
        let t0 = Instant::now();
        let mut cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(300), 10);
        cache.insert_at("a", 1, t0);
        assert_eq!(cache.get_at("a", t0 + Duration::from_secs(299)), Some(1));
        assert_eq!(cache.get_at("a", t0 + Duration::from_secs(300)), None);
        assert_eq!(cache.get_at("b", t0), None);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 2,
                entries: 0
            }
        );
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let t0 = Instant::now();
        let mut cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(300), 2);
        cache.insert_at("a", 1, t0);
        cache.insert_at("b", 2, t0 + Duration::from_secs(1));
        cache.insert_at("c", 3, t0 + Duration::from_secs(2));
        let now = t0 + Duration::from_secs(3);
        assert_eq!(cache.get_at("a", now), None);
        assert_eq!(cache.get_at("b", now), Some(2));
        assert_eq!(cache.get_at("c", now), Some(3));
    }

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl JobSource for CountingSource {
        fn alignment(&self, job: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if job == "missing" {
                return Err(ViewerError::UnknownJob {
                    job: job.to_string(),
                });
            }
            Ok(ALN.to_string())
        }

        fn seq_info(&self, _job: &str) -> Result<SeqInfoDict> {
            Ok(SeqInfoDict::new())
        }
    }

    #[test]
    fn test_cached_source_fetches_once() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            &CacheConfig::default(),
        );
        source.load("job").unwrap();
        source.load("job").unwrap();
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);

        assert!(source.alignment("missing").is_err());
        assert!(source.alignment("missing").is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
        let stats = source.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.entries, 2);
    }
}
