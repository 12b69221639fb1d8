use crate::error::{ProcessingError, Result};
use crate::models::RawStationRecord;
use crate::utils::constants::FEED_RESULTS_KEY;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Somewhere a raw station batch can be fetched from
pub trait FeedSource {
    fn fetch(&self) -> Result<Vec<RawStationRecord>>;

    fn describe(&self) -> String;
}

/// Reads a JSON snapshot: a top-level array of station objects, or an
/// object holding that array under `results`
pub struct JsonFeedReader {
    path: PathBuf,
}

impl JsonFeedReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse feed text into raw records; non-object entries are skipped
    pub fn parse_feed(content: &str) -> Result<Vec<RawStationRecord>> {
        let document: Value = serde_json::from_str(content)?;

        let entries = match document {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove(FEED_RESULTS_KEY) {
                Some(Value::Array(entries)) => entries,
                _ => {
                    return Err(ProcessingError::Feed(format!(
                        "expected an array of stations or a '{}' array",
                        FEED_RESULTS_KEY
                    )))
                }
            },
            _ => {
                return Err(ProcessingError::Feed(
                    "expected an array of station records".to_string(),
                ))
            }
        };

        let total = entries.len();
        let records: Vec<RawStationRecord> = entries
            .into_iter()
            .filter_map(RawStationRecord::from_value)
            .collect();

        if records.len() < total {
            warn!(
                "Skipped {} feed entries that are not station objects",
                total - records.len()
            );
        }

        if records.is_empty() {
            return Err(ProcessingError::Feed(
                "the feed contains no station records".to_string(),
            ));
        }

        Ok(records)
    }
}

impl FeedSource for JsonFeedReader {
    fn fetch(&self) -> Result<Vec<RawStationRecord>> {
        let content = fs::read_to_string(&self.path)?;
        let records = Self::parse_feed(&content)?;
        debug!("Read {} raw stations from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A feed already held in memory
pub struct InMemoryFeed {
    records: Vec<RawStationRecord>,
}

impl InMemoryFeed {
    pub fn new(records: Vec<RawStationRecord>) -> Self {
        Self { records }
    }
}

impl FeedSource for InMemoryFeed {
    fn fetch(&self) -> Result<Vec<RawStationRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory feed ({} records)", self.records.len())
    }
}

/// Holds one fetched batch until it is explicitly refreshed
pub struct FeedCache<S> {
    source: S,
    cached: Option<Vec<RawStationRecord>>,
    fetches: usize,
}

impl<S: FeedSource> FeedCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: None,
            fetches: 0,
        }
    }

    /// The cached batch, fetched on first use. Failed fetches are not cached.
    pub fn get(&mut self) -> Result<&[RawStationRecord]> {
        if self.cached.is_none() {
            let records = self.source.fetch()?;
            self.fetches += 1;
            debug!("Feed cache filled from {}", self.source.describe());
            self.cached = Some(records);
        }
        Ok(self.cached.as_deref().unwrap_or_default())
    }

    /// Invalidate, so the next `get` reads the source again
    pub fn refresh(&mut self) {
        self.cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_array_feed() -> Result<()> {
        let records = JsonFeedReader::parse_feed(r#"[{"name": "A"}, 42, {"name": "B"}]"#)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("name"), Some(&Value::from("B")));
        Ok(())
    }

    #[test]
    fn test_parse_results_feed() -> Result<()> {
        let records =
            JsonFeedReader::parse_feed(r#"{"total_count": 1, "results": [{"name": "A"}]}"#)?;
        assert_eq!(records.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unusable_feeds() {
        assert!(JsonFeedReader::parse_feed("[]").is_err());
        assert!(JsonFeedReader::parse_feed("[1, 2]").is_err());
        assert!(JsonFeedReader::parse_feed("{\"stations\": []}").is_err());
        assert!(JsonFeedReader::parse_feed("not json").is_err());
        assert!(JsonFeedReader::parse_feed("\"text\"").is_err());
    }

    #[test]
    fn test_read_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"[{{"name": "Bastille", "capacity": 40}}]"#)?;

        let records = JsonFeedReader::new(file.path()).fetch()?;
        assert_eq!(records.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let reader = JsonFeedReader::new(Path::new("data/does-not-exist.json"));
        assert!(matches!(reader.fetch(), Err(ProcessingError::Io(_))));
    }

    struct CountingFeed {
        calls: Cell<usize>,
    }

    impl FeedSource for CountingFeed {
        fn fetch(&self) -> Result<Vec<RawStationRecord>> {
            self.calls.set(self.calls.get() + 1);
            JsonFeedReader::parse_feed(r#"[{"name": "A"}]"#)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn test_cache_until_refresh() -> Result<()> {
        let mut cache = FeedCache::new(CountingFeed {
            calls: Cell::new(0),
        });
        assert!(!cache.is_cached());

        assert_eq!(cache.get()?.len(), 1);
        assert_eq!(cache.get()?.len(), 1);
        assert_eq!(cache.source().calls.get(), 1);

        cache.refresh();
        assert!(!cache.is_cached());
        cache.get()?;
        assert_eq!(cache.source().calls.get(), 2);
        assert_eq!(cache.fetches(), 2);

        Ok(())
    }
}
