//! Pronunciation dictionary storage and loading.
//!
//! [`DictionaryStore`] is a word-to-pronunciation table shared by the
//! English CMU lexicon and the per-language exception dictionaries. Loading
//! is bounded: if the file cannot be read and parsed within the configured
//! timeout, the store falls back to a built-in seed so initialization never
//! hangs.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::error::{PhonemizerError, Result};
use crate::locator::DataLocator;
use crate::options::BackendOptions;

/// On-disk format of a dictionary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryFormat {
    /// CMU pronouncing dictionary: `WORD  PH1 PH2 ...`, `;;;` comments,
    /// `WORD(2)` alternate pronunciations. Keys are upper-cased; the first
    /// pronunciation of a word wins.
    CmuSpaced,
    /// One entry per line: `word<TAB>ph1 ph2 ...`, `#` comments. Keys are
    /// lower-cased.
    TabSeparated,
}

/// Where the loaded entries came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    File(PathBuf),
    Builtin,
}

/// An immutable word-to-phonemes table.
///
/// Built once during backend initialization and only read afterwards.
#[derive(Debug)]
pub struct DictionaryStore {
    entries: HashMap<String, Vec<String>>,
    format: DictionaryFormat,
    source: DictionarySource,
}

impl DictionaryStore {
    /// Parse dictionary text that is already in memory.
    pub fn parse(content: &str, format: DictionaryFormat) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            parse_line(line, format, &mut entries);
        }
        Self {
            entries,
            format,
            source: DictionarySource::Builtin,
        }
    }

    /// Build a store from built-in `(word, "ph1 ph2 ...")` seed entries.
    pub fn builtin(seed: &[(&str, &str)], format: DictionaryFormat) -> Self {
        let mut entries = HashMap::with_capacity(seed.len());
        for (word, phonemes) in seed {
            entries.insert(
                normalize_key(word, format),
                phonemes.split_whitespace().map(str::to_string).collect(),
            );
        }
        Self {
            entries,
            format,
            source: DictionarySource::Builtin,
        }
    }

    /// Load a dictionary, trying each candidate file name in order.
    ///
    /// Candidates are probed under `options.data_path` first, then through
    /// the locator's roots. A read-and-parse that exceeds
    /// `options.load_timeout`, or a file that exists at no candidate
    /// location, degrades to the built-in seed with a warning. Only
    /// cancellation is surfaced as an error.
    pub async fn load(
        names: &[&str],
        format: DictionaryFormat,
        locator: &dyn DataLocator,
        options: &BackendOptions,
        seed: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<Self> {
        if cancel.is_cancelled() {
            return Err(PhonemizerError::Cancelled);
        }

        let path = match resolve_candidate(names, locator, options) {
            Some(path) => path,
            None => {
                log::warn!(
                    "no dictionary found for {names:?}, using built-in entries ({} words)",
                    seed.len()
                );
                return Ok(Self::builtin(seed, format));
            }
        };

        let load = async {
            let content = tokio::fs::read_to_string(&path).await?;
            Ok::<_, PhonemizerError>(Self::parse(&content, format))
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(PhonemizerError::Cancelled),
            loaded = tokio::time::timeout(options.load_timeout, load) => match loaded {
                Ok(Ok(mut store)) => {
                    log::info!("loaded {} dictionary entries from {path:?}", store.entries.len());
                    store.source = DictionarySource::File(path);
                    Ok(store)
                }
                Ok(Err(e)) => {
                    log::warn!("failed to read dictionary {path:?}: {e}, using built-in entries");
                    Ok(Self::builtin(seed, format))
                }
                Err(_) => {
                    log::warn!(
                        "dictionary load from {path:?} timed out after {:?}, using built-in entries",
                        options.load_timeout
                    );
                    Ok(Self::builtin(seed, format))
                }
            },
        }
    }

    /// Look up a word. The key is case-folded per the dictionary format.
    pub fn lookup(&self, word: &str) -> Option<&[String]> {
        let key = normalize_key(word, self.format);
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> &DictionarySource {
        &self.source
    }

    /// Rough resident-memory estimate in bytes.
    pub fn memory_usage(&self) -> u64 {
        self.entries
            .iter()
            .map(|(k, v)| {
                let phoneme_bytes: usize = v.iter().map(|p| p.len() + 24).sum();
                (k.len() + 48 + phoneme_bytes) as u64
            })
            .sum()
    }
}

fn normalize_key(word: &str, format: DictionaryFormat) -> String {
    match format {
        DictionaryFormat::CmuSpaced => word.to_uppercase(),
        DictionaryFormat::TabSeparated => word.to_lowercase(),
    }
}

fn resolve_candidate(
    names: &[&str],
    locator: &dyn DataLocator,
    options: &BackendOptions,
) -> Option<PathBuf> {
    if let Some(root) = &options.data_path {
        for name in names {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    names.iter().find_map(|name| locator.resolve(name))
}

fn parse_line(line: &str, format: DictionaryFormat, entries: &mut HashMap<String, Vec<String>>) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match format {
        DictionaryFormat::CmuSpaced => {
            if line.starts_with(";;;") {
                return;
            }
            let mut parts = line.split_whitespace();
            let Some(raw_word) = parts.next() else { return };
            // "WORD(2)" marks an alternate pronunciation; the first one wins.
            let word = match raw_word.find('(') {
                Some(idx) if raw_word.ends_with(')') => &raw_word[..idx],
                _ => raw_word,
            };
            if word.is_empty() {
                return;
            }
            let phonemes: Vec<String> = parts.map(str::to_string).collect();
            if phonemes.is_empty() {
                return;
            }
            entries
                .entry(word.to_uppercase())
                .or_insert(phonemes);
        }
        DictionaryFormat::TabSeparated => {
            if line.starts_with('#') {
                return;
            }
            let Some((word, rest)) = line.split_once('\t') else {
                return;
            };
            let word = word.trim();
            let phonemes: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            if word.is_empty() || phonemes.is_empty() {
                return;
            }
            entries.insert(word.to_lowercase(), phonemes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::FileSystemLocator;
    use std::io::Write;
    use std::time::Duration;

    const SEED: &[(&str, &str)] = &[("HELLO", "HH AH0 L OW1"), ("WORLD", "W ER1 L D")];

    #[test]
    fn parses_cmu_format_with_comments_and_variants() {
        let content = "\
;;; CMUdict comment line
HELLO  HH AH0 L OW1
HELLO(2)  HH EH0 L OW1
READ  R IY1 D
READ(2)  R EH1 D
";
        let dict = DictionaryStore::parse(content, DictionaryFormat::CmuSpaced);
        assert_eq!(dict.len(), 2);
        assert_eq!(
            dict.lookup("hello").unwrap(),
            &["HH", "AH0", "L", "OW1"],
            "first pronunciation wins and lookup is case-insensitive"
        );
        assert_eq!(dict.lookup("READ").unwrap(), &["R", "IY1", "D"]);
    }

    #[test]
    fn parses_tab_separated_exception_dictionary() {
        let content = "# exceptions\nhola\to l a\nqué\tk e\n";
        let dict = DictionaryStore::parse(content, DictionaryFormat::TabSeparated);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.lookup("Hola").unwrap(), &["o", "l", "a"]);
        assert!(dict.lookup("adios").is_none());
    }

    #[test]
    fn skips_malformed_lines() {
        let content = "WORD\n\n;;; note\nOK  OW1 K EY1\n";
        let dict = DictionaryStore::parse(content, DictionaryFormat::CmuSpaced);
        assert_eq!(dict.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_builtin_seed() {
        let dir = tempfile::tempdir().unwrap();
        let locator = FileSystemLocator::from_roots(vec![dir.path().to_path_buf()]);
        let dict = DictionaryStore::load(
            &["missing.dict"],
            DictionaryFormat::CmuSpaced,
            &locator,
            &BackendOptions::default(),
            SEED,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(dict.source(), &DictionarySource::Builtin);
        assert_eq!(dict.lookup("HELLO").unwrap(), &["HH", "AH0", "L", "OW1"]);
    }

    #[tokio::test]
    async fn loads_from_explicit_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.dict");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "UNITY  Y UW1 N AH0 T IY0").unwrap();

        let options = BackendOptions {
            data_path: Some(dir.path().to_path_buf()),
            load_timeout: Duration::from_secs(5),
            dialect: None,
        };
        let locator = FileSystemLocator::from_roots(Vec::new());
        let dict = DictionaryStore::load(
            &["test.dict"],
            DictionaryFormat::CmuSpaced,
            &locator,
            &options,
            SEED,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(dict.source(), &DictionarySource::File(path));
        assert!(dict.contains("unity"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_load_timeout_falls_back_to_builtin_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.dict");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "RUST  R AH1 S T").unwrap();

        // A zero deadline expires before the file read completes.
        let options = BackendOptions {
            data_path: Some(dir.path().to_path_buf()),
            load_timeout: Duration::ZERO,
            dialect: None,
        };
        let locator = FileSystemLocator::from_roots(Vec::new());
        let dict = DictionaryStore::load(
            &["slow.dict"],
            DictionaryFormat::CmuSpaced,
            &locator,
            &options,
            SEED,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(dict.source(), &DictionarySource::Builtin);
        assert_eq!(dict.lookup("HELLO").unwrap(), &["HH", "AH0", "L", "OW1"]);
        assert!(!dict.contains("RUST"));
    }

    #[tokio::test]
    async fn cancellation_surfaces_as_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let locator = FileSystemLocator::from_roots(Vec::new());
        let err = DictionaryStore::load(
            &["any.dict"],
            DictionaryFormat::CmuSpaced,
            &locator,
            &BackendOptions::default(),
            SEED,
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PhonemizerError::Cancelled));
    }

    #[test]
    fn memory_usage_is_nonzero_for_loaded_entries() {
        let dict = DictionaryStore::builtin(SEED, DictionaryFormat::CmuSpaced);
        assert!(dict.memory_usage() > 0);
    }
}
