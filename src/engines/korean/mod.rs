//! Korean phonemizer backend.
//!
//! Pipeline: normalize text, split into Hangul runs and other tokens, then
//! convert each run through the exception dictionary or the jamo G2P rules.

pub mod g2p;
pub mod hangul;
pub mod normalizer;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::dictionary::{DictionaryFormat, DictionaryStore};
use crate::engines::EngineState;
use crate::error::{PhonemizerError, Result};
use crate::locator::FileSystemLocator;
use crate::options::{BackendCapabilities, BackendOptions, PhonemeOptions};
use crate::{PhonemeResult, PhonemizerBackend};

/// Words whose pronunciation the rules get wrong, pronounced from a
/// tab-separated exception file instead.
const EXCEPTION_FILES: &[&str] = &["ko/exceptions.tsv", "ko_exceptions.tsv"];

struct Loaded {
    exceptions: DictionaryStore,
}

/// Rule-based Korean G2P backend.
pub struct KoreanPhonemizer {
    state: RwLock<EngineState<Loaded>>,
    locator: FileSystemLocator,
}

impl KoreanPhonemizer {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EngineState::Empty),
            locator: FileSystemLocator::new(),
        }
    }

    fn read_state(&self) -> Result<Arc<Loaded>> {
        self.state
            .read()
            .map_err(|_| PhonemizerError::NotInitialized)?
            .snapshot()
    }
}

impl Default for KoreanPhonemizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhonemizerBackend for KoreanPhonemizer {
    fn name(&self) -> &'static str {
        "korean-rules"
    }

    fn supported_languages(&self) -> &[&'static str] {
        &["ko-KR"]
    }

    async fn initialize(
        &self,
        options: &BackendOptions,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if self
            .state
            .read()
            .map_err(|_| PhonemizerError::NotInitialized)?
            .is_ready()
        {
            return Ok(true);
        }

        let locator = match &options.data_path {
            Some(root) => FileSystemLocator::with_root(root.clone()),
            None => self.locator.clone(),
        };
        let exceptions = DictionaryStore::load(
            EXCEPTION_FILES,
            DictionaryFormat::TabSeparated,
            &locator,
            options,
            &[],
            cancel,
        )
        .await?;

        let mut state = self
            .state
            .write()
            .map_err(|_| PhonemizerError::NotInitialized)?;
        *state = EngineState::Ready(Arc::new(Loaded { exceptions }));
        log::info!("korean backend initialized");
        Ok(true)
    }

    async fn phonemize(
        &self,
        text: &str,
        language: &str,
        options: Option<&PhonemeOptions>,
        cancel: &CancellationToken,
    ) -> Result<PhonemeResult> {
        let loaded = self.read_state()?;
        if cancel.is_cancelled() {
            return Err(PhonemizerError::Cancelled);
        }
        if text.trim().is_empty() {
            return Ok(PhonemeResult::empty(language));
        }

        let default_options = PhonemeOptions::default();
        let options = options.unwrap_or(&default_options);
        let normalized = if options.normalize_text {
            normalizer::normalize(text)
        } else {
            text.to_string()
        };

        let mut result = PhonemeResult::empty(language);
        let chars: Vec<char> = normalized.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if cancel.is_cancelled() {
                return Err(PhonemizerError::Cancelled);
            }
            let ch = chars[i];

            if hangul::is_hangul_syllable(ch) {
                let mut end = i;
                while end < chars.len() && hangul::is_hangul_syllable(chars[end]) {
                    end += 1;
                }
                let run: String = chars[i..end].iter().collect();
                result.word_boundaries.push(result.phonemes.len());
                match loaded.exceptions.lookup(&run) {
                    Some(phonemes) => result.phonemes.extend(phonemes.iter().cloned()),
                    None => result.phonemes.extend(g2p::convert_run(&run, true)),
                }
                i = end;
                continue;
            }

            if ch.is_whitespace() {
                // A whitespace run becomes one boundary token.
                let mut end = i;
                while end < chars.len() && chars[end].is_whitespace() {
                    end += 1;
                }
                result.phonemes.push("_".to_string());
                i = end;
                continue;
            }
            if matches!(ch, '.' | ',' | '!' | '?' | ';' | ':') {
                result.phonemes.push("_".to_string());
            } else if ch.is_alphanumeric() {
                // Stray Latin letters and digits pass through untranslated.
                result.phonemes.push(ch.to_lowercase().to_string());
            }
            i += 1;
        }

        result
            .metadata
            .insert("backend".to_string(), self.name().to_string());
        Ok(result)
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_ipa: true,
            supports_g2p: true,
            supports_batch: true,
            is_thread_safe: true,
            ..BackendCapabilities::default()
        }
    }

    fn memory_usage(&self) -> u64 {
        match self.state.read() {
            Ok(state) => match &*state {
                EngineState::Ready(loaded) => loaded.exceptions.memory_usage() + 1024,
                _ => 0,
            },
            Err(_) => 0,
        }
    }

    fn dispose(&self) {
        if let Ok(mut state) = self.state.write() {
            *state = EngineState::Disposed;
        }
    }
}
