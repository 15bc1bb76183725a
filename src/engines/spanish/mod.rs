//! Spanish phonemizer backend.

pub mod g2p;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::dictionary::{DictionaryFormat, DictionaryStore};
use crate::engines::EngineState;
use crate::error::{PhonemizerError, Result};
use crate::locator::FileSystemLocator;
use crate::options::{BackendCapabilities, BackendOptions, PhonemeOptions};
use crate::{PhonemeResult, PhonemizerBackend};

use g2p::SpanishDialect;

const EXCEPTION_FILES: &[&str] = &["es/exceptions.tsv", "es_exceptions.tsv"];

struct Loaded {
    exceptions: DictionaryStore,
    /// Dialect forced at initialization; otherwise derived per call from
    /// the language tag.
    dialect_override: Option<SpanishDialect>,
}

/// Rule-based Spanish G2P backend with dialect variants.
pub struct SpanishPhonemizer {
    state: RwLock<EngineState<Loaded>>,
    locator: FileSystemLocator,
}

impl SpanishPhonemizer {
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

impl Default for SpanishPhonemizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphabetic() || ch == '\'' || ch == '-'
}

#[async_trait]
impl PhonemizerBackend for SpanishPhonemizer {
    fn name(&self) -> &'static str {
        "spanish-rules"
    }

    fn supported_languages(&self) -> &[&'static str] {
        &["es-ES", "es-MX", "es-AR"]
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
        let dialect_override = options
            .dialect
            .as_deref()
            .map(SpanishDialect::from_tag);

        let mut state = self
            .state
            .write()
            .map_err(|_| PhonemizerError::NotInitialized)?;
        *state = EngineState::Ready(Arc::new(Loaded {
            exceptions,
            dialect_override,
        }));
        log::info!("spanish backend initialized");
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
        let dialect = loaded
            .dialect_override
            .unwrap_or_else(|| SpanishDialect::from_tag(language));
        let normalized = if options.normalize_text {
            text.to_lowercase()
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

            if is_word_char(ch) {
                let mut end = i;
                while end < chars.len() && is_word_char(chars[end]) {
                    end += 1;
                }
                let word: String = chars[i..end].iter().collect();
                result.word_boundaries.push(result.phonemes.len());
                match loaded.exceptions.lookup(&word) {
                    Some(phonemes) => result.phonemes.extend(phonemes.iter().cloned()),
                    None => result.phonemes.extend(g2p::word_to_phonemes(
                        &word,
                        dialect,
                        options.include_stress,
                    )),
                }
                i = end;
                continue;
            }

            if matches!(ch, '.' | ',' | '!' | '?' | ';' | ':' | '¿' | '¡') {
                result.phonemes.push("_".to_string());
            }
            i += 1;
        }

        result
            .metadata
            .insert("backend".to_string(), self.name().to_string());
        result
            .metadata
            .insert("dialect".to_string(), format!("{dialect:?}"));
        Ok(result)
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_ipa: true,
            supports_stress: true,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhonemeOptionsBuilder;

    async fn backend() -> SpanishPhonemizer {
        let b = SpanishPhonemizer::new();
        b.initialize(&BackendOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        b
    }

    #[tokio::test]
    async fn phonemizes_sentence_with_pauses() {
        let b = backend().await;
        let r = b
            .phonemize("¿Cómo estás?", "es-ES", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(r.success);
        assert_eq!(r.phonemes.first().map(String::as_str), Some("_"));
        assert_eq!(r.phonemes.last().map(String::as_str), Some("_"));
        assert_eq!(r.word_boundaries.len(), 2);
    }

    #[tokio::test]
    async fn dialect_follows_language_tag() {
        let b = backend().await;
        let castilian = b
            .phonemize("cena", "es-ES", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(castilian.phonemes[0], "θ");
        let mexican = b
            .phonemize("cena", "es-MX", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(mexican.phonemes[0], "s");
    }

    #[tokio::test]
    async fn initialization_dialect_overrides_tag() {
        let b = SpanishPhonemizer::new();
        let options = BackendOptions {
            dialect: Some("es-AR".to_string()),
            ..BackendOptions::default()
        };
        b.initialize(&options, &CancellationToken::new())
            .await
            .unwrap();
        let r = b
            .phonemize("calle", "es-ES", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(r.phonemes, vec!["k", "a", "ʃ", "e"]);
    }

    #[tokio::test]
    async fn stress_marks_only_when_requested() {
        let b = backend().await;
        let opts = PhonemeOptionsBuilder::default()
            .include_stress(true)
            .build()
            .unwrap();
        let with = b
            .phonemize("café", "es-ES", Some(&opts), &CancellationToken::new())
            .await
            .unwrap();
        assert!(with.phonemes.contains(&"ˈ".to_string()));
        let without = b
            .phonemize("café", "es-ES", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!without.phonemes.contains(&"ˈ".to_string()));
    }

    #[tokio::test]
    async fn empty_text_yields_empty_success() {
        let b = backend().await;
        let r = b
            .phonemize("", "es-ES", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(r.success);
        assert!(r.phonemes.is_empty());
    }

    #[tokio::test]
    async fn disposed_backend_rejects_requests() {
        let b = backend().await;
        b.dispose();
        assert!(matches!(
            b.phonemize("hola", "es-ES", None, &CancellationToken::new())
                .await,
            Err(PhonemizerError::NotInitialized)
        ));
    }
}
