//! Mandarin Chinese phonemizer backend.
//!
//! Pipeline: normalize (numbers, punctuation), convert characters to
//! numbered pinyin with phrase matching and tone sandhi, then map each
//! syllable to IPA segments with optional tone contour marks.

pub mod dictionary;
pub mod ipa;
pub mod normalizer;
pub mod pinyin;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::engines::EngineState;
use crate::error::{PhonemizerError, Result};
use crate::locator::{DataLocator, FileSystemLocator};
use crate::options::{BackendCapabilities, BackendOptions, PhonemeOptions};
use crate::{PhonemeResult, PhonemizerBackend};

use dictionary::PinyinDictionary;
use normalizer::NumberFormat;
use pinyin::PinyinToken;

const DICTIONARY_FILES: &[&str] = &["zh/pinyin.json", "zh_pinyin.json"];

struct Loaded {
    dict: PinyinDictionary,
}

/// Dictionary-driven Mandarin backend.
pub struct ChinesePhonemizer {
    state: RwLock<EngineState<Loaded>>,
    locator: FileSystemLocator,
}

impl ChinesePhonemizer {
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

impl Default for ChinesePhonemizer {
    fn default() -> Self {
        Self::new()
    }
}

async fn load_dictionary(
    locator: &FileSystemLocator,
    options: &BackendOptions,
    cancel: &CancellationToken,
) -> Result<PinyinDictionary> {
    if cancel.is_cancelled() {
        return Err(PhonemizerError::Cancelled);
    }

    let path = options
        .data_path
        .as_ref()
        .and_then(|root| {
            DICTIONARY_FILES
                .iter()
                .map(|name| root.join(name))
                .find(|p| p.is_file())
        })
        .or_else(|| DICTIONARY_FILES.iter().find_map(|name| locator.resolve(name)));

    let Some(path) = path else {
        log::info!("no pinyin data file found, using built-in dictionary");
        return Ok(PinyinDictionary::builtin());
    };

    let load = async {
        let content = tokio::fs::read_to_string(&path).await?;
        PinyinDictionary::from_json(&content)
    };
    tokio::select! {
        _ = cancel.cancelled() => Err(PhonemizerError::Cancelled),
        loaded = tokio::time::timeout(options.load_timeout, load) => match loaded {
            Ok(Ok(dict)) => {
                log::info!(
                    "loaded pinyin dictionary from {path:?} ({} characters, {} phrases)",
                    dict.character_count(),
                    dict.phrase_count()
                );
                Ok(dict)
            }
            Ok(Err(e)) => {
                log::warn!("failed to load pinyin dictionary {path:?}: {e}, using built-in");
                Ok(PinyinDictionary::builtin())
            }
            Err(_) => {
                log::warn!(
                    "pinyin dictionary load timed out after {:?}, using built-in",
                    options.load_timeout
                );
                Ok(PinyinDictionary::builtin())
            }
        },
    }
}

fn number_format(options: &PhonemeOptions) -> NumberFormat {
    match options
        .custom_params
        .get("number_format")
        .and_then(|v| v.as_str())
    {
        Some("individual") => NumberFormat::Individual,
        _ => NumberFormat::Formal,
    }
}

#[async_trait]
impl PhonemizerBackend for ChinesePhonemizer {
    fn name(&self) -> &'static str {
        "chinese-pinyin"
    }

    fn supported_languages(&self) -> &[&'static str] {
        &["zh-CN", "zh-TW"]
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
        let dict = load_dictionary(&locator, options, cancel).await?;

        let mut state = self
            .state
            .write()
            .map_err(|_| PhonemizerError::NotInitialized)?;
        *state = EngineState::Ready(Arc::new(Loaded { dict }));
        log::info!("chinese backend initialized");
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
            normalizer::normalize(text, number_format(options))
        } else {
            text.to_string()
        };

        let mut result = PhonemeResult::empty(language);
        let mut in_chinese_run = false;
        for token in pinyin::text_to_pinyin(&normalized, &loaded.dict) {
            if cancel.is_cancelled() {
                return Err(PhonemizerError::Cancelled);
            }
            match token {
                PinyinToken::Syllable(syllable) => {
                    if !in_chinese_run {
                        result.word_boundaries.push(result.phonemes.len());
                        in_chinese_run = true;
                    }
                    match ipa::syllable_to_ipa(&syllable, options.include_tones) {
                        Some(tokens) => result.phonemes.extend(tokens),
                        None => log::warn!("skipping unmappable pinyin {syllable:?}"),
                    }
                }
                PinyinToken::Other(ch) => {
                    in_chinese_run = false;
                    if matches!(ch, '.' | ',' | '!' | '?' | ';' | ':') {
                        result.phonemes.push("_".to_string());
                    } else if ch.is_ascii_alphabetic() {
                        result.phonemes.push(ch.to_ascii_lowercase().to_string());
                    }
                    // Whitespace and anything else contributes nothing.
                }
            }
        }

        result
            .metadata
            .insert("backend".to_string(), self.name().to_string());
        Ok(result)
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_ipa: true,
            supports_tones: true,
            supports_g2p: true,
            supports_batch: true,
            is_thread_safe: true,
            ..BackendCapabilities::default()
        }
    }

    fn memory_usage(&self) -> u64 {
        match self.state.read() {
            Ok(state) => match &*state {
                EngineState::Ready(loaded) => loaded.dict.memory_usage() + 1024,
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

    async fn backend() -> ChinesePhonemizer {
        let b = ChinesePhonemizer::new();
        b.initialize(&BackendOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        b
    }

    #[tokio::test]
    async fn phonemizes_greeting_without_tones_by_default() {
        let b = backend().await;
        let r = b
            .phonemize("你好", "zh-CN", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(r.success);
        assert_eq!(r.phonemes, vec!["n", "i", "x", "a", "u"]);
    }

    #[tokio::test]
    async fn tone_marks_appear_when_requested() {
        let b = backend().await;
        let opts = PhonemeOptionsBuilder::default()
            .include_tones(true)
            .build()
            .unwrap();
        let r = b
            .phonemize("你好", "zh-CN", Some(&opts), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            r.phonemes,
            vec!["n", "i", "˨˩˦", "x", "a", "u", "˨˩˦"]
        );
    }

    #[tokio::test]
    async fn phrase_lookup_drives_multi_character_words() {
        let b = backend().await;
        let r = b
            .phonemize("中国人", "zh-CN", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            r.phonemes,
            vec!["ʈʂ", "u", "ŋ", "k", "u", "o", "ʐ", "ə", "n"]
        );
    }

    #[tokio::test]
    async fn numbers_normalize_before_conversion() {
        let b = backend().await;
        let r = b
            .phonemize("3", "zh-CN", None, &CancellationToken::new())
            .await
            .unwrap();
        // 3 → 三 → san1 → s a n
        assert_eq!(r.phonemes, vec!["s", "a", "n"]);
    }

    #[tokio::test]
    async fn unknown_characters_degrade_silently() {
        let b = backend().await;
        let r = b
            .phonemize("好猫", "zh-CN", None, &CancellationToken::new())
            .await
            .unwrap();
        // 猫 is not in the built-in dictionary: skipped, not garbage
        assert!(r.success);
        assert_eq!(r.phonemes, vec!["x", "a", "u"]);
    }

    #[tokio::test]
    async fn punctuation_becomes_pause_token() {
        let b = backend().await;
        let r = b
            .phonemize("你好。", "zh-CN", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(r.phonemes.last().map(String::as_str), Some("_"));
    }

    #[tokio::test]
    async fn empty_input_is_successful() {
        let b = backend().await;
        let r = b
            .phonemize("", "zh-CN", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(r.success);
        assert!(r.phonemes.is_empty());
    }

    #[tokio::test]
    async fn disposed_backend_reports_not_initialized() {
        let b = backend().await;
        b.dispose();
        assert!(matches!(
            b.phonemize("你好", "zh-CN", None, &CancellationToken::new())
                .await,
            Err(PhonemizerError::NotInitialized)
        ));
        assert_eq!(b.memory_usage(), 0);
    }
}
