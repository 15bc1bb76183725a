//! English phonemizer backend: CMU-format lexicon plus letter-to-sound.

pub mod lts;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::dictionary::{DictionaryFormat, DictionarySource, DictionaryStore};
use crate::engines::EngineState;
use crate::error::{PhonemizerError, Result};
use crate::locator::FileSystemLocator;
use crate::options::{BackendCapabilities, BackendOptions, PhonemeFormat, PhonemeOptions};
use crate::{PhonemeResult, PhonemizerBackend};

const DICTIONARY_FILES: &[&str] = &["en/cmudict.dict", "cmudict.dict", "cmudict-0.7b.txt"];

/// Minimal lexicon used when no dictionary file can be loaded in time.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("HELLO", "HH AH0 L OW1"),
    ("WORLD", "W ER1 L D"),
    ("TEST", "T EH1 S T"),
    ("SPEECH", "S P IY1 CH"),
];

const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

struct Loaded {
    dictionary: DictionaryStore,
}

/// CMU-lexicon English backend.
pub struct EnglishPhonemizer {
    state: RwLock<EngineState<Loaded>>,
    locator: FileSystemLocator,
}

impl EnglishPhonemizer {
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

impl Default for EnglishPhonemizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split an ARPABET token into its symbol and stress digit.
fn split_stress(token: &str) -> (&str, u8) {
    match token.as_bytes().last() {
        Some(b @ b'0'..=b'2') => (&token[..token.len() - 1], b - b'0'),
        _ => (token, 0),
    }
}

/// IPA equivalent of a bare ARPABET symbol (stress digit already removed).
fn arpabet_to_ipa(symbol: &str, stress: u8) -> &'static str {
    match symbol {
        "AA" => "ɑ",
        "AE" => "æ",
        "AH" => {
            if stress == 0 {
                "ə"
            } else {
                "ʌ"
            }
        }
        "AO" => "ɔ",
        "AW" => "aʊ",
        "AY" => "aɪ",
        "B" => "b",
        "CH" => "tʃ",
        "D" => "d",
        "DH" => "ð",
        "EH" => "ɛ",
        "ER" => {
            if stress == 0 {
                "ɚ"
            } else {
                "ɝ"
            }
        }
        "EY" => "eɪ",
        "F" => "f",
        "G" => "ɡ",
        "HH" => "h",
        "IH" => "ɪ",
        "IY" => "i",
        "JH" => "dʒ",
        "K" => "k",
        "L" => "l",
        "M" => "m",
        "N" => "n",
        "NG" => "ŋ",
        "OW" => "oʊ",
        "OY" => "ɔɪ",
        "P" => "p",
        "R" => "ɹ",
        "S" => "s",
        "SH" => "ʃ",
        "T" => "t",
        "TH" => "θ",
        "UH" => "ʊ",
        "UW" => "u",
        "V" => "v",
        "W" => "w",
        "Y" => "j",
        "Z" => "z",
        "ZH" => "ʒ",
        _ => "",
    }
}

/// Append one word's ARPABET tokens to the result in the requested format.
fn emit_word(result: &mut PhonemeResult, arpabet: &[String], options: &PhonemeOptions) {
    for token in arpabet {
        let (symbol, stress) = split_stress(token);
        match options.format {
            PhonemeFormat::Arpabet | PhonemeFormat::Native => {
                result.phonemes.push(token.clone());
            }
            _ => {
                let ipa = arpabet_to_ipa(symbol, stress);
                if ipa.is_empty() {
                    log::debug!("no IPA mapping for ARPABET symbol {symbol:?}");
                    continue;
                }
                if options.include_stress {
                    match stress {
                        1 => result.phonemes.push("ˈ".to_string()),
                        2 => result.phonemes.push("ˌ".to_string()),
                        _ => {}
                    }
                }
                result.phonemes.push(ipa.to_string());
            }
        }
        if options.include_stress {
            result.stresses.push(stress);
        }
    }
}

#[async_trait]
impl PhonemizerBackend for EnglishPhonemizer {
    fn name(&self) -> &'static str {
        "english-lexicon"
    }

    fn supported_languages(&self) -> &[&'static str] {
        &["en-US", "en-GB", "en-IN"]
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
        let dictionary = DictionaryStore::load(
            DICTIONARY_FILES,
            DictionaryFormat::CmuSpaced,
            &locator,
            options,
            BUILTIN_ENTRIES,
            cancel,
        )
        .await?;

        let mut state = self
            .state
            .write()
            .map_err(|_| PhonemizerError::NotInitialized)?;
        *state = EngineState::Ready(Arc::new(Loaded { dictionary }));
        log::info!("english backend initialized");
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

        let mut result = PhonemeResult::empty(language);
        let mut oov = 0usize;
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if cancel.is_cancelled() {
                return Err(PhonemizerError::Cancelled);
            }
            let ch = chars[i];

            if ch.is_ascii_alphabetic() || ch == '\'' {
                let mut end = i;
                while end < chars.len() && (chars[end].is_ascii_alphabetic() || chars[end] == '\'')
                {
                    end += 1;
                }
                let word: String = chars[i..end].iter().collect();
                result.word_boundaries.push(result.phonemes.len());
                match loaded.dictionary.lookup(&word) {
                    Some(phonemes) => emit_word(&mut result, phonemes, options),
                    None if options.use_g2p_fallback => {
                        let generated = lts::word_to_arpabet(&word.to_lowercase());
                        emit_word(&mut result, &generated, options);
                        oov += 1;
                    }
                    None => {
                        log::debug!("skipping out-of-dictionary word {word:?}");
                        oov += 1;
                    }
                }
                i = end;
                continue;
            }

            if ch.is_ascii_digit() {
                // Digits read out one at a time; the words are always in
                // the dictionary (builtin fallback aside).
                result.word_boundaries.push(result.phonemes.len());
                let word = DIGIT_WORDS[ch.to_digit(10).unwrap_or(0) as usize];
                match loaded.dictionary.lookup(word) {
                    Some(phonemes) => emit_word(&mut result, phonemes, options),
                    None if options.use_g2p_fallback => {
                        emit_word(&mut result, &lts::word_to_arpabet(word), options)
                    }
                    None => oov += 1,
                }
                i += 1;
                continue;
            }

            if matches!(ch, '.' | ',' | '!' | '?' | ';' | ':') {
                result.phonemes.push("_".to_string());
                if options.include_stress {
                    result.stresses.push(0);
                }
            }
            i += 1;
        }

        result
            .metadata
            .insert("backend".to_string(), self.name().to_string());
        if oov > 0 {
            result
                .metadata
                .insert("oov_words".to_string(), oov.to_string());
        }
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
                EngineState::Ready(loaded) => loaded.dictionary.memory_usage() + 1024,
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

impl EnglishPhonemizer {
    /// True when the backend is running on its built-in fallback entries
    /// rather than a loaded dictionary file.
    pub fn using_builtin_dictionary(&self) -> bool {
        match self.state.read() {
            Ok(state) => match &*state {
                EngineState::Ready(loaded) => {
                    loaded.dictionary.source() == &DictionarySource::Builtin
                }
                _ => false,
            },
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhonemeOptionsBuilder;
    use std::io::Write;

    async fn backend() -> EnglishPhonemizer {
        let b = EnglishPhonemizer::new();
        b.initialize(&BackendOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        b
    }

    fn arpabet_options() -> PhonemeOptions {
        PhonemeOptionsBuilder::default()
            .format(PhonemeFormat::Arpabet)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn builtin_fallback_answers_hello() {
        let b = backend().await;
        assert!(b.using_builtin_dictionary());
        let r = b
            .phonemize(
                "hello",
                "en-US",
                Some(&arpabet_options()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(r.phonemes, vec!["HH", "AH0", "L", "OW1"]);
    }

    #[tokio::test]
    async fn ipa_format_converts_arpabet() {
        let b = backend().await;
        let r = b
            .phonemize("hello", "en-US", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(r.phonemes, vec!["h", "ə", "l", "oʊ"]);
    }

    #[tokio::test]
    async fn stress_markers_in_ipa_output() {
        let b = backend().await;
        let opts = PhonemeOptionsBuilder::default()
            .include_stress(true)
            .build()
            .unwrap();
        let r = b
            .phonemize("hello", "en-US", Some(&opts), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(r.phonemes, vec!["h", "ə", "l", "ˈ", "oʊ"]);
        assert_eq!(r.stresses, vec![0, 0, 0, 1]);
    }

    #[tokio::test]
    async fn unknown_words_use_letter_to_sound() {
        let b = backend().await;
        let r = b
            .phonemize(
                "zorp",
                "en-US",
                Some(&arpabet_options()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(r.phonemes, vec!["Z", "AA1", "R", "P"]);
        assert_eq!(r.metadata.get("oov_words").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn g2p_fallback_can_be_disabled() {
        let b = backend().await;
        let opts = PhonemeOptionsBuilder::default()
            .use_g2p_fallback(false)
            .build()
            .unwrap();
        let r = b
            .phonemize("zorp", "en-US", Some(&opts), &CancellationToken::new())
            .await
            .unwrap();
        assert!(r.phonemes.is_empty());
        assert!(r.success);
    }

    #[tokio::test]
    async fn loads_dictionary_file_from_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("cmudict.dict")).unwrap();
        writeln!(f, "RUST  R AH1 S T").unwrap();

        let b = EnglishPhonemizer::new();
        let options = BackendOptions {
            data_path: Some(dir.path().to_path_buf()),
            ..BackendOptions::default()
        };
        b.initialize(&options, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!b.using_builtin_dictionary());
        let r = b
            .phonemize(
                "rust",
                "en-US",
                Some(&arpabet_options()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(r.phonemes, vec!["R", "AH1", "S", "T"]);
    }

    #[tokio::test]
    async fn digits_read_as_words() {
        let b = backend().await;
        let r = b
            .phonemize(
                "3",
                "en-US",
                Some(&arpabet_options()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        // "three" is not in the builtin seed: letter-to-sound covers it
        assert_eq!(r.phonemes, vec!["TH", "R", "IY1"]);
    }

    #[tokio::test]
    async fn punctuation_becomes_pause() {
        let b = backend().await;
        let r = b
            .phonemize("hello, world", "en-US", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(r.phonemes.contains(&"_".to_string()));
        assert_eq!(r.word_boundaries.len(), 2);
    }

    #[tokio::test]
    async fn disposed_backend_reports_zero_memory() {
        let b = backend().await;
        assert!(b.memory_usage() > 0);
        b.dispose();
        assert_eq!(b.memory_usage(), 0);
    }
}
