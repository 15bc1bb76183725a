//! Request options, backend configuration, and capability descriptors.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Output notation for phoneme tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhonemeFormat {
    /// International Phonetic Alphabet segments.
    Ipa,
    /// CMU-style ARPABET tokens with stress digits.
    Arpabet,
    /// X-SAMPA ASCII notation.
    XSampa,
    /// Piper's espeak-derived symbol set.
    Piper,
    /// Whatever notation the backend produces natively.
    Native,
}

impl Default for PhonemeFormat {
    fn default() -> Self {
        PhonemeFormat::Ipa
    }
}

/// Per-request options accepted by every backend.
///
/// Backends ignore options they cannot honor rather than failing. Use
/// [`PhonemeOptionsBuilder`] for partial construction:
///
/// ```
/// use phonemizer_rs::{PhonemeFormat, PhonemeOptionsBuilder};
///
/// let opts = PhonemeOptionsBuilder::default()
///     .format(PhonemeFormat::Arpabet)
///     .include_stress(true)
///     .build()
///     .unwrap();
/// assert!(opts.include_stress);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct PhonemeOptions {
    /// Requested output notation.
    pub format: PhonemeFormat,
    /// Emit stress markers / stress levels where the language has them.
    pub include_stress: bool,
    /// Emit syllable boundary markers.
    pub include_syllables: bool,
    /// Emit tone information for tonal languages.
    pub include_tones: bool,
    /// Run the language's text normalizer before conversion.
    pub normalize_text: bool,
    /// Fall back to rule-based G2P for out-of-dictionary words.
    pub use_g2p_fallback: bool,
    /// Backend-specific knobs, passed through untouched.
    pub custom_params: HashMap<String, serde_json::Value>,
}

impl Default for PhonemeOptions {
    fn default() -> Self {
        Self {
            format: PhonemeFormat::default(),
            include_stress: false,
            include_syllables: false,
            include_tones: false,
            normalize_text: true,
            use_g2p_fallback: true,
            custom_params: HashMap::new(),
        }
    }
}

/// Configuration handed to [`PhonemizerBackend::initialize`].
///
/// [`PhonemizerBackend::initialize`]: crate::PhonemizerBackend::initialize
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Explicit root for dictionary/data files. Probed before the default
    /// locator roots.
    pub data_path: Option<PathBuf>,
    /// Upper bound for dictionary loading. On expiry the backend falls back
    /// to its built-in data instead of blocking initialization.
    pub load_timeout: Duration,
    /// Variant tag for languages with regional pronunciation differences
    /// (e.g. `"es-AR"` selects Argentine Spanish).
    pub dialect: Option<String>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            data_path: None,
            load_timeout: Duration::from_secs(10),
            dialect: None,
        }
    }
}

/// Static feature flags advertised by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub supports_ipa: bool,
    pub supports_stress: bool,
    pub supports_syllables: bool,
    pub supports_tones: bool,
    pub supports_g2p: bool,
    pub supports_duration: bool,
    /// Accepts concurrent batch requests (see the service's `phonemize_many`).
    pub supports_batch: bool,
    pub is_thread_safe: bool,
    pub requires_network: bool,
}

/// Aggregated view of what the service can do for one language.
///
/// Built once after backend registration; snapshots returned to callers
/// are clones.
#[derive(Debug, Clone)]
pub struct LanguageCapabilities {
    /// BCP-47 style code, e.g. `"ko-KR"`.
    pub language: String,
    /// English display name.
    pub display_name: String,
    /// Endonym, e.g. `"한국어"`.
    pub native_name: String,
    /// Backends registered for this language, in registration order.
    pub available_backends: Vec<String>,
    /// Name of the highest-scoring backend.
    pub preferred_backend: String,
    /// Quality score of the preferred backend, in `[0, 1]`.
    pub quality: f32,
    pub supports_ipa: bool,
    pub supports_stress: bool,
    pub supports_tones: bool,
    pub supports_g2p: bool,
}

/// Display and native names for the languages this crate ships engines
/// and grouping data for. Unknown codes fall back to the code itself.
pub(crate) fn language_names(code: &str) -> (&'static str, &'static str) {
    match code {
        "en-US" => ("English (US)", "English"),
        "en-GB" => ("English (UK)", "English"),
        "en-IN" => ("English (India)", "English"),
        "de-DE" => ("German", "Deutsch"),
        "nl-NL" => ("Dutch", "Nederlands"),
        "es-ES" => ("Spanish (Spain)", "Español"),
        "es-MX" => ("Spanish (Mexico)", "Español"),
        "es-AR" => ("Spanish (Argentina)", "Español"),
        "fr-FR" => ("French", "Français"),
        "fr-CA" => ("French (Canada)", "Français"),
        "it-IT" => ("Italian", "Italiano"),
        "pt-BR" => ("Portuguese (Brazil)", "Português"),
        "pt-PT" => ("Portuguese (Portugal)", "Português"),
        "ja-JP" => ("Japanese", "日本語"),
        "zh-CN" => ("Chinese (Simplified)", "中文"),
        "zh-TW" => ("Chinese (Traditional)", "中文"),
        "ko-KR" => ("Korean", "한국어"),
        _ => ("", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_enable_normalization_and_g2p() {
        let opts = PhonemeOptions::default();
        assert_eq!(opts.format, PhonemeFormat::Ipa);
        assert!(opts.normalize_text);
        assert!(opts.use_g2p_fallback);
        assert!(!opts.include_stress);
        assert!(!opts.include_tones);
    }

    #[test]
    fn builder_overrides_single_field() {
        let opts = PhonemeOptionsBuilder::default()
            .include_tones(true)
            .build()
            .unwrap();
        assert!(opts.include_tones);
        assert!(opts.normalize_text);
    }

    #[test]
    fn capabilities_default_to_all_disabled() {
        let caps = BackendCapabilities::default();
        assert!(!caps.supports_ipa);
        assert!(!caps.supports_batch);
        assert!(!caps.is_thread_safe);
    }

    #[test]
    fn backend_options_default_timeout_is_ten_seconds() {
        assert_eq!(
            BackendOptions::default().load_timeout,
            Duration::from_secs(10)
        );
    }
}
