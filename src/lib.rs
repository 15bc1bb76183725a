//! # phonemizer-rs
//!
//! A Rust library for multilingual grapheme-to-phoneme conversion, producing
//! phoneme sequences suitable for neural TTS acoustic models.
//!
//! ## Features
//!
//! - **Rule-based engines**: Korean, Spanish, and Mandarin Chinese G2P with
//!   language-specific text normalization
//! - **Dictionary-backed English**: CMU-format lexicon with a letter-to-sound
//!   fallback for unknown words
//! - **Orchestration**: a multilingual service with language detection,
//!   fallback chains, group-similarity routing, and result caching
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! phonemizer-rs = "0.3"
//! ```
//!
//! ```ignore
//! use std::sync::Arc;
//! use phonemizer_rs::engines::korean::KoreanPhonemizer;
//! use phonemizer_rs::service::ServiceBuilder;
//! use tokio_util::sync::CancellationToken;
//!
//! let service = ServiceBuilder::new()
//!     .backend(Arc::new(KoreanPhonemizer::new()))
//!     .build()
//!     .await?;
//!
//! let result = service
//!     .phonemize("안녕하세요", Some("ko-KR"), None, &CancellationToken::new())
//!     .await?;
//! println!("{:?}", result.phonemes.phonemes);
//! # Ok::<(), phonemizer_rs::PhonemizerError>(())
//! ```

pub mod cache;
pub mod dictionary;
pub mod engines;
pub mod error;
pub mod locator;
pub mod options;
pub mod service;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use crate::error::{PhonemizerError, Result};
pub use crate::options::{
    BackendCapabilities, BackendOptions, LanguageCapabilities, PhonemeFormat, PhonemeOptions,
    PhonemeOptionsBuilder,
};

/// The result of a phonemization operation.
///
/// `phonemes` holds one token per phoneme segment. The parallel vectors
/// (`durations`, `stresses`) are empty unless the corresponding
/// [`PhonemeOptions`] flag was set and the backend supports the feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhonemeResult {
    /// Phoneme tokens in output order.
    pub phonemes: Vec<String>,
    /// Language code the phonemes were produced for.
    pub language: String,
    /// False only for failed conversions; failed results carry no phonemes.
    pub success: bool,
    /// Per-phoneme duration estimates in seconds, if requested.
    pub durations: Vec<f32>,
    /// Per-phoneme stress levels (0 none, 1 primary, 2 secondary), if requested.
    pub stresses: Vec<u8>,
    /// Indices into `phonemes` where a new word starts.
    pub word_boundaries: Vec<usize>,
    /// Backend-specific annotations (backend name, dictionary source, ...).
    pub metadata: HashMap<String, String>,
}

impl PhonemeResult {
    /// The canonical successful result for empty input.
    pub fn empty(language: &str) -> Self {
        Self {
            language: language.to_string(),
            success: true,
            ..Self::default()
        }
    }

    /// A failed result. Failed results never carry phonemes.
    pub fn failed(language: &str) -> Self {
        Self {
            language: language.to_string(),
            success: false,
            ..Self::default()
        }
    }
}

/// Common contract for all phonemizer backends.
///
/// Backends are shared as `Arc<dyn PhonemizerBackend>` and must be safe to
/// call from multiple tasks at once. Lifecycle: [`initialize`] is idempotent
/// and never fails for missing optional resources (it degrades and logs);
/// [`dispose`] is idempotent and a disposed backend answers
/// [`PhonemizerError::NotInitialized`] until re-initialized.
///
/// [`initialize`]: PhonemizerBackend::initialize
/// [`dispose`]: PhonemizerBackend::dispose
#[async_trait]
pub trait PhonemizerBackend: Send + Sync {
    /// Stable backend name, used for registry lookups and quality scoring.
    fn name(&self) -> &'static str;

    /// Language codes this backend accepts.
    fn supported_languages(&self) -> &[&'static str];

    /// Load dictionaries and rule data.
    ///
    /// Returns `Ok(true)` when the backend is usable, including the degraded
    /// case where optional data files were missing. Cancellation leaves the
    /// backend fully unloaded, never half-populated.
    async fn initialize(
        &self,
        options: &BackendOptions,
        cancel: &CancellationToken,
    ) -> Result<bool>;

    /// Convert `text` to phonemes for `language`.
    ///
    /// Empty or whitespace-only text yields [`PhonemeResult::empty`].
    async fn phonemize(
        &self,
        text: &str,
        language: &str,
        options: Option<&PhonemeOptions>,
        cancel: &CancellationToken,
    ) -> Result<PhonemeResult>;

    /// Static feature flags for this backend.
    fn capabilities(&self) -> BackendCapabilities;

    /// Approximate resident memory in bytes; 0 after [`dispose`].
    ///
    /// [`dispose`]: PhonemizerBackend::dispose
    fn memory_usage(&self) -> u64;

    /// Release loaded data. Idempotent.
    fn dispose(&self);
}

/// Downstream consumer of phoneme ID sequences.
///
/// Acoustic-model inference is out of scope for this crate; the service only
/// needs an opaque seam to hand token IDs to.
pub trait AudioInferenceBackend: Send + Sync {
    /// Run inference over encoded phoneme IDs, returning raw audio samples.
    fn infer(&self, phoneme_ids: &[i64]) -> Result<Vec<f32>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_successful_with_no_phonemes() {
        let r = PhonemeResult::empty("ko-KR");
        assert!(r.success);
        assert!(r.phonemes.is_empty());
        assert_eq!(r.language, "ko-KR");
    }

    #[test]
    fn failed_result_carries_no_phonemes() {
        let r = PhonemeResult::failed("es-ES");
        assert!(!r.success);
        assert!(r.phonemes.is_empty());
    }
}
