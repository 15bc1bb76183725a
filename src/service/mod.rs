//! Multilingual orchestration over the registered backends.
//!
//! The service owns routing (exact, fallback chains, group similarity),
//! optional language detection, the result cache, and failure retry. It is
//! constructed explicitly through [`ServiceBuilder`] and immutable once
//! built; all methods take `&self` and are safe to call concurrently.

pub mod detector;
pub mod registry;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheConfig, CacheStatistics, ResultCache};
use crate::error::{PhonemizerError, Result};
use crate::options::{BackendOptions, LanguageCapabilities, PhonemeOptions};
use crate::{PhonemeResult, PhonemizerBackend};

use detector::{LanguageDetector, ScriptLanguageDetector};
use registry::{BackendRegistry, Resolution};

const DEFAULT_LANGUAGE: &str = "en-US";

/// A backend result annotated with the routing that produced it.
#[derive(Debug, Clone)]
pub struct ServicePhonemeResult {
    pub phonemes: PhonemeResult,
    /// Language the caller asked for, or the detected one.
    pub requested_language: String,
    /// Set when the service had to detect the language itself.
    pub detected_language: Option<String>,
    /// Detection confidence; 1.0 for explicit requests.
    pub language_confidence: f32,
    /// Per-language detector scores; empty for explicit requests.
    pub language_scores: HashMap<String, f32>,
    pub used_backend: String,
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
    pub from_cache: bool,
}

/// Builder for [`MultilingualPhonemizerService`].
pub struct ServiceBuilder {
    backends: Vec<Arc<dyn PhonemizerBackend>>,
    backend_options: BackendOptions,
    cache_config: Option<CacheConfig>,
    detector: Option<Box<dyn LanguageDetector>>,
    fallback_chains: Vec<(String, Vec<String>)>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            backend_options: BackendOptions::default(),
            cache_config: Some(CacheConfig::default()),
            detector: None,
            fallback_chains: Vec::new(),
        }
    }

    pub fn backend(mut self, backend: Arc<dyn PhonemizerBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Options passed to every backend's `initialize`.
    pub fn backend_options(mut self, options: BackendOptions) -> Self {
        self.backend_options = options;
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_config = None;
        self
    }

    pub fn detector(mut self, detector: Box<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Override the fallback chain for one language.
    pub fn fallback_chain(mut self, language: &str, chain: &[&str]) -> Self {
        self.fallback_chains.push((
            language.to_string(),
            chain.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    /// Initialize every backend and assemble the service.
    ///
    /// A backend that fails to initialize is logged and left out; it never
    /// poisons the rest of the registry.
    pub async fn build(self) -> Result<MultilingualPhonemizerService> {
        let cancel = CancellationToken::new();
        let mut registry = BackendRegistry::new();
        for backend in self.backends {
            match backend.initialize(&self.backend_options, &cancel).await {
                Ok(true) => registry.register(backend),
                Ok(false) => {
                    log::warn!("backend '{}' declined initialization, skipping", backend.name());
                }
                Err(e) => {
                    log::warn!("backend '{}' failed to initialize: {e}, skipping", backend.name());
                }
            }
        }
        for (language, chain) in self.fallback_chains {
            registry.set_fallback_chain(&language, chain);
        }

        let capabilities = registry.language_capabilities();
        log::info!(
            "phonemizer service ready: {} languages, {} backends",
            capabilities.len(),
            registry.backends().len()
        );
        Ok(MultilingualPhonemizerService {
            registry,
            detector: self
                .detector
                .unwrap_or_else(|| Box::new(ScriptLanguageDetector::new())),
            cache: self.cache_config.map(ResultCache::new),
            capabilities,
        })
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes phonemization requests across languages and backends.
pub struct MultilingualPhonemizerService {
    registry: BackendRegistry,
    detector: Box<dyn LanguageDetector>,
    cache: Option<ResultCache>,
    capabilities: HashMap<String, LanguageCapabilities>,
}

impl MultilingualPhonemizerService {
    /// Phonemize `text`, detecting the language when none is given.
    pub async fn phonemize(
        &self,
        text: &str,
        language: Option<&str>,
        options: Option<&PhonemeOptions>,
        cancel: &CancellationToken,
    ) -> Result<ServicePhonemeResult> {
        if cancel.is_cancelled() {
            return Err(PhonemizerError::Cancelled);
        }

        let (request_language, detected, confidence, scores) = match language {
            Some(lang) => (lang.to_string(), None, 1.0, HashMap::new()),
            None => {
                let detection = self.detector.detect(text);
                if detection.confidence < 0.5 {
                    log::warn!(
                        "low language-detection confidence {:.2} for input, guessing '{}'",
                        detection.confidence,
                        detection.language
                    );
                }
                let lang = detection.language.clone();
                (lang.clone(), Some(lang), detection.confidence, detection.scores)
            }
        };

        if text.trim().is_empty() {
            return Ok(ServicePhonemeResult {
                phonemes: PhonemeResult::empty(&request_language),
                requested_language: request_language,
                detected_language: detected,
                language_confidence: confidence,
                language_scores: scores,
                used_backend: String::new(),
                used_fallback: false,
                fallback_reason: None,
                from_cache: false,
            });
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&request_language, text) {
                log::debug!("cache hit for '{request_language}'");
                return Ok(ServicePhonemeResult {
                    phonemes: (*hit).clone(),
                    requested_language: request_language,
                    detected_language: detected,
                    language_confidence: confidence,
                    language_scores: scores,
                    used_backend: hit
                        .metadata
                        .get("backend")
                        .cloned()
                        .unwrap_or_default(),
                    used_fallback: false,
                    fallback_reason: None,
                    from_cache: true,
                });
            }
        }

        let resolution = self
            .registry
            .resolve(&request_language)
            .ok_or_else(|| PhonemizerError::UnsupportedLanguage(request_language.clone()))?;

        let (result, resolution) = self
            .phonemize_with_retry(text, resolution, options, cancel)
            .await?;

        if let Some(cache) = &self.cache {
            cache.insert(&request_language, text, result.clone());
        }

        Ok(ServicePhonemeResult {
            used_backend: resolution.backend.name().to_string(),
            used_fallback: resolution.fallback_reason.is_some(),
            fallback_reason: resolution.fallback_reason,
            phonemes: result,
            requested_language: request_language,
            detected_language: detected,
            language_confidence: confidence,
            language_scores: scores,
            from_cache: false,
        })
    }

    /// Run the resolved backend, retrying once through the fallback graph
    /// when it fails.
    async fn phonemize_with_retry(
        &self,
        text: &str,
        resolution: Resolution,
        options: Option<&PhonemeOptions>,
        cancel: &CancellationToken,
    ) -> Result<(PhonemeResult, Resolution)> {
        let first = resolution
            .backend
            .phonemize(text, &resolution.language, options, cancel)
            .await;
        let error = match first {
            Ok(result) => return Ok((result, resolution)),
            Err(e @ PhonemizerError::Cancelled) => return Err(e),
            Err(e) => e,
        };

        log::warn!(
            "backend '{}' failed for '{}': {error}, retrying via fallback",
            resolution.backend.name(),
            resolution.language
        );
        let mut excluded = HashSet::new();
        excluded.insert(resolution.language.clone());
        let retry = self
            .registry
            .resolve_excluding(&resolution.language, &excluded)
            .ok_or_else(|| PhonemizerError::BackendFailure {
                backend: resolution.backend.name().to_string(),
                message: error.to_string(),
            })?;

        match retry
            .backend
            .phonemize(text, &retry.language, options, cancel)
            .await
        {
            Ok(result) => {
                let reason = format!(
                    "retry on '{}' after '{}' failed: {error}",
                    retry.language, resolution.language
                );
                Ok((
                    result,
                    Resolution {
                        language: retry.language,
                        backend: retry.backend,
                        fallback_reason: Some(reason),
                    },
                ))
            }
            Err(PhonemizerError::Cancelled) => Err(PhonemizerError::Cancelled),
            Err(retry_error) => Err(PhonemizerError::BackendFailure {
                backend: retry.backend.name().to_string(),
                message: retry_error.to_string(),
            }),
        }
    }

    /// Phonemize several `(language, text)` requests concurrently.
    pub async fn phonemize_many(
        &self,
        requests: &[(String, String)],
        options: Option<&PhonemeOptions>,
        cancel: &CancellationToken,
    ) -> Vec<Result<ServicePhonemeResult>> {
        join_all(
            requests
                .iter()
                .map(|(language, text)| self.phonemize(text, Some(language.as_str()), options, cancel)),
        )
        .await
    }

    pub fn is_language_supported(&self, language: &str) -> bool {
        self.registry.is_language_supported(language)
    }

    /// Snapshot of per-language capabilities.
    pub fn supported_languages(&self) -> HashMap<String, LanguageCapabilities> {
        self.capabilities.clone()
    }

    /// Score a named backend for a language, if registered.
    pub fn quality_score(&self, language: &str, backend_name: &str) -> Option<f32> {
        self.registry
            .backends()
            .iter()
            .find(|b| b.name() == backend_name)
            .map(|b| self.registry.quality_score(language, b.as_ref()))
    }

    /// Replace the fallback chain for one language at runtime.
    pub fn set_language_fallback_chain(&self, language: &str, chain: &[&str]) {
        self.registry
            .set_fallback_chain(language, chain.iter().map(|c| c.to_string()).collect());
    }

    pub fn cache_statistics(&self) -> Option<CacheStatistics> {
        self.cache.as_ref().map(ResultCache::statistics)
    }

    /// Total approximate memory across all backends and the cache.
    pub fn memory_usage(&self) -> u64 {
        let backends: u64 = self.registry.backends().iter().map(|b| b.memory_usage()).sum();
        let cache = self
            .cache
            .as_ref()
            .map(|c| c.statistics().bytes)
            .unwrap_or(0);
        backends + cache
    }

    /// Dispose every backend and drop cached results. Idempotent; requests
    /// after shutdown fail with backend errors, never panic.
    pub fn shutdown(&self) {
        for backend in self.registry.backends() {
            backend.dispose();
        }
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        log::info!("phonemizer service shut down");
    }

    /// The language used when neither the caller nor detection picks one.
    pub fn default_language(&self) -> &'static str {
        DEFAULT_LANGUAGE
    }
}
