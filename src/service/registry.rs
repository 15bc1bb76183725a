//! Backend registry: language routing, fallback chains, quality scoring.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::options::{language_names, LanguageCapabilities};
use crate::PhonemizerBackend;

/// Upper bound on fallback-chain traversal, so cyclic chain configuration
/// still terminates.
const MAX_FALLBACK_DEPTH: usize = 8;

/// A family of related languages with pairwise pronunciation similarity.
///
/// Similarity is symmetric; pairs without an explicit value default to 0.5
/// within a group and 0.0 across groups.
#[derive(Debug)]
pub struct LanguageGroup {
    pub name: &'static str,
    pub members: &'static [&'static str],
    /// All members are written in the same script.
    pub common_script: bool,
    /// Members draw on a largely overlapping phoneme inventory.
    pub share_phoneme_set: bool,
    similarities: &'static [(&'static str, &'static str, f32)],
}

impl LanguageGroup {
    fn contains(&self, language: &str) -> bool {
        self.members.iter().any(|m| *m == language)
    }

    fn similarity(&self, a: &str, b: &str) -> f32 {
        self.similarities
            .iter()
            .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(_, _, s)| *s)
            .unwrap_or(0.5)
    }
}

/// The built-in language family graph.
pub fn default_groups() -> Vec<LanguageGroup> {
    vec![
        LanguageGroup {
            name: "Germanic",
            members: &["en-US", "en-GB", "en-IN", "de-DE", "nl-NL"],
            common_script: true,
            share_phoneme_set: false,
            similarities: &[
                ("en-US", "en-GB", 0.95),
                ("en-GB", "en-IN", 0.90),
                ("en-US", "en-IN", 0.85),
                ("de-DE", "nl-NL", 0.70),
            ],
        },
        LanguageGroup {
            name: "Romance",
            members: &["es-ES", "es-MX", "es-AR", "fr-FR", "it-IT", "pt-BR", "pt-PT"],
            common_script: true,
            share_phoneme_set: true,
            similarities: &[
                ("es-ES", "es-MX", 0.95),
                ("es-ES", "es-AR", 0.90),
                ("pt-BR", "pt-PT", 0.95),
                ("es-ES", "pt-PT", 0.80),
                ("es-ES", "it-IT", 0.75),
                ("fr-FR", "it-IT", 0.70),
            ],
        },
        LanguageGroup {
            name: "EastAsian",
            members: &["ja-JP", "zh-CN", "zh-TW", "ko-KR"],
            common_script: false,
            share_phoneme_set: false,
            similarities: &[
                ("zh-CN", "zh-TW", 0.95),
                ("ja-JP", "zh-CN", 0.30),
                ("ko-KR", "ja-JP", 0.25),
            ],
        },
    ]
}

/// Default explicit fallback chains, tried before group similarity.
pub fn default_fallback_chains() -> HashMap<String, Vec<String>> {
    let chains: [(&str, &[&str]); 5] = [
        ("en-IN", &["en-GB", "en-US"]),
        ("es-MX", &["es-ES"]),
        ("zh-TW", &["zh-CN"]),
        ("pt-BR", &["pt-PT", "es-ES"]),
        ("fr-CA", &["fr-FR"]),
    ];
    chains
        .iter()
        .map(|(lang, chain)| {
            (
                lang.to_string(),
                chain.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect()
}

/// How a request language got mapped to a backend.
pub struct Resolution {
    /// Language actually served (differs from the request on fallback).
    pub language: String,
    pub backend: Arc<dyn PhonemizerBackend>,
    /// Human-readable reason when a fallback was taken.
    pub fallback_reason: Option<String>,
}

/// Routing table from language codes to backends.
pub struct BackendRegistry {
    backends: HashMap<String, Vec<Arc<dyn PhonemizerBackend>>>,
    /// Languages in first-registration order, for deterministic tie-breaks.
    language_order: Vec<String>,
    all: Vec<Arc<dyn PhonemizerBackend>>,
    chains: RwLock<HashMap<String, Vec<String>>>,
    groups: Vec<LanguageGroup>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            language_order: Vec::new(),
            all: Vec::new(),
            chains: RwLock::new(default_fallback_chains()),
            groups: default_groups(),
        }
    }

    pub fn register(&mut self, backend: Arc<dyn PhonemizerBackend>) {
        for language in backend.supported_languages() {
            let entry = self.backends.entry(language.to_string()).or_default();
            if entry.is_empty() {
                self.language_order.push(language.to_string());
            }
            entry.push(Arc::clone(&backend));
        }
        self.all.push(backend);
    }

    /// Replace the fallback chain for one language.
    pub fn set_fallback_chain(&self, language: &str, chain: Vec<String>) {
        if let Ok(mut chains) = self.chains.write() {
            chains.insert(language.to_string(), chain);
        }
    }

    pub fn backends(&self) -> &[Arc<dyn PhonemizerBackend>] {
        &self.all
    }

    pub fn is_language_supported(&self, language: &str) -> bool {
        self.backends.contains_key(language)
    }

    pub fn registered_languages(&self) -> &[String] {
        &self.language_order
    }

    /// Score how well a backend serves a language.
    ///
    /// 0.5 base, +0.3 when the language is natively supported, +0.1 for
    /// G2P fallback support, +0.1 for stress support on English, +0.2 for
    /// the specialized English lexicon backend, capped at 1.0.
    pub fn quality_score(&self, language: &str, backend: &dyn PhonemizerBackend) -> f32 {
        let mut score = 0.5f32;
        if backend.supported_languages().contains(&language) {
            score += 0.3;
        }
        let caps = backend.capabilities();
        if caps.supports_g2p {
            score += 0.1;
        }
        let is_english = language.starts_with("en");
        if is_english && caps.supports_stress {
            score += 0.1;
        }
        if is_english && backend.name() == "english-lexicon" {
            score += 0.2;
        }
        score.min(1.0)
    }

    /// Highest-scoring backend registered for exactly `language`; ties
    /// break toward earlier registration.
    pub fn best_backend(&self, language: &str) -> Option<Arc<dyn PhonemizerBackend>> {
        let candidates = self.backends.get(language)?;
        let mut best: Option<(f32, &Arc<dyn PhonemizerBackend>)> = None;
        for backend in candidates {
            let score = self.quality_score(language, backend.as_ref());
            match best {
                Some((top, _)) if score <= top => {}
                _ => best = Some((score, backend)),
            }
        }
        best.map(|(_, backend)| Arc::clone(backend))
    }

    /// Resolve a request language to a backend: exact match, then the
    /// explicit fallback chain, then group similarity.
    pub fn resolve(&self, language: &str) -> Option<Resolution> {
        self.resolve_excluding(language, &HashSet::new())
    }

    /// Like [`resolve`](Self::resolve) but never lands on an excluded
    /// language; used for the retry after a backend failure.
    pub fn resolve_excluding(
        &self,
        language: &str,
        excluded: &HashSet<String>,
    ) -> Option<Resolution> {
        let mut visited = HashSet::new();
        if let Some(resolution) = self.resolve_chain(language, excluded, &mut visited, 0) {
            return Some(resolution);
        }
        self.resolve_by_group(language, excluded)
    }

    fn resolve_chain(
        &self,
        language: &str,
        excluded: &HashSet<String>,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Option<Resolution> {
        if depth > MAX_FALLBACK_DEPTH || !visited.insert(language.to_string()) {
            return None;
        }

        if !excluded.contains(language) {
            if let Some(backend) = self.best_backend(language) {
                return Some(Resolution {
                    language: language.to_string(),
                    backend,
                    fallback_reason: if depth == 0 {
                        None
                    } else {
                        Some(format!("fallback chain reached '{language}'"))
                    },
                });
            }
        }

        let chain = self
            .chains
            .read()
            .ok()
            .and_then(|chains| chains.get(language).cloned())
            .unwrap_or_default();
        for next in chain {
            if let Some(resolution) = self.resolve_chain(&next, excluded, visited, depth + 1) {
                return Some(resolution);
            }
        }
        None
    }

    fn resolve_by_group(&self, language: &str, excluded: &HashSet<String>) -> Option<Resolution> {
        let mut best: Option<(f32, &str)> = None;
        for candidate in &self.language_order {
            if candidate == language || excluded.contains(candidate) {
                continue;
            }
            let similarity = self.similarity(language, candidate);
            if similarity <= 0.0 {
                continue;
            }
            match best {
                Some((top, _)) if similarity <= top => {}
                _ => best = Some((similarity, candidate)),
            }
        }
        let (similarity, candidate) = best?;
        let backend = self.best_backend(candidate)?;
        Some(Resolution {
            language: candidate.to_string(),
            backend,
            fallback_reason: Some(format!(
                "language group similarity {similarity:.2} to '{candidate}'"
            )),
        })
    }

    /// Pairwise language similarity: 1.0 for identity, the group value for
    /// members of a shared group, otherwise 0.0.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        if a == b {
            return 1.0;
        }
        self.groups
            .iter()
            .find(|g| g.contains(a) && g.contains(b))
            .map(|g| g.similarity(a, b))
            .unwrap_or(0.0)
    }

    /// Aggregate per-language capabilities, built once after registration.
    pub fn language_capabilities(&self) -> HashMap<String, LanguageCapabilities> {
        let mut out = HashMap::new();
        for language in &self.language_order {
            let Some(backends) = self.backends.get(language) else {
                continue;
            };
            let Some(preferred) = self.best_backend(language) else {
                continue;
            };
            let (display_name, native_name) = language_names(language);
            let mut caps = LanguageCapabilities {
                language: language.clone(),
                display_name: if display_name.is_empty() {
                    language.clone()
                } else {
                    display_name.to_string()
                },
                native_name: if native_name.is_empty() {
                    language.clone()
                } else {
                    native_name.to_string()
                },
                available_backends: backends.iter().map(|b| b.name().to_string()).collect(),
                preferred_backend: preferred.name().to_string(),
                quality: self.quality_score(language, preferred.as_ref()),
                supports_ipa: false,
                supports_stress: false,
                supports_tones: false,
                supports_g2p: false,
            };
            for backend in backends {
                let c = backend.capabilities();
                caps.supports_ipa |= c.supports_ipa;
                caps.supports_stress |= c.supports_stress;
                caps.supports_tones |= c.supports_tones;
                caps.supports_g2p |= c.supports_g2p;
            }
            out.insert(language.clone(), caps);
        }
        out
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::english::EnglishPhonemizer;
    use crate::engines::korean::KoreanPhonemizer;
    use crate::engines::spanish::SpanishPhonemizer;

    fn registry() -> BackendRegistry {
        let mut r = BackendRegistry::new();
        r.register(Arc::new(KoreanPhonemizer::new()));
        r.register(Arc::new(SpanishPhonemizer::new()));
        r.register(Arc::new(EnglishPhonemizer::new()));
        r
    }

    #[test]
    fn exact_match_has_no_fallback_reason() {
        let r = registry();
        let res = r.resolve("ko-KR").unwrap();
        assert_eq!(res.language, "ko-KR");
        assert!(res.fallback_reason.is_none());
    }

    #[test]
    fn chain_fallback_reaches_registered_language() {
        let r = registry();
        // en-IN is natively supported by the English backend, so register
        // a chain-only case instead: fr-CA has a chain to fr-FR (absent),
        // then group similarity finds a Romance neighbor.
        let res = r.resolve("pt-BR").unwrap();
        // pt-PT is unregistered; the chain continues to es-ES.
        assert_eq!(res.language, "es-ES");
        assert!(res.fallback_reason.unwrap().contains("fallback chain"));
    }

    #[test]
    fn group_similarity_when_no_chain_applies() {
        let r = registry();
        let res = r.resolve("it-IT").unwrap();
        assert_eq!(res.language, "es-ES");
        assert!(res
            .fallback_reason
            .unwrap()
            .contains("language group similarity"));
    }

    #[test]
    fn unrelated_language_does_not_resolve() {
        let r = registry();
        assert!(r.resolve("ar-SA").is_none());
    }

    #[test]
    fn cyclic_chains_terminate() {
        let r = registry();
        r.set_fallback_chain("xx-XX", vec!["yy-YY".to_string()]);
        r.set_fallback_chain("yy-YY", vec!["xx-XX".to_string()]);
        assert!(r.resolve("xx-XX").is_none());
    }

    #[test]
    fn excluded_language_is_skipped_on_retry() {
        let r = registry();
        let mut excluded = HashSet::new();
        excluded.insert("es-ES".to_string());
        let res = r.resolve_excluding("es-MX", &excluded);
        // es-MX itself is natively registered by the Spanish backend.
        assert_eq!(res.unwrap().language, "es-MX");

        excluded.insert("es-MX".to_string());
        excluded.insert("es-AR".to_string());
        assert!(r.resolve_excluding("es-MX", &excluded).is_none());
    }

    #[test]
    fn english_lexicon_scores_specialization_bonus() {
        let r = registry();
        let english = r.best_backend("en-US").unwrap();
        let score = r.quality_score("en-US", english.as_ref());
        // 0.5 base + 0.3 native + 0.1 g2p + 0.1 stress + 0.2 bonus, capped
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn similarity_is_symmetric_with_group_default() {
        let r = registry();
        assert_eq!(r.similarity("en-US", "en-GB"), 0.95);
        assert_eq!(r.similarity("en-GB", "en-US"), 0.95);
        // Explicit cross-language values within the East Asian group.
        assert_eq!(r.similarity("ja-JP", "zh-CN"), 0.30);
        assert_eq!(r.similarity("ko-KR", "ja-JP"), 0.25);
        // Pairs without an explicit value take the in-group default.
        assert_eq!(r.similarity("ko-KR", "zh-CN"), 0.5);
        assert_eq!(r.similarity("ko-KR", "es-ES"), 0.0);
        assert_eq!(r.similarity("ko-KR", "ko-KR"), 1.0);
    }

    #[test]
    fn capabilities_aggregate_backend_flags() {
        let r = registry();
        let caps = r.language_capabilities();
        let ko = &caps["ko-KR"];
        assert_eq!(ko.preferred_backend, "korean-rules");
        assert!(ko.supports_ipa);
        assert!(!ko.supports_tones);
        assert_eq!(ko.native_name, "한국어");
        let en = &caps["en-US"];
        assert!(en.supports_stress);
        assert_eq!(en.quality, 1.0);
    }
}
