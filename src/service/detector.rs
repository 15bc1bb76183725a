//! Script-based language detection.

use std::collections::HashMap;

/// Outcome of language detection over one input text.
#[derive(Debug, Clone)]
pub struct LanguageDetection {
    /// Best-guess language code.
    pub language: String,
    /// Share of classifiable characters backing the guess, in `[0, 1]`.
    pub confidence: f32,
    /// Per-language character scores.
    pub scores: HashMap<String, f32>,
}

/// Guesses the language of a text. Pluggable so hosts can substitute a
/// real classifier; the default only looks at scripts.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> LanguageDetection;
}

/// Default detector: classify each letter by script block and vote.
///
/// Hangul votes Korean, kana votes Japanese, CJK ideographs vote Chinese,
/// and Latin votes English unless Spanish-specific marks (ñ, ¿, accents)
/// appear. Kanji-only Japanese text is indistinguishable from Chinese
/// here; that is an accepted limit of script voting.
#[derive(Debug, Default)]
pub struct ScriptLanguageDetector;

impl ScriptLanguageDetector {
    pub fn new() -> Self {
        Self
    }
}

fn is_spanish_marker(ch: char) -> bool {
    matches!(
        ch,
        'ñ' | 'Ñ' | '¿' | '¡' | 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü'
    )
}

fn is_kana(ch: char) -> bool {
    let code = ch as u32;
    (0x3040..=0x309F).contains(&code) || (0x30A0..=0x30FF).contains(&code)
}

impl LanguageDetector for ScriptLanguageDetector {
    fn detect(&self, text: &str) -> LanguageDetection {
        let mut hangul = 0f32;
        let mut kana = 0f32;
        let mut cjk = 0f32;
        let mut latin = 0f32;
        let mut spanish_markers = 0f32;

        for ch in text.chars() {
            if crate::engines::korean::hangul::is_hangul_syllable(ch) {
                hangul += 1.0;
            } else if is_kana(ch) {
                kana += 1.0;
            } else if crate::engines::chinese::dictionary::is_chinese_char(ch) {
                cjk += 1.0;
            } else if is_spanish_marker(ch) {
                spanish_markers += 1.0;
                latin += 1.0;
            } else if ch.is_alphabetic() {
                latin += 1.0;
            }
        }

        let mut scores = HashMap::new();
        if hangul > 0.0 {
            scores.insert("ko-KR".to_string(), hangul);
        }
        if kana > 0.0 {
            scores.insert("ja-JP".to_string(), kana);
        }
        if cjk > 0.0 {
            scores.insert("zh-CN".to_string(), cjk);
        }
        if latin > 0.0 {
            let code = if spanish_markers > 0.0 { "es-ES" } else { "en-US" };
            scores.insert(code.to_string(), latin);
        }

        let total: f32 = scores.values().sum();
        let best = scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(lang, score)| (lang.clone(), *score));

        match best {
            Some((language, score)) if total > 0.0 => LanguageDetection {
                language,
                confidence: score / total,
                scores,
            },
            _ => LanguageDetection {
                language: "en-US".to_string(),
                confidence: 0.0,
                scores,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> LanguageDetection {
        ScriptLanguageDetector::new().detect(text)
    }

    #[test]
    fn detects_korean_from_hangul() {
        let d = detect("안녕하세요");
        assert_eq!(d.language, "ko-KR");
        assert!(d.confidence > 0.99);
    }

    #[test]
    fn detects_chinese_from_ideographs() {
        assert_eq!(detect("你好世界").language, "zh-CN");
    }

    #[test]
    fn detects_japanese_from_kana() {
        assert_eq!(detect("こんにちは").language, "ja-JP");
    }

    #[test]
    fn spanish_markers_flip_latin_to_spanish() {
        assert_eq!(detect("¿cómo estás?").language, "es-ES");
        assert_eq!(detect("hello world").language, "en-US");
    }

    #[test]
    fn mixed_text_votes_by_majority() {
        let d = detect("hello 안녕하세요 친구들");
        assert_eq!(d.language, "ko-KR");
        assert!(d.confidence < 1.0);
    }

    #[test]
    fn empty_text_defaults_to_english_with_zero_confidence() {
        let d = detect("12345 !!!");
        assert_eq!(d.language, "en-US");
        assert_eq!(d.confidence, 0.0);
    }
}
