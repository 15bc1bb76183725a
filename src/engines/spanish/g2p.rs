//! Spanish letter-to-IPA rules.
//!
//! Spanish orthography is close to phonemic, so a single left-to-right scan
//! with digraph lookahead and a little phonetic context (intervocalic
//! lenition, rolled vs tapped r) covers it. Dialect differences are a
//! configuration tag, not separate rule sets.

/// Regional pronunciation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanishDialect {
    /// Peninsular Spanish: distinción (c/z as θ) and ll as ʎ.
    #[default]
    Castilian,
    /// Seseo (c/z as s) and yeísmo (ll as j).
    LatinAmerican,
    /// Seseo plus sheísmo: ll and consonantal y as ʃ.
    Argentine,
}

impl SpanishDialect {
    /// Map a language tag to its dialect. Unknown `es-*` tags default to
    /// Latin American, the most widespread variant.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        match tag.as_str() {
            "es-es" | "es" => SpanishDialect::Castilian,
            "es-ar" | "es-uy" => SpanishDialect::Argentine,
            _ if tag.starts_with("es-") => SpanishDialect::LatinAmerican,
            _ => SpanishDialect::Castilian,
        }
    }

    fn ll(&self) -> &'static str {
        match self {
            SpanishDialect::Castilian => "ʎ",
            SpanishDialect::LatinAmerican => "j",
            SpanishDialect::Argentine => "ʃ",
        }
    }

    fn consonant_y(&self) -> &'static str {
        match self {
            SpanishDialect::Castilian | SpanishDialect::LatinAmerican => "j",
            SpanishDialect::Argentine => "ʃ",
        }
    }

    fn soft_c(&self) -> &'static str {
        match self {
            SpanishDialect::Castilian => "θ",
            _ => "s",
        }
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(
        ch,
        'a' | 'e' | 'i' | 'o' | 'u' | 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü'
    )
}

fn is_accented(ch: char) -> bool {
    matches!(ch, 'á' | 'é' | 'í' | 'ó' | 'ú')
}

fn vowel_phoneme(ch: char) -> &'static str {
    match ch {
        'a' | 'á' => "a",
        'e' | 'é' => "e",
        'i' | 'í' => "i",
        'o' | 'ó' => "o",
        'u' | 'ú' | 'ü' => "u",
        _ => "",
    }
}

/// Convert one lower-cased word to IPA tokens.
///
/// When `include_stress` is set, a `ˈ` token is inserted before the
/// stressed vowel: a written accent decides; otherwise words ending in a
/// vowel, `n`, or `s` stress the penultimate vowel and the rest stress the
/// last one. No syllabification is attempted.
pub fn word_to_phonemes(word: &str, dialect: SpanishDialect, include_stress: bool) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out: Vec<String> = Vec::new();
    let mut vowel_slots: Vec<usize> = Vec::new();
    let mut accented_slot: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };

        // Digraphs take priority over single letters.
        if let Some(n) = next {
            let consumed = match (ch, n) {
                ('c', 'h') => Some("tʃ"),
                ('l', 'l') => Some(dialect.ll()),
                ('r', 'r') => Some("r"),
                ('q', 'u') if chars.get(i + 2).is_some_and(|&c| matches!(c, 'e' | 'i' | 'é' | 'í')) => {
                    Some("k")
                }
                ('g', 'u') if chars.get(i + 2).is_some_and(|&c| matches!(c, 'e' | 'i' | 'é' | 'í')) => {
                    Some("g")
                }
                _ => None,
            };
            if let Some(phoneme) = consumed {
                out.push(phoneme.to_string());
                i += 2;
                continue;
            }
            if (ch, n) == ('g', 'ü') {
                out.push("g".to_string());
                out.push("w".to_string());
                i += 2;
                continue;
            }
        }

        if is_vowel(ch) {
            let slot = out.len();
            out.push(vowel_phoneme(ch).to_string());
            vowel_slots.push(slot);
            if is_accented(ch) {
                accented_slot = Some(slot);
            }
            i += 1;
            continue;
        }

        let intervocalic =
            prev.is_some_and(is_vowel) && next.is_some_and(is_vowel);
        let phoneme: &str = match ch {
            'b' | 'v' => {
                if intervocalic {
                    "β"
                } else {
                    "b"
                }
            }
            'c' => {
                if next.is_some_and(|n| matches!(n, 'e' | 'i' | 'é' | 'í')) {
                    dialect.soft_c()
                } else {
                    "k"
                }
            }
            'd' => {
                if intervocalic {
                    "ð"
                } else {
                    "d"
                }
            }
            'f' => "f",
            'g' => {
                if next.is_some_and(|n| matches!(n, 'e' | 'i' | 'é' | 'í')) {
                    "x"
                } else if intervocalic {
                    "ɣ"
                } else {
                    "g"
                }
            }
            'h' => "", // silent
            'j' => "x",
            'k' => "k",
            'l' => "l",
            'm' => "m",
            'n' => "n",
            'ñ' => "ɲ",
            'p' => "p",
            'q' => "k",
            'r' => {
                let rolled = i == 0 || prev.is_some_and(|p| matches!(p, 'l' | 'n' | 's'));
                if rolled {
                    "r"
                } else {
                    "ɾ"
                }
            }
            's' => "s",
            't' => "t",
            'w' => "w",
            'x' => "ks",
            'y' => {
                if next.is_some_and(is_vowel) {
                    dialect.consonant_y()
                } else {
                    // vocalic y: "hoy", "y"
                    let slot = out.len();
                    vowel_slots.push(slot);
                    "i"
                }
            }
            'z' => match dialect {
                SpanishDialect::Castilian => "θ",
                _ => "s",
            },
            _ => "",
        };
        if !phoneme.is_empty() {
            out.push(phoneme.to_string());
        }
        i += 1;
    }

    if include_stress && !vowel_slots.is_empty() {
        let stressed = accented_slot.unwrap_or_else(|| {
            let open_ending = chars
                .last()
                .is_some_and(|&c| is_vowel(c) || c == 'n' || c == 's');
            if open_ending && vowel_slots.len() >= 2 {
                vowel_slots[vowel_slots.len() - 2]
            } else {
                vowel_slots[vowel_slots.len() - 1]
            }
        });
        out.insert(stressed, "ˈ".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipa(word: &str) -> Vec<String> {
        word_to_phonemes(word, SpanishDialect::Castilian, false)
    }

    #[test]
    fn intervocalic_b_lenites() {
        assert_eq!(ipa("cabo"), vec!["k", "a", "β", "o"]);
        assert_eq!(ipa("boca"), vec!["b", "o", "k", "a"]);
    }

    #[test]
    fn intervocalic_d_and_g_lenite() {
        assert_eq!(ipa("cada"), vec!["k", "a", "ð", "a"]);
        assert_eq!(ipa("lago"), vec!["l", "a", "ɣ", "o"]);
    }

    #[test]
    fn c_palatalizes_before_front_vowels() {
        assert_eq!(ipa("cena"), vec!["θ", "e", "n", "a"]);
        assert_eq!(ipa("casa"), vec!["k", "a", "s", "a"]);
    }

    #[test]
    fn seseo_in_latin_american_dialect() {
        let phonemes = word_to_phonemes("cena", SpanishDialect::LatinAmerican, false);
        assert_eq!(phonemes, vec!["s", "e", "n", "a"]);
        let zeta = word_to_phonemes("zapato", SpanishDialect::LatinAmerican, false);
        assert_eq!(zeta[0], "s");
    }

    #[test]
    fn ll_varies_by_dialect() {
        assert_eq!(ipa("calle"), vec!["k", "a", "ʎ", "e"]);
        assert_eq!(
            word_to_phonemes("calle", SpanishDialect::LatinAmerican, false),
            vec!["k", "a", "j", "e"]
        );
        assert_eq!(
            word_to_phonemes("calle", SpanishDialect::Argentine, false),
            vec!["k", "a", "ʃ", "e"]
        );
    }

    #[test]
    fn silent_u_in_que_and_gue() {
        assert_eq!(ipa("queso"), vec!["k", "e", "s", "o"]);
        assert_eq!(ipa("guerra"), vec!["g", "e", "r", "a"]);
        assert_eq!(ipa("pingüino"), vec!["p", "i", "n", "g", "w", "i", "n", "o"]);
    }

    #[test]
    fn rolled_r_word_initially_and_after_l_n_s() {
        assert_eq!(ipa("rosa")[0], "r");
        assert_eq!(ipa("honra"), vec!["o", "n", "r", "a"]);
        assert_eq!(ipa("pero"), vec!["p", "e", "ɾ", "o"]);
        assert_eq!(ipa("perro"), vec!["p", "e", "r", "o"]);
    }

    #[test]
    fn h_is_silent_and_j_is_velar() {
        assert_eq!(ipa("hijo"), vec!["i", "x", "o"]);
    }

    #[test]
    fn y_is_glide_before_vowel_and_vowel_finally() {
        assert_eq!(ipa("yo"), vec!["j", "o"]);
        assert_eq!(ipa("hoy"), vec!["o", "i"]);
        assert_eq!(
            word_to_phonemes("yo", SpanishDialect::Argentine, false),
            vec!["ʃ", "o"]
        );
    }

    #[test]
    fn written_accent_places_stress() {
        let phonemes = word_to_phonemes("café", SpanishDialect::Castilian, true);
        assert_eq!(phonemes, vec!["k", "a", "f", "ˈ", "e"]);
    }

    #[test]
    fn default_stress_falls_on_penultimate_for_open_endings() {
        // "casa" ends in a vowel: penultimate vowel carries stress
        let phonemes = word_to_phonemes("casa", SpanishDialect::Castilian, true);
        assert_eq!(phonemes, vec!["k", "ˈ", "a", "s", "a"]);
        // "papel" ends in a consonant other than n/s: final vowel
        let phonemes = word_to_phonemes("papel", SpanishDialect::Castilian, true);
        assert_eq!(phonemes, vec!["p", "a", "p", "ˈ", "e", "l"]);
    }

    #[test]
    fn dialect_tags_map_to_variants() {
        assert_eq!(SpanishDialect::from_tag("es-ES"), SpanishDialect::Castilian);
        assert_eq!(
            SpanishDialect::from_tag("es-MX"),
            SpanishDialect::LatinAmerican
        );
        assert_eq!(SpanishDialect::from_tag("es-AR"), SpanishDialect::Argentine);
    }
}
