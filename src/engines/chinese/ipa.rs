//! Pinyin syllable to IPA conversion.
//!
//! A numbered pinyin syllable like `zhong1` splits into initial (声母) and
//! final (韵母); each side maps through a fixed table and the trailing tone
//! digit becomes a contour mark. A missing digit reads as the neutral tone.

/// Initials tried longest-first when splitting a syllable.
const INITIALS: [&str; 23] = [
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "z",
    "c", "s", "r", "y", "w",
];

fn initial_ipa(initial: &str) -> Option<&'static str> {
    Some(match initial {
        "b" => "p",
        "p" => "pʰ",
        "m" => "m",
        "f" => "f",
        "d" => "t",
        "t" => "tʰ",
        "n" => "n",
        "l" => "l",
        "g" => "k",
        "k" => "kʰ",
        "h" => "x",
        "j" => "tɕ",
        "q" => "tɕʰ",
        "x" => "ɕ",
        "zh" => "ʈʂ",
        "ch" => "ʈʂʰ",
        "sh" => "ʂ",
        "r" => "ʐ",
        "z" => "ts",
        "c" => "tsʰ",
        "s" => "s",
        "y" => "j",
        "w" => "w",
        _ => return None,
    })
}

fn final_ipa(final_: &str) -> Option<&'static str> {
    Some(match final_ {
        "a" => "a",
        "o" => "o",
        "e" => "ɤ",
        "i" => "i",
        "u" => "u",
        "ü" => "y",
        "er" => "ɚ",
        "ai" => "a i",
        "ei" => "e i",
        "ui" => "u e i",
        "ao" => "a u",
        "ou" => "o u",
        "iu" => "i o u",
        "ie" => "i e",
        "üe" => "y e",
        "ue" => "u e",
        "an" => "a n",
        "en" => "ə n",
        "in" => "i n",
        "un" => "u ə n",
        "ün" => "y n",
        "ang" => "a ŋ",
        "eng" => "ə ŋ",
        "ing" => "i ŋ",
        "ong" => "u ŋ",
        "ian" => "i ɛ n",
        "uan" => "u a n",
        "üan" => "y ɛ n",
        "iang" => "i a ŋ",
        "uang" => "u a ŋ",
        "iong" => "i u ŋ",
        "ueng" => "u ə ŋ",
        "ia" => "i a",
        "ua" => "u a",
        "uo" => "u o",
        "uai" => "u a i",
        "uei" => "u e i",
        _ => return None,
    })
}

/// Contour mark for a tone digit (neutral tone has none).
pub fn tone_mark(tone: char) -> &'static str {
    match tone {
        '1' => "˥",
        '2' => "˧˥",
        '3' => "˨˩˦",
        '4' => "˥˩",
        _ => "",
    }
}

fn split_syllable(syllable: &str) -> (&'static str, &str) {
    for initial in INITIALS {
        if let Some(rest) = syllable.strip_prefix(initial) {
            if !rest.is_empty() {
                return (initial, rest);
            }
        }
    }
    ("", syllable)
}

/// Convert a numbered pinyin syllable to IPA tokens.
///
/// Returns `None` for input that is not pinyin at all (no mappable initial
/// or final), so callers can degrade instead of emitting garbage.
pub fn syllable_to_ipa(pinyin: &str, include_tone: bool) -> Option<Vec<String>> {
    if pinyin.is_empty() {
        return None;
    }

    let (syllable, tone) = match pinyin.chars().last() {
        Some(last) if last.is_ascii_digit() => (&pinyin[..pinyin.len() - 1], last),
        _ => (pinyin, '5'),
    };

    let mut tokens: Vec<String> = Vec::new();

    match syllable {
        // Syllabic fricative vowels: the "i" here is not the high front vowel.
        "zhi" | "chi" | "shi" | "ri" => {
            let (initial, _) = split_syllable(syllable);
            tokens.push(initial_ipa(initial)?.to_string());
            tokens.push("ʅ".to_string());
        }
        "zi" | "ci" | "si" => {
            let (initial, _) = split_syllable(syllable);
            tokens.push(initial_ipa(initial)?.to_string());
            tokens.push("ɿ".to_string());
        }
        "er" => tokens.push("ɚ".to_string()),
        _ => {
            let (initial, final_) = split_syllable(syllable);
            if !initial.is_empty() {
                match initial_ipa(initial) {
                    Some(ipa) => tokens.push(ipa.to_string()),
                    None => return None,
                }
            }
            if !final_.is_empty() {
                let replaced;
                let final_ = if final_.contains('v') {
                    replaced = final_.replace('v', "ü");
                    replaced.as_str()
                } else {
                    final_
                };
                match final_ipa(final_) {
                    Some(ipa) => {
                        tokens.extend(ipa.split(' ').map(str::to_string));
                    }
                    None => {
                        log::warn!("unknown pinyin final {final_:?} in {pinyin:?}");
                        return None;
                    }
                }
            }
            if tokens.is_empty() {
                return None;
            }
        }
    }

    if include_tone {
        let mark = tone_mark(tone);
        if !mark.is_empty() {
            tokens.push(mark.to_string());
        }
    }

    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_aspirated_and_unaspirated_stops() {
        assert_eq!(syllable_to_ipa("ba1", false).unwrap(), vec!["p", "a"]);
        assert_eq!(syllable_to_ipa("pa1", false).unwrap(), vec!["pʰ", "a"]);
    }

    #[test]
    fn maps_retroflex_and_palatal_series() {
        assert_eq!(
            syllable_to_ipa("zhong1", false).unwrap(),
            vec!["ʈʂ", "u", "ŋ"]
        );
        assert_eq!(syllable_to_ipa("xi3", false).unwrap(), vec!["ɕ", "i"]);
        assert_eq!(syllable_to_ipa("jiu3", false).unwrap(), vec!["tɕ", "i", "o", "u"]);
    }

    #[test]
    fn syllabic_vowels_after_sibilants() {
        assert_eq!(syllable_to_ipa("shi4", false).unwrap(), vec!["ʂ", "ʅ"]);
        assert_eq!(syllable_to_ipa("zi5", false).unwrap(), vec!["ts", "ɿ"]);
    }

    #[test]
    fn tone_marks_follow_the_syllable() {
        assert_eq!(
            syllable_to_ipa("ma1", true).unwrap(),
            vec!["m", "a", "˥"]
        );
        assert_eq!(
            syllable_to_ipa("ma3", true).unwrap(),
            vec!["m", "a", "˨˩˦"]
        );
        // Neutral tone adds nothing.
        assert_eq!(syllable_to_ipa("ma5", true).unwrap(), vec!["m", "a"]);
    }

    #[test]
    fn missing_tone_digit_reads_as_neutral() {
        assert_eq!(syllable_to_ipa("de", true).unwrap(), vec!["t", "ɤ"]);
    }

    #[test]
    fn erhua_syllable() {
        assert_eq!(syllable_to_ipa("er2", false).unwrap(), vec!["ɚ"]);
    }

    #[test]
    fn v_substitutes_for_umlaut_u() {
        assert_eq!(syllable_to_ipa("nv3", false).unwrap(), vec!["n", "y"]);
    }

    #[test]
    fn non_pinyin_input_is_rejected() {
        assert!(syllable_to_ipa("qqq", false).is_none());
        assert!(syllable_to_ipa("", false).is_none());
    }
}
