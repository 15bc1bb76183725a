//! Chinese text to numbered pinyin.
//!
//! Phrase-aware conversion: longest dictionary phrase first (4 down to 2
//! characters), then per-character lookup with context rules for the common
//! multi-tone characters 不, 一, and 了. Characters with no reading are
//! logged and skipped so downstream IPA mapping never sees garbage.

use super::dictionary::{is_chinese_char, PinyinDictionary};

/// One converted unit of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinyinToken {
    /// A numbered pinyin syllable, e.g. `"zhong1"`.
    Syllable(String),
    /// A non-Chinese character passed through untouched.
    Other(char),
}

/// Convert text to pinyin tokens.
pub fn text_to_pinyin(text: &str, dict: &PinyinDictionary) -> Vec<PinyinToken> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if let Some(consumed) = match_phrase(&chars[i..], dict, &mut tokens) {
            i += consumed;
            continue;
        }

        let ch = chars[i];
        if is_chinese_char(ch) {
            match dict.character_pinyin(ch) {
                Some(readings) => {
                    let pinyin = select_reading(ch, readings, &chars, i, dict);
                    tokens.push(PinyinToken::Syllable(pinyin));
                }
                None => {
                    log::warn!("no pinyin reading for character {ch:?} (U+{:04X})", ch as u32);
                }
            }
        } else {
            tokens.push(PinyinToken::Other(ch));
        }
        i += 1;
    }

    tokens
}

/// Try the longest phrase match at the head of `rest`. Returns the number
/// of characters consumed.
fn match_phrase(
    rest: &[char],
    dict: &PinyinDictionary,
    tokens: &mut Vec<PinyinToken>,
) -> Option<usize> {
    let max_len = rest.len().min(4);
    for len in (2..=max_len).rev() {
        if !rest[..len].iter().all(|&c| is_chinese_char(c)) {
            continue;
        }
        let phrase: String = rest[..len].iter().collect();
        if let Some(syllables) = dict.phrase_pinyin(&phrase) {
            tokens.extend(
                syllables
                    .iter()
                    .map(|s| PinyinToken::Syllable(s.clone())),
            );
            return Some(len);
        }
    }
    None
}

/// Pick a reading for a multi-tone character from its sentence context.
fn select_reading(
    ch: char,
    readings: &[String],
    chars: &[char],
    index: usize,
    dict: &PinyinDictionary,
) -> String {
    let next_reading = chars
        .get(index + 1)
        .filter(|&&c| is_chinese_char(c))
        .and_then(|&c| dict.character_pinyin(c))
        .and_then(|r| r.first());

    match ch {
        // 不 becomes second tone before a fourth-tone syllable.
        '不' => match next_reading {
            Some(next) if next.ends_with('4') => "bu2".to_string(),
            _ => "bu4".to_string(),
        },
        // 一 is second tone before a fourth tone, fourth tone before others,
        // and first tone in isolation.
        '一' => match next_reading {
            Some(next) if next.ends_with('4') => "yi2".to_string(),
            Some(_) => "yi4".to_string(),
            None => "yi1".to_string(),
        },
        // Sentence-final 了 is the neutral-tone particle.
        '了' => {
            if index > 0 && index == chars.len() - 1 {
                "le5".to_string()
            } else {
                "liao3".to_string()
            }
        }
        _ => readings[0].clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syllables(tokens: &[PinyinToken]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                PinyinToken::Syllable(s) => Some(s.as_str()),
                PinyinToken::Other(_) => None,
            })
            .collect()
    }

    #[test]
    fn phrase_match_beats_per_character_lookup() {
        let dict = PinyinDictionary::builtin();
        let tokens = text_to_pinyin("中国人", &dict);
        assert_eq!(syllables(&tokens), vec!["zhong1", "guo2", "ren2"]);
    }

    #[test]
    fn falls_back_to_character_readings() {
        let dict = PinyinDictionary::builtin();
        let tokens = text_to_pinyin("我是", &dict);
        assert_eq!(syllables(&tokens), vec!["wo3", "shi4"]);
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let dict = PinyinDictionary::builtin();
        let tokens = text_to_pinyin("我猫", &dict);
        assert_eq!(syllables(&tokens), vec!["wo3"]);
    }

    #[test]
    fn non_chinese_characters_pass_through() {
        let dict = PinyinDictionary::builtin();
        let tokens = text_to_pinyin("我a", &dict);
        assert_eq!(
            tokens,
            vec![
                PinyinToken::Syllable("wo3".to_string()),
                PinyinToken::Other('a'),
            ]
        );
    }

    #[test]
    fn bu_sandhi_before_fourth_tone() {
        let dict = PinyinDictionary::builtin();
        // 是 is shi4, a fourth tone: 不 shifts to bu2
        assert_eq!(syllables(&text_to_pinyin("不是", &dict)), vec!["bu2", "shi4"]);
        // 好 is hao3: 不 stays bu4
        assert_eq!(syllables(&text_to_pinyin("不好", &dict)), vec!["bu4", "hao3"]);
    }

    #[test]
    fn yi_sandhi_depends_on_following_tone() {
        let dict = PinyinDictionary::builtin();
        assert_eq!(syllables(&text_to_pinyin("一个", &dict))[0], "yi1");
        assert_eq!(syllables(&text_to_pinyin("一天", &dict))[0], "yi4");
        assert_eq!(syllables(&text_to_pinyin("一是", &dict))[0], "yi2");
        assert_eq!(syllables(&text_to_pinyin("一", &dict)), vec!["yi1"]);
    }

    #[test]
    fn le_particle_at_sentence_end() {
        let dict = PinyinDictionary::builtin();
        assert_eq!(syllables(&text_to_pinyin("好了", &dict)), vec!["hao3", "le5"]);
        assert_eq!(syllables(&text_to_pinyin("了", &dict)), vec!["liao3"]);
    }
}
