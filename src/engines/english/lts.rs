//! Compact letter-to-sound rules for out-of-dictionary English words.
//!
//! A digraph pass followed by single-letter defaults, emitting ARPABET.
//! This is a coverage net for names and neologisms, not a replacement for
//! the lexicon; dictionary entries always win.

fn is_vowel_letter(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Generate ARPABET phonemes for a lower-cased word.
pub fn word_to_arpabet(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    let mut out: Vec<&'static str> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        if let Some(n) = next {
            let digraph = match (ch, n) {
                ('t', 'h') => Some(&["TH"][..]),
                ('s', 'h') => Some(&["SH"][..]),
                ('c', 'h') => Some(&["CH"][..]),
                ('p', 'h') => Some(&["F"][..]),
                ('w', 'h') => Some(&["W"][..]),
                ('c', 'k') => Some(&["K"][..]),
                ('n', 'g') => Some(&["NG"][..]),
                ('q', 'u') => Some(&["K", "W"][..]),
                ('e', 'e') => Some(&["IY1"][..]),
                ('e', 'a') => Some(&["IY1"][..]),
                ('o', 'o') => Some(&["UW1"][..]),
                ('o', 'a') => Some(&["OW1"][..]),
                ('o', 'u') => Some(&["AW1"][..]),
                ('a', 'i') | ('a', 'y') => Some(&["EY1"][..]),
                _ => None,
            };
            if let Some(phonemes) = digraph {
                out.extend_from_slice(phonemes);
                i += 2;
                continue;
            }
        }

        // Magic e: vowel + single consonant + final silent e lengthens
        // the vowel (late, time, note, cute).
        let magic_e = next.is_some_and(|n| !is_vowel_letter(n) && n != 'y')
            && chars.get(i + 2) == Some(&'e')
            && i + 2 == chars.len() - 1;
        if magic_e {
            let long = match ch {
                'a' => Some("EY1"),
                'i' => Some("AY1"),
                'o' => Some("OW1"),
                'u' => Some("UW1"),
                _ => None,
            };
            if let Some(phoneme) = long {
                out.push(phoneme);
                i += 1;
                continue;
            }
        }

        let phoneme: &[&str] = match ch {
            'a' => &["AE1"],
            'b' => &["B"],
            'c' => {
                if next.is_some_and(|n| matches!(n, 'e' | 'i' | 'y')) {
                    &["S"]
                } else {
                    &["K"]
                }
            }
            'd' => &["D"],
            'e' => {
                // Final e is usually silent once the word has another vowel.
                let last = i == chars.len() - 1;
                let has_earlier_vowel = chars[..i].iter().any(|&c| is_vowel_letter(c));
                if last && has_earlier_vowel {
                    &[]
                } else {
                    &["EH1"]
                }
            }
            'f' => &["F"],
            'g' => &["G"],
            'h' => &["HH"],
            'i' => &["IH1"],
            'j' => &["JH"],
            'k' => &["K"],
            'l' => &["L"],
            'm' => &["M"],
            'n' => &["N"],
            'o' => &["AA1"],
            'p' => &["P"],
            'q' => &["K"],
            'r' => &["R"],
            's' => &["S"],
            't' => &["T"],
            'u' => &["AH1"],
            'v' => &["V"],
            'w' => &["W"],
            'x' => &["K", "S"],
            'y' => {
                if i == 0 {
                    &["Y"]
                } else {
                    &["IY0"]
                }
            }
            'z' => &["Z"],
            _ => &[],
        };
        out.extend_from_slice(phoneme);
        i += 1;
    }

    out.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digraphs_map_as_units() {
        assert_eq!(word_to_arpabet("thin"), vec!["TH", "IH1", "N"]);
        assert_eq!(word_to_arpabet("ship"), vec!["SH", "IH1", "P"]);
        assert_eq!(word_to_arpabet("sing"), vec!["S", "IH1", "NG"]);
    }

    #[test]
    fn soft_c_before_front_vowels() {
        assert_eq!(word_to_arpabet("cell")[0], "S");
        assert_eq!(word_to_arpabet("cat")[0], "K");
    }

    #[test]
    fn silent_final_e() {
        assert_eq!(word_to_arpabet("late"), vec!["L", "EY1", "T"]);
        // A lone "e" still sounds.
        assert_eq!(word_to_arpabet("be"), vec!["B", "EH1"]);
    }

    #[test]
    fn initial_y_is_a_consonant() {
        assert_eq!(word_to_arpabet("yes"), vec!["Y", "EH1", "S"]);
        assert_eq!(word_to_arpabet("happy").last().unwrap(), "IY0");
    }

    #[test]
    fn x_expands_to_two_phonemes() {
        assert_eq!(word_to_arpabet("box"), vec!["B", "AA1", "K", "S"]);
    }
}
