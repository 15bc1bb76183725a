//! Korean grapheme-to-phoneme rules over decomposed jamo.
//!
//! Plain stops surface as voiceless word-initially and voiced between
//! voiced sounds. A final consonant resurfaces as its liaison form when the
//! next syllable starts with the empty initial, and neutralizes to an
//! unreleased coda otherwise.

use super::hangul::{decompose, Jamo};

/// IPA for an initial consonant. `word_initial` selects the voiceless
/// allophone of the plain stops.
pub fn initial_phoneme(initial: &str, word_initial: bool) -> &'static str {
    match initial {
        "" => "",
        "g" => {
            if word_initial {
                "k"
            } else {
                "g"
            }
        }
        "d" => {
            if word_initial {
                "t"
            } else {
                "d"
            }
        }
        "b" => {
            if word_initial {
                "p"
            } else {
                "b"
            }
        }
        "j" => {
            if word_initial {
                "tɕ"
            } else {
                "dʑ"
            }
        }
        "kk" => "k͈",
        "n" => "n",
        "tt" => "t͈",
        "r" => "ɾ",
        "m" => "m",
        "pp" => "p͈",
        "s" => "s",
        "ss" => "s͈",
        "jj" => "t͈ɕ",
        "ch" => "tɕʰ",
        "k" => "kʰ",
        "t" => "tʰ",
        "p" => "pʰ",
        "h" => "h",
        _ => "",
    }
}

/// IPA for a medial vowel. Diphthongs expand to glide + vowel.
pub fn medial_phonemes(medial: &str) -> &'static [&'static str] {
    match medial {
        "a" => &["a"],
        "ae" => &["ɛ"],
        "eo" => &["ʌ"],
        "e" => &["e"],
        "o" => &["o"],
        "u" => &["u"],
        "eu" => &["ɯ"],
        "i" => &["i"],
        "ya" => &["j", "a"],
        "yae" => &["j", "ɛ"],
        "yeo" => &["j", "ʌ"],
        "ye" => &["j", "e"],
        "yo" => &["j", "o"],
        "yu" => &["j", "u"],
        "wa" => &["w", "a"],
        "wae" => &["w", "ɛ"],
        "wo" => &["w", "ʌ"],
        "we" => &["w", "e"],
        "wi" => &["w", "i"],
        "oe" => &["w", "e"],
        "ui" => &["ɰ", "i"],
        _ => &[],
    }
}

/// IPA for a final consonant. `liaison` is true when the next syllable has
/// no onset, which carries the coda over instead of neutralizing it.
pub fn final_phoneme(final_: &str, liaison: bool) -> &'static str {
    if liaison {
        match final_ {
            "g" | "kk" | "k" | "gs" => "g",
            "n" | "nj" | "nh" => "n",
            "d" | "s" | "ss" | "j" | "ch" | "t" | "h" => "d",
            "l" | "lg" | "lm" | "lb" | "ls" | "lt" | "lp" | "lh" => "ɾ",
            "m" => "m",
            "b" | "bs" | "p" => "b",
            "ng" => "ŋ",
            _ => "",
        }
    } else {
        match final_ {
            "g" | "kk" | "k" | "gs" => "k̚",
            "n" | "nj" | "nh" => "n",
            "d" | "s" | "ss" | "j" | "ch" | "t" | "h" => "t̚",
            "l" | "lg" | "lm" | "lb" | "ls" | "lt" | "lp" | "lh" => "l",
            "m" => "m",
            "b" | "bs" | "p" => "p̚",
            "ng" => "ŋ",
            _ => "",
        }
    }
}

/// Convert one run of Hangul syllables to IPA tokens.
///
/// `word_initial` marks whether the run starts a word (text start or after
/// a boundary), which conditions the first onset's voicing.
pub fn convert_run(run: &str, word_initial: bool) -> Vec<String> {
    let jamos: Vec<Jamo> = run.chars().filter_map(decompose).collect();
    let mut phonemes = Vec::new();

    for (i, jamo) in jamos.iter().enumerate() {
        let onset = initial_phoneme(jamo.initial, word_initial && i == 0);
        if !onset.is_empty() {
            phonemes.push(onset.to_string());
        }
        for vowel in medial_phonemes(jamo.medial) {
            phonemes.push(vowel.to_string());
        }
        if jamo.has_final() {
            let liaison = jamos
                .get(i + 1)
                .map(|next| next.initial.is_empty())
                .unwrap_or(false);
            let coda = final_phoneme(jamo.final_, liaison);
            if !coda.is_empty() {
                phonemes.push(coda.to_string());
            }
        }
    }

    phonemes
}
