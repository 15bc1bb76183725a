//! Hangul syllable decomposition.
//!
//! Precomposed syllables live in the block U+AC00..=U+D7A3 and decompose
//! arithmetically: `code - 0xAC00 = (initial * 21 + medial) * 28 + final`.

const HANGUL_BASE: u32 = 0xAC00;
const INITIAL_COUNT: u32 = 19;
const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

/// Romanized initial consonants (choseong), indexed by jamo position.
pub const INITIALS: [&str; 19] = [
    "g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s", "ss", "", "j", "jj", "ch", "k", "t", "p",
    "h",
];

/// Romanized medial vowels (jungseong).
pub const MEDIALS: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we",
    "wi", "yu", "eu", "ui", "i",
];

/// Romanized final consonants (jongseong); index 0 is the empty final.
pub const FINALS: [&str; 28] = [
    "", "g", "kk", "gs", "n", "nj", "nh", "d", "l", "lg", "lm", "lb", "ls", "lt", "lp", "lh", "m",
    "b", "bs", "s", "ss", "ng", "j", "ch", "k", "t", "p", "h",
];

/// One decomposed Hangul syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jamo {
    pub initial: &'static str,
    pub medial: &'static str,
    pub final_: &'static str,
}

impl Jamo {
    pub fn has_final(&self) -> bool {
        !self.final_.is_empty()
    }
}

/// True for precomposed Hangul syllables.
pub fn is_hangul_syllable(ch: char) -> bool {
    let code = ch as u32;
    (HANGUL_BASE..HANGUL_BASE + INITIAL_COUNT * MEDIAL_COUNT * FINAL_COUNT).contains(&code)
}

/// Decompose a precomposed syllable into its jamo.
pub fn decompose(ch: char) -> Option<Jamo> {
    if !is_hangul_syllable(ch) {
        return None;
    }
    let offset = ch as u32 - HANGUL_BASE;
    let initial = offset / (MEDIAL_COUNT * FINAL_COUNT);
    let medial = (offset % (MEDIAL_COUNT * FINAL_COUNT)) / FINAL_COUNT;
    let final_ = offset % FINAL_COUNT;
    Some(Jamo {
        initial: INITIALS[initial as usize],
        medial: MEDIALS[medial as usize],
        final_: FINALS[final_ as usize],
    })
}
