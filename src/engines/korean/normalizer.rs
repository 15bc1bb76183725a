//! Korean text normalization: numbers, symbols, abbreviations, punctuation.

const DIGITS: [&str; 10] = ["영", "일", "이", "삼", "사", "오", "육", "칠", "팔", "구"];
const SMALL_UNITS: [&str; 4] = ["", "십", "백", "천"];
const GROUP_UNITS: [&str; 4] = ["", "만", "억", "조"];

/// Latin abbreviations read as Korean loanwords.
const ABBREVIATIONS: [(&str, &str); 5] = [
    ("TV", "티비"),
    ("PC", "피시"),
    ("OK", "오케이"),
    ("DVD", "디비디"),
    ("CD", "시디"),
];

/// Spell a non-negative integer in sino-Korean reading.
///
/// Groups by ten-thousands (만/억/조); the leading 일 is elided before
/// 십/백/천 inside a group (1000 reads 천, not 일천).
pub fn number_to_sino(n: u64) -> String {
    if n == 0 {
        return DIGITS[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = n;
    while rest > 0 {
        groups.push((rest % 10_000) as usize);
        rest /= 10_000;
    }

    let mut out = String::new();
    for (level, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        out.push_str(&four_digits_to_sino(group));
        out.push_str(GROUP_UNITS[level]);
    }
    out
}

fn four_digits_to_sino(n: usize) -> String {
    let mut out = String::new();
    let mut rest = n;
    for place in (0..4).rev() {
        let unit = 10usize.pow(place as u32);
        let digit = rest / unit;
        rest %= unit;
        if digit == 0 {
            continue;
        }
        // 일십/일백/일천 elide the leading 일; the bare ones digit keeps it.
        if digit != 1 || place == 0 {
            out.push_str(DIGITS[digit]);
        }
        out.push_str(SMALL_UNITS[place]);
    }
    out
}

/// Normalize text for the Korean G2P pass.
///
/// Digit runs become sino-Korean words, currency symbols attach their unit
/// word, known Latin abbreviations are respelled in Hangul, and CJK
/// punctuation is mapped to ASCII. Whitespace collapses to single spaces.
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        // Currency symbol before digits: ₩1000 reads as 천원.
        if (ch == '₩' || ch == '$') && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
            let (word, consumed) = read_number(&chars[i + 1..]);
            out.push_str(&word);
            out.push_str(if ch == '₩' { "원" } else { "달러" });
            i += 1 + consumed;
            continue;
        }

        if ch.is_ascii_digit() {
            let (word, consumed) = read_number(&chars[i..]);
            out.push_str(&word);
            i += consumed;
            continue;
        }

        if ch.is_ascii_uppercase() {
            let mut end = i;
            while end < chars.len() && chars[end].is_ascii_uppercase() {
                end += 1;
            }
            let run: String = chars[i..end].iter().collect();
            match ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == run) {
                Some((_, hangul)) => out.push_str(hangul),
                None => out.push_str(&run),
            }
            i = end;
            continue;
        }

        match ch {
            '%' => out.push_str("퍼센트"),
            '+' => out.push_str("더하기"),
            '。' | '．' => out.push('.'),
            '、' | '，' => out.push(','),
            '！' => out.push('!'),
            '？' => out.push('?'),
            '：' => out.push(':'),
            c if c.is_whitespace() => {
                if !out.ends_with(' ') && !out.is_empty() {
                    out.push(' ');
                }
            }
            c => out.push(c),
        }
        i += 1;
    }

    out.trim_end().to_string()
}

/// Read a digit run (thousands separators allowed) and spell it.
fn read_number(chars: &[char]) -> (String, usize) {
    let mut digits = String::new();
    let mut consumed = 0;
    while consumed < chars.len() {
        let c = chars[consumed];
        if c.is_ascii_digit() {
            digits.push(c);
            consumed += 1;
        } else if c == ','
            && chars.get(consumed + 1).is_some_and(|n| n.is_ascii_digit())
            && !digits.is_empty()
        {
            consumed += 1;
        } else {
            break;
        }
    }

    match digits.parse::<u64>() {
        Ok(n) => (number_to_sino(n), consumed),
        // Longer than u64: read digit by digit.
        Err(_) => (
            digits
                .bytes()
                .map(|b| DIGITS[(b - b'0') as usize])
                .collect(),
            consumed,
        ),
    }
}
