//! Chinese text normalization: numbers and punctuation.

/// How digit runs are read out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    /// Positional reading with units: 123 → 一百二十三.
    #[default]
    Formal,
    /// Digit-by-digit reading: 123 → 一二三 (phone numbers, codes).
    Individual,
}

const DIGITS: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];
const SMALL_UNITS: [&str; 4] = ["", "十", "百", "千"];
const GROUP_UNITS: [&str; 4] = ["", "万", "亿", "万亿"];

/// Spell a non-negative integer in formal reading.
///
/// Groups by ten-thousands (万/亿) with 零 inserted for skipped places;
/// a leading 一十 contracts to 十 (10 reads 十, not 一十).
pub fn number_to_formal(n: u64) -> String {
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
    let mut pending_zero = false;
    for (level, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            if !out.is_empty() {
                pending_zero = true;
            }
            continue;
        }
        if pending_zero || (!out.is_empty() && group < 1000) {
            out.push('零');
        }
        pending_zero = false;
        out.push_str(&four_digits_formal(group));
        out.push_str(GROUP_UNITS[level]);
    }

    match out.strip_prefix("一十") {
        Some(rest) => format!("十{rest}"),
        None => out,
    }
}

fn four_digits_formal(n: usize) -> String {
    let mut out = String::new();
    let mut pending_zero = false;
    let mut rest = n;
    for place in (0..4).rev() {
        let unit = 10usize.pow(place as u32);
        let digit = rest / unit;
        rest %= unit;
        if digit == 0 {
            if !out.is_empty() {
                pending_zero = true;
            }
            continue;
        }
        if pending_zero {
            out.push('零');
            pending_zero = false;
        }
        out.push(DIGITS[digit]);
        out.push_str(SMALL_UNITS[place]);
    }
    out
}

/// Spell digits one by one: 0 is 零, so 103 → 一零三.
pub fn number_to_individual(digits: &str) -> String {
    digits
        .bytes()
        .filter(|b| b.is_ascii_digit())
        .map(|b| DIGITS[(b - b'0') as usize])
        .collect()
}

/// Normalize text for the Chinese pipeline: spell out numbers (including
/// decimals and percentages), map fullwidth punctuation to ASCII, and
/// collapse whitespace.
pub fn normalize(text: &str, format: NumberFormat) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch.is_ascii_digit() {
            let (spelled, consumed, percent) = read_number(&chars[i..], format);
            if percent {
                out.push_str("百分之");
            }
            out.push_str(&spelled);
            i += consumed;
            continue;
        }

        match ch {
            '，' | '、' => out.push(','),
            '。' | '．' => out.push('.'),
            '！' => out.push('!'),
            '？' => out.push('?'),
            '；' => out.push(';'),
            '：' => out.push(':'),
            '（' => out.push('('),
            '）' => out.push(')'),
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

/// Read one number starting at the head of `chars`. Returns the spelled
/// form, characters consumed, and whether a trailing `%` was absorbed.
fn read_number(chars: &[char], format: NumberFormat) -> (String, usize, bool) {
    let mut integer = String::new();
    let mut fraction = String::new();
    let mut consumed = 0;
    let mut in_fraction = false;

    while consumed < chars.len() {
        let c = chars[consumed];
        if c.is_ascii_digit() {
            if in_fraction {
                fraction.push(c);
            } else {
                integer.push(c);
            }
            consumed += 1;
        } else if c == '.'
            && !in_fraction
            && chars.get(consumed + 1).is_some_and(|n| n.is_ascii_digit())
        {
            in_fraction = true;
            consumed += 1;
        } else {
            break;
        }
    }

    let percent = chars.get(consumed) == Some(&'%');
    if percent {
        consumed += 1;
    }

    let mut spelled = match format {
        NumberFormat::Individual => number_to_individual(&integer),
        NumberFormat::Formal => match integer.parse::<u64>() {
            Ok(n) => number_to_formal(n),
            Err(_) => number_to_individual(&integer),
        },
    };
    if !fraction.is_empty() {
        spelled.push('点');
        spelled.push_str(&number_to_individual(&fraction));
    }
    (spelled, consumed, percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formal_reading_of_small_numbers() {
        assert_eq!(number_to_formal(0), "零");
        assert_eq!(number_to_formal(7), "七");
        assert_eq!(number_to_formal(10), "十");
        assert_eq!(number_to_formal(14), "十四");
        assert_eq!(number_to_formal(123), "一百二十三");
    }

    #[test]
    fn internal_zeros_read_as_ling() {
        assert_eq!(number_to_formal(105), "一百零五");
        assert_eq!(number_to_formal(1005), "一千零五");
        assert_eq!(number_to_formal(10_005), "一万零五");
        assert_eq!(number_to_formal(10_500), "一万零五百");
    }

    #[test]
    fn groups_by_wan_and_yi() {
        assert_eq!(number_to_formal(10_000), "一万");
        assert_eq!(number_to_formal(123_456), "十二万三千四百五十六");
        assert_eq!(number_to_formal(100_000_000), "一亿");
        assert_eq!(number_to_formal(100_010_000), "一亿零一万");
    }

    #[test]
    fn leading_yi_shi_contracts_only_at_the_front() {
        assert_eq!(number_to_formal(12), "十二");
        assert_eq!(number_to_formal(110), "一百一十");
    }

    #[test]
    fn individual_reading_keeps_every_digit() {
        assert_eq!(number_to_individual("103"), "一零三");
    }

    #[test]
    fn normalize_spells_numbers_in_context() {
        assert_eq!(normalize("我有3个", NumberFormat::Formal), "我有三个");
        assert_eq!(
            normalize("123", NumberFormat::Individual),
            "一二三"
        );
    }

    #[test]
    fn decimals_read_with_dian() {
        assert_eq!(normalize("1.5", NumberFormat::Formal), "一点五");
    }

    #[test]
    fn percentages_read_as_bai_fen_zhi() {
        assert_eq!(normalize("50%", NumberFormat::Formal), "百分之五十");
    }

    #[test]
    fn fullwidth_punctuation_maps_to_ascii() {
        assert_eq!(
            normalize("你好，世界。", NumberFormat::Formal),
            "你好,世界."
        );
    }
}
