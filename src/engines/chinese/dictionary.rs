//! Pinyin dictionary: character and phrase readings.
//!
//! Loaded from a JSON data file when one is available; otherwise a built-in
//! seed of frequent characters keeps the backend functional.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// On-disk dictionary format.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChineseDictionaryData {
    #[serde(default)]
    pub characters: Vec<CharacterEntry>,
    #[serde(default)]
    pub phrases: Vec<PhraseEntry>,
}

/// One character with its readings, most common first.
#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub character: String,
    pub pinyin: Vec<String>,
}

/// A multi-character phrase with space-separated numbered pinyin.
#[derive(Debug, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub phrase: String,
    pub pinyin: String,
}

/// Frequent characters bundled with the crate. `(char, "readings,comma-sep")`.
const BUILTIN_CHARACTERS: &[(&str, &str)] = &[
    ("你", "ni3"),
    ("好", "hao3"),
    ("中", "zhong1"),
    ("国", "guo2"),
    ("人", "ren2"),
    ("我", "wo3"),
    ("是", "shi4"),
    ("的", "de5"),
    ("一", "yi1"),
    ("不", "bu4"),
    ("了", "le5,liao3"),
    ("天", "tian1"),
    ("气", "qi4"),
    ("很", "hen3"),
    ("爱", "ai4"),
    ("学", "xue2"),
    ("生", "sheng1"),
    ("说", "shuo1"),
    ("话", "hua4"),
    ("大", "da4"),
    ("小", "xiao3"),
    ("上", "shang4"),
    ("下", "xia4"),
    ("长", "chang2,zhang3"),
    ("水", "shui3"),
    ("日", "ri4"),
    ("月", "yue4"),
    ("年", "nian2"),
    ("今", "jin1"),
    ("明", "ming2"),
    ("零", "ling2"),
    ("二", "er4"),
    ("三", "san1"),
    ("四", "si4"),
    ("五", "wu3"),
    ("六", "liu4"),
    ("七", "qi1"),
    ("八", "ba1"),
    ("九", "jiu3"),
    ("十", "shi2"),
    ("百", "bai3"),
    ("千", "qian1"),
    ("万", "wan4"),
    ("亿", "yi4"),
    ("点", "dian3"),
    ("等", "deng3"),
];

const BUILTIN_PHRASES: &[(&str, &str)] = &[
    ("你好", "ni3 hao3"),
    ("中国", "zhong1 guo2"),
    ("中国人", "zhong1 guo2 ren2"),
    ("天气", "tian1 qi4"),
    ("学生", "xue2 sheng1"),
    ("今天", "jin1 tian1"),
    ("明天", "ming2 tian1"),
];

/// Runtime lookup tables, immutable after construction.
#[derive(Debug)]
pub struct PinyinDictionary {
    char_to_pinyin: HashMap<char, Vec<String>>,
    phrase_to_pinyin: HashMap<String, Vec<String>>,
}

impl PinyinDictionary {
    /// Dictionary seeded only with the built-in entries.
    pub fn builtin() -> Self {
        let mut dict = Self {
            char_to_pinyin: HashMap::new(),
            phrase_to_pinyin: HashMap::new(),
        };
        for (ch, readings) in BUILTIN_CHARACTERS {
            if let Some(c) = ch.chars().next() {
                dict.char_to_pinyin
                    .insert(c, readings.split(',').map(str::to_string).collect());
            }
        }
        for (phrase, pinyin) in BUILTIN_PHRASES {
            dict.phrase_to_pinyin.insert(
                phrase.to_string(),
                pinyin.split_whitespace().map(str::to_string).collect(),
            );
        }
        dict
    }

    /// Parse a JSON data file and merge it over the built-in seed.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: ChineseDictionaryData = serde_json::from_str(json)?;
        let mut dict = Self::builtin();
        for entry in &data.characters {
            let mut chars = entry.character.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                dict.char_to_pinyin.insert(c, entry.pinyin.clone());
            }
        }
        for entry in &data.phrases {
            if entry.phrase.is_empty() {
                continue;
            }
            dict.phrase_to_pinyin.insert(
                entry.phrase.clone(),
                entry.pinyin.split_whitespace().map(str::to_string).collect(),
            );
        }
        Ok(dict)
    }

    /// Readings for one character, most common first.
    pub fn character_pinyin(&self, ch: char) -> Option<&[String]> {
        self.char_to_pinyin.get(&ch).map(Vec::as_slice)
    }

    /// Per-syllable readings for a phrase.
    pub fn phrase_pinyin(&self, phrase: &str) -> Option<&[String]> {
        self.phrase_to_pinyin.get(phrase).map(Vec::as_slice)
    }

    pub fn character_count(&self) -> usize {
        self.char_to_pinyin.len()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrase_to_pinyin.len()
    }

    pub fn memory_usage(&self) -> u64 {
        let chars: usize = self
            .char_to_pinyin
            .values()
            .map(|v| 4 + 48 + v.iter().map(|p| p.len() + 24).sum::<usize>())
            .sum();
        let phrases: usize = self
            .phrase_to_pinyin
            .iter()
            .map(|(k, v)| k.len() + 48 + v.iter().map(|p| p.len() + 24).sum::<usize>())
            .sum();
        (chars + phrases) as u64
    }
}

/// True for CJK ideographs (unified, extension A, compatibility).
pub fn is_chinese_char(ch: char) -> bool {
    let code = ch as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0xF900..=0xFAFF).contains(&code)
}
