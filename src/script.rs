//! Writing-system classification of directory names.

use std::fmt;
use std::ops::RangeInclusive;

pub const UNKNOWN_BUCKET: &str = "[Unknown]";

const JAPANESE_RANGES: &[RangeInclusive<char>] = &[
    '\u{4E00}'..='\u{9FA0}', // 一-龠
    '\u{3041}'..='\u{3094}', // ぁ-ゔ
    '\u{30A1}'..='\u{30F4}', // ァ-ヴ
    '\u{30FC}'..='\u{30FC}', // ー
    '\u{3005}'..='\u{3006}', // 々〆
    '\u{3024}'..='\u{3024}', // 〤
    '\u{30F6}'..='\u{30F6}', // ヶ
];

const KOREAN_RANGES: &[RangeInclusive<char>] = &[
    '\u{1100}'..='\u{11FF}',
    '\u{3130}'..='\u{318F}',
    '\u{A960}'..='\u{A97F}',
    '\u{AC00}'..='\u{D7AF}',
    '\u{D7B0}'..='\u{D7FF}',
];

const CHINESE_RANGES: &[RangeInclusive<char>] = &['\u{4E00}'..='\u{9FFF}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Japanese,
    Korean,
    Chinese,
}

impl Script {
    pub const ALL: [Script; 3] = [Script::Japanese, Script::Korean, Script::Chinese];

    pub fn bucket_name(&self) -> &'static str {
        match self {
            Script::Japanese => "[Japanese]",
            Script::Korean => "[Korean]",
            Script::Chinese => "[Chinese]",
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Script::Japanese => is_japanese(text),
            Script::Korean => is_korean(text),
            Script::Chinese => is_chinese(text),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bucket_name())
    }
}

fn contains_any(text: &str, ranges: &[RangeInclusive<char>]) -> bool {
    text.chars().any(|c| ranges.iter().any(|r| r.contains(&c)))
}

pub fn is_japanese(text: &str) -> bool {
    contains_any(text, JAPANESE_RANGES)
}

pub fn is_korean(text: &str) -> bool {
    contains_any(text, KOREAN_RANGES)
}

pub fn is_chinese(text: &str) -> bool {
    contains_any(text, CHINESE_RANGES)
}

pub fn is_eastern_script(text: &str) -> bool {
    is_japanese(text) || is_korean(text) || is_chinese(text)
}

/// Every script whose predicate matches, always in Japanese, Korean, Chinese order.
/// Han ideographs match both Japanese and Chinese.
pub fn scripts_of(text: &str) -> Vec<Script> {
    Script::ALL.into_iter().filter(|s| s.matches(text)).collect()
}

/// True when the text fits a single-byte Latin-1 encoding.
pub fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| (c as u32) <= 0xFF)
}
