//! Unicode script buckets for languages identified by their writing system alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Latin,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Devanagari,
    Thai,
    Hangul,
    Kana,
    Han,
    Other,
}

/// Languages recognised purely by script. Han is resolved separately because
/// it is shared between Chinese and Japanese.
pub const SCRIPT_LANGUAGES: &[(Script, &str)] = &[
    (Script::Cyrillic, "ru"),
    (Script::Greek, "el"),
    (Script::Arabic, "ar"),
    (Script::Hebrew, "he"),
    (Script::Devanagari, "hi"),
    (Script::Thai, "th"),
    (Script::Hangul, "ko"),
    (Script::Kana, "ja"),
];

pub const HAN_DEFAULT: &str = "zh";
pub const HAN_WITH_KANA: &str = "ja";

pub fn script_of(c: char) -> Script {
    match c as u32 {
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
        0x0400..=0x052F => Script::Cyrillic,
        0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
        0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
        0x0590..=0x05FF => Script::Hebrew,
        0x0900..=0x097F => Script::Devanagari,
        0x0E00..=0x0E7F => Script::Thai,
        0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => Script::Hangul,
        0x3040..=0x30FF | 0x31F0..=0x31FF => Script::Kana,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::Han,
        _ => Script::Other,
    }
}

pub fn script_language(script: Script) -> Option<&'static str> {
    SCRIPT_LANGUAGES
        .iter()
        .find(|(s, _)| *s == script)
        .map(|(_, code)| *code)
}
