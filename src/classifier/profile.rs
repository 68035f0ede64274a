use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use super::{
    script::{script_language, script_of, Script, HAN_DEFAULT, HAN_WITH_KANA, SCRIPT_LANGUAGES},
    Candidate, ClassifierError, LanguageClassifier,
};

const WORD_WEIGHT: f64 = 1.0;
const LETTER_WEIGHT: f64 = 0.5;
const SCRIPT_WEIGHT: f64 = 1.0;
/// Candidates below this probability are dropped, except the top one.
const MIN_PROBABILITY: f64 = 0.1;

#[derive(Deserialize)]
struct ProfileFile {
    code: String,
    words: Vec<String>,
    #[serde(default)]
    letters: String,
}

pub struct LanguageProfile {
    code: String,
    words: HashSet<String>,
    letters: HashSet<char>,
}

impl LanguageProfile {
    pub fn code(&self) -> &str {
        &self.code
    }
}

macro_rules! profile_file {
    ($lang:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/lang/",
            $lang,
            "/profile.json"
        ))
    };
}

static PROFILES: Lazy<Vec<LanguageProfile>> = Lazy::new(|| {
    vec![
        load_profile(profile_file!("en")),
        load_profile(profile_file!("fr")),
        load_profile(profile_file!("es")),
        load_profile(profile_file!("de")),
        load_profile(profile_file!("it")),
        load_profile(profile_file!("pt")),
        load_profile(profile_file!("nl")),
    ]
});

fn load_profile(raw: &str) -> LanguageProfile {
    let parsed: ProfileFile = serde_json::from_str(raw).expect("invalid language profile");
    LanguageProfile {
        code: parsed.code,
        words: parsed.words.into_iter().map(|w| w.to_lowercase()).collect(),
        letters: parsed.letters.chars().collect(),
    }
}

/// Parses the bundled profiles now instead of on the first request, so a
/// broken profile stops the process at startup. Returns the profile count.
pub fn preload() -> usize {
    Lazy::force(&PROFILES).len()
}

/// Every label the built-in classifier can emit.
pub fn supported_languages() -> Vec<&'static str> {
    let profiles: &'static [LanguageProfile] = &PROFILES;
    profiles
        .iter()
        .map(|p| p.code.as_str())
        .chain(SCRIPT_LANGUAGES.iter().map(|(_, code)| *code))
        .chain(std::iter::once(HAN_DEFAULT))
        .collect()
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("unsupported language code '{0}'")]
pub struct UnsupportedLanguage(pub String);

/// Lexicon and script based classifier.
///
/// Latin-script languages are scored from common words and distinctive
/// letters; other languages are recognised by their writing system. Scores
/// are turned into probabilities with a softmax over the languages that
/// scored at all.
#[derive(Debug, Clone, Default)]
pub struct ProfileClassifier {
    allowed: Option<HashSet<String>>,
}

impl ProfileClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the label set. Probabilities are renormalised over it.
    pub fn with_languages<I, S>(codes: I) -> Result<Self, UnsupportedLanguage>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let supported = supported_languages();
        let mut allowed = HashSet::new();
        for code in codes {
            let code = code.as_ref().trim().to_ascii_lowercase();
            if !supported.contains(&code.as_str()) {
                return Err(UnsupportedLanguage(code));
            }
            allowed.insert(code);
        }
        Ok(Self {
            allowed: Some(allowed),
        })
    }

    fn is_allowed(&self, code: &str) -> bool {
        self.allowed
            .as_ref()
            .map(|set| set.contains(code))
            .unwrap_or(true)
    }

    fn score(&self, text: &str) -> Vec<(&'static str, f64)> {
        let profiles: &'static [LanguageProfile] = &PROFILES;
        let lowered = text.to_lowercase();

        // Insertion order doubles as the tie-breaker.
        let mut order: Vec<&'static str> = Vec::new();
        let mut totals: HashMap<&'static str, f64> = HashMap::new();
        let mut bump = |code: &'static str, weight: f64| {
            if !self.is_allowed(code) {
                return;
            }
            let entry = totals.entry(code).or_insert_with(|| {
                order.push(code);
                0.0
            });
            *entry += weight;
        };

        for word in lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
        {
            for profile in profiles {
                if profile.words.contains(word) {
                    bump(profile.code.as_str(), WORD_WEIGHT);
                }
            }
        }

        let has_kana = lowered.chars().any(|c| script_of(c) == Script::Kana);
        for c in lowered.chars() {
            for profile in profiles {
                if profile.letters.contains(&c) {
                    bump(profile.code.as_str(), LETTER_WEIGHT);
                }
            }
            match script_of(c) {
                Script::Latin | Script::Other => {}
                Script::Han if has_kana => bump(HAN_WITH_KANA, SCRIPT_WEIGHT),
                Script::Han => bump(HAN_DEFAULT, SCRIPT_WEIGHT),
                script => {
                    if let Some(code) = script_language(script) {
                        bump(code, SCRIPT_WEIGHT);
                    }
                }
            }
        }

        order
            .into_iter()
            .filter_map(|code| totals.get(code).map(|s| (code, *s)))
            .filter(|(_, s)| *s > 0.0)
            .collect()
    }
}

impl LanguageClassifier for ProfileClassifier {
    fn rank(&self, text: &str) -> Result<Vec<Candidate>, ClassifierError> {
        let scores = self.score(text);
        if scores.is_empty() {
            return Err(ClassifierError::NoFeatures);
        }

        let max = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<(&str, f64)> = scores
            .iter()
            .map(|(code, s)| (*code, (s - max).exp()))
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();

        let mut candidates: Vec<Candidate> = weights
            .into_iter()
            .map(|(code, w)| Candidate::new(code, w / total))
            .collect();
        candidates.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });

        Ok(candidates
            .into_iter()
            .enumerate()
            .filter(|(idx, c)| *idx == 0 || c.probability >= MIN_PROBABILITY)
            .map(|(_, c)| c)
            .collect())
    }
}
