//! Supported OCR languages and the language sets engines are built for.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::backend::OcrError;

/// A supported language: the user-facing code, its display name, and the
/// name of the engine model that recognizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub model: &'static str,
}

/// Every language the pipeline accepts, in menu order.
pub const LANGUAGES: &[Language] = &[
    Language {
        code: "en",
        name: "English",
        model: "eng",
    },
    Language {
        code: "tl",
        name: "Filipino (Tagalog)",
        model: "tgl",
    },
    Language {
        code: "es",
        name: "Spanish",
        model: "spa",
    },
    Language {
        code: "fr",
        name: "French",
        model: "fra",
    },
    Language {
        code: "de",
        name: "German",
        model: "deu",
    },
    Language {
        code: "it",
        name: "Italian",
        model: "ita",
    },
    Language {
        code: "pt",
        name: "Portuguese",
        model: "por",
    },
    Language {
        code: "nl",
        name: "Dutch",
        model: "nld",
    },
    Language {
        code: "sv",
        name: "Swedish",
        model: "swe",
    },
    Language {
        code: "no",
        name: "Norwegian",
        model: "nor",
    },
    Language {
        code: "da",
        name: "Danish",
        model: "dan",
    },
    Language {
        code: "fi",
        name: "Finnish",
        model: "fin",
    },
    Language {
        code: "cs",
        name: "Czech",
        model: "ces",
    },
    Language {
        code: "pl",
        name: "Polish",
        model: "pol",
    },
    Language {
        code: "sk",
        name: "Slovak",
        model: "slk",
    },
    Language {
        code: "sl",
        name: "Slovene",
        model: "slv",
    },
    Language {
        code: "hu",
        name: "Hungarian",
        model: "hun",
    },
    Language {
        code: "ro",
        name: "Romanian",
        model: "ron",
    },
    Language {
        code: "tr",
        name: "Turkish",
        model: "tur",
    },
    Language {
        code: "id",
        name: "Indonesian",
        model: "ind",
    },
    Language {
        code: "ms",
        name: "Malay",
        model: "msa",
    },
    Language {
        code: "vi",
        name: "Vietnamese",
        model: "vie",
    },
    Language {
        code: "ru",
        name: "Russian",
        model: "rus",
    },
    Language {
        code: "uk",
        name: "Ukrainian",
        model: "ukr",
    },
    Language {
        code: "ja",
        name: "Japanese",
        model: "jpn",
    },
    Language {
        code: "ko",
        name: "Korean",
        model: "kor",
    },
    Language {
        code: "zh_sim",
        name: "Chinese (Simplified)",
        model: "chi_sim",
    },
    Language {
        code: "zh_traditional",
        name: "Chinese (Traditional)",
        model: "chi_tra",
    },
    Language {
        code: "ar",
        name: "Arabic",
        model: "ara",
    },
    Language {
        code: "fa",
        name: "Persian (Farsi)",
        model: "fas",
    },
    Language {
        code: "he",
        name: "Hebrew",
        model: "heb",
    },
];

/// Languages selected when the user picks none explicitly.
pub const DEFAULT_LANGUAGES: &[&str] = &["en", "tl"];

/// Look up a supported language by code (case-insensitive).
pub fn lookup(code: &str) -> Option<&'static Language> {
    let code = code.trim().to_lowercase();
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Ordered, de-duplicated set of validated language codes.
///
/// Two sets are equal when they contain the same codes, regardless of the
/// order they were requested in; the order is kept because engines may
/// weigh earlier languages more heavily.
#[derive(Debug, Clone)]
pub struct LanguageSet {
    languages: Vec<&'static Language>,
}

impl LanguageSet {
    /// Validate and collect the requested codes.
    pub fn new<I, S>(codes: I) -> Result<Self, OcrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut languages: Vec<&'static Language> = Vec::new();
        for code in codes {
            let code = code.as_ref();
            let language = lookup(code).ok_or_else(|| OcrError::UnsupportedLanguage {
                code: code.to_string(),
            })?;
            if !languages.iter().any(|l| l.code == language.code) {
                languages.push(language);
            }
        }

        if languages.is_empty() {
            return Err(OcrError::Configuration(
                "at least one language must be selected".to_string(),
            ));
        }

        Ok(Self { languages })
    }

    /// Parse a comma-separated list such as `"en,tl"`.
    pub fn parse_list(list: &str) -> Result<Self, OcrError> {
        Self::new(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// The default `en, tl` selection.
    pub fn default_set() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES
                .iter()
                .filter_map(|code| lookup(code))
                .collect(),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.languages.iter().map(|l| l.code)
    }

    pub fn languages(&self) -> &[&'static Language] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Engine model names joined the way Tesseract expects (`eng+tgl`).
    pub fn model_spec(&self) -> String {
        self.languages
            .iter()
            .map(|l| l.model)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Order-insensitive identity used as the cache key.
    pub fn key(&self) -> BTreeSet<&'static str> {
        self.codes().collect()
    }
}

impl PartialEq for LanguageSet {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for LanguageSet {}

impl Hash for LanguageSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codes().collect::<Vec<_>>().join(","))
    }
}
