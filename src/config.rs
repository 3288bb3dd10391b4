//! Configuration management for textgrab.
//!
//! Settings come from, in increasing priority: built-in defaults, a TOML
//! file, `TEXTGRAB_*` environment variables, and finally CLI flags (applied
//! by the caller).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::document::DEFAULT_DPI;
use crate::ocr::{LanguageSet, OcrError, DEFAULT_LANGUAGES};
use crate::text::PageBreaks;

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "textgrab.toml";

/// Annotation rendering settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnotateSettings {
    /// Draw `text (confidence)` labels above boxes.
    pub labels: bool,
    /// TrueType font for labels; a system font is used when unset.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    /// Outline thickness in pixels.
    pub line_width: u32,
}

impl Default for AnnotateSettings {
    fn default() -> Self {
        Self {
            labels: true,
            font_path: None,
            font_size: 14.0,
            line_width: 2,
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// PDF rasterization resolution.
    pub dpi: f32,
    /// Language codes handed to the OCR engine.
    pub languages: Vec<String>,
    /// Pages recognized concurrently.
    pub workers: usize,
    pub page_breaks: PageBreaks,
    /// Tesseract language data directory override.
    pub tessdata_dir: Option<PathBuf>,
    pub annotate: AnnotateSettings,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            workers: 2,
            page_breaks: PageBreaks::default(),
            tessdata_dir: None,
            annotate: AnnotateSettings::default(),
            source_path: None,
        }
    }
}

/// Where to look for configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit `--config` path; skips discovery.
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Parse a TOML config file. Relative paths inside it resolve against
    /// the file's directory.
    pub fn load_from_path(path: &Path) -> Result<Self, OcrError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OcrError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut settings: Settings = toml::from_str(&contents).map_err(|e| {
            OcrError::Configuration(format!(
                "Failed to parse TOML config {}: {}",
                path.display(),
                e
            ))
        })?;

        if let Some(base_dir) = path.parent() {
            settings.tessdata_dir = settings
                .tessdata_dir
                .map(|p| resolve_path(&p, base_dir));
            settings.annotate.font_path = settings
                .annotate
                .font_path
                .map(|p| resolve_path(&p, base_dir));
        }
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply `TEXTGRAB_*` overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), OcrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(dpi) = var("TEXTGRAB_DPI") {
            self.dpi = dpi.trim().parse().map_err(|_| {
                OcrError::Configuration(format!("TEXTGRAB_DPI is not a number: {}", dpi))
            })?;
        }
        if let Some(languages) = var("TEXTGRAB_LANGUAGES") {
            self.languages = languages
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(workers) = var("TEXTGRAB_WORKERS") {
            self.workers = workers.trim().parse().map_err(|_| {
                OcrError::Configuration(format!("TEXTGRAB_WORKERS is not a number: {}", workers))
            })?;
        }
        if let Some(dir) = var("TEXTGRAB_TESSDATA") {
            self.tessdata_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Check values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), OcrError> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(OcrError::Configuration(format!(
                "dpi must be a positive number, got {}",
                self.dpi
            )));
        }
        if self.workers == 0 {
            return Err(OcrError::Configuration(
                "workers must be at least 1".to_string(),
            ));
        }
        if !self.annotate.font_size.is_finite() || self.annotate.font_size <= 0.0 {
            return Err(OcrError::Configuration(format!(
                "annotate.font_size must be positive, got {}",
                self.annotate.font_size
            )));
        }
        self.language_set().map(|_| ())
    }

    /// Validated language set for the configured codes.
    pub fn language_set(&self) -> Result<LanguageSet, OcrError> {
        LanguageSet::new(&self.languages)
    }
}

/// Resolve a possibly relative path against a base directory.
fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Config file candidates in discovery order.
fn candidate_config_files() -> Vec<PathBuf> {
    [
        Some(PathBuf::from(LOCAL_CONFIG_FILE)),
        dirs::config_dir().map(|d| d.join("textgrab").join("config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Load settings from an explicit path, a discovered file, or defaults, then
/// apply `TEXTGRAB_*` environment overrides.
///
/// Not validated: callers apply their own overrides first and call
/// [`Settings::validate`] on the result.
pub fn load_settings(options: &LoadOptions) -> Result<Settings, OcrError> {
    load_settings_with_env(options, |name| std::env::var(name).ok())
}

/// [`load_settings`] with environment variables read through `lookup`.
pub fn load_settings_with_env<F>(options: &LoadOptions, lookup: F) -> Result<Settings, OcrError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match options.config_path {
        Some(ref path) => Settings::load_from_path(path)?,
        None => match candidate_config_files().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("Using config file: {}", path.display());
                Settings::load_from_path(&path)?
            }
            None => Settings::default(),
        },
    };

    settings.apply_env_overrides(lookup)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.dpi, 180.0);
        assert_eq!(settings.languages, vec!["en", "tl"]);
        assert_eq!(settings.page_breaks, PageBreaks::Flatten);
        assert!(settings.annotate.labels);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("textgrab.toml");
        std::fs::write(
            &path,
            r#"
dpi = 300
languages = ["ja", "en"]
page_breaks = "preserve"

[annotate]
labels = false
font_path = "fonts/Label.ttf"
"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.dpi, 300.0);
        assert_eq!(settings.languages, vec!["ja", "en"]);
        assert_eq!(settings.page_breaks, PageBreaks::Preserve);
        assert_eq!(settings.workers, 2);
        assert!(!settings.annotate.labels);
        assert_eq!(settings.annotate.font_size, 14.0);
        assert_eq!(
            settings.annotate.font_path,
            Some(temp.path().join("fonts/Label.ttf"))
        );
        assert_eq!(settings.source_path, Some(path));
    }

    #[test]
    fn test_bad_toml_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        std::fs::write(&path, "dpi = [").unwrap();
        assert!(matches!(
            Settings::load_from_path(&path),
            Err(OcrError::Configuration(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TEXTGRAB_DPI", "96"),
            ("TEXTGRAB_LANGUAGES", "es, fr"),
            ("TEXTGRAB_WORKERS", "4"),
            ("TEXTGRAB_TESSDATA", "/opt/tessdata"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.dpi, 96.0);
        assert_eq!(settings.languages, vec!["es", "fr"]);
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.tessdata_dir, Some(PathBuf::from("/opt/tessdata")));
    }

    #[test]
    fn test_bad_env_value() {
        let mut settings = Settings::default();
        let result = settings.apply_env_overrides(|name| {
            (name == "TEXTGRAB_DPI").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(OcrError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = Settings {
            dpi: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            workers: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            languages: vec!["en".to_string(), "xx".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(OcrError::UnsupportedLanguage { .. })
        ));

        let settings = Settings {
            languages: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(OcrError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_values_load_for_later_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("textgrab.toml");
        std::fs::write(&path, "dpi = 0\nworkers = 0\n").unwrap();
        let options = LoadOptions {
            config_path: Some(path),
        };

        let settings = load_settings_with_env(&options, |name| {
            (name == "TEXTGRAB_LANGUAGES").then(|| "xx".to_string())
        })
        .unwrap();
        assert_eq!(settings.languages, vec!["xx"]);
        assert_eq!(settings.dpi, 0.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/textgrab.toml")),
        };
        assert!(load_settings(&options).is_err());
    }
}
