use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::ImageSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resource_root: PathBuf,
    pub image_dir: String,
    pub image_name: String,
    pub language: String,
    pub tessdata_dir: Option<PathBuf>,
    pub tesseract_program: String,
    pub mecab_program: String,
    pub mecab_dicdir: Option<PathBuf>,
    pub extraction_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    pub log_level: String,
    pub report_limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            resource_root: PathBuf::from("resources"),
            image_dir: "image".to_string(),
            image_name: "news01.jpg".to_string(),
            language: "kor".to_string(),
            tessdata_dir: None,
            tesseract_program: "tesseract".to_string(),
            mecab_program: "mecab".to_string(),
            mecab_dicdir: None,
            extraction_timeout_secs: 120,
            analysis_timeout_secs: 30,
            log_level: "info".to_string(),
            report_limit: None,
        }
    }
}

impl Settings {
    /// Defaults when `path` is `None`; otherwise a JSON file whose missing keys keep defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Read settings {}", path.display()))?;
                serde_json::from_str::<Settings>(&raw)
                    .with_context(|| format!("Parse settings {}", path.display()))?
            }
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_name.trim().is_empty() {
            bail!("image_name must not be empty");
        }
        if self.language.trim().is_empty() {
            bail!("language must not be empty");
        }
        if self.extraction_timeout_secs == 0 || self.analysis_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }
        Ok(())
    }

    pub fn image_source(&self) -> ImageSource {
        ImageSource::new(self.image_dir.clone(), self.image_name.clone())
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }
}
