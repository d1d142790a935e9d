use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::AnalysisError;
use crate::models::{AnalysisResult, Morpheme};

/// Sejong tags for common and proper nouns.
pub const NOUN_TAGS: [&str; 2] = ["NNG", "NNP"];

/// Morphological analyzer. Implementations must be safe for concurrent read-only use.
#[async_trait]
pub trait MorphAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<Morpheme>, AnalysisError>;
}

/// MeCab-compatible analyzer process with a Korean dictionary.
pub struct MecabAnalyzer {
    program: String,
    dicdir: Option<PathBuf>,
}

impl MecabAnalyzer {
    pub fn new(program: impl Into<String>, dicdir: Option<PathBuf>) -> Self {
        MecabAnalyzer {
            program: program.into(),
            dicdir,
        }
    }
}

#[async_trait]
impl MorphAnalyzer for MecabAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<Morpheme>, AnalysisError> {
        let mut command = Command::new(&self.program);
        if let Some(dir) = &self.dicdir {
            command.arg("-d").arg(dir);
        }
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AnalysisError::EngineUnavailable(format!("{}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnalysisError::Engine("Analyzer stdin not captured".into()))?;
        let mut input = text.to_string();
        if !input.ends_with('\n') {
            input.push('\n');
        }

        // Feed stdin while draining stdout so large inputs cannot fill the pipe.
        let feed = async move {
            let written = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AnalysisError::Engine(format!("{}: {}", output.status, stderr)));
        }
        written?;

        let stdout = String::from_utf8(output.stdout).map_err(|_| AnalysisError::InvalidUtf8)?;
        parse_mecab_output(&stdout)
    }
}

/// Parses `surface<TAB>TAG,feature,...` lines; `EOS` marks a sentence end.
pub fn parse_mecab_output(raw: &str) -> Result<Vec<Morpheme>, AnalysisError> {
    let mut morphemes = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.is_empty() || line == "EOS" {
            continue;
        }
        let (surface, features) = line.split_once('\t').ok_or_else(|| AnalysisError::MalformedOutput {
            line: index + 1,
            content: line.to_string(),
        })?;
        let tag = features.split(',').next().unwrap_or_default();
        if surface.is_empty() || tag.is_empty() {
            return Err(AnalysisError::MalformedOutput {
                line: index + 1,
                content: line.to_string(),
            });
        }
        morphemes.push(Morpheme::new(surface, tag));
    }
    Ok(morphemes)
}

pub fn is_noun(morpheme: &Morpheme) -> bool {
    NOUN_TAGS.contains(&morpheme.tag.as_str())
}

/// `surface/TAG` pairs; `+` joins morphemes of one word and a space separates words.
/// Word boundaries are recovered from the whitespace of `text` between surfaces.
pub fn render_plain(text: &str, morphemes: &[Morpheme]) -> String {
    let mut plain = String::new();
    let mut rest = text;
    for (index, morpheme) in morphemes.iter().enumerate() {
        let trimmed = rest.trim_start();
        if index > 0 {
            plain.push(if trimmed.len() != rest.len() { ' ' } else { '+' });
        }
        // A surface the text does not spell out leaves the cursor in place.
        rest = trimmed
            .strip_prefix(morpheme.surface.as_str())
            .unwrap_or(trimmed);
        plain.push_str(&morpheme.surface);
        plain.push('/');
        plain.push_str(&morpheme.tag);
    }
    plain
}

pub fn collect_nouns(morphemes: &[Morpheme]) -> Vec<String> {
    morphemes
        .iter()
        .filter(|m| is_noun(m))
        .map(|m| m.surface.clone())
        .collect()
}

pub struct MorphologyService {
    analyzer: Arc<dyn MorphAnalyzer>,
    timeout: Duration,
}

impl MorphologyService {
    pub fn new(analyzer: Arc<dyn MorphAnalyzer>, timeout: Duration) -> Self {
        MorphologyService { analyzer, timeout }
    }

    pub async fn segment(&self, text: &str) -> Result<String, AnalysisError> {
        info!("Segmentation start");
        let morphemes = self.run(text).await?;
        let plain = render_plain(text, &morphemes);
        info!(morphemes = morphemes.len(), "Segmentation end");
        Ok(plain)
    }

    /// Noun surfaces in occurrence order, duplicates kept.
    pub async fn extract_nouns(&self, text: &str) -> Result<Vec<String>, AnalysisError> {
        info!("Noun extraction start");
        let nouns = collect_nouns(&self.run(text).await?);
        info!(nouns = nouns.len(), "Noun extraction end");
        Ok(nouns)
    }

    /// Both renderings from a single analyzer call.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        info!("Morphological analysis start");
        let morphemes = self.run(text).await?;
        let result = AnalysisResult {
            plain_text: render_plain(text, &morphemes),
            nouns: collect_nouns(&morphemes),
        };
        info!(
            morphemes = morphemes.len(),
            nouns = result.nouns.len(),
            "Morphological analysis end"
        );
        Ok(result)
    }

    async fn run(&self, text: &str) -> Result<Vec<Morpheme>, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let morphemes = tokio::time::timeout(self.timeout, self.analyzer.analyze(text))
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout))??;
        debug!(count = morphemes.len(), "Analyzer returned morphemes");
        Ok(morphemes)
    }
}
