use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Recognition engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Recognition engine failed: {0}")]
    Engine(String),
    #[error("Recognition timed out after {0:?}")]
    Timeout(Duration),
    #[error("Recognized text is not valid UTF-8")]
    InvalidUtf8,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Nothing to analyze: input text is empty")]
    EmptyInput,
    #[error("Morphological analyzer unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Morphological analyzer failed: {0}")]
    Engine(String),
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
    #[error("Analyzer output is not valid UTF-8")]
    InvalidUtf8,
    #[error("Malformed analyzer output at line {line}: {content}")]
    MalformedOutput { line: usize, content: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A fatal pipeline failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Morphological analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Analysis(_) => "analysis",
        }
    }
}
