//! Reads a document image, segments the recognized text into morphemes and
//! ranks the nouns it contains by frequency.

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use errors::{AnalysisError, ExtractionError, PipelineError};
pub use services::pipeline::Pipeline;
