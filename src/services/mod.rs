pub mod morphology;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod text_extraction;
