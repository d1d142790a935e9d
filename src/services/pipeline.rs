use chrono::Utc;
use tracing::{error, info, Instrument};

use crate::errors::{ExtractionError, PipelineError};
use crate::models::{ImageSource, WordReport};
use crate::services::morphology::MorphologyService;
use crate::services::ranking;
use crate::services::text_extraction::TextExtractor;
use crate::utils::fingerprint;

/// Runs extraction, analysis and ranking in order. Any stage failure ends the run.
pub struct Pipeline {
    extractor: TextExtractor,
    morphology: MorphologyService,
}

impl Pipeline {
    pub fn new(extractor: TextExtractor, morphology: MorphologyService) -> Self {
        Pipeline {
            extractor,
            morphology,
        }
    }

    pub async fn run(&self, source: &ImageSource) -> Result<WordReport, PipelineError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id, image = %source.file_name);
        let result = self.run_stages(source).instrument(span.clone()).await;
        if let Err(err) = &result {
            span.in_scope(|| error!(stage = err.stage(), "Pipeline aborted: {}", err));
        }
        result
    }

    async fn run_stages(&self, source: &ImageSource) -> Result<WordReport, PipelineError> {
        info!("Pipeline start");

        let extracted = self.extractor.extract_text(source).await?;
        let fingerprint = fingerprint(self.extractor.resolve(source))
            .await
            .map_err(ExtractionError::Io)?;

        let analysis = self.morphology.analyze(&extracted.content).await?;

        let frequencies = ranking::count(&analysis.nouns);
        let ranked = ranking::rank_table(&frequencies);
        info!(
            total = analysis.nouns.len(),
            distinct = frequencies.len(),
            "Pipeline end"
        );

        Ok(WordReport {
            source: source.clone(),
            fingerprint,
            generated_at: Utc::now(),
            plain_text: analysis.plain_text,
            total_tokens: analysis.nouns.len(),
            distinct_tokens: frequencies.len(),
            frequencies,
            ranked,
        })
    }
}
