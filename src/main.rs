use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use noun_rank::config::Settings;
use noun_rank::logging::init_logging;
use noun_rank::services::morphology::{MecabAnalyzer, MorphologyService};
use noun_rank::services::report;
use noun_rank::services::text_extraction::{TextExtractor, TextRecognizer};
use noun_rank::Pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = match Settings::load(settings_path.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("noun-rank: {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.log_level);

    let pipeline = build_pipeline(&settings);
    match pipeline.run(&settings.image_source()).await {
        Ok(word_report) => {
            print!("{}", report::render(&word_report, settings.report_limit));
            ExitCode::SUCCESS
        }
        // The pipeline has already logged the failing stage.
        Err(_) => ExitCode::FAILURE,
    }
}

fn build_pipeline(settings: &Settings) -> Pipeline {
    let extractor = TextExtractor::new(
        recognizer(settings),
        settings.resource_root.clone(),
        settings.language.clone(),
        settings.extraction_timeout(),
    );
    let morphology = MorphologyService::new(
        Arc::new(MecabAnalyzer::new(
            settings.mecab_program.clone(),
            settings.mecab_dicdir.clone(),
        )),
        settings.analysis_timeout(),
    );
    Pipeline::new(extractor, morphology)
}

#[cfg(not(feature = "tesseract-lib"))]
fn recognizer(settings: &Settings) -> Arc<dyn TextRecognizer> {
    use noun_rank::services::text_extraction::TesseractCli;
    Arc::new(TesseractCli::new(
        settings.tesseract_program.clone(),
        settings.tessdata_dir.clone(),
    ))
}

#[cfg(feature = "tesseract-lib")]
fn recognizer(settings: &Settings) -> Arc<dyn TextRecognizer> {
    use noun_rank::services::text_extraction::TesseractLib;
    Arc::new(TesseractLib::new(settings.tessdata_dir.clone()))
}
