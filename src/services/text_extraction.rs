use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::ExtractionError;
use crate::models::{ExtractedText, ImageSource};

/// Image-to-text engine.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &Path, language: &str) -> Result<String, ExtractionError>;
}

/// Runs the `tesseract` executable and captures its stdout.
pub struct TesseractCli {
    program: String,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractCli {
    pub fn new(program: impl Into<String>, tessdata_dir: Option<PathBuf>) -> Self {
        TesseractCli {
            program: program.into(),
            tessdata_dir,
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &Path, language: &str) -> Result<String, ExtractionError> {
        let mut command = Command::new(&self.program);
        command.arg(image).arg("stdout").arg("-l").arg(language);
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = command.output().await.map_err(|e| {
            ExtractionError::EngineUnavailable(format!("{}: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractionError::Engine(format!("{}: {}", output.status, stderr)));
        }

        String::from_utf8(output.stdout).map_err(|_| ExtractionError::InvalidUtf8)
    }
}

/// In-process recognition through the libtesseract binding.
#[cfg(feature = "tesseract-lib")]
pub struct TesseractLib {
    tessdata_dir: Option<PathBuf>,
}

#[cfg(feature = "tesseract-lib")]
impl TesseractLib {
    pub fn new(tessdata_dir: Option<PathBuf>) -> Self {
        TesseractLib { tessdata_dir }
    }
}

#[cfg(feature = "tesseract-lib")]
#[async_trait]
impl TextRecognizer for TesseractLib {
    async fn recognize(&self, image: &Path, language: &str) -> Result<String, ExtractionError> {
        let datapath = match &self.tessdata_dir {
            Some(dir) => Some(
                dir.to_str()
                    .ok_or_else(|| ExtractionError::EngineUnavailable("Invalid tessdata path".into()))?
                    .to_string(),
            ),
            None => None,
        };
        let image = image
            .to_str()
            .ok_or_else(|| ExtractionError::Engine("Invalid image path".into()))?
            .to_string();
        let language = language.to_string();

        // Engine instances are created per call and never shared across threads.
        // A timeout drops the join handle but does not stop the blocking recognition thread.
        tokio::task::spawn_blocking(move || {
            tesseract::Tesseract::new(datapath.as_deref(), Some(&language))
                .map_err(|e| ExtractionError::EngineUnavailable(format!("Tesseract init: {}", e)))?
                .set_image(&image)
                .map_err(|e| ExtractionError::Engine(format!("Tesseract image: {}", e)))?
                .recognize()
                .map_err(|e| ExtractionError::Engine(format!("Tesseract recognize: {}", e)))?
                .get_text()
                .map_err(|e| ExtractionError::Engine(format!("OCR text: {}", e)))
        })
        .await
        .map_err(|e| ExtractionError::Engine(format!("Recognition task: {}", e)))?
    }
}

/// Resolves image sources, pins the recognition language and bounds engine latency.
pub struct TextExtractor {
    engine: Arc<dyn TextRecognizer>,
    resource_root: PathBuf,
    language: String,
    timeout: Duration,
}

impl TextExtractor {
    pub fn new(
        engine: Arc<dyn TextRecognizer>,
        resource_root: impl Into<PathBuf>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        TextExtractor {
            engine,
            resource_root: resource_root.into(),
            language: language.into(),
            timeout,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn resolve(&self, source: &ImageSource) -> PathBuf {
        source.resolve(&self.resource_root)
    }

    pub async fn extract_text(&self, source: &ImageSource) -> Result<ExtractedText, ExtractionError> {
        let path = self.resolve(source);
        if !path.is_file() {
            return Err(ExtractionError::SourceNotFound(path));
        }

        info!(path = %path.display(), language = %self.language, "Text extraction start");
        let content = tokio::time::timeout(self.timeout, self.engine.recognize(&path, &self.language))
            .await
            .map_err(|_| ExtractionError::Timeout(self.timeout))??;

        if !validate_text_quality(&content) {
            warn!(chars = content.chars().count(), "Recognized text looks sparse");
        }
        debug!(text = %content, "Recognized text");
        info!(chars = content.chars().count(), "Text extraction end");

        Ok(ExtractedText { content })
    }
}

pub fn validate_text_quality(text: &str) -> bool {
    !text.trim().is_empty() && text.split_whitespace().count() >= 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeRecognizer {
        calls: AtomicUsize,
        languages: Mutex<Vec<String>>,
        reply: Result<String, String>,
        delay: Option<Duration>,
    }

    impl FakeRecognizer {
        fn replying(text: &str) -> Self {
            FakeRecognizer {
                calls: AtomicUsize::new(0),
                languages: Mutex::new(Vec::new()),
                reply: Ok(text.to_string()),
                delay: None,
            }
        }

        fn failing(message: &str) -> Self {
            FakeRecognizer {
                reply: Err(message.to_string()),
                ..FakeRecognizer::replying("")
            }
        }
    }

    #[async_trait]
    impl TextRecognizer for FakeRecognizer {
        async fn recognize(&self, _image: &Path, language: &str) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.languages.lock().unwrap().push(language.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone().map_err(ExtractionError::Engine)
        }
    }

    fn scratch_image() -> (tempfile::TempDir, ImageSource) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("image")).unwrap();
        std::fs::write(dir.path().join("image/page.png"), b"png").unwrap();
        (dir, ImageSource::new("image", "page.png"))
    }

    #[tokio::test]
    async fn missing_image_never_reaches_engine() {
        let engine = Arc::new(FakeRecognizer::replying("text"));
        let dir = tempfile::tempdir().unwrap();
        let extractor = TextExtractor::new(engine.clone(), dir.path(), "kor", Duration::from_secs(5));

        let err = extractor
            .extract_text(&ImageSource::new("image", "absent.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::SourceNotFound(_)));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configured_language_is_forwarded() {
        let (dir, source) = scratch_image();
        let engine = Arc::new(FakeRecognizer::replying("안녕하세요"));
        let extractor = TextExtractor::new(engine.clone(), dir.path(), "kor", Duration::from_secs(5));

        let text = extractor.extract_text(&source).await.unwrap();

        assert_eq!(text.content, "안녕하세요");
        assert_eq!(*engine.languages.lock().unwrap(), vec!["kor".to_string()]);
    }

    #[tokio::test]
    async fn engine_failure_is_surfaced_verbatim() {
        let (dir, source) = scratch_image();
        let engine = Arc::new(FakeRecognizer::failing("Error opening data file kor.traineddata"));
        let extractor = TextExtractor::new(engine, dir.path(), "kor", Duration::from_secs(5));

        let err = extractor.extract_text(&source).await.unwrap_err();

        assert!(err.to_string().contains("kor.traineddata"));
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let (dir, source) = scratch_image();
        let engine = Arc::new(FakeRecognizer {
            delay: Some(Duration::from_secs(5)),
            ..FakeRecognizer::replying("late")
        });
        let extractor = TextExtractor::new(engine, dir.path(), "kor", Duration::from_millis(20));

        let err = extractor.extract_text(&source).await.unwrap_err();

        assert!(matches!(err, ExtractionError::Timeout(_)));
    }

    #[tokio::test]
    async fn missing_cli_binary_reports_unavailable() {
        let (dir, _source) = scratch_image();
        let engine = TesseractCli::new("definitely-not-a-tesseract-binary", None);

        let err = engine
            .recognize(&dir.path().join("image/page.png"), "kor")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::EngineUnavailable(_)));
    }

    #[test]
    fn sparse_text_fails_quality_check() {
        assert!(!validate_text_quality("   "));
        assert!(!validate_text_quality("한 줄"));
        assert!(validate_text_quality("one two three four five six seven eight nine ten"));
    }

    #[cfg(unix)]
    fn shell_script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cli_stdout_becomes_recognized_text() {
        let (dir, _source) = scratch_image();
        let program = shell_script(dir.path(), "tesseract", r#"printf 'image=%s out=%s lang=%s %s\n' "$1" "$2" "$4" "$6""#);
        let image = dir.path().join("image/page.png");

        let text = TesseractCli::new(program, Some(PathBuf::from("/opt/tessdata")))
            .recognize(&image, "kor")
            .await
            .unwrap();

        assert_eq!(
            text,
            format!("image={} out=stdout lang=kor /opt/tessdata\n", image.display())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cli_nonzero_exit_carries_stderr() {
        let (dir, source) = scratch_image();
        let program = shell_script(
            dir.path(),
            "tesseract",
            "echo 'Failed loading language kor' >&2\nexit 1",
        );
        let extractor = TextExtractor::new(
            Arc::new(TesseractCli::new(program, None)),
            dir.path(),
            "kor",
            Duration::from_secs(5),
        );

        let err = extractor.extract_text(&source).await.unwrap_err();

        match err {
            ExtractionError::Engine(message) => assert!(message.contains("Failed loading language kor")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cli_non_utf8_output_is_rejected() {
        let (dir, _source) = scratch_image();
        let program = shell_script(dir.path(), "tesseract", r"printf '\260\241\n'");

        let err = TesseractCli::new(program, None)
            .recognize(&dir.path().join("image/page.png"), "kor")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::InvalidUtf8));
    }
}
