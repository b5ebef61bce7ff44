//! Tesseract engine backend
//!
//! Runs the bundled `tesseract` engine binary once per recognition. The
//! binary and the per-language trained data files must resolve from the local
//! asset root; nothing is fetched from a remote origin. The crop is handed
//! over through a temp file and the result read from stdout.

use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{emit, EngineProvider, OcrEngine, OcrError, OcrProgress, ProgressSender};

/// Local OCR asset layout.
#[derive(Debug, Clone)]
pub struct OcrAssets {
    /// Path to the tesseract engine binary.
    pub engine_binary: PathBuf,
    /// Directory holding `<lang>.traineddata` files.
    pub tessdata_dir: PathBuf,
    /// Languages to recognize, combined into one pass.
    pub languages: Vec<String>,
}

impl OcrAssets {
    /// Assets rooted at `dir`, recognizing English and Simplified Chinese.
    pub fn rooted_at(dir: PathBuf) -> Self {
        Self {
            engine_binary: dir.join("tesseract"),
            tessdata_dir: dir.join("tessdata"),
            languages: vec!["eng".to_string(), "chi_sim".to_string()],
        }
    }

    /// `eng+chi_sim` style language argument.
    pub fn language_arg(&self) -> String {
        self.languages.join("+")
    }

    /// Verify every asset is present, reporting language-data progress.
    fn validate(&self, progress: &ProgressSender) -> Result<(), OcrError> {
        emit(progress, OcrProgress::LoadingCore);
        if !self.engine_binary.is_file() {
            return Err(OcrError::ResourceLoadFailed(format!(
                "engine binary not found at {}",
                self.engine_binary.display()
            )));
        }

        if self.languages.is_empty() {
            return Err(OcrError::ResourceLoadFailed(
                "no OCR languages configured".to_string(),
            ));
        }

        let total = self.languages.len();
        for (i, lang) in self.languages.iter().enumerate() {
            let data = self.tessdata_dir.join(format!("{lang}.traineddata"));
            if !data.is_file() {
                return Err(OcrError::ResourceLoadFailed(format!(
                    "language data not found at {}",
                    data.display()
                )));
            }
            let percent = (((i + 1) * 100) / total) as u8;
            emit(progress, OcrProgress::LoadingLanguageData { percent });
        }

        Ok(())
    }
}

/// Provides one tesseract engine per recognition.
pub struct TesseractProvider {
    assets: OcrAssets,
}

impl TesseractProvider {
    pub fn new(assets: OcrAssets) -> Self {
        Self { assets }
    }
}

#[async_trait]
impl EngineProvider for TesseractProvider {
    async fn acquire(&self, progress: &ProgressSender) -> Result<Box<dyn OcrEngine>, OcrError> {
        self.assets.validate(progress)?;
        emit(progress, OcrProgress::Initializing);

        Ok(Box::new(TesseractEngine {
            assets: self.assets.clone(),
            progress: progress.clone(),
            scratch: None,
            released: false,
        }))
    }
}

/// One-shot tesseract invocation.
#[derive(Debug)]
struct TesseractEngine {
    assets: OcrAssets,
    progress: ProgressSender,
    scratch: Option<NamedTempFile>,
    released: bool,
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&mut self, image_png: &[u8]) -> Result<String, OcrError> {
        emit(&self.progress, OcrProgress::Recognizing { percent: 0 });

        let mut scratch = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::EngineError(format!("temp file creation failed: {e}")))?;
        scratch
            .write_all(image_png)
            .and_then(|_| scratch.flush())
            .map_err(|e| OcrError::EngineError(format!("temp file write failed: {e}")))?;

        let output = Command::new(&self.assets.engine_binary)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(self.assets.language_arg())
            .arg("--tessdata-dir")
            .arg(&self.assets.tessdata_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| OcrError::EngineError(format!("engine failed to start: {e}")))?;

        // Keep the input alive until the engine has exited.
        self.scratch = Some(scratch);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineError(format!(
                "engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        emit(&self.progress, OcrProgress::Recognizing { percent: 100 });
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn teardown(&mut self) {
        if self.released {
            warn!("OCR engine teardown called twice");
            return;
        }
        self.released = true;
        // Dropping the scratch file removes it from disk.
        self.scratch = None;
        debug!("OCR engine released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_language_arg_joins_with_plus() {
        let assets = OcrAssets::rooted_at(PathBuf::from("/opt/snap-translate"));
        assert_eq!(assets.language_arg(), "eng+chi_sim");
    }

    #[test]
    fn test_rooted_layout() {
        let assets = OcrAssets::rooted_at(PathBuf::from("/assets"));
        assert_eq!(assets.engine_binary, PathBuf::from("/assets/tesseract"));
        assert_eq!(assets.tessdata_dir, PathBuf::from("/assets/tessdata"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_resource_load_failed() {
        let dir = tempfile::tempdir().unwrap();
        let assets = OcrAssets::rooted_at(dir.path().to_path_buf());
        let provider = TesseractProvider::new(assets);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = provider.acquire(&tx).await.unwrap_err();
        assert!(matches!(err, OcrError::ResourceLoadFailed(_)));
        assert!(err.to_string().contains("engine binary"));
    }

    #[tokio::test]
    async fn test_missing_language_data_is_resource_load_failed() {
        let dir = tempfile::tempdir().unwrap();
        // Binary present, tessdata missing.
        fs::write(dir.path().join("tesseract"), b"stub").unwrap();
        let assets = OcrAssets::rooted_at(dir.path().to_path_buf());
        let provider = TesseractProvider::new(assets);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = provider.acquire(&tx).await.unwrap_err();
        assert!(matches!(err, OcrError::ResourceLoadFailed(_)));
        assert!(err.to_string().contains("language data"));
    }

    #[tokio::test]
    async fn test_validation_reports_language_progress() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tesseract"), b"stub").unwrap();
        let tessdata = dir.path().join("tessdata");
        fs::create_dir(&tessdata).unwrap();
        fs::write(tessdata.join("eng.traineddata"), b"stub").unwrap();
        fs::write(tessdata.join("chi_sim.traineddata"), b"stub").unwrap();

        let assets = OcrAssets::rooted_at(dir.path().to_path_buf());
        let provider = TesseractProvider::new(assets);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        provider.acquire(&tx).await.unwrap();
        drop(tx);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&OcrProgress::LoadingCore));
        assert!(events.contains(&OcrProgress::LoadingLanguageData { percent: 50 }));
        assert!(events.contains(&OcrProgress::LoadingLanguageData { percent: 100 }));
        assert!(events.contains(&OcrProgress::Initializing));
    }
}
