//! Text Extraction Module Tests
//!
//! Reading prescription text from files on disk.

use crate::error::AppError;
use crate::extraction::{ClinicalExtractor, LexiconRecognizer, Vital};
use crate::text_extract;
use crate::ExtractorConfig;
use std::io::Write;
use std::sync::Arc;
use tempfile::{Builder, TempDir};

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content).unwrap();
    path
}

#[cfg(test)]
mod read_input_tests {
    use super::*;

    #[test]
    fn test_read_plain_text_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rx.txt", b"Metformin 500mg BD\nBP 130/80");

        let text = text_extract::read_input(&path).unwrap();
        assert_eq!(text, "Metformin 500mg BD\nBP 130/80");
    }

    #[test]
    fn test_read_markdown_and_csv() {
        let dir = TempDir::new().unwrap();
        let md = write_file(&dir, "notes.md", b"# Plan\n- yoga daily");
        let csv = write_file(&dir, "rx.csv", b"drug,dose\naspirin,75mg");

        assert!(text_extract::read_input(&md).unwrap().contains("yoga daily"));
        assert!(text_extract::read_input(&csv).unwrap().contains("aspirin"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = text_extract::read_input(&dir.path().join("absent.txt"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let file = Builder::new().suffix(".png").tempfile().unwrap();
        let result = text_extract::read_input(file.path());
        assert!(matches!(result, Err(AppError::Input(_))));
    }

    #[test]
    fn test_corrupt_docx_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rx.docx", b"PK\x03\x04 not really a zip");
        assert!(text_extract::read_input(&path).is_err());
    }

    #[test]
    fn test_file_through_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "visit.txt", b"Weight 82 kg\nwalk 30 minutes");

        let text = text_extract::read_input(&path).unwrap();
        let extractor = ClinicalExtractor::with_recognizer(
            Arc::new(LexiconRecognizer::new()),
            ExtractorConfig::default(),
        );
        let record = extractor.extract(&text).unwrap();

        assert_eq!(record.vitals, vec![Vital::new("Weight", "82")]);
        assert_eq!(record.activities.len(), 1);
        assert_eq!(record.activities[0].title, "Walk");
    }
}
