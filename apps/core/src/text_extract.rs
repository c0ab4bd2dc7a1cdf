//! Text extraction module for prescription documents
//! Supports: TXT, MD, CSV, JSON, PDF, DOCX

use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Read input text from a file path, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> AppResult<String> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(String::from_utf8(buf)?);
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let data = std::fs::read(path)?;
    extract_text_from_file(file_name, &data)
}

/// Extract text content from binary file data based on file extension
pub fn extract_text_from_file(file_name: &str, file_data: &[u8]) -> AppResult<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    info!("Extracting text from file: {} (type: {})", file_name, extension);

    match extension.as_str() {
        // Plain text formats - direct UTF-8 conversion
        "txt" | "md" | "csv" | "json" => Ok(String::from_utf8(file_data.to_vec())?),

        "pdf" => extract_pdf_text(file_data),

        "docx" => extract_docx_text(file_data),

        _ => Err(AppError::Input(format!(
            "Unsupported file extension: {}",
            extension
        ))),
    }
}

/// Extract text from PDF file
fn extract_pdf_text(file_data: &[u8]) -> AppResult<String> {
    match pdf_extract::extract_text_from_mem(file_data) {
        Ok(text) => {
            let cleaned = clean_extracted_text(&text);
            info!("PDF extraction successful: {} characters", cleaned.len());
            Ok(cleaned)
        }
        Err(e) => {
            warn!("PDF extraction failed: {}", e);
            Err(AppError::Input(format!("Failed to extract PDF text: {}", e)))
        }
    }
}

/// Extract text from DOCX file
fn extract_docx_text(file_data: &[u8]) -> AppResult<String> {
    let docx = docx_rs::read_docx(file_data).map_err(|e| {
        warn!("DOCX extraction failed: {}", e);
        AppError::Input(format!("Failed to extract DOCX text: {}", e))
    })?;

    let mut paragraphs: Vec<String> = Vec::new();

    for child in docx.document.children {
        let docx_rs::DocumentChild::Paragraph(para) = child else {
            continue;
        };

        let para_text: String = para
            .children
            .iter()
            .filter_map(|pc| match pc {
                docx_rs::ParagraphChild::Run(run) => Some(
                    run.children
                        .iter()
                        .filter_map(|rc| match rc {
                            docx_rs::RunChild::Text(t) => Some(t.text.as_str()),
                            _ => None,
                        })
                        .collect::<String>(),
                ),
                _ => None,
            })
            .collect();

        if !para_text.trim().is_empty() {
            paragraphs.push(para_text);
        }
    }

    let cleaned = clean_extracted_text(&paragraphs.join("\n"));
    info!("DOCX extraction successful: {} characters", cleaned.len());
    Ok(cleaned)
}

/// Trim lines and drop blank ones
fn clean_extracted_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_extraction() {
        let content = b"Metformin 500mg\nBP 120/80";
        let result = extract_text_from_file("rx.txt", content);
        assert_eq!(result.unwrap(), "Metformin 500mg\nBP 120/80");
    }

    #[test]
    fn test_extension_case_insensitive() {
        let result = extract_text_from_file("RX.TXT", b"walk daily");
        assert_eq!(result.unwrap(), "walk daily");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = extract_text_from_file("scan.png", b"\x89PNG");
        assert!(matches!(result, Err(AppError::Input(ref msg)) if msg.contains("Unsupported")));
    }

    #[test]
    fn test_invalid_utf8() {
        let result = extract_text_from_file("rx.txt", &[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(AppError::Input(_))));
    }

    #[test]
    fn test_invalid_pdf() {
        let result = extract_text_from_file("rx.pdf", b"not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_clean_extracted_text() {
        let dirty = "  Line 1  \n\n  Line 2  \n   \n  Line 3  ";
        assert_eq!(clean_extracted_text(dirty), "Line 1\nLine 2\nLine 3");
    }
}
