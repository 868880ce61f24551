//! Text extraction from uploaded résumés.
//!
//! Best-effort concatenated page text only: no OCR, no layout, no structure.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("could not parse PDF: {0}")]
    Parse(String),

    #[error("PDF has no extractable text layer")]
    NoText,

    #[error("PDF parser crashed on this document")]
    Panicked,
}

/// Turns an uploaded document into plain text.
///
/// Carried in `AppState` as `Arc<dyn TextExtractor>`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError>;
}

/// `pdf-extract` backed extractor. Parsing runs on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let size = bytes.len();
        let joined = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await;

        let text = match joined {
            Ok(Ok(text)) => text,
            Ok(Err(message)) => return Err(ExtractionError::Parse(message)),
            Err(join) if join.is_panic() => return Err(ExtractionError::Panicked),
            Err(join) => return Err(ExtractionError::Parse(join.to_string())),
        };

        let text = normalize_text(&text);
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }

        debug!("Extracted {} chars from {} byte PDF", text.len(), size);
        Ok(text)
    }
}

/// Trims trailing whitespace from each line and collapses runs of blank lines left by page breaks.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;

    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        out.push_str(line);
        blank_run = 0;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-page PDF showing `text` in Helvetica, with a correct xref table.
    fn text_pdf(text: &str) -> Bytes {
        let stream = format!("BT /F1 18 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
        ];

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref_at = out.len();
        out.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
        );
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        Bytes::from(out)
    }

    #[tokio::test]
    async fn test_text_layer_is_extracted() {
        let text = PdfTextExtractor
            .extract(text_pdf("Jane Doe Senior Rust Engineer"))
            .await
            .unwrap();
        assert!(text.contains("Jane Doe Senior Rust Engineer"), "{text:?}");
        assert_eq!(text, normalize_text(&text));
    }

    #[tokio::test]
    async fn test_page_without_text_is_rejected() {
        let err = PdfTextExtractor.extract(text_pdf("")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoText), "{err:?}");
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let err = PdfTextExtractor.extract(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_without_panicking() {
        let bytes = Bytes::from_static(b"this is definitely not a pdf document");
        let err = PdfTextExtractor.extract(bytes).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Parse(_) | ExtractionError::Panicked
        ));
    }

    #[tokio::test]
    async fn test_truncated_pdf_header_fails() {
        let bytes = Bytes::from_static(b"%PDF-1.4\n1 0 obj\n<<");
        assert!(PdfTextExtractor.extract(bytes).await.is_err());
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let raw = "\n\n  Jane Doe  \n\n\n\nSenior Engineer\nRust, Go\n\n";
        assert_eq!(normalize_text(raw), "  Jane Doe\n\nSenior Engineer\nRust, Go");
    }

    #[test]
    fn test_normalize_whitespace_only_is_empty() {
        assert!(normalize_text(" \n\t\n ").is_empty());
    }
}
