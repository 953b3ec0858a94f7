//! Best-effort text extraction for uploaded files
//!
//! Extraction never propagates an error: an unparseable file degrades to an
//! empty string (logged), and ingestion continues with an empty chunk set.
//! Callers must tolerate empty text.

use docx_rs::read_docx;

/// Extract plain text from file bytes, dispatching on the filename extension.
///
/// Supported: `.pdf`, `.docx`, `.txt`. Any other extension, and any parse
/// failure, yields an empty string.
pub fn extract_text(filename: &str, data: &[u8]) -> String {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match extension.as_str() {
        "pdf" => extract_pdf(filename, data),
        "docx" => extract_docx(filename, data),
        "txt" => extract_txt(filename, data),
        other => {
            tracing::warn!("Unsupported file type '{}' for {}", other, filename);
            String::new()
        }
    }
}

/// Extract PDF text, pages joined with newlines
fn extract_pdf(filename: &str, data: &[u8]) -> String {
    let content = match pdf_extract::extract_text_from_mem(data) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to parse PDF {}: {}", filename, e);
            return String::new();
        }
    };

    // pdf-extract leaves null chars and ragged whitespace behind
    let content = content
        .replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if content.is_empty() {
        tracing::warn!("No text extracted from PDF {}", filename);
    } else if let Ok(doc) = lopdf::Document::load_mem(data) {
        tracing::debug!(
            "Extracted {} chars from {} ({} pages)",
            content.len(),
            filename,
            doc.get_pages().len()
        );
    }

    content
}

/// Extract DOCX text, paragraphs joined with newlines
fn extract_docx(filename: &str, data: &[u8]) -> String {
    let docx = match read_docx(data) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("Failed to parse DOCX {}: {}", filename, e);
            return String::new();
        }
    };

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            let text = para.raw_text();
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }

    let content = paragraphs.join("\n");
    if content.is_empty() {
        tracing::warn!("No text extracted from DOCX {}", filename);
    }

    content
}

/// Decode a text file as strict UTF-8
fn extract_txt(filename: &str, data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!("Failed to decode TXT {} as UTF-8: {}", filename, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_extraction() {
        let text = extract_text("notes.txt", b"The capital of France is Paris.");
        assert_eq!(text, "The capital of France is Paris.");
    }

    #[test]
    fn test_txt_invalid_utf8_yields_empty() {
        let text = extract_text("broken.txt", &[0xff, 0xfe, 0x80]);
        assert_eq!(text, "");
    }

    #[test]
    fn test_unsupported_extension_yields_empty() {
        assert_eq!(extract_text("tool.exe", b"MZ\x90\x00"), "");
        assert_eq!(extract_text("data.csv", b"a,b,c"), "");
        assert_eq!(extract_text("noextension", b"hello"), "");
    }

    #[test]
    fn test_corrupt_pdf_yields_empty() {
        // Not a real PDF; extraction must degrade, never panic
        assert_eq!(extract_text("corrupt.pdf", b"not a pdf at all"), "");
    }

    #[test]
    fn test_corrupt_docx_yields_empty() {
        // DOCX is a zip container; garbage bytes must degrade to empty
        assert_eq!(extract_text("corrupt.docx", b"not a zip archive"), "");
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        let text = extract_text("NOTES.TXT", b"shouting");
        assert_eq!(text, "shouting");
    }
}
