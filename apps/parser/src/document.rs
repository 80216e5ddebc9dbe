//! Document text extraction: PDF/DOCX byte streams to normalized plain text.
//!
//! Reader failures are never fatal: each underlying reader degrades to
//! an empty string and the pipeline decides afterwards whether the
//! document was usable. Only an unsupported file extension is a hard
//! error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::ParseError;

/// Default character budget for extracted text.
pub const DEFAULT_MAX_CHARS: usize = 50_000;

/// Below this many trimmed characters the primary PDF reader is
/// considered to have failed and the secondary reader is tried.
const PDF_FALLBACK_THRESHOLD: usize = 50;

const TRUNCATION_MARKER: &str = "...[truncated]";

/// Extract textual content from a PDF or DOCX file and truncate it to
/// `max_chars`.
///
/// The result preserves line boundaries (the name heuristic depends on
/// line position) but collapses whitespace inside each line and drops
/// empty lines.
pub fn extract_text(path: &Path, max_chars: usize) -> Result<String, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let raw = match ext.as_str() {
        "pdf" => read_pdf(path),
        "docx" => read_docx(path),
        other => return Err(ParseError::UnsupportedFormat(format!(".{other}"))),
    };

    Ok(truncate(&normalize_keep_newlines(&raw), max_chars))
}

/// Try the text-layer reader first, then fall back to a page-by-page
/// walk; keep whichever output is longer.
fn read_pdf(path: &Path) -> String {
    let primary = match pdf_extract::extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("primary PDF reader failed for {}: {e}", path.display());
            String::new()
        }
    };

    if primary.trim().len() >= PDF_FALLBACK_THRESHOLD {
        return primary;
    }

    debug!(
        "primary PDF text below {PDF_FALLBACK_THRESHOLD} chars, trying page walk for {}",
        path.display()
    );
    let secondary = read_pdf_pages(path).unwrap_or_default();
    if secondary.trim().len() > primary.trim().len() {
        secondary
    } else {
        primary
    }
}

fn read_pdf_pages(path: &Path) -> Option<String> {
    let doc = lopdf::Document::load(path).ok()?;
    let mut parts: Vec<String> = Vec::new();
    for (page_num, _) in doc.get_pages() {
        if let Ok(page_text) = doc.extract_text(&[page_num]) {
            if !page_text.trim().is_empty() {
                parts.push(page_text);
            }
        }
    }
    Some(parts.join("\n"))
}

/// Extract text from a DOCX file: paragraph text in document order,
/// then table-cell text row-major.
fn read_docx(path: &Path) -> String {
    match read_docx_inner(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("DOCX read failed for {}: {e}", path.display());
            String::new()
        }
    }
}

fn read_docx_inner(path: &Path) -> anyhow::Result<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;
    Ok(docx_lines(&xml).join("\n"))
}

static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:tbl(?: [^>]*)?>.*?</w:tbl>").unwrap());
static PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:p(?: [^>]*)?>.*?</w:p>").unwrap());
static CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<w:tc(?: [^>]*)?>.*?</w:tc>").unwrap());
static RUN_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:t(?: [^>]*)?>(.*?)</w:t>").unwrap());

fn docx_lines(xml: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    // Tables are cut from the body first so their paragraphs are not
    // emitted twice; cells come after all body paragraphs, row-major.
    let body = TABLE_RE.replace_all(xml, "");
    for paragraph in PARAGRAPH_RE.find_iter(&body) {
        lines.push(run_text(paragraph.as_str()));
    }
    for table in TABLE_RE.find_iter(xml) {
        for cell in CELL_RE.find_iter(table.as_str()) {
            let text = run_text(cell.as_str());
            if !text.is_empty() {
                lines.push(text);
            }
        }
    }
    lines
}

fn run_text(fragment: &str) -> String {
    let mut out = String::new();
    for capture in RUN_TEXT_RE.captures_iter(fragment) {
        out.push_str(&capture[1]);
    }
    unescape_xml(&out)
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

static INLINE_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Preserve line breaks; normalize spaces inside each line.
fn normalize_keep_newlines(raw: &str) -> String {
    let raw = raw.replace('\r', "\n").replace('\0', " ");
    raw.split('\n')
        .map(|line| INLINE_WS_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to roughly `max_chars` characters with a clear marker.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(10);
    let cut: String = s.chars().take(keep).collect();
    format!("{cut}{TRUNCATION_MARKER}")
}
