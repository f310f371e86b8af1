//! EML ingestion: raw bytes to a normalized `Record`

use std::path::Path;

use mailparse::{DispositionType, MailHeader, MailHeaderMap, ParsedMail};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::decode::{decode_bytes, decode_part};
use crate::error::{PipelineError, Result};
use crate::html::html_to_text;
use crate::types::{Attachment, HeaderMap, Record};

/// Declared intent of a leaf part with a `Content-Disposition` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

/// Text flavor of a leaf part, from its MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// `text/plain`
    Plain,
    /// `text/html`
    Html,
    /// Any other `text/*`
    OtherText,
}

/// Role of a MIME part, decided once during the tree walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// `multipart/*`: structure only
    Container,
    /// Leaf declared as attachment or inline; `text` is set for text types
    Attachment {
        disposition: Disposition,
        text: Option<TextKind>,
    },
    /// Leaf text part without a disposition
    BodyText(TextKind),
    /// Leaf that is neither text nor declared as an attachment
    Opaque,
}

impl PartKind {
    /// Classify a single part, ignoring its children
    #[must_use]
    pub fn of(part: &ParsedMail<'_>) -> Self {
        let mimetype = part.ctype.mimetype.to_ascii_lowercase();
        if mimetype.starts_with("multipart/") {
            return Self::Container;
        }

        let text = text_kind(&mimetype);
        match disposition(part) {
            Some(disposition) => Self::Attachment { disposition, text },
            None => text.map_or(Self::Opaque, Self::BodyText),
        }
    }

    /// Text kind this part contributes to the body of a multipart message
    ///
    /// Only `attachment` keeps a part out of the body; inline text parts count.
    #[must_use]
    pub const fn body_text(self) -> Option<TextKind> {
        match self {
            Self::BodyText(kind)
            | Self::Attachment {
                disposition: Disposition::Inline,
                text: Some(kind),
            } => Some(kind),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_attachment(self) -> bool {
        matches!(self, Self::Attachment { .. })
    }
}

/// A part of the MIME tree together with its role
#[derive(Debug)]
pub struct ClassifiedPart<'p, 'a> {
    pub part: &'p ParsedMail<'a>,
    pub kind: PartKind,
}

/// Visit every part of the tree in order, the root included
#[must_use]
pub fn walk_parts<'p, 'a>(root: &'p ParsedMail<'a>) -> Vec<ClassifiedPart<'p, 'a>> {
    let mut parts = Vec::new();
    walk_recursive(root, &mut parts);
    parts
}

fn walk_recursive<'p, 'a>(part: &'p ParsedMail<'a>, parts: &mut Vec<ClassifiedPart<'p, 'a>>) {
    parts.push(ClassifiedPart {
        part,
        kind: PartKind::of(part),
    });
    for sub in &part.subparts {
        walk_recursive(sub, parts);
    }
}

fn text_kind(mimetype: &str) -> Option<TextKind> {
    match mimetype {
        "text/plain" => Some(TextKind::Plain),
        "text/html" => Some(TextKind::Html),
        _ if mimetype.starts_with("text/") => Some(TextKind::OtherText),
        _ => None,
    }
}

fn disposition(part: &ParsedMail<'_>) -> Option<Disposition> {
    let value = part.headers.get_first_value("Content-Disposition")?;
    match mailparse::parse_content_disposition(&value).disposition {
        DispositionType::Attachment => Some(Disposition::Attachment),
        DispositionType::Inline => Some(Disposition::Inline),
        _ => None,
    }
}

/// Split raw bytes at the first blank line
///
/// CRLFCRLF wins over LFLF wherever they occur. Without a blank line the whole
/// buffer is the header block and there is no body.
#[must_use]
pub fn split_message(raw: &[u8]) -> (&[u8], Option<&[u8]>) {
    for marker in [&b"\r\n\r\n"[..], &b"\n\n"[..]] {
        if let Some(pos) = raw.windows(marker.len()).position(|w| w == marker) {
            return (&raw[..pos], Some(&raw[pos + marker.len()..]));
        }
    }
    (raw, None)
}

/// Parse raw email bytes into a `Record`
///
/// Never fails. Messages the MIME parser rejects fall back to a line-based
/// header scan and an undecoded body; messages without a blank line have an
/// empty body.
#[must_use]
pub fn parse_eml(raw: &[u8], source_name: &str) -> Record {
    let (header_bytes, body_bytes) = split_message(raw);
    let raw_headers = String::from_utf8_lossy(header_bytes).into_owned();

    let (header_list, body, attachments) = match mailparse::parse_mail(raw) {
        Ok(parsed) => {
            let header_list: Vec<String> =
                parsed.headers.iter().map(MailHeader::get_key).collect();
            if body_bytes.is_some() {
                let parts = walk_parts(&parsed);
                (
                    header_list,
                    resolve_body(&parsed, &parts),
                    extract_attachments(&parts, source_name),
                )
            } else {
                (header_list, String::new(), Vec::new())
            }
        }
        Err(e) => {
            warn!("MIME structure of {source_name} rejected, using line scan: {e}");
            let header_list: Vec<String> = HeaderMap::parse(&raw_headers)
                .names()
                .map(str::to_string)
                .collect();
            let body = body_bytes
                .map(|bytes| decode_bytes(bytes, "utf-8").trim().to_string())
                .unwrap_or_default();
            (header_list, body, Vec::new())
        }
    };

    debug!(
        "Parsed {source_name}: {} headers, {} attachments, {} body chars",
        header_list.len(),
        attachments.len(),
        body.chars().count()
    );

    Record {
        email_id: Uuid::new_v4().to_string(),
        header_list,
        raw_headers,
        body,
        og_fname: source_name.to_string(),
        attachments,
    }
}

/// Read and parse one EML file
pub fn parse_eml_file(path: &Path) -> Result<Record> {
    let source_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let raw = std::fs::read(path).map_err(|e| {
        error!("Error processing {source_name}: {e}");
        PipelineError::io(path, e)
    })?;

    Ok(parse_eml(&raw, &source_name))
}

/// Pick the body text: plain parts, else normalized HTML parts, else nothing
fn resolve_body(root: &ParsedMail<'_>, parts: &[ClassifiedPart<'_, '_>]) -> String {
    let mut plain = String::new();
    let mut html = String::new();

    if parts.first().is_some_and(|p| p.kind == PartKind::Container) {
        for classified in parts {
            match classified.kind.body_text() {
                Some(TextKind::Plain) => plain.push_str(&decode_part(classified.part)),
                Some(TextKind::Html) => html.push_str(&decode_part(classified.part)),
                Some(TextKind::OtherText) | None => {}
            }
        }
    } else {
        match text_kind(&root.ctype.mimetype.to_ascii_lowercase()) {
            Some(TextKind::Plain | TextKind::OtherText) => plain = decode_part(root),
            Some(TextKind::Html) => html = decode_part(root),
            None => {}
        }
    }

    let body = if !plain.trim().is_empty() {
        plain
    } else if !html.trim().is_empty() {
        html_to_text(&html)
    } else {
        String::new()
    };

    body.trim().to_string()
}

fn extract_attachments(parts: &[ClassifiedPart<'_, '_>], source_name: &str) -> Vec<Attachment> {
    parts
        .iter()
        .filter(|classified| classified.kind.is_attachment())
        .filter_map(|classified| {
            let part = classified.part;
            let content_type = part.ctype.mimetype.to_ascii_lowercase();
            let filename = attachment_filename(part)
                .unwrap_or_else(|| format!("unnamed_attachment{}", guess_extension(&content_type)));

            match part.get_body_raw() {
                Ok(data) => Some(Attachment::new(filename, content_type, data)),
                Err(e) => {
                    warn!("Failed to extract attachment {filename} from {source_name}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Declared filename: disposition `filename`, then content-type `name`
fn attachment_filename(part: &ParsedMail<'_>) -> Option<String> {
    part.headers
        .get_first_value("Content-Disposition")
        .and_then(|value| {
            mailparse::parse_content_disposition(&value)
                .params
                .get("filename")
                .cloned()
        })
        .or_else(|| part.ctype.params.get("name").cloned())
        .filter(|name| !name.trim().is_empty())
}

/// File extension for a MIME type, `.bin` when unknown
#[must_use]
pub fn guess_extension(content_type: &str) -> &'static str {
    match content_type {
        "text/plain" => ".txt",
        "text/html" => ".html",
        "text/csv" => ".csv",
        "text/calendar" => ".ics",
        "text/xml" | "application/xml" => ".xml",
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/svg+xml" => ".svg",
        "image/webp" => ".webp",
        "image/tiff" => ".tiff",
        "application/pdf" => ".pdf",
        "application/zip" => ".zip",
        "application/gzip" => ".gz",
        "application/json" => ".json",
        "application/javascript" => ".js",
        "application/msword" => ".doc",
        "application/vnd.ms-excel" => ".xls",
        "application/vnd.ms-powerpoint" => ".ppt",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => ".xlsx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => ".pptx",
        "application/rtf" => ".rtf",
        "application/x-rar-compressed" | "application/vnd.rar" => ".rar",
        "application/x-7z-compressed" => ".7z",
        "message/rfc822" => ".eml",
        "audio/mpeg" => ".mp3",
        "audio/wav" | "audio/x-wav" => ".wav",
        "video/mp4" => ".mp4",
        _ => ".bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_prefers_crlf_boundary() {
        let raw = b"A: 1\n\nB: 2\r\n\r\nbody";
        let (headers, body) = split_message(raw);
        assert_eq!(headers, b"A: 1\n\nB: 2");
        assert_eq!(body, Some(&b"body"[..]));
    }

    #[test]
    fn test_split_without_boundary() {
        let (headers, body) = split_message(b"Subject: x");
        assert_eq!(headers, b"Subject: x");
        assert!(body.is_none());
    }

    #[test]
    fn test_text_kind() {
        assert_eq!(text_kind("text/plain"), Some(TextKind::Plain));
        assert_eq!(text_kind("text/html"), Some(TextKind::Html));
        assert_eq!(text_kind("text/enriched"), Some(TextKind::OtherText));
        assert_eq!(text_kind("image/png"), None);
    }
}
