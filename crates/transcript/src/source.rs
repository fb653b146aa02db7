//! Readers that turn exported conversations into header-labeled text.
//!
//! Structured exports are rendered as one `User: ...` / `Assistant: ...` line
//! per message so they flow through the same segmentation path as pasted text.
//! Unknown JSON shapes are dumped verbatim and end up in the blank-line
//! fallback. Word documents contribute their body paragraphs, one per line.

use crate::error::{Result, TranscriptError};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Main document part inside a `.docx` package
const DOCX_DOCUMENT_PART: &str = "word/document.xml";

/// Supported transcript container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    Json,
    Docx,
}

impl ExportFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(Self::PlainText),
            "json" => Ok(Self::Json),
            "docx" => Ok(Self::Docx),
            other => Err(TranscriptError::unsupported_format(if other.is_empty() {
                "<none>"
            } else {
                other
            })),
        }
    }

    #[must_use]
    pub fn is_supported_path(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

/// Read a transcript file and return decoded, header-labeled text.
pub fn read_transcript(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    match ExportFormat::from_path(path)? {
        ExportFormat::PlainText => Ok(std::fs::read_to_string(path)?),
        ExportFormat::Json => {
            let value: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(render_json_export(&value))
        }
        ExportFormat::Docx => read_docx(File::open(path)?),
    }
}

/// Body paragraph text of a `.docx` package, joined with newlines.
pub fn read_docx<R: Read + std::io::Seek>(package: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(package)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_DOCUMENT_PART)?
        .read_to_string(&mut xml)?;
    docx_body_text(&xml)
}

/// Extract body paragraphs from WordprocessingML.
///
/// Run text is concatenated per paragraph; `w:tab` becomes a tab and
/// `w:br`/`w:cr` a newline. Paragraphs inside tables are skipped. The joined
/// result is trimmed.
pub fn docx_body_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => match tag.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" if table_depth == 0 => current.clear(),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(tag) if table_depth == 0 => match tag.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text && table_depth == 0 => {
                current.push_str(&text.unescape()?);
            }
            Event::End(tag) => match tag.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 => paragraphs.push(std::mem::take(&mut current)),
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!("Read {} paragraphs from word document", paragraphs.len());
    Ok(paragraphs.join("\n").trim().to_string())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    const fn header(self) -> &'static str {
        match self {
            Self::User => "User:",
            Self::Assistant => "Assistant:",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "user" | "human" | "system" => Some(Self::User),
            "assistant" | "claude" | "model" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// Render a decoded JSON export into header-labeled transcript text.
#[must_use]
pub fn render_json_export(value: &Value) -> String {
    if let Some(messages) = message_list(value) {
        return messages
            .iter()
            .map(|message| {
                let speaker = message_role(message)
                    .and_then(Speaker::from_label)
                    .unwrap_or(Speaker::User);
                let content = message.get("content").map(flatten_content).unwrap_or_default();
                format!("{} {}", speaker.header(), content)
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    if value.get("type").and_then(Value::as_str) == Some("message") {
        if let (Some(role), Some(content)) = (value.get("role"), value.get("content")) {
            let speaker = role
                .as_str()
                .and_then(Speaker::from_label)
                .unwrap_or(Speaker::Assistant);
            return format!("{} {}", speaker.header(), flatten_content(content));
        }
    }

    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn message_list(value: &Value) -> Option<&[Value]> {
    if let Some(messages) = value.get("messages").and_then(Value::as_array) {
        return Some(messages.as_slice());
    }

    let items = value.as_array()?;
    let first = items.first()?;
    if first.is_object() && first.get("messages").is_some() {
        return first.get("messages").and_then(Value::as_array).map(Vec::as_slice);
    }

    let all_messages = items.iter().all(|item| {
        item.as_object()
            .is_some_and(|obj| obj.contains_key("role") || obj.contains_key("sender"))
    });
    all_messages.then_some(items.as_slice())
}

fn message_role(message: &Value) -> Option<&str> {
    ["role", "sender", "author"]
        .iter()
        .filter_map(|key| message.get(*key))
        .find(|value| !value.is_null())
        .and_then(|value| match value {
            Value::String(role) => Some(role.as_str()),
            Value::Object(author) => author.get("role").and_then(Value::as_str),
            _ => None,
        })
}

fn flatten_content(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| {
                let part = part.as_object()?;
                match part.get("text") {
                    Some(Value::String(text)) => Some(text.clone()),
                    _ if part.contains_key("image_url") => Some("[image]".to_string()),
                    _ => None,
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(obj) if obj.contains_key("text") => match obj.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
