use crate::core::error::ScriptError;
use crate::utils::text::normalize_text;
use anyhow::Result;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;

/// Container formats a script can be uploaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Text,
    WordProcessor,
    Pdf,
}

impl SourceFormat {
    /// Accepts `txt`, `.TXT`, `docx`, `.pdf`, ...
    pub fn from_extension(ext: &str) -> Result<Self, ScriptError> {
        let normalized = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "txt" => Ok(SourceFormat::Text),
            "docx" => Ok(SourceFormat::WordProcessor),
            "pdf" => Ok(SourceFormat::Pdf),
            _ => Err(ScriptError::UnsupportedFormat {
                extension: ext.to_string(),
            }),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ScriptError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Text => "txt",
            SourceFormat::WordProcessor => "docx",
            SourceFormat::Pdf => "pdf",
        }
    }
}

/// Turns the raw bytes of an uploaded file into one UTF-8 string with LF
/// line endings. `origin` only appears in error messages.
pub fn extract_text(format: SourceFormat, bytes: &[u8], origin: &str) -> Result<String, ScriptError> {
    debug!("Extracting {} bytes of {:?} from {}", bytes.len(), format, origin);
    let text = match format {
        SourceFormat::Text => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| ScriptError::extraction(origin, e))?,
        SourceFormat::WordProcessor => {
            extract_docx(bytes).map_err(|e| ScriptError::extraction(origin, e))?
        }
        SourceFormat::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ScriptError::extraction(origin, e))?
        }
    };
    Ok(normalize_text(&text))
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;
    docx_xml_to_text(&xml)
}

/// One output line per `w:p` paragraph.
fn docx_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.decode()?),
            Event::GeneralRef(r) if in_text => {
                if let Some(c) = r.resolve_char_ref()? {
                    out.push(c);
                } else {
                    match &*r.decode()? {
                        "amp" => out.push('&'),
                        "lt" => out.push('<'),
                        "gt" => out.push('>'),
                        "quot" => out.push('"'),
                        "apos" => out.push('\''),
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
