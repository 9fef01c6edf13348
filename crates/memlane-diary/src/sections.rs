//! Structured sections in oracle-written text.
//!
//! Diary text marks its sections two ways, sometimes mixed in one document:
//!
//! ```text
//! <observe>The market was quiet.</observe>
//! ## JOURNAL ##
//! I bought a painting.
//! ```
//!
//! [`scan_sections`] walks the text once and yields every recognised section
//! in document order. Unknown tags, nested tags, and unclosed tags are
//! skipped; if nothing is recognised callers fall back to the whole text.

use serde::{Deserialize, Serialize};

/// Recognised section kinds, in presentation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    CharacterAnalysis,
    Observations,
    Journal,
    Objectives,
}

impl SectionKind {
    pub const PRIORITY: [SectionKind; 4] = [
        SectionKind::CharacterAnalysis,
        SectionKind::Observations,
        SectionKind::Journal,
        SectionKind::Objectives,
    ];

    /// Map a normalised tag or header name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "character_analysis" | "character" | "analysis" => Some(SectionKind::CharacterAnalysis),
            "observe" | "observation" | "observations" => Some(SectionKind::Observations),
            "journal" | "diary" => Some(SectionKind::Journal),
            "objective" | "objectives" | "goals" => Some(SectionKind::Objectives),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

enum Closer {
    Tag(String),
    Header,
}

struct Open {
    kind: SectionKind,
    closer: Closer,
    start: usize,
}

/// Every recognised section, in document order. Bodies are trimmed and
/// empty bodies dropped.
pub fn scan_sections(text: &str) -> Vec<Section> {
    let bytes = text.as_bytes();
    let mut sections = Vec::new();
    let mut open: Option<Open> = None;
    let mut line_start = true;
    let mut i = 0;

    let close = |open: Open, end: usize, sections: &mut Vec<Section>| {
        let body = text[open.start..end].trim();
        if !body.is_empty() {
            sections.push(Section {
                kind: open.kind,
                body: body.to_string(),
            });
        }
    };

    while i < bytes.len() {
        if line_start {
            if let Some((name, next_line)) = header_at(text, i) {
                match open.take() {
                    Some(o @ Open { closer: Closer::Header, .. }) => close(o, i, &mut sections),
                    Some(o) => {
                        // Header text inside an open tag belongs to the tag body.
                        open = Some(o);
                        i = next_line;
                        line_start = true;
                        continue;
                    }
                    None => {}
                }
                if let Some(kind) = SectionKind::from_name(&name) {
                    open = Some(Open {
                        kind,
                        closer: Closer::Header,
                        start: next_line,
                    });
                }
                i = next_line;
                line_start = true;
                continue;
            }
        }

        if bytes[i] == b'<' {
            if let Some(tag) = tag_at(text, i) {
                let current_tag = match &open {
                    Some(Open {
                        closer: Closer::Tag(name),
                        ..
                    }) => Some(name.clone()),
                    _ => None,
                };

                if tag.closing {
                    if current_tag.as_deref() == Some(tag.name.as_str()) {
                        if let Some(o) = open.take() {
                            close(o, i, &mut sections);
                        }
                    }
                } else if current_tag.is_none() {
                    if let Some(kind) = SectionKind::from_name(&tag.name) {
                        // A tag ends any header section it appears in.
                        if let Some(o) = open.take() {
                            close(o, i, &mut sections);
                        }
                        open = Some(Open {
                            kind,
                            closer: Closer::Tag(tag.name),
                            start: tag.end,
                        });
                    }
                }
                line_start = false;
                i = tag.end;
                continue;
            }
        }

        line_start = bytes[i] == b'\n';
        i += 1;
    }

    if let Some(o @ Open { closer: Closer::Header, .. }) = open {
        close(o, text.len(), &mut sections);
    }
    sections
}

/// The diary body: recognised sections in priority order separated by a
/// blank line, or the whole text without markup when none are recognised.
pub fn extract_diary_text(text: &str) -> String {
    let sections = scan_sections(text);
    if sections.is_empty() {
        return strip_markup(text);
    }

    SectionKind::PRIORITY
        .iter()
        .flat_map(|kind| sections.iter().filter(move |s| s.kind == *kind))
        .map(|s| s.body.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Remove anything that parses as a tag, then trim.
pub fn strip_markup(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some(tag) = tag_at(text, i) {
                out.push_str(&text[copied_to..i]);
                copied_to = tag.end;
                i = tag.end;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&text[copied_to..]);
    out.trim().to_string()
}

/// Body of the first `<tag>…</tag>` pair, trimmed.
pub fn tagged_body<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open)? + open.len();
    let end = start + text[start..].find(&close)?;
    Some(text[start..end].trim())
}

// ── Token helpers ─────────────────────────────────────────────────────────────

const MAX_TAG_NAME: usize = 40;

struct Tag {
    name: String,
    closing: bool,
    /// Byte index just past the closing `>`.
    end: usize,
}

/// Parse `<name>` or `</name>` at byte `i`, which must hold `<`.
fn tag_at(text: &str, i: usize) -> Option<Tag> {
    let rest = &text[i + 1..];
    let (closing, rest) = match rest.strip_prefix('/') {
        Some(r) => (true, r),
        None => (false, rest),
    };
    let gt = rest.find('>')?;
    let raw = &rest[..gt];
    if !raw.starts_with(|c: char| c.is_ascii_alphabetic())
        || raw.len() > MAX_TAG_NAME
        || !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ')
    {
        return None;
    }
    let consumed = 1 + usize::from(closing) + gt + 1;
    Some(Tag {
        name: normalize(raw),
        closing,
        end: i + consumed,
    })
}

/// Parse a `## NAME ##` line starting at byte `i`. Returns the normalised
/// name and the index of the next line.
fn header_at(text: &str, i: usize) -> Option<(String, usize)> {
    let line = text[i..].split('\n').next().unwrap_or("");
    let next = (i + line.len() + 1).min(text.len());
    let trimmed = line.trim();
    if trimmed.len() < 5 || !trimmed.starts_with("##") || !trimmed.ends_with("##") {
        return None;
    }
    let name = trimmed.trim_matches('#').trim();
    if name.is_empty() {
        return None;
    }
    Some((normalize(name), next))
}

fn normalize(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}
