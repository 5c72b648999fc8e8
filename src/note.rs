//! Note model and on-disk codec
//!
//! A note is a free-text body under a structured TOML header. On disk the
//! header sits in a fenced ```toml block at the top of a `<uid>.md` file,
//! followed by a blank line and the body, as commonly done in markdown.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// UID grammar: a UTC instant rendered as `YYYYMMDDTHHMMSSZ`.
const UID_PATTERN: &str = r"\d{8}T\d{6}Z";

/// Regex matching UIDs anywhere in text, e.g. inside note bodies.
pub fn uid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UID_PATTERN).expect("UID pattern is valid"))
}

/// Regex matching a string that is exactly one UID, e.g. a file stem.
pub fn uid_exact_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{}$", UID_PATTERN)).expect("UID pattern is valid"))
}

fn note_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```toml\n(?P<header>[^`]+)```\n*(?P<body>.*)")
            .expect("note pattern is valid")
    })
}

/// Structured metadata on top of every note, marshalled as a TOML block.
///
/// Field order here fixes the TOML key order on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Free-text title
    #[serde(default)]
    pub title: String,
    /// Creation time with its original UTC offset
    #[serde(default)]
    pub timestamp: String,
    /// Identifier derived from the creation instant; immutable once assigned
    pub uid: String,
    /// Lowercase tags, sorted and deduplicated
    #[serde(default)]
    pub tags: Vec<String>,
    /// UIDs of notes whose bodies reference this one
    #[serde(default)]
    pub referred_from: Vec<String>,
    /// UIDs this note's body references
    #[serde(default)]
    pub refers_to: Vec<String>,
}

impl Header {
    /// Create a header dated `when`. The UID is rendered from the UTC view of
    /// the instant; the timestamp keeps the original offset.
    pub fn new(when: DateTime<FixedOffset>) -> Self {
        Header {
            title: String::new(),
            timestamp: when.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            uid: when.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string(),
            tags: Vec::new(),
            referred_from: Vec::new(),
            refers_to: Vec::new(),
        }
    }

    /// Enforce the unified header style in place: tags lowercase, all list
    /// fields sorted and deduplicated.
    pub fn arrange(&mut self) {
        for tag in &mut self.tags {
            *tag = tag.to_lowercase();
        }
        self.tags.sort();
        self.tags.dedup();
        self.referred_from.sort();
        self.referred_from.dedup();
        self.refers_to.sort();
        self.refers_to.dedup();
    }

    fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::parse(format!("cannot encode note header: {}", e)))
    }
}

/// A single note: header plus free-form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub header: Header,
    pub body: String,
}

impl Note {
    /// Create an empty note dated `when`.
    pub fn new(when: DateTime<FixedOffset>) -> Self {
        Note {
            header: Header::new(when),
            body: String::new(),
        }
    }

    /// Enforce the unified note style in place.
    pub fn arrange(&mut self) {
        self.header.arrange();
    }

    /// Render the on-disk form: fenced TOML header, blank line, body.
    pub fn encode(&self) -> Result<String> {
        Ok(format!("```toml\n{}```\n\n{}\n", self.header.to_toml()?, self.body))
    }

    /// Parse the on-disk form back into a note. The body is trimmed of
    /// leading and trailing whitespace; everything else round-trips.
    pub fn decode(content: &str) -> Result<Note> {
        let captures = note_regex()
            .captures(content)
            .ok_or_else(|| Error::parse("missing ```toml header block"))?;

        let header_raw = captures
            .name("header")
            .map(|m| m.as_str())
            .unwrap_or_default();
        let header: Header = toml::from_str(header_raw)
            .map_err(|e| Error::parse(format!("cannot decode note header: {}", e)))?;

        let body = captures
            .name("body")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(Note { header, body })
    }
}
