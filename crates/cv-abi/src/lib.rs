//! Interface descriptor (ABI) parsing.
//!
//! Backends serve the contract ABI either as an already-structured JSON
//! array or as a string that may carry stray newlines and indentation from
//! whatever artifact file it was read out of. This crate normalizes both
//! shapes into a validated method table once, at the trust boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Method roles the rest of the client depends on. Their absence is a
/// warning, not a parse failure: the descriptor may still serve other calls.
pub const REQUIRED_METHODS: [&str; 3] = ["store", "get", "listForOwner"];

/// One entry of a contract ABI. Signature metadata (inputs, outputs,
/// mutability) is carried opaquely; only `name` and the kind tag matter here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub signature: serde_json::Map<String, Value>,
}

impl AbiEntry {
    pub fn is_function_named(&self, name: &str) -> bool {
        self.kind == "function" && self.name.as_deref() == Some(name)
    }
}

/// The ABI payload as it arrives from the backend: either already
/// structured or a string still needing cleanup.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAbi {
    Structured(Vec<AbiEntry>),
    Text(String),
}

/// A validated, non-empty method table.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct InterfaceDescriptor {
    entries: Vec<AbiEntry>,
}

impl InterfaceDescriptor {
    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.is_function_named(name))
    }
}

/// Parse outcome: the descriptor plus any required methods it lacks.
#[derive(Debug)]
pub struct ParsedDescriptor {
    pub descriptor: InterfaceDescriptor,
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("failed to parse interface descriptor: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("interface descriptor is empty")]
    Empty,
}

/// Turn a raw ABI payload into a validated method table.
///
/// Structured input is used as-is. Textual input is normalized (trimmed,
/// newlines dropped, whitespace runs collapsed) and parsed; a single repair
/// heuristic re-trims a leading space before the opening bracket. Any
/// further failure propagates the original parse error.
pub fn parse(raw: RawAbi) -> Result<ParsedDescriptor, AbiError> {
    let entries = match raw {
        RawAbi::Structured(entries) => entries,
        RawAbi::Text(text) => parse_text(&text)?,
    };

    if entries.is_empty() {
        return Err(AbiError::Empty);
    }

    let descriptor = InterfaceDescriptor { entries };
    let missing = REQUIRED_METHODS
        .iter()
        .copied()
        .filter(|method| !descriptor.has_function(method))
        .collect();

    Ok(ParsedDescriptor { descriptor, missing })
}

fn parse_text(text: &str) -> Result<Vec<AbiEntry>, AbiError> {
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return Err(AbiError::Empty);
    }

    match serde_json::from_str(&cleaned) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            if cleaned.starts_with(" [") {
                if let Ok(entries) = serde_json::from_str(cleaned.trim_start()) {
                    return Ok(entries);
                }
            }
            Err(AbiError::Parse(err))
        }
    }
}

/// Trim, drop newlines, then collapse remaining whitespace runs to single
/// spaces.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.trim().chars() {
        if ch == '\n' {
            continue;
        }
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
