#![forbid(unsafe_code)]

mod config;
mod grammar;
mod index;
mod plan;
mod record;
mod schema;

pub use config::{EmitConfig, GedcomConfig, OnError, ParseConfig};
pub use index::CrossReferenceIndex;
pub use plan::{Emit, LinePlan, Plan, PlanTag, emission_plan};
pub use record::{
    Category, Field, FieldAnchor, FieldValue, NEWLINE_MARKER, Record, RecordId, RecordKind, Transmission,
    XrefRef, render_words,
};
pub use schema::{Action, DataType, GrammarSchema, RuleSet, Source, State, TagContext, TagRule};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest xref key the format allows, delimiters excluded.
pub const MAX_XREF_LEN: usize = 22;

/// One tokenized input line. Transient: consumed by the parser as soon as it is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Line {
    /// 1-based source line number.
    pub number: usize,
    pub level: u32,
    /// Xref key with the `@` delimiters stripped.
    pub xref: Option<String>,
    pub tag: String,
    pub data: Option<Vec<String>>,
}

impl Line {
    #[must_use]
    pub fn is_user_defined(&self) -> bool {
        self.tag.starts_with('_')
    }

    #[must_use]
    pub const fn context(&self) -> TagContext {
        if self.xref.is_some() {
            TagContext::Xref
        } else {
            TagContext::Plain
        }
    }

    #[must_use]
    pub fn data_words(&self) -> &[String] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Tokens after the level, in source order.
    #[must_use]
    pub fn source_tokens(&self) -> Vec<String> {
        let xref = self.xref.as_ref().map(|key| format!("@{key}@"));
        let mut tokens = Vec::with_capacity(2 + self.data_words().len());
        if self.level == 0 {
            tokens.extend(xref);
            tokens.push(self.tag.clone());
        } else {
            tokens.push(self.tag.clone());
            tokens.extend(xref);
        }
        tokens.extend(self.data_words().iter().cloned());
        tokens
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GedcomErrorCode {
    #[default]
    Structural,
    UnrecognizedTag,
    DuplicateKey,
    DanglingReference,
    MissingTrailer,
    Schema,
}

impl GedcomErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "gedcom/error/structural",
            Self::UnrecognizedTag => "gedcom/error/unrecognized-tag",
            Self::DuplicateKey => "gedcom/error/duplicate-key",
            Self::DanglingReference => "gedcom/error/dangling-reference",
            Self::MissingTrailer => "gedcom/error/missing-trailer",
            Self::Schema => "gedcom/error/schema",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum GedcomError {
    #[error("line {line}: {message}")]
    Structural { line: usize, message: String },
    #[error("line {line}: unrecognized tag `{tag}` in {state} context")]
    UnrecognizedTag {
        line: usize,
        tag: String,
        state: String,
    },
    #[error("line {line}: duplicate {category} key @{key}@")]
    DuplicateKey {
        line: usize,
        category: Category,
        key: String,
    },
    #[error("no {category} record with key @{key}@")]
    DanglingReference { category: Category, key: String },
    #[error("transmission ended without a TRLR record")]
    MissingTrailer,
    #[error("line {line}: {message}")]
    Schema { line: usize, message: String },
}

impl GedcomError {
    #[must_use]
    pub const fn code(&self) -> GedcomErrorCode {
        match self {
            Self::Structural { .. } => GedcomErrorCode::Structural,
            Self::UnrecognizedTag { .. } => GedcomErrorCode::UnrecognizedTag,
            Self::DuplicateKey { .. } => GedcomErrorCode::DuplicateKey,
            Self::DanglingReference { .. } => GedcomErrorCode::DanglingReference,
            Self::MissingTrailer => GedcomErrorCode::MissingTrailer,
            Self::Schema { .. } => GedcomErrorCode::Schema,
        }
    }

    /// Source line the error was raised on, when it belongs to one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Structural { line, .. }
            | Self::UnrecognizedTag { line, .. }
            | Self::DuplicateKey { line, .. }
            | Self::Schema { line, .. } => Some(*line),
            Self::DanglingReference { .. } | Self::MissingTrailer => None,
        }
    }

    #[must_use]
    pub fn structural(line: usize, message: impl Into<String>) -> Self {
        Self::Structural {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GedcomWarningCode {
    #[default]
    DataSize,
    UserTagPromoted,
    SkippedLine,
    MissingTrailer,
}

impl GedcomWarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataSize => "gedcom/warn/data-size",
            Self::UserTagPromoted => "gedcom/warn/user-tag-promoted",
            Self::SkippedLine => "gedcom/warn/skipped-line",
            Self::MissingTrailer => "gedcom/warn/missing-trailer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GedcomWarning {
    pub code: GedcomWarningCode,
    pub message: String,
    /// 0 when the warning is not tied to a line.
    pub line: usize,
}

impl GedcomWarning {
    #[must_use]
    pub fn new(code: GedcomWarningCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line,
        }
    }
}

/// `@` + one or more non-`@` characters + `@`.
#[must_use]
pub fn is_xref_shaped(token: &str) -> bool {
    token
        .strip_prefix('@')
        .and_then(|rest| rest.strip_suffix('@'))
        .is_some_and(|inner| !inner.is_empty() && !inner.contains('@'))
}

/// Validate an xref key with its delimiters already stripped.
pub fn check_xref_key(line: usize, key: &str) -> Result<(), GedcomError> {
    if key.is_empty() {
        return Err(GedcomError::structural(line, "empty xref key"));
    }
    let len = key.chars().count();
    if len > MAX_XREF_LEN {
        return Err(GedcomError::structural(
            line,
            format!("xref key @{key}@ is {len} characters, limit is {MAX_XREF_LEN}"),
        ));
    }
    Ok(())
}
