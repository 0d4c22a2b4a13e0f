use serde::{Deserialize, Serialize};

/// What the one-shot `parse` entry point does with a line-level error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Record the error and keep feeding lines.
    #[default]
    Continue,
    /// Stop at the first error.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ParseConfig {
    /// Treat a transmission without `0 TRLR` as an error rather than a warning.
    pub require_trailer: bool,
    pub on_error: OnError,
}

impl ParseConfig {
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            require_trailer: true,
            on_error: OnError::Abort,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmitConfig {
    /// Visual width a line may reach before its data continues on a `CONC` line.
    pub wrap_width: usize,
    pub line_terminator: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            wrap_width: 80,
            line_terminator: "\n".to_string(),
        }
    }
}

impl EmitConfig {
    /// The widest lines GEDCOM 5.5 permits.
    #[must_use]
    pub fn wide() -> Self {
        Self {
            wrap_width: 255,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GedcomConfig {
    pub parse: ParseConfig,
    pub emit: EmitConfig,
}
