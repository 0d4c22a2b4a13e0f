use std::borrow::Cow;

use ged_core::{
    FieldAnchor, GedcomError, GedcomWarning, GedcomWarningCode, GrammarSchema, Line, ParseConfig,
    RecordId, State, TagContext, TagRule, Transmission,
};
use tracing::{debug, trace, warn};

use crate::ParseResult;
use crate::record_builder::RecordBuilder;
use crate::tokenizer::{salvage_level, tokenize};

/// One level of nesting: the grammar state children are looked up in and the record
/// they attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    state: State,
    record: RecordId,
    /// Records created by the line that pushed this frame.
    records_opened: usize,
    /// For leaf lines, the slot they wrote; recovered children attach to it.
    anchor: Option<FieldAnchor>,
}

impl Frame {
    const fn root() -> Self {
        Self {
            state: State::Transmission,
            record: Transmission::ROOT,
            records_opened: 0,
            anchor: None,
        }
    }

    const fn rejected(record: RecordId) -> Self {
        Self {
            state: State::Rejected,
            record,
            records_opened: 0,
            anchor: None,
        }
    }
}

/// Incremental, line-at-a-time GEDCOM parser.
///
/// The frame stack always holds one frame more than the level of the last accepted
/// line, so its top is the parent of the next line at that level + 1.
pub struct GedcomParser {
    schema: &'static GrammarSchema,
    config: ParseConfig,
    builder: RecordBuilder,
    stack: Vec<Frame>,
    warnings: Vec<GedcomWarning>,
}

impl Default for GedcomParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GedcomParser {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParseConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ParseConfig) -> Self {
        Self {
            schema: GrammarSchema::standard(),
            config,
            builder: RecordBuilder::new(),
            stack: vec![Frame::root()],
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// The tree built so far.
    #[must_use]
    pub const fn transmission(&self) -> &Transmission {
        self.builder.transmission()
    }

    #[must_use]
    pub fn warnings(&self) -> &[GedcomWarning] {
        &self.warnings
    }

    /// Deepest level the next line may have.
    #[must_use]
    pub fn max_next_level(&self) -> usize {
        self.stack.len() - 1
    }

    /// Tokenize and apply one raw input line.
    ///
    /// An error affects only this line: the tree is left as it was, and the line's
    /// children are skipped with warnings.
    pub fn parse_line(&mut self, number: usize, raw: &str) -> Result<(), GedcomError> {
        match tokenize(number, raw) {
            Ok(line) => self.accept(&line),
            Err(error) => {
                if let Some(level) = salvage_level(raw)
                    && level <= self.max_next_level()
                {
                    self.unwind(level);
                    let parent = self.top();
                    self.stack.push(Frame::rejected(parent.record));
                }
                Err(error)
            }
        }
    }

    /// Apply an already tokenized line.
    pub fn accept(&mut self, line: &Line) -> Result<(), GedcomError> {
        let level = line.level as usize;
        let deepest = self.max_next_level();
        if level > deepest {
            return Err(GedcomError::structural(
                line.number,
                format!("level {level} skips a level; the deepest allowed here is {deepest}"),
            ));
        }
        self.unwind(level);
        let parent = self.top();

        if parent.state == State::Rejected {
            debug!("Line {}: skipped `{}` below a rejected line", line.number, line.tag);
            self.warnings.push(GedcomWarning::new(
                GedcomWarningCode::SkippedLine,
                line.number,
                format!("`{}` skipped because its parent line was rejected", line.tag),
            ));
            self.stack.push(Frame::rejected(parent.record));
            return Ok(());
        }

        match self.apply(line, parent) {
            Ok((frame, warnings)) => {
                debug!(
                    "Line {}: `{}` in {} -> {}",
                    line.number,
                    line.tag,
                    parent.state.as_str(),
                    frame.state.as_str()
                );
                self.warnings.extend(warnings);
                self.stack.push(frame);
                Ok(())
            }
            Err(error) => {
                self.stack.push(Frame::rejected(parent.record));
                Err(error)
            }
        }
    }

    /// Close the parse, checking for the trailer.
    pub fn finish(self) -> Result<ParseResult, GedcomError> {
        match self.into_result() {
            (_, Some(error)) => Err(error),
            (result, None) => Ok(result),
        }
    }

    pub(crate) fn into_result(mut self) -> (ParseResult, Option<GedcomError>) {
        let mut error = None;
        if !self.transmission().has_trailer() {
            if self.config.require_trailer {
                error = Some(GedcomError::MissingTrailer);
            } else {
                warn!("Transmission ended without a TRLR record");
                self.warnings.push(GedcomWarning::new(
                    GedcomWarningCode::MissingTrailer,
                    0,
                    "transmission ended without a TRLR record",
                ));
            }
        }
        let result = ParseResult {
            transmission: self.builder.into_transmission(),
            warnings: self.warnings,
            errors: Vec::new(),
        };
        (result, error)
    }

    fn top(&self) -> Frame {
        self.stack.last().copied().unwrap_or(Frame::root())
    }

    /// Pop frames until the top is the parent of a line at `level`.
    fn unwind(&mut self, level: usize) {
        while self.stack.len() > level + 1 {
            if let Some(frame) = self.stack.pop() {
                trace!(
                    "Closed {} frame on record #{} ({} opened)",
                    frame.state.as_str(),
                    frame.record.0,
                    frame.records_opened
                );
            }
        }
    }

    fn apply(
        &mut self,
        line: &Line,
        parent: Frame,
    ) -> Result<(Frame, Vec<GedcomWarning>), GedcomError> {
        let mut warnings = Vec::new();
        let mut anchor = None;
        let (rule, data): (&TagRule, Cow<'_, [String]>) =
            match self.schema.rule(parent.state, &line.tag, line.context()) {
                Some(rule) => (rule, Cow::Borrowed(line.data_words())),
                None => {
                    if parent.state == State::LeafChildren {
                        anchor = parent.anchor;
                    }
                    let rule = self.promote(line, parent.state)?;
                    warn!(
                        "Line {}: `{}` kept as a user-defined note in {} context",
                        line.number,
                        line.tag,
                        parent.state.as_str()
                    );
                    warnings.push(GedcomWarning::new(
                        GedcomWarningCode::UserTagPromoted,
                        line.number,
                        format!("`{}` kept as a user-defined note", line.tag),
                    ));
                    (rule, Cow::Owned(line.source_tokens()))
                }
            };

        let size = data_size(&data);
        if rule.max_data_size > 0 && size > rule.max_data_size {
            warn!(
                "Line {}: `{}` data is {size} characters, limit is {}",
                line.number, line.tag, rule.max_data_size
            );
            warnings.push(GedcomWarning::new(
                GedcomWarningCode::DataSize,
                line.number,
                format!(
                    "`{}` data is {size} characters, limit is {}",
                    line.tag, rule.max_data_size
                ),
            ));
        }

        let applied = self
            .builder
            .apply(line, &data, parent.record, rule.actions, anchor)?;
        let frame = match rule.child_state {
            Some(state) => Frame {
                state,
                record: applied.record,
                records_opened: applied.records_opened,
                anchor: None,
            },
            None => Frame {
                state: State::LeafChildren,
                record: applied.record,
                records_opened: applied.records_opened,
                anchor: applied.anchor,
            },
        };
        Ok((frame, warnings))
    }

    /// The user-defined note rule for a line no rule matched, if the line may be kept.
    fn promote(&self, line: &Line, state: State) -> Result<&'static TagRule, GedcomError> {
        if !line.is_user_defined() && !state.recovers_unknown_tags() {
            return Err(GedcomError::UnrecognizedTag {
                line: line.number,
                tag: line.tag.clone(),
                state: state.as_str().to_string(),
            });
        }
        self.schema
            .rule(state, "NOTE", TagContext::UserDefined)
            .or_else(|| {
                self.schema
                    .rule(self.schema.fallback_state(), "NOTE", TagContext::UserDefined)
            })
            .ok_or_else(|| GedcomError::Schema {
                line: line.number,
                message: "fallback state has no user-defined NOTE rule".to_string(),
            })
    }
}

/// Characters in the data text, counting one space between words.
fn data_size(words: &[String]) -> usize {
    let chars: usize = words.iter().map(|word| word.chars().count()).sum();
    chars + words.len().saturating_sub(1)
}
