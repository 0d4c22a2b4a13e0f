//! Plan-driven GEDCOM emitter.

use ged_core::{
    Emit, EmitConfig, FieldAnchor, LinePlan, NEWLINE_MARKER, Plan, PlanTag, Record, RecordKind,
    Transmission, XrefRef, emission_plan, is_xref_shaped,
};
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

const USER_NOTE: &str = RecordKind::UserDefinedNote.field_name();

/// Serializes record trees back into GEDCOM lines.
#[derive(Debug, Clone, Default)]
pub struct GedcomEmitter {
    config: EmitConfig,
}

impl GedcomEmitter {
    #[must_use]
    pub const fn new(config: EmitConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EmitConfig {
        &self.config
    }

    /// The whole transmission in canonical record order, ending with `0 TRLR`.
    #[must_use]
    pub fn emit_transmission(&self, transmission: &Transmission) -> String {
        let mut writer = LineWriter::new(transmission, &self.config);
        writer.record(transmission.root(), 0);
        if !transmission.has_trailer() {
            debug!("Transmission has no trailer; appending 0 TRLR");
            writer.finish_line("0 TRLR");
        }
        debug!("Emitted: {} lines", writer.line_count);
        writer.out
    }

    /// One record and everything below it, its own line at `level`.
    #[must_use]
    pub fn emit_record(&self, transmission: &Transmission, record: &Record, level: usize) -> String {
        let mut writer = LineWriter::new(transmission, &self.config);
        writer.record(record, level);
        writer.out
    }
}

/// Grapheme count; what a reader sees as the line's width.
fn visual_width(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Word slots of `field` with their slot index.
fn word_slots<'r>(
    record: &'r Record,
    field: &str,
) -> impl Iterator<Item = (usize, &'r [String])> + 'r {
    record
        .field(field)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(slot, value)| value.as_words().map(|words| (slot, words)))
}

fn xref_slots<'r>(record: &'r Record, field: &str) -> impl Iterator<Item = (usize, &'r XrefRef)> + 'r {
    record
        .field(field)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(slot, value)| value.as_xref().map(|xref| (slot, xref)))
}

/// Whether notes anchored to `field` have a line to be written under.
fn anchors_field(plan: &Plan, field: &str) -> bool {
    fn writes(emit: &Emit, field: &str) -> bool {
        match *emit {
            Emit::Text { field: name, .. }
            | Emit::Xref { field: name, .. }
            | Emit::Nested { field: name } => name == field,
            Emit::Group { data, children, .. } => {
                data == Some(field) || children.iter().any(|child| writes(child, field))
            }
        }
    }
    plan.line.data == Some(field) || plan.instructions().any(|emit| writes(emit, field))
}

/// Whether `emit` would write anything for `record`.
fn has_content(record: &Record, emit: &Emit) -> bool {
    match *emit {
        Emit::Text { field, .. } | Emit::Xref { field, .. } | Emit::Nested { field } => {
            record.has_field(field)
        }
        Emit::Group {
            data,
            xref,
            children,
            ..
        } => {
            data.is_some_and(|field| record.has_field(field))
                || xref.is_some_and(|field| record.has_field(field))
                || children.iter().any(|child| has_content(record, child))
        }
    }
}

struct LineWriter<'a> {
    transmission: &'a Transmission,
    config: &'a EmitConfig,
    out: String,
    line_count: usize,
}

impl<'a> LineWriter<'a> {
    fn new(transmission: &'a Transmission, config: &'a EmitConfig) -> Self {
        Self {
            transmission,
            config,
            out: String::new(),
            line_count: 0,
        }
    }

    fn finish_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push_str(&self.config.line_terminator);
        self.line_count += 1;
    }

    fn record(&mut self, record: &'a Record, level: usize) {
        let plan = emission_plan(record.kind);
        let child_level = if plan.line.tag == PlanTag::Root {
            level
        } else {
            if !self.own_line(record, &plan.line, level) {
                return;
            }
            level + 1
        };
        for emit in plan.instructions() {
            self.instruction(record, emit, child_level);
        }
        if !plan.places_user_notes() {
            self.nested(record, USER_NOTE, child_level);
        }
    }

    fn nested(&mut self, record: &'a Record, field: &'static str, level: usize) {
        let transmission = self.transmission;
        let children = record
            .field(field)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| Some((slot, transmission.record(value.as_record()?)?)));
        for (slot, child) in children {
            // Anchored notes are written beneath the line of their slot.
            if field == USER_NOTE
                && child.anchor().is_some_and(|anchor| {
                    record.holds(anchor) && anchors_field(emission_plan(record.kind), anchor.field)
                })
            {
                continue;
            }
            self.record(child, level);
            self.anchored(record, FieldAnchor { field, slot }, level, 1, true);
        }
    }

    /// Notes recovered below the line that wrote `field[slot]`, written back beneath it.
    ///
    /// `level` is the level of that line and `lines` the number of lines it took. A leaf
    /// line takes the notes as direct children. Otherwise they belong under its last
    /// continuation, so an empty `CONC` is written when the data fit on one line.
    fn anchored(
        &mut self,
        record: &'a Record,
        anchor: FieldAnchor,
        level: usize,
        lines: usize,
        leaf: bool,
    ) {
        let transmission = self.transmission;
        let mut notes = transmission
            .children(record, USER_NOTE)
            .filter(|note| note.anchor() == Some(anchor))
            .peekable();
        if notes.peek().is_none() {
            return;
        }
        let note_level = if leaf {
            level + 1
        } else {
            if lines < 2 {
                self.finish_line(&format!("{} CONC", level + 1));
            }
            level + 2
        };
        for note in notes {
            self.record(note, note_level);
        }
    }

    /// Writes the record's own line; `false` when it cannot be expressed.
    fn own_line(&mut self, record: &'a Record, plan: &LinePlan, level: usize) -> bool {
        let data = plan
            .data
            .and_then(|field| word_slots(record, field).next().map(|(slot, words)| (field, slot, words)));
        let words: &[String] = data.map(|(_, _, words)| words).unwrap_or_default();
        let tag = match plan.tag {
            PlanTag::Root => return true,
            PlanTag::Verbatim => {
                let before = self.line_count;
                if !self.verbatim(record, words, level) {
                    return false;
                }
                if let Some((field, slot, _)) = data {
                    let lines = self.line_count - before;
                    self.anchored(record, FieldAnchor { field, slot }, level, lines, false);
                }
                return true;
            }
            PlanTag::Fixed(tag) => tag,
            PlanTag::Field(name) => {
                let Some(tag) = word_slots(record, name)
                    .next()
                    .and_then(|(_, words)| words.first())
                else {
                    warn!("Skipped {} record without a `{name}` tag", record.kind);
                    return false;
                };
                tag.as_str()
            }
        };
        let xref = plan
            .xref
            .and_then(|field| record.references(field).next())
            .map(ToString::to_string);
        let lines = self.line(level, xref.as_deref(), tag, words, plan.continued);
        if let Some((field, slot, _)) = data {
            self.anchored(record, FieldAnchor { field, slot }, level, lines, false);
        }
        true
    }

    /// User-defined notes carry their original tag and xref as leading words.
    fn verbatim(&mut self, record: &Record, words: &'a [String], level: usize) -> bool {
        let split = if level == 0 {
            match words {
                [xref, tag, rest @ ..] if is_xref_shaped(xref) => Some((Some(xref), tag, rest)),
                [tag, rest @ ..] => Some((None, tag, rest)),
                [] => None,
            }
        } else {
            match words {
                [tag, xref, rest @ ..] if is_xref_shaped(xref) => Some((Some(xref), tag, rest)),
                [tag, rest @ ..] => Some((None, tag, rest)),
                [] => None,
            }
        };
        let Some((xref, tag, rest)) = split else {
            warn!("Skipped empty {} record", record.kind);
            return false;
        };
        self.line(level, xref.map(String::as_str), tag, rest, true);
        true
    }

    fn instruction(&mut self, record: &'a Record, emit: &Emit, level: usize) {
        match *emit {
            Emit::Text {
                tag,
                field,
                continued,
            } => {
                for (slot, words) in word_slots(record, field) {
                    let lines = self.line(level, None, tag, words, continued);
                    self.anchored(record, FieldAnchor { field, slot }, level, lines, !continued);
                }
            }
            Emit::Xref { tag, field } => {
                for (slot, xref) in xref_slots(record, field) {
                    let lines = self.line(level, Some(&xref.to_string()), tag, &[], false);
                    self.anchored(record, FieldAnchor { field, slot }, level, lines, true);
                }
            }
            Emit::Nested { field } => self.nested(record, field, level),
            Emit::Group {
                tag,
                data,
                xref,
                children,
            } => self.group(record, tag, data, xref, children, level),
        }
    }

    /// One line per key slot; the group's children follow the first.
    fn group(
        &mut self,
        record: &'a Record,
        tag: &str,
        data: Option<&'static str>,
        xref: Option<&str>,
        children: &[Emit],
        level: usize,
    ) {
        let mut children_written = false;
        if let Some(field) = data {
            for (slot, words) in word_slots(record, field) {
                let lines = self.line(level, None, tag, words, false);
                self.anchored(record, FieldAnchor { field, slot }, level, lines, false);
                if !children_written {
                    self.group_children(record, children, level + 1);
                    children_written = true;
                }
            }
        } else if let Some(field) = xref {
            for reference in record.references(field) {
                self.line(level, Some(&reference.to_string()), tag, &[], false);
                if !children_written {
                    self.group_children(record, children, level + 1);
                    children_written = true;
                }
            }
        }
        if !children_written && children.iter().any(|child| has_content(record, child)) {
            self.line(level, None, tag, &[], false);
            self.group_children(record, children, level + 1);
        }
    }

    fn group_children(&mut self, record: &'a Record, children: &[Emit], level: usize) {
        for child in children {
            self.instruction(record, child, level);
        }
    }

    /// Write `level [xref] tag` followed by `words`; returns the number of lines written.
    ///
    /// Pointer lines below level 0 and marker lines at level 0 take no data, so their
    /// words start on a `CONC` line. Newline markers open `CONT` lines.
    fn line(
        &mut self,
        level: usize,
        xref: Option<&str>,
        tag: &str,
        words: &[String],
        continued: bool,
    ) -> usize {
        let before = self.line_count;
        let head = match xref {
            Some(xref) if level == 0 => format!("{level} {xref} {tag}"),
            Some(xref) => format!("{level} {tag} {xref}"),
            None => format!("{level} {tag}"),
        };
        let inline = if level == 0 {
            xref.is_some()
        } else {
            xref.is_none()
        };
        let child = level + 1;

        let mut segments = words.split(|word| word.as_str() == NEWLINE_MARKER);
        let first = segments.next().unwrap_or_default();
        if inline {
            self.fill(head, child, first, continued);
        } else {
            self.finish_line(&head);
            if !first.is_empty() {
                self.fill(format!("{child} CONC"), child, first, continued);
            }
        }
        for segment in segments {
            self.fill(format!("{child} CONT"), child, segment, continued);
        }
        self.line_count - before
    }

    /// Append words to `line`, breaking onto `CONC` lines past the wrap width.
    ///
    /// Every line keeps at least one word, and a continuation never starts with an
    /// xref-shaped word.
    fn fill(&mut self, mut line: String, conc_level: usize, words: &[String], wrap: bool) {
        let limit = self.config.wrap_width;
        let mut width = visual_width(&line);
        let mut on_line = 0usize;
        for word in words {
            let word_width = visual_width(word);
            if wrap && on_line > 0 && width + 1 + word_width > limit && !is_xref_shaped(word) {
                self.finish_line(&line);
                line = format!("{conc_level} CONC");
                width = visual_width(&line);
                on_line = 0;
            }
            line.push(' ');
            line.push_str(word);
            width += 1 + word_width;
            on_line += 1;
        }
        self.finish_line(&line);
    }
}
