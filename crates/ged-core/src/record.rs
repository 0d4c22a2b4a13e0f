//! Record tree: kinds, field slots and the transmission arena.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::GedcomError;
use crate::index::CrossReferenceIndex;

/// Word injected ahead of `CONT` data to mark an embedded line break.
pub const NEWLINE_MARKER: &str = "\n";

/// Partition used for cross-reference indexing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Individual,
    Family,
    Source,
    Repository,
    Multimedia,
    Note,
    Submitter,
    Submission,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Individual,
        Self::Family,
        Self::Source,
        Self::Repository,
        Self::Multimedia,
        Self::Note,
        Self::Submitter,
        Self::Submission,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Family => "family",
            Self::Source => "source",
            Self::Repository => "repository",
            Self::Multimedia => "multimedia",
            Self::Note => "note",
            Self::Submitter => "submitter",
            Self::Submission => "submission",
        }
    }

    /// Accepts the category name or the level-0 tag that declares it.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "individual" | "indi" => Some(Self::Individual),
            "family" | "fam" => Some(Self::Family),
            "source" | "sour" => Some(Self::Source),
            "repository" | "repo" => Some(Self::Repository),
            "multimedia" | "obje" => Some(Self::Multimedia),
            "note" => Some(Self::Note),
            "submitter" | "subm" => Some(Self::Submitter),
            "submission" | "subn" => Some(Self::Submission),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of record kinds the grammar can build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Transmission,
    Header,
    HeaderSource,
    Corporation,
    Submitter,
    Submission,
    Individual,
    Family,
    Source,
    Repository,
    Multimedia,
    Note,
    Trailer,
    PersonalName,
    Event,
    Attribute,
    LdsOrdinance,
    Place,
    Address,
    SourceCitation,
    NoteCitation,
    MultimediaCitation,
    RepositoryCitation,
    RecordedEvent,
    ChildToFamilyLink,
    SpouseToFamilyLink,
    Association,
    UserReference,
    ChangeDate,
    /// Unrecognized or user-defined tag preserved as note text.
    UserDefinedNote,
}

impl RecordKind {
    pub const ALL: [Self; 30] = [
        Self::Transmission,
        Self::Header,
        Self::HeaderSource,
        Self::Corporation,
        Self::Submitter,
        Self::Submission,
        Self::Individual,
        Self::Family,
        Self::Source,
        Self::Repository,
        Self::Multimedia,
        Self::Note,
        Self::Trailer,
        Self::PersonalName,
        Self::Event,
        Self::Attribute,
        Self::LdsOrdinance,
        Self::Place,
        Self::Address,
        Self::SourceCitation,
        Self::NoteCitation,
        Self::MultimediaCitation,
        Self::RepositoryCitation,
        Self::RecordedEvent,
        Self::ChildToFamilyLink,
        Self::SpouseToFamilyLink,
        Self::Association,
        Self::UserReference,
        Self::ChangeDate,
        Self::UserDefinedNote,
    ];

    /// Name of the parent field a record of this kind is stored under.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Transmission => "transmission",
            Self::Header => "header",
            Self::HeaderSource => "header_source",
            Self::Corporation => "corporation",
            Self::Submitter => "submitter_record",
            Self::Submission => "submission_record",
            Self::Individual => "individual_record",
            Self::Family => "family_record",
            Self::Source => "source_record",
            Self::Repository => "repository_record",
            Self::Multimedia => "multimedia_record",
            Self::Note => "note_record",
            Self::Trailer => "trailer",
            Self::PersonalName => "name",
            Self::Event => "event",
            Self::Attribute => "attribute",
            Self::LdsOrdinance => "lds_ordinance",
            Self::Place => "place",
            Self::Address => "address",
            Self::SourceCitation => "source_citation",
            Self::NoteCitation => "note_citation",
            Self::MultimediaCitation => "multimedia_citation",
            Self::RepositoryCitation => "repository_citation",
            Self::RecordedEvent => "recorded_event",
            Self::ChildToFamilyLink => "child_to_family_link",
            Self::SpouseToFamilyLink => "spouse_to_family_link",
            Self::Association => "association",
            Self::UserReference => "user_reference",
            Self::ChangeDate => "change_date",
            Self::UserDefinedNote => "user_note",
        }
    }

    /// Index category for kinds declared by level-0 xref lines.
    #[must_use]
    pub const fn category(self) -> Option<Category> {
        match self {
            Self::Individual => Some(Category::Individual),
            Self::Family => Some(Category::Family),
            Self::Source => Some(Category::Source),
            Self::Repository => Some(Category::Repository),
            Self::Multimedia => Some(Category::Multimedia),
            Self::Note => Some(Category::Note),
            Self::Submitter => Some(Category::Submitter),
            Self::Submission => Some(Category::Submission),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transmission => "transmission",
            Self::Header => "header",
            Self::HeaderSource => "header source",
            Self::Corporation => "corporation",
            Self::Submitter => "submitter",
            Self::Submission => "submission",
            Self::Individual => "individual",
            Self::Family => "family",
            Self::Source => "source",
            Self::Repository => "repository",
            Self::Multimedia => "multimedia",
            Self::Note => "note",
            Self::Trailer => "trailer",
            Self::PersonalName => "personal name",
            Self::Event => "event",
            Self::Attribute => "attribute",
            Self::LdsOrdinance => "LDS ordinance",
            Self::Place => "place",
            Self::Address => "address",
            Self::SourceCitation => "source citation",
            Self::NoteCitation => "note citation",
            Self::MultimediaCitation => "multimedia citation",
            Self::RepositoryCitation => "repository citation",
            Self::RecordedEvent => "recorded event",
            Self::ChildToFamilyLink => "child-to-family link",
            Self::SpouseToFamilyLink => "spouse-to-family link",
            Self::Association => "association",
            Self::UserReference => "user reference",
            Self::ChangeDate => "change date",
            Self::UserDefinedNote => "user-defined note",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arena index of a record inside its [`Transmission`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RecordId(pub usize);

/// Deferred cross-reference; resolved by readers through the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct XrefRef {
    pub category: Category,
    pub key: String,
}

impl XrefRef {
    #[must_use]
    pub fn new(category: Category, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
        }
    }
}

impl fmt::Display for XrefRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}@", self.key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Words(Vec<String>),
    Xref(XrefRef),
    Record(RecordId),
}

impl FieldValue {
    #[must_use]
    pub fn as_words(&self) -> Option<&[String]> {
        match self {
            Self::Words(words) => Some(words),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_xref(&self) -> Option<&XrefRef> {
        match self {
            Self::Xref(xref) => Some(xref),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<RecordId> {
        match self {
            Self::Record(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub values: Vec<FieldValue>,
}

/// The field slot written by a leaf line; notes recovered below that line belong to it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FieldAnchor {
    pub field: &'static str,
    pub slot: usize,
}

/// A node of the record tree. Fields appear in first-write order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<FieldAnchor>,
}

impl Record {
    #[must_use]
    pub const fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            anchor: None,
        }
    }

    /// Slot of the parent record this record was recovered under, if any.
    #[must_use]
    pub const fn anchor(&self) -> Option<FieldAnchor> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: FieldAnchor) {
        self.anchor = Some(anchor);
    }

    /// Whether `anchor` names an existing slot of this record.
    #[must_use]
    pub fn holds(&self, anchor: FieldAnchor) -> bool {
        self.field(anchor.field)
            .is_some_and(|values| anchor.slot < values.len())
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[FieldValue]> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.values.as_slice())
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(|values| !values.is_empty())
    }

    fn slots_mut(&mut self, name: &'static str) -> &mut Vec<FieldValue> {
        let position = match self.fields.iter().position(|field| field.name == name) {
            Some(position) => position,
            None => {
                self.fields.push(Field {
                    name,
                    values: Vec::new(),
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[position].values
    }

    /// Append a new slot; repeated tags accumulate rather than overwrite.
    pub fn push_value(&mut self, name: &'static str, value: FieldValue) {
        self.slots_mut(name).push(value);
    }

    /// Concatenate words onto the last word slot, or start one if the field has none.
    pub fn append_words(&mut self, name: &'static str, words: &[String], newline: bool) {
        let slots = self.slots_mut(name);
        if !matches!(slots.last(), Some(FieldValue::Words(_))) {
            slots.push(FieldValue::Words(Vec::new()));
        }
        if let Some(FieldValue::Words(existing)) = slots.last_mut() {
            if newline {
                existing.push(NEWLINE_MARKER.to_string());
            }
            existing.extend(words.iter().cloned());
        }
    }

    /// Word slots of `name` rendered as text.
    pub fn texts<'a>(&'a self, name: &str) -> impl Iterator<Item = String> + 'a {
        self.field(name)
            .unwrap_or_default()
            .iter()
            .filter_map(FieldValue::as_words)
            .map(render_words)
    }

    #[must_use]
    pub fn first_text(&self, name: &str) -> Option<String> {
        self.texts(name).next()
    }

    pub fn references<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a XrefRef> + 'a {
        self.field(name)
            .unwrap_or_default()
            .iter()
            .filter_map(FieldValue::as_xref)
    }

    pub fn child_ids<'a>(&'a self, name: &str) -> impl Iterator<Item = RecordId> + 'a {
        self.field(name)
            .unwrap_or_default()
            .iter()
            .filter_map(FieldValue::as_record)
    }

    /// The record's own key, for kinds declared by level-0 xref lines.
    #[must_use]
    pub fn xref(&self) -> Option<&XrefRef> {
        self.references("xref").next()
    }
}

/// Join words with single spaces; newline markers become bare line breaks.
#[must_use]
pub fn render_words(words: &[String]) -> String {
    let mut out = String::new();
    let mut after_break = true;
    for word in words {
        if word == NEWLINE_MARKER {
            out.push('\n');
            after_break = true;
            continue;
        }
        if !after_break {
            out.push(' ');
        }
        out.push_str(word);
        after_break = false;
    }
    out
}

/// Root of a parsed file: the record arena plus its cross-reference index.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Transmission {
    records: Vec<Record>,
    #[serde(skip)]
    index: CrossReferenceIndex,
}

impl Default for Transmission {
    fn default() -> Self {
        Self::new()
    }
}

impl Transmission {
    pub const ROOT: RecordId = RecordId(0);

    #[must_use]
    pub fn new() -> Self {
        Self {
            records: vec![Record::new(RecordKind::Transmission)],
            index: CrossReferenceIndex::default(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Record {
        &self.records[Self::ROOT.0]
    }

    #[must_use]
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.0)
    }

    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(id.0)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Create a record of `kind` and link it under `parent`'s field for that kind.
    pub fn add_child(&mut self, parent: RecordId, kind: RecordKind) -> Option<RecordId> {
        if parent.0 >= self.records.len() {
            return None;
        }
        let id = RecordId(self.records.len());
        self.records.push(Record::new(kind));
        self.records[parent.0].push_value(kind.field_name(), FieldValue::Record(id));
        Some(id)
    }

    #[must_use]
    pub const fn index(&self) -> &CrossReferenceIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut CrossReferenceIndex {
        &mut self.index
    }

    #[must_use]
    pub fn find_id(&self, category: Category, key: &str) -> Option<RecordId> {
        self.index.find(category, key)
    }

    #[must_use]
    pub fn find(&self, category: Category, key: &str) -> Option<&Record> {
        self.find_id(category, key).and_then(|id| self.record(id))
    }

    /// Dereference an xref slot; a key that was never declared is a dangling reference.
    pub fn resolve(&self, xref: &XrefRef) -> Result<&Record, GedcomError> {
        self.find(xref.category, &xref.key)
            .ok_or_else(|| GedcomError::DanglingReference {
                category: xref.category,
                key: xref.key.clone(),
            })
    }

    pub fn children<'a>(
        &'a self,
        record: &'a Record,
        name: &str,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        record.child_ids(name).filter_map(|id| self.record(id))
    }

    /// Top-level records of `kind`, in input order.
    pub fn records_of(&self, kind: RecordKind) -> impl Iterator<Item = &Record> + '_ {
        self.children(self.root(), kind.field_name())
    }

    #[must_use]
    pub fn header(&self) -> Option<&Record> {
        self.records_of(RecordKind::Header).next()
    }

    #[must_use]
    pub fn has_trailer(&self) -> bool {
        self.records_of(RecordKind::Trailer).next().is_some()
    }

    /// Every reference in the tree whose target was never declared.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<XrefRef> {
        let mut seen = FxHashSet::default();
        let mut dangling = Vec::new();
        for record in &self.records {
            for field in record.fields() {
                for xref in field.values.iter().filter_map(FieldValue::as_xref) {
                    if self.find_id(xref.category, &xref.key).is_none() && seen.insert(xref) {
                        dangling.push(xref.clone());
                    }
                }
            }
        }
        dangling
    }

    /// Count of top-level records per kind, keyed by kind name.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for id in self.root().fields().iter().flat_map(|field| &field.values) {
            if let Some(record) = id.as_record().and_then(|id| self.record(id)) {
                *counts.entry(record.kind.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}
