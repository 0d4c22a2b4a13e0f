//! Grammar schema: parse states, tag rules and the actions they run.
//!
//! The tables themselves live in `grammar.rs`; this module holds the types and the
//! process-wide lookup built over them.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::grammar;
use crate::record::{Category, RecordKind};

/// Named node of the grammar. The stack of active states tracks line levels.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Transmission,
    Header,
    HeaderSource,
    HeaderSourceData,
    Corporation,
    DateTime,
    GedcomInfo,
    CharacterSet,
    HeaderPlace,
    ContinuedNote,
    Address,
    Submitter,
    Submission,
    Individual,
    PersonalName,
    IndividualEvent,
    FamilyEvent,
    EventFamilyLink,
    HusbandAge,
    WifeAge,
    LdsOrdinance,
    ChildToFamilyLink,
    SpouseToFamilyLink,
    Association,
    UserReference,
    Family,
    Source,
    SourceData,
    RecordedEvent,
    ContinuedAuthor,
    ContinuedTitle,
    ContinuedPublication,
    ContinuedText,
    RepositoryCitation,
    CallNumber,
    Repository,
    Multimedia,
    Note,
    Place,
    SourceCitation,
    CitationEvent,
    CitationData,
    NoteCitation,
    MultimediaCitation,
    ChangeDate,
    /// Fallback: every unrecognized tag below here becomes a user-defined note.
    UserDefined,
    /// Children of leaf lines; recovers unknown tags but has no continuation rules.
    LeafChildren,
    /// Children of a line that failed; they are skipped.
    Rejected,
}

impl State {
    pub const ALL: [Self; 48] = [
        Self::Transmission,
        Self::Header,
        Self::HeaderSource,
        Self::HeaderSourceData,
        Self::Corporation,
        Self::DateTime,
        Self::GedcomInfo,
        Self::CharacterSet,
        Self::HeaderPlace,
        Self::ContinuedNote,
        Self::Address,
        Self::Submitter,
        Self::Submission,
        Self::Individual,
        Self::PersonalName,
        Self::IndividualEvent,
        Self::FamilyEvent,
        Self::EventFamilyLink,
        Self::HusbandAge,
        Self::WifeAge,
        Self::LdsOrdinance,
        Self::ChildToFamilyLink,
        Self::SpouseToFamilyLink,
        Self::Association,
        Self::UserReference,
        Self::Family,
        Self::Source,
        Self::SourceData,
        Self::RecordedEvent,
        Self::ContinuedAuthor,
        Self::ContinuedTitle,
        Self::ContinuedPublication,
        Self::ContinuedText,
        Self::RepositoryCitation,
        Self::CallNumber,
        Self::Repository,
        Self::Multimedia,
        Self::Note,
        Self::Place,
        Self::SourceCitation,
        Self::CitationEvent,
        Self::CitationData,
        Self::NoteCitation,
        Self::MultimediaCitation,
        Self::ChangeDate,
        Self::UserDefined,
        Self::LeafChildren,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transmission => "transmission",
            Self::Header => "header",
            Self::HeaderSource => "header source",
            Self::HeaderSourceData => "header source data",
            Self::Corporation => "corporation",
            Self::DateTime => "date/time",
            Self::GedcomInfo => "gedcom info",
            Self::CharacterSet => "character set",
            Self::HeaderPlace => "header place",
            Self::ContinuedNote => "header note",
            Self::Address => "address",
            Self::Submitter => "submitter",
            Self::Submission => "submission",
            Self::Individual => "individual",
            Self::PersonalName => "personal name",
            Self::IndividualEvent => "individual event",
            Self::FamilyEvent => "family event",
            Self::EventFamilyLink => "event family link",
            Self::HusbandAge => "husband age",
            Self::WifeAge => "wife age",
            Self::LdsOrdinance => "LDS ordinance",
            Self::ChildToFamilyLink => "child-to-family link",
            Self::SpouseToFamilyLink => "spouse-to-family link",
            Self::Association => "association",
            Self::UserReference => "user reference",
            Self::Family => "family",
            Self::Source => "source",
            Self::SourceData => "source data",
            Self::RecordedEvent => "recorded event",
            Self::ContinuedAuthor => "source author",
            Self::ContinuedTitle => "source title",
            Self::ContinuedPublication => "source publication",
            Self::ContinuedText => "source text",
            Self::RepositoryCitation => "repository citation",
            Self::CallNumber => "call number",
            Self::Repository => "repository",
            Self::Multimedia => "multimedia",
            Self::Note => "note",
            Self::Place => "place",
            Self::SourceCitation => "source citation",
            Self::CitationEvent => "citation event",
            Self::CitationData => "citation data",
            Self::NoteCitation => "note citation",
            Self::MultimediaCitation => "multimedia citation",
            Self::ChangeDate => "change date",
            Self::UserDefined => "user-defined",
            Self::LeafChildren => "leaf",
            Self::Rejected => "rejected",
        }
    }

    /// Record kinds a frame in this state may point at. Empty means any kind.
    #[must_use]
    pub const fn targets(self) -> &'static [RecordKind] {
        use RecordKind as K;
        match self {
            Self::Transmission => &[K::Transmission],
            Self::Header
            | Self::GedcomInfo
            | Self::CharacterSet
            | Self::HeaderPlace
            | Self::ContinuedNote => &[K::Header],
            Self::HeaderSource | Self::HeaderSourceData => &[K::HeaderSource],
            Self::Corporation => &[K::Corporation],
            Self::DateTime => &[K::Header, K::ChangeDate],
            Self::Address => &[K::Address],
            Self::Submitter => &[K::Submitter],
            Self::Submission => &[K::Submission],
            Self::Individual => &[K::Individual],
            Self::PersonalName => &[K::PersonalName],
            Self::IndividualEvent | Self::EventFamilyLink => &[K::Event, K::Attribute],
            Self::FamilyEvent | Self::HusbandAge | Self::WifeAge => &[K::Event],
            Self::LdsOrdinance => &[K::LdsOrdinance],
            Self::ChildToFamilyLink => &[K::ChildToFamilyLink],
            Self::SpouseToFamilyLink => &[K::SpouseToFamilyLink],
            Self::Association => &[K::Association],
            Self::UserReference => &[K::UserReference],
            Self::Family => &[K::Family],
            Self::Source
            | Self::SourceData
            | Self::ContinuedAuthor
            | Self::ContinuedTitle
            | Self::ContinuedPublication => &[K::Source],
            Self::ContinuedText => &[K::Source, K::SourceCitation],
            Self::RecordedEvent => &[K::RecordedEvent],
            Self::RepositoryCitation | Self::CallNumber => &[K::RepositoryCitation],
            Self::Repository => &[K::Repository],
            Self::Multimedia => &[K::Multimedia],
            Self::Note => &[K::Note],
            Self::Place => &[K::Place],
            Self::SourceCitation | Self::CitationEvent | Self::CitationData => {
                &[K::SourceCitation]
            }
            Self::NoteCitation => &[K::NoteCitation],
            Self::MultimediaCitation => &[K::MultimediaCitation],
            Self::ChangeDate => &[K::ChangeDate],
            Self::UserDefined => &[K::UserDefinedNote],
            Self::LeafChildren | Self::Rejected => &[],
        }
    }

    /// Whether an unrecognized tag in this state is recovered as a user-defined note.
    #[must_use]
    pub const fn recovers_unknown_tags(self) -> bool {
        matches!(self, Self::UserDefined | Self::LeafChildren)
    }
}

/// How a tag appeared on its line.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum TagContext {
    /// The line carried an xref.
    Xref,
    Plain,
    /// Synthetic note produced from an unrecognized tag.
    UserDefined,
}

/// Hint for what a rule's data words hold. Not enforced.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    None,
    Text,
    Xref,
    Date,
    Time,
    Name,
    Place,
    Age,
    Number,
    Flag,
    Code,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Source {
    /// The line's data words.
    Data,
    /// A word fixed by the rule, typically its own tag.
    Const(&'static str),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Action {
    CreateRecord(RecordKind),
    SetField(&'static str, Source),
    AppendField(&'static str),
    AppendWithNewline(&'static str),
    RegisterXref(&'static str, Category),
    RegisterIndexEntry(Category),
    PopFrame,
    PushDuplicateFrame,
}

impl Action {
    /// Field written on the current record, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::SetField(name, _)
            | Self::AppendField(name)
            | Self::AppendWithNewline(name)
            | Self::RegisterXref(name, _) => Some(*name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn needs_xref(&self) -> bool {
        matches!(self, Self::RegisterXref(..) | Self::RegisterIndexEntry(_))
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TagRule {
    pub tag: &'static str,
    pub context: TagContext,
    /// `None` marks a leaf.
    pub child_state: Option<State>,
    pub min_occurs: u32,
    /// `None` is unbounded.
    pub max_occurs: Option<u32>,
    pub data_type: DataType,
    /// Longest data text accepted without a warning; 0 disables the check.
    pub max_data_size: usize,
    pub actions: &'static [Action],
    pub description: &'static str,
}

impl TagRule {
    #[must_use]
    pub const fn new(tag: &'static str, context: TagContext) -> Self {
        Self {
            tag,
            context,
            child_state: None,
            min_occurs: 0,
            max_occurs: None,
            data_type: DataType::None,
            max_data_size: 0,
            actions: &[],
            description: "",
        }
    }

    #[must_use]
    pub const fn child(mut self, state: State) -> Self {
        self.child_state = Some(state);
        self
    }

    #[must_use]
    pub const fn occurs(mut self, min: u32, max: Option<u32>) -> Self {
        self.min_occurs = min;
        self.max_occurs = max;
        self
    }

    #[must_use]
    pub const fn once(self) -> Self {
        self.occurs(0, Some(1))
    }

    #[must_use]
    pub const fn data(mut self, data_type: DataType, max_data_size: usize) -> Self {
        self.data_type = data_type;
        self.max_data_size = max_data_size;
        self
    }

    #[must_use]
    pub const fn actions(mut self, actions: &'static [Action]) -> Self {
        self.actions = actions;
        self
    }

    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.child_state.is_none()
    }
}

/// Rules for one tag in one state, split by context.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSet {
    pub plain: Option<&'static TagRule>,
    pub xref: Option<&'static TagRule>,
    pub user_defined: Option<&'static TagRule>,
}

impl RuleSet {
    #[must_use]
    pub const fn get(&self, context: TagContext) -> Option<&'static TagRule> {
        match context {
            TagContext::Plain => self.plain,
            TagContext::Xref => self.xref,
            TagContext::UserDefined => self.user_defined,
        }
    }

    fn slot(&mut self, context: TagContext) -> &mut Option<&'static TagRule> {
        match context {
            TagContext::Plain => &mut self.plain,
            TagContext::Xref => &mut self.xref,
            TagContext::UserDefined => &mut self.user_defined,
        }
    }
}

/// Immutable lookup from `(state, tag, context)` to a rule, shared by every parser.
#[derive(Debug)]
pub struct GrammarSchema {
    states: FxHashMap<State, FxHashMap<&'static str, RuleSet>>,
}

impl GrammarSchema {
    /// The GEDCOM 5.5 lineage-linked grammar.
    #[must_use]
    pub fn standard() -> &'static Self {
        static SCHEMA: OnceLock<GrammarSchema> = OnceLock::new();
        SCHEMA.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut states: FxHashMap<State, FxHashMap<&'static str, RuleSet>> = FxHashMap::default();
        for state in State::ALL {
            let tags = states.entry(state).or_default();
            for group in grammar::rule_groups(state) {
                for rule in *group {
                    let slot = tags.entry(rule.tag).or_default().slot(rule.context);
                    // First declaration wins; the tables never repeat a key.
                    if slot.is_none() {
                        *slot = Some(rule);
                    }
                }
            }
        }
        Self { states }
    }

    #[must_use]
    pub fn rule(&self, state: State, tag: &str, context: TagContext) -> Option<&'static TagRule> {
        self.states.get(&state)?.get(tag)?.get(context)
    }

    #[must_use]
    pub const fn fallback_state(&self) -> State {
        State::UserDefined
    }

    /// Every rule of `state`, in declaration order.
    pub fn rules(&self, state: State) -> impl Iterator<Item = &'static TagRule> {
        grammar::rule_groups(state)
            .iter()
            .flat_map(|group| group.iter())
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::{Action, GrammarSchema, State, TagContext};
    use crate::plan::emission_plan;
    use crate::record::RecordKind;

    /// Walk a rule's actions the way the parser's record cursor would.
    fn simulate(state: State, target: RecordKind, actions: &[Action]) -> Result<(RecordKind, i32), String> {
        let mut cursor = vec![target];
        let mut opened = 0;
        for action in actions {
            let top = *cursor.last().ok_or("cursor emptied")?;
            let plan = emission_plan(top);
            match action {
                Action::CreateRecord(kind) => {
                    if !plan.declares(kind.field_name()) {
                        return Err(format!(
                            "{state:?}: {top:?} plan does not declare child field {}",
                            kind.field_name()
                        ));
                    }
                    cursor.push(*kind);
                    opened += 1;
                }
                Action::PushDuplicateFrame => {
                    cursor.push(top);
                    opened += 1;
                }
                Action::PopFrame => {
                    if opened == 0 {
                        return Err(format!("{state:?}: pop closes a frame the line did not open"));
                    }
                    cursor.pop();
                    opened -= 1;
                }
                Action::RegisterIndexEntry(category) => {
                    if top.category() != Some(*category) {
                        return Err(format!("{state:?}: indexes {top:?} under {category:?}"));
                    }
                }
                other => {
                    if let Some(field) = other.field()
                        && !plan.declares(field)
                    {
                        return Err(format!("{state:?}: {top:?} plan does not declare {field}"));
                    }
                }
            }
        }
        let top = *cursor.last().ok_or("cursor emptied")?;
        Ok((top, opened))
    }

    #[test]
    fn every_action_writes_a_declared_field() {
        let schema = GrammarSchema::standard();
        for state in State::ALL {
            for target in state.targets() {
                for rule in schema.rules(state) {
                    let (top, opened) = simulate(state, *target, rule.actions)
                        .unwrap_or_else(|message| panic!("{} {}: {message}", rule.tag, rule.description));
                    match rule.child_state {
                        Some(child) => {
                            assert_eq!(opened, 1, "{state:?} {} must open one frame", rule.tag);
                            assert!(
                                child.targets().contains(&top),
                                "{state:?} {} leaves {top:?} under {child:?}",
                                rule.tag
                            );
                        }
                        None => assert_eq!(opened, 0, "{state:?} leaf {} opened frames", rule.tag),
                    }
                }
            }
        }
    }

    #[test]
    fn fallback_note_rule_applies_under_any_record() {
        let schema = GrammarSchema::standard();
        let rule = schema
            .rule(schema.fallback_state(), "NOTE", TagContext::UserDefined)
            .expect("fallback state must carry the user-defined note rule");
        for kind in RecordKind::ALL {
            assert!(simulate(State::UserDefined, kind, rule.actions).is_ok(), "{kind:?}");
        }
        assert_eq!(rule.child_state, Some(State::UserDefined));
    }

    #[test]
    fn keys_are_unique_per_state() {
        let schema = GrammarSchema::standard();
        for state in State::ALL {
            let mut seen = FxHashSet::default();
            for rule in schema.rules(state) {
                assert!(
                    seen.insert((rule.tag, rule.context)),
                    "{state:?} declares {} {:?} twice",
                    rule.tag,
                    rule.context
                );
            }
        }
    }

    #[test]
    fn xref_rules_only_live_in_xref_context() {
        let schema = GrammarSchema::standard();
        for state in State::ALL {
            for rule in schema.rules(state) {
                if rule.actions.iter().any(Action::needs_xref) {
                    assert_eq!(rule.context, TagContext::Xref, "{state:?} {}", rule.tag);
                }
                if rule.actions.contains(&Action::PushDuplicateFrame) {
                    assert!(rule.child_state.is_some(), "{state:?} {}", rule.tag);
                }
            }
        }
    }

    #[test]
    fn lookups_distinguish_context() {
        let schema = GrammarSchema::standard();
        assert!(schema.rule(State::Transmission, "INDI", TagContext::Xref).is_some());
        assert!(schema.rule(State::Transmission, "INDI", TagContext::Plain).is_none());
        assert!(schema.rule(State::Individual, "NAME", TagContext::Plain).is_some());
        assert!(schema.rule(State::Individual, "_CUSTOM", TagContext::Plain).is_none());
        assert!(schema.rule(State::Rejected, "NOTE", TagContext::Plain).is_none());
        assert!(State::LeafChildren.recovers_unknown_tags());
        assert!(!State::Individual.recovers_unknown_tags());
    }
}
