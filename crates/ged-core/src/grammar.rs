//! Static rule tables for the GEDCOM 5.5 lineage-linked grammar.
//!
//! Each state is a list of rule groups; groups shared by several record types
//! (event detail, citations, change date) are declared once.

use crate::record::{Category, RecordKind};
use crate::schema::{Action, DataType, Source, State, TagContext, TagRule};

/// Leaf storing the line's data in `field` of the current record.
macro_rules! leaf {
    ($tag:literal => $field:literal, $ty:ident, $size:literal, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .data(DataType::$ty, $size)
            .actions(&[Action::SetField($field, Source::Data)])
            .describe($desc)
    };
}

/// Leaf storing the line's xref as a deferred reference.
macro_rules! pointer {
    ($tag:literal => $field:literal, $category:ident, $desc:literal) => {
        TagRule::new($tag, TagContext::Xref)
            .data(DataType::Xref, 0)
            .actions(&[Action::RegisterXref($field, Category::$category)])
            .describe($desc)
    };
}

/// Text field whose children continue it or qualify it on the same record.
macro_rules! continued {
    ($tag:literal => $field:literal, $child:ident, $size:literal, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .child(State::$child)
            .data(DataType::Text, $size)
            .actions(&[
                Action::SetField($field, Source::Data),
                Action::PushDuplicateFrame,
            ])
            .describe($desc)
    };
}

/// Line with no data of its own that only routes its children.
macro_rules! group {
    ($tag:literal, $child:ident, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .child(State::$child)
            .actions(&[Action::PushDuplicateFrame])
            .describe($desc)
    };
}

/// `CONC`/`CONT` pair extending `field`.
macro_rules! continuation {
    ($field:literal) => {
        [
            TagRule::new("CONC", TagContext::Plain)
                .data(DataType::Text, 248)
                .actions(&[Action::AppendField($field)])
                .describe("Continue the text on the same line"),
            TagRule::new("CONT", TagContext::Plain)
                .data(DataType::Text, 248)
                .actions(&[Action::AppendWithNewline($field)])
                .describe("Continue the text after a line break"),
        ]
    };
}

/// Substructure record whose line data lands in `field`.
macro_rules! structure {
    ($tag:literal => $kind:ident . $field:literal, $child:ident, $ty:ident, $size:literal, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .child(State::$child)
            .data(DataType::$ty, $size)
            .actions(&[
                Action::CreateRecord(RecordKind::$kind),
                Action::SetField($field, Source::Data),
            ])
            .describe($desc)
    };
}

/// Substructure record opened by a pointer line.
macro_rules! linked {
    ($tag:literal => $kind:ident . $field:literal, $category:ident, $child:ident, $desc:literal) => {
        TagRule::new($tag, TagContext::Xref)
            .child(State::$child)
            .data(DataType::Xref, 0)
            .actions(&[
                Action::CreateRecord(RecordKind::$kind),
                Action::RegisterXref($field, Category::$category),
            ])
            .describe($desc)
    };
}

/// Level-0 record declared with its own xref key.
macro_rules! record {
    ($tag:literal => $kind:ident, $category:ident, $child:ident, $desc:literal) => {
        TagRule::new($tag, TagContext::Xref)
            .child(State::$child)
            .actions(&[
                Action::CreateRecord(RecordKind::$kind),
                Action::RegisterXref("xref", Category::$category),
                Action::RegisterIndexEntry(Category::$category),
            ])
            .describe($desc)
    };
}

macro_rules! event {
    ($tag:literal, $child:ident, $ty:ident, $size:literal, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .child(State::$child)
            .data(DataType::$ty, $size)
            .actions(&[
                Action::CreateRecord(RecordKind::Event),
                Action::SetField("event_type", Source::Const($tag)),
                Action::SetField("event_status", Source::Data),
            ])
            .describe($desc)
    };
}

macro_rules! attribute {
    ($tag:literal, $ty:ident, $size:literal, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .child(State::IndividualEvent)
            .data(DataType::$ty, $size)
            .actions(&[
                Action::CreateRecord(RecordKind::Attribute),
                Action::SetField("attribute_type", Source::Const($tag)),
                Action::SetField("value", Source::Data),
            ])
            .describe($desc)
    };
}

macro_rules! lds {
    ($tag:literal, $desc:literal) => {
        TagRule::new($tag, TagContext::Plain)
            .child(State::LdsOrdinance)
            .actions(&[
                Action::CreateRecord(RecordKind::LdsOrdinance),
                Action::SetField("ordinance_type", Source::Const($tag)),
            ])
            .describe($desc)
    };
}

const TRANSMISSION: &[TagRule] = &[
    TagRule::new("HEAD", TagContext::Plain)
        .child(State::Header)
        .occurs(1, Some(1))
        .actions(&[Action::CreateRecord(RecordKind::Header)])
        .describe("Transmission header"),
    record!("SUBM" => Submitter, Submitter, Submitter, "Submitter record"),
    record!("SUBN" => Submission, Submission, Submission, "Submission record")
        .once(),
    record!("INDI" => Individual, Individual, Individual, "Individual record"),
    record!("FAM" => Family, Family, Family, "Family record"),
    record!("SOUR" => Source, Source, Source, "Source record"),
    record!("REPO" => Repository, Repository, Repository, "Repository record"),
    record!("OBJE" => Multimedia, Multimedia, Multimedia, "Multimedia record"),
    TagRule::new("NOTE", TagContext::Xref)
        .child(State::Note)
        .data(DataType::Text, 248)
        .actions(&[
            Action::CreateRecord(RecordKind::Note),
            Action::RegisterXref("xref", Category::Note),
            Action::RegisterIndexEntry(Category::Note),
            Action::SetField("text", Source::Data),
        ])
        .describe("Note record"),
    TagRule::new("TRLR", TagContext::Plain)
        .occurs(1, Some(1))
        .actions(&[Action::CreateRecord(RecordKind::Trailer), Action::PopFrame])
        .describe("End of transmission"),
];

const HEADER: &[TagRule] = &[
    structure!("SOUR" => HeaderSource . "approved_system_id", HeaderSource, Code, 20, "Sending system")
        .occurs(1, Some(1)),
    leaf!("DEST" => "destination", Text, 20, "Receiving system").once(),
    continued!("DATE" => "date", DateTime, 11, "Transmission date").once(),
    pointer!("SUBM" => "submitter", Submitter, "Submitter of the transmission").occurs(1, Some(1)),
    pointer!("SUBN" => "submission", Submission, "Submission of the transmission").once(),
    leaf!("FILE" => "file_name", Text, 90, "File name").once(),
    leaf!("COPR" => "copyright", Text, 90, "Copyright statement").once(),
    group!("GEDC", GedcomInfo, "GEDCOM version information").occurs(1, Some(1)),
    continued!("CHAR" => "character_set", CharacterSet, 8, "Character set").occurs(1, Some(1)),
    leaf!("LANG" => "language", Code, 15, "Language of the transmission").once(),
    group!("PLAC", HeaderPlace, "Default place hierarchy").once(),
    continued!("NOTE" => "note", ContinuedNote, 248, "Content description").once(),
];

const HEADER_SOURCE: &[TagRule] = &[
    leaf!("VERS" => "version", Text, 15, "Product version").once(),
    leaf!("NAME" => "product_name", Text, 90, "Product name").once(),
    structure!("CORP" => Corporation . "name", Corporation, Text, 90, "Business that produced the product")
        .once(),
    continued!("DATA" => "source_data", HeaderSourceData, 90, "Name of the source data").once(),
];

const HEADER_SOURCE_DATA: &[TagRule] = &[
    leaf!("DATE" => "data_date", Date, 11, "Publication date").once(),
    leaf!("COPR" => "data_copyright", Text, 90, "Copyright of the source data").once(),
];

const DATE_TIME: &[TagRule] = &[leaf!("TIME" => "time", Time, 12, "Time value").once()];

const GEDCOM_INFO: &[TagRule] = &[
    leaf!("VERS" => "gedcom_version", Text, 15, "GEDCOM version").occurs(1, Some(1)),
    leaf!("FORM" => "gedcom_form", Code, 20, "GEDCOM form").occurs(1, Some(1)),
];

const CHARACTER_SET: &[TagRule] =
    &[leaf!("VERS" => "character_set_version", Text, 15, "Character set version").once()];

const HEADER_PLACE: &[TagRule] =
    &[leaf!("FORM" => "place_hierarchy", Text, 120, "Place jurisdiction levels").occurs(1, Some(1))];

const HEADER_NOTE: &[TagRule] = &continuation!("note");

const ADDRESS_STRUCTURE: &[TagRule] = &[
    structure!("ADDR" => Address . "address", Address, Text, 60, "Mailing address").once(),
    leaf!("PHON" => "phone", Text, 25, "Phone number").occurs(0, Some(3)),
];

const ADDRESS_CONTINUATION: &[TagRule] = &continuation!("address");

const ADDRESS_LINES: &[TagRule] = &[
    leaf!("ADR1" => "line1", Text, 60, "First address line").once(),
    leaf!("ADR2" => "line2", Text, 60, "Second address line").once(),
    leaf!("CITY" => "city", Text, 60, "City").once(),
    leaf!("STAE" => "state", Text, 60, "State or province").once(),
    leaf!("POST" => "postal_code", Text, 10, "Postal code").once(),
    leaf!("CTRY" => "country", Text, 60, "Country").once(),
];

const SOURCE_CITATIONS: &[TagRule] = &[
    linked!("SOUR" => SourceCitation . "source", Source, SourceCitation, "Citation of a source record"),
    structure!("SOUR" => SourceCitation . "description", SourceCitation, Text, 248, "Inline source description"),
];

const NOTE_CITATIONS: &[TagRule] = &[
    linked!("NOTE" => NoteCitation . "note", Note, NoteCitation, "Reference to a note record"),
    structure!("NOTE" => NoteCitation . "text", NoteCitation, Text, 248, "Inline note"),
];

const MULTIMEDIA_LINKS: &[TagRule] = &[
    linked!("OBJE" => MultimediaCitation . "multimedia", Multimedia, MultimediaCitation, "Reference to a multimedia record"),
    TagRule::new("OBJE", TagContext::Plain)
        .child(State::MultimediaCitation)
        .actions(&[Action::CreateRecord(RecordKind::MultimediaCitation)])
        .describe("Inline multimedia link"),
];

const CHANGE: &[TagRule] = &[TagRule::new("CHAN", TagContext::Plain)
    .child(State::ChangeDate)
    .once()
    .actions(&[Action::CreateRecord(RecordKind::ChangeDate)])
    .describe("Date of last change")];

const CHANGE_DATE: &[TagRule] =
    &[continued!("DATE" => "date", DateTime, 11, "Change date").occurs(1, Some(1))];

const IDENTIFIERS: &[TagRule] = &[
    structure!("REFN" => UserReference . "reference", UserReference, Text, 20, "User reference number"),
    leaf!("RIN" => "rin", Number, 12, "Automated record id").once(),
];

const USER_REFERENCE: &[TagRule] =
    &[leaf!("TYPE" => "reference_type", Text, 40, "User reference type").once()];

const SUBMITTER: &[TagRule] = &[
    leaf!("NAME" => "name", Name, 60, "Submitter name").occurs(1, Some(1)),
    leaf!("LANG" => "language", Code, 90, "Language preference").occurs(0, Some(3)),
    leaf!("RFN" => "registered_rfn", Text, 30, "Registered record file number").once(),
];

const SUBMISSION: &[TagRule] = &[
    pointer!("SUBM" => "submitter", Submitter, "Submitter of the submission").once(),
    leaf!("FAMF" => "family_file", Text, 120, "Family file name").once(),
    leaf!("TEMP" => "temple", Code, 5, "Temple code").once(),
    leaf!("ANCE" => "ancestor_generations", Number, 4, "Generations of ancestors").once(),
    leaf!("DESC" => "descendant_generations", Number, 4, "Generations of descendants").once(),
    leaf!("ORDI" => "ordinance_process", Flag, 3, "Ordinance process flag").once(),
];

const INDIVIDUAL: &[TagRule] = &[
    leaf!("RESN" => "restriction", Code, 7, "Restriction notice").once(),
    structure!("NAME" => PersonalName . "name", PersonalName, Name, 120, "Personal name"),
    leaf!("SEX" => "sex", Code, 7, "Sex").once(),
    linked!("FAMC" => ChildToFamilyLink . "family", Family, ChildToFamilyLink, "Family in which the individual is a child"),
    linked!("FAMS" => SpouseToFamilyLink . "family", Family, SpouseToFamilyLink, "Family in which the individual is a spouse"),
    pointer!("SUBM" => "submitter", Submitter, "Submitter of the record"),
    linked!("ASSO" => Association . "individual", Individual, Association, "Associated individual"),
    pointer!("ALIA" => "alias", Individual, "Alias record of the same person"),
    pointer!("ANCI" => "ancestor_interest", Submitter, "Submitter interested in ancestors"),
    pointer!("DESI" => "descendant_interest", Submitter, "Submitter interested in descendants"),
    leaf!("RFN" => "permanent_record_file_number", Text, 90, "Permanent record file number").once(),
    leaf!("AFN" => "ancestral_file_number", Text, 12, "Ancestral file number").once(),
];

const INDIVIDUAL_EVENTS: &[TagRule] = &[
    event!("BIRT", IndividualEvent, Flag, 1, "Birth"),
    event!("CHR", IndividualEvent, Flag, 1, "Christening"),
    event!("DEAT", IndividualEvent, Flag, 1, "Death"),
    event!("BURI", IndividualEvent, Flag, 1, "Burial"),
    event!("CREM", IndividualEvent, Flag, 1, "Cremation"),
    event!("ADOP", IndividualEvent, Flag, 1, "Adoption"),
    event!("BAPM", IndividualEvent, Flag, 1, "Baptism"),
    event!("BARM", IndividualEvent, Flag, 1, "Bar mitzvah"),
    event!("BASM", IndividualEvent, Flag, 1, "Bas mitzvah"),
    event!("BLES", IndividualEvent, Flag, 1, "Blessing"),
    event!("CHRA", IndividualEvent, Flag, 1, "Adult christening"),
    event!("CONF", IndividualEvent, Flag, 1, "Confirmation"),
    event!("FCOM", IndividualEvent, Flag, 1, "First communion"),
    event!("ORDN", IndividualEvent, Flag, 1, "Ordination"),
    event!("NATU", IndividualEvent, Flag, 1, "Naturalization"),
    event!("EMIG", IndividualEvent, Flag, 1, "Emigration"),
    event!("IMMI", IndividualEvent, Flag, 1, "Immigration"),
    event!("CENS", IndividualEvent, Flag, 1, "Census"),
    event!("PROB", IndividualEvent, Flag, 1, "Probate"),
    event!("WILL", IndividualEvent, Flag, 1, "Will"),
    event!("GRAD", IndividualEvent, Flag, 1, "Graduation"),
    event!("RETI", IndividualEvent, Flag, 1, "Retirement"),
    event!("EVEN", IndividualEvent, Text, 90, "Other individual event"),
];

const INDIVIDUAL_ATTRIBUTES: &[TagRule] = &[
    attribute!("CAST", Text, 90, "Caste"),
    attribute!("DSCR", Text, 248, "Physical description"),
    attribute!("EDUC", Text, 248, "Education"),
    attribute!("IDNO", Text, 30, "National id number"),
    attribute!("NATI", Text, 120, "National or tribal origin"),
    attribute!("NCHI", Number, 3, "Count of children"),
    attribute!("NMR", Number, 3, "Count of marriages"),
    attribute!("OCCU", Text, 90, "Occupation"),
    attribute!("PROP", Text, 248, "Possessions"),
    attribute!("RELI", Text, 90, "Religious affiliation"),
    attribute!("RESI", None, 0, "Residence"),
    attribute!("SSN", Text, 11, "Social security number"),
    attribute!("TITL", Text, 120, "Nobility title"),
];

const INDIVIDUAL_ORDINANCES: &[TagRule] = &[
    lds!("BAPL", "LDS baptism"),
    lds!("CONL", "LDS confirmation"),
    lds!("ENDL", "LDS endowment"),
    lds!("SLGC", "LDS child sealing"),
];

const PERSONAL_NAME: &[TagRule] = &[
    leaf!("NPFX" => "prefix", Name, 30, "Name prefix").once(),
    leaf!("GIVN" => "given", Name, 120, "Given name").once(),
    leaf!("NICK" => "nickname", Name, 30, "Nickname").once(),
    leaf!("SPFX" => "surname_prefix", Name, 30, "Surname prefix").once(),
    leaf!("SURN" => "surname", Name, 120, "Surname").once(),
    leaf!("NSFX" => "suffix", Name, 30, "Name suffix").once(),
];

const EVENT_DETAIL: &[TagRule] = &[
    leaf!("TYPE" => "type", Text, 90, "Event classification").once(),
    leaf!("DATE" => "date", Date, 35, "Event date").once(),
    structure!("PLAC" => Place . "name", Place, Place, 120, "Event place").once(),
    leaf!("AGE" => "age", Age, 12, "Age at the event").once(),
    leaf!("AGNC" => "agency", Text, 120, "Responsible agency").once(),
    leaf!("CAUS" => "cause", Text, 90, "Cause of the event").once(),
];

const INDIVIDUAL_EVENT: &[TagRule] = &[TagRule::new("FAMC", TagContext::Xref)
    .child(State::EventFamilyLink)
    .data(DataType::Xref, 0)
    .once()
    .actions(&[
        Action::RegisterXref("family", Category::Family),
        Action::PushDuplicateFrame,
    ])
    .describe("Family the event relates to")];

const EVENT_FAMILY_LINK: &[TagRule] =
    &[leaf!("ADOP" => "adopted_by", Code, 4, "Adopting parent").once()];

const FAMILY_EVENT: &[TagRule] = &[
    group!("HUSB", HusbandAge, "Husband at the event").once(),
    group!("WIFE", WifeAge, "Wife at the event").once(),
];

const HUSBAND_AGE: &[TagRule] =
    &[leaf!("AGE" => "husband_age", Age, 12, "Husband's age").occurs(1, Some(1))];

const WIFE_AGE: &[TagRule] = &[leaf!("AGE" => "wife_age", Age, 12, "Wife's age").occurs(1, Some(1))];

const LDS_ORDINANCE: &[TagRule] = &[
    leaf!("STAT" => "status", Code, 10, "Ordinance status").once(),
    leaf!("DATE" => "date", Date, 35, "Ordinance date").once(),
    leaf!("TEMP" => "temple", Code, 5, "Temple code").once(),
    leaf!("PLAC" => "place_name", Place, 120, "Ordinance place").once(),
    pointer!("FAMC" => "family", Family, "Family of the sealed child").once(),
];

const CHILD_TO_FAMILY_LINK: &[TagRule] =
    &[leaf!("PEDI" => "pedigree", Code, 7, "Pedigree linkage type")];

const ASSOCIATION: &[TagRule] = &[
    leaf!("TYPE" => "record_type", Code, 4, "Type of the associated record").occurs(1, Some(1)),
    leaf!("RELA" => "relation", Text, 25, "Relation to the associate").occurs(1, Some(1)),
];

const FAMILY: &[TagRule] = &[
    pointer!("HUSB" => "husband", Individual, "Husband").once(),
    pointer!("WIFE" => "wife", Individual, "Wife").once(),
    pointer!("CHIL" => "child", Individual, "Child"),
    leaf!("NCHI" => "number_of_children", Number, 3, "Count of children").once(),
    pointer!("SUBM" => "submitter", Submitter, "Submitter of the record"),
    lds!("SLGS", "LDS spouse sealing"),
];

const FAMILY_EVENTS: &[TagRule] = &[
    event!("ANUL", FamilyEvent, Flag, 1, "Annulment"),
    event!("CENS", FamilyEvent, Flag, 1, "Census"),
    event!("DIV", FamilyEvent, Flag, 1, "Divorce"),
    event!("DIVF", FamilyEvent, Flag, 1, "Divorce filed"),
    event!("ENGA", FamilyEvent, Flag, 1, "Engagement"),
    event!("MARR", FamilyEvent, Flag, 1, "Marriage"),
    event!("MARB", FamilyEvent, Flag, 1, "Marriage bann"),
    event!("MARC", FamilyEvent, Flag, 1, "Marriage contract"),
    event!("MARL", FamilyEvent, Flag, 1, "Marriage license"),
    event!("MARS", FamilyEvent, Flag, 1, "Marriage settlement"),
    event!("EVEN", FamilyEvent, Text, 90, "Other family event"),
];

const SOURCE: &[TagRule] = &[
    group!("DATA", SourceData, "Data recorded in the source").once(),
    continued!("AUTH" => "author", ContinuedAuthor, 248, "Originator of the source").once(),
    continued!("TITL" => "title", ContinuedTitle, 248, "Title of the source").once(),
    leaf!("ABBR" => "abbreviation", Text, 60, "Short title").once(),
    continued!("PUBL" => "publication", ContinuedPublication, 248, "Publication facts").once(),
    continued!("TEXT" => "text", ContinuedText, 248, "Text from the source").once(),
    linked!("REPO" => RepositoryCitation . "repository", Repository, RepositoryCitation, "Repository holding the source"),
    TagRule::new("REPO", TagContext::Plain)
        .child(State::RepositoryCitation)
        .actions(&[Action::CreateRecord(RecordKind::RepositoryCitation)])
        .describe("Unidentified repository"),
];

const SOURCE_DATA: &[TagRule] = &[
    structure!("EVEN" => RecordedEvent . "events", RecordedEvent, Code, 90, "Events recorded"),
    leaf!("AGNC" => "agency", Text, 120, "Responsible agency").once(),
];

const RECORDED_EVENT: &[TagRule] = &[
    leaf!("DATE" => "date_period", Date, 35, "Period covered").once(),
    leaf!("PLAC" => "jurisdiction", Place, 120, "Jurisdiction covered").once(),
];

const AUTHOR_CONTINUATION: &[TagRule] = &continuation!("author");
const TITLE_CONTINUATION: &[TagRule] = &continuation!("title");
const PUBLICATION_CONTINUATION: &[TagRule] = &continuation!("publication");
const TEXT_CONTINUATION: &[TagRule] = &continuation!("text");

const REPOSITORY_CITATION: &[TagRule] =
    &[continued!("CALN" => "call_number", CallNumber, 120, "Call number")];

const CALL_NUMBER: &[TagRule] = &[leaf!("MEDI" => "media_type", Code, 15, "Source media type").once()];

const REPOSITORY: &[TagRule] = &[leaf!("NAME" => "name", Text, 90, "Repository name").once()];

const MULTIMEDIA: &[TagRule] = &[
    leaf!("FORM" => "format", Code, 4, "Multimedia format").once(),
    leaf!("TITL" => "title", Text, 248, "Descriptive title").once(),
    leaf!("FILE" => "file", Text, 30, "Multimedia file reference").once(),
    pointer!("OBJE" => "continued_object", Multimedia, "Next object in the chain").once(),
];

const MULTIMEDIA_CITATION: &[TagRule] = &[
    leaf!("FORM" => "format", Code, 4, "Multimedia format").once(),
    leaf!("TITL" => "title", Text, 248, "Descriptive title").once(),
    leaf!("FILE" => "file", Text, 30, "Multimedia file reference").once(),
];

const PLACE: &[TagRule] =
    &[leaf!("FORM" => "place_hierarchy", Text, 120, "Place jurisdiction levels").once()];

const SOURCE_CITATION: &[TagRule] = &[
    leaf!("PAGE" => "page", Text, 248, "Where within the source").once(),
    continued!("EVEN" => "cited_event", CitationEvent, 15, "Event type cited from").once(),
    group!("DATA", CitationData, "Data from the source").once(),
    leaf!("QUAY" => "quality", Code, 1, "Certainty assessment").once(),
    continued!("TEXT" => "text", ContinuedText, 248, "Text from the source"),
];

const SOURCE_DESCRIPTION_CONTINUATION: &[TagRule] = &continuation!("description");

const CITATION_EVENT: &[TagRule] = &[leaf!("ROLE" => "role", Text, 15, "Role in the cited event").once()];

const CITATION_DATA: &[TagRule] = &[
    leaf!("DATE" => "entry_date", Date, 90, "Entry recording date").once(),
    continued!("TEXT" => "text", ContinuedText, 248, "Text from the source"),
];

const USER_DEFINED: &[TagRule] = &[
    TagRule::new("CONC", TagContext::Plain)
        .data(DataType::Text, 248)
        .actions(&[Action::AppendField("text")])
        .describe("Continue the note on the same line"),
    TagRule::new("CONT", TagContext::Plain)
        .data(DataType::Text, 248)
        .actions(&[Action::AppendWithNewline("text")])
        .describe("Continue the note after a line break"),
    TagRule::new("NOTE", TagContext::UserDefined)
        .child(State::UserDefined)
        .data(DataType::Text, 248)
        .actions(&[
            Action::CreateRecord(RecordKind::UserDefinedNote),
            Action::SetField("text", Source::Data),
        ])
        .describe("Unrecognized line preserved as a note"),
];

/// Rule groups active in `state`, in lookup order.
pub(crate) fn rule_groups(state: State) -> &'static [&'static [TagRule]] {
    match state {
        State::Transmission => &[TRANSMISSION],
        State::Header => &[HEADER],
        State::HeaderSource => &[HEADER_SOURCE],
        State::HeaderSourceData => &[HEADER_SOURCE_DATA],
        State::Corporation => &[ADDRESS_STRUCTURE],
        State::DateTime => &[DATE_TIME],
        State::GedcomInfo => &[GEDCOM_INFO],
        State::CharacterSet => &[CHARACTER_SET],
        State::HeaderPlace => &[HEADER_PLACE],
        State::ContinuedNote => &[HEADER_NOTE],
        State::Address => &[ADDRESS_CONTINUATION, ADDRESS_LINES],
        State::Submitter => &[
            SUBMITTER,
            ADDRESS_STRUCTURE,
            MULTIMEDIA_LINKS,
            IDENTIFIERS,
            NOTE_CITATIONS,
            CHANGE,
        ],
        State::Submission => &[SUBMISSION, IDENTIFIERS, NOTE_CITATIONS, CHANGE],
        State::Individual => &[
            INDIVIDUAL,
            INDIVIDUAL_EVENTS,
            INDIVIDUAL_ATTRIBUTES,
            INDIVIDUAL_ORDINANCES,
            IDENTIFIERS,
            CHANGE,
            NOTE_CITATIONS,
            SOURCE_CITATIONS,
            MULTIMEDIA_LINKS,
        ],
        State::PersonalName => &[PERSONAL_NAME, SOURCE_CITATIONS, NOTE_CITATIONS],
        State::IndividualEvent => &[
            EVENT_DETAIL,
            ADDRESS_STRUCTURE,
            INDIVIDUAL_EVENT,
            SOURCE_CITATIONS,
            MULTIMEDIA_LINKS,
            NOTE_CITATIONS,
        ],
        State::FamilyEvent => &[
            EVENT_DETAIL,
            ADDRESS_STRUCTURE,
            FAMILY_EVENT,
            SOURCE_CITATIONS,
            MULTIMEDIA_LINKS,
            NOTE_CITATIONS,
        ],
        State::EventFamilyLink => &[EVENT_FAMILY_LINK],
        State::HusbandAge => &[HUSBAND_AGE],
        State::WifeAge => &[WIFE_AGE],
        State::LdsOrdinance => &[LDS_ORDINANCE, SOURCE_CITATIONS, NOTE_CITATIONS],
        State::ChildToFamilyLink => &[CHILD_TO_FAMILY_LINK, NOTE_CITATIONS],
        State::SpouseToFamilyLink => &[NOTE_CITATIONS],
        State::Association => &[ASSOCIATION, NOTE_CITATIONS, SOURCE_CITATIONS],
        State::UserReference => &[USER_REFERENCE],
        State::Family => &[
            FAMILY,
            FAMILY_EVENTS,
            IDENTIFIERS,
            CHANGE,
            NOTE_CITATIONS,
            SOURCE_CITATIONS,
            MULTIMEDIA_LINKS,
        ],
        State::Source => &[
            SOURCE,
            MULTIMEDIA_LINKS,
            NOTE_CITATIONS,
            IDENTIFIERS,
            CHANGE,
        ],
        State::SourceData => &[SOURCE_DATA, NOTE_CITATIONS],
        State::RecordedEvent => &[RECORDED_EVENT],
        State::ContinuedAuthor => &[AUTHOR_CONTINUATION],
        State::ContinuedTitle => &[TITLE_CONTINUATION],
        State::ContinuedPublication => &[PUBLICATION_CONTINUATION],
        State::ContinuedText => &[TEXT_CONTINUATION],
        State::RepositoryCitation => &[REPOSITORY_CITATION, NOTE_CITATIONS],
        State::CallNumber => &[CALL_NUMBER],
        State::Repository => &[
            REPOSITORY,
            ADDRESS_STRUCTURE,
            NOTE_CITATIONS,
            IDENTIFIERS,
            CHANGE,
        ],
        State::Multimedia => &[MULTIMEDIA, NOTE_CITATIONS, IDENTIFIERS, CHANGE],
        State::Note => &[TEXT_CONTINUATION, SOURCE_CITATIONS, IDENTIFIERS, CHANGE],
        State::Place => &[PLACE, SOURCE_CITATIONS, NOTE_CITATIONS],
        State::SourceCitation => &[
            SOURCE_CITATION,
            // Inline citations continue their description.
            SOURCE_DESCRIPTION_CONTINUATION,
            MULTIMEDIA_LINKS,
            NOTE_CITATIONS,
        ],
        State::CitationEvent => &[CITATION_EVENT],
        State::CitationData => &[CITATION_DATA],
        State::NoteCitation => &[TEXT_CONTINUATION, SOURCE_CITATIONS],
        State::MultimediaCitation => &[MULTIMEDIA_CITATION, NOTE_CITATIONS],
        State::ChangeDate => &[CHANGE_DATE, NOTE_CITATIONS],
        State::UserDefined => &[USER_DEFINED],
        State::LeafChildren | State::Rejected => &[],
    }
}
