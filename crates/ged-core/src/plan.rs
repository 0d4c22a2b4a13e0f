//! Emission plans: the inverse of the grammar's actions, one per record kind.

use crate::record::RecordKind;

/// Where a record's own line takes its tag from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTag {
    Fixed(&'static str),
    /// First word slot of the named field.
    Field(&'static str),
    /// The data words already start with the original tag.
    Verbatim,
    /// The root has no line of its own.
    Root,
}

/// A record's this-level line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePlan {
    pub tag: PlanTag,
    pub xref: Option<&'static str>,
    pub data: Option<&'static str>,
    /// Whether the data may run onto `CONC`/`CONT` lines.
    pub continued: bool,
}

/// Sub-level instruction, emitted at `level + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// One line per word slot.
    Text {
        tag: &'static str,
        field: &'static str,
        continued: bool,
    },
    /// One line per reference slot.
    Xref {
        tag: &'static str,
        field: &'static str,
    },
    /// Child records, each through its own plan.
    Nested { field: &'static str },
    /// A line whose children are fields of the same record.
    Group {
        tag: &'static str,
        data: Option<&'static str>,
        xref: Option<&'static str>,
        children: &'static [Emit],
    },
}

impl Emit {
    fn declares(&self, name: &str) -> bool {
        match self {
            Self::Text { field, .. } | Self::Xref { field, .. } | Self::Nested { field } => {
                *field == name
            }
            Self::Group {
                data,
                xref,
                children,
                ..
            } => {
                *data == Some(name)
                    || *xref == Some(name)
                    || children.iter().any(|child| child.declares(name))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub line: LinePlan,
    pub sections: &'static [&'static [Emit]],
}

impl Plan {
    /// Sub-level instructions in emission order.
    pub fn instructions(&self) -> impl Iterator<Item = &'static Emit> + use<> {
        let sections = self.sections;
        sections.iter().flat_map(|section| section.iter())
    }

    /// Whether a record of this kind may hold `name`. User notes are legal everywhere.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        name == USER_NOTE
            || self.line.xref == Some(name)
            || self.line.data == Some(name)
            || matches!(self.line.tag, PlanTag::Field(field) if field == name)
            || self.instructions().any(|emit| emit.declares(name))
    }

    /// Whether user notes have an explicit position; otherwise they trail the record.
    #[must_use]
    pub fn places_user_notes(&self) -> bool {
        self.instructions()
            .any(|emit| matches!(emit, Emit::Nested { field } if *field == USER_NOTE))
    }
}

const USER_NOTE: &str = RecordKind::UserDefinedNote.field_name();

macro_rules! text {
    ($tag:literal => $field:literal) => {
        Emit::Text {
            tag: $tag,
            field: $field,
            continued: false,
        }
    };
}

macro_rules! long_text {
    ($tag:literal => $field:literal) => {
        Emit::Text {
            tag: $tag,
            field: $field,
            continued: true,
        }
    };
}

macro_rules! xref {
    ($tag:literal => $field:literal) => {
        Emit::Xref {
            tag: $tag,
            field: $field,
        }
    };
}

macro_rules! nested {
    ($field:literal) => {
        Emit::Nested { field: $field }
    };
}

macro_rules! own_line {
    ($tag:literal) => {
        LinePlan {
            tag: PlanTag::Fixed($tag),
            xref: None,
            data: None,
            continued: false,
        }
    };
    ($tag:literal, xref: $xref:literal) => {
        LinePlan {
            tag: PlanTag::Fixed($tag),
            xref: Some($xref),
            data: None,
            continued: false,
        }
    };
    ($tag:literal, data: $data:literal) => {
        LinePlan {
            tag: PlanTag::Fixed($tag),
            xref: None,
            data: Some($data),
            continued: false,
        }
    };
}

const DATE_TIME: Emit = Emit::Group {
    tag: "DATE",
    data: Some("date"),
    xref: None,
    children: &[text!("TIME" => "time")],
};

const ADDRESS_STRUCTURE: &[Emit] = &[nested!("address"), text!("PHON" => "phone")];
const SOURCE_CITATIONS: &[Emit] = &[nested!("source_citation")];
const NOTE_CITATIONS: &[Emit] = &[nested!("note_citation")];
const MULTIMEDIA_LINKS: &[Emit] = &[nested!("multimedia_citation")];
const CHANGE: &[Emit] = &[nested!("change_date")];
const IDENTIFIERS: &[Emit] = &[nested!("user_reference"), text!("RIN" => "rin")];

const EVENT_DETAIL: &[Emit] = &[
    text!("TYPE" => "type"),
    text!("DATE" => "date"),
    nested!("place"),
    text!("AGE" => "age"),
    text!("AGNC" => "agency"),
    text!("CAUS" => "cause"),
];

const EVENT_FAMILY: Emit = Emit::Group {
    tag: "FAMC",
    data: None,
    xref: Some("family"),
    children: &[text!("ADOP" => "adopted_by")],
};

const TRANSMISSION: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Root,
        xref: None,
        data: None,
        continued: false,
    },
    sections: &[&[
        nested!("header"),
        nested!("submission_record"),
        nested!("submitter_record"),
        nested!("individual_record"),
        nested!("family_record"),
        nested!("source_record"),
        nested!("repository_record"),
        nested!("multimedia_record"),
        nested!("note_record"),
        nested!("user_note"),
        nested!("trailer"),
    ]],
};

const HEADER: Plan = Plan {
    line: own_line!("HEAD"),
    sections: &[&[
        nested!("header_source"),
        text!("DEST" => "destination"),
        DATE_TIME,
        xref!("SUBM" => "submitter"),
        xref!("SUBN" => "submission"),
        text!("FILE" => "file_name"),
        text!("COPR" => "copyright"),
        Emit::Group {
            tag: "GEDC",
            data: None,
            xref: None,
            children: &[
                text!("VERS" => "gedcom_version"),
                text!("FORM" => "gedcom_form"),
            ],
        },
        Emit::Group {
            tag: "CHAR",
            data: Some("character_set"),
            xref: None,
            children: &[text!("VERS" => "character_set_version")],
        },
        text!("LANG" => "language"),
        Emit::Group {
            tag: "PLAC",
            data: None,
            xref: None,
            children: &[text!("FORM" => "place_hierarchy")],
        },
        long_text!("NOTE" => "note"),
    ]],
};

const HEADER_SOURCE: Plan = Plan {
    line: own_line!("SOUR", data: "approved_system_id"),
    sections: &[&[
        text!("VERS" => "version"),
        text!("NAME" => "product_name"),
        nested!("corporation"),
        Emit::Group {
            tag: "DATA",
            data: Some("source_data"),
            xref: None,
            children: &[
                text!("DATE" => "data_date"),
                text!("COPR" => "data_copyright"),
            ],
        },
    ]],
};

const CORPORATION: Plan = Plan {
    line: own_line!("CORP", data: "name"),
    sections: &[ADDRESS_STRUCTURE],
};

const ADDRESS: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Fixed("ADDR"),
        xref: None,
        data: Some("address"),
        continued: true,
    },
    sections: &[&[
        text!("ADR1" => "line1"),
        text!("ADR2" => "line2"),
        text!("CITY" => "city"),
        text!("STAE" => "state"),
        text!("POST" => "postal_code"),
        text!("CTRY" => "country"),
    ]],
};

const SUBMITTER: Plan = Plan {
    line: own_line!("SUBM", xref: "xref"),
    sections: &[
        &[
            text!("NAME" => "name"),
            text!("LANG" => "language"),
            text!("RFN" => "registered_rfn"),
        ],
        ADDRESS_STRUCTURE,
        MULTIMEDIA_LINKS,
        IDENTIFIERS,
        NOTE_CITATIONS,
        CHANGE,
    ],
};

const SUBMISSION: Plan = Plan {
    line: own_line!("SUBN", xref: "xref"),
    sections: &[
        &[
            xref!("SUBM" => "submitter"),
            text!("FAMF" => "family_file"),
            text!("TEMP" => "temple"),
            text!("ANCE" => "ancestor_generations"),
            text!("DESC" => "descendant_generations"),
            text!("ORDI" => "ordinance_process"),
        ],
        IDENTIFIERS,
        NOTE_CITATIONS,
        CHANGE,
    ],
};

const INDIVIDUAL: Plan = Plan {
    line: own_line!("INDI", xref: "xref"),
    sections: &[
        &[
            text!("RESN" => "restriction"),
            nested!("name"),
            text!("SEX" => "sex"),
            nested!("event"),
            nested!("attribute"),
            nested!("lds_ordinance"),
            nested!("child_to_family_link"),
            nested!("spouse_to_family_link"),
            xref!("SUBM" => "submitter"),
            nested!("association"),
            xref!("ALIA" => "alias"),
            xref!("ANCI" => "ancestor_interest"),
            xref!("DESI" => "descendant_interest"),
            text!("RFN" => "permanent_record_file_number"),
            text!("AFN" => "ancestral_file_number"),
        ],
        IDENTIFIERS,
        CHANGE,
        NOTE_CITATIONS,
        SOURCE_CITATIONS,
        MULTIMEDIA_LINKS,
    ],
};

const PERSONAL_NAME: Plan = Plan {
    line: own_line!("NAME", data: "name"),
    sections: &[
        &[
            text!("NPFX" => "prefix"),
            text!("GIVN" => "given"),
            text!("NICK" => "nickname"),
            text!("SPFX" => "surname_prefix"),
            text!("SURN" => "surname"),
            text!("NSFX" => "suffix"),
        ],
        SOURCE_CITATIONS,
        NOTE_CITATIONS,
    ],
};

const EVENT: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Field("event_type"),
        xref: None,
        data: Some("event_status"),
        continued: false,
    },
    sections: &[
        EVENT_DETAIL,
        ADDRESS_STRUCTURE,
        &[
            EVENT_FAMILY,
            Emit::Group {
                tag: "HUSB",
                data: None,
                xref: None,
                children: &[text!("AGE" => "husband_age")],
            },
            Emit::Group {
                tag: "WIFE",
                data: None,
                xref: None,
                children: &[text!("AGE" => "wife_age")],
            },
        ],
        SOURCE_CITATIONS,
        MULTIMEDIA_LINKS,
        NOTE_CITATIONS,
    ],
};

const ATTRIBUTE: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Field("attribute_type"),
        xref: None,
        data: Some("value"),
        continued: false,
    },
    sections: &[
        EVENT_DETAIL,
        ADDRESS_STRUCTURE,
        &[EVENT_FAMILY],
        SOURCE_CITATIONS,
        MULTIMEDIA_LINKS,
        NOTE_CITATIONS,
    ],
};

const LDS_ORDINANCE: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Field("ordinance_type"),
        xref: None,
        data: None,
        continued: false,
    },
    sections: &[
        &[
            text!("STAT" => "status"),
            text!("DATE" => "date"),
            text!("TEMP" => "temple"),
            text!("PLAC" => "place_name"),
            xref!("FAMC" => "family"),
        ],
        SOURCE_CITATIONS,
        NOTE_CITATIONS,
    ],
};

const PLACE: Plan = Plan {
    line: own_line!("PLAC", data: "name"),
    sections: &[
        &[text!("FORM" => "place_hierarchy")],
        SOURCE_CITATIONS,
        NOTE_CITATIONS,
    ],
};

const CHILD_TO_FAMILY_LINK: Plan = Plan {
    line: own_line!("FAMC", xref: "family"),
    sections: &[&[text!("PEDI" => "pedigree")], NOTE_CITATIONS],
};

const SPOUSE_TO_FAMILY_LINK: Plan = Plan {
    line: own_line!("FAMS", xref: "family"),
    sections: &[NOTE_CITATIONS],
};

const ASSOCIATION: Plan = Plan {
    line: own_line!("ASSO", xref: "individual"),
    sections: &[
        &[
            text!("TYPE" => "record_type"),
            text!("RELA" => "relation"),
        ],
        NOTE_CITATIONS,
        SOURCE_CITATIONS,
    ],
};

const USER_REFERENCE: Plan = Plan {
    line: own_line!("REFN", data: "reference"),
    sections: &[&[text!("TYPE" => "reference_type")]],
};

const CHANGE_DATE: Plan = Plan {
    line: own_line!("CHAN"),
    sections: &[&[DATE_TIME], NOTE_CITATIONS],
};

const FAMILY: Plan = Plan {
    line: own_line!("FAM", xref: "xref"),
    sections: &[
        &[
            xref!("HUSB" => "husband"),
            xref!("WIFE" => "wife"),
            xref!("CHIL" => "child"),
            text!("NCHI" => "number_of_children"),
            xref!("SUBM" => "submitter"),
            nested!("event"),
            nested!("lds_ordinance"),
        ],
        IDENTIFIERS,
        CHANGE,
        NOTE_CITATIONS,
        SOURCE_CITATIONS,
        MULTIMEDIA_LINKS,
    ],
};

const SOURCE: Plan = Plan {
    line: own_line!("SOUR", xref: "xref"),
    sections: &[
        &[
            Emit::Group {
                tag: "DATA",
                data: None,
                xref: None,
                children: &[nested!("recorded_event"), text!("AGNC" => "agency")],
            },
            long_text!("AUTH" => "author"),
            long_text!("TITL" => "title"),
            text!("ABBR" => "abbreviation"),
            long_text!("PUBL" => "publication"),
            long_text!("TEXT" => "text"),
            nested!("repository_citation"),
        ],
        MULTIMEDIA_LINKS,
        NOTE_CITATIONS,
        IDENTIFIERS,
        CHANGE,
    ],
};

const RECORDED_EVENT: Plan = Plan {
    line: own_line!("EVEN", data: "events"),
    sections: &[&[
        text!("DATE" => "date_period"),
        text!("PLAC" => "jurisdiction"),
    ]],
};

const REPOSITORY_CITATION: Plan = Plan {
    line: own_line!("REPO", xref: "repository"),
    sections: &[
        &[Emit::Group {
            tag: "CALN",
            data: Some("call_number"),
            xref: None,
            children: &[text!("MEDI" => "media_type")],
        }],
        NOTE_CITATIONS,
    ],
};

const REPOSITORY: Plan = Plan {
    line: own_line!("REPO", xref: "xref"),
    sections: &[
        &[text!("NAME" => "name")],
        ADDRESS_STRUCTURE,
        NOTE_CITATIONS,
        IDENTIFIERS,
        CHANGE,
    ],
};

const MULTIMEDIA: Plan = Plan {
    line: own_line!("OBJE", xref: "xref"),
    sections: &[
        &[
            text!("FORM" => "format"),
            text!("TITL" => "title"),
            text!("FILE" => "file"),
            xref!("OBJE" => "continued_object"),
        ],
        NOTE_CITATIONS,
        IDENTIFIERS,
        CHANGE,
    ],
};

const NOTE: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Fixed("NOTE"),
        xref: Some("xref"),
        data: Some("text"),
        continued: true,
    },
    sections: &[SOURCE_CITATIONS, IDENTIFIERS, CHANGE],
};

const SOURCE_CITATION: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Fixed("SOUR"),
        xref: Some("source"),
        data: Some("description"),
        continued: true,
    },
    sections: &[
        &[
            text!("PAGE" => "page"),
            Emit::Group {
                tag: "EVEN",
                data: Some("cited_event"),
                xref: None,
                children: &[text!("ROLE" => "role")],
            },
            Emit::Group {
                tag: "DATA",
                data: None,
                xref: None,
                children: &[text!("DATE" => "entry_date"), long_text!("TEXT" => "text")],
            },
            text!("QUAY" => "quality"),
        ],
        MULTIMEDIA_LINKS,
        NOTE_CITATIONS,
    ],
};

const NOTE_CITATION: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Fixed("NOTE"),
        xref: Some("note"),
        data: Some("text"),
        continued: true,
    },
    sections: &[SOURCE_CITATIONS],
};

const MULTIMEDIA_CITATION: Plan = Plan {
    line: own_line!("OBJE", xref: "multimedia"),
    sections: &[
        &[
            text!("FORM" => "format"),
            text!("TITL" => "title"),
            text!("FILE" => "file"),
        ],
        NOTE_CITATIONS,
    ],
};

const TRAILER: Plan = Plan {
    line: own_line!("TRLR"),
    sections: &[],
};

const USER_DEFINED_NOTE: Plan = Plan {
    line: LinePlan {
        tag: PlanTag::Verbatim,
        xref: None,
        data: Some("text"),
        continued: true,
    },
    sections: &[],
};

/// The declared emission plan of `kind`; together the plans close each kind's field set.
#[must_use]
pub fn emission_plan(kind: RecordKind) -> &'static Plan {
    match kind {
        RecordKind::Transmission => &TRANSMISSION,
        RecordKind::Header => &HEADER,
        RecordKind::HeaderSource => &HEADER_SOURCE,
        RecordKind::Corporation => &CORPORATION,
        RecordKind::Submitter => &SUBMITTER,
        RecordKind::Submission => &SUBMISSION,
        RecordKind::Individual => &INDIVIDUAL,
        RecordKind::Family => &FAMILY,
        RecordKind::Source => &SOURCE,
        RecordKind::Repository => &REPOSITORY,
        RecordKind::Multimedia => &MULTIMEDIA,
        RecordKind::Note => &NOTE,
        RecordKind::Trailer => &TRAILER,
        RecordKind::PersonalName => &PERSONAL_NAME,
        RecordKind::Event => &EVENT,
        RecordKind::Attribute => &ATTRIBUTE,
        RecordKind::LdsOrdinance => &LDS_ORDINANCE,
        RecordKind::Place => &PLACE,
        RecordKind::Address => &ADDRESS,
        RecordKind::SourceCitation => &SOURCE_CITATION,
        RecordKind::NoteCitation => &NOTE_CITATION,
        RecordKind::MultimediaCitation => &MULTIMEDIA_CITATION,
        RecordKind::RepositoryCitation => &REPOSITORY_CITATION,
        RecordKind::RecordedEvent => &RECORDED_EVENT,
        RecordKind::ChildToFamilyLink => &CHILD_TO_FAMILY_LINK,
        RecordKind::SpouseToFamilyLink => &SPOUSE_TO_FAMILY_LINK,
        RecordKind::Association => &ASSOCIATION,
        RecordKind::UserReference => &USER_REFERENCE,
        RecordKind::ChangeDate => &CHANGE_DATE,
        RecordKind::UserDefinedNote => &USER_DEFINED_NOTE,
    }
}

#[cfg(test)]
mod tests {
    use super::{Emit, PlanTag, emission_plan};
    use crate::record::RecordKind;

    #[test]
    fn nested_fields_name_real_record_kinds() {
        let child_fields: Vec<&str> = RecordKind::ALL.iter().map(|kind| kind.field_name()).collect();
        for kind in RecordKind::ALL {
            for emit in emission_plan(kind).instructions() {
                if let Emit::Nested { field } = emit {
                    assert!(child_fields.contains(field), "{kind:?} nests unknown field {field}");
                }
            }
        }
    }

    #[test]
    fn only_the_root_has_no_line() {
        for kind in RecordKind::ALL {
            let is_root = emission_plan(kind).line.tag == PlanTag::Root;
            assert_eq!(is_root, kind == RecordKind::Transmission, "{kind:?}");
        }
    }

    #[test]
    fn declares_covers_line_groups_and_user_notes() {
        let header = emission_plan(RecordKind::Header);
        assert!(header.declares("time"));
        assert!(header.declares("gedcom_form"));
        assert!(header.declares("user_note"));
        assert!(!header.declares("surname"));

        let event = emission_plan(RecordKind::Event);
        assert!(event.declares("event_type"));
        assert!(event.declares("family"));

        // Names read at runtime, not only literals.
        let tag_field = String::from("attribute_type");
        assert!(emission_plan(RecordKind::Attribute).declares(&tag_field));
        assert!(!emission_plan(RecordKind::Family).declares(&tag_field));
        assert!(!event.places_user_notes());
        assert!(emission_plan(RecordKind::Transmission).places_user_notes());
    }
}
