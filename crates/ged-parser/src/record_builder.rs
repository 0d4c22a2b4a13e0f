use ged_core::{
    Action, FieldAnchor, FieldValue, GedcomError, Line, Record, RecordId, Source, Transmission,
    XrefRef,
};
use tracing::{debug, trace};

/// Where a line's frame lands after its actions ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Applied {
    pub record: RecordId,
    pub records_opened: usize,
    /// Last slot the line wrote on its frame record, if any.
    pub anchor: Option<FieldAnchor>,
}

/// Action interpreter: executes a rule's action list against the record tree and index.
pub(crate) struct RecordBuilder {
    transmission: Transmission,
}

impl RecordBuilder {
    pub(crate) fn new() -> Self {
        Self {
            transmission: Transmission::new(),
        }
    }

    pub(crate) const fn transmission(&self) -> &Transmission {
        &self.transmission
    }

    pub(crate) fn into_transmission(self) -> Transmission {
        self.transmission
    }

    /// Run `actions` for `line`, starting at `parent`.
    ///
    /// Every precondition is checked before the first mutation, so a failing line
    /// leaves the tree and the index untouched. The first record the line creates
    /// takes `anchor`.
    pub(crate) fn apply(
        &mut self,
        line: &Line,
        data: &[String],
        parent: RecordId,
        actions: &[Action],
        mut anchor: Option<FieldAnchor>,
    ) -> Result<Applied, GedcomError> {
        self.check(line, actions)?;

        let mut written: Option<(RecordId, &'static str)> = None;

        // Frames opened by this line; the flag marks frames that created their record.
        let mut cursor: Vec<(RecordId, bool)> = Vec::with_capacity(actions.len());
        for action in actions {
            let current = cursor.last().map_or(parent, |(id, _)| *id);
            match *action {
                Action::CreateRecord(kind) => {
                    let id = self
                        .transmission
                        .add_child(current, kind)
                        .ok_or_else(|| missing_record(line, current))?;
                    debug!("Line {}: opened {kind} record #{}", line.number, id.0);
                    if let Some(anchor) = anchor.take() {
                        self.record_mut(line, id)?.set_anchor(anchor);
                    }
                    written = Some((current, kind.field_name()));
                    cursor.push((id, true));
                }
                Action::SetField(name, source) => {
                    let words = match source {
                        Source::Data => data.to_vec(),
                        Source::Const(word) => vec![word.to_string()],
                    };
                    self.record_mut(line, current)?
                        .push_value(name, FieldValue::Words(words));
                    written = Some((current, name));
                }
                Action::AppendField(name) => {
                    self.record_mut(line, current)?
                        .append_words(name, data, false);
                    written = Some((current, name));
                }
                Action::AppendWithNewline(name) => {
                    self.record_mut(line, current)?
                        .append_words(name, data, true);
                    written = Some((current, name));
                }
                Action::RegisterXref(name, category) => {
                    let key = required_xref(line)?;
                    self.record_mut(line, current)?
                        .push_value(name, FieldValue::Xref(XrefRef::new(category, key)));
                    written = Some((current, name));
                }
                Action::RegisterIndexEntry(category) => {
                    let key = required_xref(line)?;
                    self.transmission
                        .index_mut()
                        .insert(category, key, current)
                        .map_err(|_| GedcomError::DuplicateKey {
                            line: line.number,
                            category,
                            key: key.to_string(),
                        })?;
                }
                Action::PopFrame => {
                    cursor.pop();
                    trace!("Line {}: closed record #{}", line.number, current.0);
                }
                Action::PushDuplicateFrame => cursor.push((current, false)),
            }
        }

        let record = cursor.last().map_or(parent, |(id, _)| *id);
        let anchor = written
            .filter(|(id, _)| *id == record)
            .and_then(|(id, field)| {
                let slots = self.transmission.record(id)?.field(field)?.len();
                Some(FieldAnchor {
                    field,
                    slot: slots.checked_sub(1)?,
                })
            });
        Ok(Applied {
            record,
            records_opened: cursor.iter().filter(|(_, created)| *created).count(),
            anchor,
        })
    }

    fn check(&self, line: &Line, actions: &[Action]) -> Result<(), GedcomError> {
        let mut opened = 0usize;
        for action in actions {
            match *action {
                Action::CreateRecord(_) | Action::PushDuplicateFrame => opened += 1,
                Action::PopFrame => {
                    opened = opened.checked_sub(1).ok_or_else(|| GedcomError::Schema {
                        line: line.number,
                        message: format!("`{}` closes a record it did not open", line.tag),
                    })?;
                }
                Action::RegisterXref(..) => {
                    required_xref(line)?;
                }
                Action::RegisterIndexEntry(category) => {
                    let key = required_xref(line)?;
                    if self.transmission.index().contains(category, key) {
                        return Err(GedcomError::DuplicateKey {
                            line: line.number,
                            category,
                            key: key.to_string(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn record_mut(&mut self, line: &Line, id: RecordId) -> Result<&mut Record, GedcomError> {
        self.transmission
            .record_mut(id)
            .ok_or_else(|| missing_record(line, id))
    }
}

fn required_xref(line: &Line) -> Result<&str, GedcomError> {
    line.xref.as_deref().ok_or_else(|| GedcomError::Schema {
        line: line.number,
        message: format!("`{}` needs an xref", line.tag),
    })
}

fn missing_record(line: &Line, id: RecordId) -> GedcomError {
    GedcomError::Schema {
        line: line.number,
        message: format!("record #{} does not exist", id.0),
    }
}

#[cfg(test)]
mod tests {
    use super::RecordBuilder;
    use ged_core::{
        Action, Category, FieldAnchor, FieldValue, GedcomError, Line, RecordKind, Source,
        Transmission,
    };

    fn line(xref: Option<&str>, tag: &str) -> Line {
        Line {
            number: 1,
            level: 0,
            xref: xref.map(str::to_string),
            tag: tag.to_string(),
            data: None,
        }
    }

    const INDI: &[Action] = &[
        Action::CreateRecord(RecordKind::Individual),
        Action::RegisterXref("xref", Category::Individual),
        Action::RegisterIndexEntry(Category::Individual),
    ];

    #[test]
    fn create_record_becomes_the_frame_record() {
        let mut builder = RecordBuilder::new();
        let applied = builder
            .apply(&line(Some("I1"), "INDI"), &[], Transmission::ROOT, INDI, None)
            .expect("first registration succeeds");
        assert_eq!(applied.records_opened, 1);
        let transmission = builder.transmission();
        assert_eq!(transmission.find_id(Category::Individual, "I1"), Some(applied.record));
        assert_eq!(
            transmission.find(Category::Individual, "I1").map(|r| r.kind),
            Some(RecordKind::Individual)
        );
    }

    #[test]
    fn duplicate_key_leaves_tree_untouched() {
        let mut builder = RecordBuilder::new();
        builder
            .apply(&line(Some("I1"), "INDI"), &[], Transmission::ROOT, INDI, None)
            .expect("first registration succeeds");
        let before = builder.transmission().clone();

        let error = builder
            .apply(&line(Some("I1"), "INDI"), &[], Transmission::ROOT, INDI, None)
            .expect_err("second registration fails");
        assert!(matches!(error, GedcomError::DuplicateKey { .. }));
        assert_eq!(builder.transmission(), &before);
    }

    #[test]
    fn pop_frame_returns_to_parent() {
        let mut builder = RecordBuilder::new();
        let applied = builder
            .apply(
                &line(None, "TRLR"),
                &[],
                Transmission::ROOT,
                &[Action::CreateRecord(RecordKind::Trailer), Action::PopFrame],
                None,
            )
            .expect("trailer applies");
        assert_eq!(applied.record, Transmission::ROOT);
        assert_eq!(applied.records_opened, 0);
        assert_eq!(applied.anchor, Some(FieldAnchor { field: "trailer", slot: 0 }));
        assert!(builder.transmission().has_trailer());
    }

    #[test]
    fn unbalanced_pop_is_rejected_before_mutation() {
        let mut builder = RecordBuilder::new();
        let result = builder.apply(
            &line(None, "X"),
            &[],
            Transmission::ROOT,
            &[Action::SetField("text", Source::Data), Action::PopFrame],
            None,
        );
        assert!(matches!(result, Err(GedcomError::Schema { .. })));
        assert!(builder.transmission().root().fields().is_empty());
    }

    #[test]
    fn set_field_from_constant() {
        let mut builder = RecordBuilder::new();
        let applied = builder
            .apply(
                &line(None, "BIRT"),
                &["Y".to_string()],
                Transmission::ROOT,
                &[
                    Action::CreateRecord(RecordKind::Event),
                    Action::SetField("event_type", Source::Const("BIRT")),
                    Action::SetField("event_status", Source::Data),
                ],
                None,
            )
            .expect("event applies");
        let event = builder.transmission().record(applied.record).expect("event exists");
        assert_eq!(event.first_text("event_type").as_deref(), Some("BIRT"));
        assert_eq!(
            event.field("event_status"),
            Some(&[FieldValue::Words(vec!["Y".to_string()])][..])
        );
    }

    #[test]
    fn leaf_lines_report_the_slot_they_wrote() {
        let mut builder = RecordBuilder::new();
        let individual = builder
            .apply(&line(Some("I1"), "INDI"), &[], Transmission::ROOT, INDI, None)
            .expect("individual applies")
            .record;
        let sex = &[Action::SetField("sex", Source::Data)];
        builder
            .apply(&line(None, "SEX"), &["M".to_string()], individual, sex, None)
            .expect("first sex applies");
        let applied = builder
            .apply(&line(None, "SEX"), &["F".to_string()], individual, sex, None)
            .expect("second sex applies");
        assert_eq!(applied.record, individual);
        assert_eq!(applied.anchor, Some(FieldAnchor { field: "sex", slot: 1 }));
    }

    #[test]
    fn anchor_goes_to_the_first_created_record() {
        let mut builder = RecordBuilder::new();
        let anchor = FieldAnchor { field: "sex", slot: 0 };
        let applied = builder
            .apply(
                &line(None, "WHY"),
                &["WHY".to_string()],
                Transmission::ROOT,
                &[
                    Action::CreateRecord(RecordKind::UserDefinedNote),
                    Action::SetField("text", Source::Data),
                ],
                Some(anchor),
            )
            .expect("note applies");
        let note = builder.transmission().record(applied.record).expect("note exists");
        assert_eq!(note.anchor(), Some(anchor));
        assert_eq!(applied.anchor, Some(FieldAnchor { field: "text", slot: 0 }));
        assert_eq!(builder.transmission().root().anchor(), None);
    }
}
