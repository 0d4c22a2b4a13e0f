use chumsky::prelude::*;
use ged_core::{GedcomError, Line, check_xref_key};

const BYTE_ORDER_MARK: char = '\u{feff}';

// ---------------------------------------------------------------------------
// Token shapes
// ---------------------------------------------------------------------------

fn level_token<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> {
    any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .to_slice()
        .then_ignore(end())
}

fn xref_token<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> {
    just('@')
        .ignore_then(
            any()
                .filter(|c: &char| *c != '@')
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .then_ignore(just('@'))
        .then_ignore(end())
}

fn tag_token<'a>() -> impl Parser<'a, &'a str, &'a str, extra::Err<Rich<'a, char>>> {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .then_ignore(end())
}

/// The xref key inside `token`, when the token is `@key@`.
fn xref_key(token: &str) -> Option<&str> {
    let (key, errors) = xref_token().parse(token).into_output_errors();
    if errors.is_empty() { key } else { None }
}

fn parse_level(number: usize, token: &str) -> Result<u32, GedcomError> {
    let (digits, errors) = level_token().parse(token).into_output_errors();
    let digits = match digits {
        Some(digits) if errors.is_empty() => digits,
        _ => {
            return Err(GedcomError::structural(
                number,
                format!("level `{token}` is not a number"),
            ));
        }
    };
    digits.parse().map_err(|_| {
        GedcomError::structural(number, format!("level `{token}` is out of range"))
    })
}

fn parse_tag(number: usize, token: &str) -> Result<String, GedcomError> {
    let (tag, errors) = tag_token().parse(token).into_output_errors();
    match tag {
        Some(tag) if errors.is_empty() => Ok(tag.to_string()),
        _ => Err(GedcomError::structural(
            number,
            format!("`{token}` is not a valid tag"),
        )),
    }
}

fn words(tokens: &[&str]) -> Option<Vec<String>> {
    (!tokens.is_empty()).then(|| tokens.iter().map(|token| (*token).to_string()).collect())
}

// ---------------------------------------------------------------------------
// Line tokenizer
// ---------------------------------------------------------------------------

/// Split one raw line into level, optional xref key, tag and data words.
///
/// A level-0 line is either `0 @KEY@ TAG [data...]` or a bare `0 TAG`. Deeper lines put
/// the tag first and carry either a single xref or data words, never both.
pub fn tokenize(number: usize, raw: &str) -> Result<Line, GedcomError> {
    let raw = if number <= 1 {
        raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw)
    } else {
        raw
    };
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let [level_text, second, rest @ ..] = tokens.as_slice() else {
        return Err(GedcomError::structural(
            number,
            "expected a level followed by a tag",
        ));
    };
    let level = parse_level(number, level_text)?;

    if level == 0 {
        if let Some(key) = xref_key(second) {
            check_xref_key(number, key)?;
            let [tag, data @ ..] = rest else {
                return Err(GedcomError::structural(
                    number,
                    format!("record @{key}@ is missing its tag"),
                ));
            };
            return Ok(Line {
                number,
                level,
                xref: Some(key.to_string()),
                tag: parse_tag(number, tag)?,
                data: words(data),
            });
        }
        if !rest.is_empty() {
            return Err(GedcomError::structural(
                number,
                format!("level-0 `{second}` line without an xref takes no data"),
            ));
        }
        return Ok(Line {
            number,
            level,
            xref: None,
            tag: parse_tag(number, second)?,
            data: None,
        });
    }

    if xref_key(second).is_some() {
        return Err(GedcomError::structural(
            number,
            format!("xref `{second}` must follow the tag below level 0"),
        ));
    }
    let tag = parse_tag(number, second)?;
    if let Some(first) = rest.first()
        && let Some(key) = xref_key(first)
    {
        if rest.len() > 1 {
            return Err(GedcomError::structural(
                number,
                format!("pointer line `{tag} {first}` cannot also carry data"),
            ));
        }
        check_xref_key(number, key)?;
        return Ok(Line {
            number,
            level,
            xref: Some(key.to_string()),
            tag,
            data: None,
        });
    }
    Ok(Line {
        number,
        level,
        xref: None,
        tag,
        data: words(rest),
    })
}

/// Leading level of a line that failed to tokenize, when it has a readable one.
pub(crate) fn salvage_level(raw: &str) -> Option<usize> {
    let first = raw
        .trim_start_matches(BYTE_ORDER_MARK)
        .split_whitespace()
        .next()?;
    let (digits, errors) = level_token().parse(first).into_output_errors();
    if errors.is_empty() {
        digits.and_then(|digits| digits.parse().ok())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{salvage_level, tokenize};
    use ged_core::{GedcomError, TagContext};

    fn structural_message(result: Result<ged_core::Line, GedcomError>) -> String {
        match result {
            Err(GedcomError::Structural { message, .. }) => message,
            other => panic!("expected a structural error, got {other:?}"),
        }
    }

    #[test]
    fn level_zero_record_with_data() {
        let line = tokenize(3, "0 @N1@ NOTE Some text here").expect("valid line");
        assert_eq!(line.number, 3);
        assert_eq!(line.level, 0);
        assert_eq!(line.xref.as_deref(), Some("N1"));
        assert_eq!(line.tag, "NOTE");
        assert_eq!(line.data_words(), ["Some", "text", "here"]);
        assert_eq!(line.context(), TagContext::Xref);
    }

    #[test]
    fn level_zero_marker_takes_no_data() {
        let line = tokenize(1, "0 HEAD").expect("valid line");
        assert_eq!(line.tag, "HEAD");
        assert!(line.data.is_none());
        assert!(structural_message(tokenize(1, "0 HEAD extra")).contains("takes no data"));
    }

    #[test]
    fn nested_line_carries_pointer_or_data() {
        let pointer = tokenize(2, "1 FAMC @F9@").expect("valid pointer");
        assert_eq!(pointer.xref.as_deref(), Some("F9"));
        assert!(pointer.data.is_none());

        let data = tokenize(3, "  2   DATE   1 JAN 1900  ").expect("valid data line");
        assert_eq!(data.level, 2);
        assert_eq!(data.data_words(), ["1", "JAN", "1900"]);

        assert!(structural_message(tokenize(4, "1 FAMC @F9@ extra")).contains("cannot also carry data"));
    }

    #[test]
    fn xref_before_tag_is_only_legal_at_level_zero() {
        assert!(structural_message(tokenize(1, "1 @I1@ INDI")).contains("must follow the tag"));
    }

    #[test]
    fn malformed_lines_are_structural_errors() {
        for raw in ["", "0", "HEAD", "x HEAD", "-1 HEAD", "0 @I1@", "1 NA-ME John"] {
            assert!(
                matches!(tokenize(1, raw), Err(GedcomError::Structural { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn oversize_xref_keys_are_rejected() {
        let long = format!("0 @{}@ INDI", "I".repeat(23));
        assert!(structural_message(tokenize(1, &long)).contains("limit is 22"));
        assert!(tokenize(1, &format!("0 @{}@ INDI", "I".repeat(22))).is_ok());
    }

    #[test]
    fn byte_order_mark_is_ignored_on_the_first_line() {
        let line = tokenize(1, "\u{feff}0 HEAD").expect("BOM is stripped");
        assert_eq!(line.tag, "HEAD");
        assert!(tokenize(2, "\u{feff}0 HEAD").is_err());
    }

    #[test]
    fn non_xref_at_tokens_are_data() {
        let line = tokenize(1, "1 NOTE @@ mail me").expect("@@ is not an xref");
        assert!(line.xref.is_none());
        assert_eq!(line.data_words(), ["@@", "mail", "me"]);
    }

    #[test]
    fn salvage_reads_leading_level() {
        assert_eq!(salvage_level("2 @bad@ TAG"), Some(2));
        assert_eq!(salvage_level("garbage"), None);
        assert_eq!(salvage_level(""), None);
    }
}
