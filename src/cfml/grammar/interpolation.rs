//! String literal interpolation
//!
//! Inside either kind of string literal, `#expression#` embeds an expression and `##` is a
//! literal `#`. The delimiter quote is escaped by doubling it. Splitting happens on the raw
//! token text; embedded expressions are returned as absolute byte ranges so the grammar can
//! lex and parse them in place.

use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Byte range of the embedded expression, without the surrounding `#`
    Expression(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("unterminated '#' in string literal")]
    UnterminatedHash { offset: usize },
    #[error("empty '##' expression in string literal")]
    EmptyExpression { offset: usize },
}

impl InterpolationError {
    pub fn offset(&self) -> usize {
        match self {
            InterpolationError::UnterminatedHash { offset }
            | InterpolationError::EmptyExpression { offset } => *offset,
        }
    }
}

/// Split a raw string token (quotes included) that starts at byte `base` of the source
pub fn split(raw: &str, base: usize) -> Result<Vec<Segment>, InterpolationError> {
    let mut chars = raw.char_indices().peekable();
    let Some((_, quote)) = chars.next() else {
        return Ok(Vec::new());
    };
    let body_end = raw.len().saturating_sub(quote.len_utf8());

    let mut segments = Vec::new();
    let mut text = String::new();
    while let Some((index, ch)) = chars.next() {
        if index >= body_end {
            break;
        }
        if ch == quote {
            // doubled delimiter
            chars.next();
            text.push(quote);
        } else if ch == '#' {
            if matches!(chars.peek(), Some((_, '#'))) {
                chars.next();
                text.push('#');
                continue;
            }
            let start = index + 1;
            let end = raw[start..body_end]
                .find('#')
                .map(|relative| start + relative)
                .ok_or(InterpolationError::UnterminatedHash { offset: base + index })?;
            if raw[start..end].trim().is_empty() {
                return Err(InterpolationError::EmptyExpression { offset: base + index });
            }
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Expression(base + start..base + end));
            while matches!(chars.peek(), Some((next, _)) if *next <= end) {
                chars.next();
            }
        } else {
            text.push(ch);
        }
    }
    if !text.is_empty() || segments.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(segments)
}

/// Unescaped content of a string token without interpolation
pub fn unescape(raw: &str) -> Result<String, InterpolationError> {
    let segments = split(raw, 0)?;
    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Expression(_) => String::new(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string() {
        assert_eq!(split("'abc'", 0).unwrap(), vec![Segment::Text("abc".into())]);
        assert_eq!(split("''", 0).unwrap(), vec![Segment::Text(String::new())]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            split(r#""say ""hi"" ##1""#, 0).unwrap(),
            vec![Segment::Text("say \"hi\" #1".into())]
        );
        assert_eq!(split("'it''s'", 0).unwrap(), vec![Segment::Text("it's".into())]);
    }

    #[test]
    fn test_embedded_expressions() {
        let segments = split("\"a#x + 1#b#y#\"", 10).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Text("a".into()),
                Segment::Expression(13..18),
                Segment::Text("b".into()),
                Segment::Expression(21..22),
            ]
        );
    }

    #[test]
    fn test_unterminated_hash() {
        let err = split("'a#b'", 4).unwrap_err();
        assert_eq!(err, InterpolationError::UnterminatedHash { offset: 6 });
    }
}
