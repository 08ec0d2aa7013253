// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

//! Parsing of the textual byte lists stored under `byte_strings`.
//!
//! Accepted input is a comma separated list of integer literals, optionally
//! wrapped in `[...]` or `(...)`, for example `0x01, 0x02, 255` or
//! `[1, 0b10, 0o3,]`. A lone value such as `5` or `(5)` is not a list; write
//! `5,` or `[5]` instead. Decimal, hex (`0x`), octal (`0o`) and binary (`0b`)
//! literals are supported and every value must fit in a byte. Quoted text
//! items (`'abc'`, `"abc"`) are accepted and become zero. Nothing else is
//! evaluated.

use log::info;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,
    #[error("input is not a list")]
    NotASequence,
    #[error("unbalanced brackets")]
    UnbalancedBrackets,
    #[error("unterminated text literal")]
    UnterminatedText,
    #[error("empty item at position {index}")]
    EmptyItem { index: usize },
    #[error("invalid token {token:?} at position {index}")]
    InvalidToken { token: String, index: usize },
    #[error("value {value} at position {index} does not fit in a byte")]
    OutOfRange { value: u64, index: usize },
}

/// Number of comma separated tokens in `raw`, the size of the report built
/// from it.
pub fn token_count(raw: &str) -> usize {
    raw.split(',').count()
}

/// Strictly parse `raw` into the byte values it lists.
pub fn parse_report(raw: &str) -> Result<Vec<u8>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (body, bracketed) = strip_brackets(trimmed)?;
    let mut items = split_items(body)?;

    // Only `[...]`, `()` or a top-level comma make a list; `5` and `(5)` are
    // plain values
    let has_comma = items.len() > 1;
    let is_list = has_comma || trimmed.starts_with('[') || (bracketed && body.trim().is_empty());
    if !is_list {
        return Err(ParseError::NotASequence);
    }

    // A single trailing comma is allowed, as is an empty bracketed list
    if items.last().is_some_and(|item| item.is_empty()) && (has_comma || bracketed) {
        items.pop();
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(item, index))
        .collect()
}

/// Build a report of exactly `target_size` bytes from `raw`.
///
/// Values are copied positionally into a zero-filled buffer; missing values
/// stay zero and surplus values are dropped. When `raw` cannot be parsed the
/// failure is logged and an empty buffer is returned, meaning "send nothing".
pub fn parse_buffer(raw: &str, target_size: usize) -> Vec<u8> {
    match parse_report(raw) {
        Ok(values) => {
            let mut buffer = vec![0u8; target_size];
            let count = target_size.min(values.len());
            buffer[..count].copy_from_slice(&values[..count]);
            buffer
        }
        Err(e) => {
            info!("Parse error: {} in {:?}", e, raw);
            Vec::new()
        }
    }
}

fn strip_brackets(input: &str) -> Result<(&str, bool), ParseError> {
    let closing = match input.chars().next() {
        Some('[') => ']',
        Some('(') => ')',
        _ => {
            if input.ends_with(']') || input.ends_with(')') {
                return Err(ParseError::UnbalancedBrackets);
            }
            return Ok((input, false));
        }
    };
    if input.len() < 2 || !input.ends_with(closing) {
        return Err(ParseError::UnbalancedBrackets);
    }
    Ok((&input[1..input.len() - 1], true))
}

/// Split on commas that are not inside a quoted text item
fn split_items(body: &str) -> Result<Vec<&str>, ParseError> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (pos, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ',') => {
                items.push(body[start..pos].trim());
                start = pos + 1;
            }
            (None, _) => {}
        }
    }
    if quote.is_some() {
        return Err(ParseError::UnterminatedText);
    }
    items.push(body[start..].trim());
    Ok(items)
}

fn is_text(item: &str) -> bool {
    item.len() >= 2
        && ((item.starts_with('\'') && item.ends_with('\'')) || (item.starts_with('"') && item.ends_with('"')))
}

fn parse_item(item: &str, index: usize) -> Result<u8, ParseError> {
    if item.is_empty() {
        return Err(ParseError::EmptyItem { index });
    }
    if is_text(item) {
        return Ok(0);
    }

    let lower = item.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    let invalid = || ParseError::InvalidToken {
        token: item.to_string(),
        index,
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let value = u64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    u8::try_from(value).map_err(|_| ParseError::OutOfRange { value, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_quotes() {
        assert_eq!(split_items("1,'a,b',2").unwrap(), vec!["1", "'a,b'", "2"]);
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("[1,2]").unwrap(), ("1,2", true));
        assert_eq!(strip_brackets("(1,2)").unwrap(), ("1,2", true));
        assert_eq!(strip_brackets("1,2").unwrap(), ("1,2", false));
        assert_eq!(strip_brackets("[1,2)"), Err(ParseError::UnbalancedBrackets));
        assert_eq!(strip_brackets("1,2]"), Err(ParseError::UnbalancedBrackets));
        assert_eq!(strip_brackets("["), Err(ParseError::UnbalancedBrackets));
    }
}
