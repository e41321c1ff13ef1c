// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Leading numeric token extraction using nom combinators
//!
//! Source values often arrive as free text ("240V", "14 GA"). Only a
//! leading number is meaningful. The `can_extract_*` checks and the
//! `extract_*` functions share one recogniser, so a check returns `true`
//! exactly when the matching extraction succeeds.

use foundry_model::{MappingError, Result};
use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1},
    combinator::{opt, recognize},
    IResult, Parser,
};

// ============================================================================
// Recognisers
// ============================================================================

/// `-?\d+`
fn integer_token(input: &str) -> IResult<&str, &str> {
    recognize((opt(char('-')), digit1)).parse(input)
}

/// `-?\d*\.?\d+`
fn decimal_token(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(char('-')),
        alt((recognize((digit0, char('.'), digit1)), digit1)),
    ))
    .parse(input)
}

/// Parse a recognised decimal token, accepting a bare leading dot
fn parse_decimal(token: &str) -> Option<f64> {
    let (sign, digits) = match token.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token),
    };

    if digits.starts_with('.') {
        let padded = format!("{}0{}", sign, digits);
        lexical_core::parse::<f64>(padded.as_bytes()).ok()
    } else {
        lexical_core::parse::<f64>(token.as_bytes()).ok()
    }
}

fn leading_integer(text: &str) -> Option<i32> {
    let (_, token) = integer_token(text.trim()).ok()?;
    lexical_core::parse::<i32>(token.as_bytes()).ok()
}

fn leading_double(text: &str) -> Option<f64> {
    let (_, token) = decimal_token(text.trim()).ok()?;
    parse_decimal(token)
}

// ============================================================================
// Public API
// ============================================================================

/// Check if `text` starts with a 32-bit integer token
pub fn can_extract_integer(text: &str) -> bool {
    leading_integer(text).is_some()
}

/// Check if `text` starts with a decimal token
pub fn can_extract_double(text: &str) -> bool {
    leading_double(text).is_some()
}

/// Extract the leading integer of `text`
pub fn extract_integer(text: &str) -> Result<i32> {
    leading_integer(text).ok_or_else(|| MappingError::parse(text))
}

/// Extract the leading decimal number of `text`
pub fn extract_double(text: &str) -> Result<f64> {
    leading_double(text).ok_or_else(|| MappingError::parse(text))
}

/// Loose parse: drop everything except digits and dots, then parse the rest
///
/// Used for voltage text where the number is not leading ("Nominal 240").
pub fn extract_loose_double(text: &str) -> Result<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if kept.is_empty() {
        return Err(MappingError::parse(text));
    }

    parse_decimal(&kept).ok_or_else(|| MappingError::parse(text))
}
