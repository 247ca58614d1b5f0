//! Schema-checked decoding of the model's reply.
//!
//! The reply is untrusted text. It is unwrapped from Markdown fences, parsed as
//! JSON, and every field is validated before a [`ParsedTransaction`] is built:
//!
//! - `null`, an empty reply, or an object with neither amount nor description: `Declined`
//! - anything else that does not fit the shape: `Malformed`
//! - unknown categories are kept as `CategorySuggestion::Unknown`, never trusted

use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tally_core::{Category, CategorySuggestion, ParsedTransaction, TransactionType};

use crate::error::InterpretError;

#[derive(Debug, Deserialize)]
struct RawParsed {
    description: Option<String>,
    amount: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    category_suggestion: Option<String>,
    category: Option<String>,
    counterparty: Option<String>,
}

/// Decode a raw model reply.
pub fn decode(raw: &str) -> Result<ParsedTransaction, InterpretError> {
    let body = strip_fences(raw);
    if body.is_empty() {
        return Err(InterpretError::Declined);
    }
    let value: Value = serde_json::from_str(body)
        .map_err(|e| InterpretError::Malformed(format!("reply is not JSON: {e}")))?;
    decode_value(value)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: Value) -> Result<ParsedTransaction, InterpretError> {
    match &value {
        Value::Null => return Err(InterpretError::Declined),
        Value::Object(_) => {}
        other => {
            return Err(InterpretError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            )));
        }
    }

    let raw: RawParsed =
        serde_json::from_value(value).map_err(|e| InterpretError::Malformed(e.to_string()))?;

    let description = raw
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    if description.is_none() && raw.amount.is_none() {
        return Err(InterpretError::Declined);
    }

    let description = description
        .ok_or_else(|| InterpretError::Malformed("missing description".to_string()))?
        .to_string();

    let amount = raw
        .amount
        .as_ref()
        .ok_or_else(|| InterpretError::Malformed("missing amount".to_string()))
        .and_then(parse_amount)?;

    let kind = raw
        .kind
        .as_deref()
        .ok_or_else(|| InterpretError::Malformed("missing type".to_string()))?;
    let kind = TransactionType::from_str(kind).map_err(|e| InterpretError::Malformed(e.to_string()))?;

    let label = raw
        .category_suggestion
        .as_deref()
        .or(raw.category.as_deref())
        .map(str::trim);
    let category_suggestion = match label {
        Some(label) if !label.is_empty() => CategorySuggestion::from_label(label),
        _ => CategorySuggestion::Known(Category::default()),
    };

    let counterparty = raw
        .counterparty
        .as_deref()
        .map(str::trim)
        .filter(|c| !is_blank_marker(c))
        .map(str::to_string);

    Ok(ParsedTransaction {
        description,
        amount,
        kind,
        category_suggestion,
        counterparty,
    })
}

/// Accepts a JSON number or a numeric string such as "₹1,000.50". Zero is allowed.
fn parse_amount(v: &Value) -> Result<Decimal, InterpretError> {
    let bad = || InterpretError::Malformed(format!("amount is not a number: {v}"));

    let amount = match v {
        Value::Number(n) => {
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .map_err(|_| bad())?
        }
        Value::String(s) => {
            let digits = amount_digits(s)?.ok_or_else(bad)?;
            Decimal::from_str(&digits.replace(',', "")).map_err(|_| bad())?
        }
        _ => return Err(bad()),
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InterpretError::Malformed(format!("amount is negative: {amount}")));
    }
    Ok(amount)
}

/// Strip currency text around a numeric string and check what is left is a
/// plain decimal, optionally with comma digit grouping ("1,250.75" or
/// "1,00,000"). Returns `None` for anything else, including "1.000,50" and
/// "1e3".
fn amount_digits(s: &str) -> Result<Option<&str>, InterpretError> {
    let number_re = Regex::new(r"^-?(?:\d+|\d{1,3}(?:,\d{2,3})*,\d{3})(?:\.\d+)?$")
        .map_err(|e| InterpretError::Malformed(e.to_string()))?;

    let s = s.trim();
    let Some(start) = s.find(|c: char| c.is_ascii_digit() || c == '-') else {
        return Ok(None);
    };
    // "Rs.100" drops the prefix, but ".5" or "$.5" would lose a decimal point.
    let prefix = &s[..start];
    if prefix.strip_suffix('.').is_some_and(|head| !head.ends_with(char::is_alphabetic)) {
        return Ok(None);
    }
    let body = s[start..].trim_end_matches(|c: char| !c.is_ascii_digit());

    Ok(number_re.is_match(body).then_some(body))
}

fn is_blank_marker(s: &str) -> bool {
    s.is_empty() || ["null", "none", "n/a", "unknown"].iter().any(|m| s.eq_ignore_ascii_case(m))
}

/// Remove a surrounding ```json ... ``` fence if there is one.
fn strip_fences(raw: &str) -> &str {
    let t = raw.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with(['{', '[']) => body.trim(),
        _ => rest.trim(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
