//! Configured attribute filters.

use walltowall_core::config::FilterConfig;
use walltowall_core::errors::DisturbanceError;
use walltowall_core::types::AttributeValue;

/// Widest `(min,max)` range accepted; anything larger is a typo.
pub const MAX_RANGE_SPAN: i64 = 10_000;

/// Parse the `"(min,max)"` range form: two integers separated by a comma,
/// inclusive on both ends. Returns `None` when `text` is not parenthesized.
pub fn parse_range(text: &str) -> Option<Result<(i64, i64), String>> {
    let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [min, max] = parts.as_slice() else {
        return Some(Err(format!("expected two values, found {}", parts.len())));
    };

    Some(parse_bound(min).and_then(|min| {
        let max = parse_bound(max)?;
        if min > max {
            return Err(format!("minimum {min} is greater than maximum {max}"));
        }
        if max - min > MAX_RANGE_SPAN {
            return Err(format!("range spans more than {MAX_RANGE_SPAN} values"));
        }
        Ok((min, max))
    }))
}

fn parse_bound(text: &str) -> Result<i64, String> {
    text.parse::<i64>()
        .map_err(|_| format!("{text:?} is not an integer"))
}

/// Expand a configured filter to the list of accepted values.
pub fn parse_filter(attribute: &str, config: &FilterConfig) -> Result<Vec<AttributeValue>, DisturbanceError> {
    match config {
        FilterConfig::List(values) => Ok(values.clone()),
        FilterConfig::Single(AttributeValue::Text(text)) => match parse_range(text) {
            Some(Ok((min, max))) => Ok((min..=max).map(AttributeValue::Integer).collect()),
            Some(Err(message)) => Err(DisturbanceError::InvalidFilterRange {
                attribute: attribute.to_string(),
                value: text.clone(),
                message,
            }),
            None => Ok(vec![AttributeValue::Text(text.clone())]),
        },
        FilterConfig::Single(value) => Ok(vec![value.clone()]),
    }
}

/// True when `value` is one of `accepted`, comparing across representations.
pub fn accepts(accepted: &[AttributeValue], value: &AttributeValue) -> bool {
    accepted.iter().any(|a| a.loosely_equals(value))
}
