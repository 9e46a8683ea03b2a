//! Partitioning vector layers so overlapping features never share a pass.

use std::path::Path;

use walltowall_core::types::AttributeValue;

use super::filter::accepts;

/// Candidate values of one split attribute: its distinct non-null values,
/// narrowed to `filter` when one is configured. Filter values are compared
/// in the attribute's own value type.
pub fn split_values(
    layer: &Path,
    attribute: &str,
    distinct: &[AttributeValue],
    filter: Option<&[AttributeValue]>,
) -> Vec<AttributeValue> {
    let null_count = distinct.iter().filter(|v| v.is_null()).count();
    if null_count > 0 {
        tracing::warn!(
            layer = %layer.display(),
            attribute,
            "features with no value are excluded from the split"
        );
    }

    let candidates = distinct.iter().filter(|v| !v.is_null());
    match filter {
        Some(filter) => {
            let coerced: Vec<AttributeValue> = match distinct.iter().find(|v| !v.is_null()) {
                Some(template) => filter.iter().map(|f| f.coerce_like(template)).collect(),
                None => filter.to_vec(),
            };
            candidates.filter(|v| accepts(&coerced, v)).cloned().collect()
        }
        None => candidates.cloned().collect(),
    }
}

/// Every combination of one value per dimension, in dimension order. The
/// last dimension varies fastest. Any empty dimension yields no combinations.
pub fn cartesian_product(dimensions: &[Vec<AttributeValue>]) -> Vec<Vec<AttributeValue>> {
    dimensions.iter().fold(vec![Vec::new()], |combinations, values| {
        combinations
            .iter()
            .flat_map(|prefix| {
                values.iter().map(move |value| {
                    let mut combination = prefix.clone();
                    combination.push(value.clone());
                    combination
                })
            })
            .collect()
    })
}
