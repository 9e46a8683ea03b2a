//! Column layout of transition-rule tables.

pub const ID: &str = "id";
pub const DISTURBANCE_TYPE: &str = "disturbance_type";
pub const AGE_RESET_TYPE: &str = "age_reset_type";
pub const AGE_AFTER: &str = "age_after";
pub const REGEN_DELAY: &str = "regen_delay";
pub const MATCH_SUFFIX: &str = "_match";

/// Columns that are never classifiers.
pub const RESERVED_COLUMNS: [&str; 5] = [ID, REGEN_DELAY, AGE_AFTER, DISTURBANCE_TYPE, AGE_RESET_TYPE];

pub const DEFAULT_AGE_RESET_TYPE: &str = "absolute";
pub const DEFAULT_REGEN_DELAY: &str = "0";
/// Wildcard classifier value: any.
pub const WILDCARD: &str = "?";

pub fn is_reserved(column: &str) -> bool {
    RESERVED_COLUMNS.contains(&column)
}

pub fn is_match_column(column: &str) -> bool {
    column.len() > MATCH_SUFFIX.len() && column.ends_with(MATCH_SUFFIX)
}

pub fn match_column(classifier: &str) -> String {
    format!("{classifier}{MATCH_SUFFIX}")
}

fn category(column: &str) -> u8 {
    match column {
        ID => 0,
        DISTURBANCE_TYPE | AGE_RESET_TYPE => 1,
        c if is_match_column(c) => 2,
        AGE_AFTER => 3,
        REGEN_DELAY => 4,
        _ => 5,
    }
}

/// Sort columns by category, then name: id, disturbance-type columns,
/// `*_match` columns, `age_after`, `regen_delay`, classifiers.
pub fn order_columns<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    columns.sort_by(|a, b| category(a).cmp(&category(b)).then_with(|| a.cmp(b)));
    columns.dedup();
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_group_by_category() {
        let ordered = order_columns([
            "species",
            "regen_delay",
            "species_match",
            "id",
            "age_after",
            "age_reset_type",
            "disturbance_type",
            "zone",
            "zone_match",
        ]);
        assert_eq!(
            ordered,
            vec![
                "id",
                "age_reset_type",
                "disturbance_type",
                "species_match",
                "zone_match",
                "age_after",
                "regen_delay",
                "species",
                "zone",
            ]
        );
    }

    #[test]
    fn match_suffix_alone_is_a_classifier() {
        assert!(!is_match_column("_match"));
        assert!(is_match_column("x_match"));
    }
}
