//! Repair of text decoded with the wrong character set.
//!
//! Shapefiles with a missing or wrong `.cpg` sidecar commonly hand back
//! UTF-8 bytes decoded as Windows-1252 or Latin-1 ("QuÃ©bec" for "Québec",
//! "donâ€™t" for "don’t").

use walltowall_core::types::{AttributeTable, AttributeValue};

/// Returns the repaired text when `text` is UTF-8 that was decoded as
/// Windows-1252 or Latin-1.
pub fn repair_mojibake(text: &str) -> Option<String> {
    if text.is_ascii() {
        return None;
    }

    // Windows-1252 leaves 0x80..=0x9F C1 controls unmapped; those only
    // come back through a Latin-1 decode.
    let (encoded, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    let bytes = if unmappable {
        latin1_bytes(text)?
    } else {
        encoded.into_owned()
    };

    match String::from_utf8(bytes) {
        Ok(repaired) if repaired != text => Some(repaired),
        _ => None,
    }
}

fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

/// Repair every text value of `table`, logging each attribute that needed it.
pub fn repair_table(table: AttributeTable, layer: &str) -> AttributeTable {
    table
        .iter()
        .map(|column| {
            let mut repaired_count = 0usize;
            let values: Vec<AttributeValue> = column
                .values
                .iter()
                .map(|value| match value {
                    AttributeValue::Text(text) => match repair_mojibake(text) {
                        Some(repaired) => {
                            repaired_count += 1;
                            AttributeValue::Text(repaired)
                        }
                        None => value.clone(),
                    },
                    other => other.clone(),
                })
                .collect();

            if repaired_count > 0 {
                tracing::warn!(
                    layer,
                    attribute = %column.name,
                    repaired = repaired_count,
                    "repaired mis-encoded attribute values"
                );
            }
            (column.name.clone(), values)
        })
        .collect()
}
