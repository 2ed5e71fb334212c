//! Flat positional payload codec for [`GroupRecord`].
//!
//! A record is stored as one ordered list of strings: a fixed-width header
//! (version, display fields, classification, timestamps, child count, mother
//! id) followed by exactly `child_count` child identifiers. Decoding is
//! bounds-checked field-by-field and fails closed: a short prefix or an
//! unparsable numeric/timestamp field yields `None`, and callers skip the
//! entry rather than abort whatever scan they are in. A child count that
//! disagrees with the actual trailing length is tolerated by reading
//! `min(child_count, available)` identifiers.

use chrono::{DateTime, Utc};

use crate::models::{Classification, EntityId, GroupRecord};

// Header slots, in storage order.
const IDX_VERSION: usize = 0;
const IDX_DISPLAY_NAME: usize = 1;
const IDX_LOGICAL_LABEL: usize = 2;
const IDX_KIND: usize = 3;
const IDX_AXIS: usize = 4;
const IDX_LEVEL: usize = 5;
const IDX_WIDTH: usize = 6;
const IDX_HEIGHT: usize = 7;
const IDX_CREATED_AT: usize = 8;
const IDX_MODIFIED_AT: usize = 9;
const IDX_CHILD_COUNT: usize = 10;
const IDX_MOTHER: usize = 11;
const HEADER_LEN: usize = 12;

/// Encode a record into its positional payload.
pub fn encode(record: &GroupRecord) -> Vec<String> {
    let mut values = Vec::with_capacity(HEADER_LEN + record.children.len());
    values.push(record.schema_version.to_string());
    values.push(record.display_name.clone());
    values.push(record.logical_label.clone());
    values.push(record.classification.kind.clone());
    values.push(record.classification.axis.clone());
    values.push(record.classification.level.to_string());
    values.push(record.classification.width.to_string());
    values.push(record.classification.height.to_string());
    values.push(record.created_at.to_rfc3339());
    values.push(record.modified_at.to_rfc3339());
    values.push(record.children.len().to_string());
    values.push(record.mother.as_str().to_string());
    values.extend(record.children.iter().map(|c| c.as_str().to_string()));
    values
}

/// Decode a positional payload back into a record.
///
/// Returns `None` for anything that cannot be decoded safely; never panics
/// and never indexes past the payload.
pub fn decode(values: &[String]) -> Option<GroupRecord> {
    if values.len() < HEADER_LEN {
        return None;
    }

    let schema_version: u32 = values[IDX_VERSION].parse().ok()?;
    let level: i64 = values[IDX_LEVEL].parse().ok()?;
    let width: f64 = values[IDX_WIDTH].parse().ok()?;
    let height: f64 = values[IDX_HEIGHT].parse().ok()?;
    let created_at = parse_timestamp(&values[IDX_CREATED_AT])?;
    let modified_at = parse_timestamp(&values[IDX_MODIFIED_AT])?;
    let child_count: usize = values[IDX_CHILD_COUNT].parse().ok()?;

    let available = values.len() - HEADER_LEN;
    let children = values[HEADER_LEN..HEADER_LEN + child_count.min(available)]
        .iter()
        .map(|v| EntityId::from(v.as_str()))
        .collect();

    Some(GroupRecord {
        schema_version,
        mother: EntityId::from(values[IDX_MOTHER].as_str()),
        children,
        display_name: values[IDX_DISPLAY_NAME].clone(),
        logical_label: values[IDX_LOGICAL_LABEL].clone(),
        classification: Classification {
            kind: values[IDX_KIND].clone(),
            axis: values[IDX_AXIS].clone(),
            level,
            width,
            height,
        },
        created_at,
        modified_at,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
