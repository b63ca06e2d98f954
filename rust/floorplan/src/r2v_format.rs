// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Readers for the tab-separated R2V formats.
//!
//! Output files start with an image size line and a wall count `N`, followed
//! by `N` wall lines `x1 y1 x2 y2 left right` (room-type indices) and then
//! annotation lines `x1 y1 x2 y2 category _ _`. Annotation files contain only
//! annotation lines. Coordinates may be written as floats and are truncated
//! to integers. Blank lines are ignored.

use crate::error::{Error, Result};
use crate::types::{RawRecord, RecordCategory};

const WALL_FIELDS: usize = 6;
const ANNOTATION_FIELDS: usize = 7;

/// Non-blank lines with their 1-based line numbers
fn rows(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.split('\t').collect()))
}

fn parse_int(line: usize, field: &str) -> Result<i64> {
    let trimmed = field.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
        .ok_or_else(|| Error::parse(line, format!("invalid number '{trimmed}'")))
}

fn parse_coords(line: usize, fields: &[&str]) -> Result<[f64; 4]> {
    Ok([
        parse_int(line, fields[0])? as f64,
        parse_int(line, fields[1])? as f64,
        parse_int(line, fields[2])? as f64,
        parse_int(line, fields[3])? as f64,
    ])
}

fn expect_fields(line: usize, fields: &[&str], expected: usize) -> Result<()> {
    if fields.len() != expected {
        return Err(Error::parse(
            line,
            format!("expected {expected} fields, found {}", fields.len()),
        ));
    }
    Ok(())
}

fn room_type(line: usize, field: &str, room_types: &[String]) -> Result<String> {
    let index = parse_int(line, field)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| room_types.get(i))
        .cloned()
        .ok_or_else(|| Error::parse(line, format!("unknown room type index {index}")))
}

fn parse_annotation(line: usize, fields: &[&str]) -> Result<RawRecord> {
    expect_fields(line, fields, ANNOTATION_FIELDS)?;
    let [x1, y1, x2, y2] = parse_coords(line, fields)?;
    Ok(RawRecord::new(x1, y1, x2, y2, RecordCategory::parse(fields[4].trim())))
}

/// Parse an R2V output file. Wall side labels are resolved against the
/// room-type vocabulary.
pub fn parse_r2v_output(text: &str, room_types: &[String]) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut wall_count: Option<usize> = None;

    for (row, (line, fields)) in rows(text).enumerate() {
        match row {
            // Image size
            0 => continue,
            1 => {
                let count = parse_int(line, fields[0])?;
                wall_count = Some(
                    usize::try_from(count)
                        .map_err(|_| Error::parse(line, format!("invalid wall count {count}")))?,
                );
            }
            _ if row < wall_count.unwrap_or(0) + 2 => {
                expect_fields(line, &fields, WALL_FIELDS)?;
                let [x1, y1, x2, y2] = parse_coords(line, &fields)?;
                records.push(RawRecord {
                    left_room_type: Some(room_type(line, fields[4], room_types)?),
                    right_room_type: Some(room_type(line, fields[5], room_types)?),
                    ..RawRecord::new(x1, y1, x2, y2, RecordCategory::Wall)
                });
            }
            _ => records.push(parse_annotation(line, &fields)?),
        }
    }

    Ok(records)
}

/// Parse an R2V annotation file.
pub fn parse_r2v_annotation(text: &str) -> Result<Vec<RawRecord>> {
    rows(text)
        .map(|(line, fields)| parse_annotation(line, &fields))
        .collect()
}
