//! dBase III attribute table
//!
//! Field types are inferred from the attribute values of a layer. Text is
//! stored as UTF-8; the `.cpg` sidecar announces the encoding.

use super::ShapefileError;
use crate::domain::{AttributeValue, Feature};
use chrono::{Datelike, NaiveDate};

const VERSION: u8 = 0x03;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const RECORD_ACTIVE: u8 = b' ';
const RECORD_DELETED: u8 = b'*';

const MAX_FIELDS: usize = 255;
const MAX_NAME_LEN: usize = 10;
const MAX_CHAR_WIDTH: usize = 254;
const REAL_WIDTH: u8 = 24;
const REAL_DECIMALS: u8 = 15;

/// Name of the field added to layers without attributes
pub const FID_FIELD: &str = "FID";

/// dBase field type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Logical,
}

impl FieldType {
    fn code(self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Numeric => b'N',
            FieldType::Logical => b'L',
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            b'N' | b'F' => FieldType::Numeric,
            b'L' => FieldType::Logical,
            _ => FieldType::Character,
        }
    }
}

/// One column of the attribute table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name as stored in the file (at most 10 ASCII characters)
    pub name: String,
    /// Attribute key the column is filled from
    pub source_key: String,
    pub field_type: FieldType,
    pub length: u8,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueClass {
    Empty,
    Logical,
    Integer,
    Real,
    Text,
}

impl ValueClass {
    fn of(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Null => ValueClass::Empty,
            AttributeValue::Boolean(_) => ValueClass::Logical,
            AttributeValue::Integer(_) => ValueClass::Integer,
            AttributeValue::Real(_) => ValueClass::Real,
            AttributeValue::Text(_) => ValueClass::Text,
        }
    }

    fn widen(self, other: ValueClass) -> ValueClass {
        use ValueClass::*;
        match (self, other) {
            (Empty, x) | (x, Empty) => x,
            (a, b) if a == b => a,
            (Integer, Real) | (Real, Integer) => Real,
            _ => Text,
        }
    }
}

/// Infers the table layout from the union of attribute keys
///
/// Keys keep their first-seen order. A layer without any attribute gets a
/// single integer `FID` column.
pub fn infer_fields(features: &[Feature]) -> Result<Vec<FieldDescriptor>, ShapefileError> {
    let mut keys: Vec<(String, ValueClass, usize)> = Vec::new();

    for feature in features {
        for (key, value) in &feature.attributes {
            let class = ValueClass::of(value);
            let width = display_width(value);
            match keys.iter_mut().find(|(k, _, _)| k == key) {
                Some((_, existing, max_width)) => {
                    *existing = existing.widen(class);
                    *max_width = (*max_width).max(width);
                }
                None => keys.push((key.clone(), class, width)),
            }
        }
    }

    if keys.is_empty() {
        let width = features.len().max(1).to_string().len().max(10);
        return Ok(vec![FieldDescriptor {
            name: FID_FIELD.to_string(),
            source_key: String::new(),
            field_type: FieldType::Numeric,
            length: width as u8,
            decimals: 0,
        }]);
    }

    if keys.len() > MAX_FIELDS {
        return Err(ShapefileError::TooManyFields(keys.len()));
    }

    let mut used_names: Vec<String> = Vec::with_capacity(keys.len());
    let mut fields = Vec::with_capacity(keys.len());

    for (key, class, max_width) in keys {
        let name = unique_field_name(&key, &used_names);
        used_names.push(name.to_ascii_lowercase());

        let (field_type, length, decimals) = match class {
            ValueClass::Logical => (FieldType::Logical, 1, 0),
            ValueClass::Integer => (FieldType::Numeric, max_width.clamp(1, 20) as u8, 0),
            ValueClass::Real => (FieldType::Numeric, REAL_WIDTH, REAL_DECIMALS),
            ValueClass::Text | ValueClass::Empty => (
                FieldType::Character,
                max_width.clamp(1, MAX_CHAR_WIDTH) as u8,
                0,
            ),
        };

        fields.push(FieldDescriptor {
            name,
            source_key: key,
            field_type,
            length,
            decimals,
        });
    }

    Ok(fields)
}

fn display_width(value: &AttributeValue) -> usize {
    match value {
        AttributeValue::Null => 0,
        AttributeValue::Text(s) => s.len(),
        other => other.to_string().len(),
    }
}

/// Maps an attribute key to a dBase field name, unique case-insensitively
fn unique_field_name(key: &str, used: &[String]) -> String {
    let mut base: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .take(MAX_NAME_LEN)
        .collect();
    if base.is_empty() {
        base = "FIELD".to_string();
    }

    if !used.contains(&base.to_ascii_lowercase()) {
        return base;
    }

    let mut n = 1usize;
    loop {
        let suffix = format!("_{n}");
        let keep = MAX_NAME_LEN.saturating_sub(suffix.len()).min(base.len());
        let candidate = format!("{}{}", &base[..keep], suffix);
        if !used.contains(&candidate.to_ascii_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

/// Encodes the attribute table for `features`
pub fn encode(
    fields: &[FieldDescriptor],
    features: &[Feature],
    date: NaiveDate,
) -> Result<Vec<u8>, ShapefileError> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + fields.iter().map(|f| f.length as usize).sum::<usize>();
    let record_count =
        u32::try_from(features.len()).map_err(|_| ShapefileError::FileTooLarge)?;

    let mut out = Vec::with_capacity(header_len + record_len * features.len() + 1);
    out.push(VERSION);
    out.push((date.year() - 1900).clamp(0, 255) as u8);
    out.push(date.month() as u8);
    out.push(date.day() as u8);
    out.extend_from_slice(&record_count.to_le_bytes());
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(
        &u16::try_from(record_len)
            .map_err(|_| ShapefileError::FileTooLarge)?
            .to_le_bytes(),
    );
    out.extend_from_slice(&[0u8; 20]);

    for field in fields {
        let mut name = [0u8; 11];
        name[..field.name.len()].copy_from_slice(field.name.as_bytes());
        out.extend_from_slice(&name);
        out.push(field.field_type.code());
        out.extend_from_slice(&[0u8; 4]);
        out.push(field.length);
        out.push(field.decimals);
        out.extend_from_slice(&[0u8; 14]);
    }
    out.push(HEADER_TERMINATOR);

    for (index, feature) in features.iter().enumerate() {
        out.push(RECORD_ACTIVE);
        for field in fields {
            let value = if field.source_key.is_empty() {
                AttributeValue::Integer(index as i64 + 1)
            } else {
                feature
                    .attribute(&field.source_key)
                    .cloned()
                    .unwrap_or(AttributeValue::Null)
            };
            out.extend_from_slice(&format_value(field, &value)?);
        }
    }
    out.push(END_OF_FILE);

    Ok(out)
}

fn format_value(field: &FieldDescriptor, value: &AttributeValue) -> Result<Vec<u8>, ShapefileError> {
    let width = field.length as usize;

    let text = match (field.field_type, value) {
        (_, AttributeValue::Null) if field.field_type == FieldType::Logical => "?".to_string(),
        (_, AttributeValue::Null) => String::new(),
        (FieldType::Logical, AttributeValue::Boolean(b)) => (if *b { "T" } else { "F" }).to_string(),
        (FieldType::Numeric, AttributeValue::Integer(i)) if field.decimals == 0 => i.to_string(),
        (FieldType::Numeric, AttributeValue::Integer(i)) => format_real(field, *i as f64)?,
        (FieldType::Numeric, AttributeValue::Real(r)) if r.is_finite() => format_real(field, *r)?,
        (FieldType::Numeric, AttributeValue::Real(_)) => String::new(),
        (FieldType::Character, other) => {
            return Ok(pad_right(truncate_utf8(&other.to_string(), width), width))
        }
        (_, other) => {
            return Err(ShapefileError::ValueOverflow {
                field: field.name.clone(),
                value: other.to_string(),
            })
        }
    };

    if text.len() > width {
        return Err(ShapefileError::ValueOverflow {
            field: field.name.clone(),
            value: text,
        });
    }

    Ok(match field.field_type {
        FieldType::Numeric => pad_left(&text, width),
        _ => pad_right(&text, width),
    })
}

/// Formats a real number, dropping decimals until it fits the field width
///
/// Magnitudes too large for fixed notation fall back to exponent notation.
fn format_real(field: &FieldDescriptor, value: f64) -> Result<String, ShapefileError> {
    let width = field.length as usize;
    for decimals in (0..=field.decimals as usize).rev() {
        let text = format!("{value:.decimals$}");
        if text.len() <= width {
            return Ok(text);
        }
    }
    for digits in (0..width).rev() {
        let text = format!("{value:.digits$e}");
        if text.len() <= width {
            return Ok(text);
        }
    }
    Err(ShapefileError::ValueOverflow {
        field: field.name.clone(),
        value: value.to_string(),
    })
}

fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn pad_left(text: &str, width: usize) -> Vec<u8> {
    let mut out = vec![b' '; width - text.len()];
    out.extend_from_slice(text.as_bytes());
    out
}

fn pad_right(text: &str, width: usize) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    out.resize(width, b' ');
    out
}

/// Decoded attribute table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub fields: Vec<FieldDescriptor>,
    pub records: Vec<Vec<(String, AttributeValue)>>,
}

/// Decodes a `.dbf` file; deleted records are skipped
pub fn decode(bytes: &[u8]) -> Result<Table, ShapefileError> {
    if bytes.len() < 32 {
        return Err(ShapefileError::Malformed("dbf shorter than header".to_string()));
    }

    let record_count = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let record_len = u16::from_le_bytes([bytes[10], bytes[11]]) as usize;

    let mut fields = Vec::new();
    let mut pos = 32;
    while pos + 32 <= header_len && bytes.get(pos) != Some(&HEADER_TERMINATOR) {
        let descriptor = bytes
            .get(pos..pos + 32)
            .ok_or_else(|| ShapefileError::Malformed("truncated field descriptor".to_string()))?;
        let name_end = descriptor[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&descriptor[..name_end]).into_owned();
        fields.push(FieldDescriptor {
            source_key: name.clone(),
            name,
            field_type: FieldType::from_code(descriptor[11]),
            length: descriptor[16],
            decimals: descriptor[17],
        });
        pos += 32;
    }

    let mut records = Vec::with_capacity(record_count);
    for index in 0..record_count {
        let start = header_len + index * record_len;
        let record = bytes
            .get(start..start + record_len)
            .ok_or_else(|| ShapefileError::Malformed("truncated record".to_string()))?;
        if record[0] == RECORD_DELETED {
            continue;
        }

        let mut offset = 1;
        let mut values = Vec::with_capacity(fields.len());
        for field in &fields {
            let raw = record
                .get(offset..offset + field.length as usize)
                .ok_or_else(|| ShapefileError::Malformed("record shorter than fields".to_string()))?;
            values.push((field.name.clone(), parse_value(field, raw)));
            offset += field.length as usize;
        }
        records.push(values);
    }

    Ok(Table { fields, records })
}

fn parse_value(field: &FieldDescriptor, raw: &[u8]) -> AttributeValue {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();

    match field.field_type {
        FieldType::Character => {
            let value = text.trim_end();
            if value.is_empty() {
                AttributeValue::Null
            } else {
                AttributeValue::Text(value.to_string())
            }
        }
        FieldType::Logical => match trimmed {
            "T" | "t" | "Y" | "y" => AttributeValue::Boolean(true),
            "F" | "f" | "N" | "n" => AttributeValue::Boolean(false),
            _ => AttributeValue::Null,
        },
        FieldType::Numeric => {
            if trimmed.is_empty() || trimmed.starts_with('*') {
                AttributeValue::Null
            } else if field.decimals == 0 {
                trimmed
                    .parse::<i64>()
                    .map(AttributeValue::Integer)
                    .unwrap_or(AttributeValue::Null)
            } else {
                trimmed
                    .parse::<f64>()
                    .map(AttributeValue::Real)
                    .unwrap_or(AttributeValue::Null)
            }
        }
    }
}
