use regex::Regex;

use crate::table::{SortDirection, SortField, SortSpec};

// Gateway timestamps are second-precision "YYYY-MM-DD HH:MM:SS" strings and
// the proxy rejects anything else, so the shape is checked before a request
// is ever built.
pub fn validate_timestamp(value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("timestamp is empty".to_string());
    }
    let re = match Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$") {
        Ok(re) => re,
        Err(e) => return Err(format!("failed to build timestamp pattern: {e}")),
    };
    if !re.is_match(trimmed) {
        return Err(format!(
            "invalid timestamp '{trimmed}', expected YYYY-MM-DD HH:MM:SS"
        ));
    }
    Ok(())
}

pub fn parse_sort_field(value: &str) -> Result<SortField, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "no" | "seq" | "sequence" => Ok(SortField::Sequence),
        "parameter" | "param" => Ok(SortField::Parameter),
        "uom" | "unit" => Ok(SortField::UnitOfMeasure),
        "reference" | "ref" => Ok(SortField::ReferenceValue),
        "existing" | "observed" | "obs" => Ok(SortField::ObservedValue),
        "gap" => Ok(SortField::Gap),
        other => Err(format!(
            "unknown sort field '{other}', expected one of: no, parameter, uom, reference, existing, gap"
        )),
    }
}

// Accepts "field" or "field:asc" / "field:desc".
pub fn parse_sort_spec(value: &str) -> Result<SortSpec, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("sort spec is empty".to_string());
    }
    let (field_raw, dir_raw) = match raw.split_once(':') {
        Some((f, d)) => (f, Some(d)),
        None => (raw, None),
    };
    let field = parse_sort_field(field_raw)?;
    let direction = match dir_raw {
        None => SortDirection::Ascending,
        Some(d) => match d.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => return Err(format!("invalid sort direction '{other}', expected asc or desc")),
        },
    };
    Ok(SortSpec { field, direction })
}

pub fn parse_positive_u32(value: &str, label: &str) -> Result<u32, String> {
    let parsed: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {label} '{value}'"))?;
    if parsed == 0 {
        return Err(format!("{label} must be positive"));
    }
    Ok(parsed)
}

pub fn parse_header_line(value: &str) -> Result<(String, String), String> {
    let raw = value.trim();
    let (key, val) = raw
        .split_once(':')
        .ok_or_else(|| "expected header format 'Key: Value'".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("header name cannot be empty".to_string());
    }
    Ok((key.to_string(), val.trim().to_string()))
}
