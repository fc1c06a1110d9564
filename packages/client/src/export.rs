//! CSV and JSON export of whatever a list screen currently shows.
//!
//! Records are first flattened to JSON objects by [`format_records`], which
//! drops caller-named fields (avatars and other binary blobs) and rewrites
//! ISO-8601 timestamps as plain dates. [`to_csv`] and [`to_json`] render
//! those objects; neither touches the network.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::{ClientError, Result};
use crate::models::{Article, ContentItem, Lawyer, Policy, Transaction, User};
use crate::resource::{fetch_visible, ListQuery, ListSource, ResourceKind};

/// Fields dropped from every export unless the caller says otherwise.
pub const DEFAULT_STRIPPED_FIELDS: &[&str] = &["avatar"];

/// Date format used in exported files.
pub const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn render(self, records: &[Value]) -> Result<String> {
        match self {
            ExportFormat::Csv => to_csv(records),
            ExportFormat::Json => to_json(records),
        }
    }
}

/// `users` + csv on 2026-10-17 gives `users-2026-10-17.csv`.
pub fn export_file_name(base: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!("{base}-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Calendar date of an ISO-8601 timestamp, with or without time or offset.
fn iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn normalize_date(value: Value) -> Value {
    match value {
        Value::String(s) => match iso_date(&s) {
            Some(date) => Value::String(date.format(EXPORT_DATE_FORMAT).to_string()),
            None => Value::String(s),
        },
        other => other,
    }
}

/// Serialize `records` to JSON objects, dropping `strip` fields and
/// rewriting top-level timestamps as dates.
pub fn format_records<T: Serialize>(records: &[T], strip: &[&str]) -> Result<Vec<Value>> {
    records
        .iter()
        .map(|record| {
            let value = serde_json::to_value(record)?;
            Ok(match value {
                Value::Object(map) => Value::Object(
                    map.into_iter()
                        .filter(|(key, _)| !strip.contains(&key.as_str()))
                        .map(|(key, value)| (key, normalize_date(value)))
                        .collect::<Map<String, Value>>(),
                ),
                other => normalize_date(other),
            })
        })
        .collect()
}

fn cell(value: Option<&Value>) -> Result<String> {
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => serde_json::to_string(nested)?,
    })
}

/// Render records as CSV.
///
/// The header is the key set of the first record, in field order. Cells
/// containing a comma, quote or line break are quoted, with inner quotes
/// doubled. Nested values are written as JSON text. Nulls are empty cells,
/// except in a one-column export where an empty cell is written as `""` so
/// the row is not read back as a blank line.
pub fn to_csv(records: &[Value]) -> Result<String> {
    let Some(first) = records.first() else {
        return Ok(String::new());
    };
    let Value::Object(first) = first else {
        return Err(ClientError::Validation(
            "CSV export needs records with named fields".into(),
        ));
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers.iter().map(|h| h.as_str()))?;

    for record in records {
        let row = headers
            .iter()
            .map(|key| cell(record.get(key.as_str())))
            .collect::<Result<Vec<String>>>()?;
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ClientError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ClientError::Validation(e.to_string()))
}

/// Render records as a pretty-printed JSON array.
pub fn to_json<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write an export next to other downloads. Returns the written path.
pub fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", dir.display()),
        )));
    }
    let path = dir.join(file_name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Fetch the rows a `kind` screen shows for `query` and format them for
/// export.
pub async fn snapshot<S>(
    source: &S,
    kind: ResourceKind,
    query: ListQuery,
    strip: &[&str],
) -> Result<Vec<Value>>
where
    S: ListSource<User>
        + ListSource<Lawyer>
        + ListSource<Transaction>
        + ListSource<ContentItem>
        + ListSource<Policy>
        + ListSource<Article>,
{
    match kind {
        ResourceKind::Users => format_records(&fetch_visible::<User, _>(source, query).await?, strip),
        ResourceKind::Lawyers => {
            format_records(&fetch_visible::<Lawyer, _>(source, query).await?, strip)
        }
        ResourceKind::Transactions => {
            format_records(&fetch_visible::<Transaction, _>(source, query).await?, strip)
        }
        ResourceKind::Content => {
            format_records(&fetch_visible::<ContentItem, _>(source, query).await?, strip)
        }
        ResourceKind::Policies => {
            format_records(&fetch_visible::<Policy, _>(source, query).await?, strip)
        }
        ResourceKind::Articles => {
            format_records(&fetch_visible::<Article, _>(source, query).await?, strip)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_csv_quotes_commas() {
        let csv = to_csv(&[json!({ "a": "x,y", "b": 1 })]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["a,b", "\"x,y\",1"]);
    }

    #[test]
    fn test_csv_doubles_quotes_and_keeps_newlines_inside_cell() {
        let csv = to_csv(&[json!({ "note": "said \"hi\"", "body": "line1\nline2" })]).unwrap();
        assert_eq!(csv, "note,body\n\"said \"\"hi\"\"\",\"line1\nline2\"\n");
    }

    #[test]
    fn test_csv_header_comes_from_first_record() {
        let records = vec![
            json!({ "id": 1, "name": "Ada" }),
            json!({ "id": 2, "name": "Bo", "extra": true }),
            json!({ "id": 3 }),
        ];
        let csv = to_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["id,name", "1,Ada", "2,Bo", "3,"]);
    }

    #[test]
    fn test_csv_embeds_nested_values_as_json() {
        let csv = to_csv(&[json!({ "id": "a1", "stats": { "views": 3 }, "tags": ["x", "y"] })])
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,stats,tags");
        assert_eq!(lines[1], "a1,\"{\"\"views\"\":3}\",\"[\"\"x\"\",\"\"y\"\"]\"");
    }

    #[test]
    fn test_csv_of_nothing_is_empty() {
        assert_eq!(to_csv(&[]).unwrap(), "");
        assert!(to_csv(&[json!(1)]).is_err());
    }

    #[test]
    fn test_format_strips_fields_and_normalizes_dates() {
        let records = vec![json!({
            "id": "u1",
            "avatar": "data:image/png;base64,AAAA",
            "registeredOn": "2024-03-05T14:30:00Z",
            "note": "not a date"
        })];
        let formatted = format_records(&records, DEFAULT_STRIPPED_FIELDS).unwrap();
        assert_eq!(
            formatted,
            vec![json!({
                "id": "u1",
                "registeredOn": "03/05/2024",
                "note": "not a date"
            })]
        );
    }

    #[test]
    fn test_dates_without_offset_are_normalized() {
        let records = vec![json!({
            "day": "2024-03-05",
            "local": "2024-03-05T14:30:00",
            "fraction": "2024-03-05T14:30:00.250",
            "range": "2024-03-05 to 2024-03-09"
        })];
        let formatted = format_records(&records, &[]).unwrap();
        assert_eq!(
            formatted,
            vec![json!({
                "day": "03/05/2024",
                "local": "03/05/2024",
                "fraction": "03/05/2024",
                "range": "2024-03-05 to 2024-03-09"
            })]
        );
    }

    #[test]
    fn test_csv_null_cells() {
        let wide = vec![json!({ "a": null, "b": "x" })];
        assert_eq!(to_csv(&wide).unwrap(), "a,b\n,x\n");

        let single = vec![json!({ "a": null }), json!({ "a": "x" })];
        assert_eq!(to_csv(&single).unwrap(), "a\n\"\"\nx\n");
    }

    #[test]
    fn test_json_round_trips_formatted_records() {
        let records = vec![
            json!({ "id": 1, "tags": ["a"], "date": "2025-01-01T00:00:00+00:00" }),
            json!({ "id": 2, "tags": [], "date": null }),
        ];
        let formatted = format_records(&records, &[]).unwrap();
        let text = to_json(&formatted).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, formatted);
        assert!(text.contains("\n  "));
    }

    #[test]
    fn test_file_name_and_format_names() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(
            export_file_name("users", ExportFormat::Csv, date),
            "users-2026-10-17.csv"
        );
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::Json.content_type(), "application/json");
    }

    #[test]
    fn test_write_export_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), "a.csv", "a\n1\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a\n1\n");

        let missing = dir.path().join("missing");
        assert!(write_export(&missing, "a.csv", "").is_err());
    }
}
