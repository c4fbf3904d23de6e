//! Request mapping from untyped payloads to typed repository inputs.
//!
//! # Responsibility
//! - Coerce JSON bodies and query strings into drafts, patches and queries.
//! - Reject malformed input before it reaches persistence.
//!
//! # Invariants
//! - Each endpoint recognizes a fixed set of fields; unknown fields are
//!   ignored.
//! - Flags accept `true|false`, `0|1` (number or string) and nothing else.
//! - `page`/`size` default to 1 and 10 and must be positive integers.

use crate::model::project::{NewProject, ProjectPatch};
use crate::model::software::{NewSoftware, SoftwarePatch};
use crate::model::validate_date;
use crate::repo::project_repo::{ProjectFilter, ProjectListQuery};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;
const PAGINATION_ERROR: &str = "Invalid page or size parameter. Must be positive integers.";

pub type MapResult<T> = Result<T, MapError>;

/// Input rejected by the mapper. Always surfaces as an invalid argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapError(pub String);

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for MapError {}

/// Natural keys naming one project/software link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRequest {
    pub code: String,
    pub software_name: String,
    pub version: String,
}

/// Maps a `POST /projects` body. Recognized: `code`, `archived`,
/// `start_date`, `end_date`.
pub fn map_new_project(body: &Value) -> MapResult<NewProject> {
    let fields = body_object(body, "No data provided")?;
    Ok(NewProject {
        code: required_text(fields, "code")?,
        archived: optional_flag(fields, "archived")?.unwrap_or(false),
        start_date: optional_text(fields, "start_date")?,
        end_date: optional_text(fields, "end_date")?,
    })
}

/// Maps a `PUT /projects/{code}` body.
pub fn map_project_patch(body: &Value) -> MapResult<ProjectPatch> {
    let fields = body_object(body, "Request body is required")?;
    let patch = ProjectPatch {
        archived: optional_flag(fields, "archived")?,
        start_date: nullable_text(fields, "start_date")?,
        end_date: nullable_text(fields, "end_date")?,
    };
    if patch.is_empty() {
        return Err(MapError("No valid fields to update".to_string()));
    }
    Ok(patch)
}

/// Maps `GET /projects` query parameters.
///
/// Empty values are treated as absent, matching how browsers submit blank
/// form fields.
pub fn map_project_list(params: &HashMap<String, String>) -> MapResult<ProjectListQuery> {
    let param = |name: &str| {
        params
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    };

    let archived = match param("archived") {
        Some(raw) => Some(flag_from_text("archived", raw)?),
        None => None,
    };
    let start_date = param("start_date").map(str::to_string);
    if let Some(value) = start_date.as_deref() {
        validate_date("start_date", value).map_err(|err| MapError(err.to_string()))?;
    }
    let end_date = param("end_date").map(str::to_string);
    if let Some(value) = end_date.as_deref() {
        validate_date("end_date", value).map_err(|err| MapError(err.to_string()))?;
    }

    Ok(ProjectListQuery {
        filter: ProjectFilter {
            code: params
                .get("code")
                .filter(|value| !value.is_empty())
                .cloned(),
            archived,
            start_date,
            end_date,
        },
        page: positive_param(param("page"), DEFAULT_PAGE)?,
        size: positive_param(param("size"), DEFAULT_PAGE_SIZE)?,
    })
}

/// Maps a `POST /software` body. Recognized: `name`, `version`, `vendor`,
/// `deprecated`.
pub fn map_new_software(body: &Value) -> MapResult<NewSoftware> {
    let fields = body_object(body, "No data provided")?;
    Ok(NewSoftware {
        name: required_text(fields, "name")?,
        version: required_text(fields, "version")?,
        vendor: optional_text(fields, "vendor")?,
        deprecated: optional_flag(fields, "deprecated")?.unwrap_or(false),
    })
}

/// Maps a `PUT /software/{name}/{version}` body.
pub fn map_software_patch(body: &Value) -> MapResult<SoftwarePatch> {
    let fields = body_object(body, "Request body is required")?;
    let patch = SoftwarePatch {
        vendor: nullable_text(fields, "vendor")?,
        deprecated: optional_flag(fields, "deprecated")?,
    };
    if patch.is_empty() {
        return Err(MapError("No valid fields to update".to_string()));
    }
    Ok(patch)
}

/// Maps a `POST /projects/software` body.
pub fn map_association(body: &Value) -> MapResult<AssociationRequest> {
    let fields = body_object(body, "No data provided")?;
    Ok(AssociationRequest {
        code: required_text(fields, "code")?,
        software_name: required_text(fields, "software_name")?,
        version: required_text(fields, "version")?,
    })
}

fn body_object<'a>(body: &'a Value, empty_message: &str) -> MapResult<&'a Map<String, Value>> {
    match body {
        Value::Object(fields) if !fields.is_empty() => Ok(fields),
        Value::Object(_) | Value::Null => Err(MapError(empty_message.to_string())),
        _ => Err(MapError("Request body must be a JSON object".to_string())),
    }
}

fn required_text(fields: &Map<String, Value>, name: &str) -> MapResult<String> {
    match fields.get(name) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(MapError(format!("{name} is required")))
        }
        Some(_) => Err(MapError(format!("{name} must be a string"))),
    }
}

fn optional_text(fields: &Map<String, Value>, name: &str) -> MapResult<Option<String>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(MapError(format!("{name} must be a string"))),
    }
}

/// Absent -> `None`, `null` -> `Some(None)` (clear), string -> `Some(Some)`.
fn nullable_text(fields: &Map<String, Value>, name: &str) -> MapResult<Option<Option<String>>> {
    match fields.get(name) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(text)) => Ok(Some(Some(text.clone()))),
        Some(_) => Err(MapError(format!("{name} must be a string or null"))),
    }
}

fn optional_flag(fields: &Map<String, Value>, name: &str) -> MapResult<Option<bool>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(flag_error(name)),
        },
        Some(Value::String(text)) => flag_from_text(name, text).map(Some),
        Some(_) => Err(flag_error(name)),
    }
}

fn flag_from_text(name: &str, text: &str) -> MapResult<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(flag_error(name)),
    }
}

fn flag_error(name: &str) -> MapError {
    MapError(format!("{name} must be 0, 1, true or false"))
}

fn positive_param(raw: Option<&str>, default: u32) -> MapResult<u32> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(MapError(PAGINATION_ERROR.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn new_project_requires_code_and_defaults_archived() {
        let draft = map_new_project(&json!({"code": "P1"})).unwrap();
        assert_eq!(draft.code, "P1");
        assert!(!draft.archived);

        let err = map_new_project(&json!({"archived": 1})).unwrap_err();
        assert_eq!(err.0, "code is required");

        let err = map_new_project(&json!({"code": 42})).unwrap_err();
        assert_eq!(err.0, "code must be a string");
    }

    #[test]
    fn empty_or_missing_body_is_rejected() {
        assert_eq!(
            map_new_project(&json!({})).unwrap_err().0,
            "No data provided"
        );
        assert_eq!(
            map_new_software(&Value::Null).unwrap_err().0,
            "No data provided"
        );
        assert_eq!(
            map_association(&json!(["P1"])).unwrap_err().0,
            "Request body must be a JSON object"
        );
    }

    #[test]
    fn flags_coerce_from_numbers_booleans_and_strings() {
        for (raw, expected) in [
            (json!(1), true),
            (json!(0), false),
            (json!(true), true),
            (json!("1"), true),
            (json!("False"), false),
        ] {
            let draft = map_new_project(&json!({"code": "P", "archived": raw})).unwrap();
            assert_eq!(draft.archived, expected);
        }

        for raw in [json!(2), json!("yes"), json!(0.5), json!([1])] {
            assert!(map_new_project(&json!({"code": "P", "archived": raw})).is_err());
        }
    }

    #[test]
    fn project_patch_ignores_unknown_fields_but_rejects_empty_set() {
        let patch = map_project_patch(&json!({"archived": 1, "owner": "x"})).unwrap();
        assert_eq!(patch.archived, Some(true));
        assert_eq!(patch.start_date, None);
        assert_eq!(patch.end_date, None);

        let err = map_project_patch(&json!({"owner": "x"})).unwrap_err();
        assert_eq!(err.0, "No valid fields to update");
        assert!(map_project_patch(&json!({})).is_err());
    }

    #[test]
    fn project_patch_null_date_clears() {
        let patch = map_project_patch(&json!({"end_date": null})).unwrap();
        assert_eq!(patch.end_date, Some(None));
    }

    #[test]
    fn software_patch_recognizes_vendor_and_deprecated_only() {
        let patch = map_software_patch(&json!({"deprecated": "1", "version": "9"})).unwrap();
        assert_eq!(patch.deprecated, Some(true));
        assert_eq!(patch.vendor, None);

        assert!(map_software_patch(&json!({"name": "other"})).is_err());
    }

    #[test]
    fn list_defaults_page_and_size() {
        let list = map_project_list(&HashMap::new()).unwrap();
        assert_eq!(list.page, 1);
        assert_eq!(list.size, 10);
        assert_eq!(list.filter, ProjectFilter::default());
    }

    #[test]
    fn list_rejects_non_positive_or_non_numeric_pagination() {
        for pairs in [
            [("page", "0")],
            [("size", "0")],
            [("page", "-1")],
            [("size", "ten")],
        ] {
            let err = map_project_list(&query(&pairs)).unwrap_err();
            assert_eq!(err.0, PAGINATION_ERROR);
        }
    }

    #[test]
    fn list_maps_filters_and_skips_blank_values() {
        let list = map_project_list(&query(&[
            ("code", "P"),
            ("archived", "0"),
            ("start_date", "2024-01-01"),
            ("end_date", ""),
            ("page", "2"),
            ("size", "5"),
        ]))
        .unwrap();
        assert_eq!(list.filter.code.as_deref(), Some("P"));
        assert_eq!(list.filter.archived, Some(false));
        assert_eq!(list.filter.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(list.filter.end_date, None);
        assert_eq!((list.page, list.size), (2, 5));
    }

    #[test]
    fn list_rejects_malformed_date_bounds() {
        let err = map_project_list(&query(&[("start_date", "01/01/2024")])).unwrap_err();
        assert!(err.0.contains("start_date"));
    }

    #[test]
    fn association_requires_all_three_keys() {
        let request = map_association(&json!({
            "code": "P1",
            "software_name": "S1",
            "version": "1.0"
        }))
        .unwrap();
        assert_eq!(request.software_name, "S1");

        let err = map_association(&json!({"code": "P1", "version": "1.0"})).unwrap_err();
        assert_eq!(err.0, "software_name is required");
    }
}
