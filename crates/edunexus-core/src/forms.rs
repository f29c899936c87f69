//! Form payload normalization.
//!
//! Registration endpoints accept either `multipart/form-data` or a flat JSON
//! object. Multipart cannot carry real booleans, numbers or arrays, so every
//! value is held as a trimmed string and converted through the typed
//! accessors below. Keys are canonicalized to snake_case on insert, which
//! lets `centreName`, `centre_name` and `centre-name` address the same field.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut form = Self::new();
        for (k, v) in pairs {
            form.insert(k.as_ref(), v.as_ref());
        }
        form
    }

    /// Builds a form from a flat JSON object.
    ///
    /// Nested arrays and objects are kept as their JSON text so they read the
    /// same way a multipart client would send them.
    pub fn from_json(value: &Value) -> Result<Self, AppError> {
        let object = value
            .as_object()
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Expected a JSON object")))?;

        let mut form = Self::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => form.insert(key, s),
                Value::Bool(b) => form.insert(key, if *b { "true" } else { "false" }),
                Value::Number(n) => form.insert(key, n.to_string()),
                other => form.insert(key, other.to_string()),
            }
        }
        Ok(form)
    }

    pub fn insert(&mut self, key: &str, value: impl AsRef<str>) {
        self.fields
            .insert(canonical_key(key), value.as_ref().trim().to_string());
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(canonical_key(key), value.into());
    }

    /// Moves values from alternate names onto canonical ones.
    ///
    /// A canonical field that already holds a non-blank value wins over its alias.
    pub fn apply_aliases(&mut self, aliases: &[(&str, &str)]) {
        for (alias, canonical) in aliases {
            let alias = canonical_key(alias);
            let Some(value) = self.fields.remove(&alias) else {
                continue;
            };
            let canonical = canonical_key(canonical);
            let occupied = self
                .fields
                .get(&canonical)
                .is_some_and(|existing| !existing.is_empty());
            if !occupied {
                self.fields.insert(canonical, value);
            }
        }
    }

    /// Non-blank value for `key`. Blank strings read as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&canonical_key(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Numeric-as-string coercion. Unparseable values read as absent; rule
    /// tables report them.
    pub fn number<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse::<T>().ok())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.optional_flag(key).unwrap_or(false)
    }

    pub fn optional_flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(parse_flag)
    }

    /// `YYYY-MM-DD` date; anything unparseable is `None`.
    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        self.get(key).and_then(parse_date)
    }

    /// Enum value by its serialized name, tried verbatim and then in title case.
    pub fn choice<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(parse_choice)
    }

    /// Value mapped to title case (`male` -> `Male`, `in transit` -> `In Transit`).
    pub fn title_case(&self, key: &str) -> Option<String> {
        self.get(key).map(title_case)
    }
}

/// Converts `camelCase`, `kebab-case` and `Title Case` keys to snake_case.
pub fn canonical_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '.' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Parses boolean-like strings: `true/false`, `yes/no`, `1/0`, `on/off`, any case.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `YYYY-MM-DD`, also accepting an ISO datetime whose date part is valid.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = match value.find('T') {
        Some(10) => &value[..10],
        _ => value,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` read as midnight UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn parse_choice<T: DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(Value::String(value.trim().to_string()))
        .or_else(|_| serde_json::from_value(Value::String(title_case(value))))
        .ok()
}

pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_key_handles_common_shapes() {
        assert_eq!(canonical_key("centreName"), "centre_name");
        assert_eq!(canonical_key("centre_name"), "centre_name");
        assert_eq!(canonical_key("centre-name"), "centre_name");
        assert_eq!(canonical_key("PANNo"), "pan_no");
        assert_eq!(canonical_key("admitSubjects"), "admit_subjects");
        assert_eq!(canonical_key("pincode"), "pincode");
        assert_eq!(canonical_key("address2Line"), "address2_line");
    }

    #[test]
    fn insert_trims_values() {
        let form = FormData::from_pairs([("studentName", "  Asha Rao  ")]);
        assert_eq!(form.get("student_name"), Some("Asha Rao"));
    }

    #[test]
    fn blank_values_read_as_absent() {
        let form = FormData::from_pairs([("email", "   ")]);
        assert_eq!(form.get("email"), None);
        assert!(!form.contains("email"));
    }

    #[test]
    fn aliases_move_onto_canonical_names() {
        let mut form = FormData::from_pairs([("qualification", "B.Sc"), ("centerName", "Alpha")]);
        form.apply_aliases(&[("qualification", "education"), ("centerName", "centre_name")]);
        assert_eq!(form.get("education"), Some("B.Sc"));
        assert_eq!(form.get("centre_name"), Some("Alpha"));
        assert_eq!(form.get("qualification"), None);
    }

    #[test]
    fn canonical_value_wins_over_alias() {
        let mut form = FormData::from_pairs([("phone", "1111111111"), ("mobile", "9999999999")]);
        form.apply_aliases(&[("phone", "mobile")]);
        assert_eq!(form.get("mobile"), Some("9999999999"));
    }

    #[test]
    fn flags_parse_any_case() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn numbers_coerce_from_strings() {
        let form = FormData::from_pairs([("computerCount", "12"), ("fee", "1500.50"), ("bad", "x")]);
        assert_eq!(form.number::<i32>("computer_count"), Some(12));
        assert_eq!(form.number::<f64>("fee"), Some(1500.5));
        assert_eq!(form.number::<i32>("bad"), None);
    }

    #[test]
    fn dates_parse_or_become_absent() {
        let form = FormData::from_pairs([
            ("dob", "2001-02-28"),
            ("admissionDate", "2024-06-01T00:00:00.000Z"),
            ("renewalFrom", "31/12/2024"),
            ("leap", "2023-02-29"),
        ]);
        assert_eq!(form.date("dob"), NaiveDate::from_ymd_opt(2001, 2, 28));
        assert_eq!(form.date("admission_date"), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(form.date("renewal_from"), None);
        assert_eq!(form.date("leap"), None);
    }

    #[test]
    fn datetimes_accept_rfc3339_and_plain_dates() {
        let dt = parse_datetime("2025-04-01T09:30:00+05:30").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-04-01T04:00:00+00:00");
        let midnight = parse_datetime("2025-04-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-04-01T00:00:00+00:00");
        assert!(parse_datetime("tomorrow").is_none());
    }

    #[test]
    fn choices_match_case_insensitively() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        enum Status {
            Active,
            #[serde(rename = "In Transit")]
            InTransit,
        }
        assert_eq!(parse_choice::<Status>("Active"), Some(Status::Active));
        assert_eq!(parse_choice::<Status>("in transit"), Some(Status::InTransit));
        assert_eq!(parse_choice::<Status>("lost"), None);
    }

    #[test]
    fn title_case_normalizes_enum_values() {
        assert_eq!(title_case("male"), "Male");
        assert_eq!(title_case("FEMALE"), "Female");
        assert_eq!(title_case("in   transit"), "In Transit");
    }

    #[test]
    fn from_json_flattens_scalars_and_keeps_arrays_as_text() {
        let form = FormData::from_json(&json!({
            "studentName": "Ravi",
            "totalFee": 1200,
            "internet": true,
            "admitSubjects": [{"name": "Maths", "fullMarks": 100}],
            "email": null
        }))
        .unwrap();
        assert_eq!(form.get("student_name"), Some("Ravi"));
        assert_eq!(form.number::<f64>("total_fee"), Some(1200.0));
        assert!(form.flag("internet"));
        assert!(form.get("admit_subjects").unwrap().starts_with('['));
        assert!(!form.contains("email"));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(FormData::from_json(&json!([1, 2])).is_err());
    }
}
