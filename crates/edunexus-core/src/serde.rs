use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Query-string uuid where an empty value means "no filter".
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Query-string boolean accepting `true/false/yes/no/1/0`; empty means absent.
pub fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => crate::forms::parse_flag(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean '{}'", s))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        course_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_flag")]
        approved: Option<bool>,
    }

    #[test]
    fn empty_values_are_none() {
        let f: Filter = serde_json::from_str(r#"{"course_id":"","approved":""}"#).unwrap();
        assert!(f.course_id.is_none());
        assert!(f.approved.is_none());
    }

    #[test]
    fn values_parse() {
        let f: Filter = serde_json::from_str(
            r#"{"course_id":"6f1c0d2e-8a55-4c1e-9b0a-3d2f4e5a6b7c","approved":"Yes"}"#,
        )
        .unwrap();
        assert!(f.course_id.is_some());
        assert_eq!(f.approved, Some(true));
    }

    #[test]
    fn bad_flag_is_rejected() {
        assert!(serde_json::from_str::<Filter>(r#"{"approved":"perhaps"}"#).is_err());
    }
}
