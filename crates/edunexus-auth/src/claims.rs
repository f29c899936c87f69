//! JWT claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::roles::Role;

/// JWT claims for access tokens.
///
/// - `sub`: id of the user, centre or student row
/// - `role`: which table `sub` points into
/// - `login`: email, centre login id or enrollment number used to sign in
/// - `centre_code`: set for centre tokens so centre-scoped queries need no lookup
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Subject id
    pub sub: String,
    pub role: Role,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centre_code: Option<String>,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn subject_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip_shape() {
        let claims = Claims {
            sub: Uuid::nil().to_string(),
            role: Role::Center,
            login: "CTR98761234".to_string(),
            centre_code: Some("CEN-0001".to_string()),
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""role":"center""#));
        assert!(serialized.contains(r#""centre_code":"CEN-0001""#));
    }

    #[test]
    fn test_claims_without_centre_code() {
        let json = r#"{"sub":"not-a-uuid","role":"student","login":"EN1","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role, Role::Student);
        assert!(claims.centre_code.is_none());
        assert!(claims.subject_id().is_none());
        assert!(claims.has_role(&[Role::Admin, Role::Student]));
        assert!(!claims.has_role(&[Role::Admin]));
    }
}
