//! Role extraction from verified token claims.

use std::collections::HashSet;

use crate::security::token::{ClaimValue, Claims};
use crate::security::types::Role;

/// Maps the `scope` claim of a verified token to the principal's role set.
///
/// The scope claim carries a space-separated list of role names. A missing
/// scope, an empty string, or runs of extra whitespace all map cleanly: this
/// function is total over verified claims and never fails.
pub fn roles_of(claims: &Claims) -> HashSet<Role> {
    match &claims.scope {
        ClaimValue::Absent => HashSet::new(),
        ClaimValue::Text(scope) => scope.split_whitespace().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::types::{ROLE_ADMIN, ROLE_CUSTOMER};

    fn claims_with_scope(scope: ClaimValue) -> Claims {
        Claims {
            sub: "admin".to_string(),
            scope,
            iat: 0,
            exp: 3600,
        }
    }

    #[test]
    fn splits_scope_on_whitespace() {
        let claims =
            claims_with_scope(ClaimValue::Text("ROLE_ADMIN ROLE_CUSTOMER".to_string()));
        let roles = roles_of(&claims);
        assert_eq!(roles.len(), 2);
        assert!(roles.contains(ROLE_ADMIN));
        assert!(roles.contains(ROLE_CUSTOMER));
    }

    #[test]
    fn empty_scope_yields_no_roles() {
        let claims = claims_with_scope(ClaimValue::Text(String::new()));
        assert!(roles_of(&claims).is_empty());
    }

    #[test]
    fn extra_whitespace_is_ignored() {
        let claims = claims_with_scope(ClaimValue::Text("  ROLE_ADMIN   ".to_string()));
        let roles = roles_of(&claims);
        assert_eq!(roles.len(), 1);
        assert!(roles.contains(ROLE_ADMIN));
    }

    #[test]
    fn missing_scope_yields_no_roles() {
        let claims = claims_with_scope(ClaimValue::Absent);
        assert!(roles_of(&claims).is_empty());
    }

    #[test]
    fn scope_absent_in_payload_deserializes_to_no_roles() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"admin","iat":0,"exp":3600}"#).unwrap();
        assert!(roles_of(&claims).is_empty());
    }
}
