use crate::db::models::DbUser;
use serde::Serialize;

pub const ROLE_CLAIM_TYPE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
pub const NAME_IDENTIFIER_CLAIM_TYPE: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
pub const NAME_CLAIM_TYPE: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
pub const EMAIL_CLAIM_TYPE: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";

pub const STRING_VALUE_TYPE: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const LOCAL_AUTHORITY: &str = "LOCAL AUTHORITY";

/// A single assertion about the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub issuer: String,
    pub original_issuer: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    pub value_type: String,
}

impl Claim {
    /// String-valued claim issued by this server.
    pub fn local(claim_type: &str, value: impl Into<String>) -> Self {
        Self {
            issuer: LOCAL_AUTHORITY.to_string(),
            original_issuer: LOCAL_AUTHORITY.to_string(),
            claim_type: claim_type.to_string(),
            value: value.into(),
            value_type: STRING_VALUE_TYPE.to_string(),
        }
    }
}

/// The authenticated caller, rebuilt from the session on every request.
#[derive(Debug, Clone)]
pub struct ClaimsPrincipal {
    pub user_id: String,
    pub email: String,
    pub email_confirmed: bool,
    pub session_id: String,
    claims: Vec<Claim>,
}

impl ClaimsPrincipal {
    pub fn new(user: &DbUser, session_id: impl Into<String>, roles: &[String]) -> Self {
        let mut claims = vec![
            Claim::local(NAME_IDENTIFIER_CLAIM_TYPE, user.id.clone()),
            Claim::local(NAME_CLAIM_TYPE, user.email.clone()),
            Claim::local(EMAIL_CLAIM_TYPE, user.email.clone()),
        ];
        claims.extend(roles.iter().map(|r| Claim::local(ROLE_CLAIM_TYPE, r.clone())));

        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            email_confirmed: user.email_confirmed,
            session_id: session_id.into(),
            claims,
        }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn find_all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a Claim> + 'a {
        self.claims.iter().filter(move |c| c.claim_type == claim_type)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Claim> {
        self.find_all(ROLE_CLAIM_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> DbUser {
        DbUser {
            id: "u-1".to_string(),
            email: "leela@contoso.com".to_string(),
            normalized_email: "LEELA@CONTOSO.COM".to_string(),
            password_hash: String::new(),
            email_confirmed: true,
            security_stamp: "S".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_claims_are_filtered_by_type() {
        let roles = vec!["Admin".to_string(), "User".to_string()];
        let principal = ClaimsPrincipal::new(&user(), "s-1", &roles);

        assert_eq!(principal.claims().len(), 5);
        let values: Vec<&str> = principal.roles().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["Admin", "User"]);
    }

    #[test]
    fn claim_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(Claim::local(ROLE_CLAIM_TYPE, "Admin")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "issuer": "LOCAL AUTHORITY",
                "originalIssuer": "LOCAL AUTHORITY",
                "type": ROLE_CLAIM_TYPE,
                "value": "Admin",
                "valueType": STRING_VALUE_TYPE,
            })
        );
    }
}
