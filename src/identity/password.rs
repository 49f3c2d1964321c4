use crate::error::BackendError;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, SaltString};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const MIN_PASSWORD_LENGTH: usize = 6;

// Verified against when the user does not exist, so unknown accounts cost
// the same Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("dummy-Passw0rd!").unwrap_or_default());

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(phc)
}

/// Unparseable hashes never verify.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// `hash_password` on the blocking pool; Argon2 must not stall a runtime worker.
pub async fn hash_password_blocking(password: String) -> Result<String, BackendError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BackendError::PasswordHash(format!("hashing task failed: {e}")))?
}

/// Verify on the blocking pool. `None` (unknown user) checks against a dummy
/// hash and always fails.
pub async fn verify_password_blocking(
    hash: Option<String>,
    password: String,
) -> Result<bool, BackendError> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&hash, &password),
        None => {
            verify_password(&DUMMY_HASH, &password);
            false
        }
    })
    .await
    .map_err(|e| BackendError::PasswordHash(format!("verification task failed: {e}")))
}

/// Check the default password policy. Errors are keyed by identity error code.
pub fn validate_password(password: &str) -> Result<(), BackendError> {
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut fail = |code: &str, message: &str| {
        errors.insert(code.to_string(), vec![message.to_string()]);
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        fail(
            "PasswordTooShort",
            "Passwords must be at least 6 characters.",
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        fail(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9').",
        );
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        fail(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z').",
        );
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        fail(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z').",
        );
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        fail(
            "PasswordRequiresNonAlphanumeric",
            "Passwords must have at least one non alphanumeric character.",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BackendError::Validation(errors))
    }
}

/// Loose shape check: one `@` with something on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), BackendError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(BackendError::validation(
            "InvalidEmail",
            format!("Email '{email}' is invalid."),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(err: BackendError) -> Vec<String> {
        match err {
            BackendError::Validation(errors) => errors.into_keys().collect(),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Passw0rd!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "Passw0rd!"));
        assert!(!verify_password(&hash, "passw0rd!"));
        assert!(!verify_password("not-a-phc-string", "Passw0rd!"));
    }

    #[tokio::test]
    async fn blocking_wrappers_hash_and_verify() {
        let hash = hash_password_blocking("Passw0rd!".to_string()).await.unwrap();
        assert!(
            verify_password_blocking(Some(hash.clone()), "Passw0rd!".to_string())
                .await
                .unwrap()
        );
        assert!(
            !verify_password_blocking(Some(hash), "wrong".to_string())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn unknown_user_runs_dummy_verification_and_fails() {
        assert!(DUMMY_HASH.starts_with("$argon2"));
        assert!(
            !verify_password_blocking(None, "dummy-Passw0rd!".to_string())
                .await
                .unwrap()
        );
    }

    #[test]
    fn policy_reports_every_missing_class() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert_eq!(
            codes(validate_password("abc").unwrap_err()),
            vec![
                "PasswordRequiresDigit",
                "PasswordRequiresNonAlphanumeric",
                "PasswordRequiresUpper",
                "PasswordTooShort",
            ]
        );
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("leela@contoso.com").is_ok());
        for bad in ["", "leela", "@contoso.com", "leela@contoso", "a b@c.d", "a@b@c.d"] {
            assert_eq!(codes(validate_email(bad).unwrap_err()), vec!["InvalidEmail"]);
        }
    }
}
