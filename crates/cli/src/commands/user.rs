//! User registration and sign-in.
//!
//! # Usage
//!
//! ```bash
//! cadastro user register --name "Maria Souza" --username maria --password s3nha
//! cadastro user login --username admin --password 123456
//! ```

use cadastro_core::{Notice, Registry};
use secrecy::{ExposeSecret, SecretString};

use super::Outcome;
use crate::error::CliError;

/// Register a user who can sign in.
///
/// # Errors
///
/// Returns `CliError::Service` for blank fields or a taken username.
pub fn register(
    registry: &mut Registry,
    name: &str,
    username: &str,
    password: &SecretString,
) -> Result<Outcome, CliError> {
    let id = registry.register_user(name, username, password.expose_secret())?;
    Ok(Outcome::changed(Notice::success(format!(
        "User {} registered (id {id})",
        username.trim()
    ))))
}

/// Check a username and password pair.
///
/// # Errors
///
/// Returns `CliError::InvalidCredentials` when no user matches.
pub fn login(
    registry: &Registry,
    username: &str,
    password: &SecretString,
) -> Result<Outcome, CliError> {
    let user = registry
        .login(username, password.expose_secret())
        .ok_or(CliError::InvalidCredentials)?;
    Ok(Outcome::unchanged(Notice::success(format!(
        "Welcome, {}",
        user.name
    ))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_owned())
    }

    #[test]
    fn test_register_then_login() {
        let mut registry = Registry::new();
        let outcome = register(&mut registry, "Maria", "maria", &secret("s3nha")).unwrap();
        assert!(outcome.mutated);

        let outcome = login(&registry, "maria", &secret("s3nha")).unwrap();
        assert!(!outcome.mutated);
        assert_eq!(outcome.notice.unwrap().message, "Welcome, Maria");
    }

    #[test]
    fn test_wrong_password() {
        let registry = Registry::with_seed_data().unwrap();
        assert!(matches!(
            login(&registry, "admin", &secret("654321")),
            Err(CliError::InvalidCredentials)
        ));
    }
}
