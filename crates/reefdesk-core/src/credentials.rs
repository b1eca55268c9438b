// ── Credential handling ──
//
// Passwords are stored as salted SHA-256 digests in the form
// `sha256$<salt>$<hex>`. Unsalted 64-char hex digests written by older
// stores still verify.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::model::Email;

const SCHEME: &str = "sha256";
const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A stored password digest. Never holds the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    pub fn new(password: &SecretString) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password.expose_secret());
        Self(format!("{SCHEME}${salt}${digest}"))
    }

    /// Constant-shape comparison against a candidate password.
    pub fn verify(&self, password: &SecretString) -> bool {
        let candidate = password.expose_secret();
        match self.0.split('$').collect::<Vec<_>>().as_slice() {
            [SCHEME, salt, expected] => digest(salt, candidate) == *expected,
            [legacy] if legacy.len() == 64 => digest("", candidate) == *legacy,
            _ => false,
        }
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check `email` against the `local@domain.tld` shape.
pub fn validate_email(email: &Email) -> Result<()> {
    if EMAIL_RE.is_match(email.as_str()) {
        Ok(())
    } else {
        Err(CoreError::validation("email", "expected an address like name@example.com"))
    }
}

/// Password policy: at least 8 characters with an upper-case letter, a
/// lower-case letter and a digit. Surrounding whitespace is ignored.
pub fn validate_password(password: &SecretString) -> Result<()> {
    let trimmed = password.expose_secret().trim();
    let long_enough = trimmed.chars().count() >= MIN_PASSWORD_LEN;
    let upper = trimmed.chars().any(char::is_uppercase);
    let lower = trimmed.chars().any(char::is_lowercase);
    let digit = trimmed.chars().any(|c| c.is_ascii_digit());

    if long_enough && upper && lower && digit {
        Ok(())
    } else {
        Err(CoreError::validation(
            "password",
            "must be at least 8 characters and include an upper-case letter, a lower-case letter and a digit",
        ))
    }
}
