//! Most of the structs in `web` module and their implementations live here.
//! Includes the request and response schemas, the validated email and its parsing tests.

use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

pub const SUBSCRIBE_SUCCESS_MSG: &str = "Successfully subscribed to NeuroNex updates!";

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable subscription request.
/// The email can still be invalid at this point.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// The body returned after a successful subscription.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscribeResponse {
    pub message: String,
    pub email: String,
}

impl SubscribeResponse {
    pub fn new(email: ValidEmail) -> Self {
        Self {
            message: SUBSCRIBE_SUCCESS_MSG.to_string(),
            email: email.into_inner(),
        }
    }
}

/// Validated and normalized subscriber email.
/// Normalized means trimmed and lowercased, two `ValidEmail`s are the same subscriber
/// if and only if their inner strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValidEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValidEmail {
    /// Longest address, in bytes, that fits an SMTP path.
    pub const MAX_LEN: usize = 254;
    /// Longest local part, in bytes.
    pub const MAX_LOCAL_LEN: usize = 64;

    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = normalize(value.as_ref());

        if value.is_empty() {
            return Err(DataParsingError::EmailEmpty);
        }

        if value.len() > Self::MAX_LEN {
            return Err(DataParsingError::EmailTooLong);
        }

        let (local, domain) = value
            .rsplit_once('@')
            .ok_or(DataParsingError::EmailInvalid)?;

        // Dot-atom: no leading, trailing or doubled dots. Non-ASCII letters are allowed (SMTPUTF8).
        if local.len() > Self::MAX_LOCAL_LEN
            || !regex_is_match!(
                r"^[\w!#$%&'*+/=?^`{|}~-]+(\.[\w!#$%&'*+/=?^`{|}~-]+)*$",
                local
            )
        {
            return Err(DataParsingError::EmailLocalPartInvalid);
        }

        // The local part is already checked, `validate_email` only judges the domain here.
        if !format!("user@{domain}").validate_email() {
            return Err(DataParsingError::EmailInvalid);
        }

        // `validate_email` accepts single label domains, IP literals and numeric TLDs.
        if !regex_is_match!(r"^[^.\[\]]+(\.[^.\[\]]+)+$", domain)
            || regex_is_match!(r"\.[0-9]+$", domain)
        {
            return Err(DataParsingError::EmailDomainInvalid);
        }

        Ok(ValidEmail(value))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Lowercases the address and strips the surrounding whitespace.
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("value is not a valid email address: the email is empty")]
    EmailEmpty,
    #[error("value is not a valid email address: the email is too long")]
    EmailTooLong,
    #[error("value is not a valid email address")]
    EmailInvalid,
    #[error("value is not a valid email address: the part before the @-sign is not valid")]
    EmailLocalPartInvalid,
    #[error("value is not a valid email address: the domain needs at least one dot and a non-numeric top level label")]
    EmailDomainInvalid,
}
