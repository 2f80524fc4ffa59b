//! Contact form submission.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};

/// Contact form field names, used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when validating a [`ContactMessage`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// A required field is blank.
    #[error("please fill all fields before submitting ({0} is empty)")]
    MissingField(ContactField),
    /// The email address is malformed.
    #[error("please provide a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

impl ContactMessage {
    /// Validate raw form input.
    ///
    /// All fields are checked for blankness before the email format, so a
    /// form with an empty message and a bad email reports the empty field.
    /// Name and message are trimmed; the email is validated as entered, so
    /// surrounding whitespace makes it invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingField`] for the first blank field, or
    /// [`ContactError::InvalidEmail`] if the email does not parse.
    pub fn parse(name: &str, email: &str, message: &str) -> Result<Self, ContactError> {
        let name = name.trim();
        let message = message.trim();

        for (field, value) in [
            (ContactField::Name, name),
            (ContactField::Email, email.trim()),
            (ContactField::Message, message),
        ] {
            if value.is_empty() {
                return Err(ContactError::MissingField(field));
            }
        }

        Ok(Self {
            name: name.to_owned(),
            email: Email::parse(email)?,
            message: message.to_owned(),
        })
    }

    /// Acknowledgement shown once the message is accepted.
    #[must_use]
    pub fn acknowledgement(&self) -> String {
        format!(
            "Thanks {}! Your message has been received (demo).",
            self.name
        )
    }
}
