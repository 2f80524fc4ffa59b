//! Contact form validation.
//!
//! There is no mail backend; a valid message is acknowledged and logged.

use organic_farm_core::{ContactError, ContactMessage};

/// Validate a submission and return the acknowledgement text.
///
/// # Errors
///
/// Returns [`ContactError`] for a blank field or malformed email.
pub fn submit(name: &str, email: &str, message: &str) -> Result<String, ContactError> {
    let contact = ContactMessage::parse(name, email, message)?;
    tracing::info!(
        email_domain = contact.email.domain(),
        length = contact.message.len(),
        "Contact message accepted"
    );
    Ok(contact.acknowledgement())
}
