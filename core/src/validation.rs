//! Request validation.
//!
//! The HTTP layer forwards requests as they arrive; the engine trims every
//! field, then rejects empty keys and malformed emails itself before touching
//! any store. Stores only ever see trimmed keys.

use crate::error::BookingError;
use crate::types::{BookTicketRequest, CancelTicketRequest, ModifySeatRequest};

/// Reject a blank field.
///
/// # Errors
///
/// Returns [`BookingError::Validation`] when `value` is empty or whitespace.
pub fn require(field: &str, value: &str) -> Result<(), BookingError> {
    if value.trim().is_empty() {
        return Err(BookingError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject a blank or malformed email.
///
/// # Errors
///
/// Returns [`BookingError::Validation`] when the email is missing or malformed.
pub fn require_email(value: &str) -> Result<(), BookingError> {
    require("email", value)?;
    if !is_valid_email(value) {
        return Err(BookingError::Validation(format!("{value} is not a valid email")));
    }
    Ok(())
}

/// Basic structural email check.
///
/// ```
/// use cinema_booking_core::validation::is_valid_email;
///
/// assert!(is_valid_email("ann@x.com"));
/// assert!(is_valid_email("user+tag@sub.example.com"));
/// assert!(!is_valid_email("ann"));
/// assert!(!is_valid_email("@x.com"));
/// assert!(!is_valid_email("ann@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local) && domain.chars().all(valid_domain)
}

fn trimmed(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

impl BookTicketRequest {
    /// Trim surrounding whitespace from every field.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        trimmed(&mut self.name);
        trimmed(&mut self.email);
        trimmed(&mut self.movie_title);
        trimmed(&mut self.showtime);
        self
    }

    /// Check required fields and email shape.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), BookingError> {
        require("name", &self.name)?;
        require_email(&self.email)?;
        require("movie_title", &self.movie_title)?;
        require("showtime", &self.showtime)
    }
}

impl CancelTicketRequest {
    /// Trim surrounding whitespace from every field.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        trimmed(&mut self.email);
        trimmed(&mut self.showtime);
        self
    }

    /// Check required fields and email shape.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), BookingError> {
        require_email(&self.email)?;
        require("showtime", &self.showtime)
    }
}

impl ModifySeatRequest {
    /// Trim surrounding whitespace from every field.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        trimmed(&mut self.email);
        trimmed(&mut self.showtime);
        trimmed(&mut self.new_seat_number);
        self
    }

    /// Check required fields and email shape.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), BookingError> {
        require_email(&self.email)?;
        require("showtime", &self.showtime)?;
        require("new_seat_number", &self.new_seat_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_fields() {
        let request = BookTicketRequest::new("Ann", "ann@x.com", "   ", "7PM");
        assert_eq!(
            request.validate(),
            Err(BookingError::Validation("movie_title is required".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_email() {
        let request = CancelTicketRequest::new("not-an-email", "7PM");
        assert!(matches!(request.validate(), Err(BookingError::Validation(_))));
    }

    #[test]
    fn accepts_complete_modify_request() {
        let request = ModifySeatRequest::new("ann@x.com", "7PM", "B12");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn normalization_trims_every_field() {
        let request = BookTicketRequest::new(" Ann ", "ann@x.com\t", " Dune", "7PM ").normalized();
        assert_eq!(request, BookTicketRequest::new("Ann", "ann@x.com", "Dune", "7PM"));
        assert!(request.validate().is_ok());

        let modify = ModifySeatRequest::new(" ann@x.com", "7PM ", " B4 ").normalized();
        assert_eq!(modify, ModifySeatRequest::new("ann@x.com", "7PM", "B4"));
    }

    #[test]
    fn rejects_double_at() {
        assert!(!is_valid_email("a@b@c.com"));
    }
}
