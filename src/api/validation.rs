//! Input validation for API requests.
//!
//! Validators return `Result<(), String>`; handlers map the message into a
//! 400 response.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Permissive email shape check: local@domain.tld
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    /// Aadhar numbers are exactly 12 digits
    static ref AADHAR_REGEX: Regex = Regex::new(r"^[0-9]{12}$").unwrap();

    /// GSTIN: 15 characters, digits and uppercase letters
    static ref GST_REGEX: Regex = Regex::new(r"^[0-9A-Z]{15}$").unwrap();
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

pub fn validate_aadhar(aadhar: &str) -> Result<(), String> {
    if !AADHAR_REGEX.is_match(aadhar) {
        return Err("Aadhar number must be exactly 12 digits".to_string());
    }

    Ok(())
}

pub fn validate_gst(gst: &str) -> Result<(), String> {
    if !GST_REGEX.is_match(gst) {
        return Err("GST number must be 15 characters (digits and uppercase letters)".to_string());
    }

    Ok(())
}

/// Validate a free-text name field (mess name, person name, notice title)
pub fn validate_name(name: &str, field_name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if name.len() > 200 {
        return Err(format!("{} is too long (max 200 characters)", field_name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("student@hostel.edu").is_ok());
        assert!(validate_email("a.b+c@example.co.in").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("no-tld@example").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_aadhar() {
        assert!(validate_aadhar("123412341234").is_ok());

        assert!(validate_aadhar("").is_err());
        assert!(validate_aadhar("12341234123").is_err()); // 11 digits
        assert!(validate_aadhar("1234123412345").is_err()); // 13 digits
        assert!(validate_aadhar("12341234123a").is_err());
    }

    #[test]
    fn test_validate_gst() {
        assert!(validate_gst("22AAAAA0000A1Z5").is_ok());

        assert!(validate_gst("").is_err());
        assert!(validate_gst("22aaaaa0000a1z5").is_err()); // lowercase
        assert!(validate_gst("22AAAAA0000A1Z").is_err()); // 14 chars
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Sunrise Mess", "Name").is_ok());

        assert!(validate_name("", "Name").is_err());
        assert!(validate_name("   ", "Name").is_err());
        assert!(validate_name(&"x".repeat(201), "Name").is_err());
    }

}
