use super::*;

#[test]
fn check_email_accepts_common_addresses() {
    assert!(check_email("tenant@example.com").is_ok());
    assert!(check_email("  first.last+rent@mail.example.co.in ").is_ok());
}

#[test]
fn check_email_rejects_malformed() {
    assert_eq!(check_email("").unwrap_err(), "Email is required");
    for bad in ["tenant", "tenant@", "@example.com", "tenant@example", "a@b@c.com", "ten ant@example.com"] {
        assert!(check_email(bad).is_err(), "{bad} should be rejected");
    }
}

#[test]
fn check_password_requires_uppercase() {
    assert_eq!(
        check_password("lowercase1!").unwrap_err(),
        "Password must contain at least one uppercase letter"
    );
}

#[test]
fn check_password_rules_in_order() {
    assert_eq!(check_password("").unwrap_err(), "Password is required");
    assert_eq!(check_password("Ab1!").unwrap_err(), "Password must be at least 8 characters");
    assert_eq!(
        check_password("UPPERCASE1!").unwrap_err(),
        "Password must contain at least one lowercase letter"
    );
    assert_eq!(check_password("NoDigits!!").unwrap_err(), "Password must contain at least one number");
    assert_eq!(
        check_password("NoSpecial12").unwrap_err(),
        "Password must contain at least one special character"
    );
    assert!(check_password(&format!("Aa1!{}", "x".repeat(61))).is_err());
    assert!(check_password("Str0ng!Pass").is_ok());
}

#[test]
fn check_password_confirmation_must_match() {
    assert!(check_password_confirmation("Str0ng!Pass", "Str0ng!Pass").is_ok());
    assert_eq!(check_password_confirmation("Str0ng!Pass", "other").unwrap_err(), "Passwords must match");
    assert_eq!(check_password_confirmation("Str0ng!Pass", "").unwrap_err(), "Confirm password is required");
}

#[test]
fn check_name_allows_letters_only() {
    assert!(check_name("Anne-Marie O'Neil", "First name").is_ok());
    assert!(check_name("Ravi2", "First name").is_err());
    assert_eq!(check_name(" ", "Last name").unwrap_err(), "Last name is required");
    assert!(check_name(&"a".repeat(51), "First name").is_err());
}

#[test]
fn check_otp_requires_six_digits() {
    assert!(check_otp("123456").is_ok());
    assert!(check_otp(" 123456 ").is_ok());
    assert!(check_otp("12345").is_err());
    assert!(check_otp("1234567").is_err());
    assert!(check_otp("12a456").is_err());
}

#[test]
fn check_pincode_rejects_five_digits() {
    assert_eq!(check_pincode("56001").unwrap_err(), "Pincode must be 6 digits");
    assert!(check_pincode("560001").is_ok());
    assert!(check_pincode("060001").is_err());
    assert!(check_pincode("5600a1").is_err());
    assert_eq!(check_pincode("").unwrap_err(), "Pincode is required");
}

#[test]
fn check_phone_and_aadhar_shapes() {
    assert!(check_phone("9876543210").is_ok());
    assert!(check_phone("1876543210").is_err());
    assert!(check_phone("98765").is_err());
    assert!(check_aadhar("234567890123").is_ok());
    assert!(check_aadhar("134567890123").is_err());
    assert!(check_aadhar("23456789012").is_err());
}

#[test]
fn optional_skips_blank_values() {
    assert!(optional(None, check_phone).is_ok());
    assert!(optional(Some("  "), check_phone).is_ok());
    assert!(optional(Some("123"), check_phone).is_err());
}

#[test]
fn checker_collects_all_failures_in_order() {
    let err = Checker::default()
        .check("email", check_email("nope"))
        .check("password", Ok(()))
        .check("otp", check_otp("1"))
        .finish()
        .unwrap_err();
    let fields: Vec<_> = err.errors().iter().map(|e| e.field).collect();
    assert_eq!(fields, vec!["email", "otp"]);
    assert!(err.has("otp"));
    assert!(!err.has("password"));
    assert_eq!(err.to_string(), "email: Enter a valid email address; otp: OTP must be 6 digits");
}
