//! Client-side form validation.
//!
//! Forms are checked before anything is sent. Errors come back as an ordered
//! field → message map; the first entry is the one worth showing when there
//! is room for a single message.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use cue_shop_core::{Email, UserProfileUpdate};

use crate::api::{ContactMessage, RegisterRequest};

/// Digits and the usual phone punctuation.
static REGISTER_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("Invalid regex"));

/// 10 or 11 digits.
static STRICT_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10,11}$").expect("Invalid regex"));

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;
const MIN_CONTACT_MESSAGE_LEN: usize = 10;

/// Field errors in the order the fields appear on the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    /// Record an error for `field`, replacing an earlier one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        if let Some(slot) = self.0.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = message;
        } else {
            self.0.push((field, message));
        }
    }

    /// Error for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    /// First error in form order.
    #[must_use]
    pub fn first(&self) -> Option<(&'static str, &str)> {
        self.0.first().map(|(f, m)| (*f, m.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Shared rules
// =============================================================================

fn check_required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, message);
        return false;
    }
    true
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if check_required(errors, "email", value, "Vui lòng nhập email") && Email::parse(value).is_err() {
        errors.insert("email", "Email không hợp lệ");
    }
}

fn check_password(errors: &mut FieldErrors, password: &SecretString) {
    let password = password.expose_secret();
    if password.is_empty() {
        errors.insert("password", "Vui lòng nhập mật khẩu");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", "Mật khẩu phải có ít nhất 6 ký tự");
    }
}

/// Whitespace is ignored.
fn check_strict_phone(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if check_required(errors, field, value, "Vui lòng nhập số điện thoại") {
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if !STRICT_PHONE.is_match(&compact) {
            errors.insert(field, "Số điện thoại không hợp lệ");
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Login form input.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
}

impl LoginForm {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        check_required(&mut errors, "username", &self.username, "Vui lòng nhập tên đăng nhập");
        check_password(&mut errors, &self.password);
        errors
    }
}

/// Validate a registration request.
#[must_use]
pub fn validate_registration(form: &RegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::default();

    check_required(&mut errors, "fullName", &form.full_name, "Vui lòng nhập họ tên");
    check_email(&mut errors, &form.email);

    if check_required(&mut errors, "username", &form.username, "Vui lòng nhập tên đăng nhập")
        && form.username.chars().count() < MIN_USERNAME_LEN
    {
        errors.insert("username", "Tên đăng nhập phải có ít nhất 3 ký tự");
    }

    check_password(&mut errors, &form.password);

    if check_required(&mut errors, "phoneNumber", &form.phone_number, "Vui lòng nhập số điện thoại")
        && !REGISTER_PHONE.is_match(&form.phone_number)
    {
        errors.insert("phoneNumber", "Số điện thoại không hợp lệ");
    }

    check_required(&mut errors, "address", &form.address, "Vui lòng nhập địa chỉ");
    errors
}

/// Validate a profile edit. The address is optional.
#[must_use]
pub fn validate_profile(form: &UserProfileUpdate) -> FieldErrors {
    let mut errors = FieldErrors::default();
    check_required(&mut errors, "fullName", &form.full_name, "Vui lòng nhập họ và tên");
    check_email(&mut errors, &form.email);
    check_strict_phone(&mut errors, "phoneNumber", &form.phone_number);
    errors
}

/// Validate a contact message.
#[must_use]
pub fn validate_contact(form: &ContactMessage) -> FieldErrors {
    let mut errors = FieldErrors::default();
    check_required(&mut errors, "name", &form.name, "Vui lòng nhập họ và tên");
    check_email(&mut errors, &form.email);
    check_strict_phone(&mut errors, "phone", &form.phone);
    check_required(&mut errors, "subject", &form.subject, "Vui lòng nhập chủ đề");

    if check_required(&mut errors, "message", &form.message, "Vui lòng nhập nội dung tin nhắn")
        && form.message.trim().chars().count() < MIN_CONTACT_MESSAGE_LEN
    {
        errors.insert("message", "Tin nhắn phải có ít nhất 10 ký tự");
    }
    errors
}

/// A registration refused because the email or username is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConflict {
    /// Form field to flag.
    pub field: &'static str,
    /// Message next to the field.
    pub field_message: &'static str,
    /// Message for the whole form.
    pub message: &'static str,
}

/// Recognise "already taken" messages from the registration endpoint.
#[must_use]
pub fn registration_conflict(backend_message: &str) -> Option<RegistrationConflict> {
    let lower = backend_message.to_lowercase();
    let taken = lower.contains("đã tồn tại") || lower.contains("already exists");
    if !taken {
        return None;
    }

    if lower.contains("email") {
        Some(RegistrationConflict {
            field: "email",
            field_message: "Email này đã được sử dụng",
            message: "Email đã được đăng ký. Vui lòng sử dụng email khác.",
        })
    } else if lower.contains("username") || lower.contains("tên đăng nhập") {
        Some(RegistrationConflict {
            field: "username",
            field_message: "Tên đăng nhập này đã được sử dụng",
            message: "Tên đăng nhập đã tồn tại. Vui lòng chọn tên đăng nhập khác.",
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            full_name: "Nguyễn Văn An".to_string(),
            email: "an@cueshop.vn".to_string(),
            username: "vanan".to_string(),
            password: SecretString::from("matkhau1"),
            phone_number: "+84 (90) 123-4567".to_string(),
            address: "1 Tràng Tiền, Hà Nội".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&registration()).is_empty());
    }

    #[test]
    fn test_registration_errors_in_form_order() {
        let mut form = registration();
        form.email = "not-an-email".to_string();
        form.username = "an".to_string();
        form.password = SecretString::from("123");
        form.phone_number = "call me".to_string();
        form.address = "   ".to_string();

        let errors = validate_registration(&form);
        let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, ["email", "username", "password", "phoneNumber", "address"]);
        assert_eq!(errors.get("email"), Some("Email không hợp lệ"));
        assert_eq!(
            errors.get("username"),
            Some("Tên đăng nhập phải có ít nhất 3 ký tự")
        );
    }

    #[test]
    fn test_login_requires_six_char_password() {
        let form = LoginForm {
            username: String::new(),
            password: SecretString::from("12345"),
        };
        let errors = form.validate();
        assert_eq!(errors.first(), Some(("username", "Vui lòng nhập tên đăng nhập")));
        assert_eq!(errors.get("password"), Some("Mật khẩu phải có ít nhất 6 ký tự"));
    }

    #[test]
    fn test_profile_phone_ignores_spaces() {
        let form = UserProfileUpdate {
            full_name: "An".to_string(),
            email: "an@cueshop.vn".to_string(),
            phone_number: "090 123 4567".to_string(),
            address: String::new(),
        };
        assert!(validate_profile(&form).is_empty());

        let form = UserProfileUpdate {
            phone_number: "+84901234567".to_string(),
            ..form
        };
        assert_eq!(
            validate_profile(&form).get("phoneNumber"),
            Some("Số điện thoại không hợp lệ")
        );
    }

    #[test]
    fn test_contact_message_length() {
        let form = ContactMessage {
            name: "An".to_string(),
            email: "an@cueshop.vn".to_string(),
            phone: "0901234567".to_string(),
            subject: "Bảo hành".to_string(),
            message: "  ngắn  ".to_string(),
        };
        let errors = validate_contact(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("message"), Some("Tin nhắn phải có ít nhất 10 ký tự"));
    }

    #[test]
    fn test_registration_conflict_mapping() {
        let conflict = registration_conflict("Email already exists").map(|c| c.field);
        assert_eq!(conflict, Some("email"));

        let conflict = registration_conflict("Tên đăng nhập đã tồn tại").map(|c| c.field);
        assert_eq!(conflict, Some("username"));

        let conflict = registration_conflict("Username already exists").map(|c| c.field);
        assert_eq!(conflict, Some("username"));

        assert!(registration_conflict("Password too weak").is_none());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::default();
        errors.insert("email", "Email không hợp lệ");
        errors.insert("phone", "Số điện thoại không hợp lệ");
        assert_eq!(
            errors.to_string(),
            "email: Email không hợp lệ; phone: Số điện thoại không hợp lệ"
        );
        assert!(errors.into_result().is_err());
    }
}
