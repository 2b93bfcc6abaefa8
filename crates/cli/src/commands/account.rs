//! Login, registration, profile and contact screens.

use secrecy::SecretString;
use tracing::info;

use cue_shop_core::UserProfileUpdate;
use cue_shop_storefront::api::{ContactMessage, RegisterRequest};
use cue_shop_storefront::error::AppError;
use cue_shop_storefront::forms::{
    FieldErrors, LoginForm, registration_conflict, validate_contact, validate_profile,
    validate_registration,
};
use cue_shop_storefront::state::AppState;

use super::{Result, open};
use crate::output;

/// Fields of the profile form; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

pub async fn login(state: &AppState, username: &str, password: String) -> Result<()> {
    open(state, "/login")?;

    let form = LoginForm {
        username: username.trim().to_owned(),
        password: SecretString::from(password),
    };
    form.validate().into_result().map_err(AppError::InvalidForm)?;

    state.session().login(&form.username, &form.password).await?;
    // Let the profile fetch finish before the process exits
    state.session().settled().await;

    let Some(user) = state.session().user() else {
        return Err(AppError::Authentication.into());
    };
    state.notifier().success(&format!("Xin chào, {}!", user.display_name()));

    let landing = state.navigator().after_login();
    output::line(&format!("→ {}", landing.location));
    Ok(())
}

pub fn logout(state: &AppState) {
    if !state.session().is_authenticated() {
        state.notifier().info("Bạn chưa đăng nhập");
        return;
    }
    state.session().logout();
    state.notifier().success("Đã đăng xuất");
}

pub async fn register(state: &AppState, request: RegisterRequest) -> Result<()> {
    open(state, "/register")?;
    validate_registration(&request)
        .into_result()
        .map_err(AppError::InvalidForm)?;

    if let Err(e) = state.session().register(&request).await {
        let backend_message = match &e {
            AppError::Validation(message) => Some(message.as_str()),
            AppError::Registration(api) => api.backend_message(),
            _ => None,
        };
        if let Some(conflict) = backend_message.and_then(registration_conflict) {
            state.notifier().error(conflict.message);
            let mut errors = FieldErrors::default();
            errors.insert(conflict.field, conflict.field_message);
            return Err(AppError::InvalidForm(errors).into());
        }
        return Err(e.into());
    }

    info!(username = %request.username, "Account registered");
    state
        .notifier()
        .success("Đăng ký thành công! Vui lòng đăng nhập (cue-shop login).");
    Ok(())
}

pub fn whoami(state: &AppState) {
    let session = state.session();
    match (session.is_authenticated(), session.user()) {
        (false, _) => output::line("Chưa đăng nhập"),
        (true, Some(user)) => output::user(&user),
        (true, None) => output::line("Đã đăng nhập (đang tải hồ sơ)"),
    }
}

pub fn show_profile(state: &AppState) -> Result<()> {
    open(state, "/profile")?;
    let user = state.session().user().ok_or(AppError::NotAuthenticated)?;
    output::user(&user);
    Ok(())
}

pub async fn update_profile(state: &AppState, changes: ProfileChanges) -> Result<()> {
    open(state, "/profile")?;
    let user = state.session().user().ok_or(AppError::NotAuthenticated)?;

    let current = UserProfileUpdate::from_user(&user);
    let update = UserProfileUpdate {
        full_name: changes.full_name.unwrap_or(current.full_name),
        email: changes.email.unwrap_or(current.email),
        phone_number: changes.phone_number.unwrap_or(current.phone_number),
        address: changes.address.unwrap_or(current.address),
    };
    validate_profile(&update)
        .into_result()
        .map_err(AppError::InvalidForm)?;

    let updated = state.session().update_profile(&update).await?;
    state.notifier().success("Cập nhật thông tin thành công");
    output::user(&updated);
    Ok(())
}

pub async fn contact(state: &AppState, message: ContactMessage) -> Result<()> {
    open(state, "/contact")?;
    validate_contact(&message)
        .into_result()
        .map_err(AppError::InvalidForm)?;

    let reply = state
        .api()
        .send_contact(&message)
        .await
        .map_err(AppError::from)?;
    let reply = if reply.is_empty() {
        "Gửi tin nhắn thành công!".to_string()
    } else {
        reply
    };
    state.notifier().success(&reply);
    Ok(())
}
