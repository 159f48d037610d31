//! The profile page: account details, password changes and account deletion.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::invalidate_auth_cookie,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    user::{UserID, delete_user, get_user_by_id, update_user_password},
};

/// The state needed for the profile page and its endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing the user account.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ProfileState> for Key {
    fn from_ref(state: &ProfileState) -> Self {
        state.cookie_key.clone()
    }
}

fn password_field(name: &str, id: &str, label: &str) -> Markup {
    html! {
        div
        {
            label
                for=(id)
                class=(FORM_LABEL_STYLE)
            {
                (label)
            }

            input
                type="password"
                name=(name)
                id=(id)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required;
        }
    }
}

/// A status line shown inside the change password form after a submission.
enum FormNotice<'a> {
    Success(&'a str),
    Error(&'a str),
}

fn change_password_form(notice: Option<FormNotice>) -> Markup {
    html! {
        form
            id="change-password-form"
            hx-post=(endpoints::CHANGE_PASSWORD)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            class="space-y-4 w-full"
        {
            h3 class="text-xl font-semibold" { "Change Password" }

            @match notice {
                Some(FormNotice::Success(message)) => {
                    p class="text-green-600 dark:text-green-400 text-base" { (message) }
                }
                Some(FormNotice::Error(message)) => {
                    p class="text-red-500 text-base" { (message) }
                }
                None => {}
            }

            (password_field("current_password", "current-password", "Current Password"))
            (password_field("new_password", "new-password", "New Password"))
            (password_field("confirm_password", "confirm-password", "Confirm New Password"))

            button
                type="submit" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Update Password"
            }
        }
    }
}

fn delete_account_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::DELETE_ACCOUNT)
            hx-target-error="#alert-container"
            hx-confirm="Deleting your account removes all of your transactions. This cannot be undone. Continue?"
            class="space-y-4 w-full"
        {
            h3 class="text-xl font-semibold text-red-600 dark:text-red-400" { "Delete Account" }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "This permanently deletes your account and every transaction you have recorded."
            }

            (password_field("password", "delete-password", "Password"))

            button
                type="submit" tabindex="0"
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete my account"
            }
        }
    }
}

/// Display the profile page for the logged in user.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;
    let user = get_user_by_id(user_id, &connection)?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW);

    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="max-w-md w-full mx-auto space-y-8"
            {
                div
                {
                    h2 class="text-2xl font-bold mb-2" { "Profile" }
                    p class="text-gray-500 dark:text-gray-400" { "Signed in as " (user.email) }
                }

                (change_password_form(None))

                (delete_account_form())
            }
        }
    );

    Ok(base("Profile", &[], &content).into_response())
}

/// The form data for changing the user's password.
#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Handler for password change requests.
///
/// Responds with the form fragment re-rendered to show the outcome; HTMX
/// swaps it in place of the submitted form.
pub async fn post_change_password(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("could not load user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    match user.password_hash.verify(&form.current_password) {
        Ok(true) => {}
        Ok(false) => {
            return change_password_form(Some(FormNotice::Error(
                "The current password is incorrect.",
            )))
            .into_response();
        }
        Err(error) => {
            tracing::error!("could not verify password for user {user_id}: {error}");
            return Error::HashingError(error.to_string()).into_alert_response();
        }
    }

    let validated_password = match ValidatedPassword::new(&form.new_password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return change_password_form(Some(FormNotice::Error(&message))).into_response();
        }
    };

    if form.new_password != form.confirm_password {
        return change_password_form(Some(FormNotice::Error("Passwords do not match.")))
            .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_alert_response();
        }
    };

    match update_user_password(user_id, password_hash, &connection) {
        Ok(()) => {
            change_password_form(Some(FormNotice::Success("Password updated."))).into_response()
        }
        Err(error) => {
            tracing::error!("could not update password for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// The form data for deleting the user's account.
#[derive(Deserialize)]
pub struct DeleteAccountForm {
    pub password: String,
}

/// Handler for account deletion requests.
///
/// Verifies the password, deletes the user (and via the foreign key cascade
/// all of their transactions), invalidates the auth cookie and redirects to
/// the landing page.
pub async fn post_delete_account(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<DeleteAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("could not load user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => {}
        Ok(false) => {
            return Error::InvalidCredentials.into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not verify password for user {user_id}: {error}");
            return Error::HashingError(error.to_string()).into_alert_response();
        }
    }

    if let Err(error) = delete_user(user_id, &connection) {
        tracing::error!("could not delete user {user_id}: {error}");
        return error.into_alert_response();
    }

    (
        invalidate_auth_cookie(jar),
        HxRedirect(endpoints::ROOT.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
