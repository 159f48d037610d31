//! Alert fragments for displaying success and error messages to users.
//!
//! Forms across the application declare `hx-target-error="#alert-container"`,
//! so error responses rendered with [Alert] land in the fixed container at
//! the bottom of every page (see `html::base`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const SUCCESS_STYLE: &str = "flex flex-col gap-1 p-4 mb-4 rounded-lg shadow \
    text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400";
const ERROR_STYLE: &str = "flex flex-col gap-1 p-4 mb-4 rounded-lg shadow \
    text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400";

/// A success or error notice to show the user.
pub enum Alert {
    /// The operation succeeded.
    Success {
        /// The headline of the alert.
        message: String,
        /// Extra context shown below the headline.
        details: String,
    },
    /// The operation failed.
    Error {
        /// The headline of the alert.
        message: String,
        /// Extra context shown below the headline.
        details: String,
    },
}

impl Alert {
    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html! {
            div class=(style) role="alert"
            {
                span class="font-semibold" { (message) }

                @if !details.is_empty() {
                    span class="text-sm" { (details) }
                }
            }

            script
            {
                "document.getElementById('alert-container').classList.remove('hidden');"
            }
        }
    }

    /// Render the alert as an HTTP response with the given status code.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, self.into_html()).into_response()
    }
}
