//! The page explaining how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::html::base;

fn forgot_password_template() -> Markup {
    let content = html! {
        // Template adapted from https://flowbite.com/blocks/marketing/register/
        div
            class="flex flex-col items-center justify-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            a
                href="/"
                class="flex items-center mb-6 text-2xl font-semibold"
            {
                img
                    src="/static/favicon-32x32.png"
                    alt="logo"
                    class="w-8 h-8 mr-2";
                "FlowTrack"
            }
            div
                class="w-full bg-white rounded shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1
                        class="text-xl font-bold md:text-2xl"
                    {
                        "Forgot your password?"
                    }
                    p class="text-justify"
                    {
                        "To reset your password, ask whoever runs this FlowTrack
                        server to run the 'reset_password' program in the server's
                        install directory and point it at the database file. It
                        will prompt for your email address and a new password."
                    }
                }
            }
        }
    };

    base("Forgot Password", &[], &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::get_forgot_password_page;

    #[tokio::test]
    async fn page_renders_successfully() {
        let response = get_forgot_password_page().await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
