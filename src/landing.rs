//! The public landing page.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{endpoints, html::base};

/// Display the public landing page with links to log in or sign up.
pub async fn get_landing_page() -> Response {
    let content = html!(
        // Template adapted from https://flowbite.com/blocks/marketing/hero/
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl text-center lg:py-16 lg:px-12"
            {
                h1
                    class="mb-4 text-4xl font-extrabold tracking-tight leading-none
                        text-gray-900 md:text-5xl lg:text-6xl dark:text-white"
                {
                    "Know where your money goes"
                }

                p
                    class="mb-8 text-lg font-normal text-gray-500 lg:text-xl
                        sm:px-16 xl:px-48 dark:text-gray-400"
                {
                    "FlowTrack keeps your income and expenses in one place and
                    turns them into monthly overviews, category breakdowns and
                    yearly trend reports."
                }

                div class="flex flex-col mb-8 lg:mb-16 space-y-4 sm:flex-row sm:justify-center sm:space-y-0 sm:space-x-4"
                {
                    a
                        href=(endpoints::REGISTER_VIEW)
                        class="inline-flex justify-center items-center py-3 px-5
                            text-base font-medium text-center text-white rounded-lg
                            bg-blue-700 hover:bg-blue-800 focus:ring-4
                            focus:ring-blue-300 dark:focus:ring-blue-900"
                    {
                        "Get started"
                    }

                    a
                        href=(endpoints::LOG_IN_VIEW)
                        class="inline-flex justify-center items-center py-3 px-5
                            text-base font-medium text-center text-gray-900 rounded-lg
                            border border-gray-300 hover:bg-gray-100 focus:ring-4
                            focus:ring-gray-100 dark:text-white dark:border-gray-700
                            dark:hover:bg-gray-700 dark:focus:ring-gray-800"
                    {
                        "Log in"
                    }
                }
            }
        }
    );

    base("Personal Finance Tracking", &[], &content).into_response()
}
