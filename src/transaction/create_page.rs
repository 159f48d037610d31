//! Renders the page for creating a new transaction.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, dollar_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::{get_local_offset, local_today},
    transaction::{
        core::TransactionKind,
        form::{TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(State(state): State<NewTransactionPageState>) -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW);

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };
    let today = local_today(local_offset);

    let form_fields = transaction_form_fields(&TransactionFormDefaults {
        kind: TransactionKind::Expense,
        name: None,
        category: None,
        amount: None,
        date: today,
        max_date: today,
    });

    let content = html!(
        (nav_bar.into_html())

        div class="flex flex-col items-center px-6 py-8 mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl my-4"
            {
                "New Transaction"
            }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-indicator="#indicator"
                hx-target-error="#alert-container"
                class="space-y-4 md:space-y-6 w-full"
            {
                (form_fields)

                button
                    type="submit" id="submit-button" tabindex="0"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator"
                    {
                        (loading_spinner())
                    }
                    "Add"
                }
            }
        }
    );

    base("New Transaction", &[dollar_input_styles()], &content).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode},
    };
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::{NewTransactionPageState, get_new_transaction_page};

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn renders_form_posting_to_transactions_api() {
        let state = NewTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_new_transaction_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html(response).await;
        let form_selector = Selector::parse("form").unwrap();
        let form = document
            .select(&form_selector)
            .next()
            .expect("form missing");
        assert_eq!(
            form.value().attr("hx-post"),
            Some(endpoints::TRANSACTIONS_API)
        );
    }

    #[tokio::test]
    async fn invalid_timezone_renders_error_page() {
        let state = NewTransactionPageState {
            local_timezone: "Moon/Tranquility_Base".to_owned(),
        };

        let response = get_new_transaction_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
