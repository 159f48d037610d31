//! The reports page: yearly income-vs-expense trends.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    aggregation::{monthly_breakdown, net_totals},
    charts::{ChartPanel, chart_container, charts_script, echarts_script_link, trend_chart},
    endpoints,
    html::{
        AMOUNT_GREEN_STYLE, AMOUNT_RED_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, stat_card,
    },
    navigation::NavBar,
    timezone::{get_local_offset, local_today},
    transaction::{TransactionQuery, query_transactions},
    user::UserID,
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the reports page.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The reporting year. Defaults to the current year.
    pub year: Option<i32>,
}

/// Display the yearly trend report.
pub async fn get_reports_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = local_today(local_offset);
    let year = query.year.unwrap_or_else(|| today.year());

    let start_of_year = Date::from_calendar_date(year, Month::January, 1)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), year.to_string()))?;
    let end_of_year = Date::from_calendar_date(year, Month::December, 31)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), year.to_string()))?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = query_transactions(
        user_id,
        TransactionQuery {
            date_range: Some(start_of_year..=end_of_year),
            ..Default::default()
        },
        &connection,
    )
    .inspect_err(|error| {
        tracing::error!("Could not get transactions for year {year}: {error}")
    })?;
    drop(connection);

    let breakdown = monthly_breakdown(&transactions, year);
    let totals = net_totals(&transactions);

    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW);
    let chart = ChartPanel::new("trend-chart", &trend_chart(&breakdown));

    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex items-center justify-between mb-6"
            {
                h2 class="text-2xl font-bold" { "Financial Reports" }

                (year_selector(year))
            }

            section class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-6"
            {
                (stat_card("Total Income", totals.income, AMOUNT_GREEN_STYLE))
                (stat_card("Total Expenses", totals.expenses, AMOUNT_RED_STYLE))
                (stat_card(
                    "Net Savings",
                    totals.balance,
                    if totals.balance >= 0.0 { AMOUNT_GREEN_STYLE } else { AMOUNT_RED_STYLE },
                ))
            }

            @if transactions.is_empty() {
                p class="py-8 text-center text-gray-500 dark:text-gray-400"
                {
                    "No transactions recorded for " (year) "."
                }
            }

            section class="w-full"
            {
                (chart_container(&chart))
            }
        }
    );

    let scripts = [echarts_script_link(), charts_script(&[chart])];

    Ok(base("Reports", &scripts, &content).into_response())
}

fn year_selector(year: i32) -> Markup {
    let year_url = |year: i32| format!("{}?year={}", endpoints::REPORTS_VIEW, year);

    html!(
        div class="flex items-center gap-4"
        {
            a href=(year_url(year - 1)) class=(LINK_STYLE) { "‹ " (year - 1) }
            span class="font-semibold" { (year) }
            a href=(year_url(year + 1)) class=(LINK_STYLE) { (year + 1) " ›" }
        }
    )
}
