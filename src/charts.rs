//! Chart generation for the dashboard, breakdown and report pages.
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered into an HTML container with a small JavaScript initialisation
//! snippet in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title, VisualMap, VisualMapPiece},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    aggregation::{CategoryTotal, MonthlyBreakdown, MonthlyNetSeries},
    html::HeadElement,
};

/// A chart with its HTML container ID and ECharts configuration.
pub(crate) struct ChartPanel {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl ChartPanel {
    pub(crate) fn new(id: &'static str, chart: &Chart) -> Self {
        Self {
            id,
            options: chart.to_string(),
        }
    }
}

/// Renders the HTML container div for a chart.
pub(crate) fn chart_container(panel: &ChartPanel) -> Markup {
    html!(
        div
            id=(panel.id)
            class="min-h-[380px] rounded dark:bg-gray-100"
        {}
    )
}

/// Generates JavaScript initialization code for the page's charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(crate) fn charts_script(charts: &[ChartPanel]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// The script tag loading the bundled ECharts library.
pub(crate) fn echarts_script_link() -> HeadElement {
    HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned())
}

/// The monthly net bar chart shown on the dashboard.
///
/// Months with a positive net are drawn green, months in the red are drawn
/// red via the visual map.
pub(crate) fn overview_chart(series: &MonthlyNetSeries) -> Chart {
    let labels: Vec<String> = series
        .points
        .iter()
        .map(|point| point.month.to_owned())
        .collect();
    let values: Vec<f64> = series.points.iter().map(|point| point.amount).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Overview")
                .subtext(format!("Monthly net for {}", series.year)),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .visual_map(VisualMap::new().show(false).pieces(vec![
            VisualMapPiece::new().lte(-1).color("red"),
            VisualMapPiece::new().gte(0).color("green"),
        ]))
        .series(Bar::new().name("Net").data(values))
}

/// A donut chart of category totals, used for the spending breakdown on the
/// dashboard and the income/expense pages.
pub(crate) fn category_donut_chart(title: &str, totals: &[CategoryTotal]) -> Chart {
    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|total| (total.value, total.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text(title))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("0%"))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["45%", "70%"])
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        )
}

/// The income-vs-expense trend chart on the reports page.
pub(crate) fn trend_chart(breakdown: &MonthlyBreakdown) -> Chart {
    let labels: Vec<String> = breakdown
        .months
        .iter()
        .map(|month| month.month.to_owned())
        .collect();
    let income: Vec<f64> = breakdown.months.iter().map(|month| month.income).collect();
    let expenses: Vec<f64> = breakdown
        .months
        .iter()
        .map(|month| month.expenses)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Income vs Expenses")
                .subtext(format!("{}", breakdown.year)),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("5%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Income").data(income))
        .series(Line::new().name("Expenses").data(expenses))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
