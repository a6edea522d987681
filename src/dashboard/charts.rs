//! Chart generation for the dashboard.
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with a corresponding HTML container and JavaScript
//! initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Emphasis, EmphasisFocus, Tooltip, Trigger},
    series::bar,
};
use maud::PreEscaped;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    dashboard::aggregation::{CategoryTotal, MonthSummary},
    html::HeadElement,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
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

/// Income and expense totals per month over the trailing series.
pub(super) fn trend_chart(series: &[MonthSummary]) -> Chart {
    let labels: Vec<String> = series.iter().map(|summary| summary.label.clone()).collect();
    let income: Vec<f64> = series
        .iter()
        .map(|summary| summary.income.to_f64().unwrap_or_default())
        .collect();
    let expenses: Vec<f64> = series
        .iter()
        .map(|summary| summary.expense.to_f64().unwrap_or_default())
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Income vs Expenses")
                .subtext("Last six months"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().top("8%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("Income").data(income))
        .series(bar::Bar::new().name("Expense").data(expenses))
}

/// Total spending per category, largest first.
pub(super) fn category_chart(categories: &[CategoryTotal]) -> Chart {
    let labels: Vec<String> = categories
        .iter()
        .map(|category| category.category.clone())
        .collect();
    let values: Vec<f64> = categories
        .iter()
        .map(|category| category.amount.to_f64().unwrap_or_default())
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(values),
        )
}
