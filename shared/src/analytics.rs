use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::route::Category;

/// Pre-aggregated dashboard payload from `GET /analytics/data`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsData {
    #[serde(default)]
    pub total_distance: f64,
    #[serde(default)]
    pub total_routes: u64,
    /// "YYYY-MM" -> routes created that month.
    #[serde(default)]
    pub monthly_routes: HashMap<String, u64>,
    #[serde(default)]
    pub category_distribution: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCount {
    /// "YYYY-MM"
    pub month: String,
    pub count: u64,
}

/// Time-series points for the route chart: the trailing six calendar months
/// up to and including `today`, oldest first, zero-filled for months the
/// backend has no data for.
pub fn monthly_series(today: NaiveDate, monthly_routes: &HashMap<String, u64>) -> Vec<MonthlyCount> {
    let mut series = Vec::with_capacity(6);
    for back in (0..6).rev() {
        let months_total = today.year() * 12 + today.month0() as i32 - back;
        let (year, month0) = (months_total.div_euclid(12), months_total.rem_euclid(12));
        let month = format!("{year:04}-{:02}", month0 + 1);
        let count = monthly_routes.get(&month).copied().unwrap_or(0);
        series.push(MonthlyCount { month, count });
    }
    series
}

/// Doughnut-chart slices in the fixed category order the dashboard expects.
/// Unknown category keys from the backend are ignored.
pub fn category_series(distribution: &HashMap<String, u64>) -> Vec<(Category, u64)> {
    Category::ALL
        .iter()
        .map(|category| {
            (
                *category,
                distribution.get(category.key()).copied().unwrap_or(0),
            )
        })
        .collect()
}

/// Chart fill and border colors per category.
pub fn category_chart_colors(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Home => ("rgba(25, 135, 84, 0.7)", "rgb(25, 135, 84)"),
        Category::Office => ("rgba(13, 110, 253, 0.7)", "rgb(13, 110, 253)"),
        Category::Business => ("rgba(255, 193, 7, 0.7)", "rgb(255, 193, 7)"),
        Category::PickupPoint => ("rgba(111, 66, 193, 0.7)", "rgb(111, 66, 193)"),
        Category::Other => ("rgba(108, 117, 125, 0.7)", "rgb(108, 117, 125)"),
    }
}
