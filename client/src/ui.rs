//! Element IDs and naming patterns shared with the presentation layer.
//!
//! These are a frozen contract: the templates reference them by ID and the
//! backend reads form fields named `{field}_{index}`.

pub const MAP: &str = "map";
pub const ROUTE_FORM: &str = "route-form";
pub const ROUTE_SUMMARY: &str = "route-summary";
pub const START_NAVIGATION_BTN: &str = "start-navigation-btn";
pub const SAVE_ROUTE_FORM: &str = "save-route-form";
pub const EXPORT_OPTIONS: &str = "export-options";
pub const ANALYTICS_ERROR: &str = "analytics-error";
pub const TOTAL_DISTANCE_VALUE: &str = "total-distance-value";
pub const TOTAL_ROUTES_VALUE: &str = "total-routes-value";
pub const ROUTE_STATS_CHART: &str = "routeStatsChart";
pub const CATEGORY_DISTRIBUTION_CHART: &str = "categoryDistributionChart";
pub const CURRENT_LAT: &str = "current_lat";
pub const CURRENT_LON: &str = "current_lon";

/// Form field name for the stop at `index`, e.g. `city_0`, `category_2`.
pub fn form_field_name(field: &str, index: usize) -> String {
    format!("{field}_{index}")
}

#[cfg(test)]
mod tests {
    #[test]
    fn form_fields_follow_the_index_pattern() {
        assert_eq!(super::form_field_name("city", 0), "city_0");
        assert_eq!(super::form_field_name("time_window_start", 12), "time_window_start_12");
    }
}
