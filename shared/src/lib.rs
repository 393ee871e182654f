pub mod analytics;
pub mod route;
pub mod traffic;

pub use analytics::{AnalyticsData, MonthlyCount, category_chart_colors, category_series, monthly_series};
pub use route::*;
pub use traffic::*;
