//! Filter state and query building.
//!
//! Pure builders: UI filter values in, canonical request payloads out.
//! Unset, empty, and "All" sentinel values are omitted entirely rather than
//! sent as empty parameters.

pub mod analytics;
pub mod dashboard;
pub mod state;

pub use analytics::AnalyticsQuery;
pub use dashboard::DashboardFilter;
pub use state::FilterState;

/// Returns `None` for values the backend should never see: empty strings and
/// the "All" dropdown sentinel.
pub(crate) fn normalize(value: Option<&str>) -> Option<String> {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => None,
    }
}
