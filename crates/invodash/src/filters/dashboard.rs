//! Dashboard filter payload for `POST /invoice-management/dashboard/filter`.

use chrono::NaiveDate;
use serde::Serialize;

use super::normalize;

/// UI-side filter values for the invoice dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub vendor: Option<String>,
}

/// Request body as the backend expects it. Unset fields are omitted, never
/// serialized as empty strings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardFilterBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl DashboardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from_date = Some(from);
        self.to_date = Some(to);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Builds the canonical request body.
    pub fn to_body(&self) -> DashboardFilterBody {
        DashboardFilterBody {
            from_date: self.from_date.map(|d| d.format("%Y-%m-%d").to_string()),
            to_date: self.to_date.map(|d| d.format("%Y-%m-%d").to_string()),
            region: normalize(self.region.as_deref()),
            country: normalize(self.country.as_deref()),
            vendor: normalize(self.vendor.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_serializes_to_empty_object() {
        let body = DashboardFilter::new().to_body();
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_all_sentinel_omitted() {
        let body = DashboardFilter::new()
            .region("All")
            .country("")
            .vendor("Allied Corp")
            .to_body();

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("region").is_none());
        assert!(json.get("country").is_none());
        assert_eq!(json["vendor"], "Allied Corp");
    }

    #[test]
    fn test_dates_formatted_iso() {
        let body = DashboardFilter::new()
            .date_range(
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            )
            .to_body();

        assert_eq!(body.from_date.as_deref(), Some("2026-01-01"));
        assert_eq!(body.to_date.as_deref(), Some("2026-03-31"));
    }

    #[test]
    fn test_full_filter_body() {
        let body = DashboardFilter::new()
            .date_range(
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
            )
            .region("EMEA")
            .country("DE")
            .vendor("Acme GmbH")
            .to_body();

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["from_date"], "2026-02-01");
        assert_eq!(json["region"], "EMEA");
        assert_eq!(json["country"], "DE");
        assert_eq!(json["vendor"], "Acme GmbH");
    }
}
