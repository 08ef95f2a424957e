//! Incident analytics query for `GET /live-incidents/analytics`.

use chrono::NaiveDate;

use super::normalize;

/// UI-side filter values for the incident analytics screen.
///
/// `days_back` and an explicit date range are mutually exclusive; when both
/// are set the explicit range wins and `days_back` is not sent.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsQuery {
    pub days_back: Option<u32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub business_line: Option<String>,
    pub application_name: Option<String>,
    pub major_incident_only: bool,
    pub root_cause_category: Option<String>,
    pub resolution_category: Option<String>,
    pub limit: Option<u32>,
}

impl AnalyticsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days_back(mut self, days: u32) -> Self {
        self.days_back = Some(days);
        self
    }

    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn business_line(mut self, value: impl Into<String>) -> Self {
        self.business_line = Some(value.into());
        self
    }

    pub fn application_name(mut self, value: impl Into<String>) -> Self {
        self.application_name = Some(value.into());
        self
    }

    pub fn major_incident_only(mut self, value: bool) -> Self {
        self.major_incident_only = value;
        self
    }

    pub fn root_cause_category(mut self, value: impl Into<String>) -> Self {
        self.root_cause_category = Some(value.into());
        self
    }

    pub fn resolution_category(mut self, value: impl Into<String>) -> Self {
        self.resolution_category = Some(value.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builds the ordered query pairs. Unset and sentinel values are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let explicit_range = self.date_from.is_some() || self.date_to.is_some();
        if explicit_range {
            if let Some(from) = self.date_from {
                pairs.push(("date_from", from.format("%Y-%m-%d").to_string()));
            }
            if let Some(to) = self.date_to {
                pairs.push(("date_to", to.format("%Y-%m-%d").to_string()));
            }
        } else if let Some(days) = self.days_back {
            pairs.push(("days_back", days.to_string()));
        }

        if let Some(value) = normalize(self.business_line.as_deref()) {
            pairs.push(("business_line", value));
        }
        if let Some(value) = normalize(self.application_name.as_deref()) {
            pairs.push(("application_name", value));
        }
        if self.major_incident_only {
            pairs.push(("major_incident_only", "true".to_string()));
        }
        if let Some(value) = normalize(self.root_cause_category.as_deref()) {
            pairs.push(("root_cause_category", value));
        }
        if let Some(value) = normalize(self.resolution_category.as_deref()) {
            pairs.push(("resolution_category", value));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        pairs
    }
}
