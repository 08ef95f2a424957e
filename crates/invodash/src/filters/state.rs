//! Hierarchical region -> country filter state.

use crate::regions::{Country, RegionDirectory};

use super::normalize;

/// Tracks the dependent region/country selection of a filter form.
///
/// Selecting a region always resets the country: the previously selected
/// country belongs to the old region's option list and must not leak into a
/// query against the new region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    region: Option<String>,
    country: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a region, clearing any selected country. Passing `None` or
    /// the "All" sentinel clears both.
    pub fn set_region(&mut self, region: Option<&str>) {
        self.region = normalize(region);
        self.country = None;
    }

    /// Selects a country. Ignored unless a region is selected and the
    /// country is one of its options.
    pub fn set_country(&mut self, country: Option<&str>, directory: &RegionDirectory) {
        let candidate = normalize(country);
        match (&self.region, candidate) {
            (Some(region), Some(code)) => {
                let valid = directory
                    .countries_for(region)
                    .iter()
                    .any(|c| c.country_code == code);
                self.country = if valid { Some(code) } else { None };
            }
            _ => self.country = None,
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Country options for the current region selection.
    pub fn country_options<'a>(&self, directory: &'a RegionDirectory) -> &'a [Country] {
        match &self.region {
            Some(region) => directory.countries_for(region),
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::AllRegionsResponse;

    fn directory() -> RegionDirectory {
        let response: AllRegionsResponse = serde_json::from_str(
            r#"{
                "regions": [
                    {
                        "regionCode": "NA",
                        "regionName": "North America",
                        "countries": [
                            {"countryCode": "US", "countryName": "United States"},
                            {"countryCode": "CA", "countryName": "Canada"}
                        ]
                    },
                    {
                        "regionCode": "APAC",
                        "regionName": "Asia Pacific",
                        "countries": [
                            {"countryCode": "JP", "countryName": "Japan"},
                            {"countryCode": "AU", "countryName": "Australia"}
                        ]
                    }
                ],
                "totalRegions": 2,
                "totalCountries": 4
            }"#,
        )
        .unwrap();
        RegionDirectory::new(response)
    }

    #[test]
    fn test_region_change_resets_country() {
        let directory = directory();
        let mut state = FilterState::new();

        state.set_region(Some("NA"));
        state.set_country(Some("US"), &directory);
        assert_eq!(state.country(), Some("US"));

        state.set_region(Some("APAC"));
        assert_eq!(state.country(), None);

        // Options now come exactly from the new region
        let options: Vec<&str> = state
            .country_options(&directory)
            .iter()
            .map(|c| c.country_code.as_str())
            .collect();
        assert_eq!(options, vec!["JP", "AU"]);
    }

    #[test]
    fn test_country_outside_region_rejected() {
        let directory = directory();
        let mut state = FilterState::new();

        state.set_region(Some("NA"));
        state.set_country(Some("JP"), &directory);
        assert_eq!(state.country(), None);
    }

    #[test]
    fn test_country_without_region_rejected() {
        let directory = directory();
        let mut state = FilterState::new();

        state.set_country(Some("US"), &directory);
        assert_eq!(state.country(), None);
        assert!(state.country_options(&directory).is_empty());
    }

    #[test]
    fn test_all_sentinel_clears_selection() {
        let directory = directory();
        let mut state = FilterState::new();

        state.set_region(Some("NA"));
        state.set_country(Some("CA"), &directory);
        state.set_region(Some("All"));

        assert_eq!(state.region(), None);
        assert_eq!(state.country(), None);
    }
}
