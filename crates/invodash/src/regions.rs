//! Region and country lookup.
//!
//! The backend owns the region hierarchy; every dependent region -> country
//! dropdown in the dashboard is populated from
//! `GET /regions-management/regions-countries`. The catalog is fetched once
//! and held in a TTL cache since it changes rarely.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::Result;

/// A single country entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub country_code: String,
    pub country_name: String,
}

/// Region summary without its country list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub region_code: String,
    pub region_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_count: Option<u32>,
}

/// Region with its full country list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegionWithCountries {
    pub region_code: String,
    pub region_name: String,
    pub countries: Vec<Country>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_countries: Option<u32>,
}

/// Response of `GET /regions-management/regions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionsListResponse {
    pub regions: Vec<Region>,
    pub total_regions: u32,
}

/// Response of `GET /regions-management/regions-countries`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRegionsResponse {
    pub regions: Vec<RegionWithCountries>,
    /// Region code -> country codes, as provided by the backend for
    /// lightweight consumers.
    #[serde(default)]
    pub simple_mapping: HashMap<String, Vec<String>>,
    pub total_regions: u32,
    pub total_countries: u32,
}

/// Parsed region hierarchy with lookup helpers.
#[derive(Debug, Clone)]
pub struct RegionDirectory {
    regions: Vec<RegionWithCountries>,
    by_code: HashMap<String, usize>,
}

impl RegionDirectory {
    pub fn new(response: AllRegionsResponse) -> Self {
        let by_code = response
            .regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.region_code.clone(), i))
            .collect();
        Self {
            regions: response.regions,
            by_code,
        }
    }

    /// All regions in backend order.
    pub fn regions(&self) -> &[RegionWithCountries] {
        &self.regions
    }

    /// Country options for a region, or an empty slice for unknown codes.
    pub fn countries_for(&self, region_code: &str) -> &[Country] {
        self.by_code
            .get(region_code)
            .map(|&i| self.regions[i].countries.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_region(&self, region_code: &str) -> bool {
        self.by_code.contains_key(region_code)
    }
}

/// TTL-cached access to the region hierarchy.
pub struct RegionCatalog {
    api: Arc<ApiClient>,
    cache: moka::sync::Cache<(), Arc<RegionDirectory>>,
}

impl RegionCatalog {
    pub fn new(api: Arc<ApiClient>, ttl: Duration) -> Self {
        let cache = moka::sync::Cache::builder()
            .max_capacity(1)
            .time_to_live(ttl)
            .build();
        Self { api, cache }
    }

    /// Returns the cached directory, fetching from the backend on a miss.
    pub async fn directory(&self) -> Result<Arc<RegionDirectory>> {
        if let Some(directory) = self.cache.get(&()) {
            return Ok(directory);
        }

        debug!("Region catalog cache miss, fetching from backend");
        let response = self.api.regions_countries().await?;
        let directory = Arc::new(RegionDirectory::new(response));
        self.cache.insert((), Arc::clone(&directory));
        Ok(directory)
    }

    /// Drops the cached directory so the next access refetches.
    pub fn invalidate(&self) {
        self.cache.invalidate(&());
    }
}
