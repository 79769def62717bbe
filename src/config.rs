//! Connector configuration.
//!
//! Loaded from a JSON file: the API client identifier, a pre-issued
//! access token, the account set, and optionally a custom metrics map.
//! When no metrics map is given, the Sponsored Display defaults are used.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::api::config::DEFAULT_BASE_URL;
use crate::{Account, RecordType};

/// Map from report type to the metric names requested for it.
pub type MetricsMap = BTreeMap<RecordType, Vec<String>>;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// Config file was not valid JSON or had the wrong shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Config loaded but failed validation
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Connector configuration supplied by the operator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// API client identifier attached to every request
    pub client_id: String,
    /// Pre-issued access token for the static authenticator
    pub access_token: String,
    /// API base URL; overridable for testing
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Accounts to generate reports for
    pub accounts: Vec<Account>,
    /// Metric names per report type
    #[serde(default = "sponsored_display_metrics")]
    pub metrics: MetricsMap,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl SyncConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::Invalid("clientId cannot be empty".to_string()));
        }
        if self.access_token.is_empty() {
            return Err(ConfigError::Invalid(
                "accessToken cannot be empty".to_string(),
            ));
        }
        if self.accounts.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one account is required".to_string(),
            ));
        }
        // A duplicated account would submit two jobs for the same
        // (account, report type, date) triple.
        let mut seen = std::collections::BTreeSet::new();
        if let Some(dup) = self.accounts.iter().find(|a| !seen.insert(a.id)) {
            return Err(ConfigError::Invalid(format!(
                "duplicate account id {}",
                dup.id
            )));
        }
        if self.metrics.is_empty() {
            return Err(ConfigError::Invalid(
                "metrics map cannot be empty".to_string(),
            ));
        }
        if let Some((record_type, _)) = self.metrics.iter().find(|(_, names)| names.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "metrics list for {record_type} cannot be empty"
            )));
        }
        Ok(())
    }
}

/// Default metric sets for Sponsored Display reports.
///
/// Attribution metrics the API rejects for campaign reports are left out.
pub fn sponsored_display_metrics() -> MetricsMap {
    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    let mut map = MetricsMap::new();
    map.insert(
        RecordType::Campaigns,
        names(&[
            "campaignName",
            "campaignId",
            "impressions",
            "clicks",
            "cost",
            "currency",
        ]),
    );
    map.insert(
        RecordType::AdGroups,
        names(&[
            "campaignName",
            "campaignId",
            "adGroupName",
            "adGroupId",
            "impressions",
            "clicks",
            "cost",
            "currency",
            "attributedConversions1d",
            "attributedConversions7d",
            "attributedConversions14d",
            "attributedConversions30d",
            "attributedConversions1dSameSKU",
            "attributedConversions7dSameSKU",
            "attributedConversions14dSameSKU",
            "attributedConversions30dSameSKU",
            "attributedUnitsOrdered1d",
            "attributedUnitsOrdered7d",
            "attributedUnitsOrdered14d",
            "attributedUnitsOrdered30d",
            "attributedSales1d",
            "attributedSales7d",
            "attributedSales14d",
            "attributedSales30d",
            "attributedSales1dSameSKU",
            "attributedSales7dSameSKU",
            "attributedSales14dSameSKU",
            "attributedSales30dSameSKU",
            "attributedOrdersNewToBrand14d",
            "attributedSalesNewToBrand14d",
            "attributedUnitsOrderedNewToBrand14d",
        ]),
    );
    map.insert(
        RecordType::ProductAds,
        names(&[
            "campaignName",
            "campaignId",
            "adGroupName",
            "adGroupId",
            "asin",
            "sku",
            "adId",
            "impressions",
            "clicks",
            "cost",
            "currency",
            "attributedConversions1d",
            "attributedConversions7d",
            "attributedConversions14d",
            "attributedConversions30d",
            "attributedConversions1dSameSKU",
            "attributedConversions7dSameSKU",
            "attributedConversions14dSameSKU",
            "attributedConversions30dSameSKU",
            "attributedUnitsOrdered1d",
            "attributedUnitsOrdered7d",
            "attributedUnitsOrdered14d",
            "attributedUnitsOrdered30d",
            "attributedSales1d",
            "attributedSales7d",
            "attributedSales14d",
            "attributedSales30d",
            "attributedSales1dSameSKU",
            "attributedSales7dSameSKU",
            "attributedSales14dSameSKU",
            "attributedSales30dSameSKU",
            "attributedOrdersNewToBrand14d",
            "attributedSalesNewToBrand14d",
            "attributedUnitsOrderedNewToBrand14d",
        ]),
    );
    map.insert(
        RecordType::Targets,
        names(&[
            "campaignName",
            "campaignId",
            "adGroupName",
            "adGroupId",
            "targetId",
            "targetingExpression",
            "targetingText",
            "targetingType",
            "impressions",
            "clicks",
            "cost",
            "currency",
            "attributedConversions1d",
            "attributedConversions7d",
            "attributedConversions14d",
            "attributedConversions30d",
            "attributedConversions1dSameSKU",
            "attributedConversions7dSameSKU",
            "attributedConversions14dSameSKU",
            "attributedConversions30dSameSKU",
            "attributedUnitsOrdered1d",
            "attributedUnitsOrdered7d",
            "attributedUnitsOrdered14d",
            "attributedUnitsOrdered30d",
            "attributedSales1d",
            "attributedSales7d",
            "attributedSales14d",
            "attributedSales30d",
            "attributedSales1dSameSKU",
            "attributedSales7dSameSKU",
            "attributedSales14dSameSKU",
            "attributedSales30dSameSKU",
            "attributedOrdersNewToBrand14d",
            "attributedSalesNewToBrand14d",
            "attributedUnitsOrderedNewToBrand14d",
        ]),
    );
    map.insert(
        RecordType::Asins,
        names(&[
            "campaignName",
            "campaignId",
            "adGroupName",
            "adGroupId",
            "asin",
            "otherAsin",
            "sku",
            "currency",
            "attributedUnitsOrdered1dOtherSKU",
            "attributedUnitsOrdered7dOtherSKU",
            "attributedUnitsOrdered14dOtherSKU",
            "attributedUnitsOrdered30dOtherSKU",
            "attributedSales1dOtherSKU",
            "attributedSales7dOtherSKU",
            "attributedSales14dOtherSKU",
            "attributedSales30dOtherSKU",
        ]),
    );
    map
}
