//! Engine Configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Category ids that the role policies grant wholesale.
///
/// These are deployment data, not policy: the policy only knows that
/// Call-Center sees "transaction claims" and Transaction-Claims-Support
/// additionally sees "ATM services".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownCategories {
    /// Transaction claims category id
    pub transaction_claims: String,
    /// ATM services category id
    pub atm_services: String,
}

impl Default for WellKnownCategories {
    fn default() -> Self {
        Self {
            transaction_claims: "TRANSACTION_CLAIMS".into(),
            atm_services: "ATM_SERVICES".into(),
        }
    }
}

/// Visibility engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Well-known category ids
    pub well_known_categories: WellKnownCategories,
    /// Service-name keywords marking claim/dispute work
    pub claim_service_keywords: Vec<String>,
    /// Service-name marker for tickets routed to the dedicated ATM claim view
    pub atm_claim_marker: String,
    /// Page size used when the caller gives none
    pub default_page_size: u32,
    /// Hard cap on page size
    pub max_page_size: u32,
    /// Offset of the bank's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Remaining SLA fraction at or below which a ticket is at-risk
    pub sla_at_risk_ratio: f64,
    /// Batch size used when SLA filtering scans the store
    pub sla_scan_batch_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            well_known_categories: WellKnownCategories::default(),
            claim_service_keywords: vec!["claim".into(), "klaim".into(), "dispute".into()],
            atm_claim_marker: "ATM Claim".into(),
            default_page_size: 10,
            max_page_size: 200,
            utc_offset_minutes: 0,
            sla_at_risk_ratio: 0.25,
            sla_scan_batch_size: 200,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!(path, utc_offset_minutes = config.utc_offset_minutes, "engine config loaded");
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be positive".into()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be within 1..={}",
                self.max_page_size
            )));
        }
        if !(self.sla_at_risk_ratio > 0.0 && self.sla_at_risk_ratio < 1.0) {
            return Err(ConfigError::Invalid("sla_at_risk_ratio must be within (0, 1)".into()));
        }
        if self.sla_scan_batch_size == 0 {
            return Err(ConfigError::Invalid("sla_scan_batch_size must be positive".into()));
        }
        if self.atm_claim_marker.trim().is_empty() {
            return Err(ConfigError::Invalid("atm_claim_marker cannot be empty".into()));
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(ConfigError::Invalid("utc_offset_minutes out of range".into()));
        }
        let wk = &self.well_known_categories;
        if wk.transaction_claims.is_empty() || wk.atm_services.is_empty() {
            return Err(ConfigError::Invalid("well-known category ids cannot be empty".into()));
        }
        Ok(())
    }
}
