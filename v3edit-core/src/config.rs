use serde::{Deserialize, Serialize};
use v3data::labels::SUITABILITY_BANDS;

/// Substitution table used when synthesizing a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
    /// Direct-addressed table over the full 24-bit color space (64 MiB).
    #[default]
    Dense,
    /// Hashed table holding only the colors present in the registry.
    Sparse,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lookup: LookupStrategy,
    /// Maximum undo depth. `None` keeps the whole history; with a cap the
    /// oldest entries are dropped first.
    pub journal_cap: Option<usize>,
    /// Batch replay reports progress every N records.
    pub progress_interval: usize,
    /// Band names for numerical layers, lowest first.
    pub suitability_bands: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup: LookupStrategy::Dense,
            journal_cap: None,
            progress_interval: 50,
            suitability_bands: SUITABILITY_BANDS.iter().map(|b| b.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.lookup, LookupStrategy::Dense);
        assert_eq!(config.journal_cap, None);
        assert_eq!(config.progress_interval, 50);
        assert_eq!(config.suitability_bands.len(), 5);
        assert_eq!(config.suitability_bands[2], "Favourable");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"lookup": "sparse", "journal_cap": 100}"#).unwrap();
        assert_eq!(config.lookup, LookupStrategy::Sparse);
        assert_eq!(config.journal_cap, Some(100));
        assert_eq!(config.progress_interval, 50);
    }
}
