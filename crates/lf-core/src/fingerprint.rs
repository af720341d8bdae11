//! Content-based fingerprint of a configuration.

use sha2::{Digest, Sha256};

use crate::config::SimulationConfig;

/// Stable hex fingerprint of a configuration's content.
///
/// Used to detect whether stored results still correspond to the
/// configuration on the job record.
pub fn config_fingerprint(config: &SimulationConfig) -> String {
    let mut hasher = Sha256::new();
    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_stability() {
        let config = SimulationConfig::default();
        assert_eq!(config_fingerprint(&config), config_fingerprint(&config));
    }

    #[test]
    fn fingerprint_differs_for_different_configs() {
        let a = SimulationConfig::default();
        let b = SimulationConfig {
            cells: 80,
            ..SimulationConfig::default()
        };
        assert_ne!(config_fingerprint(&a), config_fingerprint(&b));
    }
}
