//! Consensus parameters for the Obsidian chain.
//!
//! Every field is frozen for the duration of an engine call; networks differ
//! only in the values below. `ConsensusParams::mainnet()` carries the stable
//! network, `ConsensusParams::from_config()` builds private networks from a
//! partial configuration with field-level error reporting.

use std::fmt;

/// Ratio between the modifier interval and a selection-interval section.
/// Baked into the section formula; changing it forks the chain.
pub const MODIFIER_INTERVAL_RATIO: i64 = 3;

/// Base currency unit: subunits per coin.
pub const COIN: i64 = 100_000_000;

/// Network consensus parameters.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
    /// Minimum age of a kernel input before it may stake, in seconds.
    pub stake_min_age: i64,
    /// Upper clamp on the coin-age weight, in seconds.
    pub stake_max_age: i64,
    /// Wall-clock interval between stake-modifier recomputations, in seconds.
    pub modifier_interval: i64,
    /// Target block spacing, in seconds.
    pub target_spacing: i64,
    /// Height after which kernel validation follows V2 semantics.
    pub protocol_v2_height: u32,
    /// Depth a generated output needs before it can stake.
    pub coinbase_maturity: u32,
    /// Low bits of a V2 coinstake timestamp that must be zero.
    pub stake_timestamp_mask: u32,
}

impl ConsensusParams {
    /// Mainnet parameters.
    pub fn mainnet() -> Self {
        Self {
            stake_min_age: 8 * 60 * 60,
            stake_max_age: 90 * 24 * 60 * 60,
            modifier_interval: 10 * 60,
            target_spacing: 64,
            protocol_v2_height: 38_424,
            coinbase_maturity: 500,
            stake_timestamp_mask: 15,
        }
    }

    /// Regression-test parameters: short maturity, early V2 switch.
    pub fn regtest() -> Self {
        Self {
            stake_min_age: 60 * 60,
            stake_max_age: 90 * 24 * 60 * 60,
            modifier_interval: 10 * 60,
            target_spacing: 64,
            protocol_v2_height: 500,
            coinbase_maturity: 10,
            stake_timestamp_mask: 15,
        }
    }

    /// Build parameters from a partial configuration.
    ///
    /// Returns an error naming the specific field that is missing or
    /// invalid.
    pub fn from_config(config: &ConsensusParamsConfig) -> Result<Self, ParamsError> {
        fn required<T: Copy>(field: &'static str, value: Option<T>) -> Result<T, ParamsError> {
            value.ok_or(ParamsError {
                field,
                message: "required field missing".to_string(),
            })
        }

        let params = Self {
            stake_min_age: required("stake_min_age", config.stake_min_age)?,
            stake_max_age: required("stake_max_age", config.stake_max_age)?,
            modifier_interval: required("modifier_interval", config.modifier_interval)?,
            target_spacing: required("target_spacing", config.target_spacing)?,
            protocol_v2_height: required("protocol_v2_height", config.protocol_v2_height)?,
            coinbase_maturity: required("coinbase_maturity", config.coinbase_maturity)?,
            stake_timestamp_mask: required("stake_timestamp_mask", config.stake_timestamp_mask)?,
        };

        if params.modifier_interval <= 0 {
            return Err(ParamsError {
                field: "modifier_interval",
                message: format!("must be positive, got {}", params.modifier_interval),
            });
        }
        if params.target_spacing <= 0 {
            return Err(ParamsError {
                field: "target_spacing",
                message: format!("must be positive, got {}", params.target_spacing),
            });
        }
        if params.stake_min_age < 0 {
            return Err(ParamsError {
                field: "stake_min_age",
                message: format!("must not be negative, got {}", params.stake_min_age),
            });
        }
        if params.stake_max_age < params.stake_min_age {
            return Err(ParamsError {
                field: "stake_max_age",
                message: format!(
                    "must be at least stake_min_age ({}), got {}",
                    params.stake_min_age, params.stake_max_age
                ),
            });
        }
        // The mask selects a contiguous run of low bits.
        if params.stake_timestamp_mask & params.stake_timestamp_mask.wrapping_add(1) != 0 {
            return Err(ParamsError {
                field: "stake_timestamp_mask",
                message: format!(
                    "must be one less than a power of two, got {:#x}",
                    params.stake_timestamp_mask
                ),
            });
        }

        Ok(params)
    }
}

/// Error when constructing [`ConsensusParams`] from configuration.
#[derive(Debug, Clone)]
pub struct ParamsError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "consensus params error for '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ParamsError {}

/// Partial configuration for [`ConsensusParams::from_config`].
///
/// All fields are optional so incomplete configs validate with clear errors.
#[derive(Debug, Clone, Default)]
pub struct ConsensusParamsConfig {
    pub stake_min_age: Option<i64>,
    pub stake_max_age: Option<i64>,
    pub modifier_interval: Option<i64>,
    pub target_spacing: Option<i64>,
    pub protocol_v2_height: Option<u32>,
    pub coinbase_maturity: Option<u32>,
    pub stake_timestamp_mask: Option<u32>,
}

impl From<&ConsensusParams> for ConsensusParamsConfig {
    fn from(params: &ConsensusParams) -> Self {
        Self {
            stake_min_age: Some(params.stake_min_age),
            stake_max_age: Some(params.stake_max_age),
            modifier_interval: Some(params.modifier_interval),
            target_spacing: Some(params.target_spacing),
            protocol_v2_height: Some(params.protocol_v2_height),
            coinbase_maturity: Some(params.coinbase_maturity),
            stake_timestamp_mask: Some(params.stake_timestamp_mask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_params() {
        let params = ConsensusParams::mainnet();
        assert_eq!(params.stake_min_age, 28_800);
        assert_eq!(params.stake_max_age, 7_776_000);
        assert_eq!(params.modifier_interval, 600);
        assert_eq!(params.target_spacing, 64);
        assert_eq!(params.protocol_v2_height, 38_424);
        assert_eq!(params.coinbase_maturity, 500);
        assert_eq!(params.stake_timestamp_mask, 15);
    }

    #[test]
    fn test_from_config_roundtrip() {
        let mainnet = ConsensusParams::mainnet();
        let config = ConsensusParamsConfig::from(&mainnet);
        let rebuilt = ConsensusParams::from_config(&config).unwrap();
        assert_eq!(rebuilt.protocol_v2_height, mainnet.protocol_v2_height);
        assert_eq!(rebuilt.modifier_interval, mainnet.modifier_interval);
    }

    #[test]
    fn test_from_config_missing_field_names_field() {
        let mut config = ConsensusParamsConfig::from(&ConsensusParams::mainnet());
        config.modifier_interval = None;
        let err = ConsensusParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "modifier_interval");
        assert!(err.message.contains("missing"));
    }

    #[test]
    fn test_from_config_rejects_zero_interval() {
        let mut config = ConsensusParamsConfig::from(&ConsensusParams::mainnet());
        config.modifier_interval = Some(0);
        let err = ConsensusParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "modifier_interval");
    }

    #[test]
    fn test_from_config_rejects_inverted_ages() {
        let mut config = ConsensusParamsConfig::from(&ConsensusParams::mainnet());
        config.stake_max_age = Some(10);
        let err = ConsensusParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "stake_max_age");
    }

    #[test]
    fn test_from_config_rejects_sparse_mask() {
        let mut config = ConsensusParamsConfig::from(&ConsensusParams::mainnet());
        for mask in [0u32, 1, 15, 255] {
            config.stake_timestamp_mask = Some(mask);
            assert!(ConsensusParams::from_config(&config).is_ok());
        }
        config.stake_timestamp_mask = Some(0b1010);
        let err = ConsensusParams::from_config(&config).unwrap_err();
        assert_eq!(err.field, "stake_timestamp_mask");
    }
}
