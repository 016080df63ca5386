//! User-declared fee policy.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Fee policy declared by the user. All prices are in wei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasConfig {
    /// Legacy gas price, exclusive with the EIP-1559 fields
    pub gas_price: Option<u128>,
    /// EIP-1559 fee cap
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 tip cap
    pub max_priority_fee_per_gas: Option<u128>,
    /// Explicit gas limit; disables estimation and the multiplier
    pub gas_limit: Option<u64>,
    /// Applied to a simulated estimate when no explicit limit is given
    pub gas_multiplier: f64,
    /// Refuse to submit anything priced above this
    pub max_gas_price: Option<u128>,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_price: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            gas_limit: None,
            gas_multiplier: 1.0,
            max_gas_price: None,
        }
    }
}

impl GasConfig {
    /// Check the invariants that do not need the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let eip1559 = self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some();
        if self.gas_price.is_some() && eip1559 {
            return Err(ConfigError::ConflictingFeeModes);
        }

        if self.max_fee_per_gas.is_some() != self.max_priority_fee_per_gas.is_some() {
            return Err(ConfigError::IncompleteEip1559Fees);
        }

        if !self.gas_multiplier.is_finite() || self.gas_multiplier < 1.0 {
            return Err(ConfigError::InvalidGasMultiplier(self.gas_multiplier));
        }

        Ok(())
    }

    /// Explicit gas limit, with zero treated as "not set".
    pub fn explicit_gas_limit(&self) -> Option<u64> {
        self.gas_limit.filter(|limit| *limit > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_legacy_and_eip1559_conflict() {
        let config = GasConfig {
            gas_price: Some(1),
            max_priority_fee_per_gas: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingFeeModes)
        ));
    }

    #[test]
    fn test_half_eip1559_is_rejected() {
        let config = GasConfig {
            max_fee_per_gas: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IncompleteEip1559Fees)
        ));
    }

    #[test]
    fn test_multiplier_below_one_is_rejected() {
        for multiplier in [0.0, 0.99, -1.0, f64::NAN] {
            let config = GasConfig {
                gas_multiplier: multiplier,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidGasMultiplier(_))
            ));
        }
    }

    #[test]
    fn test_zero_gas_limit_means_unset() {
        let config = GasConfig {
            gas_limit: Some(0),
            ..Default::default()
        };
        assert_eq!(config.explicit_gas_limit(), None);
    }
}
