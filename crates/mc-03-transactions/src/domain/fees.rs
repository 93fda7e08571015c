//! The size-based minimum-fee schedule.
//!
//! A fee buys serialized bytes: one token per `bytes_per_token` bytes of
//! wire encoding, floored, with `minimum_fee` as the absolute floor. The
//! rate differs between mempool admission and miner inclusion; consensus
//! validation accepts any fee.

use shared_types::ChainConfig;

/// Who is asking whether the fee suffices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeRole {
    /// Mempool admission.
    Pool,
    /// Miner inclusion.
    Miner,
    /// Consensus validation: any fee is acceptable.
    Validation,
}

/// Minimum fee for a transaction of `size_bytes` serialized bytes.
pub fn min_fee(config: &ChainConfig, size_bytes: usize, role: FeeRole) -> u64 {
    let bytes_per_token = match role {
        FeeRole::Pool => config.pool_fee_bytes_per_token,
        FeeRole::Miner => config.miner_fee_bytes_per_token,
        FeeRole::Validation => return 0,
    };
    let size_fee = if bytes_per_token == 0 {
        0
    } else {
        size_bytes as u64 / bytes_per_token
    };
    config.minimum_fee.max(size_fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_accepts_any_fee() {
        let config = ChainConfig::default();
        assert_eq!(min_fee(&config, 10_000, FeeRole::Validation), 0);
    }

    #[test]
    fn test_minimum_fee_is_a_floor() {
        let config = ChainConfig::default();
        // A tiny transaction still costs the configured minimum.
        assert_eq!(min_fee(&config, 10, FeeRole::Pool), config.minimum_fee);
    }

    #[test]
    fn test_miner_rate_is_steeper_than_pool_rate() {
        let config = ChainConfig::default();
        let size = 3_000;
        assert!(min_fee(&config, size, FeeRole::Miner) >= min_fee(&config, size, FeeRole::Pool));
    }

    #[test]
    fn test_size_fee_scales_by_bytes_per_token() {
        let config = ChainConfig {
            minimum_fee: 1,
            pool_fee_bytes_per_token: 300,
            ..ChainConfig::default()
        };
        assert_eq!(min_fee(&config, 900, FeeRole::Pool), 3);
        assert_eq!(min_fee(&config, 899, FeeRole::Pool), 2);
    }
}
