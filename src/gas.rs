// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Gas limit and fee arithmetic.
//!
//! The mint on the destination chain is submitted after a wait that can last
//! many minutes, so its gas limit and fee caps are deliberately over-provisioned:
//! the estimate gets a percentage buffer and both EIP-1559 caps are multiplied.
//! The chain still charges only `baseFee + tip`.

use serde::{Deserialize, Serialize};

/// Default gas buffer percentage applied to `receiveMessage` estimates (50%)
pub const DEFAULT_GAS_BUFFER_PERCENT: u64 = 50;

/// Default multiplier applied to both EIP-1559 fee caps
pub const DEFAULT_FEE_MULTIPLIER: u128 = 2;

/// Current fee market of a chain, as reported by its RPC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    /// Legacy gas price.
    pub gas_price: Option<u128>,
    /// `None` on chains without EIP-1559.
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// Returns a copy with every present value multiplied by `multiplier`.
    pub fn scaled(&self, multiplier: u128) -> Self {
        let scale = |fee: Option<u128>| fee.map(|f| f.saturating_mul(multiplier));
        Self {
            gas_price: scale(self.gas_price),
            max_fee_per_gas: scale(self.max_fee_per_gas),
            max_priority_fee_per_gas: scale(self.max_priority_fee_per_gas),
        }
    }

    #[inline]
    pub fn is_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some() && self.max_priority_fee_per_gas.is_some()
    }
}

/// Adds `buffer_percent` to a gas estimate: `estimate * (100 + buffer) / 100`.
///
/// Saturates at `u64::MAX`, so the result is never below `estimate`.
///
/// ```rust
/// use cctp_orchestrator::gas::apply_gas_buffer;
///
/// assert_eq!(apply_gas_buffer(100_000, 50), 150_000);
/// ```
#[inline]
pub fn apply_gas_buffer(estimate: u64, buffer_percent: u64) -> u64 {
    let buffered = u128::from(estimate) * (100 + u128::from(buffer_percent)) / 100;
    u64::try_from(buffered).unwrap_or(u64::MAX)
}

/// Derives EIP-1559 caps from the latest base fee and a priority fee.
///
/// Returns `(max_fee_per_gas, max_priority_fee_per_gas)` where the priority fee
/// carries `buffer_percent` and `max_fee = 2 * base_fee + priority`.
///
/// ```rust
/// use cctp_orchestrator::gas::calculate_gas_price_with_buffer;
///
/// let (max_fee, priority) = calculate_gas_price_with_buffer(30_000_000_000, 2_000_000_000, 0);
/// assert_eq!(priority, 2_000_000_000);
/// assert_eq!(max_fee, 62_000_000_000);
/// ```
pub fn calculate_gas_price_with_buffer(
    base_fee: u128,
    max_priority_fee: u128,
    buffer_percent: u64,
) -> (u128, u128) {
    let buffered_priority =
        max_priority_fee.saturating_mul(100 + buffer_percent as u128) / 100;
    let max_fee = base_fee.saturating_mul(2).saturating_add(buffered_priority);

    (max_fee, buffered_priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_buffer() {
        assert_eq!(apply_gas_buffer(200_000, DEFAULT_GAS_BUFFER_PERCENT), 300_000);
        assert_eq!(apply_gas_buffer(21_000, 0), 21_000);
    }

    #[test]
    fn test_gas_buffer_never_shrinks_estimate() {
        assert_eq!(apply_gas_buffer(u64::MAX, 50), u64::MAX);
        assert_eq!(apply_gas_buffer(u64::MAX / 100, 50), u64::MAX / 100 * 3 / 2);
        assert_eq!(apply_gas_buffer(1_000, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_gas_price_with_buffer() {
        let base_fee = 30_000_000_000u128; // 30 gwei
        let priority_fee = 2_000_000_000u128; // 2 gwei

        let (max_fee, max_priority) = calculate_gas_price_with_buffer(base_fee, priority_fee, 20);

        assert_eq!(max_priority, 2_400_000_000);
        assert_eq!(max_fee, 62_400_000_000);
    }

    #[test]
    fn test_fee_data_scaled() {
        let fees = FeeData {
            gas_price: Some(10),
            max_fee_per_gas: Some(30),
            max_priority_fee_per_gas: Some(2),
        };

        let doubled = fees.scaled(DEFAULT_FEE_MULTIPLIER);
        assert_eq!(doubled.gas_price, Some(20));
        assert_eq!(doubled.max_fee_per_gas, Some(60));
        assert_eq!(doubled.max_priority_fee_per_gas, Some(4));
        assert!(doubled.is_eip1559());
    }

    #[test]
    fn test_legacy_fee_data_stays_legacy() {
        let fees = FeeData {
            gas_price: Some(7),
            ..Default::default()
        }
        .scaled(2);

        assert_eq!(fees.gas_price, Some(14));
        assert!(!fees.is_eip1559());
    }
}
