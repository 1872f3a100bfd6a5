// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCTP domain identifiers.
//!
//! A domain is CCTP's own numbering of the chains it connects and is unrelated
//! to the EVM chain id. Testnets share the domain of their mainnet.
//!
//! Reference: <https://developers.circle.com/stablecoins/evm-smart-contracts>

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CctpError;

/// CCTP domain identifier for the EVM chains this crate routes between.
///
/// # Example
///
/// ```rust
/// use cctp_orchestrator::DomainId;
///
/// let domain: u32 = DomainId::Base.into();
/// assert_eq!(domain, 6);
/// assert_eq!(DomainId::from_u32(3), Some(DomainId::Arbitrum));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    Ethereum = 0,
    Avalanche = 1,
    Optimism = 2,
    Arbitrum = 3,
    Base = 6,
    Polygon = 7,
    Unichain = 10,
    Linea = 11,
}

impl DomainId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            10 => Some(Self::Unichain),
            11 => Some(Self::Linea),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
            Self::Unichain => "Unichain",
            Self::Linea => "Linea",
        }
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = CctpError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value)
            .ok_or_else(|| CctpError::InvalidConfig(format!("unknown CCTP domain id {value}")))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}
