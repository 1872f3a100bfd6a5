// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer speed selection.
//!
//! The speed a caller asks for maps one-to-one onto the `minFinalityThreshold`
//! argument of `depositForBurn`: the attestation service signs a burn once the
//! source chain reaches that level of finality.
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CctpError;

/// Requested transfer speed.
///
/// ```rust
/// use cctp_orchestrator::TransferType;
///
/// assert_eq!(TransferType::Fast.finality_threshold(), 1000);
/// assert_eq!(TransferType::Standard.finality_threshold(), 2000);
/// assert_eq!("fast".parse::<TransferType>().unwrap(), TransferType::Fast);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum TransferType {
    /// Attested at the confirmed block level.
    Fast = 1000,
    /// Attested at the finalized block level.
    #[default]
    Standard = 2000,
}

impl TransferType {
    /// Finality threshold passed to `depositForBurn`.
    #[inline]
    pub const fn finality_threshold(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_finality_threshold(value: u32) -> Option<Self> {
        match value {
            1000 => Some(Self::Fast),
            2000 => Some(Self::Standard),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
        }
    }
}

impl FromStr for TransferType {
    type Err = CctpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "standard" => Ok(Self::Standard),
            other => Err(CctpError::InvalidRequest {
                reason: format!("unknown transfer type '{other}', expected 'fast' or 'standard'"),
            }),
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.finality_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransferType::Fast, 1000)]
    #[case(TransferType::Standard, 2000)]
    fn test_finality_threshold(#[case] transfer_type: TransferType, #[case] threshold: u32) {
        assert_eq!(transfer_type.finality_threshold(), threshold);
        assert_eq!(
            TransferType::from_finality_threshold(threshold),
            Some(transfer_type)
        );
    }

    #[test]
    fn test_default_is_standard() {
        assert_eq!(TransferType::default(), TransferType::Standard);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Fast".parse::<TransferType>().unwrap(), TransferType::Fast);
        assert_eq!(
            " standard ".parse::<TransferType>().unwrap(),
            TransferType::Standard
        );
        assert!("instant".parse::<TransferType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransferType::Fast).unwrap(),
            r#""fast""#
        );
        let parsed: TransferType = serde_json::from_str(r#""standard""#).unwrap();
        assert_eq!(parsed, TransferType::Standard);
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferType::Fast.to_string(), "fast (1000)");
    }
}
