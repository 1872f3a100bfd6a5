// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, B256, U256};
use bon::Builder;

use crate::error::{CctpError, Result};
use crate::protocol::{DomainId, TransferType};

/// Arguments of one `depositForBurn` call on TokenMessengerV2.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct DepositForBurnParams {
    amount: U256,
    destination_domain: DomainId,
    /// Recipient left-padded to 32 bytes.
    mint_recipient: B256,
    burn_token: Address,
    /// Zero lets anyone relay the message on the destination chain.
    #[builder(default)]
    destination_caller: B256,
    max_fee: U256,
    #[builder(default)]
    transfer_type: TransferType,
}

impl DepositForBurnParams {
    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn destination_domain(&self) -> DomainId {
        self.destination_domain
    }

    pub fn mint_recipient(&self) -> B256 {
        self.mint_recipient
    }

    pub fn burn_token(&self) -> Address {
        self.burn_token
    }

    pub fn destination_caller(&self) -> B256 {
        self.destination_caller
    }

    pub fn max_fee(&self) -> U256 {
        self.max_fee
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    /// TokenMessengerV2 reverts unless `0 < amount` and `max_fee < amount`.
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_zero() {
            return Err(CctpError::InvalidRequest {
                reason: "amount must be greater than zero".to_string(),
            });
        }
        if self.max_fee >= self.amount {
            return Err(CctpError::InvalidRequest {
                reason: format!(
                    "maxFee {} must be less than amount {}",
                    self.max_fee, self.amount
                ),
            });
        }
        Ok(())
    }
}
