// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! TokenMessengerV2 `depositForBurn` encoding.

use alloy_primitives::Address;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use tracing::debug;

use super::call_request;
use crate::bridge::DepositForBurnParams;

sol! {
    interface ITokenMessengerV2 {
        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold
        ) external;
    }
}

/// The CCTP v2 TokenMessenger contract wrapper.
#[derive(Debug, Clone, Copy)]
pub struct TokenMessengerV2Contract {
    address: Address,
}

impl TokenMessengerV2Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Unsigned `depositForBurn` transaction sent by `from`.
    pub fn deposit_for_burn_transaction(
        &self,
        from: Address,
        params: &DepositForBurnParams,
    ) -> TransactionRequest {
        debug!(
            token_messenger = %self.address,
            destination_domain = params.destination_domain().as_u32(),
            amount = %params.amount(),
            max_fee = %params.max_fee(),
            min_finality_threshold = params.transfer_type().finality_threshold(),
            event = "deposit_for_burn_transaction_created"
        );

        let calldata = ITokenMessengerV2::depositForBurnCall {
            amount: params.amount(),
            destinationDomain: params.destination_domain().as_u32(),
            mintRecipient: params.mint_recipient(),
            burnToken: params.burn_token(),
            destinationCaller: params.destination_caller(),
            maxFee: params.max_fee(),
            minFinalityThreshold: params.transfer_type().finality_threshold(),
        }
        .abi_encode();

        call_request(self.address, Some(from), calldata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{address_to_bytes32, DomainId, TransferType};
    use alloy_primitives::{B256, U256};
    use rstest::rstest;

    #[rstest]
    #[case(TransferType::Fast, 1000)]
    #[case(TransferType::Standard, 2000)]
    fn test_deposit_for_burn_calldata(#[case] transfer_type: TransferType, #[case] threshold: u32) {
        let recipient = Address::repeat_byte(0x42);
        let burn_token = Address::repeat_byte(0x11);
        let params = DepositForBurnParams::builder()
            .amount(U256::from(1_000_000u64))
            .destination_domain(DomainId::Base)
            .mint_recipient(address_to_bytes32(recipient))
            .burn_token(burn_token)
            .max_fee(U256::from(999_999u64))
            .transfer_type(transfer_type)
            .build();

        let messenger = Address::repeat_byte(0x99);
        let tx = TokenMessengerV2Contract::new(messenger)
            .deposit_for_burn_transaction(Address::repeat_byte(0x01), &params);

        let decoded =
            ITokenMessengerV2::depositForBurnCall::abi_decode(tx.input.input().unwrap()).unwrap();
        assert_eq!(decoded.amount, U256::from(1_000_000u64));
        assert_eq!(decoded.destinationDomain, 6);
        assert_eq!(decoded.mintRecipient, recipient.into_word());
        assert_eq!(decoded.burnToken, burn_token);
        assert_eq!(decoded.destinationCaller, B256::ZERO);
        assert_eq!(decoded.maxFee, U256::from(999_999u64));
        assert_eq!(decoded.minFinalityThreshold, threshold);
    }
}
