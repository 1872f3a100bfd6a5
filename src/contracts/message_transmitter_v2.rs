// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! MessageTransmitterV2 `receiveMessage` encoding.

use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use tracing::debug;

use super::call_request;

sol! {
    interface IMessageTransmitterV2 {
        function receiveMessage(bytes message, bytes attestation) external returns (bool success);
    }
}

/// The CCTP v2 MessageTransmitter contract wrapper.
#[derive(Debug, Clone, Copy)]
pub struct MessageTransmitterV2Contract {
    address: Address,
}

impl MessageTransmitterV2Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Unsigned `receiveMessage` transaction; both payloads are passed through untouched.
    pub fn receive_message_transaction(
        &self,
        from: Address,
        message: &Bytes,
        attestation: &Bytes,
    ) -> TransactionRequest {
        debug!(
            message_transmitter = %self.address,
            message_len = message.len(),
            attestation_len = attestation.len(),
            event = "receive_message_transaction_created"
        );
        let calldata = IMessageTransmitterV2::receiveMessageCall {
            message: message.clone(),
            attestation: attestation.clone(),
        }
        .abi_encode();
        call_request(self.address, Some(from), calldata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_are_forwarded_verbatim() {
        let message = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let attestation = Bytes::from(vec![0x12; 65]);

        let tx = MessageTransmitterV2Contract::new(Address::repeat_byte(0x77))
            .receive_message_transaction(Address::repeat_byte(0x01), &message, &attestation);

        let decoded =
            IMessageTransmitterV2::receiveMessageCall::abi_decode(tx.input.input().unwrap())
                .unwrap();
        assert_eq!(decoded.message, message);
        assert_eq!(decoded.attestation, attestation);
    }
}
