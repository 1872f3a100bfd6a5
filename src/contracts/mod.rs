// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Calldata builders for the three contracts a transfer touches.
//!
//! Each wrapper only encodes calls into unsigned [`TransactionRequest`]s; sending
//! goes through a [`TransactionSigner`](crate::TransactionSigner) and reads go
//! through `eth_call` on a [`MultiEndpointRpcClient`](crate::MultiEndpointRpcClient).
//!
//! - [`Erc20Contract`]: `approve`, `allowance`, `balanceOf`
//! - [`TokenMessengerV2Contract`]: `depositForBurn`
//! - [`MessageTransmitterV2Contract`]: `receiveMessage`

mod erc20;
mod message_transmitter_v2;
mod token_messenger_v2;

use alloy_primitives::{Address, TxKind};
use alloy_rpc_types::{TransactionInput, TransactionRequest};

pub use erc20::{Erc20Contract, IErc20};
pub use message_transmitter_v2::{IMessageTransmitterV2, MessageTransmitterV2Contract};
pub use token_messenger_v2::{ITokenMessengerV2, TokenMessengerV2Contract};

/// Unsigned call to `to` carrying `calldata` in both `input` and `data`, which
/// older nodes still expect.
pub(crate) fn call_request(to: Address, from: Option<Address>, calldata: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        from,
        to: Some(TxKind::Call(to)),
        input: TransactionInput::both(calldata.into()),
        ..Default::default()
    }
}
