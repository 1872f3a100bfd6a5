// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain metadata: contract addresses, domain ids, RPC endpoints and the
//! [`ChainRegistry`] built from them.

mod addresses;
mod cctp_chain;
mod registry;

pub use addresses::{
    CCTP_V2_MESSAGE_TRANSMITTER_MAINNET, CCTP_V2_MESSAGE_TRANSMITTER_TESTNET,
    CCTP_V2_TOKEN_MESSENGER_MAINNET, CCTP_V2_TOKEN_MESSENGER_TESTNET,
};
pub use cctp_chain::CctpChain;
pub use registry::{
    endpoint_env_key, ChainDescriptor, ChainRegistry, DEFAULT_MIN_GAS_BALANCE_WEI,
    RPC_URLS_ENV_PREFIX,
};
