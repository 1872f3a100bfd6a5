// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! ERC20 calls needed before a burn: allowance and balance checks, and approval.

use alloy_primitives::{Address, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall, SolValue};
use tracing::debug;

use super::call_request;
use crate::error::Result;

sol! {
    interface IErc20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// ERC20 (USDC) contract wrapper.
///
/// ```rust
/// use cctp_orchestrator::contracts::Erc20Contract;
/// use alloy_primitives::{address, U256};
///
/// let usdc = Erc20Contract::new(address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"));
/// let owner = address!("1234567890123456789012345678901234567890");
/// let spender = address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");
///
/// let tx = usdc.approve_transaction(owner, spender, U256::from(10_000_000_000u64));
/// assert_eq!(tx.from, Some(owner));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Erc20Contract {
    address: Address,
}

impl Erc20Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn approve_transaction(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        debug!(
            token = %self.address,
            spender = %spender,
            amount = %amount,
            event = "approve_transaction_created"
        );
        let calldata = IErc20::approveCall { spender, amount }.abi_encode();
        call_request(self.address, Some(from), calldata)
    }

    /// `eth_call` request for `allowance(owner, spender)`.
    pub fn allowance_call(&self, owner: Address, spender: Address) -> TransactionRequest {
        let calldata = IErc20::allowanceCall { owner, spender }.abi_encode();
        call_request(self.address, None, calldata)
    }

    /// `eth_call` request for `balanceOf(account)`.
    pub fn balance_of_call(&self, account: Address) -> TransactionRequest {
        let calldata = IErc20::balanceOfCall { account }.abi_encode();
        call_request(self.address, None, calldata)
    }

    /// Decodes the `uint256` returned by `allowance` or `balanceOf`.
    pub fn decode_uint256(output: &[u8]) -> Result<U256> {
        Ok(U256::abi_decode(output)?)
    }
}
