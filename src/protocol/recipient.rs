// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! `bytes32` form of EVM addresses used for `mintRecipient` and `destinationCaller`.

use alloy_primitives::{Address, B256};

use crate::error::{CctpError, Result};

/// Left-pads a 20-byte address to 32 bytes (12 zero bytes, then the address).
#[inline]
pub fn address_to_bytes32(address: Address) -> B256 {
    address.into_word()
}

/// Recovers the address from its padded form.
///
/// Fails when any of the 12 leading bytes is non-zero, since such a word cannot
/// have come from an EVM address.
pub fn bytes32_to_address(word: B256) -> Result<Address> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(CctpError::InvalidRequest {
            reason: format!("{word} is not a left-padded EVM address"),
        });
    }
    Ok(Address::from_word(word))
}
