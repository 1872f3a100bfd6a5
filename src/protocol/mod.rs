// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCTP protocol types: domain identifiers, transfer speed, attestation payloads
//! and the `bytes32` recipient encoding.

mod attestation;
mod domain_id;
mod recipient;
mod transfer_type;

pub use attestation::{AttestationMessage, AttestationStatus, V2AttestationResponse, V2Message};
pub use domain_id::DomainId;
pub use recipient::{address_to_bytes32, bytes32_to_address};
pub use transfer_type::TransferType;
