// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer, Serialize};

/// Response from `GET /v2/messages/{sourceDomain}?transactionHash={hash}`.
///
/// A single burn transaction can emit several messages, so the payload wraps
/// them in an array. Only the first one is consumed by the poller.
///
/// ```json
/// {
///   "messages": [
///     { "status": "complete", "message": "0x...", "attestation": "0x..." }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct V2AttestationResponse {
    #[serde(default)]
    pub messages: Vec<V2Message>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Message {
    pub status: AttestationStatus,

    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,

    /// Null or the literal string `PENDING` until signed.
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

impl V2Message {
    /// Returns the signed payload once both halves are present and the status is complete.
    pub fn completed(&self) -> Option<AttestationMessage> {
        match (&self.status, &self.message, &self.attestation) {
            (AttestationStatus::Complete, Some(message), Some(attestation)) => {
                Some(AttestationMessage {
                    message: message.clone(),
                    attestation: attestation.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Signed burn message, forwarded verbatim into `receiveMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationMessage {
    pub message: Bytes,
    pub attestation: Bytes,
}

fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete_response() {
        let json = r#"{
            "messages": [
                {
                    "status": "complete",
                    "message": "0xdeadbeef",
                    "attestation": "0x1234abcd",
                    "eventNonce": "42",
                    "cctpVersion": 2
                }
            ]
        }"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        let completed = response.messages[0].completed().unwrap();
        assert_eq!(completed.message.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(completed.attestation.to_vec(), vec![0x12, 0x34, 0xab, 0xcd]);
    }

    #[test]
    fn test_pending_attestation_string_is_none() {
        let json = r#"{"messages":[{"status":"pending","message":"0xdeadbeef","attestation":"PENDING"}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.messages[0].status, AttestationStatus::Pending);
        assert!(response.messages[0].attestation.is_none());
        assert!(response.messages[0].completed().is_none());
    }

    #[test]
    fn test_complete_without_attestation_is_not_usable() {
        let json = r#"{"messages":[{"status":"complete","message":"0xdeadbeef","attestation":null}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        assert!(response.messages[0].completed().is_none());
    }

    #[test]
    fn test_missing_messages_defaults_to_empty() {
        let response: V2AttestationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.messages.is_empty());
    }

    #[test]
    fn test_pending_confirmations_status() {
        let json = r#"{"messages":[{"status":"pending_confirmations"}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.messages[0].status,
            AttestationStatus::PendingConfirmations
        );
    }

    #[test]
    fn test_invalid_hex_fails() {
        let json = r#"{"messages":[{"status":"complete","message":"0xZZ","attestation":"0x00"}]}"#;
        assert!(serde_json::from_str::<V2AttestationResponse>(json).is_err());
    }
}
