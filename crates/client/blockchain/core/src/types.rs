//! Common types for ledger interactions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unsigned 256-bit amount in the ledger's smallest native unit.
pub type Wei = primitive_types::U256;

/// Upper bound on roster slots the client will ever scan.
pub const MAX_PARTICIPANTS: usize = 10;

/// Entry fee in whole ether.
pub const ENTRY_FEE_ETHER: u64 = 1;

/// Minimum roster size before the contract accepts a winner selection.
///
/// Enforced by the contract; mirrored locally for UI gating only.
pub const MIN_PARTICIPANTS_FOR_DRAW: usize = 3;

pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Convert whole ether into wei.
pub fn ether(amount: u64) -> Wei {
    Wei::from(amount) * Wei::from(WEI_PER_ETHER)
}

/// The fixed entry fee in wei.
pub fn entry_fee() -> Wei {
    ether(ENTRY_FEE_ETHER)
}

// ============================================================================
// Address
// ============================================================================

/// 20-byte account or contract identifier.
///
/// Text forms are parsed case-insensitively, so two checksummed and
/// lowercase renderings of the same account compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

#[derive(Debug, thiserror::Error)]
pub enum AddressParseError {
    #[error("invalid hex in address: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl Address {
    pub const LEN: usize = 20;

    /// Canonical "unassigned" value.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Abbreviated form for display, e.g. `0x1234...abcd`.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits)?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(bytes.len()))?;

        Ok(Self(array))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransactionId(pub [u8; 32]);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.short())
    }
}

/// Proof that a submitted transaction was accepted by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction: TransactionId,
    pub block_number: u64,
}

// ============================================================================
// Events
// ============================================================================

/// Block from which a subscription starts observing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// Only blocks produced after the subscription starts.
    Latest,
    Number(u64),
}

/// The two push-event kinds the lottery contract emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum EventKind {
    #[strum(to_string = "participantsEntered")]
    ParticipantEntered,
    #[strum(to_string = "WinnerSelected")]
    WinnerSelected,
}

/// Identity of the log entry a ledger event was decoded from.
///
/// Two deliveries with the same origin are the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventOrigin {
    pub transaction: TransactionId,
    pub log_index: u64,
    pub block_number: u64,
}

/// Decoded contract event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    ParticipantEntered {
        participant: Address,
        origin: EventOrigin,
    },
    WinnerSelected {
        record: crate::lottery::WinnerRecord,
        origin: EventOrigin,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::ParticipantEntered { .. } => EventKind::ParticipantEntered,
            LedgerEvent::WinnerSelected { .. } => EventKind::WinnerSelected,
        }
    }

    pub fn origin(&self) -> &EventOrigin {
        match self {
            LedgerEvent::ParticipantEntered { origin, .. } => origin,
            LedgerEvent::WinnerSelected { origin, .. } => origin,
        }
    }
}

/// Notifications raised by the wallet/account provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// Active accounts changed; empty means the wallet disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

// ============================================================================
// Configuration
// ============================================================================

/// Chain-specific configuration.
///
/// This is a trait to allow different ledgers to provide their own config types.
pub trait LedgerConfig: Send + Sync {
    /// Human-readable network name (e.g., "evm-local", "evm-sepolia")
    fn network_name(&self) -> &str;

    /// RPC endpoint URL
    fn rpc_url(&self) -> &str;

    /// Validate configuration before any connection is attempted
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parsing_ignores_case() {
        let lower: Address = "0xb9e2a2008d3a58add8cc1ce9c15bf6d4bb9c6d72".parse().unwrap();
        let mixed: Address = "0xB9e2A2008d3A58adD8CC1cE9c15BF6D4bB9C6d72".parse().unwrap();
        let bare: Address = "B9E2A2008D3A58ADD8CC1CE9C15BF6D4BB9C6D72".parse().unwrap();

        assert_eq!(lower, mixed);
        assert_eq!(lower, bare);
        assert_eq!(
            mixed.to_string(),
            "0xb9e2a2008d3a58add8cc1ce9c15bf6d4bb9c6d72"
        );
    }

    #[test]
    fn address_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressParseError::InvalidLength(2)));
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let address: Address = "0xB9e2A2008d3A58adD8CC1cE9c15BF6D4bB9C6d72".parse().unwrap();
        assert_eq!(address.short(), "0xb9e2...6d72");
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn address_serde_uses_hex_text() {
        let address = Address([0xab; 20]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn entry_fee_is_one_ether() {
        assert_eq!(entry_fee(), Wei::from(10u64).pow(Wei::from(18u64)));
    }
}
