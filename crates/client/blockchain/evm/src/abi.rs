//! ABI encoding helpers for the lottery contract.
//!
//! Only the handful of shapes the contract uses are supported: zero or one
//! `uint256` argument, and `address`/`uint256` return and event words.
//!
//! ## Conversion Categories
//!
//! 1. **Selectors and topics**: Keccak-256 of the canonical signature
//! 2. **Words**: 32-byte big-endian slots ↔ `Address` / `Wei`
//! 3. **Quantities**: `0x`-prefixed JSON-RPC hex numbers ↔ `u64` / `Wei`

use client_blockchain_core::{Address, TransactionId, Wei};
use sha3::{Digest, Keccak256};

/// One 32-byte ABI slot.
pub type Word = [u8; 32];

/// Canonical signatures of the deployed contract.
///
/// `Selectwinner` keeps the capitalization it was deployed with.
pub mod signatures {
    pub const MANAGER: &str = "manager()";
    pub const PARTICIPANTS: &str = "participants(uint256)";
    pub const SELECT_WINNER: &str = "Selectwinner()";
    pub const PARTICIPANTS_ENTERED: &str = "participantsEntered(address)";
    pub const WINNER_SELECTED: &str = "WinnerSelected(address,uint256)";
}

#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("ABI data length {0} is not a multiple of 32")]
    Misaligned(usize),

    #[error("expected at least {expected} words, got {actual}")]
    MissingWords { expected: usize, actual: usize },

    #[error("invalid quantity {0:?}")]
    Quantity(String),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

// ============================================================================
// Hashing
// ============================================================================

pub fn keccak256(data: &[u8]) -> Word {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the signature hash.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Topic 0 of an event with the given signature.
pub fn event_topic(signature: &str) -> Word {
    keccak256(signature.as_bytes())
}

// ============================================================================
// Encoding
// ============================================================================

pub fn encode_uint(value: Wei) -> Word {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Calldata for `signature` with the given argument words, as `0x` hex.
pub fn encode_call(signature: &str, args: &[Word]) -> String {
    let mut data = Vec::with_capacity(4 + args.len() * 32);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(arg);
    }
    to_hex(&data)
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// JSON-RPC quantity encoding (no leading zeros).
pub fn format_quantity(value: Wei) -> String {
    format!("0x{value:x}")
}

pub fn format_block(number: u64) -> String {
    format!("0x{number:x}")
}

// ============================================================================
// Decoding
// ============================================================================

fn strip_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Split `0x`-prefixed return or log data into words.
pub fn decode_words(data: &str) -> Result<Vec<Word>, AbiError> {
    let bytes = hex::decode(strip_prefix(data))?;
    if bytes.len() % 32 != 0 {
        return Err(AbiError::Misaligned(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(32)
        .map(|chunk| {
            let mut word = [0u8; 32];
            word.copy_from_slice(chunk);
            word
        })
        .collect())
}

pub fn decode_word(data: &str) -> Result<Word, AbiError> {
    let bytes = hex::decode(strip_prefix(data))?;
    bytes.as_slice().try_into().map_err(|_| AbiError::Length {
        expected: 32,
        actual: bytes.len(),
    })
}

/// An `address` occupies the low 20 bytes of its word.
pub fn word_to_address(word: &Word) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Address::from_bytes(bytes)
}

pub fn word_to_uint(word: &Word) -> Wei {
    Wei::from_big_endian(word)
}

/// Decode a single `address` return value.
pub fn decode_address_return(data: &str) -> Result<Address, AbiError> {
    let words = decode_words(data)?;
    let word = words.first().ok_or(AbiError::MissingWords {
        expected: 1,
        actual: 0,
    })?;
    Ok(word_to_address(word))
}

pub fn parse_quantity(text: &str) -> Result<u64, AbiError> {
    u64::from_str_radix(strip_prefix(text), 16).map_err(|_| AbiError::Quantity(text.to_string()))
}

pub fn parse_wei(text: &str) -> Result<Wei, AbiError> {
    let digits = strip_prefix(text);
    if digits.is_empty() {
        return Err(AbiError::Quantity(text.to_string()));
    }
    Wei::from_str_radix(digits, 16).map_err(|_| AbiError::Quantity(text.to_string()))
}

pub fn parse_transaction_id(text: &str) -> Result<TransactionId, AbiError> {
    Ok(TransactionId::from_bytes(decode_word(text)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_deployed_contract() {
        assert_eq!(hex::encode(selector(signatures::MANAGER)), "481c6a75");
        assert_eq!(hex::encode(selector(signatures::PARTICIPANTS)), "35c1d349");
        assert_eq!(hex::encode(selector(signatures::SELECT_WINNER)), "5b86fcc4");
    }

    #[test]
    fn event_topics_are_full_hashes() {
        assert_eq!(
            hex::encode(event_topic(signatures::PARTICIPANTS_ENTERED)),
            "b4255d9466807cfa5ee8ba1026c94f9dcc4453901ea9d53cb0c66b3fc8f45e4c"
        );
        assert_eq!(
            hex::encode(event_topic(signatures::WINNER_SELECTED)),
            "75060f9e79552df167b73353fee6237a75bb5ba8ea022f77224e32f152138bcb"
        );
    }

    #[test]
    fn participants_call_encodes_index() {
        let data = encode_call(signatures::PARTICIPANTS, &[encode_uint(Wei::from(2u64))]);
        assert_eq!(data, format!("0x35c1d349{}02", "0".repeat(62)));
    }

    #[test]
    fn address_return_uses_low_bytes() {
        let data = format!("0x{}{}", "0".repeat(24), "ab".repeat(20));
        assert_eq!(decode_address_return(&data).unwrap(), Address([0xab; 20]));
        assert!(decode_address_return("0x").is_err());
        assert!(matches!(decode_words("0x1234"), Err(AbiError::Misaligned(2))));
    }

    #[test]
    fn quantities_round_trip_through_hex() {
        assert_eq!(parse_quantity("0x1b4").unwrap(), 436);
        assert_eq!(parse_wei("0xde0b6b3a7640000").unwrap(), client_blockchain_core::ether(1));
        assert_eq!(format_quantity(client_blockchain_core::ether(1)), "0xde0b6b3a7640000");
        assert_eq!(format_quantity(Wei::zero()), "0x0");
        assert!(parse_quantity("0xnope").is_err());
    }
}
