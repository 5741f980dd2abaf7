//! Display formatting for addresses and ether amounts.

use client_blockchain_core::{Address, WEI_PER_ETHER, Wei};

const WEI_PER_CENT: u64 = WEI_PER_ETHER / 100;

/// Render a wei amount as ether with two decimals, e.g. `1.50 ETH`.
///
/// Rounds half up at the third decimal.
pub fn format_ether(amount: Wei) -> String {
    let cents = amount.saturating_add(Wei::from(WEI_PER_CENT / 2)) / Wei::from(WEI_PER_CENT);
    let whole = cents / Wei::from(100u64);
    let fraction = (cents % Wei::from(100u64)).low_u64();
    format!("{whole}.{fraction:02} ETH")
}

/// `0x1234...abcd`, or an empty string for the unassigned address.
pub fn short_address(address: &Address) -> String {
    if address.is_zero() {
        String::new()
    } else {
        address.short()
    }
}
