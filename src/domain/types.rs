use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Five-digit account identifier. Leading zeros are significant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub const LEN: usize = 5;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(AccountNumber(s.to_string()))
        } else {
            Err(LedgerError::InvalidInput(
                "Account number must be exactly 5 digits".to_string(),
            ))
        }
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Money value in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Largest magnitude accepted for a single amount (10^15).
    pub const MAX: Amount = Amount(Decimal::from_parts(0xA4C6_8000, 0x38D7E, 0, false, 0));

    pub const MAX_SCALE: u32 = 2;

    pub fn new(value: Decimal) -> Self {
        Amount(value.round_dp(Self::MAX_SCALE))
    }

    pub fn from_str_rounded(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s.trim())?;
        Ok(Self::new(decimal))
    }

    /// Parses an amount without rounding: more than two decimal places or a
    /// magnitude above [`Amount::MAX`] is an error.
    pub fn parse_exact(s: &str) -> Result<Self, LedgerError> {
        let decimal = Decimal::from_str(s.trim()).map_err(|_| {
            LedgerError::InvalidInput("Invalid input, only enter in a numeric value".to_string())
        })?;
        let amount = Amount(decimal);
        if !amount.is_whole_cents() {
            return Err(LedgerError::InvalidInput(
                "Amount cannot have more than two decimal places".to_string(),
            ));
        }
        if !amount.within_limit() {
            return Err(LedgerError::InvalidInput(format!(
                "Amount cannot exceed {}",
                Self::MAX.dollars()
            )));
        }
        Ok(amount)
    }

    /// Validates an amount typed at a prompt. Zero is only accepted when
    /// `allow_zero` is set (opening deposits).
    pub fn parse_entry(s: &str, allow_zero: bool) -> Result<Self, LedgerError> {
        let amount = Self::parse_exact(s)?;
        if amount.is_negative() || (amount.is_zero() && !allow_zero) {
            return Err(LedgerError::InvalidInput(
                "Amount must be a positive number".to_string(),
            ));
        }
        Ok(amount)
    }

    pub fn is_whole_cents(&self) -> bool {
        self.0.normalize().scale() <= Self::MAX_SCALE
    }

    pub fn within_limit(&self) -> bool {
        self.0.abs() <= Self::MAX.0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Renders as `$12.50` or `-$12.50`.
    pub fn dollars(&self) -> String {
        if self.is_negative() {
            format!("-${:.2}", -self.0)
        } else {
            format!("${:.2}", self.0)
        }
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 4] = [
        TransactionKind::Deposit,
        TransactionKind::Withdraw,
        TransactionKind::TransferIn,
        TransactionKind::TransferOut,
    ];

    /// Canonical lowercase name, as stored on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::TransferIn => "transfer-in",
            TransactionKind::TransferOut => "transfer-out",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdraw => "Withdraw",
            TransactionKind::TransferIn => "Transfer-In",
            TransactionKind::TransferOut => "Transfer-Out",
        }
    }

    /// Credits add to the balance, debits subtract from it.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            "transfer-in" => Ok(TransactionKind::TransferIn),
            "transfer-out" => Ok(TransactionKind::TransferOut),
            _ => Err(LedgerError::InvalidTransactionType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_rounds_to_cents() {
        let amount = Amount::from_str_rounded("1.235").expect("failed to parse amount");
        assert_eq!(
            amount.0,
            Decimal::from_str("1.24").expect("failed to parse decimal")
        );
    }

    #[test]
    fn test_amount_parses_with_whitespace() {
        let amount = Amount::from_str_rounded("  100.5  ").expect("failed to parse amount");
        assert_eq!(format!("{}", amount), "100.50");
    }

    #[test]
    fn test_amount_dollars_negative() {
        let amount = Amount::from_str_rounded("-500").expect("failed to parse amount");
        assert_eq!(amount.dollars(), "-$500.00");
        assert_eq!(Amount::ZERO.dollars(), "$0.00");
    }

    #[test]
    fn test_parse_entry_rejects_sub_cent_input() {
        assert!(Amount::parse_entry("10.005", false).is_err());
        assert!(Amount::parse_entry("0.005", false).is_err());
        assert_eq!(
            Amount::parse_entry("10.500", false).expect("trailing zeros are whole cents"),
            Amount::from_str_rounded("10.50").expect("valid amount")
        );
    }

    #[test]
    fn test_parse_entry_rejects_amounts_above_limit() {
        assert!(Amount::parse_entry("1000000000000000", false).is_ok());
        assert!(Amount::parse_entry("1000000000000000.01", false).is_err());
        assert!(Amount::parse_entry("79228162514264337593543950335", false).is_err());
    }

    #[test]
    fn test_max_is_ten_to_the_fifteenth() {
        assert_eq!(
            Amount::MAX.0,
            Decimal::from_str("1000000000000000").expect("valid decimal")
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        let huge = Amount(Decimal::MAX);
        assert_eq!(huge.checked_add(Amount::from_str_rounded("1").unwrap()), None);
        assert_eq!(Amount(Decimal::MIN).checked_sub(huge), None);
        assert_eq!(
            Amount::ZERO.checked_sub(Amount::from_str_rounded("1.5").unwrap()),
            Some(Amount::from_str_rounded("-1.5").unwrap())
        );
    }

    #[test]
    fn test_parse_entry_rules() {
        assert!(Amount::parse_entry("abc", false).is_err());
        assert!(Amount::parse_entry("-1", true).is_err());
        assert!(Amount::parse_entry("0", false).is_err());
        assert!(Amount::parse_entry("0", true).is_ok());
        assert_eq!(
            Amount::parse_entry("12.5", false).expect("valid amount"),
            Amount::from_str_rounded("12.50").expect("valid amount")
        );
    }

    #[test]
    fn test_account_number_validation() {
        assert!(AccountNumber::from_str("12345").is_ok());
        assert_eq!(
            AccountNumber::from_str(" 00042 ").expect("valid number").as_str(),
            "00042"
        );
        assert!(AccountNumber::from_str("1234").is_err());
        assert!(AccountNumber::from_str("123456").is_err());
        assert!(AccountNumber::from_str("12a45").is_err());
        assert!(AccountNumber::from_str("").is_err());
    }

    #[test]
    fn test_transaction_kind_parsing() {
        assert_eq!(
            TransactionKind::from_str("deposit"),
            Ok(TransactionKind::Deposit)
        );
        assert_eq!(
            TransactionKind::from_str(" WITHDRAW "),
            Ok(TransactionKind::Withdraw)
        );
        assert_eq!(
            TransactionKind::from_str("Transfer-In"),
            Ok(TransactionKind::TransferIn)
        );
        assert_eq!(
            TransactionKind::from_str("transfer-OUT"),
            Ok(TransactionKind::TransferOut)
        );
        assert!(TransactionKind::from_str("withdrawal").is_err());
    }

    #[test]
    fn test_transaction_kind_round_trips_through_name() {
        for kind in TransactionKind::ALL {
            assert_eq!(TransactionKind::from_str(kind.as_str()), Ok(kind));
        }
    }
}
