//! In-memory balance source.

use super::{BalanceSource, SourceError};
use crate::domain::{Address, Decimal};
use std::collections::{BTreeMap, HashMap};

/// Balance source backed by a fixed map, e.g. a snapshot taken by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticBalances {
    balances: HashMap<Address, Decimal>,
}

impl StaticBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, asset: Address, balance: Decimal) -> Self {
        self.balances.insert(asset, balance);
        self
    }

    pub fn with_balances(mut self, balances: impl IntoIterator<Item = (Address, Decimal)>) -> Self {
        self.balances.extend(balances);
        self
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl BalanceSource for StaticBalances {
    fn balance_of(&self, asset: &Address) -> Option<Decimal> {
        self.balances.get(asset).copied()
    }
}

/// Parse `{"<mint>": "<raw amount>", ...}`. Amounts may be strings or numbers.
pub fn load_balances_json(bytes: &[u8]) -> Result<StaticBalances, SourceError> {
    let raw: BTreeMap<String, Decimal> = serde_json::from_slice(bytes)?;

    if let Some((address, amount)) = raw.iter().find(|(_, amount)| amount.is_negative()) {
        return Err(SourceError::InvalidField {
            field: format!("balance of {}", address),
            message: format!("negative amount {}", amount),
        });
    }

    Ok(StaticBalances::new().with_balances(
        raw.into_iter()
            .map(|(address, amount)| (Address::new(address), amount)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_asset_is_none() {
        let balances = StaticBalances::new().with_balance(Address::new("a"), Decimal::from(5));
        assert_eq!(balances.balance_of(&Address::new("a")), Some(Decimal::from(5)));
        assert_eq!(balances.balance_of(&Address::new("b")), None);
    }

    #[test]
    fn test_load_json_strings_and_numbers() {
        let json = br#"{"mintA": "1500000", "mintB": 0}"#;
        let balances = load_balances_json(json).unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(
            balances.balance_of(&Address::new("mintA")),
            Some(Decimal::from(1_500_000))
        );
        assert_eq!(balances.balance_of(&Address::new("mintB")), Some(Decimal::zero()));
    }

    #[test]
    fn test_load_json_rejects_negative() {
        let err = load_balances_json(br#"{"mintA": "-1"}"#).unwrap_err();
        assert!(matches!(err, SourceError::InvalidField { .. }));
    }

    #[test]
    fn test_load_json_rejects_malformed() {
        let err = load_balances_json(b"[1, 2]").unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }
}
