//! Settlement and pricing assets that are never tracked as positions.

use crate::domain::Symbol;
use std::collections::HashSet;

/// Native SOL with its wrapped and liquid-staked variants, then USD stablecoins.
pub const DEFAULT_EXCLUDED_SYMBOLS: &[&str] = &[
    "SOL", "WSOL", "MSOL", "JITOSOL", "BSOL", "STSOL", "JUPSOL", "INF", "USDC", "USDT", "PYUSD",
    "USDS", "USDH", "UXD", "DAI",
];

/// Case-insensitive symbol set. Always contains the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionList {
    symbols: HashSet<String>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self {
            symbols: DEFAULT_EXCLUDED_SYMBOLS
                .iter()
                .map(|s| s.to_ascii_uppercase())
                .collect(),
        }
    }

    /// Defaults plus `extra`. Blank entries are ignored.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for symbol in extra {
            let symbol = symbol.as_ref().trim();
            if !symbol.is_empty() {
                list.symbols.insert(symbol.to_ascii_uppercase());
            }
        }
        list
    }

    pub fn is_excluded(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.trim().to_ascii_uppercase())
    }

    pub fn is_excluded_symbol(&self, symbol: &Symbol) -> bool {
        self.is_excluded(symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::new()
    }
}

/// Check against the default list only.
pub fn is_excluded_asset(symbol: &str) -> bool {
    DEFAULT_EXCLUDED_SYMBOLS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(symbol.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_case_insensitive() {
        assert!(is_excluded_asset("usdc"));
        assert!(is_excluded_asset("JitoSOL"));
        assert!(is_excluded_asset("wSOL"));
        assert!(!is_excluded_asset("BONK"));
    }

    #[test]
    fn test_list_matches_free_function() {
        let list = ExclusionList::new();
        for symbol in ["sol", "mSOL", "USDT", "bonk", "WIF"] {
            assert_eq!(list.is_excluded(symbol), is_excluded_asset(symbol), "{}", symbol);
        }
    }

    #[test]
    fn test_extra_symbols_are_additive() {
        let list = ExclusionList::with_extra(["eurc", " ", "USDe"]);
        assert!(list.is_excluded("EURC"));
        assert!(list.is_excluded("usde"));
        assert!(list.is_excluded("USDC"));
        assert_eq!(list.len(), DEFAULT_EXCLUDED_SYMBOLS.len() + 2);
    }

    #[test]
    fn test_symbol_wrapper() {
        let list = ExclusionList::default();
        assert!(list.is_excluded_symbol(&Symbol::new("Usdc")));
        assert!(!list.is_excluded_symbol(&Symbol::new("POPCAT")));
    }
}
