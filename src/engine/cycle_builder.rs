use crate::domain::ordering::sort_trades_chronological;
use crate::domain::{Address, Decimal, Symbol, Timestamp, Trade, TradeError};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::{classify, AssetCycles, Cycle, Direction, ExclusionList};

/// Residual balance, in raw base units, treated as a closed position.
///
/// Not scaled by token decimals; callers can override it through `EngineConfig`.
pub const DEFAULT_DUST_THRESHOLD: i64 = 100;

/// Walks one asset's trades in chronological order and splits them into cycles.
///
/// The last element of `cycles` is the current cycle. A new one is opened on the first
/// involved trade, and afterwards only by a buy arriving while the balance is dust.
pub struct CycleBuilder {
    asset_address: Address,
    symbol: Symbol,
    dust_threshold: Decimal,
    running_balance: Decimal,
    next_sequence: u32,
    cycles: Vec<Cycle>,
}

impl CycleBuilder {
    pub fn new(asset_address: Address, symbol: Symbol, dust_threshold: Decimal) -> Self {
        Self {
            asset_address,
            symbol,
            dust_threshold,
            running_balance: Decimal::zero(),
            next_sequence: 1,
            cycles: Vec::new(),
        }
    }

    pub fn running_balance(&self) -> Decimal {
        self.running_balance
    }

    pub fn current(&self) -> Option<&Cycle> {
        self.cycles.last()
    }

    /// Apply one trade. Returns the direction it was classified as; `NotInvolved` trades
    /// leave the builder untouched.
    ///
    /// A trade whose amounts would push a running total out of range is refused with
    /// `TradeError::Overflow` and leaves the builder untouched as well.
    ///
    /// Callers must feed trades oldest first.
    pub fn process_trade(&mut self, trade: &Arc<Trade>) -> Result<Direction, TradeError> {
        let direction = classify(trade, &self.asset_address);
        if !direction.is_involved() {
            return Ok(direction);
        }

        let opening = self.should_open(direction);
        let totals = self.next_totals(trade, direction, opening)?;

        if opening {
            // Never finds an incomplete cycle while completion is re-derived per trade; kept so
            // a cycle is always closed out before its successor starts.
            self.finalize_current(trade.timestamp);
            self.open_cycle(trade);
        }

        self.apply(trade, direction, totals);
        Ok(direction)
    }

    fn should_open(&self, direction: Direction) -> bool {
        match self.cycles.last() {
            None => true,
            Some(_) => {
                direction == Direction::Buy && self.running_balance.is_dust(self.dust_threshold)
            }
        }
    }

    /// Close out the current cycle if it never reached completion on its own.
    fn finalize_current(&mut self, at: Timestamp) {
        let balance = self.running_balance;
        let dust_threshold = self.dust_threshold;
        let Some(cycle) = self.cycles.last_mut() else {
            return;
        };
        if cycle.is_complete {
            return;
        }

        cycle.end_balance = balance;
        if balance.is_dust(dust_threshold) {
            mark_complete(cycle, at);
        }
    }

    fn open_cycle(&mut self, trade: &Trade) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.cycles.push(Cycle {
            cycle_key: compute_cycle_key(&self.asset_address, sequence, &trade.signature),
            sequence,
            asset: self.symbol.clone(),
            asset_address: self.asset_address.clone(),
            buys: Vec::new(),
            sells: Vec::new(),
            total_buy_amount: Decimal::zero(),
            total_sell_amount: Decimal::zero(),
            total_buy_value: Decimal::zero(),
            total_sell_value: Decimal::zero(),
            start_balance: self.running_balance,
            end_balance: Decimal::zero(),
            profit_loss: Decimal::zero(),
            is_complete: false,
            start_date: trade.timestamp,
            end_date: None,
            duration_ms: None,
        });
    }

    /// Totals the receiving cycle would hold after `trade`, computed without mutating.
    fn next_totals(
        &self,
        trade: &Trade,
        direction: Direction,
        opening: bool,
    ) -> Result<Totals, TradeError> {
        let overflow = |field| TradeError::Overflow {
            signature: trade.signature.clone(),
            field,
        };

        let mut totals = match self.cycles.last() {
            Some(cycle) if !opening => Totals {
                buy_amount: cycle.total_buy_amount,
                sell_amount: cycle.total_sell_amount,
                buy_value: cycle.total_buy_value,
                sell_value: cycle.total_sell_value,
                ..Totals::default()
            },
            _ => Totals::default(),
        };

        match direction {
            Direction::Buy => {
                totals.buy_amount = totals
                    .buy_amount
                    .checked_add(trade.amount_out)
                    .ok_or_else(|| overflow("totalBuyAmount"))?;
                totals.buy_value = totals
                    .buy_value
                    .checked_add(trade.value_usd)
                    .ok_or_else(|| overflow("totalBuyValueUSD"))?;
                totals.balance = self
                    .running_balance
                    .checked_add(trade.amount_out)
                    .ok_or_else(|| overflow("balance"))?;
            }
            Direction::Sell => {
                totals.sell_amount = totals
                    .sell_amount
                    .checked_add(trade.amount_in)
                    .ok_or_else(|| overflow("totalSellAmount"))?;
                totals.sell_value = totals
                    .sell_value
                    .checked_add(trade.value_usd)
                    .ok_or_else(|| overflow("totalSellValueUSD"))?;
                totals.balance = self
                    .running_balance
                    .checked_sub(trade.amount_in)
                    .ok_or_else(|| overflow("balance"))?;
            }
            Direction::NotInvolved => totals.balance = self.running_balance,
        }

        totals.profit_loss = totals
            .sell_value
            .checked_sub(totals.buy_value)
            .ok_or_else(|| overflow("profitLoss"))?;
        Ok(totals)
    }

    fn apply(&mut self, trade: &Arc<Trade>, direction: Direction, totals: Totals) {
        let Some(cycle) = self.cycles.last_mut() else {
            return;
        };

        match direction {
            Direction::Buy => cycle.buys.push(Arc::clone(trade)),
            Direction::Sell => cycle.sells.push(Arc::clone(trade)),
            Direction::NotInvolved => return,
        }

        self.running_balance = totals.balance;
        cycle.total_buy_amount = totals.buy_amount;
        cycle.total_sell_amount = totals.sell_amount;
        cycle.total_buy_value = totals.buy_value;
        cycle.total_sell_value = totals.sell_value;
        cycle.end_balance = totals.balance;
        cycle.profit_loss = totals.profit_loss;

        // A sell after completion (e.g. tokens received outside any swap) pushes the balance
        // away from zero again, so completion is re-derived from the balance every time.
        if self.running_balance.is_dust(self.dust_threshold) {
            mark_complete(cycle, trade.timestamp);
        } else {
            cycle.is_complete = false;
            cycle.end_date = None;
            cycle.duration_ms = None;
        }
    }

    pub fn into_cycles(self) -> Vec<Cycle> {
        self.cycles
    }
}

#[derive(Debug, Default)]
struct Totals {
    buy_amount: Decimal,
    sell_amount: Decimal,
    buy_value: Decimal,
    sell_value: Decimal,
    balance: Decimal,
    profit_loss: Decimal,
}

fn mark_complete(cycle: &mut Cycle, at: Timestamp) {
    cycle.is_complete = true;
    cycle.end_date = Some(at);
    cycle.duration_ms = Some(at.millis_since(cycle.start_date));
}

/// `hash:` + first 16 bytes of SHA-256 over (asset, sequence, opening signature).
pub fn compute_cycle_key(asset: &Address, sequence: u32, opening_signature: &str) -> String {
    fn hash_var(hasher: &mut Sha256, data: &str) {
        hasher.update((data.len() as u32).to_le_bytes());
        hasher.update(data.as_bytes());
    }

    let mut hasher = Sha256::new();
    hash_var(&mut hasher, asset.as_str());
    hasher.update(sequence.to_le_bytes());
    hash_var(&mut hasher, opening_signature);
    let hash = hasher.finalize();
    format!("hash:{}", hex::encode(&hash[..16]))
}

/// Reconstruct the cycles of one asset from its bucket.
///
/// Returns `None` when the asset is a settlement asset, or when no trade in the bucket
/// actually moves it. Trades refused by the builder are appended to `rejected`.
pub fn build_asset_cycles(
    asset_address: &Address,
    trades: &[Arc<Trade>],
    exclusions: &ExclusionList,
    dust_threshold: Decimal,
    rejected: &mut Vec<TradeError>,
) -> Option<AssetCycles> {
    let mut ordered: Vec<Arc<Trade>> = trades.to_vec();
    sort_trades_chronological(&mut ordered);

    let symbol = ordered
        .iter()
        .find_map(|t| t.symbol_of(asset_address))?
        .clone();
    if exclusions.is_excluded_symbol(&symbol) {
        return None;
    }

    let mut builder = CycleBuilder::new(asset_address.clone(), symbol.clone(), dust_threshold);
    for trade in &ordered {
        if let Err(e) = builder.process_trade(trade) {
            tracing::warn!(asset = %symbol, error = %e, "skipping trade");
            rejected.push(e);
        }
    }

    let cycles = builder.into_cycles();
    if !cycles.iter().any(|c| c.trade_count() > 0) {
        return None;
    }

    Some(AssetCycles {
        asset_address: asset_address.clone(),
        symbol,
        cycles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Token;

    const WIF: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qJxdSpBxQzQH2AzJZ6ZpTdVVsZ";

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn swap(sig: &str, ts: i64, buy: bool, amount: &str, value: &str) -> Arc<Trade> {
        let wif = Token::new(WIF, "WIF", 6);
        let usdc = Token::new(USDC, "USDC", 6);
        let (token_in, token_out, amount_in, amount_out) = if buy {
            (usdc, wif, d(value), d(amount))
        } else {
            (wif, usdc, d(amount), d(value))
        };
        Arc::new(Trade::new(
            sig,
            Timestamp::new(ts),
            token_in,
            token_out,
            amount_in,
            amount_out,
            d("1"),
            d(value),
            "Jupiter",
        ))
    }

    fn builder() -> CycleBuilder {
        CycleBuilder::new(Address::new(WIF), Symbol::new("WIF"), Decimal::from(100))
    }

    #[test]
    fn test_first_trade_opens_cycle() {
        let mut b = builder();
        assert!(b.current().is_none());
        assert_eq!(
            b.process_trade(&swap("s1", 10, true, "1000", "100")).unwrap(),
            Direction::Buy
        );
        let cycle = b.current().unwrap();
        assert_eq!(cycle.sequence, 1);
        assert_eq!(cycle.start_balance, Decimal::zero());
        assert_eq!(cycle.start_date, Timestamp::new(10));
        assert_eq!(b.running_balance(), d("1000"));
    }

    #[test]
    fn test_partial_sell_keeps_cycle_open() {
        let mut b = builder();
        b.process_trade(&swap("s1", 10, true, "1000", "100")).unwrap();
        b.process_trade(&swap("s2", 20, false, "400", "60")).unwrap();
        let cycle = b.current().unwrap();
        assert!(!cycle.is_complete);
        assert_eq!(cycle.end_balance, d("600"));
        assert_eq!(cycle.profit_loss, d("-40"));
        assert_eq!(cycle.end_date, None);
    }

    #[test]
    fn test_buy_while_holding_extends_cycle() {
        let mut b = builder();
        b.process_trade(&swap("s1", 10, true, "1000", "100")).unwrap();
        b.process_trade(&swap("s2", 20, true, "500", "40")).unwrap();
        let cycles = b.into_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].buys.len(), 2);
        assert_eq!(cycles[0].total_buy_amount, d("1500"));
        assert_eq!(cycles[0].total_buy_value, d("140"));
    }

    #[test]
    fn test_duration_in_milliseconds() {
        let mut b = builder();
        b.process_trade(&swap("s1", 1_000, true, "1000", "100")).unwrap();
        b.process_trade(&swap("s2", 1_060, false, "1000", "120")).unwrap();
        let cycle = b.current().unwrap();
        assert!(cycle.is_complete);
        assert_eq!(cycle.end_date, Some(Timestamp::new(1_060)));
        assert_eq!(cycle.duration_ms, Some(60_000));
    }

    #[test]
    fn test_sell_after_close_reopens_completion() {
        let mut b = builder();
        b.process_trade(&swap("s1", 10, true, "1000", "100")).unwrap();
        b.process_trade(&swap("s2", 20, false, "1000", "120")).unwrap();
        assert!(b.current().unwrap().is_complete);

        // A sell never opens a cycle, so it lands on the closed one.
        b.process_trade(&swap("s3", 30, false, "500", "50")).unwrap();
        let cycles = b.into_cycles();
        assert_eq!(cycles.len(), 1);
        assert!(!cycles[0].is_complete);
        assert_eq!(cycles[0].end_balance, d("-500"));
        assert_eq!(cycles[0].end_date, None);
        assert_eq!(cycles[0].duration_ms, None);
    }

    #[test]
    fn test_sell_first_opens_cycle_with_negative_balance() {
        let mut b = builder();
        b.process_trade(&swap("s1", 10, false, "700", "70")).unwrap();
        b.process_trade(&swap("s2", 20, true, "700", "60")).unwrap();
        let cycles = b.into_cycles();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].is_complete);
        assert_eq!(cycles[0].profit_loss, d("10"));
    }

    #[test]
    fn test_carried_dust_becomes_start_balance() {
        let mut b = builder();
        b.process_trade(&swap("s1", 10, true, "10000", "100")).unwrap();
        b.process_trade(&swap("s2", 20, false, "9950", "110")).unwrap();
        b.process_trade(&swap("s3", 30, true, "3000", "30")).unwrap();
        let cycles = b.into_cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1].sequence, 2);
        assert_eq!(cycles[1].start_balance, d("50"));
        assert_eq!(cycles[1].end_balance, d("3050"));
    }

    #[test]
    fn test_cycle_key_is_stable_and_distinct() {
        let asset = Address::new(WIF);
        let a = compute_cycle_key(&asset, 1, "sig");
        assert_eq!(a, compute_cycle_key(&asset, 1, "sig"));
        assert_ne!(a, compute_cycle_key(&asset, 2, "sig"));
        assert!(a.starts_with("hash:"));
        assert_eq!(a.len(), 5 + 32);
    }

    #[test]
    fn test_build_skips_bucket_without_involved_trades() {
        let asset = Address::new("other");
        let trades = vec![swap("s1", 10, true, "1000", "100")];
        let result = build_asset_cycles(
            &asset,
            &trades,
            &ExclusionList::new(),
            Decimal::from(100),
            &mut Vec::new(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_build_sorts_unordered_bucket() {
        let asset = Address::new(WIF);
        let trades = vec![
            swap("s2", 20, false, "1000", "120"),
            swap("s1", 10, true, "1000", "100"),
        ];
        let result = build_asset_cycles(
            &asset,
            &trades,
            &ExclusionList::new(),
            Decimal::from(100),
            &mut Vec::new(),
        )
        .unwrap();
        assert_eq!(result.symbol.as_str(), "WIF");
        assert_eq!(result.cycles.len(), 1);
        assert!(result.cycles[0].is_complete);
        assert_eq!(result.cycles[0].buys[0].signature, "s1");
    }

    #[test]
    fn test_overflowing_trade_is_refused_without_side_effects() {
        let huge = "50000000000000000000000000000";
        let mut b = builder();
        b.process_trade(&swap("s1", 10, true, huge, "100")).unwrap();

        match b.process_trade(&swap("s2", 20, true, huge, "100")) {
            Err(TradeError::Overflow { signature, field }) => {
                assert_eq!(signature, "s2");
                assert_eq!(field, "totalBuyAmount");
            }
            other => panic!("Expected Overflow, got {:?}", other),
        }

        let cycle = b.current().unwrap();
        assert_eq!(cycle.buys.len(), 1);
        assert_eq!(cycle.total_buy_amount, d(huge));
        assert_eq!(b.running_balance(), d(huge));
    }

    #[test]
    fn test_build_collects_refused_trades() {
        let huge = "50000000000000000000000000000";
        let trades = vec![
            swap("s1", 10, true, huge, "100"),
            swap("s2", 20, true, huge, "100"),
            swap("s3", 30, false, "1000", "5"),
        ];
        let mut rejected = Vec::new();
        let result = build_asset_cycles(
            &Address::new(WIF),
            &trades,
            &ExclusionList::new(),
            Decimal::from(100),
            &mut rejected,
        )
        .unwrap();

        assert_eq!(rejected.len(), 1);
        assert!(matches!(&rejected[0], TradeError::Overflow { signature, .. } if signature == "s2"));
        assert_eq!(result.cycles[0].trade_count(), 2);
    }
}
