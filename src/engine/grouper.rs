//! Buckets trades by every asset address they touch.

use crate::domain::{Address, Trade};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mapping from asset address to the trades that mention it on either side.
///
/// A trade appears in two buckets when it swaps two distinct assets; both entries point at the
/// same `Arc`. Keys iterate in address order.
#[derive(Debug, Clone, Default)]
pub struct AssetBuckets {
    buckets: BTreeMap<Address, Vec<Arc<Trade>>>,
}

impl AssetBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one trade under its out-asset and, if different, its in-asset.
    pub fn insert(&mut self, trade: Arc<Trade>) {
        let out_addr = trade.token_out.address.clone();
        let in_addr = trade.token_in.address.clone();

        if in_addr != out_addr {
            self.buckets
                .entry(in_addr)
                .or_default()
                .push(Arc::clone(&trade));
        }
        self.buckets.entry(out_addr).or_default().push(trade);
    }

    pub fn get(&self, asset: &Address) -> Option<&[Arc<Trade>]> {
        self.buckets.get(asset).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &[Arc<Trade>])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl IntoIterator for AssetBuckets {
    type Item = (Address, Vec<Arc<Trade>>);
    type IntoIter = std::collections::btree_map::IntoIter<Address, Vec<Arc<Trade>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

impl FromIterator<Arc<Trade>> for AssetBuckets {
    fn from_iter<I: IntoIterator<Item = Arc<Trade>>>(iter: I) -> Self {
        let mut buckets = AssetBuckets::new();
        for trade in iter {
            buckets.insert(trade);
        }
        buckets
    }
}

/// Group trades by asset address.
pub fn group_by_asset<I>(trades: I) -> AssetBuckets
where
    I: IntoIterator<Item = Arc<Trade>>,
{
    trades.into_iter().collect()
}
