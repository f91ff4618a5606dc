use crate::config::InputConfig;
use crate::order_log::{IngestError, IngestSummary, OrderLog};
use crate::types::{IdVolume, Order, PriceVolume};
use std::collections::HashMap;
use tracing::debug;

/// Read-only aggregate queries over an ingested order log.
///
/// All queries take `&self` and keep no caches, so one engine can be shared
/// across threads and every call with the same arguments returns the same
/// result. Results come back unordered; presentation order lives in
/// [`crate::report`].
#[derive(Debug)]
pub struct OrderLogQueryEngine {
    log: OrderLog,
}

impl OrderLogQueryEngine {
    pub fn new(lines: Vec<String>, config: &InputConfig) -> Result<Self, IngestError> {
        Ok(Self::from_log(OrderLog::parse(lines, config)?))
    }

    pub fn from_log(log: OrderLog) -> Self {
        Self { log }
    }

    pub fn summary(&self) -> IngestSummary {
        self.log.summary()
    }

    /// Number of orders (either side) per symbol
    pub fn order_counts(&self) -> HashMap<String, i64> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for order in self.log.orders() {
            *counts.entry(order.symbol.clone()).or_insert(0) += 1;
        }
        debug!(symbols = counts.len(), "Order counts computed");
        counts
    }

    /// Every BUY order for `symbol` as (id, volume), in log order
    pub fn biggest_buy_orders(&self, symbol: &str) -> Vec<IdVolume> {
        let buys: Vec<IdVolume> = self
            .log
            .orders()
            .iter()
            .filter(|o| o.is_buy() && o.symbol == symbol)
            .map(IdVolume::from)
            .collect();
        debug!(symbol = %symbol, matches = buys.len(), "Buy orders collected");
        buys
    }

    /// Lowest-priced SELL order for `symbol` stamped exactly `timestamp`.
    /// Equal prices resolve to the lowest id, then to the earliest line.
    pub fn best_sell_at_time(&self, symbol: &str, timestamp: &str) -> Option<PriceVolume> {
        let best = self
            .log
            .orders()
            .iter()
            .filter(|o| o.is_sell() && o.symbol == symbol && o.timestamp == timestamp)
            .min_by_key(|o| (o.price, o.id));

        match best {
            Some(order) => {
                debug!(
                    symbol = %symbol,
                    timestamp = %timestamp,
                    id = order.id,
                    price = %order.price,
                    volume = order.volume,
                    "Best sell found"
                );
                Some(PriceVolume::from(order))
            }
            None => {
                debug!(symbol = %symbol, timestamp = %timestamp, "No matching sell order");
                None
            }
        }
    }

    pub fn orders(&self) -> &[Order] {
        self.log.orders()
    }
}
