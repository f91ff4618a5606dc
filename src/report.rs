use crate::config::{ReportConfig, ReportFormat};
use crate::order_log::IngestSummary;
use crate::query::OrderLogQueryEngine;
use crate::types::{IdVolume, PriceVolume};
use serde::Serialize;
use std::collections::HashMap;

/// Counts in ascending symbol order
pub fn sorted_order_counts(counts: HashMap<String, i64>) -> Vec<(String, i64)> {
    let mut sorted: Vec<(String, i64)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}

/// Largest volume first, equal volumes by ascending id
pub fn sort_biggest_buys(buys: &mut [IdVolume]) {
    buys.sort_by(|l, r| r.volume.cmp(&l.volume).then(l.id.cmp(&r.id)));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: i64,
}

/// The three report sections, already in presentation order
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub symbol: String,
    pub timestamp: String,
    pub order_counts: Vec<SymbolCount>,
    pub biggest_buys: Vec<IdVolume>,
    pub best_sell: Option<PriceVolume>,
    pub ingest: IngestSummary,
}

impl Report {
    pub fn build(engine: &OrderLogQueryEngine, config: &ReportConfig) -> Self {
        let order_counts = sorted_order_counts(engine.order_counts())
            .into_iter()
            .map(|(symbol, count)| SymbolCount { symbol, count })
            .collect();

        let mut biggest_buys = engine.biggest_buy_orders(&config.symbol);
        sort_biggest_buys(&mut biggest_buys);

        Self {
            symbol: config.symbol.clone(),
            timestamp: config.timestamp.clone(),
            order_counts,
            biggest_buys,
            best_sell: engine.best_sell_at_time(&config.symbol, &config.timestamp),
            ingest: engine.summary(),
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => serde_json::to_string_pretty(self).map(|mut s| {
                s.push('\n');
                s
            }),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        out.push_str("Order counts:\n");
        for entry in &self.order_counts {
            out.push_str(&format!("{} {}\n", entry.symbol, entry.count));
        }

        out.push_str("\nBiggest buys:\n");
        for buy in &self.biggest_buys {
            out.push_str(&format!("{} {}\n", buy.id, buy.volume));
        }

        out.push_str("\nBest sell:\n");
        match &self.best_sell {
            Some(pv) => out.push_str(&format!("{} {}\n", pv.price.normalize(), pv.volume)),
            None => out.push_str("none\n"),
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use rust_decimal_macros::dec;

    fn engine_from(raw: &[&str]) -> OrderLogQueryEngine {
        let lines = raw.iter().map(|s| s.to_string()).collect();
        OrderLogQueryEngine::new(lines, &InputConfig::default()).unwrap()
    }

    #[test]
    fn test_sorted_order_counts() {
        let counts = HashMap::from([
            ("ZZZ".to_string(), 1),
            ("AAA".to_string(), 3),
            ("DVAM1".to_string(), 2),
        ]);
        assert_eq!(
            sorted_order_counts(counts),
            vec![
                ("AAA".to_string(), 3),
                ("DVAM1".to_string(), 2),
                ("ZZZ".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_sort_biggest_buys() {
        let mut buys = vec![
            IdVolume { id: 5, volume: 100 },
            IdVolume { id: 2, volume: 300 },
            IdVolume { id: 3, volume: 100 },
            IdVolume { id: 1, volume: 0 },
        ];
        sort_biggest_buys(&mut buys);
        let ids: Vec<i64> = buys.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 3, 5, 1]);
    }

    #[test]
    fn test_text_report_matches_reference_layout() {
        let engine = engine_from(&[
            "1 BUY DVAM1 10.50 100 15:29:00",
            "2 SELL DVAM1 10.40 50 15:30:00",
            "3 SELL DVAM1 10.45 75 15:30:00",
            "4 BUY DVAM1 10.55 200 15:30:00",
            "5 BUY ABC 1.00 10 15:30:00",
        ]);
        let report = Report::build(&engine, &ReportConfig::default());

        assert_eq!(
            report.to_text(),
            "Order counts:\n\
             ABC 1\n\
             DVAM1 4\n\
             \n\
             Biggest buys:\n\
             4 200\n\
             1 100\n\
             \n\
             Best sell:\n\
             10.4 50\n"
        );
        assert_eq!(report.best_sell.map(|pv| pv.price), Some(dec!(10.40)));
    }

    #[test]
    fn test_text_report_without_best_sell() {
        let engine = engine_from(&["1 BUY DVAM1 10.50 100 15:29:00"]);
        let report = Report::build(&engine, &ReportConfig::default());
        assert!(report.to_text().ends_with("Best sell:\nnone\n"));
    }

    #[test]
    fn test_empty_log_report() {
        let engine = engine_from(&[]);
        let report = Report::build(&engine, &ReportConfig::default());
        assert_eq!(
            report.to_text(),
            "Order counts:\n\nBiggest buys:\n\nBest sell:\nnone\n"
        );
    }

    #[test]
    fn test_json_report() {
        let engine = engine_from(&[
            "2 SELL DVAM1 10.40 50 15:30:00",
            "not an order",
        ]);
        let report = Report::build(&engine, &ReportConfig::default());
        let json = report.render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbol"], "DVAM1");
        assert_eq!(value["order_counts"][0]["count"], 1);
        assert_eq!(value["biggest_buys"].as_array().map(|a| a.len()), Some(0));
        assert_eq!(value["best_sell"]["volume"], 50);
        assert_eq!(value["ingest"]["rejected"], 1);

        let empty = Report::build(&engine_from(&[]), &ReportConfig::default());
        let value: serde_json::Value =
            serde_json::from_str(&empty.render(ReportFormat::Json).unwrap()).unwrap();
        assert!(value["best_sell"].is_null());
    }
}
