// src/report.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;

use crate::application::{ScanOutcome, SkippedContribution};
use crate::shared::types::{NormalizedQuote, Opportunity};
use crate::shared::utils::generate_id;

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageReport {
    // Метаданные
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub asset: String,
    pub common_unit: String,
    pub min_profit_pct: Decimal,

    // Собранные котировки
    pub buys: Vec<NormalizedQuote>,
    pub sells: Vec<NormalizedQuote>,
    pub skipped: Vec<SkippedContribution>,

    // Результаты
    pub best: Option<Opportunity>,
    pub qualifying: Vec<Opportunity>,
}

impl ArbitrageReport {
    pub fn new(outcome: ScanOutcome, asset: &str, common_unit: &str, min_profit_pct: Decimal) -> Self {
        Self {
            run_id: generate_id(),
            generated_at: Utc::now(),
            asset: asset.to_string(),
            common_unit: common_unit.to_string(),
            min_profit_pct,
            buys: outcome.buys,
            sells: outcome.sells,
            skipped: outcome.skipped,
            best: outcome.opportunities.best,
            qualifying: outcome.opportunities.qualifying,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "========== Arbitrage Opportunities ==========")?;

        match &self.best {
            None => writeln!(out, "No arbitrage opportunities found.")?,
            Some(best) => {
                writeln!(
                    out,
                    "Found {} arbitrage opportunities with {}%+ profit:",
                    self.qualifying.len(),
                    self.min_profit_pct.normalize()
                )?;
                for (i, opportunity) in self.qualifying.iter().enumerate() {
                    writeln!(out)?;
                    writeln!(out, "--- Opportunity #{} (Profit: {:.2}%) ---", i + 1, opportunity.profit_pct)?;
                    self.write_opportunity(out, opportunity)?;
                }

                if self.qualifying.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "--- Best pair below threshold (Profit: {:.2}%) ---", best.profit_pct)?;
                    self.write_opportunity(out, best)?;
                }
            }
        }

        if !self.skipped.is_empty() {
            writeln!(out)?;
            writeln!(out, "Skipped {} contributions:", self.skipped.len())?;
            for skipped in &self.skipped {
                match skipped.direction {
                    Some(direction) => writeln!(
                        out,
                        "  {} {} {}: {}",
                        skipped.source, skipped.currency, direction, skipped.reason
                    )?,
                    None => writeln!(out, "  {} {}: {}", skipped.source, skipped.currency, skipped.reason)?,
                }
            }
        }

        writeln!(out, "=============================================")
    }

    fn write_opportunity(&self, out: &mut String, opportunity: &Opportunity) -> std::fmt::Result {
        self.write_leg(out, "[BUY]", &opportunity.buy)?;
        self.write_leg(out, "[SELL]", &opportunity.sell)?;
        writeln!(
            out,
            "Net Profit: +{:.2}% per trade (≈{:.3} {})",
            opportunity.profit_pct, opportunity.profit_common, self.common_unit
        )
    }

    fn write_leg(&self, out: &mut String, tag: &str, quote: &NormalizedQuote) -> std::fmt::Result {
        writeln!(
            out,
            "{} {}: 1 {} = {} {} (≈{:.3} {}), Merchant={}",
            tag,
            quote.source(),
            self.asset,
            quote.quote.local_price,
            quote.currency(),
            quote.common_price,
            self.common_unit,
            quote.quote.merchant
        )
    }
}
