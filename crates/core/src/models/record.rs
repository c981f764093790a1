use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// Round to the two decimal places every money figure is reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The two best-effort values scraped from a holding's quote page.
///
/// Each field is `None` when unavailable; the two fail independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedMetrics {
    pub valuation_ratio: Option<String>,
    pub latest_earnings: Option<String>,
}

impl ScrapedMetrics {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.valuation_ratio.is_none() && self.latest_earnings.is_none()
    }
}

/// One holding merged with its live price and scraped metrics.
///
/// `None` is the unavailable sentinel and serializes as `null`, distinct from
/// `0` and `""`. Price-derived fields are available only together with
/// `current_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub sector: String,
    pub name: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub invested_amount: f64,
    pub portfolio_percent_label: String,
    pub exchange_code: String,
    pub quote_symbol: String,
    pub scrape_symbol: String,

    pub current_price: Option<f64>,
    pub present_value: Option<f64>,
    pub gain_loss: Option<f64>,
    pub valuation_ratio: Option<String>,
    pub latest_earnings: Option<String>,
}

impl AggregateRecord {
    /// Merge a holding with a quote and metrics, deriving the valuation fields.
    pub fn derive(holding: &Holding, price: Option<f64>, metrics: ScrapedMetrics) -> Self {
        let invested = holding.invested();
        let present_value = price.map(|p| round2(p * holding.quantity));
        let gain_loss = present_value.map(|pv| round2(pv - invested));

        Self {
            sector: holding.sector.clone(),
            name: holding.display_name.clone(),
            quantity: holding.quantity,
            purchase_price: holding.purchase_price,
            invested_amount: invested,
            portfolio_percent_label: holding.portfolio_percent_label.clone(),
            exchange_code: holding.exchange_code.clone(),
            quote_symbol: holding.quote_symbol.clone(),
            scrape_symbol: holding.scrape_symbol.clone(),
            current_price: price.map(round2),
            present_value,
            gain_loss,
            valuation_ratio: metrics.valuation_ratio,
            latest_earnings: metrics.latest_earnings,
        }
    }

    /// A record with every computed field unavailable (cold cache view).
    pub fn placeholder(holding: &Holding) -> Self {
        Self::derive(holding, None, ScrapedMetrics::unavailable())
    }

    pub fn is_priced(&self) -> bool {
        self.current_price.is_some()
    }

    pub fn has_metrics(&self) -> bool {
        self.valuation_ratio.is_some() || self.latest_earnings.is_some()
    }
}
