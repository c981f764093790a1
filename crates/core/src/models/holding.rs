use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One configured position. Loaded once at startup, never mutated.
///
/// Field names follow the camelCase configuration schema; the capitalised
/// keys of the legacy `data.json` export are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(alias = "Sector", default)]
    pub sector: String,

    #[serde(alias = "Particulars")]
    pub display_name: String,

    #[serde(alias = "PurchasePrice")]
    pub purchase_price: f64,

    #[serde(alias = "Qty")]
    pub quantity: f64,

    /// Cost basis. When absent from the configuration it is derived as
    /// `quantity × purchase_price` by [`Holding::normalized`].
    #[serde(alias = "Investment", default)]
    pub invested_amount: Option<f64>,

    #[serde(alias = "PortfolioPercent", default)]
    pub portfolio_percent_label: String,

    #[serde(alias = "Exchange", default)]
    pub exchange_code: String,

    /// Symbol understood by the quote provider (e.g. `HDFCBANK.NS`).
    #[serde(alias = "Ticker")]
    pub quote_symbol: String,

    /// Symbol understood by the scrape target (e.g. `HDFCBANK:NSE`).
    #[serde(alias = "GoogleFinanceTicker")]
    pub scrape_symbol: String,
}

impl Holding {
    pub fn new(
        display_name: impl Into<String>,
        quote_symbol: impl Into<String>,
        scrape_symbol: impl Into<String>,
        quantity: f64,
        purchase_price: f64,
    ) -> Self {
        Self {
            sector: String::new(),
            display_name: display_name.into(),
            purchase_price,
            quantity,
            invested_amount: None,
            portfolio_percent_label: String::new(),
            exchange_code: String::new(),
            quote_symbol: quote_symbol.into(),
            scrape_symbol: scrape_symbol.into(),
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn with_invested_amount(mut self, invested: f64) -> Self {
        self.invested_amount = Some(invested);
        self
    }

    /// Cost basis, falling back to `quantity × purchase_price`.
    pub fn invested(&self) -> f64 {
        self.invested_amount
            .unwrap_or(self.quantity * self.purchase_price)
    }

    /// Check the invariants for the holding at position `index`.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        let fail = |reason: &str| CoreError::InvalidHolding {
            index,
            symbol: self.quote_symbol.clone(),
            reason: reason.to_string(),
        };

        if self.quote_symbol.trim().is_empty() {
            return Err(fail("quote symbol is empty"));
        }
        if self.scrape_symbol.trim().is_empty() {
            return Err(fail("scrape symbol is empty"));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(fail("quantity must be a positive number"));
        }
        if !self.purchase_price.is_finite() || self.purchase_price < 0.0 {
            return Err(fail("purchase price must be non-negative"));
        }
        if let Some(invested) = self.invested_amount {
            if !invested.is_finite() || invested < 0.0 {
                return Err(fail("invested amount must be non-negative"));
            }
        }
        Ok(())
    }

    /// Fill in the derived cost basis so downstream code never re-derives it.
    pub fn normalized(mut self) -> Self {
        self.invested_amount = Some(self.invested());
        self
    }
}
