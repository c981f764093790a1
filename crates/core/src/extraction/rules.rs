use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::errors::CoreError;
use crate::models::record::ScrapedMetrics;
use super::document::{element_text, enclosing_row, has_text, last_label, text_chunks};

/// Texts the quote pages print in place of a missing value.
const PLACEHOLDERS: &[&str] = &["-", "--", "—", "–", "n/a", "na", "none"];

/// Label anchors on Google Finance quote pages.
pub const PE_RATIO_LABEL: &str = "P/E ratio";
pub const REVENUE_LABEL: &str = "Revenue";

/// Value cell next to a key-stat label.
pub const KEY_STAT_VALUE_SELECTOR: &str = ".P6K39c";
/// First figure column in the financials table.
pub const FINANCIALS_VALUE_SELECTOR: &str = ".QXDnM";

const RATIO_PATTERN: &str = r"^-?\d[\d,]*(?:\.\d+)?$";
const MAGNITUDE_PATTERN: &str = r"(?i)^-?\d[\d,]*(?:\.\d+)?\s?[a-z]{1,3}$";

/// How many enclosing levels above a label are searched for a sibling value.
const SIBLING_DEPTH: usize = 3;

/// Texts that carry no value even though a rule matched them.
pub fn is_placeholder(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || PLACEHOLDERS.iter().any(|p| t.eq_ignore_ascii_case(p))
}

fn parse_selector(css: &str) -> Result<Selector, CoreError> {
    Selector::parse(css)
        .map_err(|e| CoreError::Config(format!("invalid extraction selector {css:?}: {e:?}")))
}

fn parse_pattern(pattern: &str) -> Result<Regex, CoreError> {
    Regex::new(pattern).map_err(|e| CoreError::Config(format!("invalid extraction pattern: {e}")))
}

/// One way of locating a value in a quote page.
///
/// Rules return the raw candidate; placeholder filtering happens in
/// [`RuleChain`] so every rule gets it for free.
pub trait ExtractionRule: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    fn extract(&self, page: &Html) -> Option<String>;
}

/// The element matching `value` among the following siblings of the last
/// `label`, or of one of its enclosing elements.
pub struct LabelSiblingRule {
    label: String,
    value: Selector,
}

impl LabelSiblingRule {
    pub fn new(label: impl Into<String>, value_selector: &str) -> Result<Self, CoreError> {
        Ok(Self {
            label: label.into(),
            value: parse_selector(value_selector)?,
        })
    }

    fn sibling_value(&self, element: ElementRef<'_>) -> Option<String> {
        element
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find_map(|sibling| {
                if self.value.matches(&sibling) {
                    Some(sibling)
                } else {
                    sibling.select(&self.value).next()
                }
            })
            .map(element_text)
    }
}

impl ExtractionRule for LabelSiblingRule {
    fn name(&self) -> &str {
        "label-sibling"
    }

    fn extract(&self, page: &Html) -> Option<String> {
        let chunks = text_chunks(page.root_element());
        let anchor = chunks[last_label(&chunks, &self.label)?].parent;

        std::iter::once(anchor)
            .chain(anchor.ancestors().filter_map(ElementRef::wrap))
            .take(SIBLING_DEPTH + 1)
            .find_map(|level| self.sibling_value(level))
    }
}

/// The first text matching `pattern` within `window` text nodes after the
/// last `label`.
pub struct LabelPatternRule {
    label: String,
    pattern: Regex,
    window: usize,
}

impl LabelPatternRule {
    pub fn new(label: impl Into<String>, pattern: &str, window: usize) -> Result<Self, CoreError> {
        Ok(Self {
            label: label.into(),
            pattern: parse_pattern(pattern)?,
            window,
        })
    }
}

impl ExtractionRule for LabelPatternRule {
    fn name(&self) -> &str {
        "label-pattern"
    }

    fn extract(&self, page: &Html) -> Option<String> {
        let chunks = text_chunks(page.root_element());
        let idx = last_label(&chunks, &self.label)?;
        chunks[idx + 1..]
            .iter()
            .take(self.window)
            .map(|c| c.text.as_str())
            .find(|t| self.pattern.is_match(t))
            .map(str::to_string)
    }
}

/// A text matching `pattern` in the table row of the last `label`, after the
/// label cell.
pub struct RowPatternRule {
    label: String,
    pattern: Regex,
}

impl RowPatternRule {
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self, CoreError> {
        Ok(Self {
            label: label.into(),
            pattern: parse_pattern(pattern)?,
        })
    }
}

impl ExtractionRule for RowPatternRule {
    fn name(&self) -> &str {
        "row-pattern"
    }

    fn extract(&self, page: &Html) -> Option<String> {
        let chunks = text_chunks(page.root_element());
        let anchor = chunks[last_label(&chunks, &self.label)?].parent;
        let row = text_chunks(enclosing_row(anchor)?);

        // only cells after the label itself
        let start = row
            .iter()
            .rposition(|c| c.parent.id() == anchor.id() && c.text.eq_ignore_ascii_case(&self.label))?
            + 1;
        row[start..]
            .iter()
            .map(|c| c.text.as_str())
            .find(|t| self.pattern.is_match(t))
            .map(str::to_string)
    }
}

/// The first element matching `selector`, wherever it is. Fixed-position
/// fallback.
pub struct SelectorRule {
    selector: Selector,
}

impl SelectorRule {
    pub fn new(selector: &str) -> Result<Self, CoreError> {
        Ok(Self {
            selector: parse_selector(selector)?,
        })
    }
}

impl ExtractionRule for SelectorRule {
    fn name(&self) -> &str {
        "selector"
    }

    fn extract(&self, page: &Html) -> Option<String> {
        page.select(&self.selector).next().map(element_text)
    }
}

/// Ordered fallbacks for one field. The first rule producing a usable
/// (non-empty, non-placeholder) value wins.
#[derive(Default)]
pub struct RuleChain {
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: impl ExtractionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn ExtractionRule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn first_match(&self, page: &Html) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            let value = rule.extract(page)?;
            if is_placeholder(&value) {
                tracing::debug!(rule = rule.name(), value = %value, "placeholder rejected");
                return None;
            }
            Some(value.trim().to_string())
        })
    }
}

/// Extraction rules for both scraped fields.
pub struct MetricRules {
    pub valuation_ratio: RuleChain,
    pub latest_earnings: RuleChain,
}

impl MetricRules {
    /// Rules matching the current Google Finance quote-page layout.
    pub fn google_finance() -> Result<Self, CoreError> {
        let valuation_ratio = RuleChain::new()
            .with(LabelSiblingRule::new(PE_RATIO_LABEL, KEY_STAT_VALUE_SELECTOR)?)
            .with(LabelPatternRule::new(PE_RATIO_LABEL, RATIO_PATTERN, 6)?);

        let latest_earnings = RuleChain::new()
            .with(RowPatternRule::new(REVENUE_LABEL, MAGNITUDE_PATTERN)?)
            .with(SelectorRule::new(FINANCIALS_VALUE_SELECTOR)?);

        Ok(Self {
            valuation_ratio,
            latest_earnings,
        })
    }

    /// Run both chains independently over one parsed page.
    pub fn extract(&self, page: &Html) -> ScrapedMetrics {
        ScrapedMetrics {
            valuation_ratio: self.valuation_ratio.first_match(page),
            latest_earnings: self.latest_earnings.first_match(page),
        }
    }

    /// Parse `html` and extract both fields. `None` when the document has no
    /// visible text at all.
    pub fn extract_from_str(&self, html: &str) -> Option<ScrapedMetrics> {
        let page = Html::parse_document(html);
        has_text(&page).then(|| self.extract(&page))
    }
}
