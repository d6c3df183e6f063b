//! Locale-bound formatting for amounts, dates and captions
//!
//! The aggregator never hardcodes a locale: everything it renders goes
//! through a [`LocaleConfig`], which defaults to Brazilian Portuguese.

use chrono::{DateTime, FixedOffset, Locale, Offset, Utc};
use numfmt::{Formatter, Precision};

use crate::types::{GoFinancesError, Result};

/// Formatting configuration for one audience
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Currency symbol, e.g. "R$"
    pub currency_symbol: String,
    /// Text between symbol and digits (pt-BR uses a no-break space)
    pub symbol_spacing: String,
    pub grouping_separator: char,
    pub decimal_separator: char,
    /// Locale used for month names
    pub date_locale: Locale,
    /// strftime pattern for list dates
    pub short_date_format: String,
    /// strftime pattern for the day named in captions
    pub caption_day_format: String,
    /// Zone dates are shown in
    pub offset: FixedOffset,
    /// Caption used when a subset has no transactions
    pub no_transactions: String,
    pub last_entry_prefix: String,
    pub last_expense_prefix: String,
    pub total_range_prefix: String,
}

impl LocaleConfig {
    /// Brazilian Portuguese, BRL
    pub fn pt_br() -> Self {
        Self {
            currency_symbol: "R$".into(),
            symbol_spacing: "\u{a0}".into(),
            grouping_separator: '.',
            decimal_separator: ',',
            date_locale: Locale::pt_BR,
            short_date_format: "%d/%m/%y".into(),
            caption_day_format: "%-d de %B".into(),
            offset: utc(),
            no_transactions: "Não há transações".into(),
            last_entry_prefix: "Última entrada dia ".into(),
            last_expense_prefix: "Última saída dia ".into(),
            total_range_prefix: "01 à ".into(),
        }
    }

    /// US English, USD
    pub fn en_us() -> Self {
        Self {
            currency_symbol: "$".into(),
            symbol_spacing: String::new(),
            grouping_separator: ',',
            decimal_separator: '.',
            date_locale: Locale::en_US,
            short_date_format: "%m/%d/%y".into(),
            caption_day_format: "%B %-d".into(),
            offset: utc(),
            no_transactions: "No transactions".into(),
            last_entry_prefix: "Last entry on ".into(),
            last_expense_prefix: "Last exit on ".into(),
            total_range_prefix: "01 to ".into(),
        }
    }

    /// Resolve a preset from a tag such as "pt-BR", "pt_br" or "en"
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::pt_br()),
            "en-us" | "en" => Ok(Self::en_us()),
            other => Err(GoFinancesError::Config(format!(
                "unsupported locale \"{}\" (expected pt-BR or en-US)",
                other
            ))),
        }
    }

    /// Show dates in a different zone
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Render an amount as currency: `R$ 1.234,50`, `-R$ 600,00`
    pub fn format_currency(&self, value: f64) -> String {
        // Half away from zero on cents; anything that rounds to zero prints unsigned
        let rounded = (value * 100.0).round() / 100.0;
        let prefix = if rounded < 0.0 {
            format!("-{}{}", self.currency_symbol, self.symbol_spacing)
        } else {
            format!("{}{}", self.currency_symbol, self.symbol_spacing)
        };
        let amount = rounded.abs();

        // numfmt renders zero as a bare "0"
        if amount == 0.0 {
            return format!("{}0{}00", prefix, self.decimal_separator);
        }

        let mut formatted = self.grouped_currency(&prefix, amount).unwrap_or_else(|| {
            let digits = format!("{:.2}", amount);
            format!("{}{}", prefix, digits.replace('.', &self.decimal_separator.to_string()))
        });

        // numfmt drops trailing zeros: "12,3" and "400,0"
        pad_cents(&mut formatted, self.decimal_separator);
        formatted
    }

    /// Grouped rendering through numfmt, or `None` when it cannot express
    /// this locale or magnitude
    fn grouped_currency(&self, prefix: &str, amount: f64) -> Option<String> {
        // numfmt pairs '.' grouping with a ',' decimal mark and vice versa
        let numfmt_decimal = match self.grouping_separator {
            '.' => ',',
            _ => '.',
        };
        if numfmt_decimal != self.decimal_separator || amount >= NUMFMT_FIXED_LIMIT {
            return None;
        }

        let formatter = Formatter::currency(prefix)
            .and_then(|f| f.separator(self.grouping_separator))
            .map(|f| f.precision(Precision::Decimals(2)));

        match formatter {
            Ok(formatter) => Some(formatter.fmt_string(amount)),
            Err(e) => {
                tracing::warn!(prefix, error = %e, "currency formatter unavailable");
                None
            }
        }
    }

    /// Render a list date: `05/01/24`
    pub fn format_short_date(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.offset)
            .format_localized(&self.short_date_format, self.date_locale)
            .to_string()
    }

    /// Render the day named in captions: `10 de janeiro`
    pub fn format_caption_day(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.offset)
            .format_localized(&self.caption_day_format, self.date_locale)
            .to_string()
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::pt_br()
    }
}

/// numfmt switches to scientific notation from here on
const NUMFMT_FIXED_LIMIT: f64 = 1_000_000_000_000.0;

/// Pad the digits after the last `decimal` mark to two, appending the mark if absent
fn pad_cents(formatted: &mut String, decimal: char) {
    match formatted.rfind(decimal) {
        Some(pos) => {
            let cents = formatted[pos + decimal.len_utf8()..].chars().count();
            for _ in cents..2 {
                formatted.push('0');
            }
        }
        None => {
            formatted.push(decimal);
            formatted.push_str("00");
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
