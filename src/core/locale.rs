//! Display language and currency

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Ar => "ar",
        }
    }

    /// Text direction for the page layout
    pub fn direction(&self) -> &'static str {
        match self {
            Language::Ar => "rtl",
            _ => "ltr",
        }
    }
}

impl FromStr for Language {
    type Err = UnsupportedCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "de" => Ok(Language::De),
            "ar" => Ok(Language::Ar),
            _ => Err(UnsupportedCode(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Display currency; stored prices are always EUR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Aed,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Usd, Currency::Aed];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Aed => "AED",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Aed => "AED ",
        }
    }
}

impl FromStr for Currency {
    type Err = UnsupportedCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "AED" => Ok(Currency::Aed),
            _ => Err(UnsupportedCode(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A language or currency code that is not supported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCode(pub String);

impl fmt::Display for UnsupportedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported code: {}", self.0)
    }
}

impl std::error::Error for UnsupportedCode {}

/// EUR conversion rates used to display prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates(HashMap<Currency, f64>);

impl ExchangeRates {
    pub fn new(rates: HashMap<Currency, f64>) -> Self {
        Self(rates)
    }

    /// Rate for one EUR; unknown currencies convert 1:1
    pub fn rate(&self, currency: Currency) -> f64 {
        self.0.get(&currency).copied().unwrap_or(1.0)
    }

    /// Format an EUR amount in `currency`, rounded to whole units
    pub fn format_price(&self, eur: u32, currency: Currency) -> String {
        let converted = f64::from(eur) * self.rate(currency);
        format!("{}{:.0}", currency.symbol(), converted)
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self(HashMap::from([
            (Currency::Eur, 1.0),
            (Currency::Usd, 1.08),
            (Currency::Aed, 3.95),
        ]))
    }
}
