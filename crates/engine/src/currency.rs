use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents};

/// Display currency chosen by a user.
///
/// The ledger itself is currency-agnostic: amounts are stored as `i64` minor
/// units and the currency only drives formatting. Both supported currencies
/// use 2 minor units, so `10.50` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    #[default]
    Brl,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Brl => "BRL",
        }
    }

    /// Formats an amount the way the currency's locale writes it.
    ///
    /// ```rust
    /// use engine::{Currency, MoneyCents};
    ///
    /// assert_eq!(Currency::Usd.format(MoneyCents::new(123_456)), "$1,234.56");
    /// assert_eq!(Currency::Brl.format(MoneyCents::new(123_456)), "R$ 1.234,56");
    /// ```
    #[must_use]
    pub fn format(self, amount: MoneyCents) -> String {
        let (symbol, group, decimal) = match self {
            Currency::Usd => ("$", ',', '.'),
            Currency::Brl => ("R$ ", '.', ','),
        };
        let sign = if amount.cents() < 0 { "-" } else { "" };
        let abs = amount.cents().unsigned_abs();
        let units = group_thousands(abs / 100, group);
        format!("{sign}{symbol}{units}{decimal}{:02}", abs % 100)
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "BRL" => Ok(Currency::Brl),
            other => Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
