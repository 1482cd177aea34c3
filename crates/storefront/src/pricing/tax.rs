use crate::model::Money;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Tax rate per state, with a fallback for states not listed.
///
/// State names are matched case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRateTable {
    rates: HashMap<String, Money>,
    default_rate: Money,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum TaxTableError {
    #[error("Malformed tax table entry '{0}', expected STATE=RATE")]
    MalformedEntry(String),
    #[error("Invalid tax rate '{rate}' for {state}")]
    InvalidRate { state: String, rate: String },
}

impl TaxRateTable {
    pub fn new(default_rate: Money) -> Self {
        Self {
            rates: HashMap::new(),
            default_rate,
        }
    }

    pub fn with_rate(mut self, state: &str, rate: Money) -> Self {
        self.rates.insert(normalize(state), rate);
        self
    }

    pub fn rate_for(&self, state: &str) -> Money {
        self.rates
            .get(&normalize(state))
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn default_rate(&self) -> Money {
        self.default_rate
    }
}

fn normalize(state: &str) -> String {
    state.trim().to_lowercase()
}

/// Parses `"Delhi=0.18,Maharashtra=0.18,*=0.12"`. `*` sets the default (zero when absent).
impl FromStr for TaxRateTable {
    type Err = TaxTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = TaxRateTable::new(Decimal::ZERO);
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (state, rate) = entry
                .split_once('=')
                .ok_or_else(|| TaxTableError::MalformedEntry(entry.to_string()))?;
            let (state, rate) = (state.trim(), rate.trim());
            if state.is_empty() {
                return Err(TaxTableError::MalformedEntry(entry.to_string()));
            }
            let parsed = Decimal::from_str(rate)
                .ok()
                .filter(|r| !r.is_sign_negative())
                .ok_or_else(|| TaxTableError::InvalidRate {
                    state: state.to_string(),
                    rate: rate.to_string(),
                })?;

            if state == "*" {
                table.default_rate = parsed;
            } else {
                table = table.with_rate(state, parsed);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table: TaxRateTable = "Delhi=0.18, *=0.12".parse().unwrap();
        assert_eq!(table.rate_for("  delhi "), dec!(0.18));
        assert_eq!(table.rate_for("DELHI"), dec!(0.18));
        assert_eq!(table.rate_for("Goa"), dec!(0.12));
    }

    #[test]
    fn default_is_zero_without_wildcard() {
        let table: TaxRateTable = "Delhi=0.18".parse().unwrap();
        assert_eq!(table.rate_for("Kerala"), Decimal::ZERO);
    }

    #[test]
    fn rejects_bad_entries() {
        assert_eq!(
            "Delhi".parse::<TaxRateTable>(),
            Err(TaxTableError::MalformedEntry("Delhi".into()))
        );
        assert!(matches!(
            "Delhi=lots".parse::<TaxRateTable>(),
            Err(TaxTableError::InvalidRate { .. })
        ));
        assert!("Delhi=-0.1".parse::<TaxRateTable>().is_err());
    }
}
