use std::collections::HashMap;
use std::sync::OnceLock;

use super::fx_errors::FxError;

static MINOR_UNITS: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();

fn minor_units_map() -> &'static HashMap<&'static str, u32> {
    MINOR_UNITS.get_or_init(|| {
        let mut map = HashMap::new();

        // Zero-decimal currencies
        for code in [
            "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND",
            "VUV", "XAF", "XOF", "XPF",
        ] {
            map.insert(code, 0);
        }

        // Three-decimal currencies
        for code in ["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"] {
            map.insert(code, 3);
        }

        map
    })
}

/// Number of minor units (decimal places) for an ISO 4217 currency code.
/// Unknown codes fall back to the common two-decimal case.
pub fn decimal_places(currency_code: &str) -> u32 {
    minor_units_map().get(currency_code).copied().unwrap_or(2)
}

/// Validates that a currency code is three alphabetic characters.
pub fn validate_currency_code(code: &str) -> Result<(), FxError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FxError::InvalidCurrencyCode(code.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places("USD"), 2);
        assert_eq!(decimal_places("JPY"), 0);
        assert_eq!(decimal_places("BHD"), 3);
        assert_eq!(decimal_places("XYZ"), 2);
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("EUR").is_ok());
        assert!(validate_currency_code("EU").is_err());
        assert!(validate_currency_code("EUR1").is_err());
        assert!(validate_currency_code("E1R").is_err());
    }
}
