/// Pivot currency all stored exchange rates are expressed against.
pub const PIVOT_CURRENCY: &str = "USD";

/// Maximum number of integer digits an aggregated net worth may carry.
pub const NET_WORTH_DIGIT_LIMIT: u32 = 15;

/// Scale used when persisting exchange rates.
pub const RATE_DECIMAL_PRECISION: u32 = 6;
