use rust_decimal::Decimal;
use serde::Serialize;

/// Snapshot of an owner's aggregate converted net worth against the ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthProjection {
    pub base_currency: String,
    pub total: Decimal,
    pub ceiling: Decimal,
    pub headroom: Decimal,
}
