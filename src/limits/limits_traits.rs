use rust_decimal::Decimal;

use crate::errors::Result;

/// Trait defining the net-worth ceiling check invoked before any
/// balance-increasing mutation commits.
pub trait NetWorthGuardTrait: Send + Sync {
    /// Rejects when the owner's aggregate converted net worth plus
    /// `pending_delta` would strictly exceed the ceiling for their base
    /// currency. Decreases always pass.
    fn check_projected_net_worth(
        &self,
        owner_id: &str,
        pending_delta: Decimal,
        delta_currency: &str,
    ) -> Result<()>;
}
