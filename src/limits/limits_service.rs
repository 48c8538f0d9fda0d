use std::sync::Arc;

use chrono::Utc;
use log::error;
use rust_decimal::Decimal;

use super::limits_errors::LimitsError;
use super::limits_model::NetWorthProjection;
use super::limits_traits::NetWorthGuardTrait;
use crate::constants::NET_WORTH_DIGIT_LIMIT;
use crate::errors::Result;
use crate::fx::currency::decimal_places;
use crate::fx::FxServiceTrait;
use crate::settings::SettingsRepositoryTrait;
use crate::wallets::WalletRepositoryTrait;

/// Maximum representable aggregate balance for a currency with `scale` minor
/// units: fifteen integer nines followed by `scale` fractional nines, built
/// exactly rather than through floating point.
pub fn ceiling_for_scale(scale: u32) -> Decimal {
    let digits = NET_WORTH_DIGIT_LIMIT + scale;
    Decimal::from_i128_with_scale(10i128.pow(digits) - 1, scale)
}

/// Guards mutations against pushing an owner's aggregate converted net worth
/// past the storage ceiling.
pub struct NetWorthGuard {
    wallet_repository: Arc<dyn WalletRepositoryTrait>,
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
}

impl NetWorthGuard {
    pub fn new(
        wallet_repository: Arc<dyn WalletRepositoryTrait>,
        settings_repository: Arc<dyn SettingsRepositoryTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
    ) -> Self {
        Self {
            wallet_repository,
            settings_repository,
            fx_service,
        }
    }

    fn convert_or_raw(&self, amount: Decimal, from: &str, to: &str) -> Decimal {
        let today = Utc::now().date_naive();
        self.fx_service
            .convert_for_date(amount, from, to, today)
            .unwrap_or_else(|e| {
                error!("Currency conversion error: {:?}", e);
                amount
            })
    }

    /// Sum of every wallet balance the owner holds, converted into their base
    /// currency. Inclusion flags are ignored on purpose: the ceiling protects
    /// storage, not display filtering.
    fn current_net_worth(&self, owner_id: &str, base_currency: &str) -> Result<Decimal> {
        let wallets = self.wallet_repository.list_wallets(owner_id)?;

        let mut total = Decimal::ZERO;
        for wallet in wallets {
            total += self.convert_or_raw(wallet.current_balance, &wallet.currency, base_currency);
        }
        Ok(total)
    }

    pub fn project_net_worth(&self, owner_id: &str) -> Result<NetWorthProjection> {
        let base_currency = self.settings_repository.get_base_currency(owner_id)?;
        let total = self.current_net_worth(owner_id, &base_currency)?;
        let ceiling = ceiling_for_scale(decimal_places(&base_currency));

        Ok(NetWorthProjection {
            headroom: ceiling - total,
            base_currency,
            total,
            ceiling,
        })
    }
}

impl NetWorthGuardTrait for NetWorthGuard {
    fn check_projected_net_worth(
        &self,
        owner_id: &str,
        pending_delta: Decimal,
        delta_currency: &str,
    ) -> Result<()> {
        // Decreases can never breach the ceiling
        if pending_delta <= Decimal::ZERO {
            return Ok(());
        }

        let base_currency = self.settings_repository.get_base_currency(owner_id)?;
        let current = self.current_net_worth(owner_id, &base_currency)?;
        let converted_delta = self.convert_or_raw(pending_delta, delta_currency, &base_currency);

        let ceiling = ceiling_for_scale(decimal_places(&base_currency));
        let projected = current + converted_delta;

        if projected > ceiling {
            let headroom = (ceiling - current).max(Decimal::ZERO);
            // Rounded toward zero so the reported maximum is never more than
            // the wallet can actually absorb.
            let max_allowed = self
                .convert_or_raw(headroom, &base_currency, delta_currency)
                .round_dp_with_strategy(
                    decimal_places(delta_currency),
                    rust_decimal::RoundingStrategy::ToZero,
                )
                .max(Decimal::ZERO);

            return Err(LimitsError::CeilingExceeded {
                currency: delta_currency.to_string(),
                max_allowed,
            }
            .into());
        }

        Ok(())
    }
}
