pub mod limits_errors;
pub mod limits_model;
pub mod limits_service;
pub mod limits_traits;

pub use limits_errors::LimitsError;
pub use limits_model::NetWorthProjection;
pub use limits_service::{ceiling_for_scale, NetWorthGuard};
pub use limits_traits::NetWorthGuardTrait;
