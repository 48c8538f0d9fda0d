pub const TRANSACTION_TYPE_INCOME: &str = "income";
pub const TRANSACTION_TYPE_EXPENSE: &str = "expense";
pub const TRANSACTION_TYPE_TRANSFER: &str = "transfer";

pub const TRANSACTION_STATUS_COMPLETED: &str = "completed";
pub const TRANSACTION_STATUS_PENDING: &str = "pending";

pub const SYSTEM_TYPE_BALANCE_ADJUSTMENT: &str = "balance_adjustment";

/// Maximum number of tag associations per transaction
pub const MAX_TAGS_PER_TRANSACTION: usize = 5;

/// Maximum length for merchant, counterparty and tag values
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for the free-text description
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
