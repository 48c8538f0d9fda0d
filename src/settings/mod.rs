pub mod settings_model;
pub mod settings_repository;

pub use settings_model::OwnerSettings;
pub use settings_repository::{SettingsRepository, SettingsRepositoryTrait};
