//! Portal-wide settings stored as key/value rows in the `app_settings` table.

use crate::{
    entities::{AppSetting, app_setting},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Key of the company name shown on reports
pub const COMPANY_NAME_KEY: &str = "company_name";

/// Reads a setting value by key.
pub async fn get_setting<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let setting = AppSetting::find()
        .filter(app_setting::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(setting.map(|s| s.value))
}

/// Writes a setting, inserting the key if it does not exist yet.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank key.
pub async fn set_setting<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    if key.trim().is_empty() {
        return Err(Error::validation("setting key cannot be empty"));
    }
    let now = Utc::now().naive_utc();

    let existing = AppSetting::find()
        .filter(app_setting::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(setting) = existing {
        let mut active_model: app_setting::ActiveModel = setting.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        app_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// The stored company name, if one was ever set.
pub async fn company_name(db: &DatabaseConnection) -> Result<Option<String>> {
    get_setting(db, COMPANY_NAME_KEY).await
}

/// Stores `default_name` as the company name unless one is already set, so that names
/// edited through the portal survive restarts. Returns the effective name.
pub async fn seed_company_name(db: &DatabaseConnection, default_name: &str) -> Result<String> {
    if let Some(existing) = company_name(db).await? {
        return Ok(existing);
    }
    set_setting(db, COMPANY_NAME_KEY, default_name).await?;
    info!("Company name set to '{}'", default_name);
    Ok(default_name.to_string())
}
