use sea_orm::{ActiveValue, TransactionTrait, prelude::*, sea_query::OnConflict};

use crate::{Currency, ResultEngine, UserSettings, user_settings, util::normalize_owner};

use super::{Engine, with_tx};

impl Engine {
    /// Return the owner's settings, creating them with the default currency
    /// on first access.
    pub async fn settings(&self, owner_id: &str) -> ResultEngine<UserSettings> {
        let owner_id = normalize_owner(owner_id)?;

        if let Some(model) = user_settings::Entity::find_by_id(owner_id.as_str())
            .one(&self.database)
            .await?
        {
            return UserSettings::try_from(model);
        }

        self.store_currency(&owner_id, Currency::default(), false)
            .await
    }

    /// Set the owner's display currency.
    pub async fn update_currency(&self, owner_id: &str, code: &str) -> ResultEngine<UserSettings> {
        let owner_id = normalize_owner(owner_id)?;
        let currency = Currency::try_from(code)?;
        self.store_currency(&owner_id, currency, true).await
    }

    /// Currency used to format the owner's amounts. Read-only: an owner
    /// without settings gets the default currency.
    pub async fn currency(&self, owner_id: &str) -> ResultEngine<Currency> {
        let owner_id = normalize_owner(owner_id)?;
        match user_settings::Entity::find_by_id(owner_id)
            .one(&self.database)
            .await?
        {
            Some(model) => Currency::try_from(model.currency.as_str()),
            None => Ok(Currency::default()),
        }
    }

    /// Insert the settings row; on an existing row either overwrite the
    /// currency or keep what is there (two first accesses may race).
    async fn store_currency(
        &self,
        owner_id: &str,
        currency: Currency,
        overwrite: bool,
    ) -> ResultEngine<UserSettings> {
        with_tx!(self, |db_tx| {
            let mut on_conflict = OnConflict::column(user_settings::Column::OwnerId);
            if overwrite {
                on_conflict.update_column(user_settings::Column::Currency);
            } else {
                on_conflict.do_nothing();
            }

            user_settings::Entity::insert(user_settings::ActiveModel {
                owner_id: ActiveValue::Set(owner_id.to_string()),
                currency: ActiveValue::Set(currency.code().to_string()),
            })
            .on_conflict(on_conflict)
            .exec_without_returning(&db_tx)
            .await?;

            let model = user_settings::Entity::find_by_id(owner_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| crate::EngineError::KeyNotFound("user settings".to_string()))?;
            UserSettings::try_from(model)
        })
    }
}
