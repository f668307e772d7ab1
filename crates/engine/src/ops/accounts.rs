use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{Account, AccountNew, AccountPatch, EngineError, ResultEngine, accounts};

use super::{Engine, normalize_required_text, with_tx};

fn validate_open_range(
    opened_on: Option<NaiveDate>,
    closed_on: Option<NaiveDate>,
) -> ResultEngine<()> {
    if let (Some(opened), Some(closed)) = (opened_on, closed_on)
        && closed < opened
    {
        return Err(EngineError::InvalidInput(
            "account close date must not precede its open date".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: i32,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {account_id}")))
    }

    async fn ensure_number_free(
        &self,
        db_tx: &DatabaseTransaction,
        number: &str,
        except: Option<i32>,
    ) -> ResultEngine<()> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Number.eq(number));
        if let Some(account_id) = except {
            query = query.filter(accounts::Column::Id.ne(account_id));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ExistingKey(format!("account number {number}")));
        }
        Ok(())
    }

    /// List accounts ordered by number. Inactive accounts are hidden unless
    /// requested.
    pub async fn list_accounts(&self, include_inactive: bool) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let mut query = accounts::Entity::find();
            if !include_inactive {
                query = query.filter(accounts::Column::Active.eq(true));
            }
            let models = query
                .order_by_asc(accounts::Column::Number)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Account::from).collect())
        })
    }

    pub async fn account(&self, account_id: i32) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            Ok(Account::from(self.require_account(&db_tx, account_id).await?))
        })
    }

    /// Create an account. The number must be unique.
    pub async fn create_account(&self, cmd: AccountNew) -> ResultEngine<Account> {
        let number = normalize_required_text(&cmd.number, "account number")?;
        validate_open_range(cmd.opened_on, cmd.closed_on)?;
        with_tx!(self, |db_tx| {
            self.ensure_number_free(&db_tx, &number, None).await?;
            let model = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                number: ActiveValue::Set(number.clone()),
                description: ActiveValue::Set(cmd.description.trim().to_string()),
                project: ActiveValue::Set(cmd.project.trim().to_string()),
                opened_on: ActiveValue::Set(cmd.opened_on),
                closed_on: ActiveValue::Set(cmd.closed_on),
                active: ActiveValue::Set(true),
            }
            .insert(&db_tx)
            .await?;
            tracing::debug!(
                account_id = model.id,
                number = number.as_str(),
                "created account"
            );
            Ok(Account::from(model))
        })
    }

    pub async fn update_account(
        &self,
        account_id: i32,
        patch: AccountPatch,
    ) -> ResultEngine<Account> {
        let number = patch
            .number
            .as_deref()
            .map(|number| normalize_required_text(number, "account number"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let current = self.require_account(&db_tx, account_id).await?;
            validate_open_range(
                patch.opened_on.unwrap_or(current.opened_on),
                patch.closed_on.unwrap_or(current.closed_on),
            )?;

            let mut active = accounts::ActiveModel {
                id: ActiveValue::Unchanged(account_id),
                ..Default::default()
            };
            if let Some(number) = &number {
                self.ensure_number_free(&db_tx, number, Some(account_id))
                    .await?;
                active.number = ActiveValue::Set(number.clone());
            }
            if let Some(description) = &patch.description {
                active.description = ActiveValue::Set(description.trim().to_string());
            }
            if let Some(project) = &patch.project {
                active.project = ActiveValue::Set(project.trim().to_string());
            }
            if let Some(opened_on) = patch.opened_on {
                active.opened_on = ActiveValue::Set(opened_on);
            }
            if let Some(closed_on) = patch.closed_on {
                active.closed_on = ActiveValue::Set(closed_on);
            }
            if let Some(flag) = patch.active {
                active.active = ActiveValue::Set(flag);
            }
            if !active.is_changed() {
                return Ok(Account::from(current));
            }
            Ok(Account::from(active.update(&db_tx).await?))
        })
    }

    /// Soft-delete an account. Splits keep referencing it.
    pub async fn delete_account(&self, account_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id).await?;
            accounts::ActiveModel {
                id: ActiveValue::Unchanged(account_id),
                active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
