//! Account repository for chart-of-accounts database operations.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use rentra_core::ledger::{AccountInfo, AccountRules, AccountType, LedgerError, NormalBalance};
use rentra_shared::types::Currency;

use crate::entities::{chart_of_accounts, ledger_entries, sea_orm_active_enums};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning landlord.
    pub landlord_id: Uuid,
    /// Code, unique per landlord.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Account category.
    pub account_type: AccountType,
    /// Declared normal balance.
    pub normal_balance: NormalBalance,
    /// Contra accounts carry the unconventional side.
    pub is_contra: bool,
    /// Optional parent in the account tree.
    pub parent_id: Option<Uuid>,
    /// Home currency.
    pub currency: Currency,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New parent; `Some(None)` detaches from the tree.
    pub parent_id: Option<Option<Uuid>>,
    /// New account type. Rejected once the account has ledger entries.
    pub account_type: Option<AccountType>,
    /// New normal balance. Rejected once the account has ledger entries.
    pub normal_balance: Option<NormalBalance>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active flag.
    pub is_active: Option<bool>,
    /// Filter by parent account.
    pub parent_id: Option<Uuid>,
}

/// Converts a stored account row into the posting-validation view.
///
/// # Errors
///
/// Returns a database error when the stored currency code is unreadable;
/// the column is constrained, so this indicates corruption.
pub fn account_info(model: &chart_of_accounts::Model) -> Result<AccountInfo, DbErr> {
    let currency = Currency::from_str(&model.currency)
        .map_err(|e| DbErr::Custom(format!("account {}: {e}", model.id)))?;

    Ok(AccountInfo {
        id: model.id,
        landlord_id: model.landlord_id,
        is_active: model.is_active,
        currency,
    })
}

/// Account repository for chart-of-accounts maintenance.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account after running the chart-of-accounts rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken, the declared normal balance
    /// contradicts the type, the parent is missing or foreign, or the
    /// database operation fails.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        AccountRules::validate_normal_balance(
            input.account_type,
            input.normal_balance,
            input.is_contra,
        )?;

        let existing = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::LandlordId.eq(input.landlord_id))
            .filter(chart_of_accounts::Column::Code.eq(input.code.clone()))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(LedgerError::DuplicateAccountCode(input.code).into());
        }

        if let Some(parent_id) = input.parent_id {
            let parent = chart_of_accounts::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or(LedgerError::InvalidAccount(parent_id))?;
            if parent.landlord_id != input.landlord_id {
                return Err(LedgerError::ParentWrongLandlord(parent_id).into());
            }
        }

        let now = Utc::now().into();
        let account = chart_of_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            landlord_id: Set(input.landlord_id),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            normal_balance: Set(input.normal_balance.into()),
            is_contra: Set(input.is_contra),
            parent_id: Set(input.parent_id),
            currency: Set(input.currency.to_string()),
            is_active: Set(true),
            is_system_account: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(account.insert(&self.db).await?)
    }

    /// Updates an account's mutable fields.
    ///
    /// Reparenting re-runs the cycle check against the landlord's stored
    /// tree. Retyping is rejected once any ledger line references the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the new parent would
    /// create a cycle, the retype is illegal, or the database fails.
    pub async fn update_account(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let account = self.get_account(landlord_id, account_id).await?;

        let retyping = input.account_type.is_some() || input.normal_balance.is_some();
        if retyping && self.has_ledger_entries(account_id).await? {
            return Err(LedgerError::AccountInUse(account_id).into());
        }

        let account_type = input.account_type.unwrap_or(account.account_type.into());
        let normal_balance = input
            .normal_balance
            .unwrap_or(account.normal_balance.into());
        if retyping {
            AccountRules::validate_normal_balance(account_type, normal_balance, account.is_contra)?;
        }

        if let Some(Some(new_parent)) = input.parent_id {
            let tree = self.parent_tree(landlord_id).await?;
            if !tree.contains_key(&new_parent)
                && chart_of_accounts::Entity::find_by_id(new_parent)
                    .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id))
                    .one(&self.db)
                    .await?
                    .is_none()
            {
                return Err(LedgerError::InvalidAccount(new_parent).into());
            }
            AccountRules::validate_no_cycle(account_id, new_parent, |id| {
                tree.get(&id).copied().flatten()
            })?;
        }

        let mut active: chart_of_accounts::ActiveModel = account.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id);
        }
        if retyping {
            active.account_type = Set(account_type.into());
            active.normal_balance = Set(normal_balance.into());
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountInUse` for system accounts and for accounts
    /// referenced by any ledger line; hard deletion is never offered.
    pub async fn deactivate_account(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let account = self.get_account(landlord_id, account_id).await?;

        if account.is_system_account || self.has_ledger_entries(account_id).await? {
            return Err(LedgerError::AccountInUse(account_id).into());
        }

        let mut active: chart_of_accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Gets an account by ID, scoped to the landlord.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account is missing or foreign.
    pub async fn get_account(
        &self,
        landlord_id: Uuid,
        account_id: Uuid,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        chart_of_accounts::Entity::find_by_id(account_id)
            .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id))
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Lists accounts with optional filters, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        landlord_id: Uuid,
        filter: AccountFilter,
    ) -> Result<Vec<chart_of_accounts::Model>, AccountError> {
        let mut query = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id));

        if let Some(account_type) = filter.account_type {
            let db_type: sea_orm_active_enums::AccountType = account_type.into();
            query = query.filter(chart_of_accounts::Column::AccountType.eq(db_type));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(chart_of_accounts::Column::IsActive.eq(is_active));
        }
        if let Some(parent_id) = filter.parent_id {
            query = query.filter(chart_of_accounts::Column::ParentId.eq(parent_id));
        }

        Ok(query
            .order_by_asc(chart_of_accounts::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Loads the landlord's (account → parent) map for cycle checks.
    async fn parent_tree(
        &self,
        landlord_id: Uuid,
    ) -> Result<HashMap<Uuid, Option<Uuid>>, AccountError> {
        let accounts = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::LandlordId.eq(landlord_id))
            .all(&self.db)
            .await?;

        Ok(accounts.into_iter().map(|a| (a.id, a.parent_id)).collect())
    }

    async fn has_ledger_entries(&self, account_id: Uuid) -> Result<bool, AccountError> {
        let count = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(currency: &str) -> chart_of_accounts::Model {
        let now = Utc::now().into();
        chart_of_accounts::Model {
            id: Uuid::now_v7(),
            landlord_id: Uuid::now_v7(),
            code: "1000".to_string(),
            name: "Operating Bank".to_string(),
            description: None,
            account_type: sea_orm_active_enums::AccountType::Asset,
            normal_balance: sea_orm_active_enums::NormalBalance::Debit,
            is_contra: false,
            parent_id: None,
            currency: currency.to_string(),
            is_active: true,
            is_system_account: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_account_info_conversion() {
        let row = model("GHS");
        let info = account_info(&row).unwrap();
        assert_eq!(info.id, row.id);
        assert_eq!(info.landlord_id, row.landlord_id);
        assert!(info.is_active);
        assert_eq!(info.currency, Currency::Ghs);
    }

    #[test]
    fn test_account_info_rejects_unknown_currency() {
        let row = model("XYZ");
        assert!(account_info(&row).is_err());
    }
}
