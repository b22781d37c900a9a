//! Chart of accounts typing and hierarchy rules.
//!
//! Account categories form a closed set; each category carries a
//! conventional normal balance, validated once at account creation rather
//! than re-derived from strings at posting time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;

/// Account category in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (bank, rent receivable, deposits held).
    Asset,
    /// Obligations owed (security deposit liability, payables).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned (rent revenue, late fees).
    Revenue,
    /// Costs incurred (maintenance, utilities).
    Expense,
}

/// The side on which an account naturally accumulates value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Balance grows with debits.
    Debit,
    /// Balance grows with credits.
    Credit,
}

impl AccountType {
    /// Returns the conventional normal balance for this account type.
    ///
    /// Assets and expenses are debit-normal; liabilities, equity, and
    /// revenue are credit-normal.
    #[must_use]
    pub const fn conventional_normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

impl NormalBalance {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Maximum depth of the account tree walked when checking for cycles.
///
/// Real charts of accounts are a handful of levels deep; hitting this bound
/// means the stored tree is already corrupt.
const MAX_ANCESTOR_DEPTH: usize = 32;

/// Pure validation rules for chart-of-accounts maintenance.
pub struct AccountRules;

impl AccountRules {
    /// Validates that an account's declared normal balance matches its type.
    ///
    /// Contra accounts (e.g., accumulated depreciation held as an asset)
    /// carry the opposite sign and are exempt.
    ///
    /// # Errors
    ///
    /// Returns `NormalBalanceMismatch` when a non-contra account declares
    /// the unconventional side.
    pub fn validate_normal_balance(
        account_type: AccountType,
        normal_balance: NormalBalance,
        is_contra: bool,
    ) -> Result<(), LedgerError> {
        let conventional = account_type.conventional_normal_balance();
        let expected = if is_contra {
            conventional.opposite()
        } else {
            conventional
        };

        if normal_balance == expected {
            Ok(())
        } else {
            Err(LedgerError::NormalBalanceMismatch {
                account_type,
                normal_balance,
            })
        }
    }

    /// Checks that attaching `account_id` under `parent_id` keeps the tree
    /// acyclic, walking the ancestor chain through `parent_lookup`.
    ///
    /// The walk is bounded; client-supplied trees are never trusted.
    ///
    /// # Errors
    ///
    /// Returns `ParentCycle` if the chain revisits `account_id` or exceeds
    /// the depth bound.
    pub fn validate_no_cycle<F>(
        account_id: Uuid,
        parent_id: Uuid,
        parent_lookup: F,
    ) -> Result<(), LedgerError>
    where
        F: Fn(Uuid) -> Option<Uuid>,
    {
        if account_id == parent_id {
            return Err(LedgerError::ParentCycle(account_id));
        }

        let mut current = Some(parent_id);
        for _ in 0..MAX_ANCESTOR_DEPTH {
            match current {
                None => return Ok(()),
                Some(ancestor) if ancestor == account_id => {
                    return Err(LedgerError::ParentCycle(account_id));
                }
                Some(ancestor) => current = parent_lookup(ancestor),
            }
        }

        Err(LedgerError::ParentCycle(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_conventional_normal_balance() {
        assert_eq!(
            AccountType::Asset.conventional_normal_balance(),
            NormalBalance::Debit
        );
        assert_eq!(
            AccountType::Expense.conventional_normal_balance(),
            NormalBalance::Debit
        );
        assert_eq!(
            AccountType::Liability.conventional_normal_balance(),
            NormalBalance::Credit
        );
        assert_eq!(
            AccountType::Equity.conventional_normal_balance(),
            NormalBalance::Credit
        );
        assert_eq!(
            AccountType::Revenue.conventional_normal_balance(),
            NormalBalance::Credit
        );
    }

    #[test]
    fn test_validate_normal_balance_conventional() {
        assert!(AccountRules::validate_normal_balance(
            AccountType::Asset,
            NormalBalance::Debit,
            false
        )
        .is_ok());
        assert!(AccountRules::validate_normal_balance(
            AccountType::Revenue,
            NormalBalance::Credit,
            false
        )
        .is_ok());
    }

    #[test]
    fn test_validate_normal_balance_mismatch() {
        let result = AccountRules::validate_normal_balance(
            AccountType::Asset,
            NormalBalance::Credit,
            false,
        );
        assert!(matches!(
            result,
            Err(LedgerError::NormalBalanceMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_normal_balance_contra() {
        // A contra asset (e.g., allowance for doubtful rents) is credit-normal.
        assert!(AccountRules::validate_normal_balance(
            AccountType::Asset,
            NormalBalance::Credit,
            true
        )
        .is_ok());

        // But a contra account declaring the conventional side is wrong.
        let result =
            AccountRules::validate_normal_balance(AccountType::Asset, NormalBalance::Debit, true);
        assert!(matches!(
            result,
            Err(LedgerError::NormalBalanceMismatch { .. })
        ));
    }

    fn tree_lookup(tree: &HashMap<Uuid, Uuid>) -> impl Fn(Uuid) -> Option<Uuid> + '_ {
        move |id| tree.get(&id).copied()
    }

    #[test]
    fn test_no_cycle_for_valid_chain() {
        let root = Uuid::new_v4();
        let mid = Uuid::new_v4();
        let leaf = Uuid::new_v4();
        let mut tree = HashMap::new();
        tree.insert(mid, root);

        assert!(AccountRules::validate_no_cycle(leaf, mid, tree_lookup(&tree)).is_ok());
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let id = Uuid::new_v4();
        let tree = HashMap::new();
        let result = AccountRules::validate_no_cycle(id, id, tree_lookup(&tree));
        assert!(matches!(result, Err(LedgerError::ParentCycle(_))));
    }

    #[test]
    fn test_reparent_under_own_descendant_is_cycle() {
        // a -> b -> c; reparenting a under c must fail.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let mut tree = HashMap::new();
        tree.insert(b, a);
        tree.insert(c, b);

        let result = AccountRules::validate_no_cycle(a, c, tree_lookup(&tree));
        assert!(matches!(result, Err(LedgerError::ParentCycle(_))));
    }

    #[test]
    fn test_depth_bound_trips_on_corrupt_tree() {
        // Two nodes pointing at each other, target not on the chain.
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        let mut tree = HashMap::new();
        tree.insert(x, y);
        tree.insert(y, x);

        let outsider = Uuid::new_v4();
        let result = AccountRules::validate_no_cycle(outsider, x, tree_lookup(&tree));
        assert!(matches!(result, Err(LedgerError::ParentCycle(_))));
    }
}
