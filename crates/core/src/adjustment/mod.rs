//! Financial adjustment resolution.
//!
//! Adjustments record a change between an original and an adjusted amount
//! (a rent correction, a waived late fee, a write-off). On approval the
//! delta is resolved into a two-line balanced journal entry; this module
//! owns the delta math and the approval state machine. Persisting and
//! posting is the repository's job.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentra_shared::types::Currency;

use super::ledger::error::LedgerError;
use super::ledger::types::{EntryLineInput, EntryType};

/// Kind of financial adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Correction of a previously billed rent amount.
    RentCorrection,
    /// Waiver of an assessed late fee.
    LateFeeWaiver,
    /// Goodwill or promotional discount.
    Discount,
    /// Amount written off as uncollectable.
    WriteOff,
    /// Refund owed back to a renter.
    Refund,
}

impl AdjustmentType {
    /// Returns the database/API name for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RentCorrection => "rent_correction",
            Self::LateFeeWaiver => "late_fee_waiver",
            Self::Discount => "discount",
            Self::WriteOff => "write_off",
            Self::Refund => "refund",
        }
    }
}

impl std::str::FromStr for AdjustmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rent_correction" => Ok(Self::RentCorrection),
            "late_fee_waiver" => Ok(Self::LateFeeWaiver),
            "discount" => Ok(Self::Discount),
            "write_off" => Ok(Self::WriteOff),
            "refund" => Ok(Self::Refund),
            _ => Err(format!("Unknown adjustment type: {s}")),
        }
    }
}

impl std::fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    /// Awaiting an approver's decision.
    PendingApproval,
    /// Approved and posted to the ledger.
    Approved,
    /// Rejected; terminal, never posted.
    Rejected,
}

impl AdjustmentStatus {
    /// Returns the database/API name for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Only pending adjustments accept a decision.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::PendingApproval)
    }
}

impl std::str::FromStr for AdjustmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown adjustment status: {s}")),
        }
    }
}

impl std::fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved financial effect of an adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAdjustment {
    /// adjusted − original; sign chooses the debit direction.
    pub delta: Decimal,
    /// The two balanced lines to post.
    pub lines: Vec<EntryLineInput>,
}

/// Resolves the adjustment delta into a balanced pair of entry lines.
///
/// A positive delta (amount went up) debits `debit_account_id` and credits
/// `credit_account_id` for the delta; a negative delta flips the sides and
/// uses the absolute value. Zero delta is rejected: there is nothing to
/// post and approval would create an empty movement.
pub fn resolve_delta(
    debit_account_id: Uuid,
    credit_account_id: Uuid,
    original_amount: Decimal,
    adjusted_amount: Decimal,
    currency: Currency,
    memo: Option<String>,
) -> Result<ResolvedAdjustment, LedgerError> {
    let delta = adjusted_amount - original_amount;
    if delta.is_zero() {
        return Err(LedgerError::NothingToAdjust);
    }

    let magnitude = delta.abs();
    let (debit_side, credit_side) = if delta > Decimal::ZERO {
        (debit_account_id, credit_account_id)
    } else {
        (credit_account_id, debit_account_id)
    };

    let line = |account_id: Uuid, entry_type: EntryType| EntryLineInput {
        account_id,
        currency,
        amount: magnitude,
        entry_type,
        memo: memo.clone(),
        property_id: None,
        unit_id: None,
        renter_id: None,
    };

    Ok(ResolvedAdjustment {
        delta,
        lines: vec![
            line(debit_side, EntryType::Debit),
            line(credit_side, EntryType::Credit),
        ],
    })
}

/// Decision made when approval is requested for an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    /// Post the resolved entry and mark approved.
    Post,
    /// Already approved and posted; return the existing record unchanged.
    AlreadyApproved,
}

/// Checks the approval transition.
///
/// Approval is idempotent: an already-approved adjustment with a posted
/// journal entry is a no-op, not an error. A rejected adjustment can never
/// be approved.
pub fn validate_approval(
    adjustment_id: Uuid,
    status: AdjustmentStatus,
    journal_entry_id: Option<Uuid>,
) -> Result<ApprovalAction, LedgerError> {
    match status {
        AdjustmentStatus::PendingApproval => Ok(ApprovalAction::Post),
        AdjustmentStatus::Approved if journal_entry_id.is_some() => {
            Ok(ApprovalAction::AlreadyApproved)
        }
        // Approved without a posted entry means an earlier transaction was
        // torn; surface it instead of double-posting.
        AdjustmentStatus::Approved => Err(LedgerError::AdjustmentMissingEntry(adjustment_id)),
        AdjustmentStatus::Rejected => Err(LedgerError::InvalidAdjustmentTransition {
            from: "rejected",
            to: "approved",
        }),
    }
}

/// Checks the rejection transition; only pending adjustments can be
/// rejected.
pub fn validate_rejection(status: AdjustmentStatus) -> Result<(), LedgerError> {
    if status.is_decided() {
        return Err(LedgerError::InvalidAdjustmentTransition {
            from: status.as_str(),
            to: AdjustmentStatus::Rejected.as_str(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_positive_delta_debits_debit_account() {
        let debit_account = Uuid::now_v7();
        let credit_account = Uuid::now_v7();

        // Rent corrected upward from 1500 to 1650.
        let resolved = resolve_delta(
            debit_account,
            credit_account,
            dec!(1500.00),
            dec!(1650.00),
            Currency::Ghs,
            None,
        )
        .unwrap();

        assert_eq!(resolved.delta, dec!(150.00));
        assert_eq!(resolved.lines.len(), 2);
        assert_eq!(resolved.lines[0].account_id, debit_account);
        assert_eq!(resolved.lines[0].entry_type, EntryType::Debit);
        assert_eq!(resolved.lines[0].amount, dec!(150.00));
        assert_eq!(resolved.lines[1].account_id, credit_account);
        assert_eq!(resolved.lines[1].entry_type, EntryType::Credit);
        assert_eq!(resolved.lines[1].amount, dec!(150.00));
    }

    #[test]
    fn test_negative_delta_flips_sides() {
        let debit_account = Uuid::now_v7();
        let credit_account = Uuid::now_v7();

        // Late fee waived down from 50 to 0.
        let resolved = resolve_delta(
            debit_account,
            credit_account,
            dec!(50.00),
            dec!(0.00),
            Currency::Ghs,
            Some("late fee waived".to_string()),
        )
        .unwrap();

        assert_eq!(resolved.delta, dec!(-50.00));
        assert_eq!(resolved.lines[0].account_id, credit_account);
        assert_eq!(resolved.lines[0].entry_type, EntryType::Debit);
        assert_eq!(resolved.lines[0].amount, dec!(50.00));
        assert_eq!(resolved.lines[1].account_id, debit_account);
        assert_eq!(resolved.lines[1].entry_type, EntryType::Credit);
    }

    #[test]
    fn test_zero_delta_rejected() {
        let err = resolve_delta(
            Uuid::now_v7(),
            Uuid::now_v7(),
            dec!(1500.00),
            dec!(1500.00),
            Currency::Ghs,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::NothingToAdjust));
    }

    #[test]
    fn test_approval_transitions() {
        let id = Uuid::now_v7();
        assert_eq!(
            validate_approval(id, AdjustmentStatus::PendingApproval, None).unwrap(),
            ApprovalAction::Post
        );
        assert_eq!(
            validate_approval(id, AdjustmentStatus::Approved, Some(Uuid::now_v7())).unwrap(),
            ApprovalAction::AlreadyApproved
        );
        assert!(matches!(
            validate_approval(id, AdjustmentStatus::Approved, None).unwrap_err(),
            LedgerError::AdjustmentMissingEntry(missing) if missing == id
        ));
        assert!(validate_approval(id, AdjustmentStatus::Rejected, None).is_err());
    }

    #[test]
    fn test_rejection_transitions() {
        validate_rejection(AdjustmentStatus::PendingApproval).unwrap();
        assert!(validate_rejection(AdjustmentStatus::Approved).is_err());
        assert!(validate_rejection(AdjustmentStatus::Rejected).is_err());
    }

    #[test]
    fn test_type_roundtrip() {
        use std::str::FromStr;
        for kind in [
            AdjustmentType::RentCorrection,
            AdjustmentType::LateFeeWaiver,
            AdjustmentType::Discount,
            AdjustmentType::WriteOff,
            AdjustmentType::Refund,
        ] {
            assert_eq!(AdjustmentType::from_str(kind.as_str()).unwrap(), kind);
        }
    }
}
