//! Initial database migration.
//!
//! Creates the ledger schema: enums, chart of accounts, journal entries and
//! lines, balance snapshots, reconciliations, adjustments, and number
//! sequences, plus the `updated_at` trigger function.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(ACCOUNT_BALANCES_SQL).await?;
        db.execute_unprepared(RECONCILIATIONS_SQL).await?;
        db.execute_unprepared(ADJUSTMENTS_SQL).await?;
        db.execute_unprepared(NUMBER_SEQUENCES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account categories
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Side on which an account naturally accumulates
CREATE TYPE normal_balance AS ENUM (
    'debit',
    'credit'
);

-- Journal entry lifecycle
CREATE TYPE journal_status AS ENUM (
    'pending',
    'posted',
    'reversed'
);

-- Business object a journal entry references
CREATE TYPE reference_type AS ENUM (
    'invoice',
    'payment',
    'adjustment',
    'reconciliation',
    'reversal',
    'manual'
);

-- Reconciliation lifecycle
CREATE TYPE reconciliation_status AS ENUM (
    'pending',
    'in_progress',
    'completed',
    'discrepancy'
);

-- Adjustment kinds
CREATE TYPE adjustment_type AS ENUM (
    'rent_correction',
    'late_fee_waiver',
    'discount',
    'write_off',
    'refund'
);

-- Adjustment approval state
CREATE TYPE adjustment_status AS ENUM (
    'pending_approval',
    'approved',
    'rejected'
);
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY,
    landlord_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    account_type account_type NOT NULL,
    normal_balance normal_balance NOT NULL,
    is_contra BOOLEAN NOT NULL DEFAULT FALSE,
    parent_id UUID REFERENCES chart_of_accounts(id),
    currency CHAR(3) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_system_account BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_coa_landlord_code UNIQUE (landlord_id, code)
);

CREATE INDEX idx_coa_landlord ON chart_of_accounts(landlord_id);
CREATE INDEX idx_coa_parent ON chart_of_accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    landlord_id UUID NOT NULL,
    entry_number VARCHAR(30),
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    status journal_status NOT NULL DEFAULT 'pending',
    reference_type reference_type,
    reference_id UUID,
    created_by UUID NOT NULL,
    posted_at TIMESTAMPTZ,
    posted_by UUID,
    reversed_at TIMESTAMPTZ,
    reversed_by UUID,
    reversal_reason TEXT,
    reversal_of UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Entry numbers are assigned at posting time; pending entries carry NULL.
CREATE UNIQUE INDEX uq_je_landlord_number
    ON journal_entries(landlord_id, entry_number)
    WHERE entry_number IS NOT NULL;

CREATE INDEX idx_je_landlord_date ON journal_entries(landlord_id, entry_date);
CREATE INDEX idx_je_reference ON journal_entries(reference_type, reference_id)
    WHERE reference_id IS NOT NULL;
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    currency CHAR(3) NOT NULL,
    property_id UUID,
    unit_id UUID,
    renter_id UUID,
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_le_one_side CHECK (
        (debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)
    )
);

CREATE INDEX idx_le_journal_entry ON ledger_entries(journal_entry_id);
CREATE INDEX idx_le_account ON ledger_entries(account_id);
CREATE INDEX idx_le_property ON ledger_entries(property_id) WHERE property_id IS NOT NULL;
";

const ACCOUNT_BALANCES_SQL: &str = r"
CREATE TABLE account_balances (
    id UUID PRIMARY KEY,
    landlord_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_debits NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_credits NUMERIC(19, 4) NOT NULL DEFAULT 0,
    closing_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_reconciled BOOLEAN NOT NULL DEFAULT FALSE,
    reconciliation_id UUID,
    computed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_ab_account_period UNIQUE (account_id, period_start, period_end)
);

CREATE INDEX idx_ab_landlord ON account_balances(landlord_id);
";

const RECONCILIATIONS_SQL: &str = r"
CREATE TABLE reconciliations (
    id UUID PRIMARY KEY,
    landlord_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    statement_balance NUMERIC(19, 4) NOT NULL,
    system_balance NUMERIC(19, 4) NOT NULL,
    difference NUMERIC(19, 4) NOT NULL,
    status reconciliation_status NOT NULL DEFAULT 'pending',
    completed_by UUID,
    completed_at TIMESTAMPTZ,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_rec_period CHECK (period_start <= period_end)
);

CREATE INDEX idx_rec_account ON reconciliations(account_id);
CREATE INDEX idx_rec_landlord ON reconciliations(landlord_id);
";

const ADJUSTMENTS_SQL: &str = r"
CREATE TABLE adjustments (
    id UUID PRIMARY KEY,
    landlord_id UUID NOT NULL,
    reference_type reference_type,
    reference_id UUID,
    adjustment_type adjustment_type NOT NULL,
    debit_account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    credit_account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    original_amount NUMERIC(19, 4) NOT NULL,
    adjusted_amount NUMERIC(19, 4) NOT NULL,
    currency CHAR(3) NOT NULL,
    reason TEXT NOT NULL,
    status adjustment_status NOT NULL DEFAULT 'pending_approval',
    created_by UUID NOT NULL,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    rejection_reason TEXT,
    journal_entry_id UUID REFERENCES journal_entries(id),
    metadata JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_adj_landlord_status ON adjustments(landlord_id, status);
";

const NUMBER_SEQUENCES_SQL: &str = r"
CREATE TABLE number_sequences (
    id UUID PRIMARY KEY,
    landlord_id UUID NOT NULL,
    series VARCHAR(30) NOT NULL,
    year INTEGER NOT NULL,
    next_value BIGINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_seq_landlord_series_year UNIQUE (landlord_id, series, year)
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_coa_updated_at
    BEFORE UPDATE ON chart_of_accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_je_updated_at
    BEFORE UPDATE ON journal_entries
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_rec_updated_at
    BEFORE UPDATE ON reconciliations
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_adj_updated_at
    BEFORE UPDATE ON adjustments
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_seq_updated_at
    BEFORE UPDATE ON number_sequences
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS number_sequences CASCADE;
DROP TABLE IF EXISTS adjustments CASCADE;
DROP TABLE IF EXISTS reconciliations CASCADE;
DROP TABLE IF EXISTS account_balances CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS adjustment_status;
DROP TYPE IF EXISTS adjustment_type;
DROP TYPE IF EXISTS reconciliation_status;
DROP TYPE IF EXISTS reference_type;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_type;
";
