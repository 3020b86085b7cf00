//! Allocation ceiling triggers.
//!
//! Payments and phases each form a pool capped by the project price. The
//! services check the ceiling under a project row lock; these triggers
//! reject any write that reaches the tables some other way.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(PAYMENT_CEILING_SQL).await?;
        db.execute_unprepared(PHASE_CEILING_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_GUARDS_SQL).await?;
        Ok(())
    }
}

// The exception text is parsed back into a ceiling violation by the store:
// keep the `budget_exceeded remaining=<amount>` shape.

const PAYMENT_CEILING_SQL: &str = r"
-- ============================================================
-- FUNCTION: enforce_payment_ceiling
-- Sum of a project's payments may not exceed its price (when > 0)
-- ============================================================
CREATE OR REPLACE FUNCTION enforce_payment_ceiling()
RETURNS TRIGGER AS $$
DECLARE
    project_price NUMERIC(19, 4);
    allocated NUMERIC(19, 4);
BEGIN
    SELECT price INTO project_price
    FROM projects
    WHERE id = NEW.project_id AND company_id = NEW.company_id
    FOR UPDATE;

    IF project_price IS NULL OR project_price <= 0 THEN
        RETURN NEW;
    END IF;

    SELECT COALESCE(SUM(amount), 0) INTO allocated
    FROM payments
    WHERE project_id = NEW.project_id
      AND company_id = NEW.company_id
      AND id <> NEW.id;

    IF allocated + NEW.amount > project_price THEN
        RAISE EXCEPTION 'budget_exceeded remaining=%', project_price - allocated;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_enforce_payment_ceiling
BEFORE INSERT OR UPDATE OF amount, project_id ON payments
FOR EACH ROW
EXECUTE FUNCTION enforce_payment_ceiling();
";

const PHASE_CEILING_SQL: &str = r"
-- ============================================================
-- FUNCTION: enforce_phase_ceiling
-- Sum of a project's phase amounts may not exceed its price (when > 0)
-- ============================================================
CREATE OR REPLACE FUNCTION enforce_phase_ceiling()
RETURNS TRIGGER AS $$
DECLARE
    project_price NUMERIC(19, 4);
    allocated NUMERIC(19, 4);
BEGIN
    SELECT price INTO project_price
    FROM projects
    WHERE id = NEW.project_id AND company_id = NEW.company_id
    FOR UPDATE;

    IF project_price IS NULL OR project_price <= 0 THEN
        RETURN NEW;
    END IF;

    SELECT COALESCE(SUM(amount), 0) INTO allocated
    FROM phases
    WHERE project_id = NEW.project_id
      AND company_id = NEW.company_id
      AND id <> NEW.id;

    IF allocated + NEW.amount > project_price THEN
        RAISE EXCEPTION 'budget_exceeded remaining=%', project_price - allocated;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_enforce_phase_ceiling
BEFORE INSERT OR UPDATE OF amount, project_id ON phases
FOR EACH ROW
EXECUTE FUNCTION enforce_phase_ceiling();
";

const DROP_GUARDS_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_enforce_phase_ceiling ON phases;
DROP TRIGGER IF EXISTS trg_enforce_payment_ceiling ON payments;
DROP FUNCTION IF EXISTS enforce_phase_ceiling();
DROP FUNCTION IF EXISTS enforce_payment_ceiling();
";
