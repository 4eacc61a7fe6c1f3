//! Activity accounting ledger.
//!
//! Creates the append-only ledger the report pipeline reads from.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ACTIVITY_ACCOUNTING_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS activity_accounting CASCADE;")
            .await?;
        Ok(())
    }
}

const ACTIVITY_ACCOUNTING_SQL: &str = r#"
CREATE TABLE activity_accounting (
    id BIGSERIAL PRIMARY KEY,
    date TIMESTAMPTZ NOT NULL,
    user_email VARCHAR(320) NOT NULL,
    admin VARCHAR(320),
    status VARCHAR(32) NOT NULL,
    "type" VARCHAR(32) NOT NULL,
    original_id VARCHAR(64),
    amount NUMERIC(19, 4) NOT NULL,
    currency CHAR(3) NOT NULL,
    description TEXT
);

-- Report export order
CREATE INDEX idx_activity_accounting_date ON activity_accounting(date DESC, id);

-- Per-user reports
CREATE INDEX idx_activity_accounting_user ON activity_accounting(user_email, date DESC);

-- Status and type filters
CREATE INDEX idx_activity_accounting_status_type ON activity_accounting(status, "type");

-- Refund and reversal lookup
CREATE INDEX idx_activity_accounting_original ON activity_accounting(original_id) WHERE original_id IS NOT NULL;
"#;
