//! Read-only queries behind the financial reports.

use projledger_core::reports::{DateWindow, ExpenseEntry, ProjectSnapshot, RecordCounts};
use projledger_core::store::{FinanceStore, StoreError};
use projledger_shared::types::CompanyId;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use super::{SeaStore, db_err};
use crate::entities::{clients, expenses, payments, projects};

#[async_trait::async_trait]
impl FinanceStore for SeaStore {
    async fn payment_amounts(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Vec<Decimal>, StoreError> {
        let mut query = payments::Entity::find()
            .filter(payments::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(from) = window.from {
            query = query.filter(payments::Column::PaymentDate.gte(from));
        }
        if let Some(to) = window.to {
            query = query.filter(payments::Column::PaymentDate.lte(to));
        }

        query
            .select_only()
            .column(payments::Column::Amount)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn expense_entries(
        &self,
        company_id: CompanyId,
        window: DateWindow,
    ) -> Result<Vec<ExpenseEntry>, StoreError> {
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(from) = window.from {
            query = query.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = window.to {
            query = query.filter(expenses::Column::ExpenseDate.lte(to));
        }

        let rows: Vec<(Decimal, Option<String>)> = query
            .select_only()
            .column(expenses::Column::Amount)
            .column(expenses::Column::ExpenseType)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(amount, expense_type)| ExpenseEntry {
                amount,
                expense_type,
            })
            .collect())
    }

    async fn project_snapshots(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<ProjectSnapshot>, StoreError> {
        let rows: Vec<(String, Option<Decimal>)> = projects::Entity::find()
            .filter(projects::Column::CompanyId.eq(company_id.into_inner()))
            .select_only()
            .column(projects::Column::Status)
            .column(projects::Column::Price)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(status, price)| ProjectSnapshot { status, price })
            .collect())
    }

    async fn record_counts(&self, company_id: CompanyId) -> Result<RecordCounts, StoreError> {
        let company = company_id.into_inner();

        let (clients, projects, payments, expenses) = tokio::try_join!(
            clients::Entity::find()
                .filter(clients::Column::CompanyId.eq(company))
                .count(&self.db),
            projects::Entity::find()
                .filter(projects::Column::CompanyId.eq(company))
                .count(&self.db),
            payments::Entity::find()
                .filter(payments::Column::CompanyId.eq(company))
                .count(&self.db),
            expenses::Entity::find()
                .filter(expenses::Column::CompanyId.eq(company))
                .count(&self.db),
        )
        .map_err(db_err)?;

        Ok(RecordCounts {
            clients,
            projects,
            payments,
            expenses,
        })
    }
}
