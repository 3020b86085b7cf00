//! Tenant-bound transactional session for the allocation services.

use chrono::Utc;
use projledger_core::allocation::{AllocationPool, AllocationRecord};
use projledger_core::payment::{Payment, PaymentChanges, PaymentFilter, PaymentMethod};
use projledger_core::phase::{Phase, PhaseChanges};
use projledger_core::project::Project;
use projledger_core::store::{LedgerSession, LedgerStore, StoreError};
use projledger_shared::types::{ClientId, CompanyId, PageRequest, PaymentId, PhaseId, ProjectId};
use rust_decimal::Decimal;
use sea_orm::sea_query::{NullOrdering, Order, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{SeaStore, db_err};
use crate::entities::{payments, phases, projects};

/// One database transaction bound to a company.
///
/// Dropping the session without calling [`LedgerSession::commit`] rolls
/// the transaction back.
pub struct SeaLedgerSession {
    company_id: CompanyId,
    txn: DatabaseTransaction,
}

#[async_trait::async_trait]
impl LedgerStore for SeaStore {
    type Session = SeaLedgerSession;

    async fn begin(&self, company_id: CompanyId) -> Result<SeaLedgerSession, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(SeaLedgerSession { company_id, txn })
    }
}

fn project_from_model(model: projects::Model) -> Project {
    Project {
        id: ProjectId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        client_id: model.client_id.map(ClientId::from_uuid),
        title: model.title,
        price: model.price,
        start_date: model.start_date,
        due_date: model.due_date,
        status: model.status,
    }
}

fn payment_from_model(model: payments::Model) -> Result<Payment, StoreError> {
    let payment_method = PaymentMethod::parse(&model.payment_method).map_err(|_| {
        StoreError::database(format!(
            "payment {} has unknown payment_method '{}'",
            model.id, model.payment_method
        ))
    })?;

    Ok(Payment {
        id: PaymentId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        project_id: ProjectId::from_uuid(model.project_id),
        amount: model.amount,
        payment_date: model.payment_date,
        payment_method,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn phase_from_model(model: phases::Model) -> Phase {
    Phase {
        id: PhaseId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        project_id: ProjectId::from_uuid(model.project_id),
        title: model.title,
        amount: model.amount,
        start_date: model.start_date,
        end_date: model.end_date,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

impl SeaLedgerSession {
    fn company(&self) -> Uuid {
        self.company_id.into_inner()
    }

    fn project_query(&self, project_id: ProjectId) -> Select<projects::Entity> {
        projects::Entity::find_by_id(project_id.into_inner())
            .filter(projects::Column::CompanyId.eq(self.company()))
    }

    fn payment_query(&self, payment_id: PaymentId) -> Select<payments::Entity> {
        payments::Entity::find_by_id(payment_id.into_inner())
            .filter(payments::Column::CompanyId.eq(self.company()))
    }

    fn phase_query(&self, project_id: ProjectId, phase_id: PhaseId) -> Select<phases::Entity> {
        phases::Entity::find_by_id(phase_id.into_inner())
            .filter(phases::Column::ProjectId.eq(project_id.into_inner()))
            .filter(phases::Column::CompanyId.eq(self.company()))
    }

    async fn payment_records(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<(Uuid, Decimal)>, StoreError> {
        payments::Entity::find()
            .filter(payments::Column::CompanyId.eq(self.company()))
            .filter(payments::Column::ProjectId.eq(project_id.into_inner()))
            .select_only()
            .column(payments::Column::Id)
            .column(payments::Column::Amount)
            .into_tuple()
            .all(&self.txn)
            .await
            .map_err(db_err)
    }

    async fn phase_records(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<(Uuid, Decimal)>, StoreError> {
        phases::Entity::find()
            .filter(phases::Column::CompanyId.eq(self.company()))
            .filter(phases::Column::ProjectId.eq(project_id.into_inner()))
            .select_only()
            .column(phases::Column::Id)
            .column(phases::Column::Amount)
            .into_tuple()
            .all(&self.txn)
            .await
            .map_err(db_err)
    }
}

#[async_trait::async_trait]
impl LedgerSession for SeaLedgerSession {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    async fn find_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        let model = self
            .project_query(project_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(project_from_model))
    }

    async fn lock_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        // SELECT ... FOR UPDATE: held until commit or rollback
        let model = self
            .project_query(project_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(project_from_model))
    }

    async fn allocation_records(
        &self,
        project_id: ProjectId,
        pool: AllocationPool,
    ) -> Result<Vec<AllocationRecord>, StoreError> {
        let rows = match pool {
            AllocationPool::Payments => self.payment_records(project_id).await?,
            AllocationPool::Phases => self.phase_records(project_id).await?,
        };

        Ok(rows
            .into_iter()
            .map(|(id, amount)| AllocationRecord {
                id,
                company_id: self.company_id,
                project_id,
                amount,
            })
            .collect())
    }

    async fn find_payment(&self, payment_id: PaymentId) -> Result<Option<Payment>, StoreError> {
        self.payment_query(payment_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?
            .map(payment_from_model)
            .transpose()
    }

    async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<Payment>, u64), StoreError> {
        let mut query =
            payments::Entity::find().filter(payments::Column::CompanyId.eq(self.company()));

        if let Some(project_id) = filter.project_id {
            query = query.filter(payments::Column::ProjectId.eq(project_id.into_inner()));
        }
        if let Some(client_id) = filter.client_id {
            let client_projects = Query::select()
                .column(projects::Column::Id)
                .from(projects::Entity)
                .and_where(projects::Column::CompanyId.eq(self.company()))
                .and_where(projects::Column::ClientId.eq(client_id.into_inner()))
                .to_owned();
            query = query.filter(payments::Column::ProjectId.in_subquery(client_projects));
        }

        let total = query.clone().count(&self.txn).await.map_err(db_err)?;

        let mut query = query
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::CreatedAt);
        if let Some(page) = page {
            query = query.offset(page.offset()).limit(page.limit());
        }

        let rows = query
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(payment_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((rows, total))
    }

    async fn insert_payment(&mut self, payment: Payment) -> Result<Payment, StoreError> {
        let model = payments::ActiveModel {
            id: Set(payment.id.into_inner()),
            company_id: Set(payment.company_id.into_inner()),
            project_id: Set(payment.project_id.into_inner()),
            amount: Set(payment.amount),
            payment_date: Set(payment.payment_date),
            payment_method: Set(payment.payment_method.as_str().to_string()),
            notes: Set(payment.notes),
            created_at: Set(payment.created_at.into()),
            updated_at: Set(payment.updated_at.into()),
        }
        .insert(&self.txn)
        .await
        .map_err(db_err)?;

        payment_from_model(model)
    }

    async fn update_payment(
        &mut self,
        payment_id: PaymentId,
        changes: PaymentChanges,
    ) -> Result<Option<Payment>, StoreError> {
        let Some(existing) = self
            .payment_query(payment_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: payments::ActiveModel = existing.into();
        if let Some(project_id) = changes.project_id {
            active.project_id = Set(project_id.into_inner());
        }
        if let Some(amount) = changes.amount {
            active.amount = Set(amount);
        }
        if let Some(method) = changes.payment_method {
            active.payment_method = Set(method.as_str().to_string());
        }
        if let Some(date) = changes.payment_date {
            active.payment_date = Set(date);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(changes.updated_at.into());

        let model = active.update(&self.txn).await.map_err(db_err)?;
        payment_from_model(model).map(Some)
    }

    async fn delete_payment(&mut self, payment_id: PaymentId) -> Result<bool, StoreError> {
        let result = payments::Entity::delete_many()
            .filter(payments::Column::Id.eq(payment_id.into_inner()))
            .filter(payments::Column::CompanyId.eq(self.company()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_phase(
        &self,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<Option<Phase>, StoreError> {
        let model = self
            .phase_query(project_id, phase_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(model.map(phase_from_model))
    }

    async fn list_phases(
        &self,
        project_id: ProjectId,
        page: PageRequest,
    ) -> Result<(Vec<Phase>, u64), StoreError> {
        let query = phases::Entity::find()
            .filter(phases::Column::CompanyId.eq(self.company()))
            .filter(phases::Column::ProjectId.eq(project_id.into_inner()));

        let total = query.clone().count(&self.txn).await.map_err(db_err)?;

        let rows = query
            .order_by_with_nulls(phases::Column::StartDate, Order::Desc, NullOrdering::Last)
            .order_by_desc(phases::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(phase_from_model)
            .collect();

        Ok((rows, total))
    }

    async fn insert_phase(&mut self, phase: Phase) -> Result<Phase, StoreError> {
        let model = phases::ActiveModel {
            id: Set(phase.id.into_inner()),
            company_id: Set(phase.company_id.into_inner()),
            project_id: Set(phase.project_id.into_inner()),
            title: Set(phase.title),
            amount: Set(phase.amount),
            start_date: Set(phase.start_date),
            end_date: Set(phase.end_date),
            notes: Set(phase.notes),
            created_at: Set(phase.created_at.into()),
            updated_at: Set(phase.updated_at.into()),
        }
        .insert(&self.txn)
        .await
        .map_err(db_err)?;

        Ok(phase_from_model(model))
    }

    async fn update_phase(
        &mut self,
        project_id: ProjectId,
        phase_id: PhaseId,
        changes: PhaseChanges,
    ) -> Result<Option<Phase>, StoreError> {
        let Some(existing) = self
            .phase_query(project_id, phase_id)
            .one(&self.txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: phases::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(amount) = changes.amount {
            active.amount = Set(amount);
        }
        if let Some(start) = changes.start_date {
            active.start_date = Set(start);
        }
        if let Some(end) = changes.end_date {
            active.end_date = Set(end);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(changes.updated_at.into());

        let model = active.update(&self.txn).await.map_err(db_err)?;
        Ok(Some(phase_from_model(model)))
    }

    async fn delete_phase(
        &mut self,
        project_id: ProjectId,
        phase_id: PhaseId,
    ) -> Result<bool, StoreError> {
        let result = phases::Entity::delete_many()
            .filter(phases::Column::Id.eq(phase_id.into_inner()))
            .filter(phases::Column::ProjectId.eq(project_id.into_inner()))
            .filter(phases::Column::CompanyId.eq(self.company()))
            .exec(&self.txn)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(db_err)
    }
}
