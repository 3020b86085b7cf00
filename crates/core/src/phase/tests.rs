//! Phase service tests against the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use projledger_shared::types::{CompanyId, PageRequest, PhaseId, ProjectId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::PhaseService;
use super::types::{CreatePhaseInput, UpdatePhaseInput};
use crate::allocation::{AllocationError, AllocationPool, DateRangeViolation};
use crate::amount::AMOUNT_RANGE_MESSAGE;
use crate::project::Project;
use crate::store::InMemoryStore;

struct Fixture {
    store: Arc<InMemoryStore>,
    service: PhaseService<InMemoryStore>,
    company: CompanyId,
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            service: PhaseService::new(Arc::clone(&store)),
            store,
            company: CompanyId::new(),
        }
    }

    /// Project running through 2024 with the given price.
    async fn project(&self, price: Option<Decimal>) -> ProjectId {
        let id = ProjectId::new();
        self.store
            .add_project(Project {
                id,
                company_id: self.company,
                client_id: None,
                title: "Rebrand".into(),
                price,
                start_date: Some(date("2024-01-01")),
                due_date: Some(date("2024-12-31")),
                status: "active".into(),
            })
            .await;
        id
    }

    async fn add(
        &self,
        project_id: ProjectId,
        amount: Decimal,
    ) -> Result<PhaseId, AllocationError> {
        self.service
            .create(self.company, project_id, phase_input(amount))
            .await
            .map(|p| p.id)
    }
}

fn phase_input(amount: Decimal) -> CreatePhaseInput {
    CreatePhaseInput {
        title: Some("Discovery".into()),
        amount: Some(amount),
        start_date: Some("2024-02-01".into()),
        end_date: Some("2024-02-28".into()),
        notes: None,
    }
}

fn amount_update(amount: Decimal) -> UpdatePhaseInput {
    UpdatePhaseInput {
        amount: Some(amount),
        ..UpdatePhaseInput::default()
    }
}

#[tokio::test]
async fn test_create_enforces_phase_pool_ceiling() {
    let fx = Fixture::new();
    let project = fx.project(Some(dec!(1000))).await;
    fx.add(project, dec!(600)).await.unwrap();

    let err = fx.add(project, dec!(500)).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::BudgetExceeded { pool: AllocationPool::Phases, remaining, .. }
            if remaining == dec!(400)
    ));

    fx.add(project, dec!(400)).await.unwrap();
    assert_eq!(fx.store.phases_for(project).await.len(), 2);
}

#[tokio::test]
async fn test_phase_pool_is_independent_of_payments() {
    let fx = Fixture::new();
    let project = fx.project(Some(dec!(1000))).await;
    fx.store
        .add_payment_row(fx.company, project, dec!(1000), date("2024-03-01"))
        .await;

    // payments already use the whole price; phases have their own pool
    fx.add(project, dec!(1000)).await.unwrap();
}

#[tokio::test]
async fn test_create_defaults_amount_and_rejects_negative() {
    let fx = Fixture::new();
    let project = fx.project(Some(dec!(100))).await;

    let phase = fx
        .service
        .create(
            fx.company,
            project,
            CreatePhaseInput {
                title: Some("  Kickoff ".into()),
                ..CreatePhaseInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(phase.amount, Decimal::ZERO);
    assert_eq!(phase.title.as_deref(), Some("Kickoff"));
    assert_eq!(phase.start_date, None);

    let err = fx.add(project, dec!(-1)).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidArgument(ref m) if m == "amount must be a non-negative number"
    ));
}

#[tokio::test]
async fn test_out_of_range_amount_is_invalid_argument() {
    let fx = Fixture::new();
    let project = fx.project(Some(dec!(1000))).await;
    let edited = fx.add(project, dec!(800)).await.unwrap();

    for amount in [Decimal::MAX, dec!(1000000000000000), dec!(0.00001)] {
        let err = fx.add(project, amount).await.unwrap_err();
        assert!(matches!(
            err,
            AllocationError::InvalidArgument(ref m) if m == AMOUNT_RANGE_MESSAGE
        ));

        let err = fx
            .service
            .update(fx.company, project, edited, amount_update(amount))
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidArgument(_)));
    }
    assert_eq!(fx.store.phases_for(project).await.len(), 1);
}

#[tokio::test]
async fn test_create_rejects_bad_dates() {
    let fx = Fixture::new();
    let project = fx.project(None).await;

    let mut input = phase_input(dec!(1));
    input.start_date = Some("2024-02-01".into());
    input.end_date = Some("2024-01-31".into());
    let err = fx.service.create(fx.company, project, input).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidDateRange(DateRangeViolation::EndBeforeStart)
    ));

    let mut input = phase_input(dec!(1));
    input.start_date = Some("2023-12-01".into());
    let err = fx.service.create(fx.company, project, input).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidDateRange(DateRangeViolation::StartsBeforeProject)
    ));

    let mut input = phase_input(dec!(1));
    input.end_date = Some("2025-01-01".into());
    let err = fx.service.create(fx.company, project, input).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidDateRange(DateRangeViolation::EndsAfterProject)
    ));

    let mut input = phase_input(dec!(1));
    input.start_date = Some("soon".into());
    input.end_date = None;
    let err = fx.service.create(fx.company, project, input).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidDateRange(DateRangeViolation::Unparsable)
    ));

    assert!(fx.store.phases_for(project).await.is_empty());
}

#[tokio::test]
async fn test_create_on_foreign_project_is_invalid_reference() {
    let fx = Fixture::new();
    let project = fx.project(None).await;

    let err = fx
        .service
        .create(CompanyId::new(), project, phase_input(dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidProject(id) if id == project));
}

#[tokio::test]
async fn test_update_excludes_own_amount() {
    let fx = Fixture::new();
    let project = fx.project(Some(dec!(1000))).await;
    fx.add(project, dec!(300)).await.unwrap();
    let edited = fx.add(project, dec!(700)).await.unwrap();

    let phase = fx
        .service
        .update(fx.company, project, edited, amount_update(dec!(700)))
        .await
        .unwrap();
    assert_eq!(phase.amount, dec!(700));

    let err = fx
        .service
        .update(fx.company, project, edited, amount_update(dec!(701)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::BudgetExceeded { remaining, .. } if remaining == dec!(700)
    ));
}

#[tokio::test]
async fn test_update_checks_final_dates() {
    let fx = Fixture::new();
    let project = fx.project(None).await;
    let phase = fx.add(project, dec!(1)).await.unwrap();

    // new end before the inherited start
    let input = UpdatePhaseInput {
        end_date: Some(Some("2024-01-15".into())),
        ..UpdatePhaseInput::default()
    };
    let err = fx
        .service
        .update(fx.company, project, phase, input)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidDateRange(DateRangeViolation::EndBeforeStart)
    ));

    // clearing the end date leaves an incomplete pair, which is accepted
    let input = UpdatePhaseInput {
        end_date: Some(None),
        start_date: Some(Some("2024-06-01".into())),
        ..UpdatePhaseInput::default()
    };
    let updated = fx
        .service
        .update(fx.company, project, phase, input)
        .await
        .unwrap();
    assert_eq!(updated.end_date, None);
    assert_eq!(updated.start_date, Some(date("2024-06-01")));
    assert_eq!(updated.title.as_deref(), Some("Discovery"));
}

#[tokio::test]
async fn test_update_rechecks_ceiling_even_without_amount() {
    let fx = Fixture::new();
    let project = fx.project(Some(dec!(1000))).await;
    let phase = fx.add(project, dec!(900)).await.unwrap();
    fx.store.set_project_price(project, Some(dec!(500))).await;

    let input = UpdatePhaseInput {
        notes: Some(Some("rescoped".into())),
        ..UpdatePhaseInput::default()
    };
    let err = fx
        .service
        .update(fx.company, project, phase, input)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::BudgetExceeded { remaining, .. } if remaining == dec!(500)
    ));
}

#[tokio::test]
async fn test_update_missing_phase_and_empty_patch() {
    let fx = Fixture::new();
    let project = fx.project(None).await;
    let other_project = fx.project(None).await;
    let phase = fx.add(project, dec!(1)).await.unwrap();

    let err = fx
        .service
        .update(fx.company, other_project, phase, amount_update(dec!(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::PhaseNotFound(_)));

    let err = fx
        .service
        .update(fx.company, project, phase, UpdatePhaseInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidArgument(ref m) if m == "no fields to update"));
}

#[tokio::test]
async fn test_get_list_delete() {
    let fx = Fixture::new();
    let project = fx.project(None).await;

    let mut ids = Vec::new();
    for (start, end) in [("2024-01-05", "2024-01-10"), ("2024-03-01", "2024-03-31")] {
        let mut input = phase_input(dec!(10));
        input.start_date = Some(start.into());
        input.end_date = Some(end.into());
        ids.push(fx.service.create(fx.company, project, input).await.unwrap().id);
    }

    let page = fx
        .service
        .list(fx.company, project, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 2);
    assert_eq!(page.data[0].start_date, Some(date("2024-03-01")));

    assert!(matches!(
        fx.service
            .list(fx.company, ProjectId::new(), PageRequest::default())
            .await,
        Err(AllocationError::ProjectNotFound(_))
    ));

    let phase = fx.service.get(fx.company, project, ids[0]).await.unwrap();
    assert_eq!(phase.amount, dec!(10));

    assert_eq!(
        fx.service.delete(fx.company, project, ids[0]).await.unwrap(),
        ids[0]
    );
    assert!(matches!(
        fx.service.get(fx.company, project, ids[0]).await,
        Err(AllocationError::PhaseNotFound(_))
    ));
    assert!(matches!(
        fx.service.delete(CompanyId::new(), project, ids[1]).await,
        Err(AllocationError::PhaseNotFound(_))
    ));
}
