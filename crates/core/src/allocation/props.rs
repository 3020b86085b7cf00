//! Property-based tests for the allocation ceiling.

use std::sync::Arc;

use proptest::prelude::*;
use projledger_shared::types::{CompanyId, ProjectId};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::ledger::{AllocationLedger, AllocationRecord};
use super::validator::AllocationValidator;
use crate::payment::{CreatePaymentInput, PaymentService, UpdatePaymentInput};
use crate::phase::{CreatePhaseInput, PhaseService, UpdatePhaseInput};
use crate::project::Project;
use crate::store::InMemoryStore;

/// Strategy for amounts from 0.01 to 10,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a project price from 1.00 to 5,000.00.
fn price() -> impl Strategy<Value = Decimal> {
    (100i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

#[derive(Debug, Clone)]
enum Op {
    Create(Decimal),
    /// Update the n-th accepted record (modulo count) to a new amount.
    Update(usize, Decimal),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        positive_amount().prop_map(Op::Create),
        (any::<usize>(), positive_amount()).prop_map(|(i, a)| Op::Update(i, a)),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

async fn seed_project(
    store: &InMemoryStore,
    company_id: CompanyId,
    price: Option<Decimal>,
) -> ProjectId {
    let id = ProjectId::new();
    store
        .add_project(Project {
            id,
            company_id,
            client_id: None,
            title: "Prop".into(),
            price,
            start_date: None,
            due_date: None,
            status: "active".into(),
        })
        .await;
    id
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: ceiling invariant for payments.
    ///
    /// *For any* sequence of payment creates and updates against a priced
    /// project, the committed payment total never exceeds the price.
    #[test]
    fn prop_payment_total_never_exceeds_price(
        price in price(),
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let rt = runtime();
        let exceeded = rt.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let company = CompanyId::new();
            let project = seed_project(&store, company, Some(price)).await;
            let service = PaymentService::new(Arc::clone(&store));
            let mut accepted = Vec::new();

            for op in ops {
                match op {
                    Op::Create(amount) => {
                        let input = CreatePaymentInput {
                            project_id: Some(project),
                            amount: Some(amount),
                            payment_method: Some("cash".into()),
                            ..CreatePaymentInput::default()
                        };
                        if let Ok(payment) = service.create(company, input).await {
                            accepted.push(payment.id);
                        }
                    }
                    Op::Update(i, amount) if !accepted.is_empty() => {
                        let id = accepted[i % accepted.len()];
                        let input = UpdatePaymentInput {
                            amount: Some(amount),
                            ..UpdatePaymentInput::default()
                        };
                        let _ = service.update(company, id, input).await;
                    }
                    Op::Update(..) => {}
                }

                let total: Decimal =
                    store.payments_for(project).await.iter().map(|p| p.amount).sum();
                if total > price {
                    return true;
                }
            }
            false
        });
        prop_assert!(!exceeded);
    }

    /// Property: ceiling invariant for phases, independent of payments.
    #[test]
    fn prop_phase_total_never_exceeds_price(
        price in price(),
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let rt = runtime();
        let exceeded = rt.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let company = CompanyId::new();
            let project = seed_project(&store, company, Some(price)).await;
            let service = PhaseService::new(Arc::clone(&store));
            let mut accepted = Vec::new();

            for op in ops {
                match op {
                    Op::Create(amount) => {
                        let input = CreatePhaseInput {
                            amount: Some(amount),
                            ..CreatePhaseInput::default()
                        };
                        if let Ok(phase) = service.create(company, project, input).await {
                            accepted.push(phase.id);
                        }
                    }
                    Op::Update(i, amount) if !accepted.is_empty() => {
                        let id = accepted[i % accepted.len()];
                        let input = UpdatePhaseInput {
                            amount: Some(amount),
                            ..UpdatePhaseInput::default()
                        };
                        let _ = service.update(company, project, id, input).await;
                    }
                    Op::Update(..) => {}
                }

                let total: Decimal = store.phases_for(project).await.iter().map(|p| p.amount).sum();
                if total > price {
                    return true;
                }
            }
            false
        });
        prop_assert!(!exceeded);
    }

    /// Property: exclusion correctness.
    ///
    /// *For any* pool holding total `T` that includes an edited amount `a`,
    /// changing `a` to `b` is accepted iff `T - a + b <= price`.
    #[test]
    fn prop_update_accepted_iff_adjusted_total_fits(
        price in price(),
        others in prop::collection::vec(positive_amount(), 0..10),
        a in positive_amount(),
        b in positive_amount(),
    ) {
        let company = CompanyId::new();
        let project = ProjectId::new();
        let edited = Uuid::new_v4();

        let mut records: Vec<AllocationRecord> = others
            .iter()
            .map(|amount| AllocationRecord {
                id: Uuid::new_v4(),
                company_id: company,
                project_id: project,
                amount: *amount,
            })
            .collect();
        records.push(AllocationRecord {
            id: edited,
            company_id: company,
            project_id: project,
            amount: a,
        });

        let total = AllocationLedger::current_allocation(&records, company, project, None);
        let prior = AllocationLedger::current_allocation(&records, company, project, Some(edited));
        prop_assert_eq!(prior, total - a);

        let accepted = AllocationValidator::validate(price, prior, b).is_within();
        prop_assert_eq!(accepted, total - a + b <= price);
    }

    /// Property: an unset or zero price accepts any positive amount.
    #[test]
    fn prop_unconstrained_pool_accepts_everything(
        prior in positive_amount(),
        proposed in positive_amount(),
        zero_price in any::<bool>(),
    ) {
        let project = Project {
            id: ProjectId::new(),
            company_id: CompanyId::new(),
            client_id: None,
            title: "Open".into(),
            price: zero_price.then_some(Decimal::ZERO),
            start_date: None,
            due_date: None,
            status: "draft".into(),
        };
        let check =
            AllocationValidator::validate(project.ceiling(), prior * Decimal::ONE_HUNDRED, proposed);
        prop_assert!(check.is_within());
    }
}
