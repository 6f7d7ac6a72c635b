//! Tests for the deal/proposal store.

use super::*;
use crate::domain::{
    Potential, PotentialProbability, ProposalContext, ProposalIdeas, StatusBoard, StoreClock,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use tempfile::TempDir;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap()
}

fn test_config() -> StoreConfig {
    let mut config = StoreConfig::default_config().without_latency();
    config.seed_demo_data = false;
    config
}

/// Creates an unpersisted store on a manual clock.
fn create_test_store() -> (CrmStore, watch::Receiver<StoreSnapshot>, StoreClock) {
    let clock = StoreClock::manual(start());
    let services = StoreServices {
        clock: clock.clone(),
    };
    let (store, rx) = CrmStore::in_memory(CrmState::default(), &test_config(), services);
    (store, rx, clock)
}

/// Creates a store backed by a storage slot and journal in a temp directory.
fn open_persistent_store(temp: &TempDir, config: &StoreConfig) -> (CrmStore, StoreClock) {
    let clock = StoreClock::manual(start());
    let logger = Arc::new(
        StructuredLogger::new("test-session", &temp.path().join("logs"))
            .expect("Failed to create logger"),
    );
    let slot = StorageSlot::new(temp.path().join("storage").join("crm-mobile-storage.json"));
    let (store, _rx) = CrmStore::open(
        slot,
        config,
        StoreServices {
            clock: clock.clone(),
        },
        Some(logger),
    )
    .expect("Failed to open store");
    (store, clock)
}

fn acme_deal() -> NewDeal {
    NewDeal {
        name: "Acme CRM".to_string(),
        company: "Acme".to_string(),
        contact: "Jane".to_string(),
        position: "CTO".to_string(),
        profit_center: "12".to_string(),
        source: "9".to_string(),
    }
}

fn acme_proposal(deal: &Deal) -> NewProposal {
    NewProposal {
        deal_id: deal.id.clone(),
        deal_name: deal.name.clone(),
        status: None,
        budget_status: None,
        context: ProposalContext {
            business_context: "Legacy CRM is slowing sales".to_string(),
            client_needs: "Single view of the customer".to_string(),
            expected_results: "Shorter sales cycle".to_string(),
        },
        ideas: ProposalIdeas {
            selected_ideas: vec!["I - Diagnóstico C3: Full".to_string()],
            additional_ideas: String::new(),
            implementation_ideas: "Start with a pilot team".to_string(),
        },
        p_and_p: PotentialProbability {
            potential: Potential::High,
            estimated_value: Some(50000.0),
            probability: Some(70),
            optimal_delivery_date: NaiveDate::from_ymd_opt(2024, 8, 1),
        },
    }
}

fn journal_lines(temp: &TempDir) -> Vec<serde_json::Value> {
    let content = std::fs::read_to_string(temp.path().join("logs").join("events.jsonl"))
        .expect("Failed to read journal");
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Journal line is not JSON"))
        .collect()
}

#[test]
fn test_create_deal_appends_with_fresh_id_and_timestamp() {
    let (mut store, snapshot_rx, _clock) = create_test_store();

    let deal = store.create_deal(acme_deal()).expect("create_deal should succeed");

    assert!(deal.id.as_str().starts_with("deal-"));
    assert_eq!(deal.name, "Acme CRM");
    assert_eq!(deal.profit_center, "12");
    assert_eq!(deal.created_at, start());
    assert_eq!(store.deals(), std::slice::from_ref(&deal));

    // Snapshot should be updated
    let snapshot = snapshot_rx.borrow();
    assert_eq!(snapshot.deals().len(), 1);
    assert_eq!(snapshot.deal(&deal.id), Some(&deal));
}

#[test]
fn test_deals_keep_insertion_order() {
    let (mut store, _rx, clock) = create_test_store();

    let first = store.create_deal(acme_deal()).unwrap();
    clock.advance(Duration::minutes(1));
    let second = store
        .create_deal(NewDeal {
            name: "Globex ERP".to_string(),
            ..acme_deal()
        })
        .unwrap();

    let ids: Vec<_> = store.deals().iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(store.deals()[1].created_at > store.deals()[0].created_at);
}

#[test]
fn test_create_proposal_initial_fields() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();

    let proposal = store
        .create_proposal(acme_proposal(&deal))
        .expect("create_proposal should succeed");

    assert!(proposal.id.as_str().starts_with("proposal-"));
    assert_eq!(proposal.deal_id, deal.id);
    assert_eq!(proposal.deal_name, "Acme CRM");
    assert_eq!(proposal.status, ProposalStatus::InDevelopment);
    assert_eq!(proposal.budget_status, BudgetStatus::NotAssigned);
    assert_eq!(proposal.created_at, start());
    assert_eq!(
        proposal.estimated_delivery_date,
        Some(start() + Duration::days(7))
    );

    let last_action = proposal.last_action.as_ref().unwrap();
    assert_eq!(last_action.action, "Proposal started");
    assert_eq!(last_action.date, start());
    assert_eq!(last_action.by.as_deref(), Some("User"));
    assert_eq!(last_action.comments, None);

    assert_eq!(
        proposal.ideas.selected_ideas,
        vec!["I - Diagnóstico C3: Full".to_string()]
    );
    assert_eq!(proposal.p_and_p.potential, Potential::High);
    assert_eq!(proposal.p_and_p.estimated_value, Some(50000.0));
    assert_eq!(proposal.p_and_p.probability, Some(70));
    assert_eq!(store.proposals(), std::slice::from_ref(&proposal));
}

#[test]
fn test_create_proposal_keeps_given_budget_status() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();

    let proposal = store
        .create_proposal(NewProposal {
            budget_status: Some(BudgetStatus::InReview),
            ..acme_proposal(&deal)
        })
        .unwrap();

    assert_eq!(proposal.budget_status, BudgetStatus::InReview);
}

#[test]
fn test_create_proposal_ignores_requested_status() {
    let temp = TempDir::new().unwrap();
    let (mut store, _clock) = open_persistent_store(&temp, &test_config());
    let deal = store.create_deal(acme_deal()).unwrap();

    let proposal = store
        .create_proposal(NewProposal {
            status: Some(ProposalStatus::Completed),
            ..acme_proposal(&deal)
        })
        .unwrap();

    assert_eq!(proposal.status, ProposalStatus::InDevelopment);

    let overridden: Vec<_> = journal_lines(&temp)
        .into_iter()
        .filter(|line| line["event"]["event"]["type"] == "RequestedStatusOverridden")
        .collect();
    assert_eq!(overridden.len(), 1);
    assert_eq!(overridden[0]["event"]["event"]["requested"], "completed");
}

#[test]
fn test_create_proposal_for_unknown_deal_is_rejected() {
    let (mut store, snapshot_rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let before = snapshot_rx.borrow().state().clone();

    let err = store
        .create_proposal(NewProposal {
            deal_id: DealId::from("deal-missing"),
            ..acme_proposal(&deal)
        })
        .unwrap_err();

    assert!(matches!(err, StoreError::DealNotFound(ref id) if id.as_str() == "deal-missing"));
    assert!(store.proposals().is_empty());
    assert_eq!(*snapshot_rx.borrow().state(), before);
}

#[test]
fn test_create_proposal_rejects_non_finite_estimated_value() {
    let (mut store, snapshot_rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let before = snapshot_rx.borrow().state().clone();

    let mut fields = acme_proposal(&deal);
    fields.p_and_p.estimated_value = Some(f64::INFINITY);
    let err = store.create_proposal(fields).unwrap_err();

    assert!(matches!(err, StoreError::InvalidEstimatedValue(v) if v.is_infinite()));
    assert!(store.proposals().is_empty());
    assert_eq!(*snapshot_rx.borrow().state(), before);
}

#[test]
fn test_complete_proposal_with_comment() {
    let (mut store, _rx, clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();

    clock.advance(Duration::days(2));
    let outcome = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::Completed,
            BudgetStatus::Ready,
            Some("Approved".to_string()),
        )
        .expect("update should succeed");

    let updated = outcome.proposal().expect("proposal should exist").clone();
    assert_eq!(updated.status, ProposalStatus::Completed);
    assert_eq!(updated.budget_status, BudgetStatus::Ready);
    assert_eq!(updated.estimated_delivery_date, None);

    let last_action = updated.last_action.as_ref().unwrap();
    assert_eq!(last_action.action, "Proposal completed");
    assert_eq!(last_action.date, start() + Duration::days(2));
    assert_eq!(last_action.comments.as_deref(), Some("Approved"));

    // Untouched fields carry over
    assert_eq!(updated.created_at, proposal.created_at);
    assert_eq!(updated.context, proposal.context);
    assert_eq!(store.proposals()[0], updated);
}

#[test]
fn test_adjustment_pending_reopens_delivery_window() {
    let (mut store, _rx, clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();

    clock.advance(Duration::days(3));
    let updated = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::AdjustmentPending,
            BudgetStatus::InReview,
            Some("Tighten the scope".to_string()),
        )
        .unwrap();

    let updated = updated.proposal().unwrap();
    assert_eq!(
        updated.estimated_delivery_date,
        Some(start() + Duration::days(3) + Duration::days(5))
    );
    assert_eq!(
        updated.last_action.as_ref().unwrap().action,
        "Feedback sent"
    );
}

#[test]
fn test_repeated_ready_for_review_only_moves_action_date() {
    let (mut store, _rx, clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();

    let first = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::ReadyForReview,
            BudgetStatus::NotAssigned,
            None,
        )
        .unwrap();
    clock.advance(Duration::seconds(30));
    let second = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::ReadyForReview,
            BudgetStatus::NotAssigned,
            None,
        )
        .unwrap();

    let first = first.proposal().unwrap().clone();
    let mut second = second.proposal().unwrap().clone();
    assert_eq!(second.estimated_delivery_date, None);
    assert!(second.last_action.as_ref().unwrap().date > first.last_action.as_ref().unwrap().date);

    second.last_action = first.last_action.clone();
    assert_eq!(second, first);
}

#[test]
fn test_empty_comment_is_not_recorded() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();

    let outcome = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::ReadyForReview,
            BudgetStatus::NotAssigned,
            Some(String::new()),
        )
        .unwrap();

    assert_eq!(
        outcome.proposal().unwrap().last_action.as_ref().unwrap().comments,
        None
    );
}

#[test]
fn test_update_leaves_other_proposals_untouched() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let first = store.create_proposal(acme_proposal(&deal)).unwrap();
    let second = store.create_proposal(acme_proposal(&deal)).unwrap();

    store
        .update_proposal_status(
            &second.id,
            ProposalStatus::Completed,
            BudgetStatus::Ready,
            None,
        )
        .unwrap();

    assert_eq!(store.proposals()[0], first);
    assert_eq!(store.proposals()[1].status, ProposalStatus::Completed);
    assert_eq!(store.proposals()[1].id, second.id);
}

#[test]
fn test_update_unknown_proposal_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let (mut store, _clock) = open_persistent_store(&temp, &test_config());
    store.create_deal(acme_deal()).unwrap();

    let storage_path = temp.path().join("storage").join("crm-mobile-storage.json");
    let stored_before = std::fs::read_to_string(&storage_path).unwrap();
    let state_before = store.snapshot().state().clone();

    let outcome = store
        .update_proposal_status(
            &ProposalId::from("nonexistent"),
            ProposalStatus::Completed,
            BudgetStatus::Ready,
            None,
        )
        .expect("unknown id is not an error");

    assert_eq!(outcome, UpdateOutcome::NotFound);
    assert_eq!(*store.snapshot().state(), state_before);
    assert_eq!(std::fs::read_to_string(&storage_path).unwrap(), stored_before);
    assert!(journal_lines(&temp)
        .iter()
        .any(|line| line["event"]["event"]["type"] == "ProposalNotFound"));
}

#[test]
fn test_permissive_mode_allows_reopening_completed() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();

    store.approve(&proposal.id).unwrap();
    let outcome = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::InDevelopment,
            BudgetStatus::NotAssigned,
            None,
        )
        .unwrap();

    assert_eq!(
        outcome.proposal().unwrap().status,
        ProposalStatus::InDevelopment
    );
}

#[test]
fn test_strict_mode_keeps_completed_terminal() {
    let mut config = test_config();
    config.transition_mode = TransitionMode::Strict;
    let (mut store, _rx) = CrmStore::in_memory(
        CrmState::default(),
        &config,
        StoreServices {
            clock: StoreClock::manual(start()),
        },
    );
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();
    store.approve(&proposal.id).unwrap();

    let err = store
        .update_proposal_status(
            &proposal.id,
            ProposalStatus::AdjustmentPending,
            BudgetStatus::InReview,
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::TransitionRejected {
            from: ProposalStatus::Completed,
            to: ProposalStatus::AdjustmentPending,
            ..
        }
    ));
    assert_eq!(store.proposals()[0].status, ProposalStatus::Completed);

    // Re-applying completed is still accepted
    assert!(store.approve(&proposal.id).is_ok());
}

#[test]
fn test_approve_keeps_budget_status() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store
        .create_proposal(NewProposal {
            budget_status: Some(BudgetStatus::Ready),
            ..acme_proposal(&deal)
        })
        .unwrap();

    let outcome = store.approve(&proposal.id).unwrap();
    let approved = outcome.proposal().unwrap();

    assert_eq!(approved.status, ProposalStatus::Completed);
    assert_eq!(approved.budget_status, BudgetStatus::Ready);
    assert_eq!(
        approved.last_action.as_ref().unwrap().comments.as_deref(),
        Some("Proposal approved")
    );
}

#[test]
fn test_send_feedback() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();

    let outcome = store
        .send_feedback(&proposal.id, "Add a budget breakdown".to_string())
        .unwrap();
    let updated = outcome.proposal().unwrap();

    assert_eq!(updated.status, ProposalStatus::AdjustmentPending);
    assert_eq!(
        updated.last_action.as_ref().unwrap().comments.as_deref(),
        Some("Add a budget breakdown")
    );

    assert_eq!(
        store
            .send_feedback(&ProposalId::from("nonexistent"), "x".to_string())
            .unwrap(),
        UpdateOutcome::NotFound
    );
}

#[test]
fn test_boards_partition_proposals() {
    let (mut store, _rx, _clock) = create_test_store();
    let deal = store.create_deal(acme_deal()).unwrap();
    let developing = store.create_proposal(acme_proposal(&deal)).unwrap();
    let adjusting = store.create_proposal(acme_proposal(&deal)).unwrap();
    let reviewing = store.create_proposal(acme_proposal(&deal)).unwrap();
    let done = store.create_proposal(acme_proposal(&deal)).unwrap();

    store.send_feedback(&adjusting.id, "Rework".to_string()).unwrap();
    store
        .update_proposal_status(
            &reviewing.id,
            ProposalStatus::ReadyForReview,
            BudgetStatus::InReview,
            None,
        )
        .unwrap();
    store.approve(&done.id).unwrap();

    let snapshot = store.snapshot();
    let ids = |board| -> Vec<ProposalId> {
        snapshot
            .board(board)
            .into_iter()
            .map(|p| p.id.clone())
            .collect()
    };
    assert_eq!(
        ids(StatusBoard::InDevelopment),
        vec![developing.id, adjusting.id]
    );
    assert_eq!(ids(StatusBoard::InReview), vec![reviewing.id]);
    assert_eq!(ids(StatusBoard::Completed), vec![done.id]);
}

#[test]
fn test_login_and_logout() {
    let (mut store, snapshot_rx, _clock) = create_test_store();
    assert!(!snapshot_rx.borrow().is_authenticated());

    store.login("jane@acme.test".to_string()).unwrap();
    assert!(snapshot_rx.borrow().is_authenticated());
    assert_eq!(snapshot_rx.borrow().user_id(), Some("jane@acme.test"));

    store.logout().unwrap();
    assert!(!snapshot_rx.borrow().is_authenticated());
    assert_eq!(snapshot_rx.borrow().user_id(), None);
}

#[test]
fn test_apply_dispatches_commands() {
    let (mut store, _rx, _clock) = create_test_store();

    let outcome = store
        .apply(StoreCommand::CreateDeal {
            fields: acme_deal(),
        })
        .unwrap();
    let CommandOutcome::DealCreated(deal) = outcome else {
        panic!("Expected DealCreated outcome");
    };

    let outcome = store
        .apply(StoreCommand::CreateProposal {
            fields: acme_proposal(&deal),
        })
        .unwrap();
    let CommandOutcome::ProposalCreated(proposal) = outcome else {
        panic!("Expected ProposalCreated outcome");
    };

    let outcome = store
        .apply(StoreCommand::UpdateProposalStatus {
            id: proposal.id.clone(),
            status: ProposalStatus::ReadyForReview,
            budget_status: BudgetStatus::InReview,
            comment: None,
        })
        .unwrap();
    assert!(matches!(
        outcome,
        CommandOutcome::StatusUpdated(UpdateOutcome::Updated(_))
    ));

    assert_eq!(
        store.apply(StoreCommand::Logout).unwrap(),
        CommandOutcome::SessionChanged
    );
}

#[test]
fn test_subscribers_see_each_commit() {
    let (mut store, _rx, _clock) = create_test_store();
    let mut subscriber = store.subscribe();

    store.create_deal(acme_deal()).unwrap();

    assert!(subscriber.has_changed().unwrap());
    assert_eq!(subscriber.borrow_and_update().deals().len(), 1);
}

#[test]
fn test_reopen_restores_committed_state() {
    let temp = TempDir::new().unwrap();
    let config = test_config();

    let committed = {
        let (mut store, clock) = open_persistent_store(&temp, &config);
        let deal = store.create_deal(acme_deal()).unwrap();
        let proposal = store.create_proposal(acme_proposal(&deal)).unwrap();
        clock.advance(Duration::milliseconds(1234));
        store
            .update_proposal_status(
                &proposal.id,
                ProposalStatus::Completed,
                BudgetStatus::Ready,
                Some("Approved".to_string()),
            )
            .unwrap();
        store.login("jane@acme.test".to_string()).unwrap();
        store.snapshot().state().clone()
    };

    let (reopened, _clock) = open_persistent_store(&temp, &config);
    assert_eq!(*reopened.snapshot().state(), committed);
}

#[test]
fn test_open_seeds_demo_data_once() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config();
    config.seed_demo_data = true;

    let (mut store, _clock) = open_persistent_store(&temp, &config);
    assert!(!store.deals().is_empty());
    assert!(!store.proposals().is_empty());
    let seeded_deals = store.deals().len();

    store.create_deal(acme_deal()).unwrap();
    drop(store);

    let (reopened, _clock) = open_persistent_store(&temp, &config);
    assert_eq!(reopened.deals().len(), seeded_deals + 1);

    let loaded: Vec<_> = journal_lines(&temp)
        .into_iter()
        .filter(|line| line["event"]["type"] == "StateLoaded")
        .map(|line| line["event"]["source"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(loaded, vec!["seed".to_string(), "storage".to_string()]);
}

#[test]
fn test_open_without_seeding_starts_empty() {
    let temp = TempDir::new().unwrap();
    let (store, _clock) = open_persistent_store(&temp, &test_config());
    assert!(store.deals().is_empty());
    assert!(store.proposals().is_empty());
}

#[test]
fn test_failed_persist_keeps_previous_state() {
    let temp = TempDir::new().unwrap();
    // A regular file where the storage directory should be
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let slot = StorageSlot::new(blocker.join("crm-mobile-storage.json"));

    let (mut store, snapshot_rx) = CrmStore::open(
        slot,
        &test_config(),
        StoreServices {
            clock: StoreClock::manual(start()),
        },
        None,
    )
    .expect("Opening an empty slot should not write");

    let err = store.create_deal(acme_deal()).unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert!(store.deals().is_empty());
    assert!(snapshot_rx.borrow().deals().is_empty());
}

proptest! {
    #[test]
    fn prop_created_ids_are_unique(count in 1usize..40) {
        let (mut store, _rx, _clock) = create_test_store();
        let deal = store.create_deal(acme_deal()).unwrap();
        for _ in 0..count {
            store.create_deal(acme_deal()).unwrap();
            store.create_proposal(acme_proposal(&deal)).unwrap();
        }

        let mut deal_ids: Vec<_> = store.deals().iter().map(|d| d.id.clone()).collect();
        deal_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        deal_ids.dedup();
        prop_assert_eq!(deal_ids.len(), count + 1);

        let mut proposal_ids: Vec<_> = store.proposals().iter().map(|p| p.id.clone()).collect();
        proposal_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        proposal_ids.dedup();
        prop_assert_eq!(proposal_ids.len(), count);
    }

    #[test]
    fn prop_new_proposals_start_in_development(
        requested in proptest::option::of(proptest::sample::select(ProposalStatus::ALL.to_vec())),
        budget in proptest::option::of(proptest::sample::select(BudgetStatus::ALL.to_vec())),
    ) {
        let (mut store, _rx, _clock) = create_test_store();
        let deal = store.create_deal(acme_deal()).unwrap();

        let proposal = store
            .create_proposal(NewProposal {
                status: requested,
                budget_status: budget,
                ..acme_proposal(&deal)
            })
            .unwrap();

        prop_assert_eq!(proposal.status, ProposalStatus::InDevelopment);
        prop_assert_eq!(proposal.budget_status, budget.unwrap_or(BudgetStatus::NotAssigned));
    }
}
