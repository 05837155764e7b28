//! Transition function for the mark-as-sold flow.

use crate::flow::effect::{Effect, FlowOutcome, LogLevel};
use crate::flow::event::FlowEvent;
use crate::flow::state::SaleFlowState;

use super::Transition;

pub fn transition(state: SaleFlowState, event: FlowEvent) -> Transition<SaleFlowState> {
    match (state, event) {
        (
            SaleFlowState::Idle {
                product_id,
                product_title,
            },
            FlowEvent::SaleOpened,
        ) => Transition::new(
            SaleFlowState::LoadingBuyers {
                product_id: product_id.clone(),
                product_title,
            },
            vec![Effect::LoadPotentialBuyers { product_id }],
        ),

        (
            SaleFlowState::LoadingBuyers {
                product_id,
                product_title,
            },
            FlowEvent::BuyersLoaded { candidates },
        ) => {
            let effects = if candidates.is_empty() {
                vec![Effect::Log {
                    level: LogLevel::Info,
                    message: format!("No candidate buyers for product {}", product_id),
                }]
            } else {
                Vec::new()
            };
            Transition::new(
                SaleFlowState::SelectingBuyer {
                    product_id,
                    product_title,
                    candidates,
                    selected: None,
                    terms: Default::default(),
                    error: None,
                },
                effects,
            )
        }

        (
            SaleFlowState::LoadingBuyers {
                product_id,
                product_title,
            },
            FlowEvent::BuyersLoadFailed { error },
        ) => Transition::state_only(SaleFlowState::SelectingBuyer {
            product_id,
            product_title,
            candidates: Vec::new(),
            selected: None,
            terms: Default::default(),
            error: Some(error),
        }),

        (
            SaleFlowState::SelectingBuyer {
                product_id,
                product_title,
                candidates,
                selected,
                terms,
                error,
            },
            FlowEvent::BuyerSelected { buyer_id },
        ) => {
            // Only candidates from the fetched list are selectable.
            if candidates.iter().any(|c| c.id == buyer_id) {
                Transition::state_only(SaleFlowState::SelectingBuyer {
                    product_id,
                    product_title,
                    candidates,
                    selected: Some(buyer_id),
                    terms,
                    error,
                })
            } else {
                Transition::new(
                    SaleFlowState::SelectingBuyer {
                        product_id,
                        product_title,
                        candidates,
                        selected,
                        terms,
                        error,
                    },
                    vec![Effect::Log {
                        level: LogLevel::Warn,
                        message: format!("Selected buyer {} is not a candidate", buyer_id),
                    }],
                )
            }
        }

        (
            SaleFlowState::SelectingBuyer {
                product_id,
                product_title,
                candidates,
                selected,
                error,
                ..
            },
            FlowEvent::TermsUpdated { terms },
        ) => Transition::state_only(SaleFlowState::SelectingBuyer {
            product_id,
            product_title,
            candidates,
            selected,
            terms,
            error,
        }),

        (
            SaleFlowState::SelectingBuyer {
                product_id,
                product_title,
                candidates,
                selected: Some(buyer_id),
                terms,
                ..
            },
            FlowEvent::SaleSubmitted,
        ) => Transition::new(
            SaleFlowState::Submitting {
                product_id: product_id.clone(),
                product_title,
                candidates,
                buyer_id: buyer_id.clone(),
                terms: terms.clone(),
            },
            vec![Effect::CreateTransaction {
                product_id,
                buyer_id,
                agreed_price: terms.agreed_price,
                meeting_method: terms.meeting_method,
                notes: terms.notes,
            }],
        ),

        (
            state @ SaleFlowState::SelectingBuyer { selected: None, .. },
            FlowEvent::SaleSubmitted,
        ) => Transition::new(
            state,
            vec![Effect::Log {
                level: LogLevel::Warn,
                message: "Submission attempted without a selected buyer".to_string(),
            }],
        ),

        (SaleFlowState::Submitting { .. }, FlowEvent::TransactionCreated { transaction }) => {
            Transition::new(
                SaleFlowState::Completed {
                    transaction: transaction.clone(),
                },
                vec![Effect::NotifyCompleted {
                    outcome: FlowOutcome::SaleRecorded {
                        transaction_id: transaction.id,
                    },
                }],
            )
        }

        (
            SaleFlowState::Submitting {
                product_id,
                product_title,
                candidates,
                buyer_id,
                terms,
            },
            FlowEvent::TransactionCreateFailed { error },
        ) => Transition::state_only(SaleFlowState::SelectingBuyer {
            product_id,
            product_title,
            candidates,
            selected: Some(buyer_id),
            terms,
            error: Some(error),
        }),

        (state, event) => Transition::unexpected(state, &event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::state::SaleTerms;
    use bazaar_core::{
        MeetingMethod, PotentialBuyer, ProductId, Transaction, TransactionId, TransactionStatus,
        UserId,
    };
    use chrono::{TimeZone, Utc};

    fn candidates() -> Vec<PotentialBuyer> {
        vec![
            PotentialBuyer {
                id: UserId::from("u-1"),
                username: "alice".to_string(),
                last_message_at: None,
            },
            PotentialBuyer {
                id: UserId::from("u-2"),
                username: "bob".to_string(),
                last_message_at: None,
            },
        ]
    }

    fn selecting(selected: Option<UserId>) -> SaleFlowState {
        SaleFlowState::SelectingBuyer {
            product_id: ProductId::from("p-1"),
            product_title: "Lamp".to_string(),
            candidates: candidates(),
            selected,
            terms: SaleTerms::default(),
            error: None,
        }
    }

    #[test]
    fn test_open_fetches_candidates() {
        let result = transition(
            SaleFlowState::open(ProductId::from("p-1"), "Lamp"),
            FlowEvent::SaleOpened,
        );
        assert!(matches!(result.state, SaleFlowState::LoadingBuyers { .. }));
        assert_eq!(
            result.effects,
            vec![Effect::LoadPotentialBuyers {
                product_id: ProductId::from("p-1"),
            }]
        );
    }

    #[test]
    fn test_submit_without_selection_stays_put() {
        let result = transition(selecting(None), FlowEvent::SaleSubmitted);
        assert!(matches!(
            result.state,
            SaleFlowState::SelectingBuyer { selected: None, .. }
        ));
        assert!(matches!(
            result.effects.as_slice(),
            [Effect::Log { .. }]
        ));
    }

    #[test]
    fn test_selecting_unknown_buyer_is_rejected() {
        let result = transition(
            selecting(None),
            FlowEvent::BuyerSelected {
                buyer_id: UserId::from("u-99"),
            },
        );
        assert!(matches!(
            result.state,
            SaleFlowState::SelectingBuyer { selected: None, .. }
        ));
    }

    #[test]
    fn test_submit_with_selection_creates_transaction() {
        let result = transition(
            selecting(Some(UserId::from("u-1"))),
            FlowEvent::SaleSubmitted,
        );
        assert!(matches!(result.state, SaleFlowState::Submitting { .. }));
        match &result.effects[..] {
            [Effect::CreateTransaction {
                product_id,
                buyer_id,
                ..
            }] => {
                assert_eq!(product_id, &ProductId::from("p-1"));
                assert_eq!(buyer_id, &UserId::from("u-1"));
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_failure_returns_to_form_with_error() {
        let submitting = transition(
            selecting(Some(UserId::from("u-1"))),
            FlowEvent::SaleSubmitted,
        )
        .state;
        let result = transition(
            submitting,
            FlowEvent::TransactionCreateFailed {
                error: "failed to record the sale".to_string(),
            },
        );
        assert_eq!(result.state.error(), Some("failed to record the sale"));
        assert!(result.state.submission_enabled());
    }

    #[test]
    fn test_success_completes_and_notifies() {
        let transaction = Transaction {
            id: TransactionId::from("t-1"),
            product_id: Some(ProductId::from("p-1")),
            seller_id: UserId::from("seller"),
            buyer_id: UserId::from("u-1"),
            status: TransactionStatus::Pending,
            seller_confirmed: true,
            buyer_confirmed: false,
            seller_confirmed_at: None,
            buyer_confirmed_at: None,
            confirmed_at: None,
            agreed_price: Some(25.0),
            meeting_method: Some(MeetingMethod::Pickup),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let submitting = transition(
            selecting(Some(UserId::from("u-1"))),
            FlowEvent::SaleSubmitted,
        )
        .state;
        let result = transition(submitting, FlowEvent::TransactionCreated { transaction });
        assert!(result.state.is_terminal());
        assert!(matches!(
            result.effects.as_slice(),
            [Effect::NotifyCompleted {
                outcome: FlowOutcome::SaleRecorded { .. },
            }]
        ));
    }
}
