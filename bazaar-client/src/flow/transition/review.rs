//! Transition function for the review flow.

use crate::flow::effect::{Effect, FlowOutcome};
use crate::flow::event::FlowEvent;
use crate::flow::state::ReviewFlowState;

use super::Transition;

pub fn transition(state: ReviewFlowState, event: FlowEvent) -> Transition<ReviewFlowState> {
    match (state, event) {
        (
            ReviewFlowState::Drafting {
                transaction_id,
                review_type,
                sub_ratings,
                review_text,
                error,
                ..
            },
            FlowEvent::RatingSet { rating },
        ) => Transition::state_only(ReviewFlowState::Drafting {
            transaction_id,
            review_type,
            rating: Some(rating),
            sub_ratings,
            review_text,
            error,
        }),

        (
            ReviewFlowState::Drafting {
                transaction_id,
                review_type,
                rating,
                review_text,
                error,
                ..
            },
            FlowEvent::SubRatingsSet { sub_ratings },
        ) => Transition::state_only(ReviewFlowState::Drafting {
            transaction_id,
            review_type,
            rating,
            sub_ratings,
            review_text,
            error,
        }),

        (
            ReviewFlowState::Drafting {
                transaction_id,
                review_type,
                rating,
                sub_ratings,
                error,
                ..
            },
            FlowEvent::ReviewTextSet { text },
        ) => Transition::state_only(ReviewFlowState::Drafting {
            transaction_id,
            review_type,
            rating,
            sub_ratings,
            review_text: text,
            error,
        }),

        (
            ReviewFlowState::Drafting {
                transaction_id,
                review_type,
                rating: Some(rating),
                sub_ratings,
                review_text,
                ..
            },
            FlowEvent::ReviewSubmitted,
        ) => Transition::new(
            ReviewFlowState::Submitting {
                transaction_id: transaction_id.clone(),
                review_type,
                rating,
                sub_ratings: sub_ratings.clone(),
                review_text: review_text.clone(),
            },
            vec![Effect::SubmitReview {
                transaction_id,
                rating,
                sub_ratings,
                review_text,
            }],
        ),

        (
            ReviewFlowState::Drafting {
                transaction_id,
                review_type,
                rating: None,
                sub_ratings,
                review_text,
                ..
            },
            FlowEvent::ReviewSubmitted,
        ) => Transition::state_only(ReviewFlowState::Drafting {
            transaction_id,
            review_type,
            rating: None,
            sub_ratings,
            review_text,
            error: Some("An overall rating is required".to_string()),
        }),

        (ReviewFlowState::Submitting { .. }, FlowEvent::ReviewCreated { review }) => {
            Transition::new(
                ReviewFlowState::Completed {
                    review: review.clone(),
                },
                vec![Effect::NotifyCompleted {
                    outcome: FlowOutcome::ReviewPosted {
                        review_id: review.id,
                    },
                }],
            )
        }

        (
            ReviewFlowState::Submitting {
                transaction_id,
                review_type,
                rating,
                sub_ratings,
                review_text,
            },
            FlowEvent::ReviewCreateFailed { error },
        ) => Transition::state_only(ReviewFlowState::Drafting {
            transaction_id,
            review_type,
            rating: Some(rating),
            sub_ratings,
            review_text,
            error: Some(error),
        }),

        (state, event) => Transition::unexpected(state, &event),
    }
}
