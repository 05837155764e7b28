//! Transition function for the checkout wizard.

use crate::flow::effect::{Effect, FlowOutcome, LogLevel};
use crate::flow::event::FlowEvent;
use crate::flow::state::{CheckoutFlowState, OrderDraft};

use super::Transition;

pub fn transition(state: CheckoutFlowState, event: FlowEvent) -> Transition<CheckoutFlowState> {
    match (state, event) {
        (CheckoutFlowState::LoadingCart, FlowEvent::CheckoutOpened) => {
            Transition::new(CheckoutFlowState::LoadingCart, vec![Effect::LoadCart])
        }

        (CheckoutFlowState::LoadingCart, FlowEvent::CartLoaded { cart }) => {
            Transition::state_only(CheckoutFlowState::Cart {
                draft: OrderDraft {
                    cart,
                    ..Default::default()
                },
                error: None,
            })
        }

        (CheckoutFlowState::LoadingCart, FlowEvent::CartLoadFailed { error }) => {
            Transition::state_only(CheckoutFlowState::Cart {
                draft: Default::default(),
                error: Some(error),
            })
        }

        (CheckoutFlowState::Cart { draft, .. }, FlowEvent::CartConfirmed) => {
            if draft.cart.is_empty() {
                Transition::new(
                    CheckoutFlowState::Cart {
                        draft,
                        error: Some("Your cart is empty".to_string()),
                    },
                    vec![Effect::Log {
                        level: LogLevel::Warn,
                        message: "Checkout attempted with an empty cart".to_string(),
                    }],
                )
            } else {
                Transition::state_only(CheckoutFlowState::AddressEntry { draft, error: None })
            }
        }

        (CheckoutFlowState::AddressEntry { mut draft, .. }, FlowEvent::AddressEntered { address }) => {
            let missing = address.missing_fields();
            if missing.is_empty() {
                draft.address = Some(address);
                Transition::new(
                    CheckoutFlowState::ShippingSelection {
                        draft,
                        options: Vec::new(),
                        error: None,
                    },
                    vec![Effect::LoadShippingOptions],
                )
            } else {
                Transition::state_only(CheckoutFlowState::AddressEntry {
                    draft,
                    error: Some(format!("Missing required fields: {}", missing.join(", "))),
                })
            }
        }

        (
            CheckoutFlowState::ShippingSelection { draft, .. },
            FlowEvent::ShippingOptionsLoaded { options },
        ) => Transition::state_only(CheckoutFlowState::ShippingSelection {
            draft,
            options,
            error: None,
        }),

        (
            CheckoutFlowState::ShippingSelection { draft, options, .. },
            FlowEvent::ShippingOptionsLoadFailed { error },
        ) => Transition::state_only(CheckoutFlowState::ShippingSelection {
            draft,
            options,
            error: Some(error),
        }),

        (
            CheckoutFlowState::ShippingSelection {
                mut draft,
                options,
                error,
            },
            FlowEvent::ShippingSelected { option_id },
        ) => match options.iter().find(|o| o.id == option_id) {
            Some(option) => {
                draft.shipping = Some(option.clone());
                Transition::state_only(CheckoutFlowState::PaymentSelection { draft, error: None })
            }
            None => Transition::new(
                CheckoutFlowState::ShippingSelection {
                    draft,
                    options,
                    error,
                },
                vec![Effect::Log {
                    level: LogLevel::Warn,
                    message: format!("Unknown shipping option selected: {}", option_id),
                }],
            ),
        },

        (
            CheckoutFlowState::PaymentSelection { mut draft, .. },
            FlowEvent::PaymentSelected { method },
        ) => {
            draft.payment = Some(method);
            Transition::state_only(CheckoutFlowState::ReviewOrder { draft, error: None })
        }

        (CheckoutFlowState::ReviewOrder { draft, error }, FlowEvent::OrderReviewed) => {
            match (
                draft.address.clone(),
                draft.shipping.clone(),
                draft.payment,
            ) {
                (Some(address), Some(shipping), Some(payment_method)) => Transition::new(
                    CheckoutFlowState::PlacingOrder { draft },
                    vec![Effect::PlaceOrder {
                        address,
                        shipping_option_id: shipping.id,
                        payment_method,
                    }],
                ),
                // Unreachable via the wizard's own transitions; kept as a
                // guard against events injected out of order.
                _ => Transition::new(
                    CheckoutFlowState::ReviewOrder { draft, error },
                    vec![Effect::Log {
                        level: LogLevel::Error,
                        message: "Order review reached with an incomplete draft".to_string(),
                    }],
                ),
            }
        }

        (CheckoutFlowState::PlacingOrder { .. }, FlowEvent::OrderPlaced { order }) => {
            Transition::new(
                CheckoutFlowState::Confirmed {
                    order: order.clone(),
                },
                vec![Effect::NotifyCompleted {
                    outcome: FlowOutcome::OrderConfirmed {
                        order_number: order.order_number,
                    },
                }],
            )
        }

        (CheckoutFlowState::PlacingOrder { draft }, FlowEvent::OrderPlaceFailed { error }) => {
            Transition::state_only(CheckoutFlowState::ReviewOrder {
                draft,
                error: Some(error),
            })
        }

        (state, event) => Transition::unexpected(state, &event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{
        Cart, CartItem, PaymentMethod, ProductId, ShippingAddress, ShippingOption,
    };

    fn cart() -> Cart {
        Cart {
            items: vec![CartItem {
                product_id: ProductId::from("p-1"),
                title: "Lamp".to_string(),
                price: 25.0,
                quantity: 1,
            }],
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_string(),
            street: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            postal_code: "N1 9GU".to_string(),
            country: "UK".to_string(),
            phone: None,
        }
    }

    fn options() -> Vec<ShippingOption> {
        vec![
            ShippingOption {
                id: "std".to_string(),
                label: "Standard".to_string(),
                price: 4.99,
            },
            ShippingOption {
                id: "exp".to_string(),
                label: "Express".to_string(),
                price: 12.99,
            },
        ]
    }

    /// Drives the wizard from open to the review step.
    fn reach_review() -> CheckoutFlowState {
        let mut state = CheckoutFlowState::open();
        for event in [
            FlowEvent::CheckoutOpened,
            FlowEvent::CartLoaded { cart: cart() },
            FlowEvent::CartConfirmed,
            FlowEvent::AddressEntered { address: address() },
            FlowEvent::ShippingOptionsLoaded { options: options() },
            FlowEvent::ShippingSelected {
                option_id: "std".to_string(),
            },
            FlowEvent::PaymentSelected {
                method: PaymentMethod::Card,
            },
        ] {
            state = transition(state, event).state;
        }
        state
    }

    #[test]
    fn test_empty_cart_cannot_proceed() {
        let state = CheckoutFlowState::Cart {
            draft: Default::default(),
            error: None,
        };
        let result = transition(state, FlowEvent::CartConfirmed);
        assert_eq!(result.state.error(), Some("Your cart is empty"));
        assert!(matches!(result.state, CheckoutFlowState::Cart { .. }));
    }

    #[test]
    fn test_incomplete_address_stays_on_entry() {
        let state = CheckoutFlowState::AddressEntry {
            draft: Default::default(),
            error: None,
        };
        let mut bad = address();
        bad.street = String::new();
        bad.city = "  ".to_string();
        let result = transition(state, FlowEvent::AddressEntered { address: bad });
        assert_eq!(
            result.state.error(),
            Some("Missing required fields: street, city")
        );
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_unknown_shipping_option_is_rejected() {
        let state = CheckoutFlowState::ShippingSelection {
            draft: Default::default(),
            options: options(),
            error: None,
        };
        let result = transition(
            state,
            FlowEvent::ShippingSelected {
                option_id: "teleport".to_string(),
            },
        );
        assert!(matches!(
            result.state,
            CheckoutFlowState::ShippingSelection { .. }
        ));
    }

    #[test]
    fn test_review_step_shows_address_and_items() {
        let state = reach_review();
        let (shown_address, shown_cart) = state.order_summary().unwrap();
        assert_eq!(shown_address.city, "London");
        assert_eq!(shown_cart.item_count(), 1);
    }

    #[test]
    fn test_reviewed_order_is_placed_with_chosen_terms() {
        let result = transition(reach_review(), FlowEvent::OrderReviewed);
        assert!(matches!(result.state, CheckoutFlowState::PlacingOrder { .. }));
        match &result.effects[..] {
            [Effect::PlaceOrder {
                shipping_option_id,
                payment_method,
                ..
            }] => {
                assert_eq!(shipping_option_id, "std");
                assert_eq!(payment_method, &PaymentMethod::Card);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_placement_failure_returns_to_review() {
        let placing = transition(reach_review(), FlowEvent::OrderReviewed).state;
        let result = transition(
            placing,
            FlowEvent::OrderPlaceFailed {
                error: "Payment was declined".to_string(),
            },
        );
        assert_eq!(result.state.error(), Some("Payment was declined"));
        assert!(matches!(result.state, CheckoutFlowState::ReviewOrder { .. }));
    }
}
