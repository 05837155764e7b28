//! Effect interpreter: executes effects against the API clients and turns
//! their results back into events.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{CartClient, OrderClient, ReviewClient, TransactionClient};

use super::effect::{Effect, FlowOutcome, LogLevel};
use super::event::FlowEvent;

/// Everything the interpreter needs to execute effects.
#[derive(Clone)]
pub struct InterpreterContext {
    pub transactions: TransactionClient,
    pub reviews: ReviewClient,
    pub cart: CartClient,
    pub orders: OrderClient,
    /// Where completion outcomes are delivered, if anyone is listening.
    pub completions: Option<mpsc::UnboundedSender<FlowOutcome>>,
}

/// Execute the effects in order, collecting the follow-up events they
/// produce. API failures become `*Failed` events carrying the surfaced
/// message, never errors; the flows decide what to do with them.
pub async fn execute_effects(ctx: &InterpreterContext, effects: Vec<Effect>) -> Vec<FlowEvent> {
    let mut events = Vec::new();
    for effect in effects {
        if let Some(event) = execute_effect(ctx, effect).await {
            events.push(event);
        }
    }
    events
}

async fn execute_effect(ctx: &InterpreterContext, effect: Effect) -> Option<FlowEvent> {
    match effect {
        Effect::LoadPotentialBuyers { product_id } => {
            match ctx.transactions.potential_buyers(&product_id).await {
                Ok(candidates) => Some(FlowEvent::BuyersLoaded { candidates }),
                Err(e) => Some(FlowEvent::BuyersLoadFailed {
                    error: e.surface("load potential buyers"),
                }),
            }
        }

        Effect::LoadCart => match ctx.cart.get().await {
            Ok(cart) => Some(FlowEvent::CartLoaded { cart }),
            Err(e) => Some(FlowEvent::CartLoadFailed {
                error: e.surface("load the cart"),
            }),
        },

        Effect::LoadShippingOptions => match ctx.orders.shipping_options().await {
            Ok(options) => Some(FlowEvent::ShippingOptionsLoaded { options }),
            Err(e) => Some(FlowEvent::ShippingOptionsLoadFailed {
                error: e.surface("load shipping options"),
            }),
        },

        Effect::CreateTransaction {
            product_id,
            buyer_id,
            agreed_price,
            meeting_method,
            notes,
        } => {
            match ctx
                .transactions
                .create(
                    &product_id,
                    &buyer_id,
                    agreed_price,
                    meeting_method,
                    notes.as_deref(),
                )
                .await
            {
                Ok(transaction) => Some(FlowEvent::TransactionCreated { transaction }),
                Err(e) => Some(FlowEvent::TransactionCreateFailed {
                    error: e.surface("record the sale"),
                }),
            }
        }

        Effect::SubmitReview {
            transaction_id,
            rating,
            sub_ratings,
            review_text,
        } => {
            match ctx
                .reviews
                .create(&transaction_id, rating, review_text.as_deref(), sub_ratings)
                .await
            {
                Ok(review) => Some(FlowEvent::ReviewCreated { review }),
                Err(e) => Some(FlowEvent::ReviewCreateFailed {
                    error: e.surface("submit the review"),
                }),
            }
        }

        Effect::PlaceOrder {
            address,
            shipping_option_id,
            payment_method,
        } => {
            match ctx
                .orders
                .place(&address, &shipping_option_id, payment_method)
                .await
            {
                Ok(order) => Some(FlowEvent::OrderPlaced { order }),
                Err(e) => Some(FlowEvent::OrderPlaceFailed {
                    error: e.surface("place the order"),
                }),
            }
        }

        Effect::NotifyCompleted { outcome } => {
            if let Some(completions) = &ctx.completions {
                // The receiver may have gone away; completion is advisory.
                let _ = completions.send(outcome);
            }
            None
        }

        Effect::Log { level, message } => {
            match level {
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warn => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            }
            None
        }
    }
}
