//! End-to-end journeys against a stub API server.
//!
//! The stub implements just enough of the API to drive the real clients
//! and flows over actual HTTP: login, cart, checkout, transactions, and
//! reviews, including the duplicate-review conflict and token revocation.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use bazaar_client::api::{
    AuthClient, CartClient, OrderClient, ProductClient, ReviewClient, TransactionClient,
};
use bazaar_client::flow::{
    pump, transition, CheckoutFlowState, FlowEvent, FlowOutcome, InterpreterContext, SaleFlowState,
};
use bazaar_client::session::InMemorySessionRepository;
use bazaar_client::{Http, SessionHandle};
use bazaar_core::{
    OrderNumber, PaymentMethod, ProductId, Rating, ShippingAddress, SubRatings, TransactionId,
    UserId,
};

const TOKEN: &str = "test-token";

#[derive(Default)]
struct Stub {
    /// Token revoked server-side; every authenticated call 401s.
    revoked: bool,
    cart_items: Vec<Value>,
    transaction_created: bool,
    transaction_confirmed: bool,
    review_submitted: bool,
    /// The caller's helpful vote on the one review; voting is idempotent.
    helpful_marked: bool,
    review_responded: bool,
    order_seq: u64,
}

type SharedStub = Arc<Mutex<Stub>>;

fn authorized(headers: &HeaderMap, stub: &Stub) -> bool {
    !stub.revoked
        && headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", TOKEN))
            .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid or expired token" })),
    )
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "seller@example.com" {
        (
            StatusCode::OK,
            Json(json!({
                "token": TOKEN,
                "user": {
                    "id": "u-seller",
                    "username": "seller",
                    "email": "seller@example.com",
                },
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
    }
}

async fn current_user(State(stub): State<SharedStub>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": "u-seller",
            "username": "seller",
            "email": "seller@example.com",
        })),
    )
}

async fn list_products(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "products": [{
                "id": "p-1",
                "title": "Vintage lamp",
                "price": 25.0,
                "seller_id": "u-other",
                "sold": false,
                "created_at": "2024-04-28T09:00:00Z",
            }],
            "pagination": { "page": 1, "limit": 20, "total": 1, "total_pages": 1 },
        })),
    )
}

async fn get_cart(State(stub): State<SharedStub>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({ "items": stub.cart_items })))
}

async fn add_cart_item(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    let item = json!({
        "product_id": body["product_id"],
        "title": "Vintage lamp",
        "price": 25.0,
        "quantity": body["quantity"],
    });
    stub.cart_items.push(item);
    (StatusCode::OK, Json(json!({ "items": stub.cart_items })))
}

async fn shipping_options(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": "standard", "label": "Standard (3-5 days)", "price": 4.99 },
            { "id": "express", "label": "Express (1 day)", "price": 12.99 },
        ])),
    )
}

async fn place_order(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    if stub.cart_items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Cart is empty" })),
        );
    }
    stub.order_seq += 1;
    let order_number = format!("ORD-1714557600000-{}", stub.order_seq);
    let items = std::mem::take(&mut stub.cart_items);
    (
        StatusCode::OK,
        Json(json!({
            "id": "order-1",
            "order_number": order_number,
            "items": items,
            "shipping_address": body["shipping_address"],
            "shipping_option": { "id": "standard", "label": "Standard (3-5 days)", "price": 4.99 },
            "payment_method": body["payment_method"],
            "total": 29.99,
            "created_at": "2024-05-01T10:00:00Z",
        })),
    )
}

fn transaction_json(confirmed: bool) -> Value {
    json!({
        "id": "t-1",
        "product_id": "p-1",
        "seller_id": "u-seller",
        "buyer_id": "u-buyer",
        "status": if confirmed { "confirmed" } else { "pending" },
        "seller_confirmed": true,
        "buyer_confirmed": confirmed,
        "seller_confirmed_at": "2024-05-01T10:00:00Z",
        "buyer_confirmed_at": if confirmed { Value::from("2024-05-01T11:00:00Z") } else { Value::Null },
        "confirmed_at": if confirmed { Value::from("2024-05-01T11:00:00Z") } else { Value::Null },
        "agreed_price": 25.0,
        "meeting_method": "pickup",
        "notes": null,
        "created_at": "2024-05-01T10:00:00Z",
    })
}

async fn potential_buyers(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_product_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": "u-buyer", "username": "buyer", "last_message_at": "2024-04-30T09:00:00Z" },
        ])),
    )
}

async fn create_transaction(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    assert_eq!(body["buyer_id"], "u-buyer");
    stub.transaction_created = true;
    (StatusCode::OK, Json(transaction_json(false)))
}

async fn list_confirmed(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    let transactions = if stub.transaction_created && stub.transaction_confirmed {
        vec![transaction_json(true)]
    } else {
        Vec::new()
    };
    (StatusCode::OK, Json(Value::Array(transactions)))
}

async fn confirm_transaction(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    stub.transaction_confirmed = true;
    (StatusCode::OK, Json(transaction_json(true)))
}

async fn create_review(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    if !stub.transaction_confirmed {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Transaction is not confirmed" })),
        );
    }
    if stub.review_submitted {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "You have already reviewed this transaction" })),
        );
    }
    stub.review_submitted = true;
    let mut review = review_json(&stub);
    review["rating"] = body["rating"].clone();
    review["communication_rating"] = body["communication_rating"].clone();
    (StatusCode::OK, Json(review))
}

fn review_json(stub: &Stub) -> Value {
    json!({
        "id": "r-1",
        "transaction_id": "t-1",
        "reviewer_id": "u-seller",
        "reviewed_user_id": "u-buyer",
        "review_type": "buyer",
        "rating": 5,
        "helpful_count": if stub.helpful_marked { 1 } else { 0 },
        "response_text": if stub.review_responded {
            Value::from("Thanks for the smooth handover")
        } else {
            Value::Null
        },
        "created_at": "2024-05-01T12:00:00Z",
    })
}

async fn mark_helpful(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized().into_response();
    }
    // Idempotent per viewer: a repeat vote changes nothing.
    stub.helpful_marked = true;
    StatusCode::NO_CONTENT.into_response()
}

async fn remove_helpful(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized().into_response();
    }
    stub.helpful_marked = false;
    StatusCode::NO_CONTENT.into_response()
}

async fn respond_to_review(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_id): Path<String>,
    Json(_body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    if stub.review_responded {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "A response already exists for this review" })),
        );
    }
    stub.review_responded = true;
    (StatusCode::OK, Json(review_json(&stub)))
}

async fn user_reviews(
    State(stub): State<SharedStub>,
    headers: HeaderMap,
    Path(_user_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let stub = stub.lock().await;
    if !authorized(&headers, &stub) {
        return unauthorized();
    }
    let reviews = if stub.review_submitted {
        vec![review_json(&stub)]
    } else {
        Vec::new()
    };
    let total = reviews.len();
    (
        StatusCode::OK,
        Json(json!({
            "reviews": reviews,
            "pagination": {
                "page": 1,
                "limit": 20,
                "total": total,
                "total_pages": 1,
            },
        })),
    )
}

/// Start the stub server on an ephemeral port; returns its base URL.
async fn start_stub(stub: SharedStub) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(current_user))
        .route("/api/products", get(list_products))
        .route("/api/cart", get(get_cart))
        .route("/api/cart/items", post(add_cart_item))
        .route("/api/checkout/shipping-options", get(shipping_options))
        .route("/api/orders", post(place_order))
        .route("/api/transactions", post(create_transaction))
        .route("/api/transactions/confirmed", get(list_confirmed))
        .route("/api/transactions/:id/confirm", put(confirm_transaction))
        .route("/api/transactions/product/:id/buyers", get(potential_buyers))
        .route("/api/reviews/transaction/:id", post(create_review))
        .route("/api/reviews/user/:id", get(user_reviews))
        .route(
            "/api/reviews/:id/helpful",
            post(mark_helpful).delete(remove_helpful),
        )
        .route("/api/reviews/:id/respond", post(respond_to_review))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });
    format!("http://{}", addr)
}

async fn logged_in_http(base_url: &str) -> Http {
    let session = SessionHandle::new(Arc::new(InMemorySessionRepository::new()));
    let http = Http::new(base_url, session, Duration::from_secs(5));
    AuthClient::new(http.clone())
        .login("seller@example.com", "hunter2")
        .await
        .expect("Login should succeed");
    http
}

fn interpreter(http: &Http) -> (InterpreterContext, mpsc::UnboundedReceiver<FlowOutcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = InterpreterContext {
        transactions: TransactionClient::new(http.clone()),
        reviews: ReviewClient::new(http.clone()),
        cart: CartClient::new(http.clone()),
        orders: OrderClient::new(http.clone()),
        completions: Some(tx),
    };
    (ctx, rx)
}

#[tokio::test]
async fn full_checkout_journey_produces_order_number() {
    let base_url = start_stub(SharedStub::default()).await;
    let http = logged_in_http(&base_url).await;
    let (ctx, mut outcomes) = interpreter(&http);

    // Browse, then add the listing to the cart. The badge count comes from
    // the returned cart, never a local increment.
    let listings = ProductClient::new(http.clone())
        .browse(1, 20)
        .await
        .expect("Browse should succeed");
    let product = &listings.products[0];
    assert!(!product.sold);

    let cart = CartClient::new(http.clone())
        .add_item(&product.id, 1)
        .await
        .expect("Add to cart should succeed");
    assert_eq!(cart.item_count(), 1);

    let address = ShippingAddress {
        full_name: "Ada Lovelace".to_string(),
        street: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        postal_code: "N1 9GU".to_string(),
        country: "UK".to_string(),
        phone: None,
    };

    let mut state = CheckoutFlowState::open();
    for event in [
        FlowEvent::CheckoutOpened,
        FlowEvent::CartConfirmed,
        FlowEvent::AddressEntered {
            address: address.clone(),
        },
        FlowEvent::ShippingSelected {
            option_id: "standard".to_string(),
        },
        FlowEvent::PaymentSelected {
            method: PaymentMethod::Card,
        },
    ] {
        state = pump(&ctx, state, event, transition::checkout::transition).await;
    }

    // The review step shows the entered address and the cart contents.
    let (shown_address, shown_cart) = state
        .order_summary()
        .expect("Review step should expose the summary");
    assert_eq!(shown_address, &address);
    assert_eq!(shown_cart.item_count(), 1);

    let state = pump(&ctx, state, FlowEvent::OrderReviewed, transition::checkout::transition).await;
    assert!(state.is_terminal());

    match outcomes.recv().await {
        Some(FlowOutcome::OrderConfirmed { order_number }) => {
            // Also check the format survives a round trip through text.
            let reparsed = OrderNumber::parse(order_number.as_str())
                .expect("Order number should match ORD-<ts>-<seq>");
            assert_eq!(reparsed, order_number);
        }
        other => panic!("Expected an order confirmation, got {:?}", other),
    }
}

#[tokio::test]
async fn mark_sold_confirm_and_review_rejects_duplicates() {
    let base_url = start_stub(SharedStub::default()).await;
    let http = logged_in_http(&base_url).await;
    let (ctx, mut outcomes) = interpreter(&http);

    // Seller marks the product sold to the only candidate buyer.
    let state = SaleFlowState::open(ProductId::from("p-1"), "Vintage lamp");
    let state = pump(&ctx, state, FlowEvent::SaleOpened, transition::sale::transition).await;
    assert!(!state.has_no_candidates());
    let state = pump(
        &ctx,
        state,
        FlowEvent::BuyerSelected {
            buyer_id: "u-buyer".into(),
        },
        transition::sale::transition,
    )
    .await;
    let state = pump(&ctx, state, FlowEvent::SaleSubmitted, transition::sale::transition).await;
    assert!(state.is_terminal());
    assert!(matches!(
        outcomes.recv().await,
        Some(FlowOutcome::SaleRecorded { .. })
    ));

    // Counterparty confirms; reviews unlock.
    let transactions = TransactionClient::new(http.clone());
    let confirmed = transactions
        .confirm(&TransactionId::from("t-1"))
        .await
        .expect("Confirm should succeed");
    assert!(confirmed.reviews_eligible());

    let reviews = ReviewClient::new(http.clone());
    let rating = Rating::new(5).expect("5 is in range");
    reviews
        .create(&TransactionId::from("t-1"), rating, None, SubRatings::default())
        .await
        .expect("First review should succeed");

    // A second submission for the same transaction is a conflict, and the
    // server's message is surfaced verbatim.
    let err = reviews
        .create(&TransactionId::from("t-1"), rating, None, SubRatings::default())
        .await
        .expect_err("Duplicate review should be rejected");
    assert!(err.is_conflict());
    assert_eq!(
        err.surface("submit the review"),
        "You have already reviewed this transaction"
    );
}

#[tokio::test]
async fn helpful_votes_refetch_and_one_shot_response() {
    let base_url = start_stub(SharedStub::default()).await;
    let http = logged_in_http(&base_url).await;

    let transactions = TransactionClient::new(http.clone());
    let transaction_id = TransactionId::from("t-1");

    transactions
        .create(&ProductId::from("p-1"), &UserId::from("u-buyer"), None, None, None)
        .await
        .expect("Create should succeed");

    // The review entry point gates on confirmed membership: nothing to
    // review before the counterparty confirms.
    let gate = transactions
        .find_confirmed(&transaction_id)
        .await
        .expect("Lookup should succeed");
    assert!(gate.is_none());

    transactions
        .confirm(&transaction_id)
        .await
        .expect("Confirm should succeed");
    let gate = transactions
        .find_confirmed(&transaction_id)
        .await
        .expect("Lookup should succeed")
        .expect("Confirmed transaction should be listed");
    assert!(gate.reviews_eligible());

    let reviews = ReviewClient::new(http.clone());
    let rating = Rating::new(4).expect("4 is in range");
    let review = reviews
        .create(&transaction_id, rating, None, SubRatings::default())
        .await
        .expect("Review should succeed");
    assert!(review.can_respond());

    // Voting is idempotent per viewer and acknowledged with an empty
    // body; the count comes from a refetch, never a local bump.
    let reviewed_user = UserId::from("u-buyer");
    reviews
        .mark_helpful(&review.id)
        .await
        .expect("First vote should succeed");
    reviews
        .mark_helpful(&review.id)
        .await
        .expect("Repeat vote should succeed");
    let page = reviews
        .user_reviews(&reviewed_user, None, 1, 20)
        .await
        .expect("Refetch should succeed");
    assert_eq!(page.reviews[0].helpful_count, 1);

    reviews
        .remove_helpful(&review.id)
        .await
        .expect("Unvote should succeed");
    let page = reviews
        .user_reviews(&reviewed_user, None, 1, 20)
        .await
        .expect("Refetch should succeed");
    assert_eq!(page.reviews[0].helpful_count, 0);

    // The reviewed party's response is one-shot.
    let responded = reviews
        .respond(&review.id, "Thanks for the smooth handover")
        .await
        .expect("First response should succeed");
    assert!(!responded.can_respond());

    let err = reviews
        .respond(&review.id, "One more thing")
        .await
        .expect_err("Second response should be rejected");
    assert!(err.is_conflict());
    assert_eq!(
        err.surface("respond to the review"),
        "A response already exists for this review"
    );
}

#[tokio::test]
async fn revoked_token_clears_session_and_notifies() {
    let stub = SharedStub::default();
    let base_url = start_stub(stub.clone()).await;
    let http = logged_in_http(&base_url).await;
    assert!(http.session().is_logged_in().await);

    let mut expiry = http.session().subscribe_expiry();

    stub.lock().await.revoked = true;

    let err = AuthClient::new(http.clone())
        .current_user()
        .await
        .expect_err("Revoked token should be rejected");
    assert!(err.is_unauthorized());

    // The 401 cleared the session and fired the expiry channel.
    assert!(!http.session().is_logged_in().await);
    expiry
        .recv()
        .await
        .expect("Expiry notification should arrive");
}
