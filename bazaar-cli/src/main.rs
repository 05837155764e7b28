use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;

use bazaar_client::api::{
    AuthClient, CartClient, NewsClient, OrderClient, ProductClient, ReviewClient, SearchClient,
    TransactionClient,
};
use bazaar_client::api::news::NewsCategory;
use bazaar_client::flow::{
    pump, transition, CheckoutFlowState, FlowEvent, InterpreterContext, ReviewFlowState,
    SaleFlowState, SaleTerms,
};
use bazaar_client::session::SqliteSessionRepository;
use bazaar_client::typeahead::Typeahead;
use bazaar_client::{Config, Http, SessionHandle};
use bazaar_core::{
    MeetingMethod, PaymentMethod, ProductId, Rating, ReviewId, ReviewType, ShippingAddress,
    SubRatings, Transaction, TransactionId, UserId,
};

/// Bazaar: command-line client for the marketplace API
#[derive(Parser, Debug)]
#[command(name = "bazaar")]
#[command(about = "Command-line client for the marketplace API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and persist the session
    Login(LoginArgs),
    /// Clear the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Browse product listings
    Browse(PageArgs),
    /// Search product listings
    Search(SearchArgs),
    /// Interactive typeahead: type partial queries, one per line
    Suggest,
    /// Show a news feed
    News(NewsArgs),
    /// List your transactions
    Transactions(TransactionsArgs),
    /// Mark a product as sold to a buyer
    MarkSold(MarkSoldArgs),
    /// Confirm a pending transaction as the counterparty
    Confirm(TransactionIdArg),
    /// Cancel a pending transaction
    Cancel(TransactionIdArg),
    /// Review a confirmed transaction
    Review(ReviewArgs),
    /// List reviews about a user
    Reviews(ReviewsArgs),
    /// Show aggregate review stats for a user
    Stats(StatsArgs),
    /// Mark (or unmark) a review as helpful
    Helpful(HelpfulArgs),
    /// Post your one-shot response to a review about you
    Respond(RespondArgs),
    /// Add a product to the cart
    AddToCart(AddToCartArgs),
    /// Show the cart
    Cart,
    /// Check out the cart
    Checkout(CheckoutArgs),
}

#[derive(Parser, Debug)]
struct LoginArgs {
    email: String,
    password: String,
}

#[derive(Parser, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Parser, Debug)]
struct SearchArgs {
    query: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Parser, Debug)]
struct NewsArgs {
    /// Category: world, regional, sports, or entertainment
    category: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Parser, Debug)]
struct TransactionsArgs {
    /// Show confirmed transactions instead of pending ones
    #[arg(long)]
    confirmed: bool,
}

#[derive(Parser, Debug)]
struct MarkSoldArgs {
    product_id: String,

    /// Product title, shown in the flow output
    #[arg(long, default_value = "")]
    title: String,

    /// Buyer to sell to; must be one of the candidate buyers
    #[arg(long)]
    buyer: String,

    /// Agreed price
    #[arg(long)]
    price: Option<f64>,

    /// Meeting method: in_person, shipping, pickup, or other
    #[arg(long)]
    meeting: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Parser, Debug)]
struct TransactionIdArg {
    transaction_id: String,
}

#[derive(Parser, Debug)]
struct ReviewArgs {
    transaction_id: String,

    /// Overall rating, 1-5
    rating: u8,

    /// Which role is under review: seller or buyer
    #[arg(long, default_value = "seller")]
    review_type: String,

    /// Communication sub-rating, 1-5
    #[arg(long)]
    communication: Option<u8>,

    /// Reliability sub-rating, 1-5
    #[arg(long)]
    reliability: Option<u8>,

    /// Item-as-described sub-rating, 1-5
    #[arg(long)]
    item_as_described: Option<u8>,

    /// Free-text review body
    #[arg(long)]
    text: Option<String>,
}

#[derive(Parser, Debug)]
struct ReviewsArgs {
    user_id: String,
    /// Filter by role under review: seller or buyer
    #[arg(long)]
    review_type: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    user_id: String,
}

#[derive(Parser, Debug)]
struct HelpfulArgs {
    review_id: String,
    /// Remove your helpful mark instead of adding one
    #[arg(long)]
    remove: bool,
}

#[derive(Parser, Debug)]
struct RespondArgs {
    review_id: String,
    text: String,
}

#[derive(Parser, Debug)]
struct AddToCartArgs {
    product_id: String,
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Parser, Debug)]
struct CheckoutArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    phone: Option<String>,

    /// Shipping option id; listed options are printed if it is unknown
    #[arg(long)]
    shipping: String,

    /// Payment method: card, paypal, or cash_on_delivery
    #[arg(long, default_value = "card")]
    payment: String,
}

/// Build the shared HTTP handle, restoring any persisted session.
async fn connect(config: &Config) -> Result<Http> {
    let repository = SqliteSessionRepository::new(config.session_db_path())
        .context("Failed to open session database")?;
    let session = SessionHandle::new(Arc::new(repository));
    session
        .restore()
        .await
        .context("Failed to restore session")?;
    Ok(Http::new(
        config.api_base_url.clone(),
        session,
        config.request_timeout,
    ))
}

fn interpreter(http: &Http) -> InterpreterContext {
    InterpreterContext {
        transactions: TransactionClient::new(http.clone()),
        reviews: ReviewClient::new(http.clone()),
        cart: CartClient::new(http.clone()),
        orders: OrderClient::new(http.clone()),
        completions: None,
    }
}

fn parse_rating(value: u8) -> Result<Rating> {
    Rating::new(value).map_err(|e| anyhow!("{}", e))
}

fn parse_sub_ratings(args: &ReviewArgs) -> Result<SubRatings> {
    let parse = |v: Option<u8>| v.map(parse_rating).transpose();
    Ok(SubRatings {
        communication_rating: parse(args.communication)?,
        reliability_rating: parse(args.reliability)?,
        item_as_described_rating: parse(args.item_as_described)?,
    })
}

async fn run_login(http: &Http, args: LoginArgs) -> Result<()> {
    let user = AuthClient::new(http.clone())
        .login(&args.email, &args.password)
        .await
        .map_err(|e| anyhow!(e.surface("log in")))?;
    println!("Logged in as {} ({})", user.username, user.id);
    Ok(())
}

async fn run_browse(http: &Http, args: PageArgs) -> Result<()> {
    let page = ProductClient::new(http.clone())
        .browse(args.page, args.limit)
        .await
        .map_err(|e| anyhow!(e.surface("browse listings")))?;
    for product in &page.products {
        let sold = if product.sold { " [sold]" } else { "" };
        println!("{}  {:8.2}  {}{}", product.id, product.price, product.title, sold);
    }
    println!(
        "Page {}/{} ({} listings)",
        page.pagination.page, page.pagination.total_pages, page.pagination.total
    );
    Ok(())
}

async fn run_search(http: &Http, args: SearchArgs) -> Result<()> {
    let results = SearchClient::new(http.clone())
        .products(&args.query, args.page, args.limit)
        .await
        .map_err(|e| anyhow!(e.surface("search listings")))?;
    for product in &results.products {
        println!("{}  {:8.2}  {}", product.id, product.price, product.title);
    }
    println!(
        "Page {}/{} ({} matches)",
        results.pagination.page, results.pagination.total_pages, results.pagination.total
    );
    Ok(())
}

/// Reads partial queries from stdin, one per line, feeding each into the
/// debounced typeahead and printing the settled suggestions.
async fn run_suggest(http: &Http, config: &Config) -> Result<()> {
    let source = Arc::new(SearchClient::new(http.clone()));
    let typeahead = Typeahead::new(source, config.debounce);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let handle = typeahead.on_input(line);
        // Wait for this window to resolve before prompting again.
        let _ = handle.await;
        let snapshot = typeahead.snapshot().await;
        if let Some(error) = &snapshot.error {
            println!("[{}] error: {}", snapshot.query, error);
        } else {
            println!("[{}] {}", snapshot.query, snapshot.suggestions.join(", "));
        }
    }
    Ok(())
}

async fn run_news(http: &Http, args: NewsArgs) -> Result<()> {
    let category = NewsCategory::parse(&args.category)
        .ok_or_else(|| anyhow!("Unknown news category: {}", args.category))?;
    let feed = NewsClient::new(http.clone())
        .feed(category, args.page, args.limit)
        .await
        .map_err(|e| anyhow!(e.surface("load the news feed")))?;
    for article in &feed.articles {
        println!("{}  {}", article.published_at, article.title);
    }
    println!(
        "Page {}/{} ({} articles)",
        feed.pagination.page, feed.pagination.total_pages, feed.pagination.total
    );
    Ok(())
}

async fn run_transactions(http: &Http, args: TransactionsArgs) -> Result<()> {
    let client = TransactionClient::new(http.clone());
    let transactions = if args.confirmed {
        client.list_confirmed().await
    } else {
        client.list_pending().await
    }
    .map_err(|e| anyhow!(e.surface("list transactions")))?;

    for t in &transactions {
        println!(
            "{}  {}  seller={}  buyer={}  seller_confirmed={}  buyer_confirmed={}",
            t.id, t.status, t.seller_id, t.buyer_id, t.seller_confirmed, t.buyer_confirmed
        );
    }
    println!("{} transactions", transactions.len());
    Ok(())
}

async fn run_mark_sold(http: &Http, args: MarkSoldArgs) -> Result<()> {
    let meeting_method = args
        .meeting
        .as_deref()
        .map(|s| MeetingMethod::parse(s).ok_or_else(|| anyhow!("Unknown meeting method: {}", s)))
        .transpose()?;

    let ctx = interpreter(http);
    let state = SaleFlowState::open(ProductId::from(args.product_id.as_str()), args.title);
    let state = pump(&ctx, state, FlowEvent::SaleOpened, transition::sale::transition).await;

    if state.has_no_candidates() {
        if let Some(error) = state.error() {
            return Err(anyhow!(error.to_string()));
        }
        return Err(anyhow!(
            "No candidate buyers; only users who contacted you about this product can be selected"
        ));
    }

    let state = pump(
        &ctx,
        state,
        FlowEvent::BuyerSelected {
            buyer_id: UserId::from(args.buyer.as_str()),
        },
        transition::sale::transition,
    )
    .await;
    let state = pump(
        &ctx,
        state,
        FlowEvent::TermsUpdated {
            terms: SaleTerms {
                agreed_price: args.price,
                meeting_method,
                notes: args.notes,
            },
        },
        transition::sale::transition,
    )
    .await;

    if !state.submission_enabled() {
        return Err(anyhow!("Buyer {} is not a candidate for this product", args.buyer));
    }

    let state = pump(&ctx, state, FlowEvent::SaleSubmitted, transition::sale::transition).await;
    match state {
        SaleFlowState::Completed { transaction } => {
            println!(
                "Recorded sale {} (pending until the buyer confirms)",
                transaction.id
            );
            Ok(())
        }
        other => Err(anyhow!(
            "Sale was not recorded: {}",
            other.error().unwrap_or("unknown error")
        )),
    }
}

async fn run_confirm(http: &Http, args: TransactionIdArg) -> Result<()> {
    let transaction = TransactionClient::new(http.clone())
        .confirm(&TransactionId::from(args.transaction_id.as_str()))
        .await
        .map_err(|e| anyhow!(e.surface("confirm the transaction")))?;
    println!("Transaction {} is now {}", transaction.id, transaction.status);
    if transaction.reviews_eligible() {
        println!("Both sides confirmed; reviews are unlocked");
    }
    Ok(())
}

async fn run_cancel(http: &Http, args: TransactionIdArg) -> Result<()> {
    let transaction = TransactionClient::new(http.clone())
        .cancel(&TransactionId::from(args.transaction_id.as_str()))
        .await
        .map_err(|e| anyhow!(e.surface("cancel the transaction")))?;
    println!("Transaction {} is now {}", transaction.id, transaction.status);
    Ok(())
}

async fn run_review(http: &Http, args: ReviewArgs) -> Result<()> {
    let review_type = ReviewType::parse(&args.review_type)
        .ok_or_else(|| anyhow!("Unknown review type: {}", args.review_type))?;
    let rating = parse_rating(args.rating)?;
    let sub_ratings = parse_sub_ratings(&args)?;

    let transaction_id = TransactionId::from(args.transaction_id.as_str());

    // Reviews unlock only once both sides have confirmed; do not open the
    // form for anything else.
    TransactionClient::new(http.clone())
        .find_confirmed(&transaction_id)
        .await
        .map_err(|e| anyhow!(e.surface("look up the transaction")))?
        .filter(Transaction::reviews_eligible)
        .ok_or_else(|| {
            anyhow!(
                "Transaction {} is not confirmed; reviews unlock after both sides confirm",
                transaction_id
            )
        })?;

    let ctx = interpreter(http);
    let state = ReviewFlowState::open(transaction_id, review_type);
    let state = pump(
        &ctx,
        state,
        FlowEvent::RatingSet { rating },
        transition::review::transition,
    )
    .await;
    let state = pump(
        &ctx,
        state,
        FlowEvent::SubRatingsSet { sub_ratings },
        transition::review::transition,
    )
    .await;
    let state = pump(
        &ctx,
        state,
        FlowEvent::ReviewTextSet { text: args.text },
        transition::review::transition,
    )
    .await;
    let state = pump(
        &ctx,
        state,
        FlowEvent::ReviewSubmitted,
        transition::review::transition,
    )
    .await;

    match state {
        ReviewFlowState::Completed { review } => {
            println!("Posted review {}", review.id);
            Ok(())
        }
        other => Err(anyhow!(
            "Review was not posted: {}",
            other.error().unwrap_or("unknown error")
        )),
    }
}

async fn run_reviews(http: &Http, args: ReviewsArgs) -> Result<()> {
    let review_type = args
        .review_type
        .as_deref()
        .map(|s| ReviewType::parse(s).ok_or_else(|| anyhow!("Unknown review type: {}", s)))
        .transpose()?;
    let page = ReviewClient::new(http.clone())
        .user_reviews(
            &UserId::from(args.user_id.as_str()),
            review_type,
            args.page,
            args.limit,
        )
        .await
        .map_err(|e| anyhow!(e.surface("list reviews")))?;

    for review in &page.reviews {
        let stars = review.rating.value();
        let text = review.review_text.as_deref().unwrap_or("");
        println!(
            "{}  {}*  as {}  helpful={}  {}",
            review.id,
            stars,
            review.review_type.as_str(),
            review.helpful_count,
            text
        );
        if let Some(response) = &review.response_text {
            println!("    response: {}", response);
        }
    }
    println!(
        "Page {}/{} ({} reviews)",
        page.pagination.page, page.pagination.total_pages, page.pagination.total
    );
    Ok(())
}

async fn run_stats(http: &Http, args: StatsArgs) -> Result<()> {
    let stats = ReviewClient::new(http.clone())
        .user_review_stats(&UserId::from(args.user_id.as_str()))
        .await
        .map_err(|e| anyhow!(e.surface("load review stats")))?;

    println!(
        "{}: {:.2} average over {} reviews",
        stats.user_id, stats.overall_average, stats.total_reviews
    );
    println!(
        "  as seller: {:.2} over {} ({} confirmed sales)",
        stats.as_seller.average_rating, stats.as_seller.review_count, stats.confirmed_sales
    );
    println!(
        "  as buyer:  {:.2} over {} ({} confirmed purchases)",
        stats.as_buyer.average_rating, stats.as_buyer.review_count, stats.confirmed_purchases
    );
    for value in 1..=5u8 {
        let rating = Rating::new(value).map_err(|e| anyhow!("{}", e))?;
        println!("  {}*: {}", value, stats.histogram.count_for(rating));
    }
    println!("  calculated at {}", stats.last_calculated_at);
    Ok(())
}

async fn run_helpful(http: &Http, args: HelpfulArgs) -> Result<()> {
    let client = ReviewClient::new(http.clone());
    let review_id = ReviewId::from(args.review_id.as_str());
    if args.remove {
        client
            .remove_helpful(&review_id)
            .await
            .map_err(|e| anyhow!(e.surface("remove the helpful mark")))?;
        println!("Removed helpful mark from {}", review_id);
    } else {
        client
            .mark_helpful(&review_id)
            .await
            .map_err(|e| anyhow!(e.surface("mark the review helpful")))?;
        println!("Marked {} helpful", review_id);
    }
    Ok(())
}

async fn run_respond(http: &Http, args: RespondArgs) -> Result<()> {
    let review = ReviewClient::new(http.clone())
        .respond(&ReviewId::from(args.review_id.as_str()), &args.text)
        .await
        .map_err(|e| anyhow!(e.surface("respond to the review")))?;
    println!("Responded to review {}", review.id);
    Ok(())
}

async fn run_add_to_cart(http: &Http, args: AddToCartArgs) -> Result<()> {
    let cart = CartClient::new(http.clone())
        .add_item(&ProductId::from(args.product_id.as_str()), args.quantity)
        .await
        .map_err(|e| anyhow!(e.surface("add to the cart")))?;
    println!("Cart now holds {} items", cart.item_count());
    Ok(())
}

async fn run_cart(http: &Http) -> Result<()> {
    let cart = CartClient::new(http.clone())
        .get()
        .await
        .map_err(|e| anyhow!(e.surface("load the cart")))?;
    for item in &cart.items {
        println!(
            "{}  {:8.2}  x{}  {}",
            item.product_id, item.price, item.quantity, item.title
        );
    }
    println!("{} items, subtotal {:.2}", cart.item_count(), cart.subtotal());
    Ok(())
}

async fn run_checkout(http: &Http, args: CheckoutArgs) -> Result<()> {
    let payment = PaymentMethod::parse(&args.payment)
        .ok_or_else(|| anyhow!("Unknown payment method: {}", args.payment))?;
    let address = ShippingAddress {
        full_name: args.full_name,
        street: args.street,
        city: args.city,
        postal_code: args.postal_code,
        country: args.country,
        phone: args.phone,
    };

    let ctx = interpreter(http);
    let mut state = CheckoutFlowState::open();
    for event in [
        FlowEvent::CheckoutOpened,
        FlowEvent::CartConfirmed,
        FlowEvent::AddressEntered { address },
        FlowEvent::ShippingSelected {
            option_id: args.shipping.clone(),
        },
        FlowEvent::PaymentSelected { method: payment },
        FlowEvent::OrderReviewed,
    ] {
        state = pump(&ctx, state, event, transition::checkout::transition).await;
        if let Some(error) = state.error() {
            if let CheckoutFlowState::ShippingSelection { options, .. } = &state {
                for option in options {
                    println!("{}  {:8.2}  {}", option.id, option.price, option.label);
                }
            }
            return Err(anyhow!(error.to_string()));
        }
    }

    match state {
        CheckoutFlowState::Confirmed { order } => {
            println!("Order confirmed: {}", order.order_number);
            println!("{} items, total {:.2}", order.items.len(), order.total);
            Ok(())
        }
        CheckoutFlowState::PaymentSelection { .. } | CheckoutFlowState::ShippingSelection { .. } => {
            Err(anyhow!("Unknown shipping option: {}", args.shipping))
        }
        _ => Err(anyhow!("Checkout did not complete")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::WARN).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let http = connect(&config).await?;

    match cli.command {
        Commands::Login(args) => run_login(&http, args).await,
        Commands::Logout => {
            AuthClient::new(http.clone())
                .logout()
                .await
                .map_err(|e| anyhow!("{}", e))?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let user = AuthClient::new(http.clone())
                .current_user()
                .await
                .map_err(|e| anyhow!(e.surface("look up the current user")))?;
            println!("{} ({}, {})", user.username, user.id, user.email);
            Ok(())
        }
        Commands::Browse(args) => run_browse(&http, args).await,
        Commands::Search(args) => run_search(&http, args).await,
        Commands::Suggest => run_suggest(&http, &config).await,
        Commands::News(args) => run_news(&http, args).await,
        Commands::Transactions(args) => run_transactions(&http, args).await,
        Commands::MarkSold(args) => run_mark_sold(&http, args).await,
        Commands::Confirm(args) => run_confirm(&http, args).await,
        Commands::Cancel(args) => run_cancel(&http, args).await,
        Commands::Review(args) => run_review(&http, args).await,
        Commands::Reviews(args) => run_reviews(&http, args).await,
        Commands::Stats(args) => run_stats(&http, args).await,
        Commands::Helpful(args) => run_helpful(&http, args).await,
        Commands::Respond(args) => run_respond(&http, args).await,
        Commands::AddToCart(args) => run_add_to_cart(&http, args).await,
        Commands::Cart => run_cart(&http).await,
        Commands::Checkout(args) => run_checkout(&http, args).await,
    }
}
