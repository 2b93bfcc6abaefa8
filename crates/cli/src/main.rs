//! Cue Shop CLI - the storefront and admin panel in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from CUE_SHOP_PASSWORD or --password)
//! cue-shop login hoa
//!
//! # Browse and buy
//! cue-shop products list --query "cơ" --sort price-low
//! cue-shop cart add 12 --quantity 2
//! cue-shop checkout --payment cod
//!
//! # Admin panel
//! cue-shop admin orders list --status pending --since week
//! ```
//!
//! Session token, cart and wishlist persist under `CUE_SHOP_DATA_DIR`
//! between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cue_shop_admin::{DateWindow, OrderFilter};
use cue_shop_core::{CategoryId, OrderId, OrderStatus, PaymentMethod, Price, ProductId, SupplierForm, SupplierId};
use cue_shop_storefront::api::{ContactMessage, RegisterRequest};
use cue_shop_storefront::catalog::{CatalogQuery, MAX_PRICE_DONG, SortOrder};
use cue_shop_storefront::config::StorefrontConfig;
use cue_shop_storefront::state::AppState;

mod commands;
mod output;

use commands::CliError;
use commands::account::ProfileChanges;
use commands::admin::ProductArgs;
use commands::orders::CheckoutArgs;

#[derive(Parser)]
#[command(name = "cue-shop")]
#[command(author, version, about = "Cue Shop billiards store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        username: String,
        #[arg(long, env = "CUE_SHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Create an account
    Register(RegisterArgs),
    /// Show the signed-in user
    Whoami,
    /// View or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Home page sections
    Home,
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Order everything in the cart
    Checkout {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// cod, bank-transfer or paypal
        #[arg(long)]
        payment: Option<PaymentMethod>,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Saved products
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Send a message to the shop
    Contact(ContactArgs),
    /// Admin panel
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long, env = "CUE_SHOP_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
}

#[derive(Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    List {
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Minimum price in đồng
        #[arg(long, default_value_t = 0)]
        min_price: i64,
        /// Maximum price in đồng
        #[arg(long, default_value_t = MAX_PRICE_DONG)]
        max_price: i64,
        /// default, price-low, price-high, name-asc or name-desc
        #[arg(long, default_value = "default")]
        sort: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Show {
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    Show,
    Add {
        id: ProductId,
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },
    Remove {
        id: ProductId,
    },
    /// Set a line's quantity; 0 removes it
    Update {
        id: ProductId,
        quantity: u32,
    },
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    List,
    Show { id: OrderId },
    Cancel { id: OrderId },
}

#[derive(Subcommand)]
enum WishlistAction {
    Show,
    Add { id: ProductId },
    Remove { id: ProductId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Dashboard counters and recent orders
    Stats,
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
    Suppliers {
        #[command(subcommand)]
        action: AdminSuppliersAction,
    },
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
}

#[derive(Args)]
struct ProductFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Price in đồng
    #[arg(long)]
    price: Option<i64>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    supplier: Option<SupplierId>,
    #[arg(long)]
    category: Option<CategoryId>,
    #[arg(long)]
    image_url: Option<String>,
}

impl From<ProductFields> for ProductArgs {
    fn from(f: ProductFields) -> Self {
        Self {
            name: f.name,
            description: f.description,
            price: f.price,
            stock: f.stock,
            supplier: f.supplier,
            category: f.category,
            image_url: f.image_url,
        }
    }
}

#[derive(Subcommand)]
enum AdminProductsAction {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
    },
    Create(ProductFields),
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum AdminSuppliersAction {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        contact_info: String,
    },
    Update {
        id: SupplierId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        contact_info: Option<String>,
    },
    Delete {
        id: SupplierId,
    },
}

#[derive(Subcommand)]
enum AdminOrdersAction {
    List {
        /// Order id, customer name or username
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        status: Option<OrderStatus>,
        /// all, today, week or month
        #[arg(long, default_value = "all")]
        since: DateWindow,
    },
    Show {
        id: OrderId,
    },
    Status {
        id: OrderId,
        status: OrderStatus,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Quiet by default; notifications are printed, not logged
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cue_shop=warn,cue_shop_storefront=warn,cue_shop_admin=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = AppState::new(config, Arc::new(output::ConsoleNotifier))
        .expect("Failed to initialize application state");

    // A restored token is only trusted once the profile fetch confirms it
    state.session().settled().await;

    if let Err(e) = run(&state, cli.command).await {
        e.report();
        output::line(&format!("✗ {}", e.user_message()));
        std::process::exit(1);
    }
}

async fn run(state: &AppState, command: Commands) -> Result<(), CliError> {
    use commands::{account, admin, orders, shop};

    match command {
        Commands::Login { username, password } => account::login(state, &username, password).await?,
        Commands::Logout => account::logout(state),
        Commands::Register(args) => {
            let request = RegisterRequest {
                full_name: args.full_name,
                email: args.email,
                username: args.username,
                password: args.password.into(),
                phone_number: args.phone,
                address: args.address,
            };
            account::register(state, request).await?;
        }
        Commands::Whoami => account::whoami(state),
        Commands::Profile { action } => match action {
            ProfileAction::Show => account::show_profile(state)?,
            ProfileAction::Update {
                full_name,
                email,
                phone,
                address,
            } => {
                let changes = ProfileChanges {
                    full_name,
                    email,
                    phone_number: phone,
                    address,
                };
                account::update_profile(state, changes).await?;
            }
        },
        Commands::Home => shop::home(state).await?,
        Commands::Products { action } => match action {
            ProductsAction::List {
                query,
                category,
                min_price,
                max_price,
                sort,
                page,
            } => {
                if min_price > max_price {
                    return Err(CliError::InvalidArgument(
                        "Giá tối thiểu phải nhỏ hơn giá tối đa".to_string(),
                    ));
                }
                let query = CatalogQuery {
                    search: query,
                    category,
                    min_price: Price::from_dong(min_price),
                    max_price: Price::from_dong(max_price),
                    sort,
                    page,
                };
                shop::list_products(state, &query).await?;
            }
            ProductsAction::Show { id } => shop::show_product(state, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => shop::show_cart(state)?,
            CartAction::Add { id, quantity } => shop::add_to_cart(state, id, quantity).await?,
            CartAction::Remove { id } => shop::remove_from_cart(state, id)?,
            CartAction::Update { id, quantity } => shop::update_cart(state, id, quantity)?,
            CartAction::Clear => shop::clear_cart(state)?,
        },
        Commands::Checkout {
            address,
            phone,
            payment,
        } => {
            let args = CheckoutArgs {
                address,
                phone,
                payment,
            };
            orders::checkout(state, args).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => orders::list(state).await?,
            OrdersAction::Show { id } => orders::show(state, id).await?,
            OrdersAction::Cancel { id } => orders::cancel(state, id).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => shop::show_wishlist(state).await?,
            WishlistAction::Add { id } => shop::add_to_wishlist(state, id).await?,
            WishlistAction::Remove { id } => shop::remove_from_wishlist(state, id)?,
        },
        Commands::Contact(args) => {
            let message = ContactMessage {
                name: args.name,
                email: args.email,
                phone: args.phone,
                subject: args.subject,
                message: args.message,
            };
            account::contact(state, message).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Stats => admin::stats(state).await?,
            AdminAction::Products { action } => match action {
                AdminProductsAction::List { search, category } => {
                    admin::list_products(state, &search, category.as_deref()).await?;
                }
                AdminProductsAction::Create(fields) => admin::create_product(state, fields.into()).await?,
                AdminProductsAction::Update { id, fields } => {
                    admin::update_product(state, id, fields.into()).await?;
                }
                AdminProductsAction::Delete { id } => admin::delete_product(state, id).await?,
            },
            AdminAction::Suppliers { action } => match action {
                AdminSuppliersAction::List => admin::list_suppliers(state).await?,
                AdminSuppliersAction::Create { name, contact_info } => {
                    admin::create_supplier(state, SupplierForm { name, contact_info }).await?;
                }
                AdminSuppliersAction::Update {
                    id,
                    name,
                    contact_info,
                } => admin::update_supplier(state, id, name, contact_info).await?,
                AdminSuppliersAction::Delete { id } => admin::delete_supplier(state, id).await?,
            },
            AdminAction::Orders { action } => match action {
                AdminOrdersAction::List {
                    search,
                    status,
                    since,
                } => {
                    let filter = OrderFilter {
                        search,
                        status,
                        window: since,
                    };
                    admin::list_orders(state, &filter).await?;
                }
                AdminOrdersAction::Show { id } => admin::show_order(state, id).await?,
                AdminOrdersAction::Status { id, status } => {
                    admin::set_order_status(state, id, status).await?;
                }
            },
        },
    }
    Ok(())
}
