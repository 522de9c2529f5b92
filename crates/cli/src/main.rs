//! Online Shop CLI - operator tooling and a terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shop-cli migrate
//!
//! # Create or promote administrators
//! shop-cli admin create -e admin@example.ru -n "Admin Name" -p 'long password'
//! shop-cli admin promote -e user@example.ru
//!
//! # Load the catalog
//! shop-cli seed products -f products.yaml
//!
//! # Shop from the terminal
//! shop-cli cart add 3 -q 2
//! shop-cli checkout --full-name "Анна Смирнова" --phone "+7 912 345-67-89" --address "пр. Мира, 10"
//!
//! # Back office
//! shop-cli orders list
//! shop-cli orders pay 12
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SHOP_CART_DIR` - Directory holding the terminal cart (default `.shop-cart`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

use online_shop_core::checkout::ShippingForm;
use online_shop_core::{OrderId, ProductId};

mod cart_file;
mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Online shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Edit the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the local cart as an order
    Checkout(CheckoutArgs),
    /// Inspect and update orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long, env = "SHOP_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Grant admin to an existing account
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long, default_value = "products.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product from the catalog
    Add {
        product_id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { product_id: ProductId },
    /// Print the cart
    Show,
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Attach the order to this account instead of checking out as a guest
    #[arg(long)]
    user_email: Option<String>,
}

impl CheckoutArgs {
    fn into_parts(self) -> (ShippingForm, Option<String>) {
        let form = ShippingForm {
            full_name: self.full_name,
            phone: self.phone,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
        };
        (form, self.user_email)
    }
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List {
        /// Only orders owned by this account
        #[arg(long)]
        user_email: Option<String>,
    },
    /// Show one order
    Show { id: OrderId },
    /// Mark an order paid
    Pay { id: OrderId },
    /// Mark an order delivered
    Deliver { id: OrderId },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sqlx=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => commands::admin::create_user(&email, &name, &password).await?,
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(product_id, quantity).await?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(product_id, quantity),
            CartAction::Remove { product_id } => commands::cart::remove(product_id),
            CartAction::Show => commands::cart::show(),
            CartAction::Clear => commands::cart::clear(),
        },
        Commands::Checkout(args) => {
            let (form, user_email) = args.into_parts();
            commands::checkout::run(form, user_email).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List { user_email } => commands::orders::list(user_email).await?,
            OrdersAction::Show { id } => commands::orders::show(id).await?,
            OrdersAction::Pay { id } => commands::orders::pay(id).await?,
            OrdersAction::Deliver { id } => commands::orders::deliver(id).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_set_negative() {
        let cli = Cli::try_parse_from(["shop-cli", "cart", "set", "4", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Set { quantity: -1, .. }
            }
        ));
    }

    #[test]
    fn test_parse_checkout_optional_fields() {
        let cli = Cli::try_parse_from([
            "shop-cli",
            "checkout",
            "--full-name",
            "Анна",
            "--phone",
            "+7 912",
            "--address",
            "пр. Мира, 10",
            "--city",
            "Казань",
        ])
        .unwrap();
        let Commands::Checkout(args) = cli.command else {
            panic!("expected checkout");
        };
        let (form, user_email) = args.into_parts();
        assert_eq!(form.city.as_deref(), Some("Казань"));
        assert!(form.country.is_none());
        assert!(user_email.is_none());
    }
}
