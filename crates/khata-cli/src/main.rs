//! Khata agent CLI: command-line client for the Khata backend.
//!
//! Set KHATA_API_KEY and KHATA_API_URL. The session record lives under
//! KHATA_DATA_DIR (default ".khata").

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use khata_cli::{format_currency, format_date, init_tracing};
use khata_client::{ApiClient, Gateway};
use khata_core::constants::DEFAULT_EXTENSION_DAYS;
use khata_core::models::filter_subscriptions;
use khata_session::{FileSessionStorage, SessionStore};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "khata", about = "Khata agent CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with phone number and PIN
    Login {
        phone: String,
        pin: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the currently logged-in agent
    Whoami,
    /// List subscribers with their subscription state
    Subscribers {
        /// Case-insensitive filter on name or email
        #[arg(long)]
        search: Option<String>,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List available plans
    Plans {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Record a payment and extend a subscriber's plan
    Extend {
        /// Subscriber user UUID
        user_id: Uuid,
        /// Plan UUID; amount and days come from the catalog
        #[arg(long)]
        plan: Option<Uuid>,
        /// Payment amount in whole currency units
        #[arg(long)]
        amount: Option<i64>,
        /// Days to extend (default 30)
        #[arg(long)]
        days: Option<i32>,
    },
    /// Payment history for a subscriber
    Payments {
        /// Subscriber user UUID
        user_id: Uuid,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let api = ApiClient::from_env()
        .context("Failed to create API client. Set KHATA_API_KEY and KHATA_API_URL")?;

    let data_dir = std::env::var("KHATA_DATA_DIR").unwrap_or_else(|_| ".khata".to_string());
    let storage = Arc::new(FileSessionStorage::new(data_dir).await?);
    let session = Arc::new(SessionStore::new(storage, Arc::new(api.clone())));
    session.restore_session().await;

    let gateway = Gateway::new(api, session.clone());

    match cli.command {
        Commands::Login { phone, pin } => match session.login(&phone, &pin).await {
            Some(agent) => println!("Logged in as {} ({})", agent.name, agent.phone),
            None => anyhow::bail!("Login failed: wrong phone number or PIN"),
        },
        Commands::Logout => {
            session.logout().await;
            println!("Logged out");
        }
        Commands::Whoami => match session.current_agent() {
            Some(agent) => {
                println!("{} ({})", agent.name, agent.phone);
                if !agent.is_active {
                    println!("warning: agent account is inactive");
                }
            }
            None => println!("Not logged in"),
        },
        Commands::Subscribers { search, json } => {
            let subscriptions = gateway.fetch_subscriptions().await;
            let query = search.unwrap_or_default();
            let filtered = filter_subscriptions(&subscriptions, &query);

            if json {
                print_json(&filtered)?;
            } else {
                let now = chrono::Utc::now();
                for sub in &filtered {
                    let days = match sub.days_remaining(now) {
                        Some(days) if days >= 0 => format!("{} days left", days),
                        Some(days) => format!("expired {} days ago", -days),
                        None => "-".to_string(),
                    };
                    println!(
                        "{}  {:<12}  {:<30}  {}",
                        sub.user_id,
                        sub.effective_status().label(),
                        sub.user_name.as_deref().unwrap_or(&sub.email),
                        days,
                    );
                }
                println!("{} subscribers", filtered.len());
            }
        }
        Commands::Plans { json } => {
            let plans = gateway.fetch_plans().await;

            if json {
                print_json(&plans)?;
            } else {
                for plan in &plans {
                    println!(
                        "{}  {:<20}  {:>10}  {} days",
                        plan.id,
                        plan.display_name(),
                        format_currency(plan.price),
                        plan.duration_days,
                    );
                }
            }
        }
        Commands::Extend {
            user_id,
            plan,
            amount,
            days,
        } => {
            let (amount, days) = match (plan, amount, days) {
                (Some(plan_id), None, None) => {
                    let plans = gateway.fetch_plans().await;
                    let plan = plans
                        .iter()
                        .find(|p| p.id == plan_id)
                        .context("Plan not found in the active catalog")?;
                    (plan.price, plan.duration_days)
                }
                (None, Some(amount), days) => {
                    (amount, days.unwrap_or(DEFAULT_EXTENSION_DAYS))
                }
                _ => anyhow::bail!("Pass either --plan or --amount (with optional --days)"),
            };

            if gateway.extend_subscription(user_id, amount, days).await {
                println!(
                    "Recorded {} and extended {} days",
                    format_currency(amount),
                    days
                );
            } else {
                anyhow::bail!("Payment could not be recorded");
            }
        }
        Commands::Payments { user_id, json } => {
            let payments = gateway.fetch_payment_history(user_id).await;

            if json {
                print_json(&payments)?;
            } else {
                for payment in &payments {
                    println!(
                        "{}  {:>10}  {:<8}  {}",
                        format_date(payment.payment_date),
                        format_currency(payment.amount),
                        payment.payment_method.as_deref().unwrap_or("-"),
                        payment.collected_by_name.as_deref().unwrap_or("-"),
                    );
                }
                println!("{} payments", payments.len());
            }
        }
    }

    Ok(())
}
