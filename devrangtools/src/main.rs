use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;

mod formatting;
mod identity;
mod seed;
mod similar;
mod webhook;

use crate::{
    identity::print_identity_token,
    seed::seed_database,
    similar::print_similar_products,
    webhook::print_webhook_signature,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/devrang.db";

#[derive(Parser, Debug)]
#[command(version, about = "Operator tools for the Devrang marketplace")]
pub struct Arguments {
    /// The database to operate on. Defaults to DRG_DATABASE_URL, or sqlite://data/devrang.db if that is not set.
    #[arg(short, long, env = "DRG_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "seed", about = "Add the products and customers in a seed file to the database")]
    Seed(SeedParams),
    #[clap(name = "sign-webhook", about = "Print the signature Razorpay would send with a webhook body")]
    SignWebhook(SignWebhookParams),
    #[clap(name = "identity-token", about = "Mint an identity assertion for POST /auth. For development only.")]
    IdentityToken(IdentityTokenParams),
    #[clap(name = "similar", about = "List the products closest to a product by embedding")]
    Similar(SimilarParams),
}

#[derive(Debug, Args)]
pub struct SeedParams {
    /// A JSON file with `products` and `customers` arrays
    #[arg(short = 'f', long = "file")]
    file: String,
    /// Recorded as the creator of every seeded customer
    #[arg(short = 'c', long = "created-by", default_value = "seed@devrang.in")]
    created_by: String,
}

#[derive(Debug, Args)]
pub struct SignWebhookParams {
    /// The webhook secret configured in the Razorpay dashboard
    #[arg(short = 's', long = "secret", env = "DRG_RAZORPAY_WEBHOOK_SECRET")]
    secret: String,
    /// The file holding the exact webhook body. It is signed byte for byte.
    #[arg(short = 'f', long = "file")]
    file: String,
}

#[derive(Debug, Args)]
pub struct IdentityTokenParams {
    /// The secret shared with the identity provider
    #[arg(short = 's', long = "secret", env = "DRG_IDENTITY_SECRET")]
    secret: String,
    #[arg(short = 'e', long = "email")]
    email: String,
    #[arg(short = 'n', long = "name", default_value = "")]
    name: String,
    /// How long the assertion is valid for
    #[arg(long = "hours", default_value = "1")]
    hours: i64,
}

#[derive(Debug, Args)]
pub struct SimilarParams {
    /// The product to compare against
    #[arg(short = 'p', long = "product")]
    product: i64,
    #[arg(short = 'l', long = "limit", default_value = "5")]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    match cli.command {
        Command::Seed(params) => seed_database(&cli.database, params).await,
        Command::SignWebhook(params) => print_webhook_signature(params),
        Command::IdentityToken(params) => print_identity_token(params),
        Command::Similar(params) => print_similar_products(&cli.database, params).await,
    }
}
