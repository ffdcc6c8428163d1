mod config;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use latipay::{CheckoutRequest, GatewayClient, LatipayError, ReqwestTransport};

use crate::config::CliConfig;

/// Talk to the Latipay gateway from the command line.
///
/// Credentials come from LATIPAY_API_KEY, LATIPAY_USER_ID and
/// LATIPAY_WALLET_ID (a `.env` file is honoured).
#[derive(Debug, Parser)]
#[command(name = "latipay", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the verified state of a transaction.
    Query {
        /// Merchant reference (order id)
        merchant_reference: String,
    },
    /// Print the signed status URL without sending it.
    QueryUrl { merchant_reference: String },
    /// Refund a settled order.
    Refund {
        order_id: String,
        refund_amount: String,
        #[arg(long)]
        reference: Option<String>,
    },
    /// Create a hosted checkout and print the redirect URL.
    Checkout {
        #[arg(long)]
        merchant_reference: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "alipay")]
        payment_method: String,
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,
        #[arg(long)]
        product_name: String,
        #[arg(long)]
        return_url: String,
        #[arg(long)]
        callback_url: Option<String>,
    },
    /// Resolve a callback body or return URL into verified state.
    Notify {
        /// Form-encoded body or return URL containing `token`
        payload: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(config = ?config, "loaded configuration");

    let transport = ReqwestTransport::new().with_timeout(config.timeout);
    let client =
        GatewayClient::new(config.credentials(), transport).with_endpoints(config.endpoints());

    match run(&client, cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            match &e {
                LatipayError::SignatureMismatch { .. } => {
                    tracing::error!(error = %e, "response failed signature verification")
                }
                _ => tracing::error!(error = %e, "request failed"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    client: &GatewayClient<ReqwestTransport>,
    command: Command,
) -> Result<String, LatipayError> {
    match command {
        Command::Query { merchant_reference } => {
            let state = client.query(&merchant_reference).await?;
            Ok(serde_json::to_string_pretty(&state)?)
        }
        Command::QueryUrl { merchant_reference } => {
            if merchant_reference.trim().is_empty() {
                return Err(LatipayError::InvalidInput("merchant reference is required"));
            }
            Ok(client.signed_query_url(&merchant_reference))
        }
        Command::Refund {
            order_id,
            refund_amount,
            reference,
        } => {
            client
                .refund(&order_id, &refund_amount, reference.as_deref())
                .await
        }
        Command::Checkout {
            merchant_reference,
            amount,
            payment_method,
            ip,
            product_name,
            return_url,
            callback_url,
        } => {
            let request = CheckoutRequest {
                merchant_reference,
                amount,
                payment_method,
                ip,
                product_name,
                return_url,
                callback_url,
            };
            client.checkout_url(&request).await
        }
        Command::Notify { payload } => {
            // Return URLs and raw form bodies share one parser.
            let notification = client.notifications().resolve_return(&payload).await?;
            Ok(serde_json::to_string_pretty(&serde_json::json!({
                "token": notification.token(),
                "complete": notification.complete(),
                "status": notification.status(),
                "gross": notification.gross(),
                "currency": notification.currency(),
                "transaction_id": notification.transaction_id(),
                "acknowledged": notification.acknowledge(),
            }))?)
        }
    }
}
