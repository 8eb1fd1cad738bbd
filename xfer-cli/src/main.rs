//! xfer - command-line client for the inventory transfer service

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xfer_cli::{format_product_line, format_transfer_summary, submit_draft, ItemSpec, TransferClient, TransferDraft};
use xfer_common::units::{bottles_per_case, calculate_bottles, calculate_cases};

#[derive(Parser, Debug)]
#[command(name = "xfer")]
#[command(about = "Inventory transfer requests from the command line")]
#[command(version)]
struct Cli {
    /// Transfer service base URL
    #[arg(long, default_value = "http://127.0.0.1:3030", env = "XFER_SERVER")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every product variant
    Products,

    /// Search the catalog the way the form does
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Convert between bottles and 9L cases
    Convert(ConvertArgs),

    /// Submit a transfer request
    Submit {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// <sku-or-query>=<bottles>[/<cases>], repeatable
        #[arg(long = "item", required = true)]
        items: Vec<ItemSpec>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        authorized_by: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct ConvertArgs {
    /// Bottle size in ml
    #[arg(long)]
    volume: u32,

    #[arg(long, required_unless_present = "cases", conflicts_with = "cases")]
    bottles: Option<f64>,

    #[arg(long)]
    cases: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xfer=warn,xfer_cli=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(
        "xfer v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => convert(&args),
        command => {
            let client = TransferClient::new(&cli.server).context("Failed to create HTTP client")?;
            run_remote(&client, command).await
        }
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    if args.volume == 0 {
        bail!("--volume must be greater than zero");
    }
    let per_case = bottles_per_case(args.volume)
        .map(|n| format!("{} bottles/case", n))
        .unwrap_or_else(|| format!("{} ml per 9L case", args.volume));

    match (args.bottles, args.cases) {
        (Some(bottles), _) => {
            println!("{} bottles = {} cases ({})", bottles, calculate_cases(bottles, args.volume), per_case);
        }
        (None, Some(cases)) => {
            println!("{} cases = {} bottles ({})", cases, calculate_bottles(cases, args.volume), per_case);
        }
        (None, None) => bail!("one of --bottles or --cases is required"),
    }
    Ok(())
}

async fn run_remote(client: &TransferClient, command: Command) -> Result<()> {
    match command {
        Command::Products => {
            let products = client.list_products().await.context("Failed to fetch products")?;
            for product in &products {
                println!("{}", format_product_line(product));
            }
        }
        Command::Search { query } => {
            let query = query.join(" ");
            let results = client.search(&query).await.context("Search failed")?;
            if results.is_empty() {
                println!("No products found");
            }
            for product in &results {
                println!("{}", format_product_line(product));
            }
        }
        Command::Submit {
            from,
            to,
            items,
            notes,
            authorized_by,
        } => {
            let draft = TransferDraft {
                from,
                to,
                items,
                notes,
                authorized_by,
            };
            let response = submit_draft(client, &draft).await.context("Transfer not submitted")?;
            println!("{}", response.message);
            println!("{}", format_transfer_summary(&response.transfer_doc));
        }
        Command::Convert(args) => convert(&args)?,
    }
    Ok(())
}
