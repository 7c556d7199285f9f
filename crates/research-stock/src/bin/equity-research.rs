//! Equity Research CLI
//!
//! An interactive command-line interface for the equity research pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Local Ollama (default)
//! cargo run --bin equity-research -p research-stock
//!
//! # OpenAI
//! export LLM_BACKEND=openai
//! export OPENAI_API_KEY=sk-...
//! cargo run --bin equity-research -p research-stock -- --ticker AAPL
//! ```

use clap::Parser;
use research_llm::{CompletionClient, LlmBackend, LlmSettings};
use research_stock::{EquityResearchPipeline, ResearchConfig, ResearchServices, YahooFinanceClient};
use research_utils::{env_lookup, init_tracing_with_default};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "equity-research", version, about = "Multi-agent equity research memos")]
struct Args {
    /// Completion backend (ollama or openai); overrides LLM_BACKEND
    #[arg(long)]
    backend: Option<LlmBackend>,

    /// Model identifier; overrides LLM_MODEL and the backend default
    #[arg(long)]
    model: Option<String>,

    /// Analyze a single ticker and exit
    #[arg(long)]
    ticker: Option<String>,

    /// Run the fundamental and quant analysts one after the other
    #[arg(long)]
    sequential: bool,
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                  Equity Research Analyst                     ║
║                                                              ║
║  Three analysts review every ticker:                         ║
║    Fundamentalist - valuation and business quality           ║
║    Quant          - P/E, PEG and P/B against peers           ║
║    Strategist     - BUY / SELL / HOLD investment memo        ║
║                                                              ║
║  Enter a ticker (e.g. AAPL). Type 'quit' to exit.            ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

fn llm_settings(args: &Args) -> anyhow::Result<LlmSettings> {
    let settings = match args.backend {
        Some(backend) => LlmSettings::for_backend(backend).with_overrides(&env_lookup)?,
        None => LlmSettings::from_env()?,
    };

    Ok(match &args.model {
        Some(model) => settings.with_model(model.clone()),
        None => settings,
    })
}

fn print_memo(ticker: &str, memo: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{rule}");
    println!("INVESTMENT MEMO: {ticker}");
    println!("{rule}\n");
    println!("{memo}");
    println!("\n{rule}\n");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing_with_default("warn,research_stock=info,research_workflow=info");

    let args = Args::parse();

    let settings = llm_settings(&args)?;
    let mut config = ResearchConfig::from_env()?;
    if args.sequential {
        config.parallel_analysis = false;
    }

    let completion = CompletionClient::from_settings(&settings)?;
    let source = YahooFinanceClient::new(&config)?;
    let services = ResearchServices::new(Arc::new(completion), Arc::new(source));
    let pipeline = EquityResearchPipeline::new(services, &config)?;

    if let Some(ticker) = &args.ticker {
        let ticker = ticker.trim().to_uppercase();
        let state = pipeline.analyze(&ticker).await?;
        print_memo(&ticker, &state.final_report);
        return Ok(());
    }

    print_banner();
    println!("Configuration:");
    println!("  Backend: {}", settings.backend);
    println!("  Model: {}", settings.model);
    println!("  API Base: {}", settings.api_base);
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        print!("Enter ticker symbol: ");
        stdout.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!("\nGoodbye!");
                break;
            }
        };

        let Some(line) = line else {
            // EOF
            println!("\nGoodbye!");
            break;
        };

        let ticker = line.trim().to_uppercase();
        if matches!(ticker.as_str(), "QUIT" | "EXIT" | "Q") {
            println!("Goodbye!");
            break;
        }
        if ticker.is_empty() {
            println!("Please enter a ticker symbol.");
            continue;
        }

        println!("\nAnalyzing {ticker}. Market data collection is paced, this takes a few minutes...");

        tokio::select! {
            result = pipeline.analyze(&ticker) => match result {
                Ok(state) => print_memo(&ticker, &state.final_report),
                Err(e) => eprintln!("Error during analysis: {e}"),
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\nAnalysis interrupted. Goodbye!");
                break;
            }
        }
    }

    Ok(())
}
