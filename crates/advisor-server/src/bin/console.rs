//! Interactive console for the stock risk advisor
//!
//! Reads questions from stdin, prints follow-up questions as `Agent:` and
//! the resolved slots, advisor text and JSON summary for each answer.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advisor_runtime::RuntimeConfig;
use stock_advisor::{AdvisorPipeline, ConversationState, MockMarketData, PipelineConfig, Reply};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RuntimeConfig::from_env()?;
    let provider = config.build_provider()?;
    let pipeline = AdvisorPipeline::new(
        provider,
        Arc::new(MockMarketData::new()),
        PipelineConfig::from_env(config.model.clone()),
    );

    println!("Stock risk advisor ({}). Type 'exit' to quit.", config.model);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut state = ConversationState::default();

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match pipeline.handle(&mut state, input).await {
            Reply::FollowUp(question) => println!("Agent: {question}"),
            Reply::Error(message) => println!("Agent: {message}"),
            Reply::Reset => println!("Agent: Starting over."),
            Reply::Answer(output) => {
                if output.exhausted {
                    println!("(some details were assumed after several follow-ups)");
                }
                println!("\nSlots:\n{}", serde_json::to_string_pretty(&output.slots)?);
                println!("\nAdvisor:\n{}", output.advisor_text);
                if let Some(summary) = &output.summary {
                    println!("\nSummary:\n{}", serde_json::to_string_pretty(summary)?);
                }
            }
        }
    }

    Ok(())
}
