use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use journal_sentiment::{
    config::Config, insight::InsightGenerator, scorers::create_scorer,
    sentiment::SentimentAnalyzer, utils::init_tracing,
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a journal entry chunk by chunk and print the report as JSON", long_about = None)]
struct Args {
    /// Text to analyze (reads --file or stdin when omitted)
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the entry from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Sentences per chunk (overrides analysis.chunk_size)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Scorer backend: groq, local or lexicon (overrides analysis.scorer)
    #[arg(long)]
    scorer: Option<String>,

    /// Also generate a mood insight
    #[arg(long)]
    insight: bool,

    /// Fail with a non-zero exit instead of printing the fallback report
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(size) = args.chunk_size {
        config.analysis.chunk_size = size;
    }
    if let Some(scorer) = &args.scorer {
        config.analysis.scorer = scorer.trim().to_lowercase();
    }
    config.validate()?;
    init_tracing(&config.runtime.log_level);

    let text = read_input(&args)?;
    if text.trim().is_empty() {
        anyhow::bail!("No text provided");
    }

    let scorer = create_scorer(&config).await?;
    let analyzer = SentimentAnalyzer::from_config(scorer, &config)?;
    let report = if args.strict {
        analyzer.try_analyze(&text).await?
    } else {
        analyzer.analyze(&text).await
    };

    let output = if args.insight {
        let insight = InsightGenerator::from_config(&config)?
            .generate(&text)
            .await;
        json!({ "sentiment": report, "insight": insight })
    } else {
        serde_json::to_value(&report)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_input(args: &Args) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}
