use anyhow::Result;
use journal_sentiment::{
    config::Config,
    http::{HttpState, start_http_server},
    insight::InsightGenerator,
    scorers::create_scorer,
    sentiment::SentimentAnalyzer,
    utils::init_tracing,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.runtime.log_level);

    info!("Starting journal-sentiment server");

    let scorer = create_scorer(&config).await?;
    let analyzer = SentimentAnalyzer::from_config(scorer, &config)?;
    let insights = InsightGenerator::from_config(&config)?;

    let state = HttpState {
        config: Arc::new(config),
        analyzer: Arc::new(analyzer),
        insights: Arc::new(insights),
    };

    start_http_server(state).await?;

    Ok(())
}
