use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::Config;
use crate::feed::{KalshiClient, KalshiFeedConfig};
use crate::notify::{LogNotifier, Notifier};
use crate::stream::MarketAggregator;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Number of markets to show in the closing mover summary
    #[arg(short, long, default_value_t = 5)]
    pub top: usize,
}

impl StreamArgs {
    /// Run the aggregator against the live feed until Ctrl-C.
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let feed = Arc::new(KalshiClient::with_config(KalshiFeedConfig::from(
            &config.feed,
        )));
        let aggregator = Arc::new(MarketAggregator::new(feed, &config.stream));

        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        let sink = Arc::clone(&notifier);
        aggregator
            .add_subscriber(Box::new(move |updated, table| {
                sink.send(&format!(
                    "{} markets updated ({} tracked)",
                    updated.len(),
                    table.len()
                ));
                Ok(())
            }))
            .await;

        aggregator.start().await;
        info!(
            interval_secs = config.stream.update_interval_secs,
            "Streaming market data, press Ctrl-C to stop"
        );

        tokio::signal::ctrl_c().await?;
        info!("Shutdown requested");

        let summary = aggregator.summary().await;
        info!(
            total_markets = summary.total_markets,
            gainers = summary.gainers,
            losers = summary.losers,
            "Final market summary"
        );
        for snapshot in aggregator.top_movers(self.top).await {
            let pct = snapshot
                .price_change_pct()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "n/a".to_string());
            info!(
                market_id = %snapshot.market_id,
                price = %snapshot.current_price,
                change_pct = %pct,
                "Top mover"
            );
        }

        aggregator.stop().await;
        Ok(())
    }
}
