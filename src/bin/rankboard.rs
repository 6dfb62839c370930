use std::process::ExitCode;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rankboard::http::{self, App};
use rankboard::{
    logging, seed, InMemoryEntityDirectory, InMemoryScoreStore, RankboardConfig, RankingEngine,
    RequestContext,
};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let config = match RankboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let engine = RankingEngine::new(InMemoryScoreStore::new());
    let directory = InMemoryEntityDirectory::new();

    if config.seed_population > 0 {
        let mut rng = StdRng::from_entropy();
        if let Err(e) = seed::seed_population(
            &RequestContext::new(),
            &engine,
            &directory,
            config.seed_population,
            (config.min_score, config.max_score),
            &mut rng,
        )
        .await
        {
            tracing::error!(error = %e, "failed to seed population");
            return ExitCode::FAILURE;
        }
    }

    let addr = config.listen_addr.clone();
    let app = Arc::new(App::new(engine, directory, config));

    let shutdown = app.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            shutdown.cancel();
        }
    });

    match http::serve(app, &addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, addr = %addr, "server failed");
            ExitCode::FAILURE
        }
    }
}
