use std::{error::Error, time::Duration};

use clap::Parser;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use backstop::local::LocalOrderedStore;
use backstop::redis::{RedisOrderedStore, RedisOrderedStoreOptions};
use backstop::{
    Backstop, BackstopOptions, CollectionName, OrderedStore, SystemClock, ThrottlingConfiguration,
    WindowEvaluation,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "backstop-demo",
    about = "Records a burst of failures and shows the throttle decision flip"
)]
struct Args {
    /// Use the in-process store instead of Redis.
    #[arg(long)]
    local: bool,

    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379/")]
    redis_url: String,

    #[arg(long, default_value_t = 10)]
    max_error_count: i64,

    #[arg(long, default_value_t = 10.0)]
    window_size_seconds: f64,

    #[arg(long, default_value = "rate_limit_error_log")]
    collection: String,

    /// Upper bound for each Redis round-trip.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// After throttling, wait for the window to pass and evaluate once more.
    #[arg(long)]
    wait_for_expiry: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let options = BackstopOptions {
        collection: Some(CollectionName::try_from(args.collection.as_str())?),
    };

    if args.local {
        run(Backstop::new(LocalOrderedStore::new(), options), &args).await
    } else {
        let client = redis::Client::open(args.redis_url.as_str())?;
        let connection_manager = client.get_connection_manager().await?;

        let store = RedisOrderedStore::new(RedisOrderedStoreOptions {
            connection_manager,
            prefix: None,
            timeout: args.timeout_ms.map(Duration::from_millis),
        })?;

        run(Backstop::new(store, options), &args).await
    }
}

async fn run<S>(backstop: Backstop<S, SystemClock>, args: &Args) -> Result<(), Box<dyn Error>>
where
    S: OrderedStore + Clone,
{
    let config = ThrottlingConfiguration {
        max_error_count: args.max_error_count,
        window_size_seconds: args.window_size_seconds,
    };
    let policy = config.validate()?;

    // Start from an empty log so the demo can be rerun.
    backstop.reset().await?;

    report("before", &backstop.evaluator().evaluate_policy(&policy).await?);

    for _ in 0..*policy.max_error_count {
        let id = backstop.recorder().record_new().await?;
        tracing::debug!(%id, "recorded failure");
    }

    report("after", &backstop.evaluator().evaluate_policy(&policy).await?);

    if args.wait_for_expiry {
        let wait = Duration::from_millis(policy.window_size.as_millis() + 100);
        tracing::info!(?wait, "waiting for the window to pass");
        tokio::time::sleep(wait).await;

        report("expired", &backstop.evaluator().evaluate_policy(&policy).await?);
    }

    Ok(())
}

fn report(stage: &str, evaluation: &WindowEvaluation) {
    if evaluation.is_throttled() {
        tracing::info!(stage, count = evaluation.count, "we need to back off");
    } else {
        tracing::info!(
            stage,
            count = evaluation.count,
            remaining = evaluation.remaining(),
            "no need to back off"
        );
    }
}
