use clap::Parser;
use color_eyre::Result;
use redis_dashboard::{
    init_errors,
    init_logging,
    App,
    Args,
    Environment,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first so an unknown `ENV` value is reported.
    init_logging()?;
    let environment = Environment::from_env();
    init_errors(environment)?;
    App::new(Args::parse(), environment)?.run().await
}
