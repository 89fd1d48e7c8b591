use fareband::config::Config;
use fareband::engine::Engine;
use fareband::error::Error;
use fareband::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let engine = Engine::new(config.pricing)?;

    serve(engine, config.bind_addr).await
}
