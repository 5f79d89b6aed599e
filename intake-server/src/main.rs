use intake_server::{Config, Server, print_banner};
use intake_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let _guard = logger::init_logger(&config);

    print_banner();

    let server = Server::new(config);
    server.run().await?;

    Ok(())
}
