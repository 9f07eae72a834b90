use tmop::commands::Cli;
use tmop::msg_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    if let Err(err) = Cli::menu().await {
        msg_error!(format!("{err:#}"));
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = if std::env::var("TMOP_DEBUG").is_ok() {
        EnvFilter::new("tmop=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
