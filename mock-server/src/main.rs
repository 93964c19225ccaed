use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let behavior = mock_server::Behavior {
        rate_limited: std::env::var_os("MOCK_RATE_LIMITED").is_some(),
        omit_commands_field: std::env::var_os("MOCK_OMIT_COMMANDS").is_some(),
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, ?behavior, "listening");
    mock_server::run_with(listener, behavior).await
}
