use mock_server::AppOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let options = AppOptions {
        required_token: std::env::var("MOCK_REQUIRED_TOKEN").ok(),
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, auth = options.required_token.is_some(), "mock server listening");
    mock_server::run_with(listener, options).await
}
