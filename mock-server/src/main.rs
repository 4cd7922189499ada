use std::time::Duration;

use tokio::net::TcpListener;

/// Binds `127.0.0.1:$PORT` (default 3000). `MOCK_LATENCY_MS` delays every
/// response, which is handy for exercising client-side cancellation.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let latency = std::env::var("MOCK_LATENCY_MS")
        .ok()
        .and_then(|ms| ms.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::ZERO);

    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    let addr = listener.local_addr()?;
    println!("resource manager mock listening on http://{addr} (latency {latency:?})");
    mock_server::run_with_latency(listener, latency).await
}
