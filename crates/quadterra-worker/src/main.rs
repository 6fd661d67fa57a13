//! Worker server binary.
//!
//! Usage: quadterra-worker [--host <HOST>] [--port <PORT>]

use quadterra_worker::{WorkerServer, DEFAULT_PORT};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let host = parse_str_arg(&args, "--host").unwrap_or_else(|| "127.0.0.1".to_string());
    let port = parse_u16_arg(&args, "--port").unwrap_or(DEFAULT_PORT);
    let addr = format!("{}:{}", host, port);

    let mut server = match WorkerServer::bind(&addr).await {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to bind worker server on {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    server.wait().await;
}

fn parse_u16_arg(args: &[String], flag: &str) -> Option<u16> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
