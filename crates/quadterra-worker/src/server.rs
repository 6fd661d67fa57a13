//! TCP worker server

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

use quadterra::background::{handle_request, WorkerRequest, WorkerResponse};

/// Worker server handle - keep this alive to keep the server running
pub struct WorkerServer {
    local_addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl WorkerServer {
    /// Bind to `addr` and start accepting connections in the background.
    ///
    /// Each line received is one JSON `WorkerRequest`; each reply is one JSON
    /// `WorkerResponse` line.
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        log::info!("Worker server listening on {}", local_addr);

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        log::info!("Worker client connected from {}", peer);
                        tokio::spawn(async move {
                            handle_connection(stream).await;
                            log::info!("Worker client disconnected: {}", peer);
                        });
                    }
                    Err(e) => {
                        log::error!("Worker server accept error: {}", e);
                    }
                }
            }
        });

        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait until the accept loop ends (it only ends if the task is aborted).
    pub async fn wait(&mut self) {
        if let Err(e) = (&mut self.handle).await {
            log::error!("Worker server task ended: {}", e);
        }
    }
}

impl Drop for WorkerServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve one client: each request line gets exactly one response line.
async fn handle_connection(stream: TcpStream) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Worker read error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<WorkerRequest>(&line) {
            Ok(request) => run(request).await,
            Err(e) => WorkerResponse::error(format!("Invalid request JSON: {}", e)),
        };
        if let Err(e) = respond(&mut writer, &response).await {
            log::error!("Worker write error: {}", e);
            break;
        }
    }
}

async fn respond(writer: &mut OwnedWriteHalf, response: &WorkerResponse) -> std::io::Result<()> {
    writer.write_all(response.to_json_line().as_bytes()).await?;
    writer.flush().await
}

/// Recursion is CPU-bound; keep it off the IO threads.
async fn run(request: WorkerRequest) -> WorkerResponse {
    let WorkerRequest::RecurseSection(ref body) = request;
    log::debug!(
        "recurseSection: {} vertices at {}, {} level(s)",
        body.section.vertices.len(),
        body.section.absolute_index,
        body.levels
    );

    match tokio::task::spawn_blocking(move || handle_request(request)).await {
        Ok(response) => response,
        Err(e) => WorkerResponse::error(format!("Worker task failed: {}", e)),
    }
}
