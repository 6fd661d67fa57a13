//! TCP worker endpoint used by a terrain to reach a `WorkerServer`.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use quadterra::background::{DispatchFuture, WorkerEndpoint, WorkerRequest, WorkerResponse};
use quadterra::{Error, Result};

/// TCP connection to the worker server (lazy-initialized)
struct WorkerConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl WorkerConnection {
    async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            Error::WorkerUnavailable(format!("cannot connect to worker on {}: {}", addr, e))
        })?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    async fn send(&mut self, request_json: &str) -> Result<WorkerResponse> {
        self.writer.write_all(request_json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let mut response_line = String::new();
        let read = self.reader.read_line(&mut response_line).await?;
        if read == 0 {
            return Err(Error::Worker("worker closed the connection".to_string()));
        }
        Ok(serde_json::from_str(response_line.trim())?)
    }
}

/// Worker endpoint speaking JSON lines over TCP.
pub struct TcpWorkerEndpoint {
    addr: String,
    connection: Mutex<Option<WorkerConnection>>,
}

impl TcpWorkerEndpoint {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            connection: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn round_trip(&self, request: WorkerRequest) -> Result<WorkerResponse> {
        let json = serde_json::to_string(&request)?;
        let mut guard = self.connection.lock().await;

        if guard.is_none() {
            *guard = Some(WorkerConnection::connect(&self.addr).await?);
        }
        if let Some(connection) = guard.as_mut() {
            match connection.send(&json).await {
                Ok(response) => return Ok(response),
                Err(e) => log::warn!("Worker connection error, reconnecting: {}", e),
            }
        }

        // Reconnect and retry once
        let mut connection = WorkerConnection::connect(&self.addr).await?;
        let response = connection.send(&json).await;
        *guard = Some(connection);
        response
    }
}

impl WorkerEndpoint for TcpWorkerEndpoint {
    fn dispatch(&self, request: WorkerRequest) -> DispatchFuture<'_> {
        Box::pin(self.round_trip(request))
    }

    fn describe(&self) -> String {
        format!("tcp worker at {}", self.addr)
    }
}
