//! Out-of-process worker for quadterra background recursion
//!
//! Run the server in a separate process:
//! ```ignore
//! let server = WorkerServer::bind("127.0.0.1:9743").await?;
//! ```
//! and point a terrain at it:
//! ```ignore
//! let terrain = Terrain::builder(config)
//!     .worker(Arc::new(TcpWorkerEndpoint::new("127.0.0.1:9743")))
//!     .build();
//! ```

pub mod client;
pub mod server;

pub use client::TcpWorkerEndpoint;
pub use server::WorkerServer;

/// Default worker port
pub const DEFAULT_PORT: u16 = 9743;
