pub mod http;
pub mod logging;
pub mod routes;

use roster_core::sampler::Sampler;
use roster_core::NameStore;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;

/// Shared server state: the roster plus the sampler and its history file.
///
/// One lock covers both so a generate call holds the store read, the
/// window update, and the history write as a single critical section.
pub struct AppState {
    pub store: NameStore,
    pub sampler: Sampler,
}

impl AppState {
    /// Open state rooted at `data_dir`, loading any persisted history.
    pub fn open(data_dir: &Path) -> Result<Self, String> {
        let sampler = Sampler::load(data_dir.join("history.json"))?;
        Ok(Self {
            store: NameStore::new(),
            sampler,
        })
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

pub type SharedState = Arc<Mutex<AppState>>;

/// HTTP server: a bound listener plus the state handed to every connection.
pub struct Server {
    listener: TcpListener,
    state: SharedState,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind a TCP listener. Connections are not accepted until [`Server::run`].
    pub async fn bind(addr: impl ToSocketAddrs, state: SharedState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            state,
            local_addr,
        })
    }

    /// Return the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections forever, one task per connection. Accept errors
    /// are logged and do not stop the loop.
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, state, addr).await;
                    });
                }
                Err(e) => {
                    log::warn!("accept error: {}", e);
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
            }
        }
    }
}

/// Serve requests on one connection until it closes, errors, or asks to.
/// A malformed request gets a 400 and ends the connection.
async fn handle_connection(stream: TcpStream, state: SharedState, addr: SocketAddr) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    loop {
        let req = match http::read_request(&mut reader).await {
            Ok(req) => req,
            Err(http::WireError::ConnectionClosed) => break,
            Err(http::WireError::Io(e)) => {
                log::warn!("client {} disconnected: {}", addr, e);
                break;
            }
            Err(e) => {
                log::warn!("bad request from {}: {}", addr, e);
                let body = serde_json::json!({ "message": "Malformed request" }).to_string();
                let _ = http::write_response(&mut write_half, 400, &body, false).await;
                break;
            }
        };

        log::debug!("{} {} from {}", req.method, req.path, addr);
        let keep_alive = req.keep_alive;
        let reply = routes::dispatch(&state, &req).await;
        if http::write_response(&mut write_half, reply.status, &reply.body, keep_alive)
            .await
            .is_err()
        {
            break;
        }
        if !keep_alive {
            break;
        }
    }
}
