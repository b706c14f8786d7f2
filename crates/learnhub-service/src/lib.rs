use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

mod config;
mod http;
#[path = "posts/posts_feed.rs"]
mod posts_feed;
mod proxy;
mod storage_helpers;
#[path = "users/status_update.rs"]
mod status_update;
#[path = "users/user_delete.rs"]
mod user_delete;

pub const DEFAULT_ADDR: &str = "localhost:48790";

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

pub struct ServerHandle {
    pub addr: String,
    join: thread::JoinHandle<()>,
}

impl ServerHandle {
    pub fn join(self) {
        let _ = self.join.join();
    }
}

/// Serves exactly one request on an ephemeral loopback port. Integration
/// tests use this to exercise a full round trip without a long-lived server.
pub fn start_one_shot_server() -> io::Result<ServerHandle> {
    if let Err(err) = storage_helpers::initialize_storage() {
        log::warn!("storage startup init skipped: {}", err);
    }
    let server = tiny_http::Server::http("127.0.0.1:0")
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let addr = server
        .server_addr()
        .to_ip()
        .map(|a| a.to_string())
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "server addr missing"))?;
    let join = thread::spawn(move || {
        if let Some(request) = server.incoming_requests().next() {
            crate::http::backend_router::handle_backend_request(request);
        }
    });
    Ok(ServerHandle { addr, join })
}

pub fn start_server(addr: &str) -> io::Result<()> {
    // 中文注释：启动阶段先做一次显式建表；不放在每次 open_storage 里是为避免高频请求重复执行迁移检查。
    if let Err(err) = storage_helpers::initialize_storage() {
        log::warn!("storage startup init skipped: {}", err);
    }
    http::server::start_http(addr)
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}
