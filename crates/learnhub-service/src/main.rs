use std::process::exit;

fn main() {
    env_logger::init();

    let addr = std::env::var("LEARNHUB_SERVICE_ADDR")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| learnhub_service::DEFAULT_ADDR.to_string());

    if let Err(err) = learnhub_service::start_server(&addr) {
        log::error!("server failed on {}: {}", addr, err);
        exit(1);
    }
}
