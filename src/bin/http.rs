#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::path::Path;

    use slot_booking::{BookingPolicy, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let addr: SocketAddr = std::env::var("SLOT_BOOKING_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let policy = match std::env::var("SLOT_BOOKING_POLICY") {
        Ok(path) => BookingPolicy::from_json_file(&path)?,
        Err(_) => BookingPolicy::default(),
    };

    let sqlite_path = std::env::var("SLOT_BOOKING_SQLITE").ok();
    let data_dir = std::env::var("SLOT_BOOKING_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let store = http_api::open_store(sqlite_path.as_deref(), Path::new(&data_dir))?;

    log::info!("slot-booking HTTP API listening on http://{addr}");
    let state = http_api::AppState::with_shared(store, policy);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
