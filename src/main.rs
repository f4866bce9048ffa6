#[tokio::main]
async fn main() {
    if let Err(e) = store_uptime::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
