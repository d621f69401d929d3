#[tokio::main]
async fn main() {
    if let Err(e) = recreo::run().await {
        eprintln!("recreo: {e}");
        std::process::exit(1);
    }
}
