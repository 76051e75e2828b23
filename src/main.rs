#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = elevate_progress::run().await {
        eprintln!("elevate-progress fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
