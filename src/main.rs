#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = courseloop_rust::run().await {
        eprintln!("courseloop-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
