//! Lists the first page of assets.
//!
//! Run with:
//!   LIGHTFLOW_BASE_URL=https://... LIGHTFLOW_API_TOKEN=... cargo run --example list_assets
//!
//! Set `RUST_LOG=lightflow=debug` to see each request.

use lightflow::ClientBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> lightflow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = ClientBuilder::new().build()?;

    println!("Listing assets");
    let page = client.list_assets().await?;

    for asset in &page.items {
        println!(
            "UUID: {}, Url: {}",
            asset.uuid.as_deref().unwrap_or("-"),
            asset.parameters.input.url_path
        );
    }

    if page.has_more() {
        println!(
            "(page {} of {}, {} assets total)",
            page.page_index + 1,
            page.pages,
            page.total_items
        );
    }

    Ok(())
}
