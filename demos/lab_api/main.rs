//! Laboratory QC API example
//!
//! Loads `demos/lab_api/config.yaml` (or the path given as first argument),
//! seeds the store from the configured fixtures and serves every lab entity.
//!
//! ```text
//! cargo run --example lab_api
//! curl 'http://127.0.0.1:3000/api/batches?customerName=acme&sortBy=productionDate&isAscending=false'
//! ```

use labqc::prelude::*;

const DEFAULT_CONFIG: &str = "demos/lab_api/config.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = LabConfig::from_yaml_file(&path)?;

    init_logging(&config.logging);

    let store = InMemoryStore::from_config(&config.store)?;

    println!("🚀 Starting labqc on http://{}", config.bind_address());
    println!("\n📚 Entity routes:");
    let builder = ServerBuilder::new(store)
        .with_config(config.server.clone())
        .register_lab_entities()?;
    for path in builder.collection_paths() {
        println!("    GET|POST {}    GET|PUT|DELETE {}/{{id}}", path, path);
    }
    println!("\n🔎 List queries take named filters plus sortBy / isAscending");

    builder.serve(&config.bind_address()).await
}
