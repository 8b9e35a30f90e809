//! Print the calculators and property types known to the service
//!
//! ```sh
//! STRUCTDB_TOKEN=... RUST_LOG=structdb_client=debug cargo run --example list_catalogue
//! ```

use anyhow::Context;
use structdb_client::{CalculatorQuery, PropertyTypeQuery, Rester, ResterConfig, DEFAULT_BASE_URL};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let token = std::env::var("STRUCTDB_TOKEN").context("STRUCTDB_TOKEN is not set")?;
    let base_url = std::env::var("STRUCTDB_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let rester = Rester::with_config(token, ResterConfig::new(base_url))?;

    for calculator in rester.query_calculators(&CalculatorQuery::new()).await? {
        println!("{}", calculator);
    }

    for property_type in rester.query_property_types(&PropertyTypeQuery::new()).await? {
        println!("{}", property_type);
    }

    Ok(())
}
