use anyhow::{Context, Result};
use modeldb_infrastructure::ConfigLoader;
use std::path::Path;

pub fn show(path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::resolve(path).context("Failed to resolve configuration")?;
    print!("{}", ConfigLoader::to_toml(&config)?);
    Ok(())
}
