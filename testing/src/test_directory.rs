use anyhow::Context;
use std::convert::TryFrom;
use std::fs;
use std::path::PathBuf;

use ya_domain_utils::Domain;
use ya_negotiator_component::LinearUtilitySpace;

pub fn test_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("assets")
}

/// Loads domain definition from yaml file in test assets directory.
pub fn load_domain(file: &str) -> anyhow::Result<Domain> {
    let path = test_assets_dir().join(file);
    Domain::try_from(path.as_path())
        .with_context(|| format!("Loading domain: {}", path.display()))
}

pub fn load_preferences(domain: &Domain, file: &str) -> anyhow::Result<LinearUtilitySpace> {
    let path = test_assets_dir().join(file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Reading preferences: {}", path.display()))?;
    LinearUtilitySpace::from_yaml(domain.clone(), &content)
        .with_context(|| format!("Loading preferences: {}", path.display()))
}
