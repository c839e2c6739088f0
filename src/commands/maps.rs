//! Maps command implementation.
//!
//! Lists every discovered shield map and how many active properties carry
//! any shield behavior at all.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::api::{HttpApi, Predicate, PropertySearch};
use crate::classifier::discover_maps;
use crate::config::Config;
use crate::keyset::build_membership;
use crate::model::Environment;
use crate::utils::{format_count, truncate};

/// Discovered maps and the shielded property count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapListing {
    pub maps: Vec<String>,
    pub shielded_properties: usize,
    pub environment: Environment,
}

/// Run the maps command
pub async fn run(staging: bool, config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    config.require_api()?;

    let environment = if staging {
        Environment::Staging
    } else {
        config.audit.environment
    };

    let api: Arc<dyn PropertySearch> = Arc::new(HttpApi::new(&config.api)?);
    let listing = list_maps(api.as_ref(), environment).await?;

    print!("{}", render_listing(&listing));
    Ok(())
}

/// Discover maps and count active properties with a shield behavior
pub async fn list_maps(search: &dyn PropertySearch, environment: Environment) -> Result<MapListing> {
    let maps = discover_maps(search).await?;
    let records = search.search(&Predicate::AnyShieldBehavior).await?;
    let shielded = build_membership(records.iter(), environment);

    Ok(MapListing {
        maps,
        shielded_properties: shielded.len(),
        environment,
    })
}

fn render_listing(listing: &MapListing) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str("══════════════════════════════════════════════════════════════════\n");
    out.push_str(&format!(" SHIELD MAPS ({})\n", listing.environment));
    out.push_str("══════════════════════════════════════════════════════════════════\n\n");

    if listing.maps.is_empty() {
        out.push_str(" No shield maps found\n");
    } else {
        for map in &listing.maps {
            out.push_str(&format!(" {}\n", truncate(map, 64)));
        }
    }
    out.push('\n');
    out.push_str(&format!(
        " Maps: {}\n",
        format_count(listing.maps.len())
    ));
    out.push_str(&format!(
        " Active properties with a shield behavior: {}\n\n",
        format_count(listing.shielded_properties)
    ));

    out
}
