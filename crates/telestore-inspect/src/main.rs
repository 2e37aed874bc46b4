//! telestore-inspect: print what a session database holds.
//!
//! Usage: `telestore-inspect [CONFIG]`. The config path falls back to
//! `$TELESTORE_CONFIG`, then `./telestore.toml`; without a config file the
//! defaults are used.

use std::path::PathBuf;

use serde::Serialize;
use telestore::{ConnectionRegistry, Session, SessionStore, StoreConfig};
use telestore_types::UpdateState;
use tracing::info;

/// Summary printed as JSON. Auth key material is never printed.
#[derive(Debug, Serialize)]
struct Report {
    alias: String,
    schema_version: Option<u32>,
    sessions: Vec<SessionSummary>,
    entity_count: u64,
    update_states: Vec<UpdateStateEntry>,
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    dc_id: i32,
    server_address: Option<String>,
    port: Option<u16>,
    has_auth_key: bool,
    takeout_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct UpdateStateEntry {
    entity_id: i64,
    #[serde(flatten)]
    state: UpdateState,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("telestore=info".parse()?),
        )
        .init();

    let config = load_config()?;
    info!(alias = %config.alias, "Opening session store");

    let registry = ConnectionRegistry::new();
    let store = SessionStore::open(&registry, &config)?;

    let report = Report {
        alias: store.alias().to_string(),
        schema_version: store.schema_version()?,
        sessions: store
            .list_sessions()?
            .into_iter()
            .map(|record| SessionSummary {
                dc_id: record.dc_id,
                has_auth_key: !record.auth_key.is_empty(),
                server_address: record.server_address,
                port: record.port,
                takeout_id: record.takeout_id,
            })
            .collect(),
        entity_count: store.entity_count()?,
        update_states: store
            .list_update_states()?
            .into_iter()
            .map(|(entity_id, state)| UpdateStateEntry { entity_id, state })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_config() -> anyhow::Result<StoreConfig> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var("TELESTORE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("telestore.toml"));

    if path.exists() {
        info!("Loading config from {:?}", path);
        Ok(StoreConfig::load(&path)?)
    } else {
        info!("No config at {:?}, using defaults", path);
        Ok(StoreConfig::default())
    }
}
