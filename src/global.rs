//! Process-wide client handle.
//!
//! The handle is built at most once and lives until the process exits.
//! Every accessor hands out the same `&'static SupabaseClient`.

use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::client::{ClientError, SupabaseClient};
use crate::config::SupabaseConfig;

static CLIENT: OnceLock<SupabaseClient> = OnceLock::new();

/// Returns the shared handle, building it from `VITE_SUPABASE_URL` and
/// `VITE_SUPABASE_ANON_KEY` on first use.
pub fn client() -> Result<&'static SupabaseClient, ClientError> {
    init()
}

pub fn init() -> Result<&'static SupabaseClient, ClientError> {
    if let Some(existing) = CLIENT.get() {
        return Ok(existing);
    }
    let config = SupabaseConfig::from_env()?;
    for warning in config.warnings() {
        warn!("{}", warning);
    }
    init_with(config)
}

/// Installs a handle built from `config`. If one already exists the
/// existing handle is returned and `config` is dropped. Config warnings
/// are left to the caller.
pub fn init_with(config: SupabaseConfig) -> Result<&'static SupabaseClient, ClientError> {
    if let Some(existing) = CLIENT.get() {
        debug!("supabase client already initialized, ignoring new config");
        return Ok(existing);
    }

    let built = SupabaseClient::new(config)?;
    // A concurrent caller may have won the race; the first stored value is kept.
    Ok(CLIENT.get_or_init(|| built))
}

pub fn get() -> Option<&'static SupabaseClient> {
    CLIENT.get()
}
