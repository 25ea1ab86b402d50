//! Validated, process-wide Supabase client handle.
//!
//! ```no_run
//! let supabase = supaenv::client()?;
//! println!("{}", supabase.rest_url());
//! # Ok::<(), supaenv::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod global;
pub mod http;

pub use client::{ClientError, Endpoints, HealthStatus, SupabaseClient};
pub use config::{ConfigError, ConfigWarning, KeyClaims, SupabaseConfig};
pub use global::client;
