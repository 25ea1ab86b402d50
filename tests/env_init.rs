//! Runs in its own process: mutates the environment and installs the
//! process-wide handle from it. Kept to a single test so nothing races on
//! the environment.

use supaenv::config::{ANON_KEY_VAR, SKIP_DOTENV_VAR, URL_VAR};
use supaenv::{ConfigError, SupabaseConfig, global};

#[test]
fn handle_is_built_from_environment_once() {
    // SAFETY: the only test in this binary, so no other thread reads the
    // environment concurrently.
    unsafe {
        std::env::set_var(SKIP_DOTENV_VAR, "1");
        std::env::set_var(URL_VAR, "https://envproj.supabase.co/");
        std::env::set_var(ANON_KEY_VAR, "env-anon-key");
    }

    assert!(global::get().is_none());

    let first = global::client().unwrap();
    let second = global::client().unwrap();
    let via_init = global::init().unwrap();

    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(first, via_init));
    assert!(std::ptr::eq(first, global::get().unwrap()));
    assert_eq!(first.url(), "https://envproj.supabase.co");
    assert_eq!(first.anon_key(), "env-anon-key");

    unsafe {
        std::env::remove_var(URL_VAR);
    }
    let err = SupabaseConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar { key } if key == URL_VAR));

    // Already built: losing the variable does not affect the handle.
    assert!(std::ptr::eq(first, global::client().unwrap()));

    unsafe {
        std::env::set_var(URL_VAR, "https://envproj.supabase.co");
        std::env::remove_var(ANON_KEY_VAR);
    }
    let err = SupabaseConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar { key } if key == ANON_KEY_VAR));

    unsafe {
        std::env::set_var(ANON_KEY_VAR, "   ");
    }
    let err = SupabaseConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar { key } if key == ANON_KEY_VAR));
}
