use std::thread;

use supaenv::{SupabaseConfig, global};

const URL: &str = "https://first.supabase.co";

fn config() -> SupabaseConfig {
    SupabaseConfig::new(URL, "first-anon-key").unwrap()
}

#[test]
fn every_accessor_returns_the_same_handle() {
    let installed = global::init_with(config()).unwrap();

    let again = global::init_with(config()).unwrap();
    let lazy = global::client().unwrap();
    let peeked = global::get().unwrap();

    assert!(std::ptr::eq(installed, again));
    assert!(std::ptr::eq(installed, lazy));
    assert!(std::ptr::eq(installed, peeked));
    assert_eq!(installed.url(), URL);
}

#[test]
fn later_config_does_not_replace_the_handle() {
    let first = global::init_with(config()).unwrap();
    let other = SupabaseConfig::new("https://second.supabase.co", "second-key").unwrap();

    let second = global::init_with(other).unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.url(), URL);
    assert_eq!(second.anon_key(), "first-anon-key");
}

#[test]
fn concurrent_first_calls_share_one_handle() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| global::init_with(config()).unwrap() as *const _ as usize))
        .collect();

    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(addrs[0], global::get().unwrap() as *const _ as usize);
}
