use chrono::{DateTime, Local, Utc};

use supaenv::{ConfigWarning, KeyClaims, SupabaseClient};

const LABEL_WIDTH: usize = 12;

pub fn field_line(label: &str, value: &str) -> String {
    format!("{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH)
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    let local: DateTime<Local> = ts.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

pub fn key_lines(claims: Option<&KeyClaims>) -> Vec<String> {
    let Some(claims) = claims else {
        return vec![field_line("key type", "opaque (not a JWT)")];
    };
    let mut lines = vec![field_line(
        "key role",
        claims.role.as_deref().unwrap_or("(none)"),
    )];
    if let Some(issued) = claims.issued_at() {
        lines.push(field_line("issued", &format_timestamp(issued)));
    }
    lines.push(field_line(
        "expires",
        &claims
            .expires_at()
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string()),
    ));
    lines
}

pub fn check_report(client: &SupabaseClient, warnings: &[ConfigWarning]) -> Vec<String> {
    let cfg = client.config();
    let mut lines = vec![
        field_line("url", cfg.url()),
        field_line("project", cfg.project_ref()),
        field_line("anon key", &cfg.redacted_key()),
    ];
    lines.extend(key_lines(cfg.claims().as_ref()));
    if warnings.is_empty() {
        lines.push("OK".to_string());
    } else {
        lines.extend(warnings.iter().map(|w| format!("warning: {}", w)));
    }
    lines
}

pub fn endpoint_lines(client: &SupabaseClient) -> Vec<String> {
    let e = client.endpoints();
    vec![
        field_line("rest", &e.rest),
        field_line("auth", &e.auth),
        field_line("storage", &e.storage),
        field_line("functions", &e.functions),
        field_line("realtime", &e.realtime),
        field_line("storage key", &client.storage_key()),
    ]
}
