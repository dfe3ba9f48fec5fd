use finwatch_config::{RECIPIENT_ENV, load_toml};
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn token_and_recipient_from_config() {
    let cfg = load_toml("[notify]\nrecipient_id = 42").unwrap();
    let creds = cfg
        .credentials_with(env(&[("DISCORD_TOKEN", "abc")]))
        .expect("credentials");
    assert_eq!(creds.token, "abc");
    assert_eq!(creds.recipient_id, 42);
}

#[test]
fn recipient_env_overrides_config() {
    let cfg = load_toml("[notify]\nrecipient_id = 42").unwrap();
    let creds = cfg
        .credentials_with(env(&[("DISCORD_TOKEN", "abc"), (RECIPIENT_ENV, "99")]))
        .unwrap();
    assert_eq!(creds.recipient_id, 99);
}

#[test]
fn custom_token_env_is_honoured() {
    let cfg = load_toml("[notify]\nrecipient_id = 1\ntoken_env = \"BOT_TOKEN\"").unwrap();
    assert!(cfg.credentials_with(env(&[("DISCORD_TOKEN", "abc")])).is_err());
    assert!(cfg.credentials_with(env(&[("BOT_TOKEN", "abc")])).is_ok());
}

#[test]
fn missing_token_is_reported() {
    let cfg = load_toml("[notify]\nrecipient_id = 42").unwrap();
    let err = cfg.credentials_with(env(&[])).unwrap_err();
    assert!(format!("{err}").contains("missing credential: DISCORD_TOKEN"));
}

#[test]
fn missing_or_zero_recipient_is_reported() {
    let cfg = load_toml("").unwrap();
    let err = cfg
        .credentials_with(env(&[("DISCORD_TOKEN", "abc")]))
        .unwrap_err();
    assert!(format!("{err}").contains("missing recipient"));

    let err = cfg
        .credentials_with(env(&[("DISCORD_TOKEN", "abc"), (RECIPIENT_ENV, "0")]))
        .unwrap_err();
    assert!(format!("{err}").contains("missing recipient"));

    let err = cfg
        .credentials_with(env(&[("DISCORD_TOKEN", "abc"), (RECIPIENT_ENV, "me")]))
        .unwrap_err();
    assert!(format!("{err}").contains("invalid recipient"));
}
