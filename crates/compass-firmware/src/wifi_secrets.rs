//! Wi-Fi credentials baked in at build time by `build.rs`

pub const WIFI_SSID: &str = env!("COMPASS_WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("COMPASS_WIFI_PASSWORD");
