//! Injects Wi-Fi credentials as compile-time environment variables.
//!
//! Values come from the process environment first, then from a `.env` file
//! found by walking up from the crate directory:
//!
//! ```text
//! COMPASS_WIFI_SSID=my-network
//! COMPASS_WIFI_PASSWORD=hunter22
//! ```

const SSID_KEY: &str = "COMPASS_WIFI_SSID";
const PASSWORD_KEY: &str = "COMPASS_WIFI_PASSWORD";

fn main() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    println!("cargo:rerun-if-env-changed={SSID_KEY}");
    println!("cargo:rerun-if-env-changed={PASSWORD_KEY}");

    // Missing .env is fine as long as the variables are already set.
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    let (Ok(ssid), Ok(password)) = (std::env::var(SSID_KEY), std::env::var(PASSWORD_KEY)) else {
        eprintln!("error: Wi-Fi config missing. Set {SSID_KEY} and {PASSWORD_KEY} in .env or environment.");
        std::process::exit(1);
    };

    println!("cargo:rustc-env={SSID_KEY}={ssid}");
    println!("cargo:rustc-env={PASSWORD_KEY}={password}");
}
