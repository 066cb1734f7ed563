use serde::{Deserialize, Serialize};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 80;
/// Default bound on Wi-Fi association and address acquisition
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 20_000;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub connect_timeout_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub locale: Locale,
}

/// Language of the rendered page
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    PortugueseBrazil,
}

impl Locale {
    /// BCP 47 tag for the `lang` attribute
    pub const fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::PortugueseBrazil => "pt-BR",
        }
    }

    /// Parse a language tag. Only the primary subtag is significant.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or(tag);
        if primary.eq_ignore_ascii_case("en") {
            Some(Self::English)
        } else if primary.eq_ignore_ascii_case("pt") {
            Some(Self::PortugueseBrazil)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.connect_timeout_ms, 20_000);
        assert_eq!(config.page.locale, Locale::English);
    }

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("en"), Some(Locale::English));
        assert_eq!(Locale::from_tag("EN-us"), Some(Locale::English));
        assert_eq!(Locale::from_tag("pt-BR"), Some(Locale::PortugueseBrazil));
        assert_eq!(Locale::from_tag("pt_BR"), Some(Locale::PortugueseBrazil));
        assert_eq!(Locale::from_tag("de"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_locale_tag_round_trip() {
        for locale in [Locale::English, Locale::PortugueseBrazil] {
            assert_eq!(Locale::from_tag(locale.tag()), Some(locale));
        }
    }
}
