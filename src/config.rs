//! Provider configuration from CLI flags and environment variables.

use crate::location::{
    ForwardGeocodeCache, GeocodeProvider, GeocodingClient, GoogleGeocoder, HttpSettings,
    IpPositionSource, NominatimGeocoder, PositionSource,
};
use clap::{Args, ValueEnum};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which geocoding backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Google,
    Nominatim,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Nominatim => write!(f, "nominatim"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The google provider needs an API key (--google-api-key or GOOGLE_MAPS_API_KEY)")]
    MissingApiKey,
    #[error("HTTP timeout must be at least one second")]
    ZeroTimeout,
}

/// Geocoding settings shared by the CLI and the server.
#[derive(Debug, Clone, Args)]
pub struct GeoConfig {
    /// Geocoding backend.
    #[arg(long, value_enum, env = "LOCATOR_PROVIDER", default_value_t = ProviderKind::Nominatim)]
    pub provider: ProviderKind,

    /// Override the provider endpoint (Google: full geocode URL, Nominatim: base URL).
    #[arg(long, env = "LOCATOR_GEOCODER_URL")]
    pub geocoder_url: Option<String>,

    /// Google Maps API key.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Preferred response language.
    #[arg(long, env = "LOCATOR_LANGUAGE", default_value = "sv")]
    pub language: String,

    /// User-Agent sent to providers.
    #[arg(long, env = "LOCATOR_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "LOCATOR_HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// IP geolocation endpoint used for the current position.
    #[arg(long, env = "LOCATOR_IP_URL")]
    pub ip_url: Option<String>,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Nominatim,
            geocoder_url: None,
            google_api_key: None,
            language: "sv".into(),
            user_agent: None,
            http_timeout_secs: 10,
            ip_url: None,
        }
    }
}

impl GeoConfig {
    pub fn http_settings(&self) -> Result<HttpSettings, ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let mut http = HttpSettings {
            timeout: Duration::from_secs(self.http_timeout_secs),
            ..HttpSettings::default()
        };
        if let Some(ua) = &self.user_agent {
            http.user_agent = ua.clone();
        }
        Ok(http)
    }

    pub fn build_provider(&self) -> Result<Arc<dyn GeocodeProvider>, ConfigError> {
        let http = self.http_settings()?;
        let provider: Arc<dyn GeocodeProvider> = match self.provider {
            ProviderKind::Google => {
                let key = self
                    .google_api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ConfigError::MissingApiKey)?;
                let mut g = GoogleGeocoder::new(key, &http).with_language(&self.language);
                if let Some(url) = &self.geocoder_url {
                    g = g.with_base_url(url);
                }
                Arc::new(g)
            }
            ProviderKind::Nominatim => {
                let mut n = NominatimGeocoder::new(&http).with_language(&self.language);
                if let Some(url) = &self.geocoder_url {
                    n = n.with_base_url(url);
                }
                Arc::new(n)
            }
        };
        Ok(provider)
    }

    pub fn position_source(&self) -> Result<Arc<dyn PositionSource>, ConfigError> {
        let mut ip = IpPositionSource::new(&self.http_settings()?);
        if let Some(url) = &self.ip_url {
            ip = ip.with_url(url);
        }
        Ok(Arc::new(ip))
    }

    /// A client with a fresh cache and the IP position source attached.
    pub fn build_client(&self) -> Result<GeocodingClient, ConfigError> {
        Ok(
            GeocodingClient::new(self.build_provider()?, ForwardGeocodeCache::new())
                .with_position_source(self.position_source()?),
        )
    }
}
