use std::env;

#[derive(Clone, Debug)]
pub struct GeocoderConfig {
    pub provider: String,
    pub api_key: String,
    pub base_url: String,
}

impl GeocoderConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env::var("GEOCODER_PROVIDER").unwrap_or_else(|_| "mapquest".to_string()),
            api_key: env::var("GEOCODER_API_KEY").unwrap_or_default(),
            base_url: env::var("GEOCODER_BASE_URL")
                .unwrap_or_else(|_| "https://www.mapquestapi.com".to_string()),
        }
    }
}
