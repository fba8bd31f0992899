use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{ForecastError, Result},
    model::Location,
};

use super::{DeviceLocationProvider, truncate_body};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Approximates the device position from its public IP address.
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    url: String,
    http: Client,
}

impl IpLocationProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ForecastError::Transport {
                endpoint: "HTTP client setup",
                source,
            })?;

        Ok(Self {
            url: DEFAULT_IP_LOOKUP_URL.to_string(),
            http,
        })
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    country_code: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_location(self) -> Result<Location> {
        if self.status != "success" {
            return Err(ForecastError::validation(format!(
                "IP lookup failed: {}",
                self.message.as_deref().unwrap_or("unknown reason")
            )));
        }

        const CTX: &str = "IP lookup response";
        let lat = self.lat.ok_or_else(|| ForecastError::missing("lat", CTX))?;
        let lon = self.lon.ok_or_else(|| ForecastError::missing("lon", CTX))?;

        Ok(match self.city {
            Some(name) => Location {
                name,
                country: self.country_code.unwrap_or_default(),
                state: self.region_name.filter(|r| !r.is_empty()),
                lat,
                lon,
            },
            None => Location::from_coordinates(lat, lon),
        })
    }
}

#[async_trait]
impl DeviceLocationProvider for IpLocationProvider {
    async fn locate(&self) -> Result<Location> {
        const ENDPOINT: &str = "IP location";
        log::debug!("GET {} ({ENDPOINT})", self.url);

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|source| ForecastError::Transport { endpoint: ENDPOINT, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ForecastError::Transport { endpoint: ENDPOINT, source })?;

        if !status.is_success() {
            return Err(ForecastError::Status {
                endpoint: ENDPOINT,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: IpApiResponse = serde_json::from_str(&body)
            .map_err(|source| ForecastError::Decode { endpoint: ENDPOINT, source })?;

        let location = parsed.into_location()?;
        log::info!("Device located near {}", location.display_name());
        Ok(location)
    }
}
