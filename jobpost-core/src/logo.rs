//! Logo Source - Fetch or Synthesize a Company Logo
//!
//! A `LogoSource` never fails: any fetch or decode problem yields the
//! deterministic placeholder disk.

use std::time::Duration;

use image::{Rgba, RgbaImage};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_LOGO_ENDPOINT: &str = "https://logo.clearbit.com";
pub const DEFAULT_LOGO_TIMEOUT: Duration = Duration::from_secs(5);

const PLACEHOLDER_SIZE: u32 = 100;
const PLACEHOLDER_FILL: Rgba<u8> = Rgba([200, 200, 200, 255]);
const PLACEHOLDER_DISK: Rgba<u8> = Rgba([150, 150, 150, 255]);

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Logo request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Logo server answered {0}")]
    Status(StatusCode),

    #[error("Logo body is not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

pub trait LogoSource: Send + Sync {
    fn fetch(&self, company: &str) -> RgbaImage;
}

/// Gray square with a darker inscribed disk.
pub fn placeholder_logo() -> RgbaImage {
    let centre = PLACEHOLDER_SIZE as i64 / 2;
    let radius = 40i64;
    RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
        let dx = x as i64 - centre;
        let dy = y as i64 - centre;
        if dx * dx + dy * dy <= radius * radius {
            PLACEHOLDER_DISK
        } else {
            PLACEHOLDER_FILL
        }
    })
}

/// Domain slug for a company name: spaces removed, lowercased.
pub fn company_slug(company: &str) -> String {
    company.replace(' ', "").to_lowercase()
}

/// Always returns the placeholder; used offline and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderLogoSource;

impl LogoSource for PlaceholderLogoSource {
    fn fetch(&self, _company: &str) -> RgbaImage {
        placeholder_logo()
    }
}

/// Fetches `{endpoint}/{slug}.com` once, no retries.
pub struct HttpLogoSource {
    client: Client,
    endpoint: String,
}

impl HttpLogoSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LogoError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LogoError::Client)?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn logo_url(&self, company: &str) -> String {
        format!("{}/{}.com", self.endpoint, company_slug(company))
    }

    /// One GET of `url`, decoded to RGBA. No retries, no placeholder.
    pub fn fetch_url(&self, url: &str) -> Result<RgbaImage, LogoError> {
        let response = self.client.get(url).send().map_err(LogoError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LogoError::Status(status));
        }
        let bytes = response.bytes().map_err(LogoError::Request)?;
        let decoded = image::load_from_memory(&bytes)?;
        Ok(decoded.to_rgba8())
    }
}

impl LogoSource for HttpLogoSource {
    fn fetch(&self, company: &str) -> RgbaImage {
        let url = self.logo_url(company);
        match self.fetch_url(&url) {
            Ok(logo) => {
                debug!(%url, width = logo.width(), height = logo.height(), "fetched logo");
                logo
            }
            Err(error) => {
                warn!(%url, %error, "logo fetch failed; using placeholder");
                placeholder_logo()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_deterministic() {
        assert_eq!(placeholder_logo(), placeholder_logo());
    }

    #[test]
    fn test_placeholder_layout() {
        let logo = placeholder_logo();
        assert_eq!(logo.dimensions(), (100, 100));
        assert_eq!(*logo.get_pixel(0, 0), PLACEHOLDER_FILL);
        assert_eq!(*logo.get_pixel(50, 50), PLACEHOLDER_DISK);
        assert_eq!(*logo.get_pixel(50, 11), PLACEHOLDER_DISK);
        assert_eq!(*logo.get_pixel(50, 5), PLACEHOLDER_FILL);
    }

    #[test]
    fn test_company_slug() {
        assert_eq!(company_slug("Indian Army"), "indianarmy");
        assert_eq!(company_slug("BEL"), "bel");
    }

    #[test]
    fn test_logo_url_trims_endpoint_slash() {
        let source = HttpLogoSource::new("http://localhost:9/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.logo_url("Open AI"), "http://localhost:9/openai.com");
    }

    #[test]
    fn test_unreachable_endpoint_yields_placeholder() {
        let source = HttpLogoSource::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert_eq!(source.fetch("Nobody"), placeholder_logo());
    }

    #[test]
    fn test_unreachable_endpoint_is_a_request_error() {
        let source = HttpLogoSource::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = source.fetch_url(&source.logo_url("Nobody")).unwrap_err();
        assert!(matches!(err, LogoError::Request(_)), "{err:?}");
    }
}
