use crate::domain::model::{IssPosition, TileCoord};
use crate::utils::error::{IssError, Result};
use chrono::Utc;
use image::RgbImage;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ISS_ENDPOINT: &str = "http://api.open-notify.org/iss-now.json";

/// open-notify 把座標包成字串，其他來源可能給數字
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn parse(&self, field: &str) -> Result<f64> {
        match self {
            Coordinate::Number(value) => Ok(*value),
            Coordinate::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|e| IssError::PositionError {
                        message: format!("{} '{}' is not a number: {}", field, text, e),
                    })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    latitude: Coordinate,
    longitude: Coordinate,
}

#[derive(Debug, Deserialize)]
struct IssNowResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    iss_position: RawPosition,
}

/// 解析 iss-now.json 的回應內容
pub fn parse_position(body: &str) -> Result<IssPosition> {
    let response: IssNowResponse = serde_json::from_str(body)?;

    if let Some(message) = response.message.as_deref() {
        if message != "success" {
            return Err(IssError::PositionError {
                message: format!("endpoint reported '{}'", message),
            });
        }
    }

    let latitude = response.iss_position.latitude.parse("latitude")?;
    let longitude = response.iss_position.longitude.parse("longitude")?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(IssError::PositionError {
            message: format!("latitude {} is outside [-90, 90]", latitude),
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(IssError::PositionError {
            message: format!("longitude {} is outside [-180, 180]", longitude),
        });
    }

    Ok(IssPosition {
        latitude,
        longitude,
        timestamp: response.timestamp,
        observed_at: Utc::now(),
    })
}

/// ISS 位置與衛星圖磚共用的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct MapClient {
    client: Client,
}

impl MapClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("where-iss/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch_position(&self, endpoint: &str) -> Result<IssPosition> {
        tracing::debug!("Querying ISS position from: {}", endpoint);
        let response = self.client.get(endpoint).send().await?;
        let status = response.status();
        tracing::debug!("ISS endpoint status: {}", status);

        if !status.is_success() {
            return Err(IssError::ApiStatusError {
                url: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_position(&body)
    }

    /// 下載並解碼一張圖磚。錯誤訊息不帶 URL，因為 URL 裡有 access token
    pub async fn fetch_tile(&self, tile: &TileCoord, url: &str) -> Result<RgbImage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IssError::from(e.without_url()))?;
        let status = response.status();

        if !status.is_success() {
            return Err(IssError::TileError {
                zoom: tile.zoom,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IssError::from(e.without_url()))?;
        tracing::debug!("Downloaded tile {}/{}/{} ({} bytes)", tile.zoom, tile.x, tile.y, bytes.len());
        let decoded = image::load_from_memory(&bytes)?;
        Ok(decoded.into_rgb8())
    }
}
