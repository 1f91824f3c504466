//! Latitude/longitude to slippy-map tile conversion and tile URL building.

use crate::domain::model::TileCoord;
use std::f64::consts::PI;

/// Web Mercator 可投影的最大緯度
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

pub const DEFAULT_TILE_ENDPOINT: &str =
    "https://api.mapbox.com/v4/mapbox.satellite/{z}/{x}/{y}@2x.jpg90?access_token={token}";

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// 將經緯度轉成指定縮放等級的圖磚編號
    pub fn from_lat_lon(latitude: f64, longitude: f64, zoom: u8) -> Self {
        let lat_rad = latitude
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let n = 2_f64.powi(zoom as i32);
        let max_index = n - 1.0;

        let x = ((longitude + 180.0) / 360.0 * n).floor().clamp(0.0, max_index);
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
            .floor()
            .clamp(0.0, max_index);

        Self::new(x as u32, y as u32, zoom)
    }

    /// 填入 `{z}`、`{x}`、`{y}`、`{token}`
    pub fn url(&self, template: &str, token: Option<&str>) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
            .replace("{token}", token.unwrap_or_default())
    }
}

pub fn template_needs_token(template: &str) -> bool {
    template.contains("{token}")
}

/// Hide the access token before a URL goes to the log
pub fn redact_token(url: &str, token: Option<&str>) -> String {
    match token {
        Some(token) if !token.is_empty() => url.replace(token, "***"),
        _ => url.to_string(),
    }
}

/// Zoom levels the retry loop walks, highest first
pub fn zoom_sequence(max_zoom: u8, min_zoom: u8) -> impl Iterator<Item = u8> {
    (min_zoom..=max_zoom).rev()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_lands_in_center_tile() {
        let tile = TileCoord::from_lat_lon(0.0, 0.0, 10);
        assert_eq!(tile, TileCoord::new(512, 512, 10));
    }

    #[test]
    fn test_known_city_tiles() {
        // Berlin at zoom 10, matching the OpenStreetMap wiki reference
        let berlin = TileCoord::from_lat_lon(52.52, 13.405, 10);
        assert_eq!((berlin.x, berlin.y), (550, 335));

        let sydney = TileCoord::from_lat_lon(-33.8688, 151.2093, 8);
        assert_eq!((sydney.x, sydney.y), (235, 153));
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        let tile = TileCoord::from_lat_lon(51.6, -120.0, 0);
        assert_eq!(tile, TileCoord::new(0, 0, 0));
    }

    #[test]
    fn test_edges_stay_inside_grid() {
        let east = TileCoord::from_lat_lon(0.0, 180.0, 4);
        assert_eq!(east.x, 15);

        let north = TileCoord::from_lat_lon(90.0, 0.0, 4);
        assert_eq!(north.y, 0);
        let south = TileCoord::from_lat_lon(-90.0, 0.0, 4);
        assert_eq!(south.y, 15);
    }

    #[test]
    fn test_url_substitution() {
        let tile = TileCoord::new(550, 335, 10);
        let url = tile.url(DEFAULT_TILE_ENDPOINT, Some("pk.abc"));
        assert_eq!(
            url,
            "https://api.mapbox.com/v4/mapbox.satellite/10/550/335@2x.jpg90?access_token=pk.abc"
        );
        assert!(template_needs_token(DEFAULT_TILE_ENDPOINT));
        assert!(!template_needs_token("https://tile.openstreetmap.org/{z}/{x}/{y}.png"));
    }

    #[test]
    fn test_redact_token() {
        let url = "https://api.mapbox.com/v4/x.jpg?access_token=pk.secret";
        assert_eq!(
            redact_token(url, Some("pk.secret")),
            "https://api.mapbox.com/v4/x.jpg?access_token=***"
        );
        assert_eq!(redact_token(url, None), url);
    }

    #[test]
    fn test_zoom_sequence_counts_down() {
        let zooms: Vec<u8> = zoom_sequence(10, 5).collect();
        assert_eq!(zooms, vec![10, 9, 8, 7, 6, 5]);
        assert_eq!(zoom_sequence(3, 3).count(), 1);
        assert_eq!(zoom_sequence(3, 4).count(), 0);
    }
}
