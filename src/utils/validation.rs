use crate::utils::error::{IssError, Result};
use url::Url;

/// Web Mercator tile servers stop at zoom 22
pub const MAX_TILE_ZOOM: u8 = 22;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 驗證 URL，允許帶有 `{z}` 等模板佔位符
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(IssError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 驗證圖磚模板：必須含有 `{z}`、`{x}`、`{y}`
pub fn validate_tile_template(field_name: &str, template: &str) -> Result<()> {
    for placeholder in ["{z}", "{x}", "{y}"] {
        if !template.contains(placeholder) {
            return Err(IssError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Tile URL template is missing {}", placeholder),
            });
        }
    }

    let probe = template
        .replace("{z}", "0")
        .replace("{x}", "0")
        .replace("{y}", "0")
        .replace("{token}", "token");
    validate_url(field_name, &probe)
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_zoom_range(max_zoom: u8, min_zoom: u8) -> Result<()> {
    validate_range("processing.max_zoom", max_zoom, 0, MAX_TILE_ZOOM)?;
    validate_range("processing.min_zoom", min_zoom, 0, MAX_TILE_ZOOM)?;

    if min_zoom > max_zoom {
        return Err(IssError::InvalidConfigValueError {
            field: "processing.min_zoom".to_string(),
            value: min_zoom.to_string(),
            reason: format!("Must not exceed processing.max_zoom ({})", max_zoom),
        });
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a positive number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| IssError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(IssError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://example.com").is_ok());
        assert!(validate_url("source.endpoint", "http://api.open-notify.org/iss-now.json").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "invalid-url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_tile_template() {
        assert!(validate_tile_template(
            "tiles.endpoint",
            "https://api.mapbox.com/v4/mapbox.satellite/{z}/{x}/{y}@2x.jpg90?access_token={token}"
        )
        .is_ok());
        assert!(validate_tile_template("tiles.endpoint", "https://tile.example.com/{z}/{x}.png").is_err());
        assert!(validate_tile_template("tiles.endpoint", "tiles/{z}/{x}/{y}.png").is_err());
    }

    #[test]
    fn test_validate_zoom_range() {
        assert!(validate_zoom_range(10, 5).is_ok());
        assert!(validate_zoom_range(5, 5).is_ok());
        assert!(validate_zoom_range(5, 10).is_err());
        assert!(validate_zoom_range(23, 5).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("processing.contrast", 3.0).is_ok());
        assert!(validate_positive("processing.contrast", 0.0).is_err());
        assert!(validate_positive("processing.contrast", f32::NAN).is_err());
    }
}
