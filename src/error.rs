/// Reasons a font payload could not be turned into a [`crate::font_handle::FontHandle`].
#[derive(thiserror::Error, Debug)]
pub enum FontParseError {
    #[error("payload does not contain any font face")]
    NoFace,

    #[error("failed to parse font face: {0}")]
    Face(#[from] ttf_parser::FaceParsingError),

    #[error("font could not be prepared for measuring: {0}")]
    Rasterizer(&'static str),
}

/// Errors produced while fetching and parsing a font resource.
///
/// `Fetch` and `HttpStatus` mean the bytes never arrived; `HtmlPayload` and
/// `Format` mean something arrived but it was not a font.
#[derive(thiserror::Error, Debug)]
pub enum FontLoadError {
    #[error("failed to fetch font from {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("font request for {locator} returned HTTP {status}")]
    HttpStatus { locator: String, status: u16 },

    #[error("expected font data from {locator} but received an HTML document")]
    HtmlPayload { locator: String },

    #[error("font data from {locator} could not be parsed")]
    Format {
        locator: String,
        #[source]
        source: FontParseError,
    },
}

impl FontLoadError {
    /// The resource could not be retrieved (network/io failure or non-2xx status).
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::HttpStatus { .. })
    }

    /// The resource was retrieved but is not usable font data.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::HtmlPayload { .. } | Self::Format { .. })
    }

    /// Locator of the font that failed to load.
    pub fn locator(&self) -> &str {
        match self {
            Self::Fetch { locator, .. }
            | Self::HttpStatus { locator, .. }
            | Self::HtmlPayload { locator }
            | Self::Format { locator, .. } => locator,
        }
    }
}

/// Rejected configuration option.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("invalid value `{value}` for option `{option}`")]
    InvalidValue { option: String, value: String },
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_fetch_and_format_errors() {
        let status = FontLoadError::HttpStatus {
            locator: "/fonts/a.ttf".into(),
            status: 404,
        };
        assert!(status.is_fetch_error());
        assert!(!status.is_format_error());
        assert_eq!(status.locator(), "/fonts/a.ttf");

        let html = FontLoadError::HtmlPayload {
            locator: "/fonts/b.ttf".into(),
        };
        assert!(html.is_format_error());
        assert!(!html.is_fetch_error());

        let format = FontLoadError::Format {
            locator: "c".into(),
            source: FontParseError::NoFace,
        };
        assert!(format.is_format_error());
        assert_eq!(
            format.to_string(),
            "font data from c could not be parsed".to_string()
        );
    }
}
