//! SVG QR renderer.
//!
//! Encodes a login challenge with the `qrcode` crate and returns it as a
//! base64 `data:image/svg+xml` URL that an `<img>` tag can display directly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

use orderline_core::relay::QrRenderer;
use orderline_types::error::QrError;

const DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// Renders challenges as SVG QR codes.
#[derive(Debug, Clone)]
pub struct SvgQrRenderer {
    min_size: u32,
}

impl SvgQrRenderer {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        Self::new(280)
    }
}

impl QrRenderer for SvgQrRenderer {
    fn render(&self, challenge: &str) -> Result<String, QrError> {
        let code =
            QrCode::new(challenge.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_size, self.min_size)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();
        Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(image)))
    }
}
