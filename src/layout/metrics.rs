//! Font metrics used to measure text before placing it.

/// Glyph advance widths for a font, in 1/1000 em units.
pub trait FontMetrics: Send + Sync {
    /// Advance width of a single character in 1/1000 em.
    fn advance(&self, ch: char) -> f32;

    /// Rendered width of `text` at `size` points.
    fn string_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = text.chars().map(|c| self.advance(c)).sum();
        units * size / 1000.0
    }
}

/// Full-width advance for CJK glyphs.
pub const FULL_WIDTH: f32 = 1000.0;

/// Half-width advance for ASCII and half-width katakana.
pub const HALF_WIDTH: f32 = 500.0;

/// Metrics of the built-in Japanese CID font (HeiseiKakuGo-W5).
///
/// Printable ASCII and half-width katakana are half-width; everything else
/// is full-width. The PDF font dictionary declares the same widths (see
/// [`CidFontMetrics::pdf_widths`]) so measured and rendered widths agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CidFontMetrics;

impl CidFontMetrics {
    /// PostScript name of the font.
    pub const BASE_FONT: &'static str = "HeiseiKakuGo-W5";

    /// Horizontal CMap mapping UTF-16 code units to Adobe-Japan1 CIDs.
    pub const ENCODING: &'static str = "UniJIS-UTF16-H";

    /// Check whether a character is drawn half-width.
    pub fn is_half_width(ch: char) -> bool {
        matches!(ch, '\u{20}'..='\u{7e}' | '\u{ff61}'..='\u{ff9f}')
    }

    /// CID ranges and widths for the font's `/W` array, as
    /// `(first_cid, last_cid, width)`.
    ///
    /// Adobe-Japan1 places proportional ASCII at CIDs 1-95 and half-width
    /// katakana at CIDs 327-389.
    pub fn pdf_widths() -> [(i64, i64, i64); 2] {
        [(1, 95, HALF_WIDTH as i64), (327, 389, HALF_WIDTH as i64)]
    }
}

impl FontMetrics for CidFontMetrics {
    fn advance(&self, ch: char) -> f32 {
        if Self::is_half_width(ch) {
            HALF_WIDTH
        } else {
            FULL_WIDTH
        }
    }
}

/// Every character has the same advance. Useful for tests and monospace fonts.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    advance: f32,
}

impl MonospaceMetrics {
    /// Create metrics with a fixed advance in 1/1000 em.
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(FULL_WIDTH)
    }
}

impl FontMetrics for MonospaceMetrics {
    fn advance(&self, _ch: char) -> f32 {
        self.advance
    }
}
