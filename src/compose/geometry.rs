//! Page geometry for the two-column book layout.

use crate::layout::TextBox;

/// Axis-aligned rectangle in PDF points, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Largest rectangle with the given aspect ratio that fits inside,
    /// centered.
    pub fn fit(&self, content_width: f32, content_height: f32) -> Rect {
        if content_width <= 0.0 || content_height <= 0.0 {
            return *self;
        }
        let scale = (self.width / content_width).min(self.height / content_height);
        let width = content_width * scale;
        let height = content_height * scale;
        Rect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// Geometry and typography of a book page.
///
/// The page is split into two equal columns separated by a gutter, inside a
/// fixed margin. The left column holds the illustration, the right column a
/// rounded text panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    /// Page width in points
    pub page_width: f32,

    /// Page height in points
    pub page_height: f32,

    /// Outer page margin
    pub margin: f32,

    /// Gap between the two columns
    pub gutter: f32,

    /// Padding inside the text panel
    pub inner_margin: f32,

    /// Corner radius of the text panel
    pub panel_radius: f32,

    /// Body text size
    pub font_size: f32,

    /// Distance between body text baselines
    pub leading: f32,

    /// Page number footer text size
    pub footer_size: f32,

    /// Footer baseline offset above the column bottom
    pub footer_offset: f32,

    /// Footer gray level (0 = black, 1 = white)
    pub footer_gray: f32,
}

impl PageGeometry {
    /// Create geometry with the default book layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the outer margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the column gutter.
    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    /// Set the text panel padding.
    pub fn with_inner_margin(mut self, inner_margin: f32) -> Self {
        self.inner_margin = inner_margin;
        self
    }

    /// Set body font size and leading.
    pub fn with_font(mut self, size: f32, leading: f32) -> Self {
        self.font_size = size;
        self.leading = leading;
        self
    }

    /// Width of each column.
    pub fn column_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin - self.gutter) / 2.0
    }

    /// Height of both columns.
    pub fn column_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// The image column.
    pub fn image_column(&self) -> Rect {
        Rect::new(
            self.margin,
            self.margin,
            self.column_width(),
            self.column_height(),
        )
    }

    /// The text column.
    pub fn text_column(&self) -> Rect {
        Rect::new(
            self.margin + self.column_width() + self.gutter,
            self.margin,
            self.column_width(),
            self.column_height(),
        )
    }

    /// Area available to body text, centered on the text column.
    pub fn text_box(&self) -> TextBox {
        let column = self.text_column();
        TextBox {
            center_x: column.center_x(),
            center_y: column.center_y(),
            width: column.width - 2.0 * self.inner_margin,
            height: column.height - 2.0 * self.inner_margin,
        }
    }

    /// Right edge and baseline of the page number footer.
    pub fn footer_anchor(&self) -> (f32, f32) {
        let column = self.text_column();
        (
            column.right() - self.inner_margin,
            column.y + self.footer_offset,
        )
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 1536.0,
            page_height: 1024.0,
            margin: 64.0,
            gutter: 32.0,
            inner_margin: 44.0,
            panel_radius: 24.0,
            font_size: 34.0,
            leading: 46.0,
            footer_size: 18.0,
            footer_offset: 20.0,
            footer_gray: 0.35,
        }
    }
}
