//! Text layout engine.
//!
//! Wraps page text into lines that fit a fixed-width text box, truncates the
//! lines to what the box height can hold, and centers the block vertically.
//!
//! Wrapping is character-granular: Japanese text has no reliable word
//! boundaries, so lines are filled one character at a time using measured
//! widths. Coordinates follow PDF conventions (y grows upwards).
//!
//! ```
//! use storyshelf::layout::{wrap_text, MonospaceMetrics};
//!
//! let metrics = MonospaceMetrics::new(1000.0);
//! let lines = wrap_text("おはよう", 20.0, 10.0, &metrics);
//! assert_eq!(lines, vec!["おは", "よう"]);
//! ```

mod metrics;

pub use metrics::{CidFontMetrics, FontMetrics, MonospaceMetrics, FULL_WIDTH, HALF_WIDTH};

/// How a wrapped line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// The next character did not fit
    Soft,
    /// An explicit newline in the input
    Hard,
    /// End of input
    End,
}

/// One wrapped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Characters on the line
    pub text: String,
    /// What ended the line
    pub break_after: LineBreak,
}

impl Line {
    fn new(text: String, break_after: LineBreak) -> Self {
        Self { text, break_after }
    }
}

/// Wrap `text` into lines no wider than `max_width` at `size` points.
///
/// A newline always ends the current line, so blank lines come out as empty
/// lines. Carriage returns are dropped. A character wider than `max_width`
/// on its own is emitted alone on its line rather than dropped. Empty input
/// yields no lines.
pub fn wrap_lines(text: &str, max_width: f32, size: f32, metrics: &dyn FontMetrics) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch == '\r' {
            continue;
        }
        if ch == '\n' {
            lines.push(Line::new(std::mem::take(&mut current), LineBreak::Hard));
            continue;
        }

        current.push(ch);
        if metrics.string_width(&current, size) <= max_width {
            continue;
        }

        current.pop();
        if current.is_empty() {
            // Too wide even alone: give it a line of its own.
            lines.push(Line::new(ch.to_string(), LineBreak::Soft));
        } else {
            lines.push(Line::new(std::mem::take(&mut current), LineBreak::Soft));
            current.push(ch);
        }
    }

    if !current.is_empty() {
        lines.push(Line::new(current, LineBreak::End));
    } else if let Some(last) = lines.last_mut() {
        if last.break_after == LineBreak::Soft {
            last.break_after = LineBreak::End;
        }
    }

    lines
}

/// Wrap `text` and return only the line strings.
pub fn wrap_text(text: &str, max_width: f32, size: f32, metrics: &dyn FontMetrics) -> Vec<String> {
    wrap_lines(text, max_width, size, metrics)
        .into_iter()
        .map(|line| line.text)
        .collect()
}

/// Number of lines of height `line_height` that fit in `box_height`.
///
/// Degenerate line heights (zero, negative, or not finite) fit no lines.
pub fn max_lines(box_height: f32, line_height: f32) -> usize {
    if !line_height.is_finite() || line_height <= 0.0 || box_height.is_nan() || box_height <= 0.0 {
        return 0;
    }
    (box_height / line_height).floor() as usize
}

/// A rectangular text area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    /// Horizontal center
    pub center_x: f32,
    /// Vertical center
    pub center_y: f32,
    /// Usable width for lines
    pub width: f32,
    /// Usable height for lines
    pub height: f32,
}

/// Lines placed inside a text box.
///
/// Recomputed every time a page is composed; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    /// Lines in reading order
    pub lines: Vec<String>,
    /// Distance between consecutive baselines
    pub line_height: f32,
    /// Distance from the first to the last baseline
    pub block_height: f32,
    /// Baseline of the first line
    pub start_baseline_y: f32,
}

impl LayoutBlock {
    /// Center `lines` vertically around `center_y`.
    ///
    /// The first baseline sits at `center_y + block_height / 2` and each
    /// following line one `line_height` lower. Empty and single-line blocks
    /// have zero height, so their baseline is the center itself.
    pub fn centered(lines: Vec<String>, line_height: f32, center_y: f32) -> Self {
        let block_height = lines.len().saturating_sub(1) as f32 * line_height;
        Self {
            lines,
            line_height,
            block_height,
            start_baseline_y: center_y + block_height / 2.0,
        }
    }

    /// Check if the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate lines with their baseline y coordinates.
    pub fn baselines(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (line.as_str(), self.start_baseline_y - i as f32 * self.line_height))
    }
}

/// Wrap, truncate, and vertically center `text` inside `text_box`.
///
/// Lines beyond what the box can hold are dropped; one logical page always
/// maps to one physical page.
pub fn layout_text(
    text: &str,
    text_box: &TextBox,
    size: f32,
    line_height: f32,
    metrics: &dyn FontMetrics,
) -> LayoutBlock {
    let mut lines = wrap_text(text, text_box.width, size, metrics);
    let fit = max_lines(text_box.height, line_height);
    if lines.len() > fit {
        log::debug!("Truncating text block from {} to {} lines", lines.len(), fit);
        lines.truncate(fit);
    }
    LayoutBlock::centered(lines, line_height, text_box.center_y)
}
