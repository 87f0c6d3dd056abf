//! Plan prompt template rendering.
//!
//! Templates use `{NAME}` placeholders; `{{` and `}}` produce literal braces,
//! so a JSON example can be embedded in the template.

use crate::error::{Error, Result};

/// Style applied to every illustration unless the plan overrides it.
pub const DEFAULT_STYLE_BIBLE: &str = "温かい絵本の挿絵。やわらかい水彩、やさしいパステル、\
クリーンな輪郭線、安心感のある光、子ども向け、過度に写実的にしない。";

/// Template used when no `prompt.txt` is present.
pub const DEFAULT_PLAN_TEMPLATE: &str = r#"あなたは絵本編集者です。
次の会話ログをもとに、{TARGET_AGE}歳向け・{PAGE_COUNT}ページの絵本を{LANGUAGE}で構成してください。
挿絵のスタイル: {STYLE_BIBLE}

次の形式のJSONだけを出力してください。
{{
  "title": "...",
  "target_age": "{TARGET_AGE}",
  "page_count": {PAGE_COUNT},
  "style_bible": "...",
  "characters": [{{"name": "...", "description": "..."}}],
  "pages": [
    {{
      "page": 1,
      "text": "...",
      "scene_summary": "...",
      "must_have": ["..."],
      "camera": "...",
      "image_prompt_api": "...",
      "image_prompt_fallback": "...",
      "negative_prompt": "..."
    }}
  ]
}}

会話ログ:
"""{transcript}"""
"#;

/// Parameters substituted into the plan prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPrompt {
    /// Intended reader age
    pub target_age: String,
    /// Number of pages to plan
    pub page_count: u32,
    /// Illustration style
    pub style_bible: String,
    /// Language of the book text
    pub language: String,
}

impl PlanPrompt {
    /// Create the default prompt parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target age.
    pub fn with_target_age(mut self, age: impl Into<String>) -> Self {
        self.target_age = age.into();
        self
    }

    /// Set the page count.
    pub fn with_page_count(mut self, count: u32) -> Self {
        self.page_count = count;
        self
    }

    /// Set the style bible.
    pub fn with_style_bible(mut self, style: impl Into<String>) -> Self {
        self.style_bible = style.into();
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Render `template` with these parameters and the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] for unknown placeholders, an unclosed `{`,
    /// or a lone `}`.
    pub fn render(&self, template: &str, transcript: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len() + transcript.len());
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => {
                                return Err(Error::Template(format!(
                                    "unclosed placeholder '{{{}'",
                                    name
                                )))
                            }
                        }
                    }
                    match name.as_str() {
                        "TARGET_AGE" => out.push_str(&self.target_age),
                        "PAGE_COUNT" => out.push_str(&self.page_count.to_string()),
                        "STYLE_BIBLE" => out.push_str(&self.style_bible),
                        "LANGUAGE" => out.push_str(&self.language),
                        "transcript" => out.push_str(transcript),
                        other => {
                            return Err(Error::Template(format!(
                                "unknown placeholder '{{{}}}'",
                                other
                            )))
                        }
                    }
                }
                '}' => return Err(Error::Template("single '}' in template".to_string())),
                c => out.push(c),
            }
        }

        Ok(out)
    }
}

impl Default for PlanPrompt {
    fn default() -> Self {
        Self {
            target_age: "12-15".to_string(),
            page_count: 10,
            style_bible: DEFAULT_STYLE_BIBLE.to_string(),
            language: "ja".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let prompt = PlanPrompt::new().with_page_count(4).with_target_age("6-8");
        let out = prompt
            .render("{PAGE_COUNT} pages for {TARGET_AGE} in {LANGUAGE}: {transcript}", "hi")
            .unwrap();
        assert_eq!(out, "4 pages for 6-8 in ja: hi");
    }

    #[test]
    fn test_render_escaped_braces() {
        let out = PlanPrompt::new()
            .render(r#"{{"page_count": {PAGE_COUNT}}}"#, "")
            .unwrap();
        assert_eq!(out, r#"{"page_count": 10}"#);
    }

    #[test]
    fn test_transcript_braces_untouched() {
        let out = PlanPrompt::new().render("{transcript}", "{x}").unwrap();
        assert_eq!(out, "{x}");
    }

    #[test]
    fn test_render_errors() {
        let prompt = PlanPrompt::new();
        assert!(matches!(prompt.render("{nope}", ""), Err(Error::Template(_))));
        assert!(matches!(prompt.render("{open", ""), Err(Error::Template(_))));
        assert!(matches!(prompt.render("close}", ""), Err(Error::Template(_))));
    }

    #[test]
    fn test_default_template_renders() {
        let out = PlanPrompt::new()
            .render(DEFAULT_PLAN_TEMPLATE, "会話")
            .unwrap();
        assert!(out.contains("\"page_count\": 10"));
        assert!(out.contains("\"\"\"会話\"\"\""));
        assert!(out.contains(DEFAULT_STYLE_BIBLE));
    }
}
