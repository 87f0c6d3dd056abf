//! HTML views for the static site.
//!
//! Each page is a small typed view model rendered with `maud`; every
//! interpolated value is escaped. The reader page loads `book_plan.json` at
//! view time, so it works on any static host without a build step.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::catalog::CatalogEntry;

const BASE_CSS: &str = r#"
body{font-family:system-ui,-apple-system,"Segoe UI",sans-serif;margin:0;background:#f6f6f6}
header{padding:16px 20px;background:#fff;border-bottom:1px solid #eee;display:flex;gap:12px;align-items:center;flex-wrap:wrap}
h1{font-size:16px;margin:0}
a{color:#0b57d0;text-decoration:none}
.card{background:#fff;border:1px solid #eee;border-radius:16px;padding:14px;box-shadow:0 1px 6px rgba(0,0,0,.04)}
.meta{color:#666;font-size:13px}
"#;

const VIEWER_CSS: &str = r#"
main{max-width:1100px;margin:18px auto;padding:0 16px;display:grid;grid-template-columns:1fr 1fr;gap:16px}
img{width:100%;height:auto;border-radius:12px;border:1px solid #eee;background:#fafafa}
.controls{display:flex;gap:8px;align-items:center;flex-wrap:wrap}
button{padding:10px 12px;border:1px solid #ddd;border-radius:12px;background:#fff;cursor:pointer}
button:disabled{opacity:.5;cursor:not-allowed}
.text{font-size:18px;line-height:1.75;white-space:pre-wrap}
@media (max-width:900px){main{grid-template-columns:1fr}}
"#;

const VIEWER_JS: &str = r#"
const state = { plan: null, idx: 0 };
const el = {
  title: document.getElementById('title'),
  prev: document.getElementById('prev'),
  next: document.getElementById('next'),
  pageInfo: document.getElementById('pageInfo'),
  pageImg: document.getElementById('pageImg'),
  pageText: document.getElementById('pageText'),
  scene: document.getElementById('scene'),
};

function pad2(n){ return String(n).padStart(2, '0'); }

function render(){
  const pages = state.plan.pages;
  const p = pages[state.idx];
  const total = pages.length;

  el.title.textContent = state.plan.title || el.title.textContent;
  el.pageInfo.textContent = `${p.page}/${total}`;
  el.pageImg.src = `pages/${pad2(p.page)}.png`;
  el.pageText.textContent = p.text || '';
  el.scene.textContent = p.scene_summary ? `Scene: ${p.scene_summary}` : '';
  el.prev.disabled = state.idx === 0;
  el.next.disabled = state.idx === total - 1;
}

function go(delta){
  const next = state.idx + delta;
  if (next < 0 || next >= state.plan.pages.length) return;
  state.idx = next;
  render();
}

async function init(){
  const res = await fetch('book_plan.json', { cache: 'no-store' });
  if (!res.ok) throw new Error('book_plan.json が読めません');
  state.plan = await res.json();
  state.idx = 0;

  window.addEventListener('keydown', (e) => {
    if (e.key === 'ArrowLeft') go(-1);
    if (e.key === 'ArrowRight') go(1);
  });
  el.prev.addEventListener('click', () => go(-1));
  el.next.addEventListener('click', () => go(1));
  render();
}

init().catch(err => {
  const pre = document.createElement('pre');
  pre.style.padding = '20px';
  pre.textContent = `Error: ${err.message}`;
  document.body.replaceChildren(pre);
});
"#;

const DETAILS_CSS: &str = r#"
.wrap{max-width:1100px;margin:18px auto;padding:0 16px}
.grid{display:grid;grid-template-columns:1fr 1fr;gap:14px;margin-top:14px}
h2{font-size:14px;margin:0 0 10px}
pre{white-space:pre-wrap;word-break:break-word;margin:0;font-size:12px;line-height:1.6}
@media (max-width:900px){.grid{grid-template-columns:1fr}}
"#;

const SHELF_CSS: &str = r#"
body{font-family:system-ui,-apple-system,"Segoe UI",sans-serif;margin:0;background:#f6f6f6}
header{padding:18px 20px;background:#fff;border-bottom:1px solid #eee}
h1{font-size:18px;margin:0}
.wrap{max-width:1200px;margin:18px auto;padding:0 16px}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:14px}
.card{background:#fff;border:1px solid #eee;border-radius:16px;overflow:hidden;box-shadow:0 1px 6px rgba(0,0,0,.04);display:flex;flex-direction:column}
.cover img{width:100%;height:auto;display:block;background:#fafafa}
.noimg{height:280px;display:flex;align-items:center;justify-content:center;color:#999;background:#fafafa}
.meta{padding:12px 12px 0}
.title{font-weight:700}
.sub{color:#666;font-size:12px;margin-top:4px}
.actions{display:flex;gap:8px;padding:12px}
.btn{display:inline-block;padding:10px 12px;border:1px solid #ddd;border-radius:12px;background:#fff;text-decoration:none;color:#0b57d0;text-align:center;flex:1}
.btn.disabled{color:#aaa;background:#f3f3f3;cursor:not-allowed}
.hint{color:#666;font-size:13px;margin:10px 0 0}
"#;

fn head(title: &str, styles: &[&str]) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width,initial-scale=1";
            title { (title) }
            style {
                @for css in styles { (PreEscaped(css)) }
            }
        }
    }
}

/// The page-by-page reader for one book.
#[derive(Debug, Clone)]
pub struct ViewerView<'a> {
    /// Book title, shown until the plan loads
    pub title: &'a str,
    /// Relative link back to the shelf page
    pub shelf_href: &'a str,
}

impl ViewerView<'_> {
    /// Render `viewer.html`.
    pub fn render(&self) -> String {
        html! {
            (DOCTYPE)
            html lang="ja" {
                (head(self.title, &[BASE_CSS, VIEWER_CSS]))
                body {
                    header {
                        h1 #title { (self.title) }
                        div.controls {
                            button #prev { "← Prev" }
                            div.meta { span #pageInfo { "-/-" } }
                            button #next { "Next →" }
                            a #pdfLink href="book.pdf" target="_blank" rel="noreferrer" { "PDFを開く" }
                            a href="details.html" { "詳細" }
                            a href=(self.shelf_href) { "本棚へ戻る" }
                        }
                    }
                    main {
                        section.card {
                            img #pageImg alt="page image";
                            div.meta #scene {}
                        }
                        section.card {
                            div.text #pageText {}
                        }
                    }
                    script { (PreEscaped(VIEWER_JS)) }
                }
            }
        }
        .into_string()
    }
}

/// Metadata page for one book: summary, prompt, and transcript.
#[derive(Debug, Clone)]
pub struct DetailsView<'a> {
    /// Book title
    pub title: &'a str,
    /// Intended reader age; may be empty
    pub target_age: &'a str,
    /// Number of pages
    pub page_count: usize,
    /// Plan prompt template, if one was used
    pub prompt: Option<&'a str>,
    /// Conversation transcript, if available
    pub transcript: Option<&'a str>,
    /// Relative link back to the shelf page
    pub shelf_href: &'a str,
}

impl DetailsView<'_> {
    /// Render `details.html`.
    pub fn render(&self) -> String {
        let target_age = if self.target_age.trim().is_empty() {
            "-"
        } else {
            self.target_age
        };
        let prompt = non_empty(self.prompt).unwrap_or("(prompt.txt がありません)");
        let transcript = non_empty(self.transcript).unwrap_or("(transcript.txt がありません)");

        html! {
            (DOCTYPE)
            html lang="ja" {
                (head(self.title, &[BASE_CSS, DETAILS_CSS]))
                body {
                    header {
                        h1 { (self.title) }
                        a href="viewer.html" { "Webで読む" }
                        a href="book.pdf" target="_blank" rel="noreferrer" { "PDF" }
                        a href=(self.shelf_href) { "本棚へ戻る" }
                    }
                    div.wrap {
                        div.card {
                            div.meta #summary {
                                "target_age: " (target_age) " / pages: " (self.page_count)
                            }
                        }
                        div.grid {
                            section.card {
                                h2 { "Prompt（prompt.txt）" }
                                pre #prompt { (prompt) }
                            }
                            section.card {
                                h2 { "Transcript（transcript.txt）" }
                                pre #transcript { (transcript) }
                            }
                        }
                    }
                }
            }
        }
        .into_string()
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// The shelf listing every complete book, newest first.
#[derive(Debug, Clone)]
pub struct ShelfView<'a> {
    /// Books in display order
    pub entries: &'a [CatalogEntry],
    /// Path from the shelf page to the publish root (e.g. `books`)
    pub books_href: &'a str,
}

impl ShelfView<'_> {
    /// Render `index.html`.
    pub fn render(&self) -> String {
        html! {
            (DOCTYPE)
            html lang="ja" {
                (head("StoryBook Shelf", &[SHELF_CSS]))
                body {
                    header {
                        h1 { "📚 StoryBook Shelf" }
                        div.hint { "新しい本ほど上に表示されます。" }
                    }
                    div.wrap {
                        div.grid {
                            @for entry in self.entries {
                                (self.card(entry))
                            }
                            @if self.entries.is_empty() {
                                p { "まだ本がありません。storyshelf publish を実行してください。" }
                            }
                        }
                    }
                }
            }
        }
        .into_string()
    }

    fn card(&self, entry: &CatalogEntry) -> Markup {
        let base = format!("{}/{}", self.books_href, entry.id);
        let viewer = format!("{}/viewer.html", base);

        html! {
            article.card {
                a.cover href=(viewer) {
                    @if entry.has_cover {
                        img src={ (base) "/pages/01.png" } alt="cover";
                    } @else {
                        div.noimg { "No cover" }
                    }
                }
                div.meta {
                    div.title { (entry.title) }
                    div.sub { (entry.label()) }
                    @if let Some(age) = &entry.target_age {
                        div.sub { "対象: " (age) }
                    }
                }
                div.actions {
                    a.btn href=(viewer) { "Webで読む" }
                    @if entry.has_details {
                        a.btn href={ (base) "/details.html" } { "詳細" }
                    } @else {
                        span.btn.disabled { "詳細" }
                    }
                    @if entry.has_document {
                        a.btn href={ (base) "/book.pdf" } target="_blank" rel="noreferrer" { "PDF" }
                    } @else {
                        span.btn.disabled { "PDF" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_escapes_title() {
        let html = ViewerView {
            title: "<b>海</b>",
            shelf_href: "../../index.html",
        }
        .render();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;b&gt;海&lt;/b&gt;"));
        assert!(!html.contains("<b>海"));
        assert!(html.contains("fetch('book_plan.json'"));
        assert!(html.contains("ArrowRight"));
        assert!(html.contains("href=\"../../index.html\""));
    }

    #[test]
    fn test_details_placeholders() {
        let html = DetailsView {
            title: "海",
            target_age: "",
            page_count: 2,
            prompt: None,
            transcript: Some("  "),
            shelf_href: "../../index.html",
        }
        .render();
        assert!(html.contains("target_age: - / pages: 2"));
        assert!(html.contains("(prompt.txt がありません)"));
        assert!(html.contains("(transcript.txt がありません)"));
    }

    #[test]
    fn test_details_content() {
        let html = DetailsView {
            title: "海",
            target_age: "6-8",
            page_count: 10,
            prompt: Some("{PAGE_COUNT} & more"),
            transcript: Some("こんにちは"),
            shelf_href: "../../../site/index.html",
        }
        .render();
        assert!(html.contains("target_age: 6-8 / pages: 10"));
        assert!(html.contains("{PAGE_COUNT} &amp; more"));
        assert!(html.contains("こんにちは"));
        assert!(html.contains("href=\"../../../site/index.html\""));
    }

    #[test]
    fn test_empty_shelf() {
        let html = ShelfView {
            entries: &[],
            books_href: "books",
        }
        .render();
        assert!(html.contains("まだ本がありません。"));
    }
}
