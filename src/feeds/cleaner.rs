//! Turns Substack `content:encoded` HTML into plain text for the model.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

/// Rendering width handed to html2text; wide enough that paragraphs never wrap.
const RENDER_WIDTH: usize = 4_096;

static FIGURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<figure\b.*?</figure\s*>").expect("static regex compile"));
static PICTURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<picture\b.*?</picture\s*>").expect("static regex compile"));
static IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("static regex compile"));
static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").expect("static regex compile"));
static CLASSED_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bclass\s*=\s*["'][^"']*(?:subscription-widget|captioned-image|image)[^"']*["'][^>]*>"#)
        .expect("static regex compile")
});
static ANY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("static regex compile"));
static SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("static regex compile"));
static TRAILING_SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m) +$").expect("static regex compile"));
static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex compile"));

/// Clean HTML content from a Substack RSS feed to extract readable text.
///
/// Drops images and their containers and subscription widgets, and keeps
/// only the text of links.
#[must_use]
pub fn clean_substack_content(html_content: &str) -> String {
    if html_content.trim().is_empty() {
        return String::new();
    }

    let without_media = strip_decorations(html_content);

    let rendered = match html2text::from_read(without_media.as_bytes(), RENDER_WIDTH) {
        Ok(text) => text,
        Err(e) => {
            error!("Error rendering Substack content, falling back to tag stripping: {}", e);
            ANY_TAG_RE.replace_all(&without_media, " ").into_owned()
        }
    };

    normalize_whitespace(&rendered)
}

/// Remove media, widgets and link markup, leaving the rest of the HTML intact.
#[must_use]
pub fn strip_decorations(html: &str) -> String {
    let html = FIGURE_RE.replace_all(html, "");
    let html = PICTURE_RE.replace_all(&html, "");
    let html = remove_classed_elements(&html);
    let html = IMG_RE.replace_all(&html, "");
    ANCHOR_RE.replace_all(&html, "$1").into_owned()
}

/// Remove every element whose class marks it as an image container or a
/// subscription widget, including its nested children.
fn remove_classed_elements(html: &str) -> String {
    let mut out = html.to_string();

    while let Some(caps) = CLASSED_OPEN_RE.captures(&out) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let start = whole.start();
        let open_end = whole.end();
        let tag = tag.as_str().to_ascii_lowercase();

        let end = if whole.as_str().ends_with("/>") {
            open_end
        } else {
            matching_close_end(&out, open_end, &tag).unwrap_or(open_end)
        };

        out.replace_range(start..end, "");
    }

    out
}

/// Byte offset just past the close tag balancing an element opened before `from`.
fn matching_close_end(html: &str, from: usize, tag: &str) -> Option<usize> {
    let tag_re = Regex::new(&format!(r"(?is)<(/?){}\b[^>]*>", regex::escape(tag))).ok()?;
    let mut depth = 1usize;

    for caps in tag_re.captures_iter(&html[from..]) {
        let whole = caps.get(0)?;
        let is_close = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if is_close {
            depth -= 1;
            if depth == 0 {
                return Some(from + whole.end());
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    None
}

fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = SPACES_RE.replace_all(&text, " ");
    let text = TRAILING_SPACES_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
