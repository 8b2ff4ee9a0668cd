//! Plain text helpers for titles and HTML chunking.

use std::sync::LazyLock;

use regex::Regex;

/// Any HTML tag.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Opening, closing and self closing tags, with the tag name captured.
static ELEMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*?(/?)>").unwrap());

/// Decimal and hexadecimal character references, e.g. `&#42;` or `&#x2A;`.
static NUMERIC_ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// `<hr>`, `<hr/>` and `<hr />`
static HR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<hr\s*/?>").unwrap());

/// Elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Default maximum length of a derived title.
pub const DEFAULT_TITLE_MAX_LENGTH: usize = 80;

/// Remove all HTML tags.
pub fn strip_tags(html: &str) -> String {
    TAG_REGEX.replace_all(html, " ").to_string()
}

/// Collapse all runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert HTML into a single line of plain text.
pub fn html_to_plain_text(html: &str) -> String {
    let text = decode_numeric_entities(&strip_tags(html))
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    collapse_whitespace(&text)
}

fn decode_numeric_entities(text: &str) -> String {
    NUMERIC_ENTITY_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (_, Some(decimal)) => decimal.as_str().parse().ok(),
                _ => None,
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

/// Strip tags and shorten a text to at most `max_length` characters,
/// cutting at a word boundary and appending `…`.
pub fn shorten_text(text: &str, max_length: usize) -> String {
    let text = html_to_plain_text(text);
    if text.chars().count() <= max_length {
        return text;
    }

    let cut: String = text.chars().take(max_length.saturating_sub(1)).collect();
    let cut = match cut.rfind(' ') {
        Some(index) if index > 0 => &cut[..index],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Split HTML at every horizontal rule.
pub fn split_by_hr(html: &str) -> Vec<String> {
    HR_REGEX.split(html).map(str::to_string).collect()
}

/// Split HTML into its top level nodes (elements and text runs).
fn top_level_nodes(html: &str) -> Vec<&str> {
    let mut nodes = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for caps in ELEMENT_REGEX.captures_iter(html) {
        let Some(tag) = caps.get(0) else { continue };
        let closing = &caps[1] == "/";
        let name = caps[2].to_lowercase();
        let self_closing = &caps[3] == "/" || VOID_ELEMENTS.contains(&name.as_str());

        if depth == 0 && !closing && tag.start() > start {
            nodes.push(&html[start..tag.start()]);
            start = tag.start();
        }

        if closing {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                nodes.push(&html[start..tag.end()]);
                start = tag.end();
            }
        } else if self_closing {
            if depth == 0 {
                nodes.push(&html[start..tag.end()]);
                start = tag.end();
            }
        } else {
            depth += 1;
        }
    }

    if start < html.len() {
        nodes.push(&html[start..]);
    }
    nodes
}

/// Split a long HTML text into chunks of roughly `max_chars` characters.
/// Top level elements are never split. Whitespace-only chunks are dropped.
pub fn split_html_into_chunks(html: &str, max_chars: usize) -> Vec<String> {
    fn add_text(chunks: &mut Vec<String>, text: &str) {
        if !text.trim().is_empty() {
            chunks.push(text.to_string());
        }
    }

    if html.chars().count() < max_chars {
        return vec![html.to_string()];
    }

    let mut chunks = Vec::new();
    let mut text = String::new();
    for node in top_level_nodes(html) {
        text.push_str(node);
        if text.chars().count() > max_chars {
            add_text(&mut chunks, &text);
            text.clear();
        }
    }
    add_text(&mut chunks, &text);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_entities_are_decoded() {
        assert_eq!(
            html_to_plain_text("&#42;wichtig&#42; &#x5F; 1986&#46; &amp;#42;"),
            "*wichtig* _ 1986. &#42;"
        );
    }

    #[test]
    fn test_html_to_plain_text() {
        assert_eq!(
            html_to_plain_text("<p>Der <em>Tag</em>\n der &amp; Gunst</p>"),
            "Der Tag der & Gunst"
        );
    }

    #[test]
    fn test_shorten_text() {
        assert_eq!(shorten_text("<strong>Short</strong>", 80), "Short");
        assert_eq!(shorten_text("one two three four", 10), "one two…");
    }

    #[test]
    fn test_split_by_hr() {
        assert_eq!(
            split_by_hr("<p>a</p>\n<hr />\n<p>b</p>"),
            vec!["<p>a</p>\n".to_string(), "\n<p>b</p>".to_string()]
        );
    }

    #[test]
    fn test_top_level_nodes() {
        let nodes = top_level_nodes("<p>a <em>b</em></p>\n<ul><li>x</li></ul>tail<br>");
        assert_eq!(
            nodes,
            vec!["<p>a <em>b</em></p>", "\n", "<ul><li>x</li></ul>", "tail", "<br>"]
        );
    }

    #[test]
    fn test_split_short_html_is_untouched() {
        assert_eq!(split_html_into_chunks("<p>a</p>", 400), vec!["<p>a</p>"]);
    }

    #[test]
    fn test_split_long_html() {
        let html = "<p>aaaaaaaaaa</p><p>bbbbbbbbbb</p><p>cccccccccc</p>";
        let chunks = split_html_into_chunks(html, 20);
        assert_eq!(
            chunks,
            vec![
                "<p>aaaaaaaaaa</p><p>bbbbbbbbbb</p>".to_string(),
                "<p>cccccccccc</p>".to_string()
            ]
        );
    }
}
