//! Markdown to HTML conversion for markup fields.
//!
//! The engine only depends on the `MarkupConverter` trait; `MarkdownConverter`
//! is the default implementation backed by pulldown-cmark. Conversion must be
//! idempotent: feeding already converted HTML back in returns it unchanged.
//! Text is therefore written with every character Markdown could read as
//! syntax entity-encoded, so the output never contains Markdown again.
//! Inline reference tokens (`[ref:x caption="y"]`) keep their brackets.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use serde_yaml::Value;

use crate::domain::uri::INLINE_REFERENCE_REGEX;

/// Converts author markup (Markdown or HTML) into HTML
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, text: &str) -> String;
}

/// Markdown converter using pulldown-cmark
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupConverter for MarkdownConverter {
    fn convert(&self, text: &str) -> String {
        if is_html(text) {
            return text.to_string();
        }

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        // Alt texts of images are escaped by the HTML writer itself.
        let mut image_depth = 0usize;
        let events = TextMergeStream::new(Parser::new_ext(text, options)).map(|event| match event {
            Event::Start(Tag::Image { .. }) => {
                image_depth += 1;
                event
            }
            Event::End(TagEnd::Image) => {
                image_depth = image_depth.saturating_sub(1);
                event
            }
            Event::Text(text) if image_depth == 0 => {
                Event::Html(CowStr::from(escape_text(&text)))
            }
            Event::Code(code) if image_depth == 0 => {
                Event::Html(CowStr::from(format!("<code>{}</code>", escape_text(&code))))
            }
            other => other,
        });

        let mut output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut output, events);
        let output = output.trim_end();

        // Single lines stay inline: no surrounding paragraph.
        if !text.trim().contains('\n') {
            if let Some(inner) = output
                .strip_prefix("<p>")
                .and_then(|rest| rest.strip_suffix("</p>"))
            {
                if !inner.contains("<p>") {
                    return inner.to_string();
                }
            }
        }

        output.to_string()
    }
}

/// Whether a text is already HTML and must not be converted again.
fn is_html(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

/// Escape a text run for HTML, keeping inline reference tokens readable.
fn escape_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + text.len() / 4);
    let mut last = 0;

    for caps in INLINE_REFERENCE_REGEX.captures_iter(text) {
        let (Some(token), Some(uri)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        escape_markdown(&text[last..token.start()], last == 0, &mut output);
        output.push('[');
        output.push_str(uri.as_str());
        escape_markdown(&text[uri.end()..token.end() - 1], false, &mut output);
        output.push(']');
        last = token.end();

        // `[ref:x](y)` would turn into a link
        if text[last..].starts_with('(') {
            output.push_str("&#40;");
            last += 1;
        }
    }

    escape_markdown(&text[last..], last == 0, &mut output);
    output
}

/// HTML-escape a text and entity-encode Markdown syntax characters.
///
/// At the start of a run, list markers (`-`, `+`, `1.`, `1)`) and setext
/// underlines (`=`) are encoded as well.
fn escape_markdown(text: &str, at_start: bool, output: &mut String) {
    let mut marker = None;
    if at_start {
        let digits = text.chars().take_while(char::is_ascii_digit).count();
        match text[digits..].chars().next() {
            Some('.' | ')') if digits > 0 => marker = Some(digits),
            Some('-' | '+' | '=') if digits == 0 => marker = Some(0),
            _ => {}
        }
    }

    for (index, c) in text.char_indices() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '*' | '_' | '`' | '[' | ']' | '\\' | '~' | '|' | '#' => {
                output.push_str(&format!("&#{};", c as u32))
            }
            _ if marker == Some(index) => output.push_str(&format!("&#{};", c as u32)),
            _ => output.push(c),
        }
    }
}

/// Convert every string inside a value, descending into lists and mappings.
pub fn convert_nested(value: Value, converter: &dyn MarkupConverter) -> Value {
    match value {
        Value::String(text) => Value::String(converter.convert(&text)),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| convert_nested(item, converter))
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, item)| (key, convert_nested(item, converter)))
                .collect(),
        ),
        other => other,
    }
}
