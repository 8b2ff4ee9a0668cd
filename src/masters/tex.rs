//! TeX snippets for handout markup.

use crate::core::text::html_to_plain_text;

/// `\name{content}`
pub fn cmd(name: &str, content: &str) -> String {
    format!("\\{}{{{}}}", name, content)
}

/// `\begin{name}` ... `\end{name}`
pub fn environment(name: &str, content: &str) -> String {
    format!("\\begin{{{name}}}\n{}\n\\end{{{name}}}", content.trim_end())
}

/// Escape the characters TeX treats specially.
pub fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => output.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                output.push('\\');
                output.push(c);
            }
            '~' => output.push_str("\\textasciitilde{}"),
            '^' => output.push_str("\\textasciicircum{}"),
            _ => output.push(c),
        }
    }
    output
}

/// Plain text of an HTML snippet, escaped for TeX.
pub fn from_html(html: &str) -> String {
    escape(&html_to_plain_text(html))
}
