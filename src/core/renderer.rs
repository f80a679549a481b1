//! HTML renderer for the block token stream

use std::fmt::Write;

use super::token::Token;

/// Escape text for HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a token stream to HTML.
///
/// `inline` tokens are emitted as escaped text: inline Markdown is left to
/// whatever consumes the output.
pub fn render(tokens: &[Token]) -> String {
    let mut output = String::new();

    for (idx, token) in tokens.iter().enumerate() {
        if token.kind == "inline" {
            output.push_str(&escape_html(&token.content));
            continue;
        }
        render_token(&mut output, tokens, idx);
    }

    output
}

fn render_token(output: &mut String, tokens: &[Token], idx: usize) {
    let token = &tokens[idx];

    if token.tag.is_empty() {
        return;
    }

    output.push('<');
    if token.nesting == -1 {
        output.push('/');
    }
    output.push_str(&token.tag);
    for (name, value) in &token.attrs {
        let _ = write!(output, " {}=\"{}\"", escape_html(name), escape_html(value));
    }
    if token.nesting == 0 {
        output.push_str(" /");
    }
    output.push('>');

    let mut need_lf = token.block;
    if token.block && token.nesting == 1 {
        if let Some(next) = tokens.get(idx + 1) {
            if next.kind == "inline" || (next.nesting == -1 && next.tag == token.tag) {
                need_lf = false;
            }
        }
    }
    if need_lf {
        output.push('\n');
    }
}
