// file: src/utils/template.rs
// description: placeholder-based HTML templates with escaping
// reference: https://html.spec.whatwg.org/multipage/named-characters.html

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{([A-Za-z_]+)\}").expect("PLACEHOLDER regex is valid");
}

pub struct HtmlTemplate {
    template: String,
}

impl HtmlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Replaces each `{key}` with its value in a single pass; inserted values
    /// are never scanned again. Values go in verbatim, so callers escape
    /// untrusted text first.
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match values.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let template = HtmlTemplate::new("<h1>{title}</h1><p>{count} docs</p>");
        let mut values = HashMap::new();
        values.insert("title", "Documentos".to_string());
        values.insert("count", "3".to_string());

        assert_eq!(template.render(&values), "<h1>Documentos</h1><p>3 docs</p>");
    }

    #[test]
    fn test_unknown_placeholders_are_left_alone() {
        let template = HtmlTemplate::new("{known} {unknown}");
        let mut values = HashMap::new();
        values.insert("known", "ok".to_string());

        assert_eq!(template.render(&values), "ok {unknown}");
    }

    #[test]
    fn test_values_are_not_expanded_again() {
        let template = HtmlTemplate::new("<td>{name}</td><td>{date}</td>");
        let values = HashMap::from([
            ("name", "{date}.pdf".to_string()),
            ("date", "2024-01-01".to_string()),
        ]);

        for _ in 0..10 {
            assert_eq!(
                template.render(&values),
                "<td>{date}.pdf</td><td>2024-01-01</td>"
            );
        }
        assert_eq!(escape_html("{fecha}.pdf"), "&#123;fecha&#125;.pdf");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">N° 1 & 'b'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;N° 1 &amp; &#39;b&#39;&lt;/a&gt;"
        );
    }
}
