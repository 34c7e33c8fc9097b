//! HTML rendering
//!
//! Text is escaped, tags are written with quoted and escaped attributes.
//! Template constructs that survived expansion are written back as escaped
//! wikitext.

use crate::parser::{to_wikitext, Token};

/// Render a token stream to an HTML fragment
pub fn render_html(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text { value } => out.push_str(&escape_html(value)),
            Token::Tag { name, attribs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attribs {
                    out.push_str(&format!(" {}=\"{}\"", key, escape_html(value)));
                }
                out.push('>');
            }
            Token::EndTag { name } => out.push_str(&format!("</{}>", name)),
            Token::Template { .. } | Token::TemplateArg { .. } => {
                out.push_str(&escape_html(&to_wikitext(std::slice::from_ref(token))))
            }
            Token::End => {}
        }
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_escaped() {
        let html = render_html(&[Token::text("a < b & \"c\"")]);
        insta::assert_snapshot!(html, @"a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_link_markup() {
        let tokens = vec![
            Token::text("Template loop detected: "),
            Token::tag("a", vec![("href".to_string(), "Template:A&B".to_string())]),
            Token::text("Template:A&B"),
            Token::end_tag("a"),
            Token::End,
        ];
        insta::assert_snapshot!(
            render_html(&tokens),
            @r#"Template loop detected: <a href="Template:A&amp;B">Template:A&amp;B</a>"#
        );
    }

    #[test]
    fn test_unexpanded_construct_is_written_back() {
        let tokens = vec![Token::TemplateArg {
            name: vec![Token::text("x")],
            default: None,
        }];
        assert_eq!(render_html(&tokens), "{{{x}}}");
    }
}
