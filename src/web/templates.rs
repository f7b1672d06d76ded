//! HTML pages compiled into the binary. Placeholders are `{{key}}`; every
//! substituted value is HTML-escaped.

use std::borrow::Cow;

use crate::roster::Pick;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const QUESTION_HTML: &str = include_str!("../../templates/question.html");

pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Single pass over `template`; substituted text is never rescanned.
/// Unknown placeholders are left in place.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(&escape_html(value)),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn index_page(class_name: &str) -> String {
    render(INDEX_HTML, &[("class_name", class_name)])
}

pub fn question_fragment(pick: &Pick, class_name: &str) -> String {
    let quest = pick.count.to_string();
    render(
        QUESTION_HTML,
        &[
            ("avatar", pick.avatar_url.as_str()),
            ("name", pick.name.as_str()),
            ("quest", quest.as_str()),
            ("class_name", class_name),
        ],
    )
}

pub fn empty_roster_fragment(class_name: &str) -> String {
    format!(
        "<p class=\"error\">Nobody left on the roster for #{}.</p>\n",
        escape_html(class_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<b>"O'Neil" & co</b>"#),
            "&lt;b&gt;&quot;O&#39;Neil&quot; &amp; co&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_substitutes_and_escapes() {
        let out = render("Hi {{ name }}, from {{class_name}}!", &[("name", "<Ada>"), ("class_name", "ds")]);
        assert_eq!(out, "Hi &lt;Ada&gt;, from ds!");
    }

    #[test]
    fn test_render_leaves_unknown_and_unclosed() {
        assert_eq!(render("{{missing}} ok", &[]), "{{missing}} ok");
        assert_eq!(render("tail {{open", &[("open", "x")]), "tail {{open");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render("{{a}}", &[("a", "{{b}}"), ("b", "boom")]);
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_index_page_has_channel() {
        let html = index_page("g39ds_platte");
        assert!(html.contains("#g39ds_platte"));
        assert!(!html.contains("{{class_name}}"));
    }

    #[test]
    fn test_question_fragment() {
        let pick = Pick {
            member_id: "U1".to_string(),
            name: "Ada Lovelace".to_string(),
            avatar_url: "https://avatars.example/ada_192.png".to_string(),
            count: 3,
        };
        let html = question_fragment(&pick, "g39ds_platte");
        assert!(html.contains(r#"<img src="https://avatars.example/ada_192.png""#));
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("Question #3"));
        assert!(html.contains("#g39ds_platte"));
        assert!(!html.contains("{{"));
    }
}
