use std::collections::{HashMap, HashSet};

/// Render lesson or note text (markdown or plain) to sanitized HTML.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);
    options.insert(pulldown_cmark::Options::ENABLE_TASKLISTS);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "del", "code", "pre", "blockquote",
        "ul", "ol", "li", "a", "h1", "h2", "h3", "h4", "table", "thead", "tbody", "tr", "th",
        "td",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

/// First `max_chars` characters of plain text, with an ellipsis when cut.
#[must_use]
pub fn excerpt(input: &str, max_chars: usize) -> String {
    let flat = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::{excerpt, markdown_to_html};

    #[test]
    fn markdown_to_html_sanitizes_links() {
        let html = markdown_to_html("[Link](javascript:alert(1))");
        assert!(html.contains("Link"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn lesson_headings_and_lists_survive() {
        let html = markdown_to_html("## Fractions\n\n- halves\n- thirds\n");
        assert!(html.contains("<h2>Fractions</h2>"), "{html}");
        assert!(html.contains("<li>halves</li>"), "{html}");
    }

    #[test]
    fn plain_text_becomes_a_paragraph() {
        assert_eq!(markdown_to_html("Just words."), "<p>Just words.</p>\n");
    }

    #[test]
    fn script_tags_are_dropped() {
        let html = markdown_to_html("<script>alert(1)</script>\n\nSafe");
        assert!(!html.contains("<script"));
        assert!(html.contains("Safe"));
    }

    #[test]
    fn excerpt_flattens_whitespace_and_cuts() {
        assert_eq!(excerpt("a\n  b", 10), "a b");
        assert_eq!(excerpt("abcdef ghij", 7), "abcdef…");
    }
}
