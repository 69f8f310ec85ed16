use pulldown_cmark::{html, Options, Parser};

/// Parses a comma-separated tag string into a deduplicated list,
/// preserving insertion order for display.
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    let mut parsed: Vec<String> = Vec::new();
    if let Some(raw) = tags {
        for tag in raw.split(',') {
            let tag = tag.trim();
            if !tag.is_empty() && !parsed.iter().any(|t| t == tag) {
                parsed.push(tag.to_string());
            }
        }
    }
    parsed
}

/// Renders paste content (Markdown) to an HTML fragment for the
/// read-only slug view.
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(content, options);
    let mut out = String::with_capacity(content.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// First non-empty line of `content`, truncated to `max_len` characters.
pub fn content_preview(content: &str, max_len: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_trims_and_deduplicates_in_order() {
        let tags = parse_tags(Some(" rust, notes ,rust, ,ideas".to_string()));
        assert_eq!(tags, vec!["rust", "notes", "ideas"]);
    }

    #[test]
    fn parse_tags_handles_none() {
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn render_markdown_produces_html() {
        let html = render_markdown("# Title\n\nSome *text*");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn preview_truncates_long_first_line() {
        let preview = content_preview("abcdefghij\nsecond", 5);
        assert_eq!(preview, "abcde...");
    }
}
