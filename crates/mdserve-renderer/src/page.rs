//! Page shell around a rendered Markdown fragment.

const PREAMBLE: &str = r#"<html><head><meta charset="utf-8">"#;
const BODY_OPEN: &str =
    r#"</head><body><article class="markdown-body entry-content" style="padding: 30px;">"#;
const BODY_CLOSE: &str = "</article></body></html>";

/// Build a `<link>` element for a stylesheet URL.
pub fn style_link(url: &str) -> String {
    format!(r#"<link href="{url}" media="all" rel="stylesheet" type="text/css" />"#)
}

/// Wrap an HTML fragment in a standalone page.
///
/// One `<link>` is emitted per stylesheet, in the given order and without
/// deduplication. The fragment is copied verbatim: it is the trusted output
/// of a Markdown renderer and is not escaped.
pub fn assemble<S: AsRef<str>>(fragment: &[u8], stylesheets: &[S]) -> Vec<u8> {
    let links: Vec<String> = stylesheets.iter().map(|s| style_link(s.as_ref())).collect();
    let shell_len = PREAMBLE.len()
        + links.iter().map(String::len).sum::<usize>()
        + BODY_OPEN.len()
        + BODY_CLOSE.len();

    let mut page = Vec::with_capacity(shell_len + fragment.len());
    page.extend_from_slice(PREAMBLE.as_bytes());
    for link in &links {
        page.extend_from_slice(link.as_bytes());
    }
    page.extend_from_slice(BODY_OPEN.as_bytes());
    page.extend_from_slice(fragment);
    page.extend_from_slice(BODY_CLOSE.as_bytes());
    page
}
