//! HTML listing for directories without an index page.

use mdserve_vfs::FileInfo;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in listing link targets.
const HREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Render `entries` as a `<pre>` block of links, sorted by name.
///
/// Directory names get a trailing slash.
pub(crate) fn render(mut entries: Vec<FileInfo>) -> String {
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut html = String::from("<pre>\n");
    for entry in &entries {
        let mut name = entry.name.clone();
        if entry.is_dir {
            name.push('/');
        }
        let href = utf8_percent_encode(&name, HREF_ENCODE_SET).to_string();
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_text(&name)
        ));
    }
    html.push_str("</pre>\n");
    html
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn info(name: &str, is_dir: bool) -> FileInfo {
        FileInfo {
            name: name.to_owned(),
            size: 0,
            mode: 0o644,
            modified: None,
            is_dir,
        }
    }

    #[test]
    fn test_sorted_with_directory_slash() {
        let html = render(vec![info("b.md", false), info("a", true), info("c.png", false)]);

        assert_eq!(
            html,
            "<pre>\n<a href=\"a/\">a/</a>\n<a href=\"b.md\">b.md</a>\n<a href=\"c.png\">c.png</a>\n</pre>\n"
        );
    }

    #[test]
    fn test_names_are_escaped() {
        let html = render(vec![info("<x> & y?.md", false)]);

        assert_eq!(
            html,
            "<pre>\n<a href=\"%3Cx%3E%20&amp;%20y%3F.md\">&lt;x&gt; &amp; y?.md</a>\n</pre>\n"
        );
    }

    #[test]
    fn test_empty_directory() {
        assert_eq!(render(Vec::new()), "<pre>\n</pre>\n");
    }
}
