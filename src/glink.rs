//! Rewrites `<glink>` spans in exported document HTML into anchors.
//!
//! Authors write `<glink> /some/path Label </glink>` in a Google Doc. The
//! HTML export entity-encodes the tag and inserts formatting markup inside
//! the span, so the body typically looks like
//! `/path&nbsp;<span>...</span>;Label`. The text before the first `&nbsp`
//! marker is the link target; the text after the last `;` is the label.

use once_cell::sync::Lazy;
use regex::Regex;

pub const OPEN_TAG: &str = "&lt;glink&gt;";
pub const CLOSE_TAG: &str = "&lt;/glink&gt;";
const SEPARATOR: &str = "&nbsp";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Replace every well-formed glink span with an anchor.
///
/// - An opening tag with no closing tag after it truncates the document at
///   the opening tag.
/// - A span whose body lacks the `&nbsp` marker or a `;` is left untouched
///   and scanning resumes after it.
pub fn transform(html: &str) -> String {
    let mut out = html.to_string();
    // Everything before `cursor` holds no convertible span.
    let mut cursor = 0;

    while let Some(found) = out[cursor..].find(OPEN_TAG) {
        let start = cursor + found;
        let body_start = start + OPEN_TAG.len();

        let Some(close) = out[body_start..].find(CLOSE_TAG) else {
            out.truncate(start);
            break;
        };
        let body_end = body_start + close;
        let span_end = body_end + CLOSE_TAG.len();

        match to_anchor(&out[body_start..body_end]) {
            Some(anchor) => {
                // Rescan from the anchor: stripping markup can expose another
                // opening tag. Each replacement shortens the text.
                out.replace_range(start..span_end, &anchor);
                cursor = start;
            }
            None => cursor = span_end,
        }
    }

    out
}

/// Build the anchor for one glink body, or `None` when the body is malformed.
fn to_anchor(body: &str) -> Option<String> {
    let body = body.trim();
    let marker = body.find(SEPARATOR)?;
    body.rfind(';')?;

    let path = strip_tags(&body[..marker]);
    let name = strip_tags(&body[marker..]);
    let label = match name.rfind(';') {
        Some(i) => &name[i + 1..],
        None => &name[..],
    };

    Some(format!(r#"<a href="{}">{}</a>"#, path, label))
}

fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_single_span() {
        let input = "a &lt;glink&gt; /path&nbsp;<b>ignored</b>;DisplayName &lt;/glink&gt; b";
        let out = transform(input);
        assert_eq!(out, r#"a <a href="/path">DisplayName</a> b"#);
    }

    #[test]
    fn converts_multiple_spans_left_to_right() {
        let input = "&lt;glink&gt;/one&nbsp;One&lt;/glink&gt; and &lt;glink&gt;/two&nbsp;Two&lt;/glink&gt;";
        let out = transform(input);
        assert_eq!(out, r#"<a href="/one">One</a> and <a href="/two">Two</a>"#);
    }

    #[test]
    fn strips_markup_from_path() {
        let input = "&lt;glink&gt;<span class=\"c1\">/docs/intro</span>&nbsp;<span>;Intro</span>&lt;/glink&gt;";
        assert_eq!(transform(input), r#"<a href="/docs/intro">Intro</a>"#);
    }

    #[test]
    fn missing_close_truncates_from_open_tag() {
        let input = "<p>keep</p>&lt;glink&gt;/x&nbsp;X and the rest";
        assert_eq!(transform(input), "<p>keep</p>");
    }

    #[test]
    fn close_before_open_counts_as_missing() {
        let input = "pre &lt;/glink&gt; mid &lt;glink&gt;/x&nbsp;;X";
        assert_eq!(transform(input), "pre &lt;/glink&gt; mid ");
    }

    #[test]
    fn malformed_span_is_kept_and_later_spans_convert() {
        let input = "&lt;glink&gt;no marker here&lt;/glink&gt; then &lt;glink&gt;/ok&nbsp;;Ok&lt;/glink&gt;";
        let out = transform(input);
        assert_eq!(
            out,
            r#"&lt;glink&gt;no marker here&lt;/glink&gt; then <a href="/ok">Ok</a>"#
        );
    }

    #[test]
    fn label_without_semicolon_after_stripping_keeps_whole_name() {
        // the only `;` sits inside a tag attribute
        let input = "&lt;glink&gt;/p&nbsp<i style=\"a;\">Label</i>&lt;/glink&gt;";
        assert_eq!(transform(input), r#"<a href="/p">&nbspLabel</a>"#);
    }

    #[test]
    fn transform_is_idempotent() {
        let inputs = [
            "plain text",
            "a &lt;glink&gt; /path&nbsp;<b>x</b>;Name &lt;/glink&gt; b",
            "&lt;glink&gt;broken&lt;/glink&gt;",
            "head &lt;glink&gt;/never/closed&nbsp;;X",
            "&lt;glink&gt;/a&nbsp;;A&lt;/glink&gt;&lt;glink&gt;bad&lt;/glink&gt;&lt;glink&gt;/c&nbsp;;C&lt;/glink&gt;",
        ];
        for input in inputs {
            let once = transform(input);
            assert_eq!(transform(&once), once, "input: {input}");
        }
    }

    #[test]
    fn text_without_tags_is_unchanged() {
        let input = "<html><body><p>Hello &amp; welcome&nbsp;;</p></body></html>";
        assert_eq!(transform(input), input);
    }
}
