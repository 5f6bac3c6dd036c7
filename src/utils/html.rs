use ammonia::Builder;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Sanitize rich-text HTML produced by the dashboard editor.
///
/// Keeps the formatting, media and link markup the editor emits and strips
/// scripts, event-handler attributes and non-http(s) URLs.
pub fn sanitize_html(html: &str) -> String {
    sanitizer().clean(html).to_string()
}

/// Media tags the editor embeds on top of ammonia's default set.
const MEDIA_TAGS: &[&str] = &["video", "audio", "source", "iframe"];

fn sanitizer() -> &'static Builder<'static> {
    static BUILDER: OnceLock<Builder<'static>> = OnceLock::new();
    BUILDER.get_or_init(|| {
        let url_schemes: HashSet<&str> = ["http", "https", "mailto"].into_iter().collect();

        let mut builder = Builder::default();
        builder.add_tags(MEDIA_TAGS.iter());

        builder.add_tag_attributes("a", &["href", "title", "target"]);
        builder.add_tag_attributes("img", &["src", "alt", "title", "width", "height"]);
        builder.add_tag_attributes("video", &["src", "controls", "poster", "width", "height"]);
        builder.add_tag_attributes("audio", &["src", "controls"]);
        builder.add_tag_attributes("source", &["src", "type"]);
        builder.add_tag_attributes("iframe", &["src", "width", "height", "allowfullscreen"]);
        builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
        builder.add_tag_attributes("th", &["align", "colspan", "rowspan"]);
        builder.add_generic_attributes(&["class"]);

        builder.url_schemes(url_schemes);
        builder.link_rel(Some("noopener noreferrer"));
        builder
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_is_kept() {
        let html = sanitize_html("<h2>Impact</h2><p>This is <strong>bold</strong>.</p>");
        assert!(html.contains("<h2>Impact</h2>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn script_tag_removed() {
        let html = sanitize_html("<p>hi</p><script>alert('xss')</script>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("alert"));
    }

    #[test]
    fn javascript_url_removed() {
        let html = sanitize_html("<a href=\"javascript:alert(1)\">click</a>");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn event_handler_removed() {
        let html = sanitize_html("<img src=\"https://cdn.example.org/a.png\" onerror=\"alert(1)\">");
        assert!(!html.contains("onerror"));
        assert!(html.contains("https://cdn.example.org/a.png"));
    }

    #[test]
    fn video_embed_kept() {
        let html = sanitize_html("<video src=\"https://cdn.example.org/v.mp4\" controls></video>");
        assert!(html.contains("<video"));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize_html("Just words"), "Just words");
    }
}
