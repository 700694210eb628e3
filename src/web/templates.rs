//! HTML rendering of a registry snapshot.

use crate::snapshot::SourceSnapshot;

const STYLE: &str = r#"
    * {
        font-family: Go Mono, Terminal, Consolas, Lucida Console, monospace;
    }
    body {
        display: flex;
        flex-wrap: wrap;
        margin: 1em auto;
        max-width: 1200px;
        color: #444;
        font-size: 18px;
        line-height: 1.6;
    }
    .pod {
        width: 600px;
    }
"#;

/// Render the index page: one block per source with its episode links.
pub(crate) fn render_index(pods: &[SourceSnapshot]) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
    html.push_str("<title>Pods</title>\n<style type=\"text/css\">");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    for pod in pods {
        html.push_str("<div class=\"pod\">\n");
        html.push_str(&format!("<h3><strong>{}</strong></h3>\n", escape(&pod.name)));
        html.push_str(&format!("<i>{}</i><br />\n<ul>\n", escape(&pod.last_update)));
        for ep in &pod.episodes {
            html.push_str(&format!(
                "<li><a href=\"{}\" target=\"_blank\">{}</a></li>\n",
                escape(&ep.url),
                escape(&ep.title)
            ));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for use in element content and quoted attribute values.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
