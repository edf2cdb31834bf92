//! Server-rendered pages. Markup is kept minimal; styling lives in the
//! embedded `static/style.css`.

use crate::models::{StatsView, TimeRange};
use serde_json::Value;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

fn cover(image: Option<&str>, alt: &str) -> String {
    match image {
        Some(url) => format!(
            r#"<img class="cover" src="{}" alt="{}">"#,
            escape(url),
            escape(alt)
        ),
        None => r#"<div class="cover placeholder"></div>"#.to_string(),
    }
}

pub fn login_page() -> String {
    layout(
        "Spotify Stats",
        r#"<main class="login">
<h1>Spotify Stats</h1>
<p>See your top tracks, artists and albums.</p>
<a class="button" href="/login">Log in with Spotify</a>
</main>"#,
    )
}

pub fn stats_page(view: &StatsView) -> String {
    let mut body = String::new();
    let current = escape(view.time_range.as_str());

    body.push_str("<header>\n<h1>Your Spotify Stats</h1>\n<nav class=\"ranges\">\n");
    for range in TimeRange::KNOWN.iter() {
        let class = if *range == view.time_range { " class=\"active\"" } else { "" };
        body.push_str(&format!(
            "<a{} href=\"/stats?time_range={}\">{}</a>\n",
            class,
            range.as_str(),
            range.label()
        ));
    }
    body.push_str(&format!(
        r#"</nav>
<nav class="actions">
<a href="/export?time_range={current}">Export CSV</a>
<a href="/recently_played">Recently played</a>
<a href="/logout">Log out</a>
</nav>
</header>
"#,
        current = current
    ));

    body.push_str("<section>\n<h2>Top Tracks</h2>\n<ol>\n");
    for track in &view.tracks {
        body.push_str(&format!(
            "<li>{}<span class=\"name\">{}</span><span class=\"sub\">{}</span></li>\n",
            cover(track.image.as_deref(), &track.name),
            escape(&track.name),
            escape(&track.artist)
        ));
    }
    body.push_str("</ol>\n</section>\n");

    body.push_str("<section>\n<h2>Top Artists</h2>\n<ol>\n");
    for artist in &view.artists {
        body.push_str(&format!(
            "<li>{}<span class=\"name\">{}</span></li>\n",
            cover(artist.image.as_deref(), &artist.name),
            escape(&artist.name)
        ));
    }
    body.push_str("</ol>\n</section>\n");

    body.push_str("<section>\n<h2>Top Albums</h2>\n<ol>\n");
    for album in &view.albums {
        body.push_str(&format!(
            "<li>{}<span class=\"name\">{}</span><span class=\"sub\">{} track{}</span></li>\n",
            cover(album.image.as_deref(), &album.name),
            escape(&album.name),
            album.count,
            if album.count == 1 { "" } else { "s" }
        ));
    }
    body.push_str("</ol>\n</section>\n");

    layout(&format!("Spotify Stats - {}", view.time_range.label()), &body)
}

fn render_value(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            out.push_str("<dl>\n");
            for (key, inner) in map {
                out.push_str(&format!("<dt>{}</dt><dd>", escape(key)));
                render_value(out, inner);
                out.push_str("</dd>\n");
            }
            out.push_str("</dl>\n");
        }
        Value::Array(items) => {
            out.push_str("<ol>\n");
            for item in items {
                out.push_str("<li>");
                render_value(out, item);
                out.push_str("</li>\n");
            }
            out.push_str("</ol>\n");
        }
        Value::String(s) => out.push_str(&escape(s)),
        Value::Null => out.push_str("&ndash;"),
        other => out.push_str(&escape(&other.to_string())),
    }
}

/// Renders whatever the aggregation endpoint returned
pub fn recently_played_page(stats: &Value) -> String {
    let mut body = String::from(
        "<header>\n<h1>Recently Played</h1>\n<nav class=\"actions\">\n\
         <a href=\"/stats\">Back to stats</a>\n<a href=\"/logout\">Log out</a>\n</nav>\n</header>\n\
         <section class=\"relay\">\n",
    );
    render_value(&mut body, stats);
    body.push_str("</section>\n");

    layout("Spotify Stats - Recently Played", &body)
}
