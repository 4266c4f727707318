//! Directory listing page

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write;
use std::path::Path;

use super::resolver::ListingEntry;

/// Characters escaped in a single path segment of a link
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Render the listing of `dir` (a directory inside `root`).
///
/// Links are relative to the directory URL, which always ends in a slash;
/// directories link with a trailing slash of their own.
pub fn render_listing(root: &Path, dir: &Path, entries: &[ListingEntry]) -> String {
    let display_path = display_path(root, dir);
    let title = escape_html(&display_path);

    let mut html = String::with_capacity(512 + entries.len() * 128);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>Files within {title}</title>");
    html.push_str(
        "<style>\
         body{font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Roboto,sans-serif;margin:40px;color:#222}\
         h1{font-size:1.2em;font-weight:600}\
         table{border-collapse:collapse}\
         td{padding:4px 16px 4px 0}\
         a{color:#0366d6;text-decoration:none}\
         a:hover{text-decoration:underline}\
         .type{color:#888;font-size:.9em}\
         </style>\n",
    );
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>Files within {title}</h1>");
    html.push_str("<table>\n");

    if display_path != "/" {
        html.push_str("<tr><td><a href=\"../\">../</a></td><td class=\"type\">dir</td></tr>\n");
    }

    for entry in entries {
        let encoded = utf8_percent_encode(&entry.name, SEGMENT);
        let name = escape_html(&entry.name);
        let (slash, kind) = if entry.is_dir { ("/", "dir") } else { ("", "file") };
        let _ = writeln!(
            html,
            "<tr><td><a href=\"./{encoded}{slash}\">{name}{slash}</a></td><td class=\"type\">{kind}</td></tr>"
        );
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Absolute URL of a directory, one encoded segment per name, with a
/// single leading and a trailing slash
pub fn directory_url<S: AsRef<str>>(segments: &[S]) -> String {
    let mut url = String::from("/");
    for segment in segments {
        let _ = write!(url, "{}/", utf8_percent_encode(segment.as_ref(), SEGMENT));
    }
    url
}

/// URL-style path of `dir` relative to the root, with leading and trailing slash
fn display_path(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(Path::new(""));
    let mut path = String::from("/");
    for component in relative.components() {
        path.push_str(&component.as_os_str().to_string_lossy());
        path.push('/');
    }
    path
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir,
        }
    }

    #[test]
    fn test_directory_url() {
        assert_eq!(directory_url::<&str>(&[]), "/");
        assert_eq!(directory_url(&["evil.example"]), "/evil.example/");
        assert_eq!(directory_url(&["a b", "c?d"]), "/a%20b/c%3Fd/");
    }

    #[test]
    fn test_root_listing() {
        let root = Path::new("/srv");
        let html = render_listing(root, root, &[entry("docs", true), entry("a.txt", false)]);
        assert!(html.contains("<title>Files within /</title>"));
        assert!(html.contains("<a href=\"./docs/\">docs/</a></td><td class=\"type\">dir</td>"));
        assert!(html.contains("<a href=\"./a.txt\">a.txt</a></td><td class=\"type\">file</td>"));
        assert!(!html.contains("href=\"../\""));
    }

    #[test]
    fn test_nested_listing_has_parent_link() {
        let html = render_listing(Path::new("/srv"), Path::new("/srv/docs/img"), &[]);
        assert!(html.contains("Files within /docs/img/"));
        assert!(html.contains("<a href=\"../\">../</a>"));
    }

    #[test]
    fn test_names_are_escaped_and_encoded() {
        let root = Path::new("/srv");
        let html = render_listing(root, root, &[entry("<b>&co #1.txt", false)]);
        assert!(html.contains("href=\"./%3Cb%3E%26co%20%231.txt\""));
        assert!(html.contains(">&lt;b&gt;&amp;co #1.txt</a>"));
    }
}
