//! Heading-based section extraction for `#subpath` file references

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

struct Heading {
    level: u8,
    start: usize,
    text: String,
}

fn headings(body: &str) -> Vec<Heading> {
    let mut found = Vec::new();
    let mut current: Option<Heading> = None;

    for (event, range) in Parser::new_ext(body, Options::all()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some(Heading {
                    level: level as u8,
                    start: range.start,
                    text: String::new(),
                });
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(h) = current.as_mut() {
                    h.text.push_str(&t);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(h) = current.take() {
                    found.push(h);
                }
            }
            _ => {}
        }
    }
    found
}

/// Slice of `body` under the heading named by `subpath`
///
/// `subpath` looks like `#Heading` or `#Parent#Child`; nested paths are
/// matched in order. The section runs from the heading line up to the next
/// heading of the same or a higher level. Block references (`#^id`) and
/// unknown headings yield `None`.
pub fn extract_section<'a>(body: &'a str, subpath: &str) -> Option<&'a str> {
    let names: Vec<&str> = subpath
        .split('#')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() || names.iter().any(|n| n.starts_with('^')) {
        return None;
    }

    let all = headings(body);
    let mut from = 0;
    let mut hit = None;
    for name in names {
        let idx = all[from..]
            .iter()
            .position(|h| h.text.trim().eq_ignore_ascii_case(name))?
            + from;
        hit = Some(idx);
        from = idx + 1;
    }
    let idx = hit?;
    let heading = &all[idx];

    let end = all[idx + 1..]
        .iter()
        .find(|h| h.level <= heading.level)
        .map(|h| h.start)
        .unwrap_or(body.len());

    Some(body[heading.start..end].trim_end())
}
