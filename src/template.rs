//! `{{slot}}` templates filled from labelled inbound edges
//!
//! A note such as `Summarize {{source}} for {{audience}}` pulls `source`
//! and `audience` from the parents connected by edges with those labels.
//! `date`, `time` and `title` are always available.

use crate::graph::{Canvas, NodeId};
use crate::resolve::ContentResolver;
use chrono::Local;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

fn slot_regex() -> &'static Regex {
    static SLOT: OnceLock<Regex> = OnceLock::new();
    SLOT.get_or_init(|| Regex::new(r"\{\{\s*([\w-]+)\s*\}\}").expect("slot pattern is valid"))
}

/// Whether `content` contains at least one slot
pub fn is_template(content: &str) -> bool {
    slot_regex().is_match(content)
}

/// Replace known slots in `content`; unknown slots stay as written
///
/// Returns `None` when no slot was replaced.
pub fn fill(content: &str, vars: &HashMap<String, String>) -> Option<String> {
    let mut changed = false;
    let replaced = slot_regex().replace_all(content, |caps: &Captures| {
        match vars.get(&caps[1]).filter(|v| !v.is_empty()) {
            Some(value) => {
                changed = true;
                value.clone()
            }
            None => caps[0].to_string(),
        }
    });
    changed.then(|| replaced.into_owned())
}

/// Variables visible to the template note `id`
pub async fn variables(
    canvas: &Canvas,
    id: &NodeId,
    resolver: &dyn ContentResolver,
) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for edge in canvas.inbound_edges(id) {
        let Some(label) = edge.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
            continue;
        };
        let Some(parent) = canvas.get_node(&edge.from_node) else {
            continue;
        };
        match resolver.resolve(parent).await {
            Ok(text) => {
                vars.insert(label.to_string(), text);
            }
            Err(e) => warn!(node = %parent.id, label, error = %e, "template source unreadable"),
        }
    }

    let now = Local::now();
    vars.insert("date".to_string(), now.format("%Y-%m-%d").to_string());
    vars.insert("time".to_string(), now.format("%H:%M:%S").to_string());
    if let Some(title) = canvas.get_node(id).and_then(|n| n.title()) {
        vars.insert("title".to_string(), title.to_string());
    }
    vars
}

/// Expand the template note `id`
///
/// Returns `None` when the note is missing, is not a template, or none of
/// its slots could be filled.
pub async fn expand(
    canvas: &Canvas,
    id: &NodeId,
    resolver: &dyn ContentResolver,
) -> Option<String> {
    let node = canvas.get_node(id)?;
    let content = match resolver.resolve(node).await {
        Ok(content) => content,
        Err(e) => {
            warn!(node = %id, error = %e, "template note unreadable");
            return None;
        }
    };
    if !is_template(&content) {
        return None;
    }
    let vars = variables(canvas, id, resolver).await;
    fill(&content, &vars)
}
