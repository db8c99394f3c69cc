use phf::{Set, phf_set};
use strata_props::PropertyMap;

use crate::resources::escape_str;

pub const DEFAULT_NODE_TYPE: &str = "Node3D";
pub const PATH_NODE_TYPE: &str = "Path3D";

/// Lowercase names of objects that need a path container instead of a plain node.
static PATH_CONTAINERS: Set<&'static str> = phf_set! {
    "path",
    "rail",
    "road",
    "river",
    "spline",
    "track",
};

pub fn is_path_container(name: &str) -> bool {
    PATH_CONTAINERS.contains(name.trim().to_ascii_lowercase().as_str())
}

pub fn node_type_for(name: &str) -> &'static str {
    if is_path_container(name) {
        PATH_NODE_TYPE
    } else {
        DEFAULT_NODE_TYPE
    }
}

/// A node block: heading, property lines, trailing logical id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmittedNode {
    pub name: String,
    /// Left out when the node is instanced from a scene.
    pub type_name: Option<String>,
    /// `None` for the document root.
    pub parent: Option<String>,
    pub node_paths: Vec<String>,
    /// Trailing heading clause such as `instance=ExtResource("1")`.
    pub instance_clause: Option<String>,
    pub lines: Vec<String>,
    pub logical_id: Option<String>,
}

impl EmittedNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn heading(&self) -> String {
        let mut out = format!("[node name=\"{}\"", escape_str(&self.name));
        if self.instance_clause.is_none() {
            if let Some(ty) = &self.type_name {
                out.push_str(&format!(" type=\"{ty}\""));
            }
        }
        if let Some(parent) = &self.parent {
            out.push_str(&format!(" parent=\"{}\"", escape_str(parent)));
        }
        if !self.node_paths.is_empty() {
            let names = self
                .node_paths
                .iter()
                .map(|n| format!("\"{}\"", escape_str(n)))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(" node_paths=PackedStringArray({names})"));
        }
        if let Some(clause) = &self.instance_clause {
            out.push(' ');
            out.push_str(clause);
        }
        out.push(']');
        out
    }

    /// Heading first, then property lines, then `id = "<logical-id>"` when known.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 2);
        out.push(self.heading());
        out.extend(self.lines.iter().cloned());
        if let Some(id) = self.logical_id.as_deref().filter(|id| !id.is_empty()) {
            out.push(format!("id = \"{}\"", escape_str(id)));
        }
        out
    }
}

/// Names of properties the editor must store as node paths.
pub fn node_path_names(properties: &PropertyMap) -> Vec<String> {
    properties
        .values()
        .filter(|p| p.is_node_path())
        .map(|p| p.id().to_string())
        .collect()
}

/// Scene assignments, with a property named `script` ahead of the rest.
///
/// When `owner` already has a script attached from elsewhere, a `script`
/// property is dropped so the node carries a single `script =` line.
pub fn property_lines(properties: &PropertyMap, owner: &str, script_attached: bool) -> Vec<String> {
    let script = properties.values().find(|p| p.id() == "script");
    if script_attached && script.is_some() {
        log::warn!("`{owner}`: `script` property ignored, a script is already attached");
    }
    let rest = properties.values().filter(|p| p.id() != "script");
    script
        .filter(|_| !script_attached)
        .into_iter()
        .chain(rest)
        .map(|p| p.render_assignment())
        .collect()
}

/// Whether hook-produced lines already attach a script.
pub(crate) fn attaches_script(lines: &[String]) -> bool {
    lines.iter().any(|line| line.starts_with("script ="))
}
