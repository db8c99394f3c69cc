use std::collections::HashMap;
use std::path::{Path, PathBuf};

use phf::{Map, phf_map};
use strata_io::{rebase, relative_to, to_forward_slashes};

/// File extension -> resource type tag written into `ext_resource` lines.
static RESOURCE_TYPES: Map<&'static str, &'static str> = phf_map! {
    "glb" => "PackedScene",
    "gltf" => "PackedScene",
    "tscn" => "PackedScene",
    "scn" => "PackedScene",
    "gd" => "Script",
    "png" => "Texture2D",
    "jpg" => "Texture2D",
    "jpeg" => "Texture2D",
    "webp" => "Texture2D",
    "tres" => "Resource",
    "res" => "Resource",
    "ogg" => "AudioStream",
    "wav" => "AudioStream",
    "mp3" => "AudioStream",
    "gdshader" => "Shader",
    "obj" => "Mesh",
};

pub const FALLBACK_RESOURCE_TYPE: &str = "Resource";

/// Type tag for `path`, from its extension. Unknown extensions fall back to
/// [`FALLBACK_RESOURCE_TYPE`] with a warning.
pub fn resource_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match RESOURCE_TYPES.get(ext.as_str()).copied() {
        Some(ty) => ty,
        None => {
            log::warn!(
                "no resource type for `{}`; writing it as {FALLBACK_RESOURCE_TYPE}",
                path.display()
            );
            FALLBACK_RESOURCE_TYPE
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtResource {
    pub id: u32,
    /// Relative to the output document's directory, `/`-separated.
    pub path: String,
    pub type_name: &'static str,
}

impl ExtResource {
    pub fn render(&self) -> String {
        format!(
            "[ext_resource path=\"{}\" type=\"{}\" id=\"{}\"]",
            escape_str(&self.path),
            self.type_name,
            self.id
        )
    }
}

/// External resources of one output document. Ids start at 1, follow
/// first-registration order, and are shared by registrations that rewrite
/// to the same path.
#[derive(Debug)]
pub struct ResourceRegistry {
    authoring_root: PathBuf,
    project_root: PathBuf,
    output_dir: PathBuf,
    entries: Vec<ExtResource>,
    by_path: HashMap<String, u32>,
}

impl ResourceRegistry {
    pub fn new(authoring_root: &Path, project_root: &Path, output_dir: &Path) -> Self {
        Self {
            authoring_root: authoring_root.to_path_buf(),
            project_root: project_root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            entries: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Output-relative form of an authoring path.
    pub fn rewrite_path(&self, authoring_path: &Path) -> String {
        let in_project = rebase(authoring_path, &self.authoring_root, &self.project_root);
        to_forward_slashes(&relative_to(&in_project, &self.output_dir))
    }

    /// Registers `authoring_path` (type from its extension) and returns its id.
    pub fn register(&mut self, authoring_path: &Path) -> u32 {
        let type_name = resource_type_for(authoring_path);
        self.register_as(authoring_path, type_name)
    }

    pub fn register_as(&mut self, authoring_path: &Path, type_name: &'static str) -> u32 {
        let path = self.rewrite_path(authoring_path);
        if let Some(id) = self.by_path.get(&path) {
            return *id;
        }

        let id = self.entries.len() as u32 + 1;
        log::debug!("ext_resource {id}: {path} ({type_name})");
        self.by_path.insert(path.clone(), id);
        self.entries.push(ExtResource {
            id,
            path,
            type_name,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `ext_resource` lines sorted by id.
    pub fn render_lines(&self) -> Vec<String> {
        let mut entries: Vec<&ExtResource> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.id);
        entries.into_iter().map(ExtResource::render).collect()
    }
}

pub(crate) fn escape_str(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
