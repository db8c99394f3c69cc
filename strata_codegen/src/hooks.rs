use std::collections::HashMap;

use crate::model::{AssetCatalog, LevelInstance};
use crate::resources::{ResourceRegistry, resource_type_for};

/// Hook lookup key: the instance's declared type, lowercased.
pub fn category_of(type_name: &str) -> String {
    type_name.trim().to_ascii_lowercase()
}

/// What a header builder attached to one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAttachments {
    /// Inline heading clause, e.g. `instance=ExtResource("1")`.
    pub heading: Option<String>,
    /// Lines emitted ahead of the node's property lines, e.g. `script = ExtResource("2")`.
    pub lines: Vec<String>,
}

pub type PreProcessHook = Box<dyn Fn(&mut LevelInstance) + Send + Sync>;
pub type HeaderHook =
    Box<dyn Fn(&LevelInstance, &AssetCatalog, &mut ResourceRegistry) -> NodeAttachments + Send + Sync>;

#[derive(Default)]
pub struct CategoryHooks {
    pub pre_process: Option<PreProcessHook>,
    pub build_ext_resource_header: Option<HeaderHook>,
}

/// Category-keyed hooks, handed to the generator at construction.
#[derive(Default)]
pub struct HookTable {
    categories: HashMap<String, CategoryHooks>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed category uses [`standard_header_builder`] and no pre-processing.
    pub fn standard(categories: &[&str]) -> Self {
        categories.iter().fold(Self::new(), |table, category| {
            table.with_header_builder(category, standard_header_builder)
        })
    }

    pub fn with_pre_process<F>(mut self, category: &str, hook: F) -> Self
    where
        F: Fn(&mut LevelInstance) + Send + Sync + 'static,
    {
        self.categories
            .entry(category_of(category))
            .or_default()
            .pre_process = Some(Box::new(hook));
        self
    }

    pub fn with_header_builder<F>(mut self, category: &str, hook: F) -> Self
    where
        F: Fn(&LevelInstance, &AssetCatalog, &mut ResourceRegistry) -> NodeAttachments
            + Send
            + Sync
            + 'static,
    {
        self.categories
            .entry(category_of(category))
            .or_default()
            .build_ext_resource_header = Some(Box::new(hook));
        self
    }

    pub fn get(&self, category: &str) -> Option<&CategoryHooks> {
        self.categories.get(category)
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut categories: Vec<&String> = self.categories.keys().collect();
        categories.sort();
        f.debug_struct("HookTable")
            .field("categories", &categories)
            .finish()
    }
}

/// Scenes and models become the node's `instance=` clause, scripts a
/// `script =` line. Anything else is warned about and left out.
pub fn standard_header_builder(
    instance: &LevelInstance,
    assets: &AssetCatalog,
    resources: &mut ResourceRegistry,
) -> NodeAttachments {
    let mut out = NodeAttachments::default();

    for reference in &instance.references {
        let Some(path) = assets.get(reference) else {
            log::warn!(
                "instance `{}` references unknown asset `{reference}`",
                instance.name
            );
            continue;
        };

        match resource_type_for(path) {
            "PackedScene" | "Mesh" => {
                if out.heading.is_some() {
                    log::warn!(
                        "instance `{}` already instances a scene; ignoring `{reference}`",
                        instance.name
                    );
                    continue;
                }
                let id = resources.register(path);
                out.heading = Some(format!("instance=ExtResource(\"{id}\")"));
            }
            "Script" => {
                let id = resources.register(path);
                out.lines.push(format!("script = ExtResource(\"{id}\")"));
            }
            other => log::warn!(
                "instance `{}`: cannot attach `{reference}` of category {other}",
                instance.name
            ),
        }
    }
    out
}
