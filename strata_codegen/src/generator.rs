use std::path::Path;

use strata_io::FileSystem;
use strata_project::ConverterConfig;

use crate::error::GenerateError;
use crate::hooks::{HookTable, NodeAttachments, category_of};
use crate::model::{AssetCatalog, AssetDefinition, Level, LevelInstance};
use crate::resources::ResourceRegistry;

/// Renders levels, single assets and their companion scripts.
///
/// Holds no per-document state; every call builds its own resource and name
/// registries, so one generator can serve independent files in parallel.
#[derive(Debug)]
pub struct SceneGenerator {
    hooks: HookTable,
    config: ConverterConfig,
}

impl SceneGenerator {
    pub fn new(hooks: HookTable, config: ConverterConfig) -> Self {
        Self { hooks, config }
    }

    /// Generator without category hooks. Level instances will carry no resources.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(HookTable::new(), config.clone())
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn write_level(
        &self,
        fs: &dyn FileSystem,
        level: &mut Level,
        assets: &AssetCatalog,
        output_path: &Path,
    ) -> Result<(), GenerateError> {
        let text = self.generate_level(level, assets, output_path);
        fs.write(output_path, &text)?;
        log::debug!("wrote level `{}` to {}", level.name, output_path.display());
        Ok(())
    }

    pub fn write_asset(
        &self,
        fs: &dyn FileSystem,
        asset: &AssetDefinition,
        assets: &AssetCatalog,
        output_path: &Path,
    ) -> Result<(), GenerateError> {
        let text = self.generate_asset(asset, assets, output_path)?;
        fs.write(output_path, &text)?;
        log::debug!("wrote asset `{}` to {}", asset.name, output_path.display());
        Ok(())
    }

    pub fn write_script(
        &self,
        fs: &dyn FileSystem,
        asset: &AssetDefinition,
        output_path: &Path,
    ) -> Result<(), GenerateError> {
        fs.write(output_path, &self.generate_script(asset))?;
        Ok(())
    }

    // -------------------- shared helpers --------------------

    pub(crate) fn resource_registry(&self, output_path: &Path) -> ResourceRegistry {
        let output_dir = output_path.parent().unwrap_or(Path::new(""));
        ResourceRegistry::new(
            &self.config.authoring_root,
            &self.config.project_root,
            output_dir,
        )
    }

    pub(crate) fn scene_header(&self, resource_count: usize) -> String {
        format!(
            "[gd_scene load_steps={} format={}]",
            resource_count + 1,
            self.config.format_version
        )
    }

    pub(crate) fn pre_process(&self, instance: &mut LevelInstance) {
        let category = category_of(&instance.type_name);
        if let Some(hook) = self
            .hooks
            .get(&category)
            .and_then(|hooks| hooks.pre_process.as_ref())
        {
            hook(instance);
        }
    }

    /// Runs the category's header builder. A missing category or builder is
    /// logged and yields a node without attachments.
    pub(crate) fn attach(
        &self,
        instance: &LevelInstance,
        assets: &AssetCatalog,
        resources: &mut ResourceRegistry,
    ) -> NodeAttachments {
        let category = category_of(&instance.type_name);
        let Some(hooks) = self.hooks.get(&category) else {
            log::warn!(
                "no hooks for category `{category}`; instance `{}` emitted without resources",
                instance.name
            );
            return NodeAttachments::default();
        };
        match &hooks.build_ext_resource_header {
            Some(build) => build(instance, assets, resources),
            None => {
                log::warn!(
                    "category `{category}` has no header builder; instance `{}` emitted without resources",
                    instance.name
                );
                NodeAttachments::default()
            }
        }
    }
}
