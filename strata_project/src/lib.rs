use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};
use toml::Value;

pub const CONFIG_FILE: &str = "strata.toml";

/// Scene format version written into generated headers when none is configured.
pub const DEFAULT_FORMAT_VERSION: u32 = 3;

/// Lowercase catalog key of the auxiliary asset backing path-container curves.
pub const DEFAULT_CURVE_ASSET: &str = "path_curve";

/// Property names that have no meaning on the script surface.
pub const DEFAULT_SCRIPT_DENY_LIST: &[&str] =
    &["name", "position", "rotation", "scale", "transform", "script"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub name: String,
    /// Root the authoring data (and every asset path in the catalog) lives under.
    pub authoring_root: PathBuf,
    /// Root of the target editor project; asset paths are rebased onto it.
    pub project_root: PathBuf,
    pub output_dir: PathBuf,
    pub format_version: u32,
    pub curve_asset: String,
    pub script_deny_list: Vec<String>,
}

impl ConverterConfig {
    pub fn default_for_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authoring_root: PathBuf::from("authoring"),
            project_root: PathBuf::from("game"),
            output_dir: PathBuf::from("game").join("levels"),
            format_version: DEFAULT_FORMAT_VERSION,
            curve_asset: DEFAULT_CURVE_ASSET.to_string(),
            script_deny_list: DEFAULT_SCRIPT_DENY_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn is_denied_script_property(&self, name: &str) -> bool {
        self.script_deny_list.iter().any(|denied| denied == name)
    }
}

#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    ParseToml(toml::de::Error),
    MissingField(&'static str),
    InvalidField(&'static str, String),
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::ParseToml(err) => write!(f, "{err}"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidField(field, reason) => write!(f, "invalid field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ProjectError {
    fn from(value: toml::de::Error) -> Self {
        Self::ParseToml(value)
    }
}

/// Maps `local://` inputs and relative paths under `local_root`; absolute
/// paths pass through.
pub fn resolve_local_path(input: &str, local_root: &Path) -> PathBuf {
    if let Some(stripped) = input.strip_prefix("local://") {
        let rel = stripped.trim_start_matches('/');
        if rel.is_empty() {
            return local_root.to_path_buf();
        }
        return local_root.join(rel);
    }

    let path = PathBuf::from(input);
    if path.is_absolute() {
        return path;
    }
    local_root.join(path)
}

pub fn ensure_converter_toml(root: &Path, default_name: &str) -> std::io::Result<()> {
    let config = root.join(CONFIG_FILE);
    if config.exists() {
        return Ok(());
    }
    fs::create_dir_all(root)?;
    fs::write(config, default_converter_toml(default_name))
}

pub fn default_converter_toml(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"

[paths]
authoring_root = "authoring"
project_root = "game"
output_dir = "game/levels"

[scene]
format = {DEFAULT_FORMAT_VERSION}
curve_asset = "{DEFAULT_CURVE_ASSET}"
"#
    )
}

pub fn load_converter_toml(root: &Path) -> Result<ConverterConfig, ProjectError> {
    let contents = fs::read_to_string(root.join(CONFIG_FILE))?;
    parse_converter_toml(&contents, root)
}

/// Parses a converter config. Relative paths resolve against `base_dir`.
pub fn parse_converter_toml(contents: &str, base_dir: &Path) -> Result<ConverterConfig, ProjectError> {
    let value: Value = contents.parse::<Value>()?;
    let project_table = value
        .get("project")
        .and_then(Value::as_table)
        .ok_or(ProjectError::MissingField("project"))?;

    let paths_table = value
        .get("paths")
        .and_then(Value::as_table)
        .ok_or(ProjectError::MissingField("paths"))?;

    let name = project_table
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ProjectError::MissingField("project.name"))?
        .to_string();

    let authoring_root = required_path(paths_table, "authoring_root", "paths.authoring_root", base_dir)?;
    let project_root = required_path(paths_table, "project_root", "paths.project_root", base_dir)?;
    let output_dir = match paths_table.get("output_dir").and_then(Value::as_str) {
        Some(raw) => non_empty_path("paths.output_dir", raw, base_dir)?,
        None => project_root.clone(),
    };

    let scene_table = value.get("scene").and_then(Value::as_table);

    let format_version = match scene_table.and_then(|t| t.get("format")) {
        Some(raw) => {
            let raw = raw.as_integer().ok_or(ProjectError::InvalidField(
                "scene.format",
                "must be an integer".to_string(),
            ))?;
            let version = u32::try_from(raw).map_err(|_| {
                ProjectError::InvalidField("scene.format", "must be a positive integer".to_string())
            })?;
            if version == 0 {
                return Err(ProjectError::InvalidField(
                    "scene.format",
                    "format version must be greater than 0".to_string(),
                ));
            }
            version
        }
        None => DEFAULT_FORMAT_VERSION,
    };

    let curve_asset = scene_table
        .and_then(|t| t.get("curve_asset"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CURVE_ASSET)
        .to_ascii_lowercase();

    let script_deny_list = match value
        .get("script")
        .and_then(Value::as_table)
        .and_then(|t| t.get("deny_list"))
    {
        Some(raw) => parse_string_list("script.deny_list", raw)?,
        None => DEFAULT_SCRIPT_DENY_LIST
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    log::debug!(
        "loaded converter config `{name}` (authoring: {}, project: {})",
        authoring_root.display(),
        project_root.display()
    );

    Ok(ConverterConfig {
        name,
        authoring_root,
        project_root,
        output_dir,
        format_version,
        curve_asset,
        script_deny_list,
    })
}

fn required_path(
    table: &toml::value::Table,
    key: &str,
    field: &'static str,
    base_dir: &Path,
) -> Result<PathBuf, ProjectError> {
    let raw = table
        .get(key)
        .and_then(Value::as_str)
        .ok_or(ProjectError::MissingField(field))?;
    non_empty_path(field, raw, base_dir)
}

fn non_empty_path(field: &'static str, raw: &str, base_dir: &Path) -> Result<PathBuf, ProjectError> {
    if raw.trim().is_empty() {
        return Err(ProjectError::InvalidField(
            field,
            "path must not be empty".to_string(),
        ));
    }
    Ok(resolve_local_path(raw.trim(), base_dir))
}

fn parse_string_list(field: &'static str, raw: &Value) -> Result<Vec<String>, ProjectError> {
    let items = raw.as_array().ok_or(ProjectError::InvalidField(
        field,
        "expected an array of strings".to_string(),
    ))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or(ProjectError::InvalidField(
                field,
                "expected an array of strings".to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_converter_toml_reads_paths_relative_to_base() {
        let toml = r#"
[project]
name = "Forest"

[paths]
authoring_root = "raw"
project_root = "local://godot"
output_dir = "godot/levels"

[scene]
format = 3
"#;

        let base = PathBuf::from("/work");
        let parsed = parse_converter_toml(toml, &base).expect("failed to parse strata.toml");
        assert_eq!(parsed.name, "Forest");
        assert_eq!(parsed.authoring_root, PathBuf::from("/work/raw"));
        assert_eq!(parsed.project_root, PathBuf::from("/work/godot"));
        assert_eq!(parsed.output_dir, PathBuf::from("/work/godot/levels"));
        assert_eq!(parsed.format_version, 3);
        assert_eq!(parsed.curve_asset, DEFAULT_CURVE_ASSET);
        assert!(parsed.is_denied_script_property("transform"));
    }

    #[test]
    fn parse_converter_toml_output_dir_defaults_to_project_root() {
        let toml = r#"
[project]
name = "Forest"

[paths]
authoring_root = "/abs/raw"
project_root = "/abs/game"
"#;

        let parsed = parse_converter_toml(toml, Path::new("/ignored")).unwrap();
        assert_eq!(parsed.authoring_root, PathBuf::from("/abs/raw"));
        assert_eq!(parsed.output_dir, PathBuf::from("/abs/game"));
        assert_eq!(parsed.format_version, DEFAULT_FORMAT_VERSION);
    }

    #[test]
    fn parse_converter_toml_reads_custom_deny_list_and_curve_key() {
        let toml = r#"
[project]
name = "Forest"

[paths]
authoring_root = "raw"
project_root = "game"

[scene]
curve_asset = "Rail_Curve"

[script]
deny_list = ["name", "health"]
"#;

        let parsed = parse_converter_toml(toml, Path::new("/w")).unwrap();
        assert_eq!(parsed.curve_asset, "rail_curve");
        assert_eq!(parsed.script_deny_list, vec!["name", "health"]);
        assert!(!parsed.is_denied_script_property("transform"));
    }

    #[test]
    fn parse_converter_toml_rejects_zero_format() {
        let toml = r#"
[project]
name = "Forest"

[paths]
authoring_root = "raw"
project_root = "game"

[scene]
format = 0
"#;

        let err = parse_converter_toml(toml, Path::new("/w")).expect_err("expected parse failure");
        assert!(matches!(err, ProjectError::InvalidField("scene.format", _)));
    }

    #[test]
    fn parse_converter_toml_requires_project_root() {
        let toml = r#"
[project]
name = "Forest"

[paths]
authoring_root = "raw"
"#;

        let err = parse_converter_toml(toml, Path::new("/w")).expect_err("expected parse failure");
        assert!(matches!(err, ProjectError::MissingField("paths.project_root")));
    }

    #[test]
    fn default_converter_toml_parses() {
        let parsed =
            parse_converter_toml(&default_converter_toml("Demo"), Path::new("/w")).unwrap();
        let expected = ConverterConfig {
            authoring_root: PathBuf::from("/w/authoring"),
            project_root: PathBuf::from("/w/game"),
            output_dir: PathBuf::from("/w/game/levels"),
            ..ConverterConfig::default_for_name("Demo")
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn ensure_then_load_round_trips_through_disk() {
        let root = std::env::temp_dir().join(format!("strata_project_test_{}", std::process::id()));
        ensure_converter_toml(&root, "Disk").unwrap();
        // a second call leaves the existing file alone
        fs::write(root.join(CONFIG_FILE), default_converter_toml("Kept")).unwrap();
        ensure_converter_toml(&root, "Disk").unwrap();

        let loaded = load_converter_toml(&root).unwrap();
        assert_eq!(loaded.name, "Kept");
        assert_eq!(loaded.output_dir, root.join("game/levels"));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn resolve_local_path_joins_relative_inputs() {
        let root = PathBuf::from("D:/workspace");
        assert_eq!(
            resolve_local_path("games/demo", &root),
            PathBuf::from("D:/workspace").join("games").join("demo")
        );
        assert_eq!(resolve_local_path("local://", &root), root);
    }

    #[test]
    fn resolve_local_path_supports_local_scheme() {
        let root = PathBuf::from("D:/workspace");
        assert_eq!(
            resolve_local_path("local://games/demo", &root),
            PathBuf::from("D:/workspace").join("games").join("demo")
        );
    }
}
