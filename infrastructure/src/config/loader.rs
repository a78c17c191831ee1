//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["tandem.toml", ".tandem.toml"];
const ENV_PREFIX: &str = "TANDEM_";

/// One place configuration can come from, for `--show-config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::check_explicit(config_path)?;
        let project_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::layered(config_path, &project_dir, Self::global_config_path().as_deref())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// File layers only, lowest priority first
    fn layered(config_path: Option<&Path>, project_dir: &Path, global: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global) = global
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }

        if let Some(project) = Self::project_config_in(project_dir) {
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// An explicit `--config` path must exist; a missing file layer would
    /// otherwise be skipped silently
    fn check_explicit(config_path: Option<&Path>) -> Result<(), Box<figment::Error>> {
        match config_path {
            Some(path) if !path.is_file() => Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            )))),
            _ => Ok(()),
        }
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/tandem/config.toml` or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tandem").join("config.toml"))
    }

    /// The project-level config file in the working directory, if any
    pub fn project_config_path() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::project_config_in(&cwd)
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Every source in priority order, highest first
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = vec![ConfigSource {
            label: "Env",
            location: format!("{}<SECTION>__<KEY>", ENV_PREFIX),
            found: std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)),
        }];

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: "./tandem.toml or ./.tandem.toml".to_string(),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: path.exists(),
                location: path.display().to_string(),
            });
        }

        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });
        sources
    }

    /// Render the effective configuration as TOML, with inline API keys masked
    pub fn render(config: &FileConfig) -> Result<String, toml::ser::Error> {
        let mut shown = config.clone();
        for endpoint in [&mut shown.agents.primary, &mut shown.agents.auxiliary] {
            if endpoint.api_key.is_some() {
                endpoint.api_key = Some("********".to_string());
            }
        }
        toml::to_string_pretty(&shown)
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");
        for source in Self::sources(config_path) {
            let marker = if source.found { "FOUND" } else { "     " };
            println!("  [{}] {:<9} {}", marker, format!("{}:", source.label), source.location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn extract(figment: Figment) -> FileConfig {
        figment.extract().unwrap()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.workflow.max_iterations, 3);
        assert!(config.budget.limit.is_none());
    }

    #[test]
    fn test_global_config_path_names_tandem() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("tandem/config.toml"));
        }
    }

    #[test]
    fn test_project_file_overrides_global() {
        let global_dir = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        let global = global_dir.path().join("config.toml");
        fs::write(
            &global,
            "[workflow]\nmax_iterations = 7\ncall_timeout_seconds = 60\n",
        )
        .unwrap();
        fs::write(
            project_dir.path().join(".tandem.toml"),
            "[workflow]\nmax_iterations = 4\n",
        )
        .unwrap();

        let config = extract(ConfigLoader::layered(None, project_dir.path(), Some(&global)));

        assert_eq!(config.workflow.max_iterations, 4);
        assert_eq!(config.workflow.call_timeout_seconds, 60);
        assert_eq!(config.workflow.max_unit_size, 1_000_000);
    }

    #[test]
    fn test_explicit_file_has_highest_file_priority() {
        let project_dir = tempfile::tempdir().unwrap();
        fs::write(
            project_dir.path().join("tandem.toml"),
            "[debate]\nmax_rounds = 2\n",
        )
        .unwrap();
        let explicit = project_dir.path().join("ci.toml");
        fs::write(&explicit, "[debate]\nmax_rounds = 5\n").unwrap();

        let config = extract(ConfigLoader::layered(
            Some(&explicit),
            project_dir.path(),
            None,
        ));
        assert_eq!(config.debate.max_rounds, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let project_dir = tempfile::tempdir().unwrap();
        let missing = project_dir.path().join("nope.toml");
        let err = ConfigLoader::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_partial_agent_section_keeps_role_defaults() {
        let project_dir = tempfile::tempdir().unwrap();
        fs::write(
            project_dir.path().join("tandem.toml"),
            "[agents.auxiliary]\nmodel = \"gemini-2.5-flash\"\n",
        )
        .unwrap();

        let config = extract(ConfigLoader::layered(None, project_dir.path(), None));
        assert_eq!(config.agents.auxiliary.model, "gemini-2.5-flash");
        assert_eq!(config.agents.auxiliary.context_limit, 2_000_000);
        assert_eq!(
            config.agents.auxiliary.api_key_env.as_deref(),
            Some("GEMINI_API_KEY")
        );
    }

    #[test]
    fn test_render_masks_inline_keys() {
        let mut config = ConfigLoader::load_defaults();
        config.agents.auxiliary.api_key = Some("sk-secret".to_string());

        let rendered = ConfigLoader::render(&config).unwrap();
        assert!(rendered.contains("[workflow]"));
        assert!(rendered.contains("max_iterations = 3"));
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn test_custom_weights_replace_defaults() {
        let project_dir = tempfile::tempdir().unwrap();
        fs::write(
            project_dir.path().join("tandem.toml"),
            "[evaluation.weights]\ncorrectness = 0.6\nsecurity = 0.4\n",
        )
        .unwrap();

        let config = extract(ConfigLoader::layered(None, project_dir.path(), None));
        let evaluation = config.evaluation.to_evaluation_config().unwrap();
        assert_eq!(evaluation.weights.criteria().len(), 2);
    }
}
