use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub engine: EngineConfig,
    pub build: BuildConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine program name or path
    pub program: String,
    /// Pass -shell-escape on every invocation
    pub shell_escape: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "pdflatex".to_string(),
            shell_escape: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Engine passes per deck; two settle cross-references
    pub passes: u32,
    /// Source extension to discover
    pub source_ext: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            passes: 2,
            source_ext: "tex".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output tree directory name, under the scan root
    pub dir: String,
    /// Artifact extension the engine produces
    pub artifact_ext: String,
    /// Run log file name, written at the scan root
    pub run_log: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "pdf_output".to_string(),
            artifact_ext: "pdf".to_string(),
            run_log: "deckbuild.log".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            engine: EngineConfig::default(),
            build: BuildConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir
                .join(project_name)
                .join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!(
                            "Failed to load config from {}: {}",
                            primary_config.display(),
                            e
                        );
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!(
                        "Failed to load config from {}: {}",
                        fallback_config.display(),
                        e
                    );
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.program, "pdflatex");
        assert!(!config.engine.shell_escape);
        assert_eq!(config.build.passes, 2);
        assert_eq!(config.build.source_ext, "tex");
        assert_eq!(config.output.dir, "pdf_output");
        assert_eq!(config.output.run_log, "deckbuild.log");
    }

    #[test]
    fn test_config_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deckbuild.yml");
        fs::write(
            &path,
            "engine:\n  program: xelatex\n  shell_escape: true\nbuild:\n  passes: 3\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engine.program, "xelatex");
        assert!(config.engine.shell_escape);
        assert_eq!(config.build.passes, 3);
        // Unspecified sections keep defaults
        assert_eq!(config.output.dir, "pdf_output");
    }

    #[test]
    fn test_config_load_missing_explicit_file_is_error() {
        let path = PathBuf::from("/no/such/deckbuild.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_config_load_rejects_malformed_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deckbuild.yml");
        fs::write(&path, "engine: [not, a, mapping").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let restored: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored.engine.program, config.engine.program);
        assert_eq!(restored.build.passes, config.build.passes);
    }
}
