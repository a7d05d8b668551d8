use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.yaml";

pub fn load_app_settings() -> Result<AppSettings> {
    load_app_settings_from(Path::new(DEFAULT_SETTINGS_PATH))
}

/// Reads the YAML settings file, overlaid by `APP__`-prefixed environment variables.
/// A `.env` file in the working directory is loaded first so secrets can live there.
pub fn load_app_settings_from(config_path: &Path) -> Result<AppSettings> {
    dotenv::from_path(".env").ok();
    let config_path = config_path.canonicalize()?;
    debug!("Loading settings from {}", config_path.display());

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    AppSettings::try_from(raw_settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_yaml_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            r#"
gemini:
  base_url: "http://localhost:9000/"
  model: "gemini-test"
compression:
  max_dimension: 640
  quality: 0.5
logging:
  level: "debug"
secrets:
  gemini_api_key: "from-file"
"#,
        )?;

        let settings = load_app_settings_from(&path)?;
        assert_eq!(settings.gemini.base_url, "http://localhost:9000");
        assert_eq!(settings.gemini.model, "gemini-test");
        assert_eq!(settings.compression.max_dimension, 640);
        assert!((settings.compression.quality - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.logging.level, "debug");
        assert!(!settings.secrets.gemini_api_key.is_empty());
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_app_settings_from(Path::new("does/not/exist.yaml"));
        assert!(result.is_err());
    }
}
