use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable prefix for every service setting.
pub const ENV_PREFIX: &str = "APP";

/// Resolve the `config/` directory of a service.
///
/// Works both when the process runs from the workspace root and from the
/// service's own directory (the case for `cargo test`).
pub fn configuration_directory(base_path: &Path, service_dir: &str) -> PathBuf {
    if base_path.ends_with(service_dir) {
        base_path.join("config")
    } else {
        base_path.join(service_dir).join("config")
    }
}

/// Load layered settings for a service.
///
/// `config/base.yaml` is read first, then overridden by environment
/// variables such as `APP_SERVER__PORT=9000`.
pub fn load_settings<T: DeserializeOwned>(service_dir: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let directory = configuration_directory(&base_path, service_dir);

    let settings = Cfg::builder()
        .add_source(File::from(directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_from_workspace_root() {
        let dir = configuration_directory(Path::new("/srv/app"), "image-studio");
        assert_eq!(dir, PathBuf::from("/srv/app/image-studio/config"));
    }

    #[test]
    fn resolves_from_service_directory() {
        let dir = configuration_directory(Path::new("/srv/app/image-studio"), "image-studio");
        assert_eq!(dir, PathBuf::from("/srv/app/image-studio/config"));
    }

    #[test]
    fn missing_base_file_is_a_config_error() {
        let err = load_settings::<serde_json::Value>("no-such-service").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
