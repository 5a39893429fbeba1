use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

pub(crate) const CONFIG_FILE: &str = "config.yaml";

lazy_static::lazy_static! {
    pub(crate) static ref PROJECT_NAME: String = "REDIS_DASHBOARD".to_string();
    static ref CONFIG_FOLDER: Option<PathBuf> = env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
}

/// Directory searched for `config.yaml` when no explicit `--config` file is given.
pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

pub(crate) fn default_config_file() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "redis-dashboard", env!("CARGO_PKG_NAME"))
}
