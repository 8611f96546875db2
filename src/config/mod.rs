use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub perf_id: Option<String>,
    pub timestamps: Option<Vec<String>>,
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub csrf_token: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<u32>,
    pub max_visible: Option<u32>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".dcsgap").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# dcsgap config
#
# Location (default):
#   ~/.dcsgap/config.yml

# Backend proxy that fronts the DCS gateway
base_url: http://localhost:8000

# Analysis target
# perf_id: PLTU-3
# timestamps:
#   - "2024-03-01 07:30:00"

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080
# header: "X-Plant-Unit: unit-3"
# csrf_token: ""

# Table
# sort: gap:desc
page: 1
page_size: 10
max_visible: 5

# Output (optional)
# output: ./analysis.json
# output_format: json

# Runtime
workers: 4

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
