use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct LimitsConfig {
    pub requests_per_minute: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct EngineConfig {
    pub msf_path: Option<String>,
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub workspace_dir: Option<String>,
    pub limits: Option<LimitsConfig>,
    pub engine: Option<EngineConfig>,
}

pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new("recond.yaml");
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&s).ok()
}
