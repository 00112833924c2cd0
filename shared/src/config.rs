use serde::Deserialize;

fn default_data_dir() -> String {
    "./data".into()
}

fn default_port() -> u16 {
    8004
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Directory holding the `<name>_middle.json` layout artifacts.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }
}
