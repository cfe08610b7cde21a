use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Parley broadcast relay server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "parley-server", version, about = "Parley broadcast relay server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PARLEY_PORT", default_value = "9999")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "PARLEY_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./parley.toml")]
    pub config: String,

    /// Directory of static client assets served on non-API paths
    #[arg(long, env = "PARLEY_ASSETS_DIR", default_value = "./public")]
    pub assets_dir: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "PARLEY_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9999,
            bind_address: "0.0.0.0".to_string(),
            config: "./parley.toml".to_string(),
            assets_dir: "./public".to_string(),
            json_logs: false,
            generate_config: false,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (PARLEY_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("PARLEY_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Parley Broadcast Relay Configuration
# Place this file at ./parley.toml or specify with --config <path>
# All settings can be overridden via environment variables (PARLEY_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 9999)
# port = 9999

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Directory of static client assets served on non-API paths
# assets_dir = "./public"

# Enable structured JSON logging for Docker/production
# json_logs = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 9999);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.assets_dir, "./public");
        assert!(!config.json_logs);
    }

    #[test]
    fn template_mentions_every_overridable_key() {
        let template = generate_config_template();
        for key in ["port", "bind_address", "assets_dir", "json_logs"] {
            assert!(template.contains(key), "template missing {key}");
        }
    }
}
