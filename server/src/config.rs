use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_DATABASE: &str = "data/readings.db";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Parser)]
#[command(author, version, about = "HTTP front door for the panel telemetry reading store")]
pub struct Args {
    /// Listening port (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,
    /// Path to the reading database (overrides DATABASE_PATH)
    #[arg(long)]
    pub database: Option<PathBuf>,
    /// Directory served as the static fallback (overrides STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

/// Effective process configuration, built once at startup and passed into
/// handler construction.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub database: PathBuf,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Resolve the configuration: CLI flags win over environment variables,
    /// which win over the defaults.
    pub fn resolve(args: &Args) -> anyhow::Result<Self> {
        let port = match args.port {
            Some(port) => port,
            None => match env::var("PORT") {
                Ok(raw) => raw
                    .parse()
                    .with_context(|| format!("parsing PORT value {:?}", raw))?,
                Err(_) => DEFAULT_PORT,
            },
        };

        let database = args
            .database
            .clone()
            .or_else(|| env::var_os("DATABASE_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        let static_dir = args
            .static_dir
            .clone()
            .or_else(|| env::var_os("STATIC_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            port,
            database,
            static_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_take_precedence_over_everything() {
        let args = Args {
            port: Some(8080),
            database: Some(PathBuf::from("/tmp/other.db")),
            static_dir: Some(PathBuf::from("/tmp/assets")),
        };
        let config = ServerConfig::resolve(&args).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.static_dir, PathBuf::from("/tmp/assets"));
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        env::remove_var("PORT");
        env::remove_var("DATABASE_PATH");
        env::remove_var("STATIC_DIR");

        let args = Args {
            port: None,
            database: None,
            static_dir: None,
        };
        let config = ServerConfig::resolve(&args).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
    }
}
