use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

/// Placeholder JWT secrets that must not be used outside development.
const PLACEHOLDER_SECRETS: &[&str] = &["secret-key", "change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub web_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("POSTAPI_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET.into());
        let db_path = lookup("POSTAPI_DB_PATH").unwrap_or_else(|| "postapi.db".into());
        let host = lookup("POSTAPI_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("POSTAPI_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("POSTAPI_PORT must be a port number")?;
        let web_dir = lookup("POSTAPI_WEB_DIR").unwrap_or_else(|| "./web".into());

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
            web_dir: web_dir.into(),
        })
    }

    pub fn warn_if_insecure(&self) {
        if PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str()) {
            warn!("POSTAPI_JWT_SECRET is unset or a placeholder; tokens can be forged. Set it before deploying.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.jwt_secret, DEFAULT_SECRET);
        assert_eq!(config.db_path, PathBuf::from("postapi.db"));
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.web_dir, PathBuf::from("./web"));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("POSTAPI_JWT_SECRET", "s3cret"),
            ("POSTAPI_DB_PATH", "/tmp/x.db"),
            ("POSTAPI_HOST", "127.0.0.1"),
            ("POSTAPI_PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn empty_secret_falls_back_and_bad_port_fails() {
        assert_eq!(config(&[("POSTAPI_JWT_SECRET", "")]).unwrap().jwt_secret, DEFAULT_SECRET);
        assert!(config(&[("POSTAPI_PORT", "http")]).is_err());
    }
}
