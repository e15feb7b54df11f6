//! Process configuration, read from flags or the environment.

use clap::Parser;
use tollgate_auth::AuthConfig;
use tollgate_db::DbConfig;

// No `Debug`: this struct holds key material and the pepper.
#[derive(Parser)]
#[command(name = "tollgate", version, about = "Issues and verifies identity tokens")]
pub struct ServerConfig {
    /// Base64-encoded PEM (PKCS#8) EC private key used to sign tokens.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Base64-encoded PEM (SPKI) EC public key used to verify tokens.
    #[arg(long, env = "PUBLIC_KEY")]
    pub public_key: String,

    /// Access token lifetime in seconds.
    #[arg(
        long,
        env = "TOLLGATE_ACCESS_TTL_SECS",
        default_value_t = 900,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    #[arg(
        long,
        env = "TOLLGATE_REFRESH_TTL_SECS",
        default_value_t = 86_400,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub refresh_ttl_secs: u64,

    /// Server-side secret prepended to passwords before hashing.
    #[arg(long, env = "TOLLGATE_PEPPER", hide_env_values = true)]
    pub pepper: Option<String>,

    /// Let users with `is_active = false` log in and refresh.
    #[arg(long, env = "TOLLGATE_ALLOW_INACTIVE")]
    pub allow_inactive: bool,

    #[arg(long, env = "TOLLGATE_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "TOLLGATE_DB_NAMESPACE", default_value = "tollgate")]
    pub db_namespace: String,

    #[arg(long, env = "TOLLGATE_DB_DATABASE", default_value = "users")]
    pub db_database: String,

    #[arg(long, env = "TOLLGATE_DB_USERNAME", default_value = "root")]
    pub db_username: String,

    #[arg(long, env = "TOLLGATE_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,
}

impl ServerConfig {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            access_token_lifetime_secs: self.access_ttl_secs,
            refresh_token_lifetime_secs: self.refresh_ttl_secs,
            pepper: self.pepper.clone(),
            reject_inactive: !self.allow_inactive,
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> ServerConfig {
        let mut args = vec!["tollgate", "--private-key", "cHJpdg==", "--public-key", "cHVi"];
        args.extend_from_slice(extra);
        ServerConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_match_auth_defaults() {
        let auth = parse(&[]).auth_config();
        let defaults = AuthConfig::default();
        assert_eq!(auth.access_token_lifetime_secs, defaults.access_token_lifetime_secs);
        assert_eq!(auth.refresh_token_lifetime_secs, defaults.refresh_token_lifetime_secs);
        assert!(auth.reject_inactive);
        assert!(auth.pepper.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--access-ttl-secs",
            "60",
            "--allow-inactive",
            "--db-url",
            "db.internal:8000",
        ]);
        assert_eq!(config.auth_config().access_token_lifetime_secs, 60);
        assert!(!config.auth_config().reject_inactive);
        assert_eq!(config.db_config().url, "db.internal:8000");
    }

    #[test]
    fn zero_lifetimes_are_refused() {
        let base = ["tollgate", "--private-key", "cHJpdg==", "--public-key", "cHVi"];
        for flag in ["--access-ttl-secs", "--refresh-ttl-secs"] {
            let mut args = base.to_vec();
            args.extend_from_slice(&[flag, "0"]);
            assert!(ServerConfig::try_parse_from(args).is_err(), "{flag} 0 accepted");
        }
        let config = parse(&["--refresh-ttl-secs", "1"]);
        assert_eq!(config.auth_config().refresh_token_lifetime_secs, 1);
    }

    #[test]
    fn keys_are_required() {
        assert!(ServerConfig::try_parse_from(["tollgate"]).is_err());
    }
}
