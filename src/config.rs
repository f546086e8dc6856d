use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_AUTH_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    pub auth_secret: String,
    /// Lifetime of minted auth tokens.
    pub auth_token_ttl_seconds: i64,
    /// Lifetime of a quiz access token.
    pub quiz_token_ttl_seconds: i64,
    /// Energy units one quiz generation costs.
    pub quiz_energy_cost: i64,
    /// Energy granted to a freshly registered user.
    pub starting_energy: i64,
    /// In-memory sessions idle beyond this are treated as abandoned.
    pub session_max_idle_seconds: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse("PORT").unwrap_or(3000);
        let host = env_parse("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:flashdeck.db".to_string());
        let auth_secret =
            std::env::var("AUTH_SECRET").unwrap_or_else(|_| DEFAULT_AUTH_SECRET.to_string());

        Self {
            host,
            port,
            log_level,
            database_url,
            auth_secret,
            auth_token_ttl_seconds: env_parse("AUTH_TOKEN_TTL_SECONDS").unwrap_or(86_400),
            quiz_token_ttl_seconds: env_parse("QUIZ_TOKEN_TTL_SECONDS").unwrap_or(300),
            quiz_energy_cost: env_parse("QUIZ_ENERGY_COST").unwrap_or(1),
            starting_energy: env_parse("STARTING_ENERGY").unwrap_or(5),
            session_max_idle_seconds: env_parse("SESSION_MAX_IDLE_SECONDS").unwrap_or(3_600),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}
