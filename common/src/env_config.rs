use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server: database and Redis
/// connection details, JWT configuration, server host and port,
/// CORS and logging preferences, tenant trial length, rate limits
/// and the base URLs of the push and invoicing providers.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// The URL of the Redis server used for location pub/sub.
    /// Empty when the in-memory broadcaster should be used.
    pub redis_url: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Length of the trial granted to a newly registered company, in days.
    pub trial_days: i64,
    /// Requests per second accepted by the whole server.
    pub global_rate_limit: u32,
    /// Login attempts per minute accepted from a single IP address.
    pub login_rate_limit: u32,
    /// Push notification endpoint (Expo push API).
    pub push_api_url: String,
    /// Default base URL of the electronic invoicing provider.
    pub invoicing_api_url: String,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
///
/// The secret also derives the key of the cookie session, so it must be
/// at least 32 bytes long.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Creates a new `JwtConfig` instance from environment variables.
    ///
    /// - `JWT_SECRET`: Required, at least 32 bytes.
    /// - `JWT_EXPIRATION_HOURS`: Optional. Defaults to 24 hours if not provided.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or too short, or if
    /// `JWT_EXPIRATION_HOURS` cannot be parsed.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        assert!(
            secret.len() >= 32,
            "JWT_SECRET must be at least 32 bytes long"
        );

        JwtConfig {
            secret,
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a valid number"),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret key for JWT signing (via `JwtConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `REDIS_URL`: Redis server (default: empty, in-memory broadcaster)
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `TRIAL_DAYS`: Trial length for new companies (default: 14)
    /// - `GLOBAL_RATE_LIMIT`: Requests per second (default: 50)
    /// - `LOGIN_RATE_LIMIT`: Login attempts per minute per IP (default: 5)
    /// - `PUSH_API_URL`: Push endpoint (default: Expo push API)
    /// - `INVOICING_API_URL`: Invoicing provider base URL
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            redis_url: env::var("REDIS_URL").unwrap_or_default(),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_or("PORT", 8080),
            num_workers: parse_or("WORKERS", 4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            trial_days: parse_or("TRIAL_DAYS", 14),
            global_rate_limit: parse_or("GLOBAL_RATE_LIMIT", 50),
            login_rate_limit: parse_or("LOGIN_RATE_LIMIT", 5),
            push_api_url: env::var("PUSH_API_URL")
                .unwrap_or_else(|_| "https://exp.host/--/api/v2/push/send".to_string()),
            invoicing_api_url: env::var("INVOICING_API_URL")
                .unwrap_or_else(|_| "https://api-sandbox.factus.com.co".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
