/*!
 * Configuration
 * Everything the service reads from the environment, resolved once at startup
 */
use bcrypt::{hash, DEFAULT_COST};
use thiserror::Error;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const IMAGEKIT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a secure, unique value in production")]
    InsecureJwtSecret,
    #[error("invalid bind address {0}")]
    InvalidAddress(String),
    #[error("failed to hash admin password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Admin credentials and token signing.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub admin_id: String,
    pub admin_email: String,
    pub admin_password_hash: String,
    pub token_expiry_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_id", &self.admin_id)
            .field("admin_email", &self.admin_email)
            .field("token_expiry_minutes", &self.token_expiry_minutes)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // ADMIN_HASH_PASSWORD is already a bcrypt hash; ADMIN_PASSWORD is plain text.
        let admin_password_hash = match env_opt("ADMIN_HASH_PASSWORD") {
            Some(hashed) => hashed,
            None => {
                let plain = env_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD);
                hash(plain, DEFAULT_COST)?
            }
        };

        Ok(Self {
            jwt_secret: env_or("JWT_SECRET", DEFAULT_JWT_SECRET),
            admin_id: env_or("ADMIN_ID", "admin"),
            admin_email: env_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            admin_password_hash,
            token_expiry_minutes: env_parse("ACCESS_TOKEN_EXPIRY_MINUTES", 12 * 60),
        })
    }

    pub fn uses_default_credentials(&self) -> bool {
        self.admin_email == DEFAULT_ADMIN_EMAIL
            || (env_opt("ADMIN_HASH_PASSWORD").is_none() && env_opt("ADMIN_PASSWORD").is_none())
    }
}

/// Where uploaded PDFs go.
#[derive(Clone)]
pub struct StorageConfig {
    /// ImageKit private key; when absent, files are written to `upload_dir`.
    pub imagekit_private_key: Option<String>,
    pub imagekit_upload_url: String,
    pub upload_folder: String,
    pub upload_dir: String,
    pub public_base_url: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("imagekit", &self.imagekit_private_key.is_some())
            .field("imagekit_upload_url", &self.imagekit_upload_url)
            .field("upload_folder", &self.upload_folder)
            .field("upload_dir", &self.upload_dir)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            imagekit_private_key: env_opt("IMAGEKIT_PRIVATE_KEY"),
            imagekit_upload_url: env_or("IMAGEKIT_UPLOAD_URL", IMAGEKIT_UPLOAD_URL),
            upload_folder: env_or("IMAGEKIT_UPLOAD_FOLDER", "/pdfs"),
            upload_dir: env_or("UPLOAD_DIR", "uploads/epapers"),
            public_base_url: env_or("PUBLIC_BASE_URL", ""),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // ALLOWED_ORIGINS is comma-separated; FRONTEND_ORIGIN is a single origin.
        let allowed_origins = env_opt("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .or_else(|| env_opt("FRONTEND_ORIGIN").map(|o| vec![o]))
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        let max_upload_mb: usize = env_parse("MAX_UPLOAD_MB", 50);

        Ok(Self {
            environment: env_or("ENVIRONMENT", "development"),
            host: env_or("HOST", "127.0.0.1"),
            port: env_parse("PORT", 3001),
            database_url: env_opt("DATABASE_URL"),
            allowed_origins,
            max_upload_bytes: max_upload_mb.max(1) * 1024 * 1024,
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::default(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuse to run in production with the insecure default JWT secret.
    pub fn check_production(&self) -> Result<(), ConfigError> {
        if !self.is_production() {
            return Ok(());
        }
        if self.auth.jwt_secret.is_empty() || self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::InsecureJwtSecret);
        }
        if self.auth.uses_default_credentials() {
            tracing::warn!(
                "SECURITY: admin credentials are using an insecure default. \
                 Set ADMIN_EMAIL and ADMIN_HASH_PASSWORD before going live."
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<std::net::SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            admin_id: "admin".to_string(),
            admin_email: "editor@dainik.test".to_string(),
            admin_password_hash: String::new(),
            token_expiry_minutes: 60,
        }
    }

    fn test_config(environment: &str, secret: &str) -> AppConfig {
        AppConfig {
            environment: environment.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_url: None,
            allowed_origins: vec![],
            max_upload_bytes: 1024,
            auth: test_auth(secret),
            storage: StorageConfig::default(),
        }
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        std::env::set_var("EPAPER_TEST_GARBAGE_PORT", "not-a-number");
        let port: u16 = env_parse("EPAPER_TEST_GARBAGE_PORT", 3001);
        assert_eq!(port, 3001);
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let config = test_config("production", DEFAULT_JWT_SECRET);
        assert!(matches!(
            config.check_production(),
            Err(ConfigError::InsecureJwtSecret)
        ));
    }

    #[test]
    fn test_development_allows_default_secret() {
        let config = test_config("development", DEFAULT_JWT_SECRET);
        assert!(config.check_production().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = test_config("development", "s3cret");
        assert_eq!(config.bind_addr().unwrap().port(), 3001);

        let mut bad = config.clone();
        bad.host = "not a host".to_string();
        assert!(bad.bind_addr().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let printed = format!("{:?}", test_auth("top-secret"));
        assert!(!printed.contains("top-secret"));
    }
}
