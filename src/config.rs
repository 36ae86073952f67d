use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub slow_query_secs: u64,
}

/// 缓存时长: 今日数据变化快, 其它时段一天
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_today_secs: u64,
    pub ttl_other_secs: u64,
    pub refresh_cooldown_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

// 日志里不输出密钥
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/faturas".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_query_secs: 5,
            },
            cache: CacheConfig {
                ttl_today_secs: 180,
                ttl_other_secs: 24 * 60 * 60,
                refresh_cooldown_secs: 30,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序: 默认值 -> config/default.* -> APP__ 前缀环境变量 -> DATABASE_URL
    ///
    /// 例: `APP__SERVER__PORT=9000`, `APP__AUTH__JWT_SECRET=...`
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("APP").prefix_separator("__").separator("__"));

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_round_trip_through_config() {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .set_override("server.port", 9000)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cache.ttl_today_secs, 180);
        assert_eq!(config.cache.refresh_cooldown_secs, 30);
    }

    #[test]
    fn debug_output_hides_the_jwt_secret() {
        let auth = AuthConfig {
            jwt_secret: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));
    }
}
