use std::env;

use crate::imaging::MAX_IMAGE_SIZE;

// Multipart framing and the JSON `data` part ride on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub upload_limit_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let upload_limit_bytes = env::var("UPLOAD_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_IMAGE_SIZE + MULTIPART_OVERHEAD);
        Ok(Self {
            port,
            database_url,
            host,
            upload_limit_bytes,
        })
    }
}
