use std::time::Duration;

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use reqwest::Client;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Returns the shared reqwest client or creates one if it doesn't exist.
///
/// 不設定請求逾時，也不做重試，失敗與否交由各端點的處理方式決定。
pub fn shared_client() -> Result<Client> {
    CLIENT
        .get_or_try_init(|| {
            // 已經有其他地方安裝過 provider 時會回傳 Err，可以忽略
            let _ = rustls::crypto::ring::default_provider().install_default();

            Client::builder()
                // ===== 壓縮 =====
                .brotli(true)
                .gzip(true)
                .zstd(true)
                // ===== TCP =====
                .tcp_nodelay(true)
                .tcp_keepalive(Duration::from_secs(60))
                // ===== 連接池 =====
                .pool_max_idle_per_host(20)
                .pool_idle_timeout(Duration::from_secs(90))
                // ===== Cookie 和重定向 =====
                .cookie_store(true)
                .redirect(reqwest::redirect::Policy::limited(5))
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
        })
        .cloned()
}
