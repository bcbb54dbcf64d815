//! 股市儀表板的前端核心：畫面路由與後端資料存取。
//!
//! - [`router`]：把網址路徑解析成畫面與畫面輸入
//! - [`api`]：對後端 `/api/*` 端點的唯讀查詢

pub mod api;
pub mod config;
pub mod logging;
pub mod router;

pub use api::{ApiClient, ApiError, DashboardApi, Endpoint, Envelope, Payload};
pub use router::{resolve, Destination, Resolution, RouteError};
