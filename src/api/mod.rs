//! 儀表板後端的資料存取層。
//!
//! 每個端點對應一個操作，每次呼叫只送出一個 GET。除了板塊資料之外，
//! 其餘操作在請求失敗時都會記錄一筆錯誤並回傳固定的替代內容（見 [`Fallback`]），
//! 不會把錯誤往上拋；板塊資料則把 [`ApiError`] 原封不動交給呼叫端。

use std::{fmt, sync::Arc, time::Instant};

use anyhow::Result;
use async_trait::async_trait;
use concat_string::concat_string;
use reqwest::Client;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

pub use crate::api::{
    envelope::{Envelope, Fallback, Payload},
    error::ApiError,
    params::{DailyDataParams, DailyHotMoneyTradeParams, HotMoneyParams, StockBasicInfoParams},
};
use crate::{config::SETTINGS, logging};

pub mod envelope;
pub mod error;
pub mod http;
pub mod params;

/// 後端提供的端點
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Endpoint {
    #[strum(to_string = "sector data")]
    SectorData,
    #[strum(to_string = "hot money data")]
    HotMoney,
    #[strum(to_string = "daily hot money trade data")]
    DailyHotMoneyTrade,
    #[strum(to_string = "stock basic info")]
    StockBasicInfo,
    #[strum(to_string = "daily data")]
    DailyData,
    #[strum(to_string = "daily limit data")]
    DailyLimit,
    #[strum(to_string = "daily sector limit data")]
    DailySectorLimit,
    #[strum(to_string = "all ths index")]
    AllThsIndex,
}

impl Endpoint {
    pub fn iterator() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SectorData => "/api/sector_data",
            Endpoint::HotMoney => "/api/get_hotmoney_data",
            Endpoint::DailyHotMoneyTrade => "/api/get_daily_hotmoney_trade_data",
            Endpoint::StockBasicInfo => "/api/get_stock_basic_info",
            Endpoint::DailyData => "/api/get_daily_data",
            Endpoint::DailyLimit => "/api/get_daily_limit_data",
            Endpoint::DailySectorLimit => "/api/get_daily_sector_limit_data",
            Endpoint::AllThsIndex => "/api/get_all_ths_index",
        }
    }

    /// 是否把呼叫端的參數當作查詢字串送出
    pub fn forwards_params(&self) -> bool {
        matches!(
            self,
            Endpoint::HotMoney
                | Endpoint::DailyHotMoneyTrade
                | Endpoint::StockBasicInfo
                | Endpoint::DailyData
        )
    }

    /// 失敗時的替代內容；`None` 代表錯誤會交給呼叫端
    pub fn fallback(&self) -> Option<Fallback> {
        match self {
            Endpoint::SectorData => None,
            Endpoint::HotMoney | Endpoint::DailyHotMoneyTrade | Endpoint::StockBasicInfo => {
                Some(Fallback::DataAndTotal)
            }
            Endpoint::DailyData
            | Endpoint::DailyLimit
            | Endpoint::DailySectorLimit
            | Endpoint::AllThsIndex => Some(Fallback::DataOnly),
        }
    }
}

/// 儀表板畫面使用的資料介面
#[async_trait]
pub trait DashboardApi {
    /// 板塊資料，失敗時回傳錯誤
    async fn sector_data(&self) -> Result<Payload, ApiError>;
    async fn hot_money_data(&self, params: &HotMoneyParams) -> Payload;
    async fn daily_hot_money_trade_data(&self, params: &DailyHotMoneyTradeParams) -> Payload;
    async fn stock_basic_info(&self, params: &StockBasicInfoParams) -> Payload;
    async fn daily_data(&self, params: &DailyDataParams) -> Payload;
    async fn daily_limit_data(&self) -> Payload;
    async fn daily_sector_limit_data(&self) -> Payload;
    /// 同花順行業與概念指數清單
    async fn all_ths_index(&self) -> Payload;
}

/// 請求失敗時接收診斷訊息的地方
pub type Reporter = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    reporter: Reporter,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// `base_url` 例如 `http://127.0.0.1:5000`，結尾的 `/` 會被移除
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(ApiClient {
            http: http::shared_client()?,
            base_url,
            reporter: Arc::new(logging::error_file_async),
        })
    }

    /// 使用 app.json 中的 `api.base_url`
    pub fn from_settings() -> Result<Self> {
        Self::new(SETTINGS.api.base_url.as_str())
    }

    /// 替換預設的錯誤紀錄方式（預設寫入 error 日誌檔）
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        concat_string!(self.base_url, endpoint.path())
    }

    async fn fetch<P>(&self, endpoint: Endpoint, params: Option<&P>) -> Result<Payload, ApiError>
    where
        P: Serialize + ?Sized + Sync,
    {
        let url = self.url(endpoint);
        let mut rb = self.http.get(&url);
        if let Some(p) = params {
            rb = rb.query(p);
        }

        let start = Instant::now();
        let response = rb
            .send()
            .await
            .map_err(|source| ApiError::Request { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Request { endpoint, source })?;

        logging::info_file_async(format!(
            "GET:{} {} {} ms",
            url,
            status,
            start.elapsed().as_millis()
        ));

        serde_json::from_slice::<Payload>(&body)
            .map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn fetch_or_fallback<P>(&self, endpoint: Endpoint, params: Option<&P>) -> Payload
    where
        P: Serialize + ?Sized + Sync,
    {
        match self.fetch(endpoint, params).await {
            Ok(payload) => payload,
            Err(why) => {
                (self.reporter)(format!("Error fetching {}: {}", endpoint, why));
                endpoint
                    .fallback()
                    .map(Fallback::envelope)
                    .unwrap_or_default()
                    .into()
            }
        }
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn sector_data(&self) -> Result<Payload, ApiError> {
        self.fetch::<()>(Endpoint::SectorData, None).await
    }

    async fn hot_money_data(&self, params: &HotMoneyParams) -> Payload {
        self.fetch_or_fallback(Endpoint::HotMoney, Some(params)).await
    }

    async fn daily_hot_money_trade_data(&self, params: &DailyHotMoneyTradeParams) -> Payload {
        self.fetch_or_fallback(Endpoint::DailyHotMoneyTrade, Some(params))
            .await
    }

    async fn stock_basic_info(&self, params: &StockBasicInfoParams) -> Payload {
        self.fetch_or_fallback(Endpoint::StockBasicInfo, Some(params))
            .await
    }

    async fn daily_data(&self, params: &DailyDataParams) -> Payload {
        self.fetch_or_fallback(Endpoint::DailyData, Some(params)).await
    }

    async fn daily_limit_data(&self) -> Payload {
        self.fetch_or_fallback::<()>(Endpoint::DailyLimit, None).await
    }

    async fn daily_sector_limit_data(&self) -> Payload {
        self.fetch_or_fallback::<()>(Endpoint::DailySectorLimit, None)
            .await
    }

    async fn all_ths_index(&self) -> Payload {
        self.fetch_or_fallback::<()>(Endpoint::AllThsIndex, None).await
    }
}

#[cfg(test)]
mod tests;
