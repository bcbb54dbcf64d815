//! 各端點的查詢參數。
//!
//! 欄位全部是 `Option`，只有呼叫端設定過的欄位才會出現在查詢字串中，
//! 這一層不補預設值也不做驗證，分頁等邏輯交由後端處理。

use serde::{Deserialize, Serialize};

/// `/api/get_hotmoney_data`
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HotMoneyParams {
    /// 游資名稱
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// `/api/get_daily_hotmoney_trade_data`
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyHotMoneyTradeParams {
    /// 游資名稱
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hm_name: Option<String>,
    /// 交易日，格式 yyyyMMdd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    /// 股票名稱
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_name: Option<String>,
    /// 股票代碼，例如 600519.SH
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// `/api/get_stock_basic_info`
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockBasicInfoParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 所屬產業
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// 上市日期區間起
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// 上市日期區間迄
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// `/api/get_daily_data`，後端用的是 snake_case 的 `ts_code`
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct DailyDataParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_code: Option<String>,
}

impl DailyDataParams {
    pub fn new(ts_code: impl Into<String>) -> Self {
        DailyDataParams {
            ts_code: Some(ts_code.into()),
        }
    }
}
