//! 畫面路由：把網址路徑對應到儀表板的各個畫面。
//!
//! 路由表在編譯期固定（[`ROUTES`]），只有 `/stock-trend/:tsCode` 帶參數，
//! 其餘路徑必須完全相符。解析是純函式，不會觸發任何導覽動作，
//! 找不到對應路徑時回傳 [`RouteError::NotFound`]，由外層應用程式決定如何呈現。

use std::borrow::Cow;

use hashbrown::HashMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

/// 個股走勢頁的路徑參數名稱
pub const TS_CODE: &str = "tsCode";

/// 路由對應的畫面
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumString)]
pub enum Destination {
    /// 首頁
    Index,
    /// 股票基本資料
    StockBasicInfo,
    /// 板塊資料
    SectorData,
    /// 游資名錄
    HotMoneyInfo,
    /// 個股走勢
    StockTrend,
    /// 每日漲跌停
    DailyLimitData,
    /// 游資每日交易明細
    DailyHmTradeData,
    /// 板塊每日漲跌停統計
    DailySectorLimitData,
}

impl Destination {
    pub fn iterator() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// 此畫面在路由表中的定義
    pub fn route(&self) -> &'static Route {
        match self {
            Destination::Index => &ROUTES[0],
            Destination::StockBasicInfo => &ROUTES[1],
            Destination::SectorData => &ROUTES[2],
            Destination::HotMoneyInfo => &ROUTES[3],
            Destination::StockTrend => &ROUTES[4],
            Destination::DailyLimitData => &ROUTES[5],
            Destination::DailyHmTradeData => &ROUTES[6],
            Destination::DailySectorLimitData => &ROUTES[7],
        }
    }
}

/// 路由的路徑樣式
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// 完全相符的固定路徑
    Literal(&'static str),
    /// `prefix` 之後接一個非空的路徑片段，片段以 `param` 為名轉交給畫面
    Param {
        prefix: &'static str,
        param: &'static str,
    },
}

impl Pattern {
    /// 樣式字串，例如 `/stock-trend/:tsCode`
    pub fn template(&self) -> Cow<'static, str> {
        match *self {
            Pattern::Literal(path) => Cow::Borrowed(path),
            Pattern::Param { prefix, param } => Cow::Owned(format!("{}/:{}", prefix, param)),
        }
    }

    fn capture<'a>(&self, path: &'a str) -> Option<Option<&'a str>> {
        match *self {
            Pattern::Literal(literal) => (path == literal).then_some(None),
            Pattern::Param { prefix, .. } => {
                let segment = path.strip_prefix(prefix)?.strip_prefix('/')?;
                if segment.is_empty() || segment.contains('/') {
                    return None;
                }
                Some(Some(segment))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Route {
    pub pattern: Pattern,
    pub name: &'static str,
    pub destination: Destination,
    /// 是否把路徑參數當作畫面的輸入
    pub props: bool,
}

/// 儀表板全部的路由
pub static ROUTES: [Route; 8] = [
    Route {
        pattern: Pattern::Literal("/"),
        name: "Index",
        destination: Destination::Index,
        props: false,
    },
    Route {
        pattern: Pattern::Literal("/stock-basic-info"),
        name: "StockBasicInfo",
        destination: Destination::StockBasicInfo,
        props: false,
    },
    Route {
        pattern: Pattern::Literal("/sector-data"),
        name: "SectorData",
        destination: Destination::SectorData,
        props: false,
    },
    Route {
        pattern: Pattern::Literal("/hot-money-info"),
        name: "HotMoneyInfo",
        destination: Destination::HotMoneyInfo,
        props: false,
    },
    Route {
        pattern: Pattern::Param {
            prefix: "/stock-trend",
            param: TS_CODE,
        },
        name: "StockTrend",
        destination: Destination::StockTrend,
        props: true,
    },
    Route {
        pattern: Pattern::Literal("/daily-limit-data"),
        name: "DailyLimitData",
        destination: Destination::DailyLimitData,
        props: false,
    },
    Route {
        pattern: Pattern::Literal("/daily-hm-trade-data"),
        name: "DailyHmTradeData",
        destination: Destination::DailyHmTradeData,
        props: true,
    },
    Route {
        pattern: Pattern::Literal("/daily-sector-limit-data"),
        name: "DailySectorLimitData",
        destination: Destination::DailySectorLimitData,
        props: false,
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches path `{path}`")]
    NotFound { path: String },
    #[error("route `{0}` needs a tsCode")]
    MissingTsCode(Destination),
    #[error("route `{0}` takes no path parameter")]
    UnexpectedTsCode(Destination),
}

/// 由路徑推導出、要交給畫面的輸入
pub type Inputs = HashMap<&'static str, String>;

/// 路徑解析的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub destination: Destination,
    pub inputs: Inputs,
}

impl Resolution {
    pub fn ts_code(&self) -> Option<&str> {
        self.inputs.get(TS_CODE).map(String::as_str)
    }
}

/// 把路徑解析成畫面與其輸入。
///
/// 查詢字串與 `#` 之後的片段不參與比對，結尾多一個 `/` 也視為相同路徑，
/// 但只容許一個：`//`、`/sector-data//` 都找不到對應的路由。
pub fn resolve(path: &str) -> Result<Resolution, RouteError> {
    let normalized = normalize(path);

    for route in ROUTES.iter() {
        let Some(captured) = route.pattern.capture(normalized) else {
            continue;
        };

        let mut inputs = Inputs::new();
        if let (Some(segment), Pattern::Param { param, .. }) = (captured, route.pattern) {
            if route.props {
                let value = urlencoding::decode(segment)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| segment.to_string());
                inputs.insert(param, value);
            }
        }

        return Ok(Resolution {
            destination: route.destination,
            inputs,
        });
    }

    Err(RouteError::NotFound {
        path: path.to_string(),
    })
}

/// 依畫面組出實際的路徑，只有個股走勢頁需要 `ts_code`
pub fn location(destination: Destination, ts_code: Option<&str>) -> Result<String, RouteError> {
    match (destination.route().pattern, ts_code) {
        (Pattern::Literal(path), None) => Ok(path.to_string()),
        (Pattern::Literal(_), Some(_)) => Err(RouteError::UnexpectedTsCode(destination)),
        (Pattern::Param { prefix, .. }, Some(code)) if !code.is_empty() => {
            Ok(format!("{}/{}", prefix, urlencoding::encode(code)))
        }
        (Pattern::Param { .. }, _) => Err(RouteError::MissingTsCode(destination)),
    }
}

/// 以路由名稱查詢，例如 `"StockTrend"`
pub fn route_by_name(name: &str) -> Option<&'static Route> {
    name.parse::<Destination>().ok().map(|d| d.route())
}

pub fn routes() -> &'static [Route] {
    &ROUTES
}

fn normalize(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let path = &path[..end];

    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() && !trimmed.ends_with('/') => trimmed,
        _ => path,
    }
}
