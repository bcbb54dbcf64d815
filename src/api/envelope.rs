use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `{data, total?}` 的回應外殼。
///
/// 後端多餘的欄位保留在 `extra`，序列化回去時與原始內容相同。
/// `total` 為 `None` 代表回應中沒有這個欄位，`Some(Value::Null)` 代表值為 `null`。
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Envelope {
    pub data: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// `{data: []}`
    pub fn empty() -> Self {
        Default::default()
    }

    /// `{data: [], total: 0}`
    pub fn empty_with_total() -> Self {
        Envelope {
            total: Some(Value::from(0)),
            ..Default::default()
        }
    }

    /// 數值型態的 `total`
    pub fn total_count(&self) -> Option<i64> {
        self.total.as_ref().and_then(Value::as_i64)
    }
}

/// 欄位存在時一律回傳 `Some`，`null` 也不例外
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// 請求失敗時回傳給呼叫端的替代內容
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// `{data: [], total: 0}`，分頁查詢使用
    DataAndTotal,
    /// `{data: []}`
    DataOnly,
}

impl Fallback {
    pub fn envelope(self) -> Envelope {
        match self {
            Fallback::DataAndTotal => Envelope::empty_with_total(),
            Fallback::DataOnly => Envelope::empty(),
        }
    }
}

/// 端點成功時的回應內容，未經修改。
///
/// 大多數端點回傳 [`Envelope`]，板塊漲跌停與同花順指數則直接回傳陣列，
/// 以 `Other` 原樣保存。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Payload {
    Envelope(Envelope),
    Other(Value),
}

impl Payload {
    /// 資料列：外殼的 `data`，或本身就是陣列的回應
    pub fn records(&self) -> &[Value] {
        match self {
            Payload::Envelope(envelope) => &envelope.data,
            Payload::Other(Value::Array(items)) => items,
            Payload::Other(_) => &[],
        }
    }

    pub fn total(&self) -> Option<i64> {
        match self {
            Payload::Envelope(envelope) => envelope.total_count(),
            Payload::Other(_) => None,
        }
    }

    pub fn as_envelope(&self) -> Option<&Envelope> {
        match self {
            Payload::Envelope(envelope) => Some(envelope),
            Payload::Other(_) => None,
        }
    }
}

impl From<Envelope> for Payload {
    fn from(envelope: Envelope) -> Self {
        Payload::Envelope(envelope)
    }
}
