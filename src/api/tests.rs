use std::sync::{Arc, Mutex};

use axum::{
    extract::Query,
    http::{header, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::*;

#[derive(Debug, Clone)]
struct Received {
    path: String,
    query: Option<String>,
    pairs: Vec<(String, String)>,
}

/// 以 axum 啟動的假後端，記錄收到的請求並回傳固定內容
struct MockBackend {
    base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl MockBackend {
    async fn start(status: StatusCode, body: &'static str) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = received.clone();
        let app = Router::new().fallback(
            move |uri: Uri, Query(pairs): Query<Vec<(String, String)>>| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(Received {
                        path: uri.path().to_string(),
                        query: uri.query().map(str::to_string),
                        pairs,
                    });
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                }
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            base_url: format!("http://{}", addr),
            received,
        }
    }

    fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

/// 回傳一個沒有任何服務在聽的位址
async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn client_with_reports(base_url: &str) -> (ApiClient, Arc<Mutex<Vec<String>>>) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();
    let client = ApiClient::new(base_url)
        .unwrap()
        .with_reporter(move |msg| sink.lock().unwrap().push(msg));

    (client, reports)
}

/// 呼叫所有失敗時會回傳替代內容的操作
async fn call_swallowing<A: DashboardApi + Sync>(api: &A) -> Vec<(Endpoint, Payload)> {
    vec![
        (
            Endpoint::HotMoney,
            api.hot_money_data(&HotMoneyParams::default()).await,
        ),
        (
            Endpoint::DailyHotMoneyTrade,
            api.daily_hot_money_trade_data(&DailyHotMoneyTradeParams::default())
                .await,
        ),
        (
            Endpoint::StockBasicInfo,
            api.stock_basic_info(&StockBasicInfoParams::default()).await,
        ),
        (
            Endpoint::DailyData,
            api.daily_data(&DailyDataParams::new("600519.SH")).await,
        ),
        (Endpoint::DailyLimit, api.daily_limit_data().await),
        (Endpoint::DailySectorLimit, api.daily_sector_limit_data().await),
        (Endpoint::AllThsIndex, api.all_ths_index().await),
    ]
}

fn expected_fallback(endpoint: Endpoint) -> Value {
    match endpoint {
        Endpoint::HotMoney | Endpoint::DailyHotMoneyTrade | Endpoint::StockBasicInfo => {
            json!({ "data": [], "total": 0 })
        }
        _ => json!({ "data": [] }),
    }
}

#[tokio::test]
async fn test_daily_limit_data_server_error_returns_fallback() {
    let backend =
        MockBackend::start(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).await;
    let (client, reports) = client_with_reports(&backend.base_url);

    let payload = client.daily_limit_data().await;

    assert_eq!(payload, Payload::Envelope(Envelope::empty()));
    assert_eq!(serde_json::to_value(&payload).unwrap(), json!({ "data": [] }));

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("daily limit data"), "{}", reports[0]);
    assert!(reports[0].contains("500"), "{}", reports[0]);

    let received = backend.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].path, "/api/get_daily_limit_data");
}

#[tokio::test]
async fn test_swallowing_operations_fall_back_on_server_error() {
    let backend = MockBackend::start(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;
    let (client, reports) = client_with_reports(&backend.base_url);

    let results = call_swallowing(&client).await;

    assert_eq!(results.len(), 7);
    for (endpoint, payload) in &results {
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            expected_fallback(*endpoint),
            "{}",
            endpoint
        );
    }
    assert_eq!(reports.lock().unwrap().len(), results.len());
}

#[tokio::test]
async fn test_swallowing_operations_fall_back_when_unreachable() {
    let (client, reports) = client_with_reports(&unreachable_base_url().await);

    let results = call_swallowing(&client).await;

    for (endpoint, payload) in &results {
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            expected_fallback(*endpoint),
            "{}",
            endpoint
        );
    }
    assert_eq!(reports.lock().unwrap().len(), results.len());
}

#[tokio::test]
async fn test_swallowing_operations_fall_back_on_invalid_json() {
    let backend = MockBackend::start(StatusCode::OK, "<html>oops</html>").await;
    let (client, reports) = client_with_reports(&backend.base_url);

    let payload = client.hot_money_data(&HotMoneyParams::default()).await;

    assert_eq!(payload, Payload::Envelope(Envelope::empty_with_total()));
    assert_eq!(reports.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sector_data_propagates_server_error() {
    let backend = MockBackend::start(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;
    let (client, reports) = client_with_reports(&backend.base_url);

    match client.sector_data().await {
        Err(ApiError::Status { endpoint, status }) => {
            assert_eq!(endpoint, Endpoint::SectorData);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(reports.lock().unwrap().is_empty());
    assert_eq!(backend.received()[0].path, "/api/sector_data");
}

#[tokio::test]
async fn test_sector_data_propagates_transport_error() {
    let (client, reports) = client_with_reports(&unreachable_base_url().await);

    let err = client.sector_data().await.unwrap_err();

    assert!(matches!(err, ApiError::Request { .. }), "{:?}", err);
    assert_eq!(err.endpoint(), Endpoint::SectorData);
    assert!(reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sector_data_propagates_decode_error() {
    let backend = MockBackend::start(StatusCode::OK, "not json").await;
    let (client, _) = client_with_reports(&backend.base_url);

    let err = client.sector_data().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_success_returns_body_unmodified() {
    let body = r#"{"data":[{"ts_code":"600519.SH","name":"貴州茅台","industry":"白酒"}],"total":1,"page":1}"#;
    let backend = MockBackend::start(StatusCode::OK, body).await;
    let (client, reports) = client_with_reports(&backend.base_url);

    let payload = client
        .stock_basic_info(&StockBasicInfoParams::default())
        .await;
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        serde_json::from_str::<Value>(body).unwrap()
    );
    assert_eq!(payload.total(), Some(1));

    let sector = client.sector_data().await.unwrap();
    assert_eq!(sector, payload);
    assert!(reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_null_total_is_returned_as_is() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"data":[1],"total":null}"#).await;
    let (client, reports) = client_with_reports(&backend.base_url);

    let payload = client.hot_money_data(&HotMoneyParams::default()).await;

    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({ "data": [1], "total": null })
    );
    assert_eq!(payload.total(), None);
    assert!(reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bare_array_body_is_returned_as_is() {
    let body = r#"[{"ts_code":"885311.TI","name":"智能電網","count":120,"type":"N"}]"#;
    let backend = MockBackend::start(StatusCode::OK, body).await;
    let (client, _) = client_with_reports(&backend.base_url);

    let payload = client.all_ths_index().await;

    assert_eq!(payload, Payload::Other(serde_json::from_str(body).unwrap()));
    assert_eq!(payload.records().len(), 1);
}

#[tokio::test]
async fn test_forwarded_params_equal_caller_supplied() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"data":[]}"#).await;
    let (client, _) = client_with_reports(&backend.base_url);

    client
        .hot_money_data(&HotMoneyParams {
            name: Some("章盟主".to_string()),
            page: Some(2),
            page_size: Some(20),
        })
        .await;
    client
        .daily_hot_money_trade_data(&DailyHotMoneyTradeParams {
            hm_name: Some("炒股養家".to_string()),
            trade_date: Some("20240517".to_string()),
            ts_code: Some("600519.SH".to_string()),
            ..Default::default()
        })
        .await;
    client
        .stock_basic_info(&StockBasicInfoParams {
            industry: Some("銀行".to_string()),
            start_date: Some("20000101".to_string()),
            end_date: Some("20241231".to_string()),
            page_size: Some(50),
            ..Default::default()
        })
        .await;
    client
        .daily_data(&DailyDataParams::new("000001.SZ"))
        .await;

    let pairs = |items: &[(&str, &str)]| -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };

    let received = backend.received();
    assert_eq!(received.len(), 4);

    assert_eq!(received[0].path, "/api/get_hotmoney_data");
    assert_eq!(
        received[0].pairs,
        pairs(&[("name", "章盟主"), ("page", "2"), ("pageSize", "20")])
    );

    assert_eq!(received[1].path, "/api/get_daily_hotmoney_trade_data");
    assert_eq!(
        received[1].pairs,
        pairs(&[
            ("hmName", "炒股養家"),
            ("tradeDate", "20240517"),
            ("tsCode", "600519.SH")
        ])
    );

    assert_eq!(received[2].path, "/api/get_stock_basic_info");
    assert_eq!(
        received[2].pairs,
        pairs(&[
            ("industry", "銀行"),
            ("startDate", "20000101"),
            ("endDate", "20241231"),
            ("pageSize", "50")
        ])
    );

    assert_eq!(received[3].path, "/api/get_daily_data");
    assert_eq!(received[3].pairs, pairs(&[("ts_code", "000001.SZ")]));
}

#[tokio::test]
async fn test_forwarded_params_with_reserved_characters_arrive_verbatim() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"data":[]}"#).await;
    let (client, _) = client_with_reports(&backend.base_url);

    client
        .hot_money_data(&HotMoneyParams {
            name: Some("A&B=C D+E".to_string()),
            ..Default::default()
        })
        .await;
    client
        .daily_data(&DailyDataParams::new("600519.SH&page=9"))
        .await;

    let received = backend.received();
    assert_eq!(
        received[0].pairs,
        vec![("name".to_string(), "A&B=C D+E".to_string())]
    );
    assert_eq!(
        received[1].pairs,
        vec![("ts_code".to_string(), "600519.SH&page=9".to_string())]
    );
}

#[tokio::test]
async fn test_empty_params_inject_nothing() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"data":[],"total":0}"#).await;
    let (client, _) = client_with_reports(&backend.base_url);

    client.hot_money_data(&HotMoneyParams::default()).await;

    let received = backend.received();
    assert!(received[0].pairs.is_empty(), "{:?}", received[0]);
}

#[tokio::test]
async fn test_operations_without_params_send_no_query() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"data":[]}"#).await;
    let (client, _) = client_with_reports(&backend.base_url);

    client.sector_data().await.unwrap();
    client.daily_limit_data().await;
    client.daily_sector_limit_data().await;
    client.all_ths_index().await;

    let received = backend.received();
    let paths: Vec<&str> = received.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            Endpoint::SectorData.path(),
            Endpoint::DailyLimit.path(),
            Endpoint::DailySectorLimit.path(),
            Endpoint::AllThsIndex.path(),
        ]
    );
    for r in &received {
        assert_eq!(r.query, None, "{}", r.path);
    }
}

#[test]
fn test_endpoint_table() {
    let forwarding: Vec<Endpoint> = Endpoint::iterator()
        .filter(Endpoint::forwards_params)
        .collect();
    assert_eq!(
        forwarding,
        vec![
            Endpoint::HotMoney,
            Endpoint::DailyHotMoneyTrade,
            Endpoint::StockBasicInfo,
            Endpoint::DailyData
        ]
    );

    let propagating: Vec<Endpoint> = Endpoint::iterator()
        .filter(|e| e.fallback().is_none())
        .collect();
    assert_eq!(propagating, vec![Endpoint::SectorData]);

    for endpoint in Endpoint::iterator() {
        assert!(endpoint.path().starts_with("/api/"), "{}", endpoint);
    }
}

#[tokio::test]
async fn test_base_url_trailing_slash_is_trimmed() {
    let client = ApiClient::new("http://127.0.0.1:5000/").unwrap();

    assert_eq!(client.base_url(), "http://127.0.0.1:5000");
    assert_eq!(
        client.url(Endpoint::DailyData),
        "http://127.0.0.1:5000/api/get_daily_data"
    );
}
