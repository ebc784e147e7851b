use std::time::Duration;

use wasm_test_driver::DriverError;
use wasm_test_driver::runner::preflight::wait_for_target;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 页面可以访问时立即通过
#[tokio::test]
async fn test_preflight_reachable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div id=\"status\">Running</div>"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/", mock_server.uri());
    wait_for_target(&url, Duration::from_secs(2)).await.unwrap();
}

/// 一直返回非 2xx 时超时失败
#[tokio::test]
async fn test_preflight_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let url = format!("{}/", mock_server.uri());
    let err = wait_for_target(&url, Duration::from_millis(350))
        .await
        .unwrap_err();

    match err {
        DriverError::TargetUnreachable { url: failed, attempts } => {
            assert_eq!(failed, url);
            assert!(attempts >= 2);
        }
        other => panic!("Expected TargetUnreachable, got {:?}", other),
    }
}

/// 没有服务监听时同样失败
#[tokio::test]
async fn test_preflight_nothing_listening() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let url = format!("http://127.0.0.1:{}/", port);
    let err = wait_for_target(&url, Duration::from_millis(250))
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::TargetUnreachable { .. }));
}

/// 接受连接但从不响应的服务也在限定时间内失败
#[tokio::test]
async fn test_preflight_silent_listener_respects_limit() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());

    let start = std::time::Instant::now();
    let err = wait_for_target(&url, Duration::from_millis(250))
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, DriverError::TargetUnreachable { attempts: 1, .. }));
    assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
    drop(listener);
}
