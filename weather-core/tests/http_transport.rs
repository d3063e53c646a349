//! Integration tests for the reqwest transport and the fetch service using wiremock.

use std::{
    net::TcpListener,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::io::AsyncReadExt;

use weather_core::{
    Config, Coordinate, DataFetcher, HttpTransport, NetworkError, NetworkService,
    OpenWeatherService, Transport, TransportError, TransportRequest, Units, WeatherService,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout: Duration) -> NetworkService {
    let transport = HttpTransport::new(timeout).unwrap();
    NetworkService::new(Arc::new(transport))
}

#[tokio::test]
async fn test_fetch_returns_body_on_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"Success".to_vec()))
        .mount(&mock_server)
        .await;

    let data = fetcher(Duration::from_secs(5))
        .fetch_data(&format!("{}/data", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(&data[..], b"Success");
}

#[tokio::test]
async fn test_fetch_server_error_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = fetcher(Duration::from_secs(5))
        .fetch_data(&format!("{}/data", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, NetworkError::InvalidResponse);
}

#[tokio::test]
async fn test_fetch_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let err = fetcher(Duration::from_millis(50))
        .fetch_data(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, NetworkError::Timeout);
}

#[tokio::test]
async fn test_fetch_refused_connection_is_invalid_response() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = fetcher(Duration::from_secs(5))
        .fetch_data(&format!("http://127.0.0.1:{port}/data"))
        .await
        .unwrap_err();

    assert_eq!(err, NetworkError::InvalidResponse);
}

#[tokio::test]
async fn test_fetch_non_http_scheme_is_invalid_url() {
    let err = fetcher(Duration::from_secs(5))
        .fetch_data("ftp://example.com/data")
        .await
        .unwrap_err();

    assert_eq!(err, NetworkError::InvalidUrl);
}

#[tokio::test]
async fn test_transport_sends_request_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let url = format!("{}/data", mock_server.uri()).parse().unwrap();
    let request = TransportRequest::get(url).with_header(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let response = transport.data_for(&request).await.unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_transport_unsupported_scheme() {
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let url = "ftp://example.com/data".parse().unwrap();

    let err = transport.data_from(&url).await.unwrap_err();

    assert!(matches!(err, TransportError::UnsupportedUrl(_)));
}

#[tokio::test]
async fn test_current_weather_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 59.0, "feels_like": 57.2, "humidity": 80},
            "wind": {"speed": 7.0},
            "dt": 1628416800,
            "id": 2643743,
            "name": "London"
        })))
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.base_url = mock_server.uri();
    config.units = Units::Imperial;
    config.set_api_key("KEY".into());

    let fetcher = Arc::new(NetworkService::from_config(&config).unwrap());
    let service = OpenWeatherService::from_config(fetcher, &config).unwrap();

    let current = service
        .current_weather(Coordinate::new(51.5073, -0.1276))
        .await
        .unwrap();

    assert_eq!(current.name, "London");
    assert_eq!(current.main.temp, 59.0);
    assert_eq!(current.weather[0].main.as_str(), "Rain");
}

#[tokio::test]
async fn test_fetch_connection_dropped_before_response_is_no_connection() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        // Closing without writing anything back.
        drop(socket);
    });

    let err = fetcher(Duration::from_secs(5))
        .fetch_data(&format!("http://{addr}/x"))
        .await
        .unwrap_err();

    assert_eq!(err, NetworkError::NoConnection);
}

#[tokio::test]
async fn test_dropping_fetch_abandons_inflight_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let service = fetcher(Duration::from_secs(30));
    let url = format!("{}/slow", mock_server.uri());
    let started = Instant::now();

    let result = tokio::time::timeout(Duration::from_millis(100), service.fetch_data(&url)).await;

    assert!(result.is_err(), "fetch should not have completed");
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_aborted_fetch_task_delivers_no_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let service = fetcher(Duration::from_secs(30));
    let url = format!("{}/slow", mock_server.uri());
    let task = tokio::spawn(async move { service.fetch_data(&url).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    task.abort();

    let joined = task.await.unwrap_err();
    assert!(joined.is_cancelled());
}

#[tokio::test]
async fn test_transport_with_custom_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("user-agent", "weather-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::builder()
        .user_agent("weather-test/1.0")
        .build()
        .unwrap();
    let service = NetworkService::new(Arc::new(HttpTransport::with_client(client)));

    let data = service
        .fetch_data(&format!("{}/data", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(&data[..], b"ok");
}
