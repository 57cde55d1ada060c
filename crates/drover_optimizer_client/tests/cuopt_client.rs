use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use drover_core::{
    coordinates::Coordinates,
    delivery::{CargoDimensions, Delivery},
    vehicle::VehicleConstraints,
};
use drover_matrix_providers::travel_matrix_client::{TravelMatrixClient, TravelMatrixProvider};
use drover_optimizer_client::{
    cuopt_api::{CuoptClient, CuoptClientParams, CuoptError, REQUEST_ID_HEADER},
    payload::OptimizationPayload,
    payload_builder::PayloadBuilder,
};

struct Canned {
    status: &'static str,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Canned {
    fn new(status: &'static str, body: &str) -> Self {
        Canned {
            status,
            headers: Vec::new(),
            body: body.to_owned(),
        }
    }

    fn accepted_with_id(request_id: &str) -> Self {
        Canned {
            status: "202 Accepted",
            headers: vec![(REQUEST_ID_HEADER, request_id.to_owned())],
            body: String::new(),
        }
    }

    fn terminal() -> Self {
        Canned::new(
            "200 OK",
            r#"{"response":{"solver_response":{"num_vehicles":1,"solution_cost":42.5,"vehicle_data":{}}}}"#,
        )
    }
}

/// Serves one canned response per connection, in order, then exits.
async fn spawn_stub(responses: Vec<Canned>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for canned in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            write_response(&mut stream, &canned).await;
        }
    });

    format!("http://{address}")
}

async fn read_request(stream: &mut TcpStream) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let read = stream.read(&mut chunk).await.unwrap();
        if read == 0 {
            return;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let mut body_read = buffer.len() - (header_end + 4);
        while body_read < content_length {
            let read = stream.read(&mut chunk).await.unwrap();
            if read == 0 {
                return;
            }
            body_read += read;
        }
        return;
    }
}

async fn write_response(stream: &mut TcpStream, canned: &Canned) {
    let mut response = format!(
        "HTTP/1.1 {}\r\nconnection: close\r\ncontent-length: {}\r\n",
        canned.status,
        canned.body.len()
    );
    for (name, value) in &canned.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&canned.body);

    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.ok();
}

fn client(base_url: String, max_poll_attempts: u32) -> CuoptClient {
    CuoptClient::new(CuoptClientParams {
        base_url,
        api_key: String::from("test-key"),
        poll_interval: Duration::from_millis(10),
        max_poll_attempts,
    })
}

async fn payload() -> OptimizationPayload {
    let deliveries = vec![Delivery {
        id: String::from("d-1"),
        pickup: Some(Coordinates::new(52.52, 13.40)),
        dropoff: Some(Coordinates::new(52.50, 13.45)),
        dimensions: CargoDimensions::new(100.0, 80.0, 60.0),
        weight_kg: 120.0,
        prize: 95.0,
        service_duration: None,
        window: Default::default(),
    }];
    let constraints: VehicleConstraints = serde_json::from_str(
        r#"{
            "start": { "latitude": 52.51, "longitude": 13.41 },
            "cargo_box": { "length_cm": 300.0, "width_cm": 180.0, "height_cm": 180.0 },
            "max_load_kg": 900.0
        }"#,
    )
    .unwrap();

    let builder = PayloadBuilder::new(
        TravelMatrixClient::offline(),
        TravelMatrixProvider::GreatCircle { speed_kmh: 60.0 },
    );
    let (payload, _) = builder.build(&deliveries, &constraints).await.unwrap();
    payload
}

#[tokio::test]
async fn test_synchronous_completion() {
    let base_url = spawn_stub(vec![Canned::terminal()]).await;

    let result = client(base_url, 3).solve(&payload().await).await.unwrap();

    assert!(result.response.solver_response.is_some());
}

#[tokio::test]
async fn test_accepted_without_request_id_is_a_protocol_error() {
    let base_url = spawn_stub(vec![Canned::new("202 Accepted", "")]).await;

    let error = client(base_url, 3).solve(&payload().await).await.unwrap_err();

    assert!(matches!(error, CuoptError::MissingRequestId));
}

#[tokio::test]
async fn test_accepted_then_polled_to_completion() {
    let base_url = spawn_stub(vec![
        Canned::accepted_with_id("abc123"),
        Canned::new("202 Accepted", ""),
        Canned::terminal(),
    ])
    .await;

    let result = client(base_url, 5).solve(&payload().await).await.unwrap();

    let solution = result.response.solver_response.unwrap();
    assert_eq!(solution.solution_cost, 42.5);
}

#[tokio::test]
async fn test_poll_failure_is_fatal() {
    let base_url = spawn_stub(vec![
        Canned::accepted_with_id("abc123"),
        Canned::new("500 Internal Server Error", r#"{"detail":"solver crashed"}"#),
    ])
    .await;

    let error = client(base_url, 5).solve(&payload().await).await.unwrap_err();

    assert!(matches!(
        error,
        CuoptError::Api { status: 500, ref message } if message == "solver crashed"
    ));
}

#[tokio::test]
async fn test_polling_stops_at_the_attempt_cap() {
    let base_url = spawn_stub(vec![
        Canned::accepted_with_id("abc123"),
        Canned::new("202 Accepted", ""),
        Canned::new("202 Accepted", ""),
    ])
    .await;

    let error = client(base_url, 2).solve(&payload().await).await.unwrap_err();

    assert!(matches!(error, CuoptError::Timeout(2)));
}

#[tokio::test]
async fn test_rejected_submission_carries_status_and_detail() {
    let base_url = spawn_stub(vec![Canned::new(
        "400 Bad Request",
        r#"{"detail":"demand exceeds capacity"}"#,
    )])
    .await;

    let error = client(base_url, 3).solve(&payload().await).await.unwrap_err();

    assert!(matches!(
        error,
        CuoptError::Api { status: 400, ref message } if message == "demand exceeds capacity"
    ));
}

#[tokio::test]
async fn test_unparseable_terminal_body_is_a_protocol_error() {
    let base_url = spawn_stub(vec![Canned::new("200 OK", "not json")]).await;

    let error = client(base_url, 3).solve(&payload().await).await.unwrap_err();

    assert!(matches!(error, CuoptError::Deserialize(_)));
}
