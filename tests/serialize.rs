// Response serialization into the reply envelope
#![allow(clippy::unwrap_used)]

use futures::stream;
use http::{HeaderName, HeaderValue, StatusCode};
use lambda_fetch_adapter::{BodyMode, Response, serialize, serialize_with};

#[tokio::test]
async fn test_text_round_trips_through_base64() {
    let text = "Grüße, 世界! 🚀";
    let response = Response::new(StatusCode::OK).with_body(text);

    let reply = serialize(response).await.unwrap();
    assert_eq!(String::from_utf8(reply.decoded_body().unwrap()).unwrap(), text);
}

#[tokio::test]
async fn test_chunked_text_round_trips_in_lossy_mode() {
    let chunks = vec![Ok(b"<html>".to_vec()), Ok(b"<body>ok</body>".to_vec()), Ok(b"</html>".to_vec())];
    let response = Response::new(StatusCode::OK).with_stream(stream::iter(chunks));

    let reply = serialize_with(response, BodyMode::Utf8Lossy).await.unwrap();
    assert_eq!(reply.decoded_body().unwrap(), b"<html><body>ok</body></html>");
}

#[tokio::test]
async fn test_empty_body_is_still_flagged_base64() {
    let reply = serialize(Response::new(StatusCode::OK).with_body(Vec::new()))
        .await
        .unwrap();
    assert_eq!(reply.body, "");
    assert!(reply.is_base64_encoded);

    let reply = serialize_with(Response::new(StatusCode::NOT_FOUND), BodyMode::Utf8Lossy)
        .await
        .unwrap();
    assert_eq!(reply.status_code, 404);
    assert!(reply.is_base64_encoded);
}

#[tokio::test]
async fn test_header_names_differing_in_case_collapse() {
    let response = Response::new(StatusCode::OK)
        .with_header(
            HeaderName::from_bytes(b"X-Request-Id").unwrap(),
            HeaderValue::from_static("first"),
        )
        .with_header(
            HeaderName::from_bytes(b"x-request-id").unwrap(),
            HeaderValue::from_static("second"),
        );

    let reply = serialize(response).await.unwrap();
    assert_eq!(reply.headers.len(), 1);
    assert_eq!(reply.headers["x-request-id"], "second");
}

#[tokio::test]
async fn test_status_is_copied_verbatim() {
    let reply = serialize(Response::new(StatusCode::from_u16(299).unwrap()))
        .await
        .unwrap();
    assert_eq!(reply.status_code, 299);
}

#[tokio::test]
async fn test_envelope_json_shape() {
    let response = Response::new(StatusCode::CREATED)
        .with_header(
            HeaderName::from_static("location"),
            HeaderValue::from_static("/orders/7"),
        )
        .with_body("hi");

    let reply = serialize(response).await.unwrap();
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        serde_json::json!({
            "statusCode": 201,
            "headers": {"location": "/orders/7"},
            "body": "aGk=",
            "isBase64Encoded": true
        })
    );
}
