//! Tests for the per-connection state machine over in-memory streams

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pagehttpd::config::StaticFilesConfig;
use pagehttpd::http::connection::{Connection, ConnectionState};
use pagehttpd::http::request::FORM_LINE_BREAK;
use pagehttpd::router::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

mod common;
use common::MemoryFiles;

fn site() -> MemoryFiles {
    MemoryFiles::new()
        .with("www/index.html", "<h1>home</h1>")
        .with("www/404.html", "<h1>nope</h1>")
        .with("static/data.bin", vec![0u8, 13, 10, 13, 10, 255])
}

fn router() -> Arc<Router<MemoryFiles>> {
    Arc::new(Router::new(
        site(),
        &StaticFilesConfig {
            html_root: PathBuf::from("www"),
            static_root: PathBuf::from("static"),
        },
    ))
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

/// Sends `request`, optionally half-closes, and collects everything the
/// server writes until it closes.
async fn exchange(request: &[u8], close_write: bool, pipe_size: usize, timeout: Option<Duration>) -> Vec<u8> {
    let (mut client, server) = tokio::io::duplex(pipe_size);
    let mut conn = Connection::new(server, peer(), router()).with_read_timeout(timeout);

    let client_side = async {
        client.write_all(request).await.unwrap();
        if close_write {
            client.shutdown().await.unwrap();
        }
        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        out
    };

    let (out, ()) = tokio::join!(client_side, conn.run());
    assert!(matches!(conn.state(), ConnectionState::Closed));
    out
}

async fn roundtrip(request: &[u8]) -> Vec<u8> {
    exchange(request, false, 1024, None).await
}

fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    (String::from_utf8(raw[..end].to_vec()).unwrap(), raw[end..].to_vec())
}

#[tokio::test]
async fn test_get_index_full_response() {
    let out = roundtrip(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(
        out,
        b"HTTP/1.1 200 OK\r\n\
          Content-Type: text/html; charset=UTF-8\r\n\
          Connection: close\r\n\
          Content-Length: 13\r\n\
          \r\n\
          <h1>home</h1>"
            .to_vec()
    );
}

#[tokio::test]
async fn test_header_arrives_one_byte_at_a_time() {
    let out = exchange(b"GET /index HTTP/1.1\r\nHost: localhost\r\n\r\n", false, 1, None).await;
    let (head, body) = split_response(&out);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"<h1>home</h1>".to_vec());
}

#[tokio::test]
async fn test_missing_page_is_404() {
    let out = roundtrip(b"GET /does-not-exist HTTP/1.1\r\n\r\n").await;
    let (head, body) = split_response(&out);

    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(head.contains("Content-Length: 13\r\n"));
    assert_eq!(body, b"<h1>nope</h1>".to_vec());
}

#[tokio::test]
async fn test_invalid_method_closes_without_response() {
    let out = roundtrip(b"DELETE /index HTTP/1.1\r\n\r\n").await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_garbage_request_line_closes_without_response() {
    let out = roundtrip(b"GET\r\n\r\n").await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_peer_closes_before_header_end() {
    let out = exchange(b"GET / HTTP/1.1\r\nHost: loc", true, 1024, None).await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_stalled_header_times_out() {
    let out = exchange(
        b"GET / HTTP/1.1\r\n",
        false,
        1024,
        Some(Duration::from_millis(50)),
    )
    .await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_user_agent_echo() {
    let out = roundtrip(b"GET /user-agent HTTP/1.1\r\nuser-agent: foobar/1.2.3\r\n\r\n").await;
    let (head, body) = split_response(&out);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"foobar/1.2.3".to_vec());
}

#[tokio::test]
async fn test_static_download_is_byte_identical() {
    let out = roundtrip(b"GET /static/data.bin HTTP/1.1\r\n\r\n").await;
    let (head, body) = split_response(&out);

    assert_eq!(
        head,
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/octet-stream\r\n\
         Content-Disposition: attachment; filename=\"data.bin\"\r\n\
         Content-Length: 6\r\n\
         Connection: close\r\n\
         \r\n"
    );
    assert_eq!(body, vec![0u8, 13, 10, 13, 10, 255]);
}

#[tokio::test]
async fn test_post_form_echo() {
    let out = roundtrip(b"POST /submit HTTP/1.1\r\nContent-Length: 7\r\n\r\na=1&b=2").await;
    let (head, body) = split_response(&out);
    let body = String::from_utf8(body).unwrap();
    let lines: HashSet<&str> = body.split(FORM_LINE_BREAK).collect();

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(lines, HashSet::from(["a: 1", "b: 2"]));
}

#[tokio::test]
async fn test_body_read_stops_at_content_length() {
    // Only "a=1" belongs to the body; the rest must not leak into the form.
    let out = roundtrip(b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\na=1&b=2").await;
    let (_, body) = split_response(&out);

    assert_eq!(body, b"a: 1".to_vec());
}

#[tokio::test]
async fn test_body_split_across_reads() {
    let out = exchange(
        b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\nname=rustic",
        false,
        1,
        None,
    )
    .await;
    let (_, body) = split_response(&out);

    assert_eq!(body, b"name: rustic".to_vec());
}

#[tokio::test]
async fn test_short_body_closes_without_response() {
    let out = exchange(
        b"POST / HTTP/1.1\r\nContent-Length: 20\r\n\r\na=1",
        true,
        1024,
        None,
    )
    .await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_invalid_content_length_means_no_body() {
    let out = roundtrip(b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n").await;
    let (head, body) = split_response(&out);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Length: 0\r\n"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_identical_requests_identical_responses() {
    let request = b"GET /static/data.bin HTTP/1.1\r\nUser-Agent: x\r\n\r\n";
    let first = roundtrip(request).await;
    let second = roundtrip(request).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_terminator_split_across_reads_with_trailing_bytes() {
    // A three-byte pipe splits "\r\n\r\n" over two reads; the bytes after
    // the body are never consumed into it.
    let out = exchange(
        b"POST /f HTTP/1.1\r\nContent-Length: 3\r\n\r\nk=vXY",
        false,
        3,
        None,
    )
    .await;
    let (head, body) = split_response(&out);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"k: v".to_vec());
}

#[tokio::test]
async fn test_client_gone_before_response_closes_quietly() {
    let (mut client, server) = tokio::io::duplex(1024);
    client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    drop(client);

    let mut conn = Connection::new(server, peer(), router());
    conn.run().await;

    assert!(matches!(conn.state(), ConnectionState::Closed));
}
