//! End-to-end: in-process agents, the fetcher and the report loop.

use std::sync::Arc;
use std::time::Duration;

use monday::config::ServerEntry;
use monday::fetch::{FetchError, Fetcher};
use monday::report::report_all;
use monday_agent::metrics::{MetricsError, MetricsSource, RawMetrics};
use monday_agent::server::serve;
use monday_agent::state::AppState;
use monday_agent::types::{LoadAverage, MemStat, ProcStat, SwapStat};
use reqwest::StatusCode;
use tokio::net::TcpListener;

struct EightGib;

impl MetricsSource for EightGib {
    fn sample(&self) -> Result<RawMetrics, MetricsError> {
        Ok(RawMetrics {
            uptime: Ok(90_061),
            load_average: Ok(LoadAverage {
                one: 0.42,
                five: 0.3,
                fifteen: 0.1,
            }),
            memory: Ok(MemStat {
                total: 8_589_934_592,
                ..MemStat::default()
            }),
            swap: Ok(SwapStat::default()),
            processes: (1..=7)
                .map(|pid| {
                    Ok(ProcStat {
                        pid,
                        mem: u64::from(pid) * 1_074_000_000,
                        command: format!("svc{pid}"),
                        ..ProcStat::default()
                    })
                })
                .collect(),
            filesystems: Vec::new(),
        })
    }
}

async fn spawn_agent() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(serve(listener, AppState::new(Arc::new(EightGib))));
    port
}

// Bind then release a port so nothing is listening on it.
fn closed_port() -> u16 {
    let l = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    l.local_addr().expect("local addr").port()
}

fn entry(name: &str, port: u16) -> ServerEntry {
    ServerEntry {
        name: name.into(),
        host: "127.0.0.1".into(),
        port: Some(i32::from(port)),
    }
}

fn fetcher() -> Fetcher {
    Fetcher::new(Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn fetches_and_renders_live_agent() {
    let port = spawn_agent().await;
    let mut out = Vec::new();
    report_all(&fetcher(), &[entry("web1", port)], &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("web1\t127.0.0.1\n"), "{text}");
    assert!(text.contains("Uptime\t1 day,  1:01\n"), "{text}");
    let mem: Vec<&str> = text
        .lines()
        .find(|l| l.starts_with("Memory"))
        .unwrap()
        .split_whitespace()
        .collect();
    assert_eq!(mem[1], "8.00");
    assert_eq!(text.matches("pid: ").count(), 5);
    let pids: Vec<&str> = text
        .lines()
        .filter_map(|l| l.strip_prefix("pid: "))
        .collect();
    assert_eq!(pids, vec!["7", "6", "5", "4", "3"]);
}

#[tokio::test]
async fn unreachable_server_is_reported_as_zeros_and_run_continues() {
    let live = spawn_agent().await;
    let servers = [entry("down", closed_port()), entry("web1", live)];
    let mut out = Vec::new();
    report_all(&fetcher(), &servers, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("down\t127.0.0.1\nUptime\t\n"), "{text}");
    let second = text.find("web1\t127.0.0.1\n").expect("second server reported");
    let (down, up) = text.split_at(second);
    assert!(down.contains("Memory       0.00     0.00     0.00"), "{down}");
    assert!(!down.contains("pid:"));
    assert!(up.contains("Memory       8.00"), "{up}");
}

#[tokio::test]
async fn fetch_errors_are_typed() {
    let f = fetcher();
    assert!(matches!(
        f.fetch(&entry("down", closed_port())).await,
        Err(FetchError::Transport(_))
    ));

    // Something that speaks HTTP but not the snapshot schema.
    let port = spawn_raw(http_reply("200 OK", "not json!")).await;
    assert!(matches!(
        f.fetch(&entry("junk", port)).await,
        Err(FetchError::Decode(_))
    ));

    let port = spawn_raw(http_reply("503 Service Unavailable", "overloaded")).await;
    assert!(matches!(
        f.fetch(&entry("busy", port)).await,
        Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE))
    ));
}

#[tokio::test]
async fn error_status_with_a_snapshot_body_is_still_used() {
    let body = r#"{"uptime":" 1:02","loadAvgOne":0.5,"mem":{"total":8589934592},"procsTopFive":[{"pid":42,"mem":1074000000,"command":"db"}]}"#;
    let port = spawn_raw(http_reply("500 Internal Server Error", body)).await;

    let snap = fetcher()
        .fetch(&entry("flaky", port))
        .await
        .expect("snapshot decoded despite the 500");
    assert_eq!(snap.uptime, " 1:02");
    assert_eq!(snap.load_avg_one, 0.5);
    assert_eq!(snap.memory.total, 8_589_934_592);
    assert_eq!(snap.top_processes.len(), 1);
    assert_eq!(snap.top_processes[0].pid, 42);

    let mut out = Vec::new();
    report_all(&fetcher(), &[entry("flaky", port)], &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Memory       8.00"), "{text}");
    assert!(text.contains("pid: 42\n"), "{text}");
}

fn http_reply(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

/// Answers every connection with the same canned bytes.
async fn spawn_raw(reply: Vec<u8>) -> u16 {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = sock.read(&mut buf).await;
            let _ = sock.write_all(&reply).await;
            let _ = sock.shutdown().await;
        }
    });
    port
}
