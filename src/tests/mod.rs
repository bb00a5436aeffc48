use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::browse::Session;
use crate::query::FilterForm;
use crate::render::TerminalRenderer;
use crate::runner::{Options, Runner};


/// Minimal listing backend: answers every request on the listener, echoing
/// the requested page back with three pages in total.
async fn spawn_backend() -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            seen.lock().unwrap().push(request_line.clone());

            let body = if request_line.contains("/api/v1/cars/stats") {
                r#"{"total_cars":25,"avg_price":12000.5,"avg_year":2016.2,"avg_mileage":98000.0}"#
                    .to_string()
            } else {
                let page = request_line
                    .split(|c| c == '?' || c == '&' || c == ' ')
                    .find_map(|part| part.strip_prefix("page="))
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(1);
                format!(
                    r#"{{"data":[{{"id":"p{page}","make":"Kia","model":"Rio","year":2019,"price":9000}}],"page":{page},"total_pages":3,"total":25}}"#
                )
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{addr}"), requests)
}

#[tokio::test]
async fn browse_session_against_http_backend() {
    colored::control::set_override(false);
    let (base_url, requests) = spawn_backend().await;
    let runner = Runner::new(Options {
        base_url,
        ..Options::default()
    })
    .unwrap();
    let mut controller = runner.controller(TerminalRenderer::new(Vec::new()));
    controller.load_cars().await;
    assert!(controller.load_stats().await);

    let input: &[u8] = b"n\nf make=Kia\nbogus\nq\nn\n";
    let mut session = Session::new(FilterForm::default(), 3);
    session.run(&mut controller, input).await.unwrap();

    let lines = requests.lock().unwrap().clone();
    assert_eq!(lines.len(), 4, "{lines:?}");
    assert!(lines[0].starts_with("GET /api/v1/cars?page=1&limit=10&sort_by=created_at&sort_order=-1"));
    assert!(lines[1].starts_with("GET /api/v1/cars/stats"));
    assert!(lines[2].contains("page=2"));
    assert!(lines[3].contains("page=1") && lines[3].contains("make=Kia"));

    assert_eq!(controller.state().page(), 1);
    assert_eq!(controller.state().total_pages(), 3);
    assert_eq!(session.form().make, "Kia");

    let printed = String::from_utf8_lossy(controller.renderer().get_ref()).to_string();
    assert!(printed.contains("Kia Rio"));
    assert!(printed.contains("(page 2 of 3)"));
    assert!(printed.contains("unknown command 'bogus'"));
}
