//! HTTP restore transport backed by a shared ureq agent

use crate::archive::ArchiveRecord;
use crate::error::{RestoreOutcome, SubmitFailure};
use crate::transport::{restore_url, RestoreTransport};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on how much of an error response body is kept
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Status the store answers with when a file was restored
const STATUS_CREATED: u16 = 201;

/// Posts record metadata to the store's restore endpoint
pub struct HttpTransport {
    /// Validated base URL of the store
    base: Url,

    /// When set, nothing is sent and every record counts as restored
    dry_run: bool,

    /// Connection pool shared by all workers
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Create a transport for an already validated base URL
    pub fn new(base: Url, dry_run: bool) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .redirects(0)
            .build();

        Self {
            base,
            dry_run,
            agent,
        }
    }

}

impl RestoreTransport for HttpTransport {
    fn submit(&self, record: &ArchiveRecord) -> RestoreOutcome {
        if self.dry_run {
            debug!(path = %record.path, "Dry run, not submitting");
            return RestoreOutcome::Success;
        }

        let url = match restore_url(&self.base, &record.path) {
            Ok(url) => url,
            Err(reason) => return RestoreOutcome::Failed { reason },
        };
        trace!(url = %url, "POST restore");

        let result = self
            .agent
            .post(url.as_str())
            .set("Content-Type", "application/json")
            .send_string(record.meta_json());

        match result {
            Ok(response) if response.status() == STATUS_CREATED => RestoreOutcome::Success,
            Ok(response) => RestoreOutcome::Failed {
                reason: status_failure(response),
            },
            Err(ureq::Error::Status(_, response)) => RestoreOutcome::Failed {
                reason: status_failure(response),
            },
            Err(ureq::Error::Transport(err)) => RestoreOutcome::Failed {
                reason: SubmitFailure::Transport(err.to_string()),
            },
        }
    }
}

fn status_failure(response: ureq::Response) -> SubmitFailure {
    let code = response.status();
    let status_text = response.status_text().to_string();
    let body = read_body_limited(response, MAX_ERROR_BODY_BYTES);
    SubmitFailure::Status {
        code,
        status_text,
        body,
    }
}

/// Read a response body as text, keeping at most `max_bytes`
fn read_body_limited(response: ureq::Response, max_bytes: usize) -> String {
    let mut bytes = Vec::new();
    if let Err(e) = response
        .into_reader()
        .take(max_bytes as u64)
        .read_to_end(&mut bytes)
    {
        debug!(error = %e, "Failed to read error response body");
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::parse_base_url;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (format!("http://{}/", addr), handle)
    }

    /// Read headers and a Content-Length body so the client never sees a reset
    fn read_request(stream: &mut impl Read) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn transport(base: &str, dry_run: bool) -> HttpTransport {
        HttpTransport::new(parse_base_url(base).unwrap(), dry_run)
    }

    fn record() -> ArchiveRecord {
        ArchiveRecord::new("a/1.txt", r#"{"oid":"abc","length":3}"#).unwrap()
    }

    #[test]
    fn test_created_is_success() {
        let (base, server) =
            serve_once("HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let transport = transport(&base, false);

        assert_eq!(transport.submit(&record()), RestoreOutcome::Success);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /.cbfs/backup/restore/a/1.txt HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    }

    #[test]
    fn test_server_error_keeps_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 9\r\nConnection: close\r\n\r\ndisk full",
        );
        let transport = transport(&base, false);

        let outcome = transport.submit(&record());
        server.join().unwrap();

        assert_eq!(
            outcome,
            RestoreOutcome::Failed {
                reason: SubmitFailure::Status {
                    code: 500,
                    status_text: "Internal Server Error".into(),
                    body: "disk full".into(),
                },
            }
        );
    }

    #[test]
    fn test_ok_is_not_created() {
        let (base, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let transport = transport(&base, false);

        let outcome = transport.submit(&record());
        server.join().unwrap();

        assert!(matches!(
            outcome,
            RestoreOutcome::Failed {
                reason: SubmitFailure::Status { code: 200, .. }
            }
        ));
    }

    #[test]
    fn test_unreachable_is_transport_failure() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = transport(&format!("http://127.0.0.1:{}/", port), false);

        assert!(matches!(
            transport.submit(&record()),
            RestoreOutcome::Failed {
                reason: SubmitFailure::Transport(_)
            }
        ));
    }

    #[test]
    fn test_dry_run_skips_network() {
        let transport = transport("http://127.0.0.1:1/", true);
        assert_eq!(transport.submit(&record()), RestoreOutcome::Success);
    }

    #[test]
    fn test_dot_segment_path_is_refused_without_network() {
        let transport = transport("http://127.0.0.1:1/", false);
        let record = ArchiveRecord::new("a/../b.txt", "{}").unwrap();

        assert!(matches!(
            transport.submit(&record),
            RestoreOutcome::Failed {
                reason: SubmitFailure::InvalidPath { .. }
            }
        ));
    }
}
