// system-tests/tests/helpers/status_line_stub.rs
// ============================================================================
// Module: Status Line Stub
// Description: Raw HTTP/1.1 responder with a fixed status line.
// Purpose: Serve reason phrases a framework would normalize away.
// Dependencies: std
// ============================================================================

use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

/// Largest request head the stub reads before answering.
const MAX_REQUEST_HEAD: usize = 16 * 1024;

/// Handle for the raw responder; stops it on drop.
pub struct StatusLineStubHandle {
    collection_url: String,
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<()>>,
}

impl StatusLineStubHandle {
    /// Returns the collection URL.
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }
}

impl Drop for StatusLineStubHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect(self.addr);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Answers every request with `HTTP/1.1 <status_line>` and `body`.
pub fn spawn_status_line_stub(
    status_line: &'static str,
    body: &'static str,
) -> Result<StatusLineStubHandle, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("status line stub bind failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("status line stub addr failed: {err}"))?;
    let stop = Arc::new(AtomicBool::new(false));
    let stopping = Arc::clone(&stop);
    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: \
         close\r\n\r\n{body}",
        body.len()
    );
    let join = thread::spawn(move || {
        for stream in listener.incoming() {
            if stopping.load(Ordering::SeqCst) {
                break;
            }
            if let Ok(mut stream) = stream {
                read_request_head(&mut stream);
                let _ = stream.write_all(response.as_bytes());
            }
        }
    });
    Ok(StatusLineStubHandle {
        collection_url: format!("http://{addr}/todos"),
        addr,
        stop,
        join: Some(join),
    })
}

fn read_request_head(stream: &mut TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while head.len() < MAX_REQUEST_HEAD && !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(read) => head.extend_from_slice(&chunk[..read]),
        }
    }
}
