#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use mock_server::Behavior;
use shitposts::{AsyncTransport, BlockingTransport, Connect, HttpRequest, HttpResponse, SessionConfig, TransportError};

/// Start the mock server on a random port; returns its `/v1/` root.
pub fn spawn_mock(behavior: Behavior) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, behavior).await
        })
        .unwrap();
    });

    format!("http://{addr}/v1/")
}

pub fn mock_config(behavior: Behavior) -> SessionConfig {
    SessionConfig::default().with_endpoint(spawn_mock(behavior))
}

// Per-thread so parallel tests do not see each other's counts.
thread_local! {
    static CONNECTS: Cell<usize> = const { Cell::new(0) };
    static CLOSES: Cell<usize> = const { Cell::new(0) };
    static CALLS: Cell<usize> = const { Cell::new(0) };
    static FAIL_CLOSE: Cell<bool> = const { Cell::new(false) };
    static RESPONSE: RefCell<HttpResponse> = RefCell::new(json_response(200, r#"{"commands":[{"name":"crop"}]}"#));
    static LAST_REQUEST: RefCell<Option<HttpRequest>> = const { RefCell::new(None) };
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

pub fn connects() -> usize {
    CONNECTS.with(Cell::get)
}

pub fn closes() -> usize {
    CLOSES.with(Cell::get)
}

pub fn calls() -> usize {
    CALLS.with(Cell::get)
}

pub fn fail_close() {
    FAIL_CLOSE.with(|f| f.set(true));
}

pub fn respond_with(response: HttpResponse) {
    RESPONSE.with(|r| *r.borrow_mut() = response);
}

pub fn last_request() -> Option<HttpRequest> {
    LAST_REQUEST.with(|r| r.borrow().clone())
}

fn record(request: HttpRequest) -> HttpResponse {
    CALLS.with(|c| c.set(c.get() + 1));
    LAST_REQUEST.with(|r| *r.borrow_mut() = Some(request));
    RESPONSE.with(|r| r.borrow().clone())
}

/// Canned-response transport that counts connects, closes and calls.
#[derive(Debug, Default)]
pub struct FakeTransport;

impl Connect for FakeTransport {
    fn connect(_: &SessionConfig) -> Result<Self, TransportError> {
        CONNECTS.with(|c| c.set(c.get() + 1));
        Ok(FakeTransport)
    }

    fn close(self) -> Result<(), TransportError> {
        CLOSES.with(|c| c.set(c.get() + 1));
        if FAIL_CLOSE.with(Cell::get) {
            return Err("connection pool already torn down".into());
        }
        Ok(())
    }
}

#[async_trait]
impl AsyncTransport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(record(request))
    }
}

impl BlockingTransport for FakeTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(record(request))
    }
}

/// Transport whose requests never complete.
pub struct StalledTransport;

impl Connect for StalledTransport {
    fn connect(_: &SessionConfig) -> Result<Self, TransportError> {
        CONNECTS.with(|c| c.set(c.get() + 1));
        Ok(StalledTransport)
    }

    fn close(self) -> Result<(), TransportError> {
        CLOSES.with(|c| c.set(c.get() + 1));
        Ok(())
    }
}

#[async_trait]
impl AsyncTransport for StalledTransport {
    async fn execute(&self, _: HttpRequest) -> Result<HttpResponse, TransportError> {
        std::future::pending().await
    }
}

/// Transport that fails every request before reaching the network.
pub struct BrokenTransport;

impl Connect for BrokenTransport {
    fn connect(_: &SessionConfig) -> Result<Self, TransportError> {
        CONNECTS.with(|c| c.set(c.get() + 1));
        Ok(BrokenTransport)
    }

    fn close(self) -> Result<(), TransportError> {
        CLOSES.with(|c| c.set(c.get() + 1));
        Ok(())
    }
}

impl BlockingTransport for BrokenTransport {
    fn execute(&self, _: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset by peer").into())
    }
}
