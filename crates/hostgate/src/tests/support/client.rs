//! Blocking HTTP and WebSocket clients speaking to a [`Target`].

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use serde_json::Value;
use tokio_tungstenite::tungstenite::{self, Message, WebSocket};

use super::Target;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum ClientStream {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl ClientStream {
    fn connect(target: &Target) -> io::Result<Self> {
        let stream = match target {
            Target::Tcp(addr) => Self::Tcp(TcpStream::connect(addr)?),
            Target::Unix(path) => Self::Unix(UnixStream::connect(path)?),
        };
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(stream)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(timeout),
            Self::Unix(stream) => stream.set_read_timeout(timeout),
        }
    }
}

impl Read for ClientStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ClientStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// Parsed response to a raw HTTP request.
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub(crate) status: u16,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: String,
}

impl HttpReply {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

/// Sends one request and reads until the server closes the connection.
pub(crate) fn send_request(target: &Target, method: &str, path: &str, body: &str) -> HttpReply {
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    send_raw(target, &request)
}

/// Writes `request` verbatim and reads until the server closes the
/// connection.
pub(crate) fn send_raw(target: &Target, request: &str) -> HttpReply {
    let mut stream = ClientStream::connect(target).expect("connect to gateway");
    stream.write_all(request.as_bytes()).expect("write request");
    stream.flush().expect("flush request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).expect("read response");
    parse_reply(&String::from_utf8(raw).expect("utf8 response"))
}

fn parse_reply(raw: &str) -> HttpReply {
    let (head, body) = raw.split_once("\r\n\r\n").expect("response head");
    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .collect();
    HttpReply {
        status,
        headers,
        body: body.to_owned(),
    }
}

/// WebSocket subscriber connected to `/subscribe...`.
pub(crate) struct Subscriber {
    socket: WebSocket<ClientStream>,
}

impl Subscriber {
    pub(crate) fn connect(target: &Target, path: &str) -> Self {
        let stream = ClientStream::connect(target).expect("connect to gateway");
        let url = format!("ws://localhost{path}");
        let (socket, response) = tungstenite::client(url.as_str(), stream)
            .map_err(|error| error.to_string())
            .expect("websocket handshake");
        assert_eq!(response.status().as_u16(), 101);
        Self { socket }
    }

    /// Next event message, parsed.
    pub(crate) fn next_event(&mut self) -> Value {
        loop {
            match self.socket.read().expect("event message") {
                Message::Text(text) => return serde_json::from_str(&text).expect("json event"),
                Message::Ping(_) | Message::Pong(_) => {}
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    /// Whether no message arrives within `wait`.
    pub(crate) fn stays_silent(&mut self, wait: Duration) -> bool {
        self.socket
            .get_ref()
            .set_read_timeout(Some(wait))
            .expect("set read timeout");
        let silent = match self.socket.read() {
            Err(tungstenite::Error::Io(error)) => matches!(
                error.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        };
        self.socket
            .get_ref()
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("restore read timeout");
        silent
    }

    /// Waits for the server to end the session.
    pub(crate) fn closed_by_server(&mut self) -> bool {
        loop {
            match self.socket.read() {
                Ok(Message::Close(_))
                | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return true;
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(error))
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return false;
                }
                Err(_) => return true,
            }
        }
    }

    pub(crate) fn send_text(&mut self, text: &str) {
        self.socket
            .send(Message::Text(text.to_owned()))
            .expect("send text");
    }

    pub(crate) fn close(mut self) {
        if self.socket.close(None).is_err() {
            return;
        }
        // Drives the close handshake until the server's reply or EOF.
        while self.socket.read().is_ok() {}
    }
}
