//! Unit tests for `LibSshSession` failure mapping against local sockets.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use hopbox::application::ports::RemoteSession;
use hopbox::domain::{SessionError, SessionTarget};
use hopbox::infra::ssh_lib::{LibSshSession, SessionMode};

use crate::mocks::RecordingEvents;

fn localhost() -> SessionTarget {
    SessionTarget {
        host: "127.0.0.1".to_string(),
        username: "ubuntu".to_string(),
        key_path: PathBuf::from("/nonexistent/my-key-pair.pem"),
        relay_host: None,
    }
}

fn session(port: u16) -> LibSshSession {
    LibSshSession::new(SessionMode::Command("whoami".to_string()), "exit")
        .with_port(port)
        .with_connect_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn refused_connection_is_connection_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let events = RecordingEvents::default();
    let err = session(port).open(&localhost(), &events).await.unwrap_err();

    assert!(matches!(err, SessionError::Connection(_)), "{err:?}");
    assert!(events.outputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_ssh_peer_fails_handshake_as_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n");
        }
    });

    let events = RecordingEvents::default();
    let err = session(port).open(&localhost(), &events).await.unwrap_err();

    assert!(matches!(err, SessionError::Connection(_)), "{err:?}");
    assert!(events.outputs.lock().unwrap().is_empty());
    server.join().unwrap();
}
