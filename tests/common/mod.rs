#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use wordserv::{PolicyKind, Server, WordStore};

pub const ANIMALS: [&str; 9] = ["cat", "bat", "cat", "dog", "dog", "emu", "emu", "emu", "ant"];

/// A server running on its own thread until dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    stop: Arc<AtomicBool>,
    sessions: Arc<AtomicUsize>,
    handle: Option<JoinHandle<Server>>,
}

impl TestServer {
    pub fn spawn(store: WordStore, policy: PolicyKind) -> Self {
        let mut server = Server::bind("127.0.0.1:0", store, policy.build()).expect("failed to bind test server");
        let addr = server.local_addr().unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let sessions = Arc::new(AtomicUsize::new(0));
        let handle = thread::spawn({
            let stop = stop.clone();
            let sessions = sessions.clone();
            move || {
                while !stop.load(Ordering::Relaxed) {
                    server.turn().expect("server tick failed");
                    sessions.store(server.session_count(), Ordering::Relaxed);
                }
                server
            }
        });
        Self { addr, stop, sessions, handle: Some(handle) }
    }

    pub fn animals(policy: PolicyKind) -> Self {
        Self::spawn(WordStore::from_words(ANIMALS).unwrap(), policy)
    }

    /// Waits until the server holds exactly `n` sessions.
    pub fn wait_for_sessions(&self, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.sessions.load(Ordering::Relaxed) != n {
            assert!(Instant::now() < deadline, "server never reached {n} sessions");
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Stops the server, handing it back for inspection.
    pub fn stop(mut self) -> Server {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.take().unwrap().join().expect("server thread panicked")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub struct TestClient {
    reader: BufReader<TcpStream>,
    pub conn: TcpStream,
}

impl TestClient {
    pub fn connect(addr: SocketAddr) -> Self {
        let conn = TcpStream::connect(addr).unwrap();
        conn.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        Self { reader: BufReader::new(conn.try_clone().unwrap()), conn }
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.conn.write_all(bytes).unwrap();
    }

    pub fn line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).expect("no reply from server");
        line
    }
}

pub fn words(n: usize) -> WordStore {
    WordStore::from_words((0..n).map(|i| format!("w{i}"))).unwrap()
}
