//! Downloads the whole word sequence chunk by chunk.

use crate::prelude::*;
use crate::protocol::{self, Range, Reply};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::net::ToSocketAddrs;

#[derive(Debug, Clone, Copy)]
pub struct Downloader {
    k: u32,
    burst: u32,
}

#[derive(Debug, Clone)]
pub struct Download {
    pub words: Vec<String>,
    pub requests: u64,
    pub elapsed: time::Duration,
}

impl Download {
    pub fn frequencies(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for word in self.words.iter().filter(|w| !w.is_empty()) {
            *counts.entry(word.as_str()).or_default() += 1;
        }
        counts
    }
}

struct Conn {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    line: String,
    scratch: Vec<u8>,
    requests: u64,
}

impl Conn {
    fn send(&mut self, offset: u64, k: u32) -> Result<()> {
        self.scratch.clear();
        let offset = i64::try_from(offset).map_err(|_| Error::Protocol)?;
        protocol::encode_request(Range { offset, count: k.into() }, &mut self.scratch);
        self.writer.write_all(&self.scratch)?;
        self.requests += 1;
        Ok(())
    }

    /// Appends the next reply's words, returning whether it ended the stream.
    fn recv(&mut self, words: &mut Vec<String>) -> Result<bool> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        match Reply::decode(&self.line) {
            Reply::Words { words: chunk, end_of_stream } => {
                words.extend(chunk);
                Ok(end_of_stream)
            }
            Reply::Error(reason) => Err(Error::Rejected(reason)),
        }
    }
}

impl Downloader {
    /// A well-behaved client: one request in flight at a time.
    pub fn new(k: u32) -> Self {
        Self { k, burst: 1 }
    }

    /// Opens with `burst` requests sent back-to-back before reading any reply.
    pub fn greedy(self, burst: u32) -> Self {
        Self { burst: burst.max(1), ..self }
    }

    pub fn is_greedy(&self) -> bool {
        self.burst > 1
    }

    pub fn run(&self, addr: impl ToSocketAddrs) -> Result<Download> {
        self.download(TcpStream::connect(addr)?)
    }

    pub fn download(&self, conn: TcpStream) -> Result<Download> {
        let started = time::Instant::now();
        conn.set_nodelay(true)?;
        let mut conn = Conn {
            reader: BufReader::new(conn.try_clone()?),
            writer: conn,
            line: String::new(),
            scratch: vec![],
            requests: 0,
        };
        let k = u64::from(self.k);
        let mut words = vec![];

        for i in 0..u64::from(self.burst) {
            conn.send(i * k, self.k)?;
        }
        let mut done = false;
        for _ in 0..self.burst {
            if conn.recv(&mut words)? {
                done = true;
                break;
            }
        }
        let mut offset = u64::from(self.burst) * k;
        while !done {
            conn.send(offset, self.k)?;
            done = conn.recv(&mut words)?;
            offset += k;
        }

        Ok(Download {
            words,
            requests: conn.requests,
            elapsed: started.elapsed(),
        })
    }
}
