//! A minimal in-process Redis stand-in for tests.
//!
//! It answers `PING` with `PONG`, `INFO` with a fixed payload and everything else (the client's
//! `CLIENT SETINFO` handshake, `SELECT`, `AUTH`) with `OK`. It can be told to stop answering at a
//! given command to imitate a stalled server.

use redis_dashboard_config::RedisConfig;
use std::{
    io,
    net::SocketAddr,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
};
use tokio::{
    io::{
        AsyncBufReadExt as _,
        AsyncReadExt as _,
        AsyncWriteExt as _,
        BufReader,
    },
    net::{
        TcpListener,
        TcpStream,
    },
    task::JoinHandle,
};

#[derive(Debug, Clone, Default)]
pub struct FakeRedis {
    info: String,
    stall_on: Option<String>,
}

impl FakeRedis {
    pub fn new(info: impl Into<String>) -> Self {
        Self {
            info: info.into(),
            stall_on: None,
        }
    }

    /// Stops replying once `command` arrives. Later commands on that connection are read but never
    /// answered.
    pub fn stall_on(mut self, command: &str) -> Self {
        self.stall_on = Some(command.to_ascii_uppercase());
        self
    }

    pub async fn spawn(self) -> io::Result<RunningFakeRedis> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let open_connections = Arc::new(AtomicUsize::new(0));
        let behaviour = Arc::new(self);

        let task = tokio::spawn({
            let open_connections = open_connections.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    open_connections.fetch_add(1, Ordering::SeqCst);
                    let behaviour = behaviour.clone();
                    let open_connections = open_connections.clone();
                    tokio::spawn(async move {
                        let _ = behaviour.serve(stream).await;
                        open_connections.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            }
        });

        Ok(RunningFakeRedis {
            addr,
            open_connections,
            task,
        })
    }

    async fn serve(&self, stream: TcpStream) -> io::Result<()> {
        let (read, mut write) = stream.into_split();
        let mut reader = BufReader::new(read);
        let mut stalled = false;

        while let Some(command) = read_command(&mut reader).await? {
            let name = command.first().map(|arg| arg.to_ascii_uppercase()).unwrap_or_default();
            if self.stall_on.as_deref() == Some(name.as_str()) {
                stalled = true;
            }
            if stalled {
                continue;
            }

            let reply = match name.as_str() {
                "PING" => "+PONG\r\n".to_string(),
                "INFO" => format!("${}\r\n{}\r\n", self.info.len(), self.info),
                _ => "+OK\r\n".to_string(),
            };
            write.write_all(reply.as_bytes()).await?;
        }

        Ok(())
    }
}

/// Handle to a listening [`FakeRedis`]. The server stops when this is dropped.
pub struct RunningFakeRedis {
    addr: SocketAddr,
    open_connections: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl RunningFakeRedis {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> RedisConfig {
        RedisConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            password: None,
            database: 0,
        }
    }

    /// Client connections that have not been closed yet.
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }
}

impl Drop for RunningFakeRedis {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Reads one RESP array of bulk strings. `None` once the client hung up.
async fn read_command<R>(reader: &mut BufReader<R>) -> io::Result<Option<Vec<String>>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(header) = read_line(reader).await? else {
        return Ok(None);
    };
    let Some(count) = header.strip_prefix('*') else {
        // Inline command.
        return Ok(Some(header.split_whitespace().map(str::to_string).collect()));
    };
    let count: usize = count.parse().map_err(|_| invalid(&header))?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(len) = read_line(reader).await? else {
            return Ok(None);
        };
        let len: usize = len
            .strip_prefix('$')
            .and_then(|len| len.parse().ok())
            .ok_or_else(|| invalid(&len))?;
        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(Some(args))
}

async fn read_line<R>(reader: &mut BufReader<R>) -> io::Result<Option<String>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn invalid(line: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("unexpected RESP line {line:?}"))
}
