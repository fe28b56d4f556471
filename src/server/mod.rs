//! A small HTTP-ish server exposing the slicing engine over the network.
//!
//! Grounded directly on the donor project's raw-socket server: a fixed
//! pool of worker threads each `accept()` a connection, read a bare HTTP
//! request line, resolve its path under a sandboxed base directory, run
//! the slicing engine once to validate the selector and learn the output
//! size, and then run it again to stream the body. Nothing here tries to
//! be a real HTTP server (no keep-alive, no chunked encoding, no request
//! body): the donor only ever needed to answer `GET`.

mod threadpool;

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use tracing::{info, warn};

use crate::engine;
use crate::error::SliceError;

pub struct ServerConfig {
    pub port: u16,
    pub basedir: PathBuf,
    pub nthreads: usize,
}

#[derive(Clone, Copy)]
enum HttpStatus {
    Ok,
    BadRequest,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl HttpStatus {
    fn code(self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::BadRequest => 400,
            HttpStatus::Forbidden => 403,
            HttpStatus::NotFound => 404,
            HttpStatus::MethodNotAllowed => 405,
            HttpStatus::InternalServerError => 500,
        }
    }

    fn reason(self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::BadRequest => "Bad Request",
            HttpStatus::Forbidden => "Forbidden",
            HttpStatus::NotFound => "Not Found",
            HttpStatus::MethodNotAllowed => "Method Not Allowed",
            HttpStatus::InternalServerError => "Internal Server Error",
        }
    }
}

/// Re-exec this process as a background daemon: double fork, detaching
/// from the controlling terminal via `setsid` each time. The double
/// fork/setsid is carried over unchanged from the tool this server is
/// descended from; a single fork+setsid would be the usual idiom, but
/// there's no harm in the belt-and-suspenders version.
pub fn daemonize() -> std::io::Result<()> {
    unsafe {
        match libc::fork() {
            -1 => return Err(std::io::Error::last_os_error()),
            0 => {}
            _ => std::process::exit(0),
        }
        if libc::setsid() < 0 {
            return Err(std::io::Error::last_os_error());
        }
        libc::signal(libc::SIGCHLD, libc::SIG_IGN);
        libc::signal(libc::SIGHUP, libc::SIG_IGN);
        match libc::fork() {
            -1 => return Err(std::io::Error::last_os_error()),
            0 => {}
            _ => std::process::exit(0),
        }
        if libc::setsid() < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

pub fn run(config: ServerConfig) -> std::io::Result<()> {
    let basedir = config.basedir.canonicalize()?;
    let listener = TcpListener::bind(("::", config.port))?;

    info!(
        pid = std::process::id(),
        port = config.port,
        basedir = %basedir.display(),
        "fits-slice-server listening"
    );

    let pool = threadpool::ThreadPool::new(config.nthreads);
    let basedir = Arc::new(basedir);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "accept() failed");
                continue;
            }
        };

        let basedir = Arc::clone(&basedir);
        pool.execute(move || {
            let peer = stream.peer_addr().ok();
            if let Err(e) = handle_connection(stream, &basedir) {
                warn!(peer = ?peer, error = %e, "connection handling failed");
            }
        });
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, basedir: &Path) -> std::io::Result<()> {
    let peer = stream.peer_addr().ok();

    let mut buf = [0u8; 0x1000];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("");
    let raw_url = parts.next().unwrap_or("").to_string();

    if method != "GET" {
        return respond(&mut stream, peer, &raw_url, HttpStatus::MethodNotAllowed, None);
    }

    let (path_part, query) = match raw_url.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (raw_url.as_str(), None),
    };

    // Build the full path and make sure it's still inside basedir: this is
    // the whole of the server's access control.
    let candidate = basedir.join(path_part.trim_start_matches('/'));
    let resolved = match candidate.canonicalize() {
        Ok(p) if p.starts_with(basedir) => p,
        _ => return respond(&mut stream, peer, &raw_url, HttpStatus::NotFound, None),
    };

    let file = match std::fs::File::open(&resolved) {
        Ok(f) => f,
        Err(e) => {
            let status = match e.kind() {
                std::io::ErrorKind::NotFound => HttpStatus::NotFound,
                std::io::ErrorKind::PermissionDenied => HttpStatus::Forbidden,
                _ => HttpStatus::InternalServerError,
            };
            return respond(&mut stream, peer, &raw_url, status, None);
        }
    };

    let mmap = match unsafe { Mmap::map(&file) } {
        Ok(m) => m,
        Err(_) => return respond(&mut stream, peer, &raw_url, HttpStatus::InternalServerError, None),
    };

    // Dry run: validate the selector and learn the response size before
    // committing to a status line.
    match engine::slice_fits(&mmap, query, None) {
        Ok(size) => {
            respond(&mut stream, peer, &raw_url, HttpStatus::Ok, Some(size))?;
            let _ = engine::slice_fits(&mmap, query, Some(&mut stream));
        }
        Err(SliceError::Evals(_)) => {
            respond(&mut stream, peer, &raw_url, HttpStatus::BadRequest, None)?;
        }
        Err(_) => {
            respond(&mut stream, peer, &raw_url, HttpStatus::InternalServerError, None)?;
        }
    }

    Ok(())
}

fn respond(
    stream: &mut TcpStream,
    peer: Option<SocketAddr>,
    url: &str,
    status: HttpStatus,
    content_length: Option<u64>,
) -> std::io::Result<()> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", status.code(), status.reason());
    if let Some(len) = content_length {
        head.push_str(&format!("Content-Length: {len}\r\nContent-Type: image/fits\r\n"));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes())?;

    info!(peer = ?peer, code = status.code(), url, "request handled");
    Ok(())
}
