use crate::output::{DynLazy, Site};
use http::{Method, StatusCode, Uri, Version};
use httparse::Status;
use std::str::FromStr;
use std::time::Instant;
use std::{
    collections::HashMap,
    io::{self, Read, Write},
    sync::{
        atomic::{AtomicUsize, Ordering},
        LazyLock, Mutex, PoisonError,
    },
    thread::available_parallelism,
    time::Duration,
};
use tracing::{debug, info};

/// Shortest wait between two stats refreshes.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Serves `output`, except the page itself, which is rendered per request so
/// that the location's selection and the latest stats are reflected.
///
/// `refresh_stats` runs on its own thread, once at startup and then every
/// stats cache lifetime.
pub fn serve(
    start: Instant,
    addr: &str,
    site: Site<'_>,
    output: &HashMap<String, DynLazy<'_, Vec<u8>>>,
    refresh_stats: Option<&(dyn Fn() + Sync)>,
) -> io::Result<()> {
    let background_threads = &AtomicUsize::new(0);
    let http_threads = &AtomicUsize::new(0);
    // Pages are rendered per request.
    let queue = output
        .iter()
        .filter(|(path, _)| !path.starts_with("/index.html"))
        .collect::<Vec<_>>();
    let work = &Mutex::new(queue.iter());
    let available_parallelism = available_parallelism()
        .map(|n| n.get())
        .unwrap_or_default()
        .max(1);
    std::thread::scope(|scope| -> io::Result<()> {
        // Background initialization.
        let cpus = (available_parallelism / 2).clamp(1, 4);
        for thread in 0..cpus {
            let _guard = Guard::new(background_threads);
            scope.spawn(move || {
                let _guard = _guard;
                while let Some((_, i)) = {
                    let next = work.lock().unwrap_or_else(PoisonError::into_inner).next();
                    next
                } {
                    LazyLock::force(i);
                    while http_threads.load(Ordering::SeqCst) > thread {
                        std::thread::sleep(Duration::from_millis(100));
                    }
                }

                drop(_guard);

                if background_threads.load(Ordering::SeqCst) == 0 {
                    info!(
                        "({:.1}s) Background rendering complete",
                        start.elapsed().as_secs_f32(),
                    );
                }
            });
        }

        if let Some(refresh_stats) = refresh_stats {
            let interval = site.stats.ttl().max(MIN_REFRESH_INTERVAL);
            scope.spawn(move || loop {
                refresh_stats();
                std::thread::sleep(interval);
            });
        }

        let listener = std::net::TcpListener::bind(addr)?;

        info!(
            "({:.1}s) Serving on http://{addr}",
            start.elapsed().as_secs_f32()
        );

        loop {
            let mut stream = if let Ok((stream, _)) = listener.accept() {
                stream
            } else {
                continue;
            };
            scope.spawn(move || {
                let _guard = Guard::new(http_threads);
                let mut buf = Vec::new();

                let request = loop {
                    let mut tmp = [0u8; 1024];
                    match stream.read(&mut tmp) {
                        Ok(0) => return,
                        Ok(n) => {
                            buf.extend_from_slice(&tmp[0..n]);
                        }
                        Err(_) => {
                            return;
                        }
                    };

                    let mut headers = [httparse::EMPTY_HEADER; 128];
                    let mut parse_req = httparse::Request::new(&mut headers);
                    match parse_req.parse(&buf) {
                        Ok(Status::Complete(_)) => {}
                        Ok(Status::Partial) => continue,
                        Err(e) => {
                            debug!("dropping malformed request: {e}");
                            return;
                        }
                    }
                    let method = if let Some(method) =
                        parse_req.method.and_then(|m| Method::from_str(m).ok())
                    {
                        method
                    } else {
                        return;
                    };
                    let uri = if let Some(uri) = parse_req.path.and_then(|p| Uri::from_str(p).ok())
                    {
                        uri
                    } else {
                        return;
                    };
                    let mut builder = http::Request::builder().method(method).uri(uri).version(
                        if parse_req.version == Some(1) {
                            Version::HTTP_11
                        } else {
                            Version::HTTP_10
                        },
                    );
                    for header in parse_req.headers {
                        builder = builder.header(header.name, header.value);
                    }
                    match builder.body(()) {
                        Ok(request) => break request,
                        Err(_) => return,
                    }
                };

                let (status, content_type, body) = if request.method() == Method::GET
                    || request.method() == Method::HEAD
                {
                    respond(site, output, request.uri())
                } else {
                    (
                        StatusCode::METHOD_NOT_ALLOWED,
                        "text/plain",
                        b"method not allowed".to_vec(),
                    )
                };

                info!("[{status}] {}", request.uri());

                let status_line = format!(
                    "{:?} {} {}\r\n",
                    request.version(),
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                );

                let mut headers = String::new();
                headers.push_str(&format!("Content-Length: {}\r\n", body.len()));
                headers.push_str(&format!("Content-Type: {content_type}\r\n"));
                headers.push_str("\r\n");
                if stream.write_all(status_line.as_bytes()).is_err() {
                    return;
                }
                if stream.write_all(headers.as_bytes()).is_err() {
                    return;
                }
                if request.method() != Method::HEAD && stream.write_all(&body).is_err() {
                    return;
                }
                let _ = stream.flush();
            });
        }
    })
}

/// Status, content type and body for a `GET` of `uri`.
pub fn respond(
    site: Site<'_>,
    output: &HashMap<String, DynLazy<'_, Vec<u8>>>,
    uri: &Uri,
) -> (StatusCode, &'static str, Vec<u8>) {
    let mut path = uri.path().to_owned();
    if path.ends_with('/') {
        path.push_str("index.html")
    }

    if path == "/index.html" {
        let location = uri.path_and_query().map_or("/", |pq| pq.as_str());
        (StatusCode::OK, content_type(&path), site.render_location(location))
    } else if let Some(file) = output.get(&path) {
        (StatusCode::OK, content_type(&path), (**file).clone())
    } else {
        (StatusCode::NOT_FOUND, "text/plain", b"not found".to_vec())
    }
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, extension)| extension) {
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

struct Guard<'a>(&'a AtomicUsize);

impl<'a> Guard<'a> {
    pub fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl<'a> Drop for Guard<'a> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
