// Remote sources against a loopback HTTP/1.1 server.

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use rangeseal_core::source::{resolve_location, ByteSource, HttpConfig, HttpSource, MetadataCache};
    use rangeseal_core::types::StreamError;

    struct Route {
        path: &'static str,
        body: Vec<u8>,
        /// Omit `Content-Length` on HEAD responses.
        no_length: bool,
    }

    struct Server {
        base: String,
        heads: Arc<AtomicUsize>,
        gets: Arc<AtomicUsize>,
    }

    /// Serve `routes` on an ephemeral port, one request per connection.
    fn serve(routes: Vec<Route>) -> Server {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let heads = Arc::new(AtomicUsize::new(0));
        let gets = Arc::new(AtomicUsize::new(0));
        let (h, g) = (heads.clone(), gets.clone());

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                }

                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or("");
                let path = parts.next().unwrap_or("");
                let is_head = method == "HEAD";
                if is_head {
                    h.fetch_add(1, Ordering::SeqCst);
                } else {
                    g.fetch_add(1, Ordering::SeqCst);
                }

                let response = match routes.iter().find(|r| r.path == path) {
                    None => b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
                    Some(route) => {
                        let mut out = b"HTTP/1.1 200 OK\r\nConnection: close\r\n".to_vec();
                        out.extend_from_slice(b"Content-Type: video/mp4\r\n");
                        out.extend_from_slice(b"Content-Disposition: attachment; filename=\"clip.mp4\"\r\n");
                        if !(is_head && route.no_length) {
                            out.extend_from_slice(format!("Content-Length: {}\r\n", route.body.len()).as_bytes());
                        }
                        out.extend_from_slice(b"\r\n");
                        if !is_head {
                            out.extend_from_slice(&route.body);
                        }
                        out
                    }
                };
                let _ = stream.write_all(&response);
                let _ = stream.flush();
            }
        });

        Server { base, heads, gets }
    }

    fn body(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 241) as u8).collect()
    }

    #[test]
    fn connect_reads_size_and_hints() {
        let server = serve(vec![Route { path: "/clip", body: body(4_321), no_length: false }]);
        let url = format!("{}/clip", server.base);

        let source = HttpSource::connect(&url, HttpConfig::default()).unwrap();
        assert_eq!(source.size(), 4_321);
        assert_eq!(source.content_type_hint(), Some("video/mp4"));
        assert_eq!(source.filename_hint(), Some("clip.mp4"));
        assert!(!source.is_seekable());
        assert_eq!(source.id(), url);
        assert_eq!(server.heads.load(Ordering::SeqCst), 1);
        assert_eq!(server.gets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn open_streams_body_with_fresh_get() {
        let data = body(100_000);
        let server = serve(vec![Route { path: "/clip", body: data.clone(), no_length: false }]);
        let source = HttpSource::connect(format!("{}/clip", server.base), HttpConfig::default()).unwrap();

        for _ in 0..2 {
            let mut handle = source.open().unwrap();
            let mut out = Vec::new();
            handle.read_to_end(&mut out).unwrap();
            assert_eq!(out, data);
        }
        assert_eq!(server.gets.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_resource_is_open_failure() {
        let server = serve(vec![]);
        let err = HttpSource::connect(format!("{}/gone", server.base), HttpConfig::default()).err().unwrap();
        assert!(matches!(&err, StreamError::OpenFailure { reason, .. } if reason.contains("404")), "{err}");
    }

    #[test]
    fn missing_content_length_is_open_failure() {
        let server = serve(vec![Route { path: "/live", body: body(10), no_length: true }]);
        let err = HttpSource::connect(format!("{}/live", server.base), HttpConfig::default()).err().unwrap();
        assert!(matches!(&err, StreamError::OpenFailure { reason, .. } if reason.contains("Content-Length")));
    }

    #[test]
    fn unreachable_host_is_open_failure() {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let config = HttpConfig { timeout_secs: 2, ..HttpConfig::default() };
        let err = HttpSource::connect(format!("http://127.0.0.1:{port}/x"), config).err().unwrap();
        assert!(matches!(err, StreamError::OpenFailure { .. }));
    }

    #[test]
    fn repeat_resolution_uses_cached_metadata() {
        let server = serve(vec![Route { path: "/clip", body: body(2_048), no_length: false }]);
        let url = format!("{}/clip", server.base);
        let mut cache = MetadataCache::new();

        let first = resolve_location(&url, &mut cache, &HttpConfig::default()).unwrap();
        assert_eq!(first.size(), 2_048);
        assert_eq!(server.heads.load(Ordering::SeqCst), 1);

        let second = resolve_location(&url, &mut cache, &HttpConfig::default()).unwrap();
        assert_eq!(second.size(), 2_048);
        assert_eq!(second.filename_hint(), Some("clip.mp4"));
        assert_eq!(server.heads.load(Ordering::SeqCst), 1);
    }
}
