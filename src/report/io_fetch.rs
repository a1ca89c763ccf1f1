// Download of the results files.

use reqwest::blocking::Client;

use crate::report::*;

/// Makes sure that a copy of `url` exists at `path`.
///
/// The file is only downloaded if it does not exist yet: an existing file is
/// used as a cache and never refreshed.
pub fn ensure_local_copy(path: &Path, url: &str) -> BReportResult<()> {
    if path.exists() {
        info!("Using the existing copy {:?} of {}", path.display(), url);
        return Ok(());
    }
    let client = Client::builder().build().context(FetchingSnafu { url })?;
    download(&client, path, url)
}

// Any status other than a success fails, and nothing is written then.
fn download(client: &Client, path: &Path, url: &str) -> BReportResult<()> {
    let path_s = path.display().to_string();
    info!("Downloading {} to {:?}", url, path_s);
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .context(FetchingSnafu { url })?;
    let content = response.bytes().context(FetchingSnafu { url })?;
    debug!("download: {} bytes from {}", content.len(), url);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu { path: &path_s })?;
        }
    }
    fs::write(path, &content).context(WritingFileSnafu { path: &path_s })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    // Serves a single request with the given status line and body.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/results.csv", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
        });
        (url, handle)
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn existing_file_is_not_downloaded() {
        let path = std::env::temp_dir().join("elexsum_cached_results.csv");
        fs::write(&path, "date,office,candidate,party,votes\n").unwrap();
        // The URL is never contacted.
        ensure_local_copy(&path, "http://invalid.invalid/results.csv").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,office,candidate,party,votes\n"
        );
    }

    #[test]
    fn missing_file_is_downloaded() {
        let body = "date,office,candidate,party,votes\n";
        let (url, server) = serve_once("200 OK", body);
        let path = std::env::temp_dir()
            .join("elexsum_download_ok")
            .join("results.csv");
        let _ = fs::remove_file(&path);

        download(&local_client(), &path, &url).unwrap();
        server.join().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), body);
    }

    #[test]
    fn http_error_is_fatal() {
        let (url, server) = serve_once("404 Not Found", "");
        let path = std::env::temp_dir().join("elexsum_download_404.csv");
        let _ = fs::remove_file(&path);

        let res = download(&local_client(), &path, &url);
        server.join().unwrap();
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::Fetching { .. })
        ));
        assert!(!path.exists());
    }
}
