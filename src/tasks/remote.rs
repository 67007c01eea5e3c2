//! Remote listing and download
//!
//! The fetch step only needs two operations from the outside world: read a
//! listing page and download one file. `HttpRemote` talks to the real
//! server; `MirrorRemote` serves the same operations from a local directory.

use crate::error::{TaskError, TaskResult};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::RANGE;
use reqwest::{StatusCode, Url};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Narrow interface over the listing server
pub trait Remote: Send + Sync {
    /// Body of the listing page at `url`
    fn listing(&self, url: &str) -> TaskResult<String>;

    /// Download `url` into `dest`, continuing a partial `dest` when possible
    fn download(&self, url: &str, dest: &Path) -> TaskResult<()>;
}

/// First link in a listing whose target contains `pattern`, made absolute
/// against the listing URL
pub fn find_link(listing: &str, pattern: &str, base_url: &str) -> Option<String> {
    static HREF: OnceLock<Regex> = OnceLock::new();
    let re = HREF.get_or_init(|| {
        Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("href pattern is valid")
    });

    re.captures_iter(listing)
        .map(|caps| caps[1].to_string())
        .find(|href| href.contains(pattern))
        .map(|href| match Url::parse(base_url).and_then(|base| base.join(&href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", base_url, href),
        })
}

fn transfer(url: &str, reason: impl ToString) -> TaskError {
    TaskError::Transfer {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// HTTP(S) access through a blocking reqwest client
pub struct HttpRemote {
    client: Client,
}

impl HttpRemote {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("geopipe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client (proxy, timeouts, TLS roots)
    pub fn with_client(client: Client) -> Self {
        HttpRemote { client }
    }
}

impl Remote for HttpRemote {
    fn listing(&self, url: &str) -> TaskResult<String> {
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| transfer(url, e))
    }

    fn download(&self, url: &str, dest: &Path) -> TaskResult<()> {
        let offset = fs::metadata(dest).map(|m| m.len()).unwrap_or(0);

        let mut request = self.client.get(url);
        if offset > 0 {
            request = request.header(RANGE, format!("bytes={}-", offset));
        }
        let response = request.send().map_err(|e| transfer(url, e))?;

        // The partial file already holds the whole body
        if offset > 0 && response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(());
        }

        let mut response = response.error_for_status().map_err(|e| transfer(url, e))?;
        let append = offset > 0 && response.status() == StatusCode::PARTIAL_CONTENT;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(dest)
            .map_err(|e| TaskError::io(dest, e))?;

        response.copy_to(&mut file).map_err(|e| transfer(url, e))?;
        Ok(())
    }
}

/// Serves listings and downloads from a local directory.
///
/// The listing links every file in the directory; a download picks the file
/// named by the last segment of the URL.
pub struct MirrorRemote {
    root: PathBuf,
}

impl MirrorRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MirrorRemote { root: root.into() }
    }
}

impl Remote for MirrorRemote {
    fn listing(&self, url: &str) -> TaskResult<String> {
        let mut names = fs::read_dir(&self.root)
            .map_err(|e| transfer(url, e))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect::<Vec<_>>();
        names.sort();

        Ok(names
            .iter()
            .map(|name| format!("<a href=\"{}\">{}</a>\n", name, name))
            .collect())
    }

    fn download(&self, url: &str, dest: &Path) -> TaskResult<()> {
        let name = url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| transfer(url, "no file name in URL"))?;

        let source = self.root.join(name);
        if !source.is_file() {
            return Err(transfer(url, format!("{} not in mirror", name)));
        }
        fs::copy(&source, dest).map_err(|e| TaskError::io(dest, e))?;
        Ok(())
    }
}
