// src/core/mime.rs

//! # MIME Resolver
//!
//! Answers "what type is this file?" with as little work as possible: a per-path
//! cache first, then a table of well-known extensions, and only then an external
//! query tool (`file --brief --mime-type` by default). Failures never propagate;
//! an empty string means the type is unknown, and it is cached like any other
//! answer, so each path is handed to the tool at most once.

use crate::core::path_cache::PathCache;
use crate::system::executor;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

lazy_static! {
    /// Extensions whose MIME type is known without asking anyone.
    static ref EXTENSION_SHORTCUTS: HashMap<&'static str, &'static str> = HashMap::from([
        ("txt", "text/plain"),
        ("md", "text/markdown"),
        ("json", "application/json"),
        ("xml", "application/xml"),
        ("html", "text/html"),
        ("pdf", "application/pdf"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("webp", "image/webp"),
        ("bmp", "image/bmp"),
        ("svg", "image/svg+xml"),
        ("mp4", "video/mp4"),
        ("mkv", "video/x-matroska"),
        ("webm", "video/webm"),
        ("mov", "video/quicktime"),
        ("avi", "video/x-msvideo"),
        ("mp3", "audio/mpeg"),
    ]);

    /// A `type/subtype` token at the start of the tool's output.
    static ref MIME_TOKEN: Regex =
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*)")
            .expect("MIME token pattern is valid");
}

/// The external tool used for MIME queries, as configured.
#[derive(Debug, Clone)]
pub struct MimeTool {
    /// Command line; the file path is appended as the last argument.
    pub command: String,
    pub timeout: Duration,
}

/// Per-path memoized MIME lookups.
#[derive(Debug)]
pub struct MimeResolver {
    cache: RwLock<HashMap<PathBuf, String>>,
    paths: Arc<PathCache>,
    tool: MimeTool,
}

impl MimeResolver {
    pub fn new(paths: Arc<PathCache>, tool: MimeTool) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            paths,
            tool,
        }
    }

    /// Returns the MIME type of `path`, or an empty string if it cannot be determined.
    pub async fn mime_type(&self, path: &Path) -> String {
        if let Some(hit) = self.cached(path) {
            log::trace!("MIME cache hit for '{}'", path.display());
            return hit;
        }

        if let Some(mime) = shortcut_for(path) {
            return self.store(path, mime.to_string());
        }

        let mime = self.query_tool(path).await.unwrap_or_default();
        self.store(path, mime)
    }

    fn cached(&self, path: &Path) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    fn store(&self, path: &Path, mime: String) -> String {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(path.to_path_buf()).or_insert(mime).clone()
    }

    /// Runs the external tool. Any failure yields `None`.
    async fn query_tool(&self, path: &Path) -> Option<String> {
        let (program, args) = match executor::split_command_line(&self.tool.command) {
            Ok(parts) => parts,
            Err(e) => {
                log::warn!("Invalid MIME command '{}': {}", self.tool.command, e);
                return None;
            }
        };

        let program_path = match self.paths.resolve(&program).await {
            Ok(p) => p,
            Err(e) => {
                log::debug!("MIME tool unavailable: {}", e);
                return None;
            }
        };

        let mut args: Vec<OsString> = args.into_iter().map(OsString::from).collect();
        args.push(path.as_os_str().to_os_string());

        match executor::capture_output_with_timeout(&program_path, &args, self.tool.timeout).await
        {
            Ok(output) => {
                let mime = parse_tool_output(&output);
                log::debug!("MIME of '{}' is '{}'", path.display(), mime);
                Some(mime)
            }
            Err(e) => {
                log::debug!("MIME query for '{}' failed: {}", path.display(), e);
                None
            }
        }
    }
}

/// Looks up the extension shortcut table for `path`.
fn shortcut_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_SHORTCUTS.get(ext.as_str()).copied()
}

/// Trims the tool's output and keeps the leading `type/subtype` token.
///
/// `text/plain; charset=us-ascii` becomes `text/plain`; output that does not look
/// like a MIME type at all becomes the empty string.
fn parse_tool_output(output: &str) -> String {
    let line = output.lines().next().unwrap_or("").trim();
    MIME_TOKEN
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::path_cache::{SystemSearch, tests::FakeSearch};
    use std::fs;
    use tempfile::TempDir;

    fn resolver_with(command: &str, timeout: Duration) -> MimeResolver {
        MimeResolver::new(
            Arc::new(PathCache::new(SystemSearch::new()).with_timeout(Duration::from_secs(5))),
            MimeTool {
                command: command.to_string(),
                timeout,
            },
        )
    }

    #[test]
    fn test_parse_tool_output_strips_parameters() {
        assert_eq!(parse_tool_output("  text/plain; charset=us-ascii\n"), "text/plain");
        assert_eq!(parse_tool_output("application/vnd.ms-excel\n"), "application/vnd.ms-excel");
        assert_eq!(parse_tool_output("cannot open `x'"), "");
        assert_eq!(parse_tool_output(""), "");
    }

    #[tokio::test]
    async fn test_shortcut_avoids_external_tool() {
        let search = FakeSearch::with(&[]);
        let calls = Arc::clone(&search.calls);
        let resolver = MimeResolver::new(
            Arc::new(PathCache::new(search)),
            MimeTool {
                command: "file --brief --mime-type".to_string(),
                timeout: Duration::from_secs(1),
            },
        );

        assert_eq!(resolver.mime_type(Path::new("/x/photo.PNG")).await, "image/png");
        assert_eq!(resolver.mime_type(Path::new("/x/notes.txt")).await, "text/plain");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_tool_yields_empty() {
        let resolver = resolver_with("no-such-mime-tool-xyz", Duration::from_secs(1));
        assert_eq!(resolver.mime_type(Path::new("/x/blob.bin")).await, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_second_query_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("calls");
        let script = dir.path().join("fake-mime.sh");
        fs::write(
            &script,
            format!(
                "echo call >> '{}'\necho 'application/x-custom; charset=binary'\n",
                counter.display()
            ),
        )
        .unwrap();
        let target = dir.path().join("blob.bin");
        fs::write(&target, b"\x00\x01").unwrap();

        let resolver = resolver_with(
            &format!("sh '{}'", script.display()),
            Duration::from_secs(5),
        );

        let first = resolver.mime_type(&target).await;
        let second = resolver.mime_type(&target).await;

        assert_eq!(first, "application/x-custom");
        assert_eq!(first, second);
        let calls = fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_or_failing_tool_yields_empty() {
        let dir = TempDir::new().unwrap();
        let slow = dir.path().join("slow.sh");
        fs::write(&slow, "sleep 5\necho text/plain\n").unwrap();
        let target = dir.path().join("data.unknownext");

        let resolver = resolver_with(
            &format!("sh '{}'", slow.display()),
            Duration::from_millis(100),
        );
        assert_eq!(resolver.mime_type(&target).await, "");
        assert_eq!(resolver.cached(&target).as_deref(), Some(""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_query_is_cached_as_unknown() {
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("calls");
        let failing = dir.path().join("fail.sh");
        fs::write(
            &failing,
            format!("echo call >> '{}'\necho text/plain\nexit 1\n", counter.display()),
        )
        .unwrap();
        let target = dir.path().join("data.unknownext");

        let resolver = resolver_with(
            &format!("sh '{}'", failing.display()),
            Duration::from_secs(5),
        );

        assert_eq!(resolver.mime_type(&target).await, "");
        assert_eq!(resolver.mime_type(&target).await, "");
        let calls = fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().count(), 1);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_path_reaches_the_tool_intact() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = TempDir::new().unwrap();
        let seen = dir.path().join("seen");
        let script = dir.path().join("record.sh");
        fs::write(
            &script,
            format!("printf '%s' \"$1\" > '{}'\necho application/x-test\n", seen.display()),
        )
        .unwrap();
        let target = dir.path().join(OsStr::from_bytes(b"caf\xe9.unknownext"));
        fs::write(&target, b"\x00").unwrap();

        let resolver = resolver_with(
            &format!("sh '{}'", script.display()),
            Duration::from_secs(5),
        );

        assert_eq!(resolver.mime_type(&target).await, "application/x-test");
        assert_eq!(fs::read(&seen).unwrap(), target.as_os_str().as_bytes());
    }
}
