//! File and directory serving through the virtual filesystem.

use std::io::{Read, SeekFrom};
use std::sync::Arc;
use std::time::SystemTime;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use mdserve_vfs::{File, FileStat, FsError, FsErrorKind};

use super::range::ByteRange;
use super::{decode_path, listing};
use crate::error::ServerError;
use crate::state::AppState;

/// File served for a directory when present.
const INDEX_FILE: &str = "index.html";

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Handle any request by serving the matching path.
pub(crate) async fn serve(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let method = request.method().clone();
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response();
    }

    let head = method == Method::HEAD;
    let raw_path = request.uri().path().to_owned();
    let range = request
        .headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    // Opening may read and render a whole file, so keep it off the async workers
    let task_state = Arc::clone(&state);
    let task_path = raw_path.clone();
    let result = tokio::task::spawn_blocking(move || {
        serve_blocking(&task_state, &task_path, range.as_deref(), head)
    })
    .await
    .unwrap_or_else(|e| Err(e.into()));

    result.unwrap_or_else(|err| error_response(&state, &raw_path, err))
}

/// Log a failed request and turn it into a response.
fn error_response(state: &AppState, path: &str, err: ServerError) -> Response {
    match &err {
        ServerError::Fs(fs_err) if fs_err.kind == FsErrorKind::Render => {
            tracing::error!(path, error = %err, "Render failed");
            state.report_render_failure(format!("{path}: {err}"));
        }
        _ if err.status().is_server_error() => {
            tracing::error!(path, error = %err, "Request failed");
        }
        _ => {
            tracing::debug!(path, status = err.status().as_u16(), "Request rejected");
        }
    }
    err.into_response()
}

fn serve_blocking(
    state: &AppState,
    raw_path: &str,
    range: Option<&str>,
    head: bool,
) -> Result<Response, ServerError> {
    let path = decode_path(raw_path)?;
    let file = state.fs.open(&path)?;
    let stat = file.stat()?;

    if !stat.is_dir() {
        return serve_file(file, stat.as_ref(), &path, range, head);
    }

    if !path.ends_with('/') {
        close_quietly(file);
        return Ok((
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, format!("{raw_path}/"))],
        )
            .into_response());
    }

    serve_directory(state, file, &path, range, head)
}

fn serve_directory(
    state: &AppState,
    mut dir: Box<dyn File>,
    path: &str,
    range: Option<&str>,
    head: bool,
) -> Result<Response, ServerError> {
    let index_path = format!("{path}{INDEX_FILE}");
    match state.fs.open(&index_path) {
        Ok(index) => {
            let index_stat = index.stat()?;
            if !index_stat.is_dir() {
                close_quietly(dir);
                return serve_file(index, index_stat.as_ref(), &index_path, range, head);
            }
            close_quietly(index);
        }
        Err(e) if e.kind == FsErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let entries = dir.readdir(0)?;
    close_quietly(dir);

    let html = listing::render(entries);
    let len = html.len();
    let body = if head { Body::empty() } else { Body::from(html) };
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HTML_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, len)
        .body(body)?)
}

fn serve_file(
    mut file: Box<dyn File>,
    stat: &dyn FileStat,
    path: &str,
    range: Option<&str>,
    head: bool,
) -> Result<Response, ServerError> {
    let size = stat.size();
    let content_type = file
        .media_type()
        .unwrap_or_else(|| mdserve_assets::mime_for(path));

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(modified) = stat.modified() {
        builder = builder.header(header::LAST_MODIFIED, http_date(modified));
    }

    let (status, start, len) = match ByteRange::parse(range, size) {
        ByteRange::Full => (StatusCode::OK, 0, size),
        ByteRange::Partial { start, end } => {
            builder = builder.header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{size}"));
            (StatusCode::PARTIAL_CONTENT, start, end - start + 1)
        }
        ByteRange::Unsatisfiable => {
            close_quietly(file);
            return Ok(Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{size}"))
                .body(Body::empty())?);
        }
    };

    let body = if head {
        Vec::new()
    } else {
        read_span(file.as_mut(), start, len).map_err(|e| FsError::io(e, Some(path.into())))?
    };
    close_quietly(file);

    Ok(builder
        .status(status)
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from(body))?)
}

/// Read `len` bytes starting at `start`.
fn read_span(file: &mut dyn File, start: u64, len: u64) -> std::io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::with_capacity(usize::try_from(len).unwrap_or_default());
    file.take(len).read_to_end(&mut buf)?;
    Ok(buf)
}

fn close_quietly(file: Box<dyn File>) {
    if let Err(e) = file.close() {
        tracing::warn!(error = %e, "Failed to close file");
    }
}

/// Format a timestamp as an HTTP date.
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::Router;
    use axum::http::HeaderValue;
    use mdserve_renderer::{PendingCleanup, Renderer};
    use mdserve_vfs::{DirFs, RenderScope, VirtualFs};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::app::create_router;

    fn router(root: &Path, strict: bool) -> (Router, Arc<AppState>) {
        let cleanup = Arc::new(PendingCleanup::new());
        let renderer = Renderer::local(root, cleanup).unwrap();
        let fs = VirtualFs::new(DirFs::new(root), renderer, RenderScope::default());
        let state = Arc::new(AppState::new(Arc::new(fs), strict));
        (create_router(Arc::clone(&state)), state)
    }

    async fn send(router: Router, method: Method, uri: &str, range: Option<&str>) -> Response {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(range) = range {
            builder = builder.header(header::RANGE, range);
        }
        router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_markdown_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.md"), "# Header\n\nText").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/doc.md", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CONTENT_TYPE), HTML_CONTENT_TYPE);
        let length: usize = header_str(&response, header::CONTENT_LENGTH).parse().unwrap();
        assert!(response.headers().contains_key(header::LAST_MODIFIED));
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(body.len(), length);
        assert!(body.starts_with("<html><head>"));
        assert!(body.contains("<h1>Header</h1>"));
    }

    #[tokio::test]
    async fn test_binary_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let png = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3];
        std::fs::write(dir.path().join("image.png"), &png).unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/image.png", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/png");
        assert_eq!(body_bytes(response).await, png);
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my notes.txt"), "hi").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/my%20notes.txt", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"hi");
    }

    #[tokio::test]
    async fn test_missing_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/missing.md", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parent_traversal_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        let (app, _state) = router(&root, false);

        let response = send(app, Method::GET, "/%2e%2e/secret.txt", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_redirects_to_slash() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/sub", None).await;

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(header_str(&response, header::LOCATION), "/sub/");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();
        std::fs::write(dir.path().join("a.png"), "a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CONTENT_TYPE), HTML_CONTENT_TYPE);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(
            body,
            "<pre>\n<a href=\"a.png\">a.png</a>\n<a href=\"b.md\">b.md</a>\n<a href=\"sub/\">sub/</a>\n</pre>\n"
        );
    }

    #[tokio::test]
    async fn test_directory_index_html() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();
        std::fs::write(dir.path().join("site/index.html"), "<p>home</p>").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/site/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<p>home</p>");
    }

    #[tokio::test]
    async fn test_range_request() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), b"0123456789").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/data.bin", Some("bytes=2-5")).await;

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 2-5/10");
        assert_eq!(header_str(&response, header::CONTENT_LENGTH), "4");
        assert_eq!(body_bytes(response).await, b"2345");
    }

    #[tokio::test]
    async fn test_range_on_rendered_page_uses_page_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.md"), "# Header").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/doc.md", Some("bytes=0-5")).await;

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_bytes(response).await, b"<html>");
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), b"0123").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/data.bin", Some("bytes=10-")).await;

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes */4");
    }

    #[tokio::test]
    async fn test_head_has_length_but_no_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), b"0123").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::HEAD, "/data.bin", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CONTENT_LENGTH), "4");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::POST, "/", None).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW),
            Some(&HeaderValue::from_static("GET, HEAD"))
        );
    }

    #[tokio::test]
    async fn test_security_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        let (app, _state) = router(dir.path(), false);

        let response = send(app, Method::GET, "/a.txt", None).await;

        assert_eq!(header_str(&response, "x-content-type-options".parse().unwrap()), "nosniff");
        assert_eq!(header_str(&response, "x-frame-options".parse().unwrap()), "SAMEORIGIN");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_failure_is_500_and_aborts_strict_server() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.md"), "# Doc").unwrap();
        // Stylesheets cannot be written into a read-only root
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();
        if std::fs::write(dir.path().join("writable"), "").is_ok() {
            // Running with privileges that ignore permissions
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let (app, state) = router(dir.path(), true);

        let response = send(app, Method::GET, "/doc.md", None).await;
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.abort_reason().is_some_and(|r| r.contains("/doc.md")));
    }
}
