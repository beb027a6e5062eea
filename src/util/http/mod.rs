use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use crate::{error::CrawlError, logging};

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// The per-request timeout is applied in [`send`], so one client serves every caller.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // reqwest 不內建 TLS provider，建立 client 之前先安裝 ring
        let _ = rustls::crypto::ring::default_provider().install_default();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            // ===== 連接池 =====
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs a single HTTP GET request and returns the body as text.
///
/// # Errors
///
/// * [`CrawlError::Transport`] when the request cannot be sent, times out or the body
///   cannot be read.
/// * [`CrawlError::Status`] when the server answers with a non-2xx status.
pub async fn get_text(url: &str, timeout: Duration) -> Result<String> {
    let response = send(Method::GET, url, timeout, None, None::<fn(_) -> _>).await?;
    let status = response.status();

    if !status.is_success() {
        return Err(CrawlError::Status {
            url: redact(url),
            status: status.as_u16(),
        }
        .into());
    }

    response.text().await.map_err(|why| {
        CrawlError::Transport {
            url: redact(url),
            reason: format!("Error reading response body: {:?}", why),
        }
        .into()
    })
}

/// Performs a single HTTP POST request with a JSON body.
///
/// The status code is returned as-is so callers can interpret conflicts themselves;
/// the body is only read for non-2xx answers to help diagnose rejections.
pub async fn post_json<REQ: Serialize>(
    url: &str,
    headers: Option<header::HeaderMap>,
    req: &REQ,
    timeout: Duration,
) -> Result<(StatusCode, String)> {
    let response = send(
        Method::POST,
        url,
        timeout,
        headers,
        Some(|rb: RequestBuilder| rb.json(req)),
    )
    .await?;
    let status = response.status();

    if status.is_success() {
        return Ok((status, String::new()));
    }

    let body = response.text().await.unwrap_or_default();
    Ok((status, body))
}

/// Sends one HTTP request. There is no retry: a failed attempt is reported to the caller.
async fn send(
    method: Method,
    url: &str,
    timeout: Duration,
    headers: Option<header::HeaderMap>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{}", redact(url));
    let client = get_client()?;
    let mut rb = client.request(method, url).timeout(timeout);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            logging::info_file_async(format!(
                "{} {} {} ms",
                visit_log,
                response.status(),
                elapsed
            ));
            Ok(response)
        }
        Err(why) => {
            logging::error_file_async(format!(
                "{} failed because {:?}. {} ms",
                visit_log, why, elapsed
            ));
            let reason = if why.is_timeout() {
                format!("timed out after {} ms", elapsed)
            } else {
                format!("{:?}", why)
            };
            Err(CrawlError::Transport {
                url: redact(url),
                reason,
            }
            .into())
        }
    }
}

/// 隱藏網址中的查詢字串，避免金鑰寫進日誌
pub fn redact(url: &str) -> String {
    match url.split_once('?') {
        Some((path, _)) => format!("{}?…", path),
        None => url.to_string(),
    }
}
