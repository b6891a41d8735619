//! Streaming HTTP GET of the asset archive into a scratch file.
//!
//! One request, redirects followed, body written sequentially as it arrives.
//! Any curl failure or non-2xx status fails the fetch; there is no retry.

use std::fs::File;
use std::io::{self, Write};

use thiserror::Error;

use crate::config::TransportConfig;

const MAX_REDIRECTS: u32 = 10;

/// Why a fetch failed. `Display` is the text reported in `DownloadFailed`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, DNS, TLS, …).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response status outside 200..300.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the body to scratch storage failed (e.g. disk full).
    #[error("storage: {0}")]
    Storage(#[source] io::Error),
}

/// Downloads `url` into `out`, calling `on_bytes` with the running byte count
/// after each chunk. Returns the number of bytes written.
///
/// Blocking; run it on a blocking thread.
pub fn download_to<F>(
    url: &str,
    out: &mut File,
    transport: &TransportConfig,
    mut on_bytes: F,
) -> Result<u64, TransportError>
where
    F: FnMut(u64),
{
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    // Zero leaves curl's default in place: no deadline unless configured.
    if transport.connect_timeout_secs > 0 {
        easy.connect_timeout(transport.connect_timeout())?;
    }
    if transport.low_speed_limit_bytes > 0 && transport.low_speed_time_secs > 0 {
        easy.low_speed_limit(transport.low_speed_limit_bytes)?;
        easy.low_speed_time(transport.low_speed_time())?;
    }
    if transport.timeout_secs > 0 {
        easy.timeout(transport.timeout())?;
    }
    if let Some(agent) = transport.user_agent.as_deref() {
        easy.useragent(agent)?;
    }

    let mut received: u64 = 0;
    let mut storage_error: Option<io::Error> = None;
    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match out.write_all(data) {
            Ok(()) => {
                received += data.len() as u64;
                on_bytes(received);
                Ok(data.len())
            }
            Err(e) => {
                storage_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(io_err) = storage_error {
                return Err(TransportError::Storage(io_err));
            }
        }
        return Err(TransportError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransportError::Http(code));
    }

    out.flush().map_err(TransportError::Storage)?;
    tracing::debug!(url, bytes = received, "GET completed");
    Ok(received)
}
