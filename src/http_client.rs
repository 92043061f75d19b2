//! Shared HTTP client configuration and bounded body helpers.

use std::io::{self, Read};
use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("feedbox/", env!("CARGO_PKG_VERSION"));

/// Return a shared HTTP agent with consistent timeouts.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
    })
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    check_content_length(response.header("Content-Length"), max_bytes)?;
    read_limited(response.into_reader(), max_bytes)
}

/// Read a response body as UTF-8 text, enforcing a maximum byte size.
pub(crate) fn read_response_text(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<String, io::Error> {
    let bytes = read_response_bytes(response, max_bytes)?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Drain `reader` into memory, failing once more than `max_bytes` arrive.
pub(crate) fn read_limited(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, io::Error> {
    let mut limited = reader.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Body exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

/// Reject a declared `Content-Length` above `max_bytes` before reading.
pub(crate) fn check_content_length(
    declared: Option<&str>,
    max_bytes: usize,
) -> Result<(), io::Error> {
    let Some(length) = declared else {
        return Ok(());
    };
    let Ok(length) = length.trim().parse::<u64>() else {
        return Ok(());
    };
    if length > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Body too large: {length} bytes"),
        ));
    }
    Ok(())
}
