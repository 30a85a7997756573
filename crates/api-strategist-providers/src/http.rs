// crates/api-strategist-providers/src/http.rs
// ============================================================================
// Module: HTTP Helpers
// Description: Shared URL policy and bounded body reads for outbound HTTP.
// Purpose: Keep every provider on the same scheme and size-limit rules.
// Dependencies: reqwest
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Response;
use reqwest::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum bytes of a response body included in error messages.
const MAX_ERROR_BODY_BYTES: usize = 512;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses `raw` and enforces the https-only scheme policy.
pub(crate) fn parse_endpoint(raw: &str, allow_http: bool) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|err| format!("invalid url {raw}: {err}"))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if allow_http => Ok(url),
        "http" => Err(format!("cleartext http not allowed for {raw}")),
        other => Err(format!("unsupported url scheme {other}")),
    }
}

/// Reads the response body while enforcing a strict size limit.
pub(crate) async fn read_body_with_limit(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, String> {
    let limit =
        u64::try_from(max_bytes).map_err(|_| "response size limit out of range".to_string())?;
    if let Some(length) = response.content_length()
        && length > limit
    {
        return Err(format!("response body exceeds size limit ({length} > {limit})"));
    }

    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| format!("failed to read response body: {err}"))?
    {
        let next_len = body
            .len()
            .checked_add(chunk.len())
            .ok_or_else(|| "response body exceeds size limit".to_string())?;
        if next_len > max_bytes {
            return Err(format!("response body exceeds size limit ({next_len} > {max_bytes})"));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Produces a bounded UTF-8 preview of a response body for error reporting.
pub(crate) fn body_preview(bytes: &[u8]) -> String {
    let preview_len = bytes.len().min(MAX_ERROR_BODY_BYTES);
    let preview = String::from_utf8_lossy(&bytes[.. preview_len]);
    if bytes.len() > preview_len {
        let remaining = bytes.len() - preview_len;
        format!("{preview}...[truncated {remaining} bytes]")
    } else {
        preview.to_string()
    }
}
