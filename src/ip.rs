/// Client address extraction
///
/// Votes record the submitter's address and the rate limiter keys on it.
use actix_web::HttpRequest;
use std::net::IpAddr;

/// Extract the real client IP address from an HTTP request.
///
/// Checks headers in order of preference:
/// 1. X-Forwarded-For (first IP in the list)
/// 2. X-Real-IP
/// 3. Remote peer address
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    // Check X-Forwarded-For header (proxy chains)
    if let Some(xff) = req.headers().get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            // Take the first IP in the chain (the original client)
            if let Some(ip) = xff_str.split(',').next().and_then(parse_ip) {
                return Some(ip);
            }
        }
    }

    // Check X-Real-IP header (nginx, etc.)
    if let Some(xri) = req.headers().get("x-real-ip") {
        if let Some(ip) = xri.to_str().ok().and_then(parse_ip) {
            return Some(ip);
        }
    }

    // Fall back to peer address
    req.peer_addr().map(|peer_addr| peer_addr.ip().to_string())
}

/// Returns the canonical form of `candidate` if it is a valid address.
fn parse_ip(candidate: &str) -> Option<String> {
    candidate
        .trim()
        .parse::<IpAddr>()
        .ok()
        .map(|ip| ip.to_string())
}

/// Rate limiter key for a request. Requests without an address share one bucket.
pub fn client_key(req: &HttpRequest) -> String {
    extract_client_ip(req).unwrap_or_else(|| "unknown".to_string())
}
