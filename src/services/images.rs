use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use reqwest::{header::CONTENT_TYPE, Client as HttpClient, Url};

use crate::error::FetchError;

/// Image bytes together with the content type the image server declared
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Downloads the image behind an `http`/`https` reference
///
/// The caller decides how to decode or display the bytes and what to do on
/// failure; nothing here retries or caches.
pub async fn fetch_image(client: &HttpClient, url: &str) -> Result<FetchedImage, FetchError> {
    let url = parse_image_url(url)?;

    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?;
    tracing::debug!(url = %url, bytes = bytes.len(), "Image fetched");

    Ok(FetchedImage {
        bytes: bytes.to_vec(),
        content_type,
    })
}

/// Downloads only the bytes behind an image reference
pub async fn fetch_image_bytes(client: &HttpClient, url: &str) -> Result<Vec<u8>, FetchError> {
    fetch_image(client, url).await.map(|image| image.bytes)
}

/// Rejects image references pointing at loopback, private or link-local hosts
///
/// Image references come from the remote catalog, so a server fetching them on
/// a client's behalf must not reach its own network. Hostnames are checked
/// literally; they are not resolved.
pub fn ensure_public_host(url: &str) -> Result<(), FetchError> {
    let parsed = parse_image_url(url)?;
    let host = parsed.host_str().unwrap_or_default();

    let public = match host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => is_public_ipv4(ip),
        Ok(IpAddr::V6(ip)) => is_public_ipv6(ip),
        Err(_) => !host.is_empty() && host != "localhost" && !host.ends_with(".localhost"),
    };

    if public {
        Ok(())
    } else {
        Err(FetchError::InvalidUrl(url.to_string()))
    }
}

fn parse_image_url(url: &str) -> Result<Url, FetchError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(parsed),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    // 100.64.0.0/10 is carrier-grade NAT space
    let shared = a == 100 && (b & 0xc0) == 64;

    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || shared)
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_public_ipv4(mapped);
    }

    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;

    !(ip.is_loopback() || ip.is_unspecified() || unique_local || link_local)
}
