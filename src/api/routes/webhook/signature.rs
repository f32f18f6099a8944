//! LINE webhook signatures: base64 of the HMAC-SHA256 of the raw
//! request body keyed with the channel secret.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac(channel_secret: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Signature LINE would send for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    mac(channel_secret, body)
        .map(|mac| STANDARD.encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant-time check of `signature` against `body`.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Some(mac) = mac(channel_secret, body) else {
        return false;
    };
    mac.verify_slice(&expected).is_ok()
}
