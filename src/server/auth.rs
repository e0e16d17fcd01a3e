use hmac::{ Hmac, Mac };
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Accepted distance between the client's `ts` and server time.
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("missing ts/sig")]
    Missing,
    #[error("timestamp out of range")]
    Stale,
    #[error("bad signature")]
    BadSignature,
}

/// Hex HMAC-SHA256 of `ts` keyed by `secret`.
pub fn sign(secret: &str, ts: &str) -> Option<String> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(ts.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify_handshake(
    secret: &str,
    ts: Option<&str>,
    sig: Option<&str>,
    now: i64
) -> Result<(), HandshakeError> {
    let (Some(ts), Some(sig)) = (ts, sig) else {
        return Err(HandshakeError::Missing);
    };

    let ts_i: i64 = ts.parse().unwrap_or(0);
    if now.abs_diff(ts_i) > MAX_CLOCK_SKEW_SECS.unsigned_abs() {
        return Err(HandshakeError::Stale);
    }

    let provided = hex::decode(sig).map_err(|_| HandshakeError::BadSignature)?;
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|_| HandshakeError::BadSignature)?;
    mac.update(ts.as_bytes());
    mac.verify_slice(&provided).map_err(|_| HandshakeError::BadSignature)
}
