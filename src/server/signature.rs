use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compares the lowercase hex HMAC-SHA512 digest of `body` against the
/// header-supplied signature. Plain string equality on the hex form.
pub fn verify(secret: &[u8], body: &[u8], signature: &str) -> bool {
    let mut mac = match HmacSha512::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);

    hex::encode(mac.finalize().into_bytes()) == signature
}
