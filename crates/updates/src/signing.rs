use crate::title_id::TitleId;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sony's Vita update-manifest signing key, long since reverse engineered and
/// published. The server recomputes the same MAC to authorize the request, so
/// this is a protocol constant rather than a secret worth protecting.
const VITA_UPDATE_KEY: [u8; 32] = [
    0xe5, 0xe2, 0x78, 0xaa, 0x1e, 0xe3, 0x40, 0x82, 0xa0, 0x88, 0x27, 0x9c, 0x83, 0xf9, 0xbb,
    0xc8, 0x06, 0x82, 0x1c, 0x52, 0xf2, 0xab, 0x5d, 0x2b, 0x4a, 0xbd, 0x99, 0x54, 0x50, 0x35,
    0x51, 0x14,
];

/// Compute the manifest-path signature for a normalized title identifier.
///
/// HMAC-SHA256 over `"np_" + id` with the fixed vendor key, rendered as
/// lowercase hex. Deterministic: the same identifier always signs to the same
/// digest, which is exactly what the server expects to find in the URL path.
pub fn sign(id: &TitleId) -> String {
    let mut mac =
        HmacSha256::new_from_slice(&VITA_UPDATE_KEY).expect("HMAC accepts any key length");
    mac.update(b"np_");
    mac.update(id.as_str().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
