//! Helpers splitting raw response bytes

use bytes::Bytes;
use tracing::debug;

use crate::error::Error;
use crate::response::status::StatusWord;

/// Split raw response bytes into the data part and the trailing status word
///
/// The data part is `raw[..len - 2]` and shares the buffer of `raw`.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if fewer than 2 bytes are provided.
pub fn split_status_word(raw: &Bytes) -> Result<(Bytes, StatusWord), Error> {
    let len = raw.len();
    if len < 2 {
        debug!(len, "Response too short to hold a status word");
        return Err(Error::invalid_argument(format!(
            "APDU response must hold at least 2 bytes, got {len}"
        )));
    }

    let status = StatusWord::new(raw[len - 2], raw[len - 1]);
    Ok((raw.slice(..len - 2), status))
}

/// Upper-case hex rendering used by the diagnostic `Display` impls
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}
