//! Binary encoding of SCTE-35 structures.
//!
//! Encoding always emits canonical form: the derived length fields are
//! computed from the structures themselves and no alignment stuffing is
//! produced. Encoders are infallible on well-formed values; questionable
//! UPID text is reported through the diagnostic sink and written
//! best-effort.

mod commands;
mod descriptors;
mod splice_info_section;

use crate::bits::BitWriter;

/// A structure with a binary SCTE-35 wire form.
pub(crate) trait Encodable {
    /// Appends the wire form to `writer`.
    fn encode(&self, writer: &mut BitWriter);

    /// The exact number of bytes [`Encodable::encode`] will write. The
    /// section layer uses this for the derived length fields and to
    /// pre-size the output buffer.
    fn encoded_size(&self) -> usize;
}
