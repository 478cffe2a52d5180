//! # Tuple Builder
//!
//! Accumulates field encodings in field order and frames them once at the
//! end, so the outer header is written exactly once with its final length.
//! The builder keeps its allocation across [`VtplBuilder::reset`], which
//! makes it cheap to reuse for every row of a batch.
//!
//! ```ignore
//! let mut b = VtplBuilder::new();
//! b.push(&Scalar::Text("APPLE")).push(&Scalar::Int8(1));
//! let key = b.finish();
//! assert_eq!(key.as_vtpl().vacount(), 2);
//! ```

use crate::buffer::VaBuf;
use crate::va::{Scalar, Va, VaHeader};

#[derive(Debug, Default, Clone)]
pub struct VtplBuilder {
    body: Vec<u8>,
    fields: usize,
}

impl VtplBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            body: Vec::with_capacity(bytes),
            fields: 0,
        }
    }

    pub fn push(&mut self, value: &Scalar<'_>) -> &mut Self {
        value.encode_to(&mut self.body);
        self.fields += 1;
        self
    }

    /// Appends an already-encoded field.
    pub fn push_va(&mut self, va: Va<'_>) -> &mut Self {
        self.body.extend_from_slice(va.as_bytes());
        self.fields += 1;
        self
    }

    pub fn push_null(&mut self) -> &mut Self {
        self.push_va(Va::null())
    }

    pub fn field_count(&self) -> usize {
        self.fields
    }

    /// Gross length the finished tuple will have.
    pub fn encoded_len(&self) -> usize {
        VaHeader::for_net_len(self.body.len()).gross_len()
    }

    pub fn reset(&mut self) {
        self.body.clear();
        self.fields = 0;
    }

    /// Frames the accumulated fields and resets the builder.
    pub fn finish(&mut self) -> VaBuf {
        let out = VaBuf::from_payload(VaHeader::for_net_len(self.body.len()), &self.body);
        self.reset();
        out
    }
}
