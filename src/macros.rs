//! # Internal Macros
//!
//! ## zerocopy_accessors!
//!
//! Generates getter and setter methods for zerocopy struct fields that use
//! little-endian wrapper types (U32, U64). Used by [`crate::va::BlobRef`],
//! the fixed-layout reference block at the end of every blob payload.
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::little_endian::{U32, U64};
//!
//! #[repr(C)]
//! struct BlobRef {
//!     blob_id: U64,
//!     first_page: U32,
//! }
//!
//! impl BlobRef {
//!     zerocopy_accessors! {
//!         blob_id: u64,
//!         first_page: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn blob_id(&self) -> u64 { self.blob_id.get() }
//! // pub fn set_blob_id(&mut self, val: u64) { self.blob_id = U64::new(val); }
//! ```

/// Generates getter and setter methods for zerocopy little-endian fields.
///
/// The wrapper type is derived from the native one (`u32` -> `U32`), so any
/// width zerocopy ships a little-endian wrapper for works.
#[macro_export]
macro_rules! zerocopy_accessors {
    ($($field:ident : $ty:ident),* $(,)?) => {
        ::paste::paste! {
            $(
                #[inline]
                pub fn $field(&self) -> $ty {
                    self.$field.get()
                }

                #[inline]
                pub fn [<set_ $field>](&mut self, val: $ty) {
                    self.$field = ::zerocopy::little_endian::[<$ty:upper>]::new(val);
                }
            )*
        }
    };
}
