//! Re-exports of the type-level numbers used to size alphabets and matrices.
//!
//! Dependent crates can name [`Alphabet::K`](crate::abc::Alphabet::K) and
//! read its value without depending on `typenum` themselves.

#[doc(no_inline)]
pub use generic_array::ArrayLength;
#[doc(no_inline)]
pub use typenum::*;
