//! Infallible conversions between integer types.

/// A cast that can never lose information.
///
/// `as` will happily truncate a `u64` into a `u32`, this trait is only
/// implemented for the widening conversions that are lossless on every target
/// we build for. Platform code uses it to turn the integers the OS reports
/// (`st_nlink`, `st_mode`, `f_bsize`, ...) into the types of our public API.
pub trait CastFrom<T> {
    fn cast_from(from: T) -> Self;
}

macro_rules! cast_from {
    ($from:ty, $to:ty) => {
        paste::paste! {
            impl crate::cast::CastFrom<$from> for $to {
                #[allow(clippy::as_conversions)]
                fn cast_from(from: $from) -> $to {
                    from as $to
                }
            }

            /// `const` flavor of the matching [`crate::cast::CastFrom`] implementation.
            #[allow(clippy::as_conversions)]
            pub const fn [< $from _to_ $to >](from: $from) -> $to {
                from as $to
            }
        }
    };
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
mod target32 {
    cast_from!(u8, u32);
    cast_from!(u8, u64);
    cast_from!(u16, u32);
    cast_from!(u16, u64);
    cast_from!(u32, u32);
    cast_from!(u32, u64);
    cast_from!(u32, usize);
    cast_from!(u64, u64);
    cast_from!(i32, i64);
    cast_from!(usize, u64);
}
#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
pub use target32::*;

// Only lossless when pointers are 64 bits wide.
#[cfg(target_pointer_width = "64")]
mod target64 {
    cast_from!(u64, usize);
}
#[cfg(target_pointer_width = "64")]
pub use target64::*;
