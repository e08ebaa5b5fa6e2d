//! `assert!` style macros for `Option`s.

/// Panics if the provided `Option` expression is `Some`, printing the value it held.
///
/// Handy for `insert`-like APIs that hand back the previous value when a key is
/// registered twice.
#[macro_export]
macro_rules! assert_none {
    ($val:expr, $($msg:tt)+) => {{
        if let Some(prev) = &$val {
            panic!("assertion failed: expected None, found Some({prev:?}): {}", format!($($msg)+));
        }
    }};
    ($val:expr) => {{
        if let Some(prev) = &$val {
            panic!("assertion failed: expected None, found Some({prev:?})");
        }
    }};
}
