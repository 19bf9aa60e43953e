/// Asserts that an expression matches a pattern, optionally guarded by a
/// predicate. The value is printed with `Debug` on failure.
///
/// ```rust
/// # use mailform_utils::assert_matches;
/// let status: Result<u16, String> = Ok(202);
/// assert_matches!(status.clone(), Ok(202));
/// assert_matches!(status, Ok(code) if (200..300).contains(code));
/// ```
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat) => {
        $crate::assert_matches!($expr, $pat if true)
    };
    ($expr:expr, $pat:pat if $pred:expr) => {{
        let value = $expr;
        #[allow(unused_variables, reason = "bindings are only used by the guard")]
        let matched = match &value {
            $pat => Some($pred),
            _ => None,
        };
        match matched {
            Some(true) => (),
            Some(false) => ::core::panic!(
                "assertion failed: {value:?} matches `{}` but not `{}`",
                ::core::stringify!($pat),
                ::core::stringify!($pred),
            ),
            None => ::core::panic!(
                "assertion failed: {value:?} does not match `{}`",
                ::core::stringify!($pat),
            ),
        }
    }};
}
