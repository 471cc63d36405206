//! Helper macros shared by the codec and connection layers.

/// Returns early with `$error` unless `$predicate` holds.
///
/// Like `assert!`, but for conditions a client can violate, so it hands back
/// an error instead of panicking:
///
/// ```ignore
/// ensure!(src.len() < self.max_bytes, ParseError::too_large(self.max_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
