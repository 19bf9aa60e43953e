mod macros;

/// Returns the version of the mailform workspace.
pub fn mailform_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builder helper for optional overrides, e.g. CLI flags on top of config.
pub trait Apply: Sized {
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }
}

impl<T> Apply for T {}
