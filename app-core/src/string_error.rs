use std::fmt::Display;

pub trait ErrorStringExt<T> {
    /// Converts the error into a `"msg: cause"` string.
    fn err_to_string(self, msg: &str) -> Result<T, String>;
}

impl<T, E: Display> ErrorStringExt<T> for Result<T, E> {
    fn err_to_string(self, msg: &str) -> Result<T, String> {
        self.map_err(|err| format!("{msg}: {err}"))
    }
}
