use std::fmt;

use crate::error::CallPathError;

/// A parsed call path: `{worker}/{method}`
///
/// Example: `sysconfig/exportConfiguration`
/// - `worker`: `sysconfig`
/// - `method`: `exportConfiguration`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallPath {
    pub worker: String,
    pub method: String,
}

impl CallPath {
    /// Build a call path from its parts, validating both segments.
    pub fn new(
        worker: impl Into<String>,
        method: impl Into<String>,
    ) -> Result<Self, CallPathError> {
        let worker = worker.into();
        let method = method.into();
        validate_segment("worker", &worker)?;
        validate_segment("method", &method)?;
        Ok(CallPath { worker, method })
    }

    /// Parse a path string.
    ///
    /// Expected format: `{worker}/{method}`, with an optional leading slash.
    pub fn parse(path: &str) -> Result<Self, CallPathError> {
        let path = path.strip_prefix('/').unwrap_or(path);

        let (worker, method) = path
            .split_once('/')
            .ok_or_else(|| {
                CallPathError::Invalid(format!("call path must contain '/': '{path}'"))
            })?;

        Self::new(worker, method)
    }

    /// Returns the full path: `{worker}/{method}`
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.worker, self.method)
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.worker, self.method)
    }
}

fn validate_segment(what: &str, segment: &str) -> Result<(), CallPathError> {
    if segment.is_empty() {
        return Err(CallPathError::Invalid(format!("{what} name must be non-empty")));
    }
    if segment.contains('/') {
        return Err(CallPathError::Invalid(format!(
            "{what} name must not contain '/': '{segment}'"
        )));
    }
    Ok(())
}
