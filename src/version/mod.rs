//! Build identity reported by `opentracer version` and stamped into the
//! child environment.

use std::fmt;

use serde::Serialize;

/// The tool name used for the tracer scope and the default service tag.
pub const APP_NAME: &str = "opentracer";

/// The build version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the tool and version in the child process.
pub const VERSION_ENV: &str = "OPENTRACER_VERSION";

/// Version information for the running binary.
#[derive(Debug, Clone, Serialize)]
pub struct VersionDetail {
    pub app_name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

impl VersionDetail {
    /// The detail for this build.
    pub fn current() -> Self {
        Self {
            app_name: APP_NAME,
            version: VERSION,
            description: env!("CARGO_PKG_DESCRIPTION"),
        }
    }
}

impl fmt::Display for VersionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.app_name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let detail = VersionDetail::current();
        assert_eq!(detail.to_string(), format!("opentracer {VERSION}"));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(VersionDetail::current()).unwrap();
        assert_eq!(json["app_name"], "opentracer");
        assert_eq!(json["version"], VERSION);
    }
}
