//! Release version decomposition for the `version_info` metric.

/// Label values exported by `version_info`.
///
/// Segments missing from the version string default to `"0"`; extra segments
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl VersionInfo {
    #[must_use]
    pub fn parse(version: &str) -> Self {
        let mut segments = version.split('.');
        let mut next = || {
            segments
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("0")
                .to_owned()
        };
        let major = next();
        let minor = next();
        let patch = next();

        Self {
            version: format!("v{version}"),
            major,
            minor,
            patch,
        }
    }

    /// Label values in `version, major, minor, patch` order.
    #[must_use]
    pub fn label_values(&self) -> [&str; 4] {
        [&self.version, &self.major, &self.minor, &self.patch]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_version_splits_into_labels() {
        let info = VersionInfo::parse("1.4.2");
        assert_eq!(info.label_values(), ["v1.4.2", "1", "4", "2"]);
    }

    #[test]
    fn missing_segments_default_to_zero() {
        let info = VersionInfo::parse("3");
        assert_eq!(info.label_values(), ["v3", "3", "0", "0"]);

        let info = VersionInfo::parse("2.1");
        assert_eq!(info.patch, "0");
    }

    #[test]
    fn empty_version_is_all_zero() {
        let info = VersionInfo::parse("");
        assert_eq!(info.label_values(), ["v", "0", "0", "0"]);
    }
}
