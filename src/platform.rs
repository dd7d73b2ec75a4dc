use crate::types::*;

/// Host platform in the naming most release artifacts use (`linux`,
/// `darwin`, `windows` / `amd64`, `arm64`, `386`).
pub fn get_system_info() -> PlatformInfo {
    PlatformInfo::new(std::env::consts::OS, std::env::consts::ARCH)
}

impl PlatformInfo {
    pub fn new(os: &str, arch: &str) -> Self {
        let normalized_os = match os {
            "macos" => "darwin",
            other => other,
        };

        let normalized_arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };

        PlatformInfo {
            os: normalized_os.to_string(),
            arch: normalized_arch.to_string(),
        }
    }

    /// Returns the `(platform, arch)` pair to substitute into templates. Both
    /// levels of `overrides` must hit, otherwise the host values are used.
    pub fn resolve<'a>(&'a self, overrides: &'a PlatformOverrides) -> (&'a str, &'a str) {
        match overrides
            .get(&self.os)
            .and_then(|by_arch| by_arch.get(&self.arch))
        {
            Some([platform, arch]) => {
                tracing::trace!(
                    "Platform override {}/{} -> {}/{}",
                    self.os,
                    self.arch,
                    platform,
                    arch
                );
                (platform.as_str(), arch.as_str())
            }
            None => (self.os.as_str(), self.arch.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides() -> PlatformOverrides {
        let mut by_arch = HashMap::new();
        by_arch.insert(
            "amd64".to_string(),
            ["Linux".to_string(), "x86_64".to_string()],
        );
        let mut overrides = HashMap::new();
        overrides.insert("linux".to_string(), by_arch);
        overrides
    }

    #[test]
    fn test_normalizes_rust_names() {
        assert_eq!(
            PlatformInfo::new("macos", "aarch64"),
            PlatformInfo {
                os: "darwin".to_string(),
                arch: "arm64".to_string()
            }
        );
        assert_eq!(PlatformInfo::new("linux", "x86_64").arch, "amd64");
        assert_eq!(PlatformInfo::new("windows", "x86").arch, "386");
        assert_eq!(PlatformInfo::new("freebsd", "riscv64").arch, "riscv64");
    }

    #[test]
    fn test_resolve_applies_override() {
        let platform = PlatformInfo::new("linux", "x86_64");
        assert_eq!(platform.resolve(&overrides()), ("Linux", "x86_64"));
    }

    #[test]
    fn test_resolve_falls_back_when_arch_missing() {
        let platform = PlatformInfo::new("linux", "aarch64");
        assert_eq!(platform.resolve(&overrides()), ("linux", "arm64"));
    }

    #[test]
    fn test_resolve_falls_back_when_os_missing() {
        let platform = PlatformInfo::new("macos", "x86_64");
        assert_eq!(platform.resolve(&overrides()), ("darwin", "amd64"));
    }
}
