//! Dependency instances

use crate::config::DependencyType;
use crate::specifier::Specifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the dependency type describing a package's own name and version
pub const LOCAL_TYPE: &str = "local";

/// Index of an instance within the run's instance list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub usize);

/// One dependency reference inside one package.json file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Position in the run's instance list
    pub id: InstanceId,
    /// Dependency name
    pub name: String,
    /// Parsed version, carrying the raw value as written
    pub specifier: Specifier,
    /// Name of the package whose file declares this dependency
    pub package_name: String,
    /// Index of the owning file in the run's file list
    pub file: usize,
    /// Where and how the value is stored
    pub dependency_type: DependencyType,
}

impl Instance {
    /// The version string as currently written
    pub fn raw(&self) -> &str {
        self.specifier.raw()
    }

    /// Returns true if this is a package's own version rather than a dependency
    pub fn is_local(&self) -> bool {
        self.dependency_type.name == LOCAL_TYPE
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} in {} [{}]",
            self.name,
            self.specifier,
            self.package_name,
            self.dependency_type.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Strategy;

    fn instance(type_name: &str, strategy: Strategy, path: &str) -> Instance {
        Instance {
            id: InstanceId(0),
            name: "react".to_string(),
            specifier: Specifier::parse("^18.2.0"),
            package_name: "app".to_string(),
            file: 0,
            dependency_type: DependencyType::new(type_name, strategy, path),
        }
    }

    #[test]
    fn test_raw() {
        let inst = instance("prod", Strategy::VersionsByName, "dependencies");
        assert_eq!(inst.raw(), "^18.2.0");
    }

    #[test]
    fn test_is_local() {
        assert!(instance(LOCAL_TYPE, Strategy::NameTildeVersion, "version").is_local());
        assert!(!instance("dev", Strategy::VersionsByName, "devDependencies").is_local());
    }

    #[test]
    fn test_display() {
        let inst = instance("dev", Strategy::VersionsByName, "devDependencies");
        assert_eq!(format!("{}", inst), "react@^18.2.0 in app [dev]");
    }
}
