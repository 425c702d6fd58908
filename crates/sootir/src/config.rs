//! Lifter configuration (lifter.toml)
//!
//! Everything here is checked before any translation work starts; a bad
//! setting surfaces as a [`ParameterError`].

use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Separator between classpath entries on this platform
pub const CLASSPATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// IR dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IrFormat {
    /// SSA form, with phi constructs at merge points
    #[default]
    Shimple,
    /// Plain three-address form
    Jimple,
}

impl IrFormat {
    pub const ALLOWED: &'static [&'static str] = &["shimple", "jimple"];

    pub fn as_str(&self) -> &'static str {
        match self {
            IrFormat::Shimple => "shimple",
            IrFormat::Jimple => "jimple",
        }
    }

    pub fn is_ssa(&self) -> bool {
        matches!(self, IrFormat::Shimple)
    }
}

impl std::str::FromStr for IrFormat {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shimple" => Ok(IrFormat::Shimple),
            "jimple" => Ok(IrFormat::Jimple),
            _ => Err(ParameterError::UnsupportedIrFormat {
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl TryFrom<String> for IrFormat {
    type Error = ParameterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IrFormat> for String {
    fn from(format: IrFormat) -> Self {
        format.as_str().to_string()
    }
}

impl std::fmt::Display for IrFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of program archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InputFormat {
    #[default]
    Jar,
    Apk,
}

impl InputFormat {
    pub const ALLOWED: &'static [&'static str] = &["jar", "apk"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Jar => "jar",
            InputFormat::Apk => "apk",
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jar" => Ok(InputFormat::Jar),
            "apk" => Ok(InputFormat::Apk),
            _ => Err(ParameterError::UnsupportedInputFormat {
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl TryFrom<String> for InputFormat {
    type Error = ParameterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InputFormat> for String {
    fn from(format: InputFormat) -> Self {
        format.as_str().to_string()
    }
}

/// Lifter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifterConfig {
    /// Program archive the engine was run on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<PathBuf>,

    pub input_format: InputFormat,

    pub ir_format: IrFormat,

    /// Library jars for the classpath (jar input only)
    pub additional_jars: Vec<PathBuf>,

    /// Directories whose `*.jar` files join the classpath (jar input only)
    pub additional_jar_roots: Vec<PathBuf>,

    /// Android platforms directory (apk input only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_sdk: Option<PathBuf>,

    /// Where to write the lifted classes as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_to_file: Option<PathBuf>,
}

impl LifterConfig {
    /// Parse a configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ParameterError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParameterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ParameterError> {
        let config: LifterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self.input_format {
            InputFormat::Jar => {
                if self.android_sdk.is_some() {
                    warn!("when input_format is 'jar', setting android_sdk is pointless");
                }
                let bad_jars: Vec<PathBuf> = self
                    .library_jars()?
                    .into_iter()
                    .filter(|jar| jar.to_string_lossy().contains(CLASSPATH_SEPARATOR))
                    .collect();
                if !bad_jars.is_empty() {
                    return Err(ParameterError::SeparatorInJarPath {
                        separator: CLASSPATH_SEPARATOR,
                        paths: bad_jars,
                    });
                }
            }
            InputFormat::Apk => {
                if self.android_sdk.is_none() {
                    return Err(ParameterError::MissingAndroidSdk);
                }
                if !self.additional_jars.is_empty() || !self.additional_jar_roots.is_empty() {
                    warn!(
                        "when input_format is 'apk', setting additional_jars or additional_jar_roots is pointless"
                    );
                }
            }
        }
        Ok(())
    }

    /// Additional jars plus every `*.jar` directly inside the jar roots,
    /// deduplicated and sorted
    pub fn library_jars(&self) -> Result<Vec<PathBuf>, ParameterError> {
        let mut jars: BTreeSet<PathBuf> = self.additional_jars.iter().cloned().collect();
        for root in &self.additional_jar_roots {
            let entries = std::fs::read_dir(root).map_err(|source| ParameterError::Read {
                path: root.clone(),
                source,
            })?;
            for entry in entries {
                let entry = entry.map_err(|source| ParameterError::Read {
                    path: root.clone(),
                    source,
                })?;
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "jar") {
                    jars.insert(path);
                }
            }
        }
        Ok(jars.into_iter().collect())
    }

    /// Library jars joined with the platform separator
    pub fn classpath(&self) -> Result<String, ParameterError> {
        let jars = self.library_jars()?;
        Ok(jars
            .iter()
            .map(|jar| jar.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(&CLASSPATH_SEPARATOR.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LifterConfig::from_str("").unwrap();
        assert_eq!(config.ir_format, IrFormat::Shimple);
        assert_eq!(config.input_format, InputFormat::Jar);
        assert!(config.ir_format.is_ssa());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
input_file = "app.jar"
ir_format = "jimple"
additional_jars = ["lib/a.jar"]
"#;
        let config = LifterConfig::from_str(toml).unwrap();
        assert_eq!(config.ir_format, IrFormat::Jimple);
        assert_eq!(config.input_file, Some(PathBuf::from("app.jar")));
        assert_eq!(config.library_jars().unwrap(), vec![PathBuf::from("lib/a.jar")]);
    }

    #[test]
    fn test_unsupported_formats() {
        let err = "dalvik".parse::<IrFormat>().unwrap_err();
        assert!(matches!(err, ParameterError::UnsupportedIrFormat { .. }));
        assert!(err.to_string().contains("shimple"));

        let err = "war".parse::<InputFormat>().unwrap_err();
        assert!(matches!(err, ParameterError::UnsupportedInputFormat { .. }));

        let err = LifterConfig::from_str("ir_format = \"baf\"").unwrap_err();
        assert!(err.to_string().contains("jimple"));
    }

    #[test]
    fn test_apk_requires_sdk() {
        let err = LifterConfig::from_str("input_format = \"apk\"").unwrap_err();
        assert!(matches!(err, ParameterError::MissingAndroidSdk));

        let config = LifterConfig::from_str(
            "input_format = \"apk\"\nandroid_sdk = \"/opt/android/platforms\"",
        )
        .unwrap();
        assert_eq!(config.input_format, InputFormat::Apk);
    }

    #[test]
    fn test_separator_in_jar_path() {
        let config = LifterConfig {
            additional_jars: vec![PathBuf::from(format!("lib{}x.jar", CLASSPATH_SEPARATOR))],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ParameterError::SeparatorInJarPath { .. }));
    }

    #[test]
    fn test_jar_roots_are_scanned() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.jar"), b"").unwrap();
        std::fs::write(dir.path().join("a.jar"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let config = LifterConfig {
            additional_jars: vec![dir.path().join("a.jar")],
            additional_jar_roots: vec![dir.path().to_path_buf()],
            ..Default::default()
        };
        let jars = config.library_jars().unwrap();
        assert_eq!(jars, vec![dir.path().join("a.jar"), dir.path().join("b.jar")]);

        let classpath = config.classpath().unwrap();
        assert_eq!(classpath.matches(CLASSPATH_SEPARATOR).count() + 1, 2);
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lifter.toml");
        std::fs::write(&path, "ir_format = \"jimple\"\n").unwrap();
        let config = LifterConfig::from_file(&path).unwrap();
        assert_eq!(config.ir_format, IrFormat::Jimple);

        let err = LifterConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ParameterError::Read { .. }));
    }
}
