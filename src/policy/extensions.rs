//! Suffix classification for loadable files.

use serde::{Deserialize, Serialize};

use super::PolicyError;

/// What a recognised file is loaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Imported through a [`CodeImporter`](crate::module::CodeImporter).
    Code,
    /// Read and parsed through a [`DataReader`](crate::module::DataReader).
    Data,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
            Self::Data => write!(f, "data"),
        }
    }
}

impl FileKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "code" => Some(Self::Code),
            "data" => Some(Self::Data),
            _ => None,
        }
    }
}

/// Result of a successful [`ExtensionPolicy::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Literal suffix including the leading dot.
    pub ext: String,
    pub kind: FileKind,
}

/// Immutable table of recognised suffixes per [`FileKind`].
///
/// A suffix belongs to at most one kind; [`ExtensionPolicy::new`] rejects
/// tables that break this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    rules: Vec<(FileKind, Vec<String>)>,
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExtensionPolicy {
    /// The stock table: `.js`, `.mjs`, `.cjs` as code and `.json` as data.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                (
                    FileKind::Code,
                    vec![".js".into(), ".mjs".into(), ".cjs".into()],
                ),
                (FileKind::Data, vec![".json".into()]),
            ],
        }
    }

    pub fn new<I, S>(rules: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (FileKind, Vec<S>)>,
        S: Into<String>,
    {
        let mut merged: Vec<(FileKind, Vec<String>)> = Vec::new();
        let mut seen: Vec<(String, FileKind)> = Vec::new();

        for (kind, suffixes) in rules {
            for suffix in suffixes {
                let suffix = suffix.into();
                if suffix.len() < 2 || !suffix.starts_with('.') {
                    return Err(PolicyError::InvalidSuffix { ext: suffix });
                }
                if let Some((_, first)) = seen.iter().find(|(s, _)| *s == suffix) {
                    return Err(PolicyError::DuplicateSuffix {
                        ext: suffix,
                        first: *first,
                        second: kind,
                    });
                }
                seen.push((suffix.clone(), kind));

                match merged.iter_mut().find(|(k, _)| *k == kind) {
                    Some((_, list)) => list.push(suffix),
                    None => merged.push((kind, vec![suffix])),
                }
            }
        }

        Ok(Self { rules: merged })
    }

    /// Classifies `filename` by the text after its last `.`.
    ///
    /// Only the final path segment is inspected, so `plugins/a.plugin.js`
    /// classifies as `.js`. Matching is case-sensitive.
    pub fn classify(&self, filename: &str) -> crate::Result<Classified> {
        let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

        let Some(dot) = name.rfind('.') else {
            return Err(crate::Error::NoExtension {
                file: filename.to_string(),
            });
        };
        let ext = &name[dot..];

        for (kind, suffixes) in &self.rules {
            if suffixes.iter().any(|s| s == ext) {
                return Ok(Classified {
                    ext: ext.to_string(),
                    kind: *kind,
                });
            }
        }

        Err(crate::Error::UnsupportedExtension {
            ext: ext.to_string(),
            supported: self.supported().join(", "),
        })
    }

    pub fn kind_of(&self, filename: &str) -> Option<FileKind> {
        self.classify(filename).ok().map(|c| c.kind)
    }

    /// Every recognised suffix, in table order.
    pub fn supported(&self) -> Vec<&str> {
        self.rules
            .iter()
            .flat_map(|(_, list)| list.iter().map(String::as_str))
            .collect()
    }

    pub fn suffixes(&self, kind: FileKind) -> &[String] {
        self.rules
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }

    /// First suffix registered for `kind`; folder plugin sources only pick up
    /// files ending with the primary code suffix.
    pub fn primary_suffix(&self, kind: FileKind) -> Option<&str> {
        self.suffixes(kind).first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_data() {
        let policy = ExtensionPolicy::builtin();
        let c = policy.classify("settings.json").unwrap();
        assert_eq!(c.ext, ".json");
        assert_eq!(c.kind, FileKind::Data);
    }

    #[test]
    fn test_classify_code_uses_last_dot() {
        let policy = ExtensionPolicy::builtin();
        for name in ["a.js", "a.mjs", "a.cjs", "logger.plugin.js", "plugins/x.js"] {
            assert_eq!(policy.classify(name).unwrap().kind, FileKind::Code, "{name}");
        }
        assert_eq!(policy.classify("logger.plugin.js").unwrap().ext, ".js");
    }

    #[test]
    fn test_classify_no_extension() {
        let policy = ExtensionPolicy::builtin();
        assert!(matches!(
            policy.classify("Makefile"),
            Err(crate::Error::NoExtension { ref file }) if file == "Makefile"
        ));
        // a dot in a directory name does not count
        assert!(matches!(
            policy.classify("v1.2/LICENSE"),
            Err(crate::Error::NoExtension { .. })
        ));
    }

    #[test]
    fn test_classify_unsupported_lists_everything() {
        let policy = ExtensionPolicy::builtin();
        for name in ["a.ts", "a.JS", "a.yaml", "trailing."] {
            match policy.classify(name) {
                Err(err @ crate::Error::UnsupportedExtension { .. }) => {
                    let msg = err.to_string();
                    for ext in [".js", ".mjs", ".cjs", ".json"] {
                        assert!(msg.contains(ext), "{msg} missing {ext}");
                    }
                }
                other => panic!("expected UnsupportedExtension for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_custom_table() {
        let policy =
            ExtensionPolicy::new([(FileKind::Code, vec![".lua"]), (FileKind::Data, vec![".toml"])])
                .unwrap();
        assert_eq!(policy.kind_of("init.lua"), Some(FileKind::Code));
        assert_eq!(policy.kind_of("init.js"), None);
        assert_eq!(policy.primary_suffix(FileKind::Code), Some(".lua"));
        assert_eq!(policy.supported(), vec![".lua", ".toml"]);
    }

    #[test]
    fn test_duplicate_suffix_rejected() {
        let err =
            ExtensionPolicy::new([(FileKind::Code, vec![".js"]), (FileKind::Data, vec![".js"])])
                .unwrap_err();
        assert!(matches!(
            err,
            PolicyError::DuplicateSuffix {
                first: FileKind::Code,
                second: FileKind::Data,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_suffix_rejected() {
        assert!(ExtensionPolicy::new([(FileKind::Code, vec!["js"])]).is_err());
        assert!(ExtensionPolicy::new([(FileKind::Code, vec!["."])]).is_err());
    }

    #[test]
    fn test_file_kind_serde() {
        assert_eq!(serde_json::to_string(&FileKind::Code).unwrap(), "\"code\"");
        let parsed: FileKind = serde_json::from_str("\"data\"").unwrap();
        assert_eq!(parsed, FileKind::Data);
        assert_eq!(FileKind::from_label("code"), Some(FileKind::Code));
        assert_eq!(FileKind::from_label("jsModule"), None);
    }
}
