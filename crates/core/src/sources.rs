//! Resolution of metadata `sources` to literal file contents

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

const LIB_PREFIX: &str = "lib/";
const NODE_MODULES_DIR: &str = "node_modules";

/// A source file with its literal content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContent {
    pub content: String,
}

impl SourceContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Placeholder used when a source cannot be read from disk
    pub fn unavailable(path: &str) -> Self {
        Self::new(format!("// Content for {path} not available"))
    }
}

/// Outcome of resolving one `sources` map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSources {
    /// Every well-formed entry, keyed by its recorded path
    pub sources: BTreeMap<String, SourceContent>,
    /// Paths that ended up with the placeholder content
    pub unavailable: Vec<String>,
    /// Paths whose entry was not an object and was dropped
    pub malformed: Vec<String>,
    /// Paths read from `node_modules/` instead of `lib/`
    pub remapped: Vec<String>,
}

/// Reads source files relative to a fixed root directory
#[derive(Debug, Clone)]
pub struct SourceResolver {
    root: PathBuf,
}

impl SourceResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver rooted at the process working directory
    pub fn from_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves every entry of a metadata `sources` value
    pub fn resolve(&self, sources: Option<&Value>) -> ResolvedSources {
        let mut resolved = ResolvedSources::default();

        let Some(Value::Object(entries)) = sources else {
            return resolved;
        };

        for (path, entry) in entries {
            let Value::Object(entry) = entry else {
                resolved.malformed.push(path.clone());
                continue;
            };

            if let Some(Value::String(content)) = entry.get("content") {
                resolved
                    .sources
                    .insert(path.clone(), SourceContent::new(content.clone()));
                continue;
            }

            let content = match self.read_source(path) {
                Some((content, remapped)) => {
                    if remapped {
                        resolved.remapped.push(path.clone());
                    }
                    SourceContent::new(content)
                }
                None => {
                    resolved.unavailable.push(path.clone());
                    SourceContent::unavailable(path)
                }
            };
            resolved.sources.insert(path.clone(), content);
        }

        resolved
    }

    /// Returns the file content and whether the `node_modules/` fallback was used
    ///
    /// Bytes that are not valid UTF-8 are replaced, not treated as a failed read.
    fn read_source(&self, path: &str) -> Option<(String, bool)> {
        if let Some(content) = read_lossy(&self.root.join(path)) {
            return Some((content, false));
        }

        let rest = path.strip_prefix(LIB_PREFIX).filter(|rest| !rest.is_empty())?;
        read_lossy(&self.root.join(NODE_MODULES_DIR).join(rest)).map(|content| (content, true))
    }
}

fn read_lossy(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Resolves sources against the current working directory
pub fn resolve_sources(sources: Option<&Value>) -> ResolvedSources {
    SourceResolver::from_current_dir().resolve(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_embedded_content_passes_through() {
        let temp_dir = TempDir::new().unwrap();
        // A file on disk must not shadow embedded content
        write(temp_dir.path(), "src/Token.sol", "on disk");

        let sources = json!({
            "src/Token.sol": {"content": "contract Token {}\n", "keccak256": "0x00"},
            "src/Empty.sol": {"content": ""}
        });

        let resolved = SourceResolver::new(temp_dir.path()).resolve(Some(&sources));

        assert_eq!(resolved.sources["src/Token.sol"].content, "contract Token {}\n");
        assert_eq!(resolved.sources["src/Empty.sol"].content, "");
        assert!(resolved.unavailable.is_empty());
    }

    #[test]
    fn test_reads_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "src/Vault.sol", "contract Vault {}");
        let absolute = temp_dir.path().join("abs/Abs.sol");
        write(temp_dir.path(), "abs/Abs.sol", "contract Abs {}");
        let absolute = absolute.to_string_lossy().into_owned();

        let mut sources = json!({"src/Vault.sol": {"keccak256": "0x01", "urls": []}});
        sources[absolute.as_str()] = json!({});

        let resolved = SourceResolver::new(temp_dir.path()).resolve(Some(&sources));

        assert_eq!(resolved.sources["src/Vault.sol"].content, "contract Vault {}");
        assert_eq!(resolved.sources[&absolute].content, "contract Abs {}");
    }

    #[test]
    fn test_missing_file_gets_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let sources = json!({"src/Gone.sol": {"content": 7}});

        let resolved = SourceResolver::new(temp_dir.path()).resolve(Some(&sources));

        assert_eq!(
            resolved.sources["src/Gone.sol"].content,
            "// Content for src/Gone.sol not available"
        );
        assert_eq!(resolved.unavailable, vec!["src/Gone.sol"]);
    }

    #[test]
    fn test_lib_falls_back_to_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "node_modules/@openzeppelin/contracts/token/ERC20/ERC20.sol",
            "contract ERC20 {}",
        );

        let sources = json!({
            "lib/@openzeppelin/contracts/token/ERC20/ERC20.sol": {},
            "lib/missing/Missing.sol": {}
        });

        let resolved = SourceResolver::new(temp_dir.path()).resolve(Some(&sources));

        assert_eq!(
            resolved.sources["lib/@openzeppelin/contracts/token/ERC20/ERC20.sol"].content,
            "contract ERC20 {}"
        );
        assert_eq!(
            resolved.remapped,
            vec!["lib/@openzeppelin/contracts/token/ERC20/ERC20.sol"]
        );
        assert_eq!(
            resolved.sources["lib/missing/Missing.sol"].content,
            "// Content for lib/missing/Missing.sol not available"
        );
    }

    #[test]
    fn test_lib_path_prefers_lib_location() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "lib/forge-std/src/Test.sol", "from lib");
        write(temp_dir.path(), "node_modules/forge-std/src/Test.sol", "from node_modules");

        let sources = json!({"lib/forge-std/src/Test.sol": {}});
        let resolved = SourceResolver::new(temp_dir.path()).resolve(Some(&sources));

        assert_eq!(resolved.sources["lib/forge-std/src/Test.sol"].content, "from lib");
        assert!(resolved.remapped.is_empty());
    }

    #[test]
    fn test_non_utf8_source_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src/A.sol");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, b"// \xff\xfe\ncontract A {}").unwrap();
        fs::create_dir_all(temp_dir.path().join("lib/dep")).unwrap();
        fs::write(temp_dir.path().join("lib/dep/B.sol"), b"\xffcontract B {}").unwrap();
        write(temp_dir.path(), "node_modules/dep/B.sol", "from node_modules");

        let sources = json!({"src/A.sol": {}, "lib/dep/B.sol": {}});
        let resolved = SourceResolver::new(temp_dir.path()).resolve(Some(&sources));

        assert_eq!(
            resolved.sources["src/A.sol"].content,
            "// \u{FFFD}\u{FFFD}\ncontract A {}"
        );
        assert_eq!(resolved.sources["lib/dep/B.sol"].content, "\u{FFFD}contract B {}");
        assert!(resolved.unavailable.is_empty());
        assert!(resolved.remapped.is_empty());
    }

    #[test]
    fn test_resolve_sources_free_function() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "Abs.sol", "contract Abs {}");
        let absolute = temp_dir.path().join("Abs.sol").to_string_lossy().into_owned();

        let mut sources = json!({"src/Embedded.sol": {"content": "contract E {}"}});
        sources[absolute.as_str()] = json!({});
        let resolved = resolve_sources(Some(&sources));

        assert_eq!(resolved.sources["src/Embedded.sol"].content, "contract E {}");
        assert_eq!(resolved.sources[&absolute].content, "contract Abs {}");
        assert!(resolve_sources(None).sources.is_empty());
    }

    #[test]
    fn test_absent_or_malformed_input() {
        let resolver = SourceResolver::new("/nonexistent");

        assert!(resolver.resolve(None).sources.is_empty());
        assert!(resolver.resolve(Some(&json!(null))).sources.is_empty());
        assert!(resolver.resolve(Some(&json!(["a.sol"]))).sources.is_empty());

        let resolved = resolver.resolve(Some(&json!({
            "a.sol": "not an object",
            "b.sol": {"content": "ok"}
        })));
        assert_eq!(resolved.malformed, vec!["a.sol"]);
        assert_eq!(resolved.sources.len(), 1);
        assert_eq!(resolved.sources["b.sol"], SourceContent::new("ok"));
    }
}
