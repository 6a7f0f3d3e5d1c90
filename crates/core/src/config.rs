use crate::extractor::{ParsingOptions, TextSourceKind};
use anyhow::Context;
use providers::ProviderOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub scan: ScanPaths,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directory holding the `<year>/` folders of archived documents.
    pub root: String,
    /// Further folders whose documents are indexed, e.g. a scanner inbox.
    #[serde(default)]
    pub observed: Vec<String>,
    #[serde(default = "default_true")]
    pub slugify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: ".archiver/documents.json".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPaths {
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    #[serde(default = "default_true")]
    pub dates: bool,
    #[serde(default = "default_true")]
    pub tags: bool,
    /// Tags recognised in document text besides those already in use.
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub text_source: TextSourceKind,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            dates: true,
            tags: true,
            vocabulary: Vec::new(),
            text_source: TextSourceKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub download_command: Vec<String>,
    #[serde(default)]
    pub use_trash: bool,
    #[serde(default = "default_true")]
    pub watch: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            download_command: Vec::new(),
            use_trash: false,
            watch: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn archive_root(&self) -> PathBuf {
        PathBuf::from(&self.archive.root)
    }

    /// Every folder to index: the observed folders, then the archive.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.archive.observed.iter().map(PathBuf::from).collect();
        let archive = self.archive_root();
        if !roots.contains(&archive) {
            roots.push(archive);
        }
        roots
    }

    pub fn parsing_options(&self) -> ParsingOptions {
        ParsingOptions {
            dates: self.parsing.dates,
            tags: self.parsing.tags,
        }
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            exclude: self.scan.exclude.clone(),
            use_trash: self.providers.use_trash,
            download_command: self.providers.download_command.clone(),
        }
    }
}

/// Read `path`, or `config/default` when present, then `ARCHIVER_*`
/// environment variables (`ARCHIVER_ARCHIVE__ROOT=/srv/archive`). List
/// settings take comma-separated values
/// (`ARCHIVER_ARCHIVE__OBSERVED=/srv/inbox,/srv/scans`).
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    load_from(path, environment())
}

const LIST_KEYS: [&str; 4] = [
    "archive.observed",
    "scan.exclude",
    "parsing.vocabulary",
    "providers.download_command",
];

fn environment() -> config::Environment {
    LIST_KEYS.iter().fold(
        config::Environment::with_prefix("ARCHIVER")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    )
}

fn load_from(path: Option<&str>, env: config::Environment) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings
        .add_source(env)
        .build()
        .context("building configuration")?;
    cfg.try_deserialize().context("reading configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_gets_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("archiver.toml");
        std::fs::write(
            &file,
            "[archive]\nroot = \"/srv/archive\"\nobserved = [\"/srv/inbox\"]\n",
        )
        .unwrap();

        let cfg = load(file.to_str()).unwrap();

        assert_eq!(
            cfg.roots(),
            vec![PathBuf::from("/srv/inbox"), PathBuf::from("/srv/archive")]
        );
        assert!(cfg.archive.slugify);
        assert_eq!(cfg.cache.path, ".archiver/documents.json");
        assert_eq!(cfg.parsing_options(), ParsingOptions::ALL);
        assert_eq!(cfg.parsing.text_source, TextSourceKind::Auto);
        assert!(cfg.providers.watch);
    }

    #[test]
    fn sections_override_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("archiver.toml");
        std::fs::write(
            &file,
            r#"
[archive]
root = "/srv/archive"
slugify = false

[scan]
exclude = ["**/tmp/**"]

[parsing]
tags = false
vocabulary = ["bill", "tax"]
text_source = "sidecar"

[providers]
use_trash = true
watch = false
"#,
        )
        .unwrap();

        let cfg = load(file.to_str()).unwrap();

        assert!(!cfg.archive.slugify);
        assert_eq!(cfg.roots(), vec![PathBuf::from("/srv/archive")]);
        assert!(!cfg.parsing_options().tags);
        assert_eq!(cfg.parsing.text_source, TextSourceKind::Sidecar);
        let options = cfg.provider_options();
        assert_eq!(options.exclude, vec!["**/tmp/**".to_string()]);
        assert!(options.use_trash);
        assert!(!cfg.providers.watch);
    }

    #[test]
    fn environment_overrides_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("archiver.toml");
        std::fs::write(&file, "[archive]\nroot = \"/srv/archive\"\n").unwrap();
        let vars: config::Map<String, String> = [
            ("ARCHIVER_ARCHIVE__ROOT", "/data/archive"),
            ("ARCHIVER_ARCHIVE__OBSERVED", "/data/inbox,/data/scans"),
            ("ARCHIVER_PROVIDERS__USE_TRASH", "true"),
            ("ARCHIVER_PARSING__TEXT_SOURCE", "none"),
            ("OTHER_ARCHIVE__ROOT", "/ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let cfg = load_from(file.to_str(), environment().source(Some(vars))).unwrap();

        assert_eq!(
            cfg.roots(),
            vec![
                PathBuf::from("/data/inbox"),
                PathBuf::from("/data/scans"),
                PathBuf::from("/data/archive")
            ]
        );
        assert!(cfg.providers.use_trash);
        assert_eq!(cfg.parsing.text_source, TextSourceKind::None);
    }
}
