use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_FILE: &str = "[Lambda] Labs Web Final Template";
pub const DEFAULT_FOLDER: &str = "John Wick 3";
pub const DEFAULT_SECRETS: &str = "credentials.json";
pub const DEFAULT_TOKEN: &str = "token.json";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

#[derive(Debug, Default, Parser)]
#[command(name = "drive-template")]
#[command(about = "Copy a Google Drive file into a freshly created folder")]
pub struct Cli {
    /// Name of the file to duplicate
    #[arg(short, long)]
    pub file: Option<String>,

    /// Name of the folder to create and move the copy into
    #[arg(short = 'd', long)]
    pub folder: Option<String>,

    /// Only make the copy, leave it where Drive puts it
    #[arg(long)]
    pub no_move: bool,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OAuth client secrets downloaded from the Google Cloud console
    #[arg(long)]
    pub secrets: Option<PathBuf>,

    /// Where the credential is cached between runs
    #[arg(long)]
    pub token: Option<PathBuf>,

    /// OAuth scopes to request
    #[arg(long = "scope", num_args = 1..)]
    pub scopes: Vec<String>,
}

/// Optional on-disk configuration; anything set here loses to the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub file: Option<String>,
    pub folder: Option<String>,
    pub move_to_folder: Option<bool>,
    pub secrets: Option<PathBuf>,
    pub token: Option<PathBuf>,
    pub scopes: Option<Vec<String>>,
}

impl FileConfig {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).map_err(anyhow::Error::new)
    }

    /// Reads `path`. A missing file is only an error when `required` is set.
    pub async fn load(path: &Path, required: bool) -> anyhow::Result<Option<Self>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Could not read config `{}`", path.display()))
            }
        };

        Self::parse(&raw)
            .with_context(|| format!("Invalid config `{}`", path.display()))
            .map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub file: String,
    pub folder: String,
    pub move_to_folder: bool,
    pub secrets: PathBuf,
    pub token: PathBuf,
    pub scopes: Vec<String>,
}

impl Settings {
    pub async fn load(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(p) => FileConfig::load(p, true).await?,
            None => match default_config_path() {
                Some(p) => FileConfig::load(&p, false).await?,
                None => None,
            },
        };

        Ok(Self::merge(cli, file.unwrap_or_default()))
    }

    pub fn merge(cli: Cli, file: FileConfig) -> Self {
        let scopes = match cli.scopes.is_empty() {
            false => cli.scopes,
            true => file.scopes.unwrap_or_else(|| vec![DRIVE_SCOPE.into()]),
        };

        Self {
            file: cli.file.or(file.file).unwrap_or_else(|| DEFAULT_FILE.into()),
            folder: cli
                .folder
                .or(file.folder)
                .unwrap_or_else(|| DEFAULT_FOLDER.into()),
            move_to_folder: !cli.no_move && file.move_to_folder.unwrap_or(true),
            secrets: cli
                .secrets
                .or(file.secrets)
                .unwrap_or_else(|| DEFAULT_SECRETS.into()),
            token: cli.token.or(file.token).unwrap_or_else(|| DEFAULT_TOKEN.into()),
            scopes,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("drive-template").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::merge(Cli::default(), FileConfig::default());
        assert_eq!(s.file, DEFAULT_FILE);
        assert_eq!(s.folder, DEFAULT_FOLDER);
        assert!(s.move_to_folder);
        assert_eq!(s.secrets, PathBuf::from("credentials.json"));
        assert_eq!(s.token, PathBuf::from("token.json"));
        assert_eq!(s.scopes, vec![DRIVE_SCOPE.to_string()]);
    }

    #[test]
    fn test_file_overrides_defaults() -> anyhow::Result<()> {
        let file = FileConfig::parse(
            r#"
            file = "Report"
            move_to_folder = false
            token = "/tmp/token.json"
            scopes = ["https://www.googleapis.com/auth/drive.file"]
            "#,
        )?;

        let s = Settings::merge(Cli::default(), file);
        assert_eq!(s.file, "Report");
        assert_eq!(s.folder, DEFAULT_FOLDER);
        assert!(!s.move_to_folder);
        assert_eq!(s.token, PathBuf::from("/tmp/token.json"));
        assert_eq!(s.scopes, vec!["https://www.googleapis.com/auth/drive.file".to_string()]);
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "drive-template",
            "--file",
            "Template",
            "-d",
            "Dest",
            "--no-move",
            "--scope",
            "a",
            "b",
        ])?;
        let file = FileConfig::parse("file = \"Report\"\nfolder = \"Archive\"\nmove_to_folder = true")?;

        let s = Settings::merge(cli, file);
        assert_eq!(s.file, "Template");
        assert_eq!(s.folder, "Dest");
        assert!(!s.move_to_folder);
        assert_eq!(s.scopes, vec!["a".to_string(), "b".to_string()]);
        Ok(())
    }

    #[test]
    fn test_unknown_key() {
        assert!(FileConfig::parse("fodler = \"x\"").is_err());
    }

    #[tokio::test]
    async fn test_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");

        assert!(FileConfig::load(&path, false).await?.is_none());
        assert!(FileConfig::load(&path, true).await.is_err());

        tokio::fs::write(&path, "folder = \"Dest\"").await?;
        let cli = Cli {
            config: Some(path),
            ..Default::default()
        };
        assert_eq!(Settings::load(cli).await?.folder, "Dest");
        Ok(())
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
