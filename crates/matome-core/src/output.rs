//! Tabular script output

use crate::{Result, ScriptLine};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output file format for the script table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            OutputFormat::Csv => b',',
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Default output path: `output/comments_<YYYYMMDD_HHMMSS>.<ext>` relative
/// to the working directory.
pub fn default_output_path(format: OutputFormat) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from("output").join(format!("comments_{}.{}", timestamp, format.extension()))
}

/// Write script lines as a delimited table with a localized header row.
///
/// Parent directories are created as needed. Output is UTF-8 with `\n` row
/// terminators; fields containing the delimiter are quoted by the writer.
pub fn write_script(path: &Path, lines: &[ScriptLine], format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record(["発言者", "セリフ"])?;
    for line in lines {
        writer.write_record([&line.speaker, &line.text])?;
    }
    writer.flush()?;

    info!("Saved script: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<ScriptLine> {
        vec![
            ScriptLine {
                speaker: "太郎".to_string(),
                text: "こんにちは。".to_string(),
            },
            ScriptLine {
                speaker: "匿名".to_string(),
                text: "それな。".to_string(),
            },
        ]
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("tsv".parse::<OutputFormat>().unwrap(), OutputFormat::Tsv);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_default_path_shape() {
        let path = default_output_path(OutputFormat::Csv);
        assert!(path.starts_with("output"));
        assert_eq!(path.extension().unwrap(), "csv");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("comments_"));
    }

    #[test]
    fn test_write_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.tsv");
        write_script(&path, &lines(), OutputFormat::Tsv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("発言者\tセリフ\n"));
        assert!(content.contains("太郎\tこんにちは。\n"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.csv");
        write_script(&path, &lines(), OutputFormat::Csv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("発言者,セリフ\n"));
        assert!(content.contains("匿名,それな。\n"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/script.tsv");
        write_script(&path, &lines(), OutputFormat::Tsv).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_field_with_delimiter_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.csv");
        let lines = vec![ScriptLine {
            speaker: "a,b".to_string(),
            text: "x".to_string(),
        }];
        write_script(&path, &lines, OutputFormat::Csv).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"a,b\",x\n"));
    }
}
