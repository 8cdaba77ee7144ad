use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use chrono::format::{Parsed, StrftimeItems};
use std::path::{Path, PathBuf};

const XML_EXTENSION: &str = "xml";
const XSD_EXTENSION: &str = "xsd";

/// The inputs of one batch: ordered document files and the schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesInfo {
    pub xml_files: Vec<PathBuf>,
    pub xsd_file: PathBuf,
}

/// Lists `dir` and picks exactly one schema and between `min_files` and
/// `max_files` documents, ordered by file name.
///
/// Artifacts of earlier batches are not documents and are skipped. A file is an
/// artifact only if its name is the base name, a timestamp in the configured
/// format and the output extension.
pub async fn resolve_files(dir: &Path, config: &EngineConfig) -> Result<FilesInfo> {
    let metadata = tokio::fs::metadata(dir).await.map_err(|e| {
        EngineError::FileSetError(format!("Directory {} is not readable: {e}", dir.display()))
    })?;
    if !metadata.is_dir() {
        return Err(EngineError::FileSetError(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut xml_files = Vec::new();
    let mut xsd_files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if has_extension(&path, XSD_EXTENSION) {
            xsd_files.push(path);
        } else if has_extension(&path, XML_EXTENSION) {
            if is_artifact(&name, config) {
                tracing::debug!(file = %name, "skipping earlier merge artifact");
                continue;
            }
            xml_files.push(path);
        }
    }

    if xsd_files.len() != 1 {
        return Err(EngineError::FileSetError(
            "There are not exactly 1 xsd files".to_string(),
        ));
    }
    if xml_files.len() > config.max_files {
        return Err(EngineError::FileSetError(format!(
            "There are more than {} xml files, or the files are missing",
            config.max_files
        )));
    }
    if xml_files.len() < config.min_files {
        return Err(EngineError::FileSetError(format!(
            "There are fewer than {} xml files, or the files are missing",
            config.min_files
        )));
    }

    xml_files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    let xsd_file = xsd_files.remove(0);
    Ok(FilesInfo {
        xml_files,
        xsd_file,
    })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn is_artifact(name: &str, config: &EngineConfig) -> bool {
    let Some(stamp) = name
        .strip_prefix(config.output_base_name.as_str())
        .and_then(|rest| rest.strip_suffix(config.output_extension.as_str()))
    else {
        return false;
    };
    let mut parsed = Parsed::new();
    chrono::format::parse(
        &mut parsed,
        stamp,
        StrftimeItems::new(&config.output_timestamp_format),
    )
    .is_ok()
}
