use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use crate::{
    foundation::error::{EditError, EditResult},
    media::info::{MediaInfoProvider, probe_all},
    model::clip::{ClipSource, MediaKind, MediaRef},
    model::sequence::Sequence,
};

/// Newest project format this build reads and the one it writes.
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// Persisted editing project: media bin plus one sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    /// Format version the file was written with.
    pub format_version: u32,
    /// Display name.
    pub name: String,
    /// Imported media.
    #[serde(default)]
    pub bin: Vec<MediaRef>,
    /// The edited sequence.
    pub sequence: Sequence,
}

/// Problems found while loading that did not stop the load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Media paths that could not be found. Clips using them are placeholders.
    pub missing: Vec<String>,
    /// Deferred warnings, [`EditError::SourceMissing`] first.
    pub warnings: Vec<EditError>,
}

impl LoadReport {
    /// `true` when the load produced no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl Project {
    /// Project holding `sequence` and an empty bin.
    pub fn new(name: impl Into<String>, sequence: Sequence) -> Self {
        Self {
            format_version: PROJECT_FORMAT_VERSION,
            name: name.into(),
            bin: Vec::new(),
            sequence,
        }
    }

    /// Parse and validate a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> EditResult<Self> {
        let mut project: Project = serde_json::from_reader(r)
            .map_err(|e| EditError::serde(format!("parse project JSON: {e}")))?;
        if project.format_version > PROJECT_FORMAT_VERSION {
            return Err(EditError::validation(format!(
                "project format {} is newer than supported format {PROJECT_FORMAT_VERSION}",
                project.format_version
            )));
        }
        project.sequence.validate()?;
        project.sequence.reseed_ids();
        Ok(project)
    }

    /// Parse and validate a project file without touching the media it references.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditError::validation(format!("open project '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Load a project file and check its media with `provider`.
    ///
    /// Absent media does not fail the load: clips keep their in/out points, the media is
    /// flagged as missing and a [`EditError::SourceMissing`] warning is added to the report.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(
        path: impl AsRef<Path>,
        provider: &dyn MediaInfoProvider,
    ) -> EditResult<(Self, LoadReport)> {
        let mut project = Self::from_path(path)?;
        let report = project.resolve_media(provider);
        if !report.missing.is_empty() {
            tracing::warn!(count = report.missing.len(), "project references missing media");
        }
        Ok((project, report))
    }

    /// Probe every referenced media file, flag missing ones and fill unknown lengths.
    pub fn resolve_media(&mut self, provider: &dyn MediaInfoProvider) -> LoadReport {
        let paths: Vec<String> = self
            .media_refs()
            .filter(|m| m.kind != MediaKind::Pattern)
            .map(|m| m.path.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut report = LoadReport::default();
        let mut lengths = BTreeMap::new();
        let mut other_warnings = Vec::new();
        for (path, result) in probe_all(provider, &paths) {
            match result {
                Ok(info) => {
                    if let Some(len) = info.length {
                        lengths.insert(path, len);
                    }
                }
                Err(e @ EditError::SourceMissing { .. }) => {
                    report.missing.push(path);
                    report.warnings.push(e);
                }
                Err(e) => {
                    tracing::debug!(path = %path, error = %e, "media probe failed");
                    other_warnings.push(e);
                }
            }
        }
        report.warnings.extend(other_warnings);

        let missing: BTreeSet<&str> = report.missing.iter().map(String::as_str).collect();
        for m in self.media_refs_mut() {
            m.missing = missing.contains(m.path.as_str());
            if m.length.is_none()
                && !m.kind.is_synthetic()
                && let Some(len) = lengths.get(&m.path)
            {
                m.length = Some(*len);
            }
        }
        report
    }

    fn media_refs(&self) -> impl Iterator<Item = &MediaRef> {
        let clips = self
            .sequence
            .tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .filter_map(|c| c.media());
        self.bin.iter().chain(clips)
    }

    fn media_refs_mut(&mut self) -> impl Iterator<Item = &mut MediaRef> {
        let clips = self
            .sequence
            .tracks
            .iter_mut()
            .flat_map(|t| t.clips.iter_mut())
            .filter_map(|c| match &mut c.source {
                ClipSource::Media(m) => Some(m),
                ClipSource::Blank => None,
            });
        self.bin.iter_mut().chain(clips)
    }

    /// Serialize as pretty JSON.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> EditResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| EditError::serde(format!("write project JSON: {e}")))
    }

    /// Write the project to `path`, creating parent directories.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> EditResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(path)?);
        self.to_writer(&mut w)?;
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/file.rs"]
mod tests;
