use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::{
    config::OutputConfig,
    error::{PipelineError, Result},
    resubmit::PipelineRun,
};
use tracing::info;

/// Where a run's results end up
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub candidates: PathBuf,
    pub rejected: PathBuf,
    pub summary: PathBuf,
}

/// Writes run results as pretty-printed JSON files
pub struct ResultWriter {
    paths: OutputPaths,
}

impl ResultWriter {
    pub fn new(paths: OutputPaths) -> Self {
        Self { paths }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(OutputPaths {
            candidates: output.dir.join(&output.candidates_file),
            rejected: output.dir.join(&output.rejected_file),
            summary: output.dir.join(&output.summary_file),
        })
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Save candidates, rejected records and the summary
    ///
    /// Every file is staged as a `.tmp` sibling and renamed into place only
    /// once all three were written. A failure while staging leaves the
    /// destinations untouched. A failed rename can leave earlier files already
    /// replaced. Staged files are removed on every error path.
    pub fn save(&self, run: &PipelineRun) -> Result<()> {
        let mut staged = Vec::with_capacity(3);

        let outcome = (|| -> Result<()> {
            staged.push((stage(&self.paths.candidates, &run.candidates)?, &self.paths.candidates));
            staged.push((stage(&self.paths.rejected, &run.rejected)?, &self.paths.rejected));
            staged.push((stage(&self.paths.summary, &run.summary)?, &self.paths.summary));
            Ok(())
        })();

        if let Err(e) = outcome {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            return Err(e);
        }

        for (i, (tmp, dest)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, dest) {
                for (leftover, _) in &staged[i..] {
                    let _ = fs::remove_file(leftover);
                }
                return Err(PipelineError::io(*dest, e));
            }
        }

        info!(
            "Results saved: {}, {}, {}",
            self.paths.candidates.display(),
            self.paths.rejected.display(),
            self.paths.summary.display()
        );
        Ok(())
    }
}

/// Write `value` to a `.tmp` sibling of `dest`
fn stage<T: Serialize + ?Sized>(dest: &Path, value: &T) -> Result<PathBuf> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let json = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, json).map_err(|e| PipelineError::io(&tmp, e))?;
    Ok(tmp)
}
