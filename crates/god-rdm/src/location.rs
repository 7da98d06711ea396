//! On-disk layout of per-subject RDM files

use crate::error::Result;
use crate::matrix::{load_path, Rdm};
use std::path::{Path, PathBuf};

/// Subject, session and region of interest selecting one RDM file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdmLocation {
    root: PathBuf,
    subject: String,
    session: String,
    roi: String,
}

impl RdmLocation {
    /// Create location under `root`
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        subject: impl Into<String>,
        session: impl Into<String>,
        roi: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            subject: subject.into(),
            session: session.into(),
            roi: roi.into(),
        }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/sub-<sub>/pilab/sess_<sess>/sub-<sub>_mask_<roi>.csv`
    #[must_use]
    pub fn path(&self) -> PathBuf {
        let sub = &self.subject;
        self.root
            .join(format!("sub-{sub}"))
            .join("pilab")
            .join(format!("sess_{}", self.session))
            .join(format!("sub-{sub}_mask_{}.csv", self.roi))
    }

    /// Load and validate the RDM at [`path`](Self::path)
    ///
    /// # Errors
    /// See [`load_path`]
    pub fn load(&self) -> Result<Rdm> {
        load_path(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_layout() {
        let loc = RdmLocation::new("/data/rdms", "01", "perceptionTest", "V1");
        assert_eq!(
            loc.path(),
            PathBuf::from("/data/rdms/sub-01/pilab/sess_perceptionTest/sub-01_mask_V1.csv")
        );
    }
}
