//! Member lookup inside synset archives

use crate::error::{ArchiveError, ArchiveResult};
use crate::raw_image::RawImage;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info_span, Span};

/// Reads single members out of tar archives
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    span: Span,
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveExtractor {
    /// Create extractor
    #[must_use]
    pub fn new() -> Self {
        Self {
            span: info_span!("extractor"),
        }
    }

    /// Raw bytes of `member`
    ///
    /// Entries are matched on their path with any leading `./` removed.
    ///
    /// # Errors
    /// - [`ArchiveError::Io`] if the archive cannot be opened
    /// - [`ArchiveError::Corrupt`] if the tar stream is malformed
    /// - [`ArchiveError::MemberNotFound`] if no entry has that name
    pub fn read_member(&self, archive: &Path, member: &str) -> ArchiveResult<Vec<u8>> {
        let _guard = self.span.enter();
        let file = File::open(archive).map_err(|e| ArchiveError::io_error(archive, e))?;
        let mut tar = tar::Archive::new(BufReader::new(file));
        let entries = tar.entries().map_err(|e| ArchiveError::corrupt(archive, e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| ArchiveError::corrupt(archive, e))?;
            let matches = {
                let path = entry.path().map_err(|e| ArchiveError::corrupt(archive, e))?;
                member_matches(&path, member)
            };
            if !matches {
                continue;
            }
            let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| ArchiveError::corrupt(archive, e))?;
            debug!(member, bytes = bytes.len(), "member extracted");
            return Ok(bytes);
        }

        Err(ArchiveError::MemberNotFound {
            archive: archive.to_path_buf(),
            member: member.to_string(),
        })
    }

    /// Decode `member` as a grayscale image
    ///
    /// # Errors
    /// As [`read_member`](Self::read_member), plus [`ArchiveError::Decode`]
    /// if the bytes are not a supported image.
    pub fn extract_image(&self, archive: &Path, member: &str) -> ArchiveResult<RawImage> {
        let bytes = self.read_member(archive, member)?;
        RawImage::decode(&bytes).map_err(|source| ArchiveError::Decode {
            member: member.to_string(),
            source,
        })
    }
}

fn member_matches(path: &Path, member: &str) -> bool {
    path.strip_prefix(".").unwrap_or(path) == Path::new(member)
}
