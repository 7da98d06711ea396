//! Length-delimited record files
//!
//! Each record is `u64 length (LE) | u32 masked crc32c(length) | data |
//! u32 masked crc32c(data)`. Files are append-only: a writer never seeks
//! back or rewrites an earlier record.

use crate::crc::masked_crc32c;
use crate::error::{RecordError, RecordResult};
use crate::example::RecordExample;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::debug;

/// Extension of record files
pub const RECORD_EXTENSION: &str = "tfrecords";

const HEADER_LEN: u64 = 12;
const FOOTER_LEN: u64 = 4;

/// Append-only destination for `(name, payload)` records
pub trait RecordSink {
    /// Append one record
    ///
    /// # Errors
    /// Returns an error if the record cannot be written; the stream may then
    /// be unusable
    fn append(&mut self, name: &str, payload: &[u8]) -> RecordResult<()>;

    /// Flush and close; further appends fail
    ///
    /// # Errors
    /// Returns an error if buffered data cannot be flushed
    fn finish(&mut self) -> RecordResult<()>;
}

/// Writes framed records to any byte stream
pub struct TfRecordWriter<W: Write> {
    inner: Option<W>,
    records: u64,
    bytes: u64,
}

impl TfRecordWriter<BufWriter<File>> {
    /// Create a new record file; refuses to overwrite
    ///
    /// # Errors
    /// - [`RecordError::AlreadyExists`] if `path` is present
    /// - [`RecordError::Io`] if the file cannot be created
    pub fn create(path: &Path) -> RecordResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => RecordError::AlreadyExists(path.to_path_buf()),
                _ => RecordError::io_error(path, e),
            })?;
        debug!(path = %path.display(), "record file created");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TfRecordWriter<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            records: 0,
            bytes: 0,
        }
    }

    /// Records written so far
    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Bytes written so far, framing included
    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Append one framed record
    ///
    /// # Errors
    /// - [`RecordError::Finished`] after [`RecordSink::finish`]
    /// - [`RecordError::Stream`] if the write fails
    pub fn write_record(&mut self, data: &[u8]) -> RecordResult<()> {
        let inner = self.inner.as_mut().ok_or(RecordError::Finished)?;
        let len = (data.len() as u64).to_le_bytes();
        inner.write_all(&len)?;
        inner.write_all(&masked_crc32c(&len).to_le_bytes())?;
        inner.write_all(data)?;
        inner.write_all(&masked_crc32c(data).to_le_bytes())?;
        self.records += 1;
        self.bytes += HEADER_LEN + data.len() as u64 + FOOTER_LEN;
        Ok(())
    }

    /// Finish and return the underlying writer
    ///
    /// # Errors
    /// [`RecordError::Finished`] if already finished, or a flush error
    pub fn into_inner(mut self) -> RecordResult<W> {
        let mut inner = self.inner.take().ok_or(RecordError::Finished)?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> RecordSink for TfRecordWriter<W> {
    fn append(&mut self, name: &str, payload: &[u8]) -> RecordResult<()> {
        self.write_record(&RecordExample::new(name, payload).to_bytes())
    }

    fn finish(&mut self) -> RecordResult<()> {
        let mut inner = self.inner.take().ok_or(RecordError::Finished)?;
        inner.flush()?;
        debug!(records = self.records, bytes = self.bytes, "record stream finished");
        Ok(())
    }
}

/// Iterates over the framed records of a byte stream
///
/// Stops after the first error.
pub struct TfRecordReader<R: Read> {
    inner: R,
    offset: u64,
    done: bool,
}

impl TfRecordReader<BufReader<File>> {
    /// Open a record file
    ///
    /// # Errors
    /// Returns [`RecordError::Io`] if the file cannot be opened
    pub fn open(path: &Path) -> RecordResult<Self> {
        let file = File::open(path).map_err(|e| RecordError::io_error(path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> TfRecordReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            done: false,
        }
    }

    /// Byte offset of the next record
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_record(&mut self) -> RecordResult<Option<Vec<u8>>> {
        let start = self.offset;
        let mut len = [0u8; 8];
        match read_full(&mut self.inner, &mut len)? {
            0 => return Ok(None),
            8 => {}
            _ => return Err(RecordError::Truncated { offset: start }),
        }
        let stored = self.read_u32(start)?;
        if stored != masked_crc32c(&len) {
            return Err(RecordError::Checksum {
                offset: start,
                part: "length",
            });
        }

        let data_len = usize::try_from(u64::from_le_bytes(len))
            .map_err(|_| RecordError::Truncated { offset: start })?;
        let mut data = Vec::new();
        let read = (&mut self.inner).take(data_len as u64).read_to_end(&mut data)?;
        if read != data_len {
            return Err(RecordError::Truncated { offset: start });
        }
        let stored = self.read_u32(start)?;
        if stored != masked_crc32c(&data) {
            return Err(RecordError::Checksum {
                offset: start,
                part: "data",
            });
        }

        self.offset = start + HEADER_LEN + data_len as u64 + FOOTER_LEN;
        Ok(Some(data))
    }

    fn read_u32(&mut self, start: u64) -> RecordResult<u32> {
        let mut buf = [0u8; 4];
        if read_full(&mut self.inner, &mut buf)? != 4 {
            return Err(RecordError::Truncated { offset: start });
        }
        Ok(u32::from_le_bytes(buf))
    }
}

impl<R: Read> Iterator for TfRecordReader<R> {
    type Item = RecordResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every [`RecordExample`] of a record file, in file order
///
/// # Errors
/// Returns [`RecordError::Io`] if the file cannot be opened; per-record
/// errors are yielded by the iterator
pub fn read_examples(path: &Path) -> RecordResult<impl Iterator<Item = RecordResult<RecordExample>>> {
    let reader = TfRecordReader::open(path)?;
    Ok(reader.map(|record| record.and_then(|data| RecordExample::from_bytes(&data))))
}

// Fills `buf` unless the stream ends first; returns the number of bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> RecordResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn framed(records: &[&[u8]]) -> Vec<u8> {
        let mut writer = TfRecordWriter::new(Vec::new());
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.into_inner().unwrap()
    }

    #[test]
    fn frame_layout() {
        let bytes = framed(&[b"abc"]);
        assert_eq!(bytes.len(), 12 + 3 + 4);
        assert_eq!(&bytes[..8], &3u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &masked_crc32c(&3u64.to_le_bytes()).to_le_bytes());
        assert_eq!(&bytes[12..15], b"abc");
        assert_eq!(&bytes[15..], &masked_crc32c(b"abc").to_le_bytes());
    }

    #[test]
    fn reader_yields_records_in_order() {
        let bytes = framed(&[b"first", b"", b"third"]);
        let records: Vec<Vec<u8>> = TfRecordReader::new(Cursor::new(bytes))
            .collect::<RecordResult<_>>()
            .unwrap();
        assert_eq!(records, vec![b"first".to_vec(), Vec::new(), b"third".to_vec()]);
    }

    #[test]
    fn corrupted_data_fails_checksum() {
        let mut bytes = framed(&[b"payload"]);
        bytes[13] ^= 0xFF;
        let mut reader = TfRecordReader::new(Cursor::new(bytes));
        assert!(matches!(
            reader.next(),
            Some(Err(RecordError::Checksum { offset: 0, part: "data" }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_stream_is_reported() {
        let bytes = framed(&[b"one", b"two"]);
        let cut = bytes.len() - 2;
        let mut reader = TfRecordReader::new(Cursor::new(&bytes[..cut]));
        assert_eq!(reader.next().unwrap().unwrap(), b"one");
        assert!(matches!(
            reader.next(),
            Some(Err(RecordError::Truncated { offset: 19 }))
        ));
    }

    #[test]
    fn sink_rejects_append_after_finish() {
        let mut writer = TfRecordWriter::new(Vec::new());
        writer.append("a", b"x").unwrap();
        writer.finish().unwrap();
        assert!(matches!(writer.append("b", b"y"), Err(RecordError::Finished)));
        assert_eq!(writer.records_written(), 1);
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tfrecords");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            TfRecordWriter::create(&path),
            Err(RecordError::AlreadyExists(_))
        ));
    }

    #[test]
    fn file_round_trip_through_examples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tfrecords");
        let mut writer = TfRecordWriter::create(&path).unwrap();
        writer.append("n01_1.JPEG", b"png-one").unwrap();
        writer.append("n01_3.JPEG", b"png-three").unwrap();
        writer.finish().unwrap();

        let names: Vec<String> = read_examples(&path)
            .unwrap()
            .map(|r| r.unwrap().name)
            .collect();
        assert_eq!(names, vec!["n01_1.JPEG", "n01_3.JPEG"]);
    }
}
