//! Testing utilities for GOD workspace
//!
//! Synthetic archives and images, a scripted archive transport, and an
//! in-memory record sink.

#![allow(missing_docs)]

use async_trait::async_trait;
use god_archive::{ArchiveTransport, ImageIdentifier, PartialArchive, TransportError};
use god_records::{RecordError, RecordResult, RecordSink};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::Array2;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// 8-bit grayscale PNG with pixel `(x, y)` given by `f`
pub fn gray_png(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)]));
    encode(DynamicImage::ImageLuma8(img), ImageFormat::Png)
}

/// Uniform RGB PNG
pub fn rgb_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// 8-bit grayscale PNG of intensities in `[0, 1]`
pub fn png_from_pixels(pixels: &Array2<f32>) -> Vec<u8> {
    let (rows, cols) = pixels.dim();
    gray_png(cols as u32, rows as u32, |x, y| {
        (pixels[[y as usize, x as usize]].clamp(0.0, 1.0) * 255.0).round() as u8
    })
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// Tar archive holding `members`
pub fn tar_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Write a tar archive holding `members` to `path`
pub fn write_tar(path: &Path, members: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, tar_bytes(members)).unwrap();
}

/// Parse identifiers, panicking on invalid input
pub fn identifiers(raw: &[&str]) -> Vec<ImageIdentifier> {
    raw.iter().map(|s| ImageIdentifier::parse(s).unwrap()).collect()
}

/// Write a three-column image list whose last column is the identifier
pub fn write_image_list(path: &Path, raw: &[&str]) {
    let body: String = raw
        .iter()
        .enumerate()
        .map(|(i, id)| format!("{i},{},{id}\n", i % 2))
        .collect();
    std::fs::write(path, body).unwrap();
}

#[derive(Default)]
struct Script {
    archives: HashMap<String, Vec<u8>>,
    failures: HashMap<String, u32>,
    calls: Vec<String>,
}

/// In-process archive service keyed by synset
///
/// Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `archive` for `synset`
    pub fn with_archive(self, synset: &str, archive: Vec<u8>) -> Self {
        self.script.lock().archives.insert(synset.to_string(), archive);
        self
    }

    /// Time out the first `times` requests for `synset`
    pub fn failing(self, synset: &str, times: u32) -> Self {
        self.script.lock().failures.insert(synset.to_string(), times);
        self
    }

    /// Synsets requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().calls.clone()
    }

    /// Requests made for `synset`
    pub fn call_count(&self, synset: &str) -> usize {
        self.script.lock().calls.iter().filter(|c| *c == synset).count()
    }
}

fn wnid(url: &str) -> String {
    url.split_once("wnid=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl ArchiveTransport for ScriptedTransport {
    async fn fetch(&self, url: &str, sink: &mut PartialArchive) -> Result<u64, TransportError> {
        let synset = wnid(url);
        let archive = {
            let mut script = self.script.lock();
            script.calls.push(synset.clone());
            if let Some(remaining) = script.failures.get_mut(&synset) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TransportError::Timeout);
                }
            }
            script.archives.get(&synset).cloned()
        };
        let archive = archive.ok_or(TransportError::Status(404))?;
        sink.write_chunk(&archive)
            .map_err(|e| TransportError::Write(e.to_string()))?;
        Ok(sink.len())
    }
}

/// Record sink that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<(String, Vec<u8>)>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, name: &str, payload: &[u8]) -> RecordResult<()> {
        if self.finished {
            return Err(RecordError::Finished);
        }
        self.records.push((name.to_string(), payload.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> RecordResult<()> {
        if self.finished {
            return Err(RecordError::Finished);
        }
        self.finished = true;
        Ok(())
    }
}

/// Record sink whose appends fail once `capacity` records are stored
#[derive(Debug, Default)]
pub struct FullSink {
    pub capacity: usize,
    pub inner: MemorySink,
}

impl FullSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            inner: MemorySink::new(),
        }
    }
}

impl RecordSink for FullSink {
    fn append(&mut self, name: &str, payload: &[u8]) -> RecordResult<()> {
        if self.inner.records.len() >= self.capacity {
            return Err(RecordError::Stream(std::io::Error::other("sink full")));
        }
        self.inner.append(name, payload)
    }

    fn finish(&mut self) -> RecordResult<()> {
        self.inner.finish()
    }
}
