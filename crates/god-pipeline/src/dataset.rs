//! Reading encoded datasets back for training

use god_records::{decode_png16, read_examples, RecordResult};
use ndarray::{Array3, Axis};
use std::path::Path;

/// Subtracted from decoded intensities so mid-gray becomes zero
pub const CENTER_OFFSET: f32 = 0.5;

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetItem {
    /// `rows x cols x 1`, mid-gray at zero
    pub image: Array3<f32>,
    /// Image identifier
    pub name: String,
}

/// Iterate `(image - 0.5, name)` pairs of a record file, in file order
///
/// # Errors
/// Returns an error if the file cannot be opened; corrupt records and
/// undecodable images are yielded as errors by the iterator
pub fn load_dataset(path: &Path) -> RecordResult<impl Iterator<Item = RecordResult<DatasetItem>>> {
    let examples = read_examples(path)?;
    Ok(examples.map(|example| {
        let example = example?;
        let mut pixels = decode_png16(&example.image)?;
        pixels -= CENTER_OFFSET;
        Ok(DatasetItem {
            image: pixels.insert_axis(Axis(2)),
            name: example.name,
        })
    }))
}
