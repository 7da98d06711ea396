//! End-to-end encoding against a scripted archive service

use god_pipeline::{
    load_dataset, DatasetEncoder, EncodeError, EncodeReport, EncoderConfig, FailureStage, StimulusGeometry,
};
use god_records::decode_png16;
use god_test_utils::{gray_png, identifiers, rgb_png, tar_bytes, write_image_list, FullSink, MemorySink, ScriptedTransport};
use pretty_assertions::assert_eq;
use std::path::Path;

fn small_config(root: &Path) -> EncoderConfig {
    EncoderConfig::new()
        .with_output_dir(root.join("out"))
        .with_archive_dir(root.join("archives"))
        .with_geometry(StimulusGeometry::new(8, 12))
}

fn n01_archive() -> Vec<u8> {
    let first = gray_png(6, 4, |x, _| if x < 3 { 0 } else { 255 });
    let third = rgb_png(5, 5, [255, 255, 255]);
    tar_bytes(&[("n01_1.JPEG", first.as_slice()), ("n01_3.JPEG", third.as_slice())])
}

#[tokio::test]
async fn missing_member_is_skipped_and_order_kept() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new().with_archive("n01", n01_archive());
    let encoder = DatasetEncoder::new(small_config(dir.path()), transport.clone()).unwrap();

    let mut sink = MemorySink::new();
    let ids = identifiers(&["n01_1.JPEG", "n01_2.JPEG", "n01_3.JPEG"]);
    let summary = encoder.encode(&ids, &mut sink).await.unwrap();

    assert_eq!(summary.record_count(), 2);
    assert_eq!(summary.failure_count(), 1);
    assert_eq!(sink.names(), vec!["n01_1.JPEG", "n01_3.JPEG"]);
    assert!(sink.finished);
    assert_eq!(summary.failures[0].identifier, "n01_2.JPEG");
    assert_eq!(summary.failures[0].stage, FailureStage::Extracting);
    assert_eq!(transport.call_count("n01"), 1);
}

#[tokio::test]
async fn payloads_are_canvas_sized_pngs() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new().with_archive("n01", n01_archive());
    let encoder = DatasetEncoder::new(small_config(dir.path()), transport).unwrap();

    let mut sink = MemorySink::new();
    encoder
        .encode(&identifiers(&["n01_3.JPEG"]), &mut sink)
        .await
        .unwrap();

    let pixels = decode_png16(&sink.records[0].1).unwrap();
    assert_eq!(pixels.dim(), (12, 12));
    // corners are canvas, the centre is the white image
    assert!((pixels[[0, 0]] - 0.5).abs() < 1e-4);
    assert!((pixels[[11, 11]] - 0.5).abs() < 1e-4);
    assert!((pixels[[6, 6]] - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn unreachable_synset_is_fetched_once_per_pass() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new()
        .with_archive("n01", n01_archive())
        .failing("n02", u32::MAX);
    let encoder = DatasetEncoder::new(small_config(dir.path()), transport.clone()).unwrap();

    let mut sink = MemorySink::new();
    let ids = identifiers(&["n02_1.JPEG", "n01_1.JPEG", "n02_2.JPEG"]);
    let summary = encoder.encode(&ids, &mut sink).await.unwrap();

    assert_eq!(summary.record_count(), 1);
    assert_eq!(summary.failure_count(), 2);
    assert!(summary.failures.iter().all(|f| f.stage == FailureStage::Fetching));
    assert_eq!(transport.call_count("n02"), 5);
    assert!(!encoder.cache().contains("n02"));
}

#[tokio::test]
async fn sink_failure_ends_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new().with_archive("n01", n01_archive());
    let encoder = DatasetEncoder::new(small_config(dir.path()), transport).unwrap();

    let mut sink = FullSink::with_capacity(1);
    let ids = identifiers(&["n01_1.JPEG", "n01_3.JPEG"]);
    let err = encoder.encode(&ids, &mut sink).await.unwrap_err();
    assert!(matches!(err, EncodeError::Sink(_)));
    assert_eq!(sink.inner.names(), vec!["n01_1.JPEG"]);
}

#[tokio::test]
async fn encode_list_writes_records_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("imageURL_test.csv");
    write_image_list(&list, &["n01_1.JPEG", "n01_2.JPEG", "n01_3.JPEG"]);

    let transport = ScriptedTransport::new().with_archive("n01", n01_archive());
    let encoder = DatasetEncoder::new(small_config(dir.path()), transport).unwrap();
    let report = encoder.encode_list(&list).await.unwrap();

    assert_eq!(report.output, dir.path().join("out").join("imageURL_test.tfrecords"));
    assert_eq!((report.records, report.failed), (2, 1));
    assert!(report.finished_at >= report.started_at);

    let persisted = EncodeReport::read_json(&encoder.report_path(&list).unwrap()).unwrap();
    assert_eq!(persisted, report);

    let items: Vec<_> = load_dataset(&report.output)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["n01_1.JPEG", "n01_3.JPEG"]);
    assert_eq!(items[0].image.shape(), &[12, 12, 1]);
    assert!(items[0].image[[0, 0, 0]].abs() < 1e-4);

    let again = encoder.encode_list(&list).await.unwrap_err();
    assert!(matches!(again, EncodeError::OutputExists(_)));
}

#[tokio::test]
async fn default_geometry_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new().with_archive("n01", n01_archive());
    let config = EncoderConfig::new()
        .with_output_dir(dir.path())
        .with_archive_dir(dir.path().join("archives"));
    let encoder = DatasetEncoder::new(config, transport).unwrap();

    let mut sink = MemorySink::new();
    encoder
        .encode(&identifiers(&["n01_1.JPEG"]), &mut sink)
        .await
        .unwrap();

    let pixels = decode_png16(&sink.records[0].1).unwrap();
    assert_eq!(pixels.dim(), (550, 550));
    for (r, c) in [(0, 0), (24, 300), (525, 10), (549, 549)] {
        assert!((pixels[[r, c]] - 0.5).abs() < 1e-4, "({r}, {c})");
    }
}
