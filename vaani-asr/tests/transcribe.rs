//! End-to-end pipeline tests with model doubles.

use hound::{SampleFormat, WavSpec, WavWriter};
use ndarray::{Array2, ArrayD};
use std::io::Cursor;
use vaani_asr::error::{DecodeError, FormatError};
use vaani_asr::{
    CtcGreedyDecoder, Error, FeatureExtractor, Features, Result, Transcriber, Vocabulary,
};

/// Environment variable pointing at an exported Conformer-CTC model.
const MODEL_ENV: &str = "VAANI_TEST_MODEL";

fn wav(sample_rate: u32, channels: u16, bits_per_sample: u16, samples: &[i32]) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

fn transcriber<M: vaani_asr::AcousticModel>(model: M) -> Transcriber<M> {
    Transcriber::new(
        FeatureExtractor::default(),
        model,
        CtcGreedyDecoder::new(Vocabulary::hindi()),
    )
}

/// Log-probability-like scores where every frame prefers the blank.
fn all_blank(features: &Features) -> Result<ArrayD<f32>> {
    let mut scores = Array2::<f32>::from_elem((features.frame_length(), 135), -20.0);
    scores.column_mut(0).fill(-0.01);
    Ok(scores.into_dyn())
}

#[test]
fn silence_transcribes_to_empty_text() {
    let bytes = wav(16000, 1, 16, &[0; 16000]);

    let transcript = transcriber(all_blank).transcribe(&bytes).unwrap();

    assert_eq!(transcript.as_str(), "");
}

#[test]
fn unbatched_output_with_larger_vocabulary_is_accepted() {
    let model = |features: &Features| -> Result<ArrayD<f32>> {
        let mut scores = Array2::<f32>::zeros((features.frame_length(), 135));
        // Ids beyond the built-in table are skipped
        scores.column_mut(130).fill(1.0);
        scores[[0, 22]] = 2.0;
        Ok(scores.into_dyn())
    };

    let transcript = transcriber(model)
        .transcribe(&wav(16000, 1, 16, &[100; 3200]))
        .unwrap();

    assert_eq!(transcript.as_str(), "▁है");
    assert_eq!(transcript.to_words(), "है");
}

#[test]
fn stereo_is_rejected_as_user_error() {
    let bytes = wav(16000, 2, 16, &[0; 3200]);

    let err = transcriber(all_blank).transcribe(&bytes).unwrap_err();

    assert!(matches!(err, Error::Format(FormatError::ChannelMismatch(2))));
    assert!(err.is_user_error());
    assert_eq!(err.user_message(), "audio is not mono: got 2 channels");
}

#[test]
fn cd_quality_is_rejected_as_user_error() {
    let bytes = wav(44100, 1, 16, &[0; 4410]);

    let err = transcriber(all_blank).transcribe(&bytes).unwrap_err();

    assert!(matches!(
        err,
        Error::Format(FormatError::SampleRateMismatch { got: 44100, .. })
    ));
    assert!(err.is_user_error());
}

#[test]
fn truncated_file_is_rejected_as_user_error() {
    let bytes = wav(16000, 1, 16, &[1000; 1600]);
    let truncated = &bytes[..bytes.len() - 1];

    let err = transcriber(all_blank).transcribe(truncated).unwrap_err();

    assert!(matches!(err, Error::Decode(DecodeError::Truncated(_))));
}

#[test]
fn empty_data_chunk_is_an_internal_fault() {
    let bytes = wav(16000, 1, 16, &[]);

    let err = transcriber(all_blank).transcribe(&bytes).unwrap_err();

    assert!(!err.is_user_error());
    assert_eq!(err.user_message(), "internal error while transcribing audio");
}

#[test]
#[ignore = "exported model required (set VAANI_TEST_MODEL)"]
fn real_model_transcribes_silence_to_empty_text() {
    use ort::session::Session;
    use vaani_asr::models::{OnnxConfig, OnnxModel};

    let path = std::env::var(MODEL_ENV).expect("VAANI_TEST_MODEL not set");
    let model = OnnxModel::from_file(path, Session::builder().unwrap(), OnnxConfig::default())
        .expect("failed to load model");

    let transcript = transcriber(model)
        .transcribe(&wav(16000, 1, 16, &[0; 16000]))
        .unwrap();

    assert!(transcript.is_empty());
}
