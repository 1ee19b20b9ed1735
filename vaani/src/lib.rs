//! Vaani CLI library: argument parsing and subcommands.

pub mod cli;
pub mod config;
pub mod inspect;
pub mod transcribe;

use std::process::ExitCode;

/// Exit code for input the pipeline rejected.
pub const EXIT_USER_ERROR: u8 = 2;

/// Exit code for internal faults and startup failures.
pub const EXIT_FAILURE: u8 = 1;

/// Map a failed command to its exit code.
///
/// Pipeline errors caused by the submitted audio exit with
/// [`EXIT_USER_ERROR`]; everything else exits with [`EXIT_FAILURE`].
pub fn exit_code(report: &eyre::Report) -> u8 {
    match report.downcast_ref::<vaani_asr::Error>() {
        Some(e) if e.is_user_error() => EXIT_USER_ERROR,
        _ => EXIT_FAILURE,
    }
}

/// Print what went wrong to stderr and return the exit code.
///
/// Pipeline errors print their caller-safe message only; startup failures
/// print the full report.
pub fn report_failure(report: &eyre::Report) -> ExitCode {
    match report.downcast_ref::<vaani_asr::Error>() {
        Some(e) => eprintln!("error: {}", e.user_message()),
        None => eprintln!("error: {report:?}"),
    }

    ExitCode::from(exit_code(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;
    use vaani_asr::error::{FeatureError, FormatError};

    #[test]
    fn rejected_audio_exits_with_user_error() {
        let report = Err::<(), _>(vaani_asr::Error::from(FormatError::ChannelMismatch(2)))
            .wrap_err("transcription failed")
            .unwrap_err();

        assert_eq!(exit_code(&report), EXIT_USER_ERROR);
    }

    #[test]
    fn internal_faults_exit_with_failure() {
        let report = eyre::Report::new(vaani_asr::Error::from(FeatureError::EmptyWaveform));
        assert_eq!(exit_code(&report), EXIT_FAILURE);

        let report = eyre::eyre!("model file not found");
        assert_eq!(exit_code(&report), EXIT_FAILURE);
    }
}
