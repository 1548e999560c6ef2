use thiserror::Error;

/// Fatal failures of a loudness check.
///
/// Degenerate statistics (no buckets, a single bucket, zero spread) are not
/// errors; they surface as unavailable fields in the report instead.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Source missing, unreadable, undecodable, or reporting no channels
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bucket size or threshold rejected before any analysis runs
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CheckError {
    /// Process exit status for this error. clap already owns 2 for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckError::InvalidInput(_) => 3,
            CheckError::InvalidConfiguration(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let input = CheckError::InvalidInput("x".into()).exit_code();
        let config = CheckError::InvalidConfiguration("x".into()).exit_code();
        assert_ne!(input, config);
        assert!(input > 2 && config > 2);
    }

    #[test]
    fn anyhow_chain_keeps_variant() {
        let err = anyhow::Error::from(CheckError::InvalidConfiguration("bucket".into()))
            .context("while checking track.wav");
        let found = err.chain().find_map(|e| e.downcast_ref::<CheckError>());
        assert!(matches!(found, Some(CheckError::InvalidConfiguration(_))));
    }
}
