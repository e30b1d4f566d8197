use thiserror::Error;

/// Failure while patching rendered markup.
///
/// Tolerant parsing never yields `Malformed`; callers that cannot afford a
/// failure should keep the default tolerant options.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup: {}", .0.join("; "))]
    Malformed(Vec<String>),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("serialized document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
