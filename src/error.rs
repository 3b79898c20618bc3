use thiserror::Error;

/// Rejections raised while turning form input into a `FeatureRecord`.
/// These never reach the network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("field `{0}` must be a finite number")]
    NotFinite(&'static str),

    #[error("unknown transaction type `{0}` (expected PAYMENT, TRANSFER, CASH_OUT or DEBIT)")]
    UnknownType(String),

    #[error("field `{0}` must not be blank")]
    EmptyIdentifier(&'static str),
}

/// Failures of a single round-trip to the scoring backend.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid feature record: {0}")]
    Validation(#[from] ValidationError),

    #[error("scoring service unreachable: {0}")]
    RemoteUnavailable(String),

    #[error("scoring service rejected the request: HTTP {status}")]
    RemoteRejected { status: u16, body: String },

    #[error("malformed response from scoring service: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Stable label the view layer can switch on.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation_error",
            ClientError::RemoteUnavailable(_) => "remote_unavailable",
            ClientError::RemoteRejected { .. } => "remote_rejected",
            ClientError::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // Body decoding failures surface here too; everything else is transport.
        if err.is_decode() {
            ClientError::MalformedResponse(err.to_string())
        } else {
            ClientError::RemoteUnavailable(err.to_string())
        }
    }
}

/// Local pre-flight failures for a batch CSV file.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("`{0}` is not a CSV file")]
    NotCsv(String),

    #[error("CSV header is missing columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("CSV header has unexpected or duplicate columns: {0:?}")]
    UnexpectedColumns(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Stats counts that violate `0 <= fraud <= total`. Clamped, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityWarning {
    #[error("totalRowsProcessed is negative ({0}), clamped to 0")]
    NegativeTotal(i64),

    #[error("fraudCount is negative ({0}), clamped to 0")]
    NegativeFraudCount(i64),

    #[error("fraudCount ({fraud}) exceeds totalRowsProcessed ({total}), clamped")]
    FraudExceedsTotal { fraud: i64, total: i64 },
}

pub type Result<T> = std::result::Result<T, ClientError>;
