//! Transfer outcome for a single uploaded field.

/// Outcome of one file's multipart transfer, as reported by the platform.
///
/// `Success` is the only value under which the staged content may be
/// trusted. Every other variant is an expected client-side condition and
/// travels as data, not as an error; metadata accessors on the artifact
/// stay usable regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferStatus {
    #[default]
    Success,
    /// Staged bytes exceeded the server-configured size cap.
    ExceedsSizeLimit,
    /// Staged bytes exceeded the size cap declared by the submitting form.
    ExceedsFormLimit,
    /// Client stopped sending before the field was complete.
    PartialTransfer,
    /// Field was submitted with no file attached.
    NoFile,
    /// No staging directory was available to land the transfer.
    MissingStagingDir,
    /// Writing the staged bytes to disk failed.
    WriteFailure,
    /// A pre-staging filter refused the file's extension.
    BlockedByExtension,
}

impl TransferStatus {
    /// Maps a platform wire code to a status. Codes follow the usual
    /// multipart-handler numbering (0 success, 5 unassigned); unknown codes
    /// return `None` so callers reject them explicitly instead of guessing.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(TransferStatus::Success),
            1 => Some(TransferStatus::ExceedsSizeLimit),
            2 => Some(TransferStatus::ExceedsFormLimit),
            3 => Some(TransferStatus::PartialTransfer),
            4 => Some(TransferStatus::NoFile),
            6 => Some(TransferStatus::MissingStagingDir),
            7 => Some(TransferStatus::WriteFailure),
            8 => Some(TransferStatus::BlockedByExtension),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferStatus::Success => "success",
            TransferStatus::ExceedsSizeLimit => "exceeds-size-limit",
            TransferStatus::ExceedsFormLimit => "exceeds-form-limit",
            TransferStatus::PartialTransfer => "partial-transfer",
            TransferStatus::NoFile => "no-file",
            TransferStatus::MissingStagingDir => "missing-staging-dir",
            TransferStatus::WriteFailure => "write-failure",
            TransferStatus::BlockedByExtension => "blocked-by-extension",
        }
    }

    /// Human-readable explanation for logs and user-facing reporting.
    pub fn message(self) -> &'static str {
        match self {
            TransferStatus::Success => "the file was uploaded successfully",
            TransferStatus::ExceedsSizeLimit => {
                "the file exceeds the upload size limit configured on the server"
            }
            TransferStatus::ExceedsFormLimit => {
                "the file exceeds the size limit declared by the submitting form"
            }
            TransferStatus::PartialTransfer => "the file was only partially uploaded",
            TransferStatus::NoFile => "no file was uploaded",
            TransferStatus::MissingStagingDir => "no staging directory was available",
            TransferStatus::WriteFailure => "the uploaded file could not be written to disk",
            TransferStatus::BlockedByExtension => "a filter blocked the file's extension",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, TransferStatus::Success)
    }
}
