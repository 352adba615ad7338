//! Client error types.

use raffle_core::SlotNumber;

/// Errors that can occur when using the raffle client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The change feed sent something that could not be decoded.
    #[error("change feed error: {0}")]
    Stream(String),
}

impl ClientError {
    /// Message suitable for showing to the user.
    ///
    /// Server errors are passed through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors raised by the page view models.
///
/// Precondition failures are detected locally, before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No slot is selected.
    #[error("select at least one number")]
    NothingSelected,

    /// A form field is blank.
    #[error("fill in first name, last name and phone")]
    MissingFields,

    /// The buyer name already holds a reservation.
    #[error("a reservation already exists for {0}")]
    DuplicateName(String),

    /// The slot is reserved or paid.
    #[error("slot {0} is not available")]
    SlotUnavailable(SlotNumber),

    /// The PIN is too short to be sent.
    #[error("PIN must have at least {min} characters")]
    PinTooShort {
        /// Minimum length.
        min: usize,
    },

    /// The admin page has no valid session.
    #[error("admin page is locked")]
    Locked,

    /// Reset was requested without confirmation.
    #[error("reset not confirmed")]
    ResetNotConfirmed,

    /// Another admin call is in progress.
    #[error("another operation is in progress")]
    Busy,

    /// The request failed; carries the message to show.
    #[error("{0}")]
    Api(String),
}

impl From<ClientError> for PageError {
    fn from(err: ClientError) -> Self {
        Self::Api(err.user_message())
    }
}
