use anyhow::Error;
use std::fmt;

/// Anything that goes wrong while talking to a geocoder. These never escape
/// the lookup service; they are turned into a message for the person typing
/// an address.
#[derive(Debug)]
pub struct LookupError(Error);

impl LookupError {
    /// What we show the user. The first line of the error chain is the
    /// context we attached closest to the failure, which reads better than
    /// the transport error underneath it.
    pub fn user_message(&self) -> String {
        let msg = self.0.to_string();
        if msg.trim().is_empty() {
            "Error looking up address".to_string()
        } else {
            msg
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

// This enables using `?` on anything that converts into `anyhow::Error`
// inside functions returning `Result<_, LookupError>`.
impl<E> From<E> for LookupError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
