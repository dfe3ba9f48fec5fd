use thiserror::Error;

/// Failure taxonomy of the monitor. None of these are fatal once running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Network, timeout or malformed payload from every data source.
    #[error("acquisition failed: {0}")]
    Acquisition(String),
    /// A source answered but the tracked item was absent.
    #[error("tracked item missing from response: {0}")]
    DataShape(String),
    /// The notifier did not accept a message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
