//! Unified error types for the ShockShadow firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! main loop's error handling uniform. All variants are `Copy` so they can be
//! passed through the sync core and event sinks without allocation.
//!
//! Nothing here is fatal: the main loop degrades every variant to "log and
//! try again next iteration".

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// The WiFi link could not be brought up.
    Network(ConnectivityError),
    /// The publish/subscribe transport failed.
    Comms(TransportError),
    /// A wire document could not be encoded or decoded.
    Codec(CodecError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The probe did not answer within its protocol timing window.
    Timeout,
    /// Frame received but the checksum did not match.
    ChecksumMismatch,
    /// GPIO read/write returned an error.
    GpioFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "probe timeout"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Connectivity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Broker unreachable or session not (yet) established.
    NotConnected,
    /// TLS material missing or rejected.
    Tls,
    /// The client refused or failed to enqueue the publish.
    PublishFailed,
    /// The client refused or failed to enqueue the subscription.
    SubscribeFailed,
    /// Payload exceeds the client's packet buffer.
    PayloadTooLarge,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "broker not connected"),
            Self::Tls => write!(f, "TLS credentials missing or rejected"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PayloadTooLarge => write!(f, "payload exceeds packet buffer"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Payload bytes are not UTF-8.
    InvalidUtf8,
    /// Payload is not a JSON document of the expected shape.
    Malformed,
    /// Serialisation of an outbound document failed.
    Encode,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "payload is not UTF-8"),
            Self::Malformed => write!(f, "malformed JSON document"),
            Self::Encode => write!(f, "document encode failed"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}
