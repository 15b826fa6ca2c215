/// SenML version marker written as `bver` on the first record
pub const SENML_VERSION: i64 = 5;

/// How opaque (`vd`) values are written on encode.
///
/// Decode accepts both forms regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpaqueEncoding {
    /// JSON array of byte integers (0-255)
    #[default]
    ByteArray,
    /// Unpadded base64url string, as RFC 8428 writes `vd`
    Base64Url,
}

/// Encoder options
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Value emitted as `bver`
    pub version: i64,

    /// Wire form of opaque values
    pub opaque: OpaqueEncoding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: SENML_VERSION,
            opaque: OpaqueEncoding::default(),
        }
    }
}

impl Config {
    /// Set the opaque value encoding
    pub fn with_opaque(mut self, opaque: OpaqueEncoding) -> Self {
        self.opaque = opaque;
        self
    }
}
