pub mod backends;
pub mod traits;

pub use traits::FheBackend;

use crate::error::BackendError;

/// Identifies which backend produced a ciphertext or evaluation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum BackendId {
    /// TFHE shortint (3-bit message space)
    #[serde(rename = "tfhe")]
    Tfhe = 0,
    /// Mock backend for testing
    #[serde(rename = "mock")]
    Mock = 255,
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendId::Tfhe => write!(f, "tfhe"),
            BackendId::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for BackendId {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tfhe" | "shortint" => Ok(BackendId::Tfhe),
            "mock" | "test" => Ok(BackendId::Mock),
            other => Err(BackendError::BackendUnavailable(format!(
                "Unknown backend: {other}"
            ))),
        }
    }
}

impl TryFrom<u8> for BackendId {
    type Error = BackendError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Tfhe),
            255 => Ok(Self::Mock),
            other => Err(BackendError::Deserialization(format!(
                "Unknown backend ID: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_id_parses_aliases() {
        assert_eq!("TFHE".parse::<BackendId>().unwrap(), BackendId::Tfhe);
        assert_eq!("test".parse::<BackendId>().unwrap(), BackendId::Mock);
        assert!("lattice".parse::<BackendId>().is_err());
    }

    #[test]
    fn backend_id_tag_roundtrip() {
        for id in [BackendId::Tfhe, BackendId::Mock] {
            assert_eq!(BackendId::try_from(id as u8).unwrap(), id);
            assert_eq!(id.to_string().parse::<BackendId>().unwrap(), id);
        }
        assert!(BackendId::try_from(7).is_err());
    }
}
