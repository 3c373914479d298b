//! RFC 8446 section 4.2.3

use std::fmt::{self, Display, Formatter};

/// A TLS `SignatureScheme` code point.
///
/// TLS 1.2 split the same two bytes into a `(hash, signature)` pair. The split
/// is kept for the legacy code paths, but for injected schemes the high byte
/// does not identify a hash algorithm.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct SignatureScheme(u16);

/// The TLS 1.2 `SignatureAndHashAlgorithm` view of a code point.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct SignatureAndHashAlgorithm {
    pub hash:      u8,
    pub signature: u8,
}

impl SignatureScheme {
    pub const RSA_PKCS1_SHA256: Self = Self(0x0401);
    pub const ECDSA_SECP256R1_SHA256: Self = Self(0x0403);
    pub const RSA_PSS_RSAE_SHA256: Self = Self(0x0804);
    pub const ED25519: Self = Self(0x0807);
    pub const ED448: Self = Self(0x0808);

    // draft-ietf-tls-mldsa
    pub const MLDSA44: Self = Self(0x0904);
    pub const MLDSA65: Self = Self(0x0905);
    pub const MLDSA87: Self = Self(0x0906);

    pub const fn new(code_point: u16) -> Self {
        Self(code_point)
    }

    pub const fn from_bytes(hash: u8, signature: u8) -> Self {
        Self(((hash as u16) << 8) | signature as u16)
    }

    pub const fn code_point(self) -> u16 {
        self.0
    }

    /// High byte, the "hash" half of the legacy pair.
    pub const fn hash(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte, the "signature" half of the legacy pair.
    pub const fn signature(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub const fn signature_and_hash(self) -> SignatureAndHashAlgorithm {
        SignatureAndHashAlgorithm {
            hash:      self.hash(),
            signature: self.signature(),
        }
    }

    /// RFC 8446 reserves `0xFE00..=0xFFFF` for private use.
    pub const fn is_private_use(self) -> bool {
        matches!(self.0, 0xfe00..=0xffff)
    }

    pub fn as_str(self) -> &'static str {
        match self.0 {
            0x0201 => "rsa_pkcs1_sha1",
            0x0203 => "ecdsa_sha1",
            0x0401 => "rsa_pkcs1_sha256",
            0x0403 => "ecdsa_secp256r1_sha256",
            0x0501 => "rsa_pkcs1_sha384",
            0x0503 => "ecdsa_secp384r1_sha384",
            0x0601 => "rsa_pkcs1_sha512",
            0x0603 => "ecdsa_secp521r1_sha512",
            0x0804 => "rsa_pss_rsae_sha256",
            0x0805 => "rsa_pss_rsae_sha384",
            0x0806 => "rsa_pss_rsae_sha512",
            0x0807 => "ed25519",
            0x0808 => "ed448",
            0x0809 => "rsa_pss_pss_sha256",
            0x080a => "rsa_pss_pss_sha384",
            0x080b => "rsa_pss_pss_sha512",
            0x0904 => "mldsa44",
            0x0905 => "mldsa65",
            0x0906 => "mldsa87",
            0xfe00..=0xffff => "private use",
            _ => "unassigned",
        }
    }
}

impl Display for SignatureScheme {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "0x{:04X} ({})", self.0, self.as_str())
    }
}

impl From<u16> for SignatureScheme {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<SignatureScheme> for u16 {
    fn from(value: SignatureScheme) -> u16 {
        value.0
    }
}

impl From<SignatureAndHashAlgorithm> for SignatureScheme {
    fn from(value: SignatureAndHashAlgorithm) -> Self {
        Self::from_bytes(value.hash, value.signature)
    }
}
