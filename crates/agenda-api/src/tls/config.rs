// Re-export TLS configuration types from agenda_core for consistency
pub use agenda_core::config::{
    HstsConfig, HstsConfig as TlsHstsConfig, 
    LetsEncryptConfig, LetsEncryptConfig as TlsLetsEncryptConfig,
    TlsConfig, TlsVersion,
};
