mod config;
mod shutdown;

pub mod prelude {
    pub use crate::config::{
        BatchConfig, ChaosConfig, ConfigError, ContractVersion, HarnessConfig, IntegrityConfig,
        LoadConfig, MixedConfig, MAX_REQUEST_TIMEOUT,
    };
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle, ShutdownSignalError};
}
