//! Config - 통합 설정 관리
//!
//! - `freight.rs` - FreightConfig 통합 설정 (백엔드, 동기화)

mod freight;

pub use freight::{BackendConfig, FreightConfig, SyncSettings, FREIGHT_CONFIG_FILE};
