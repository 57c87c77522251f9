// ontap-api: Async Rust client for the NetApp ONTAP REST API (SAN resources)

pub mod auth;
pub mod client;
pub mod error;
pub mod san;
pub mod size;
pub mod transport;

pub use auth::{AuthSettings, Credentials};
pub use client::{ApiRequest, ApiResponse, OntapClient};
pub use error::Error;
pub use san::{
    Igroup, IgroupFilter, IgroupLunMap, IgroupSpec, Lun, LunFilter, LunMap, LunMapFilter,
    LunMapSpec, LunSpec, MapEndpoint, OsType, Protocol, ResourceRef,
};
pub use size::parse_size;
pub use transport::{TlsMode, TransportConfig};
