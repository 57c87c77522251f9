// SAN resources: LUNs, initiator groups, and LUN maps

mod igroup;
mod lun;
mod lun_map;
mod models;

pub use igroup::{Igroup, IgroupFilter, IgroupLunMap, IgroupSpec};
pub use lun::{Lun, LunFilter, LunSpec};
pub use lun_map::{LunMap, LunMapFilter, LunMapSpec, MapEndpoint};
pub use models::{OsType, Protocol, ResourceRef};
