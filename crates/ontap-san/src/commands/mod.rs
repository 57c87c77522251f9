//! Command dispatch: bridges CLI args -> SAN operations -> output formatting.

pub mod igroup;
pub mod lun;
pub mod lunmap;
pub mod util;

use ontap_api::OntapClient;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Rendering settings resolved once from flags and config.
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
}

/// Dispatch a cluster-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &OntapClient, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::LunCreate(args) => lun::create(client, args, ctx).await,
        Command::LunList(args) => lun::list(client, args, ctx).await,
        Command::LunDelete(args) => lun::delete(client, args, ctx).await,
        Command::IgroupCreate(args) => igroup::create(client, args, ctx).await,
        Command::IgroupAddInitiators(args) => igroup::add_initiators(client, args, ctx).await,
        Command::IgroupList(args) => igroup::list(client, args, ctx).await,
        Command::LunmapCreate(args) => lunmap::create(client, args, ctx).await,
        Command::LunmapList(args) => lunmap::list(client, args, ctx).await,
        Command::LunmapDelete(args) => lunmap::delete(client, args, ctx).await,
        Command::Completions(_) => Err(CliError::Usage {
            message: "completions do not need a cluster connection".into(),
        }),
    }
}
