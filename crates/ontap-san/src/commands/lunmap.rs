//! LUN map command handlers.

use tabled::Tabled;

use ontap_api::{LunMap, LunMapFilter, LunMapSpec, OntapClient, ResourceRef};

use crate::cli::{LunmapCreateArgs, LunmapDeleteArgs, LunmapListArgs};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LunMapRow {
    #[tabled(rename = "SVM")]
    svm: String,
    #[tabled(rename = "LUN Path")]
    lun: String,
    #[tabled(rename = "LUN UUID")]
    lun_uuid: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Igroup")]
    igroup: String,
    #[tabled(rename = "Igroup UUID")]
    igroup_uuid: String,
    #[tabled(rename = "OS Type")]
    os_type: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "LUN ID")]
    lun_id: String,
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

impl From<&LunMap> for LunMapRow {
    fn from(m: &LunMap) -> Self {
        Self {
            svm: output::or_dash(&m.svm),
            lun: output::or_dash(&m.lun.name),
            lun_uuid: output::or_dash(&m.lun.uuid),
            node: opt(m.node.as_deref()),
            igroup: output::or_dash(&m.igroup.name),
            igroup_uuid: output::or_dash(&m.igroup.uuid),
            os_type: opt(m.igroup_os_type),
            protocol: opt(m.igroup_protocol),
            lun_id: opt(m.logical_unit_number),
        }
    }
}

fn detail(m: &LunMap) -> String {
    [
        format!("SVM:    {}", output::or_dash(&m.svm)),
        format!("LUN:    {} ({})", output::or_dash(&m.lun.name), output::or_dash(&m.lun.uuid)),
        format!(
            "Igroup: {} ({})",
            output::or_dash(&m.igroup.name),
            output::or_dash(&m.igroup.uuid)
        ),
        format!("LUN ID: {}", opt(m.logical_unit_number)),
    ]
    .join("\n")
}

fn pair_id(m: &LunMap) -> String {
    format!("{}\t{}", m.lun.name, m.igroup.name)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn create(
    client: &OntapClient,
    args: LunmapCreateArgs,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let spec = LunMapSpec {
        svm: args.svm,
        igroup: ResourceRef::parse(&args.igroup),
        lun: ResourceRef::parse(&args.lun_path),
        logical_unit_number: args.lun_id,
    };

    let map = client.lun_map_create(&spec).await?;
    output::print_status(
        &format!("Mapped {} to igroup {}", spec.lun, spec.igroup),
        ctx.quiet,
        ctx.color,
    );

    let out = output::render_single(ctx.format, &map, detail, pair_id)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn list(client: &OntapClient, args: LunmapListArgs, ctx: &Ctx) -> Result<(), CliError> {
    let filter = LunMapFilter {
        svm: args.svm,
        igroup: args.igroup.as_deref().map(ResourceRef::parse),
        lun: args.lun_path.as_deref().map(ResourceRef::parse),
        max_records: args.max_records,
    };

    let maps = client.lun_map_list(&filter).await?;
    let out = output::render_list(ctx.format, &maps, |m| LunMapRow::from(m), pair_id)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn delete(
    client: &OntapClient,
    args: LunmapDeleteArgs,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let lun = ResourceRef::parse(&args.lun);
    let igroup = ResourceRef::parse(&args.igroup);

    let prompt = format!("Unmap LUN {lun} from igroup {igroup}? Hosts lose access.");
    if !util::confirm(&prompt, "lunmap-delete", ctx.yes)? {
        return Ok(());
    }

    client.lun_map_delete(&lun, &igroup).await?;
    output::print_status(
        &format!("Unmapped {lun} from igroup {igroup}"),
        ctx.quiet,
        ctx.color,
    );
    Ok(())
}
