//! Igroup command handlers.

use tabled::Tabled;

use ontap_api::{Igroup, IgroupFilter, IgroupSpec, OntapClient};

use crate::cli::{IgroupAddInitiatorsArgs, IgroupCreateArgs, IgroupListArgs};
use crate::error::CliError;
use crate::output;

use super::Ctx;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct IgroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "SVM")]
    svm: String,
    #[tabled(rename = "OS Type")]
    os_type: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Initiators")]
    initiators: String,
    #[tabled(rename = "Parent Igroups")]
    parent_igroups: String,
    #[tabled(rename = "LUN Maps")]
    lun_maps: String,
}

impl From<&Igroup> for IgroupRow {
    fn from(g: &Igroup) -> Self {
        Self {
            name: g.name.clone(),
            uuid: g.uuid.clone(),
            svm: output::or_dash(&g.svm),
            os_type: g.os_type.to_string(),
            protocol: g
                .protocol
                .map_or_else(|| "-".into(), |p| p.to_string()),
            initiators: join_or_dash(g.initiators.iter()),
            parent_igroups: join_or_dash(g.parent_igroups.iter()),
            lun_maps: join_or_dash(g.lun_maps.iter()),
        }
    }
}

fn join_or_dash<T: ToString>(items: impl Iterator<Item = T>) -> String {
    let joined = items.map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
    output::or_dash(&joined)
}

fn join_lun_maps(g: &Igroup) -> String {
    g.lun_maps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn detail(g: &Igroup) -> String {
    let mut lines = vec![
        format!("Name:       {}", g.name),
        format!("UUID:       {}", g.uuid),
        format!("SVM:        {}", output::or_dash(&g.svm)),
        format!("OS Type:    {}", g.os_type),
        format!(
            "Protocol:   {}",
            g.protocol.map_or_else(|| "-".into(), |p| p.to_string())
        ),
    ];
    if g.initiators.is_empty() {
        lines.push("Initiators: -".into());
    } else {
        lines.push("Initiators:".into());
        lines.extend(g.initiators.iter().map(|i| format!("  {i}")));
    }
    if !g.igroups.is_empty() {
        lines.push(format!("Igroups:    {}", g.igroups.join(", ")));
    }
    if !g.parent_igroups.is_empty() {
        lines.push(format!("Parents:    {}", g.parent_igroups.join(", ")));
    }
    if !g.lun_maps.is_empty() {
        lines.push(format!("LUN Maps:   {}", join_lun_maps(g)));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn create(
    client: &OntapClient,
    args: IgroupCreateArgs,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let spec = IgroupSpec {
        svm: args.svm,
        name: args.name,
        os_type: args.os_type,
        protocol: args.protocol.into(),
        initiators: args.initiator,
        igroups: args.igroup,
    };

    let igroup = client.igroup_create(&spec).await?;
    output::print_status(
        &format!("Igroup {} created", igroup.name),
        ctx.quiet,
        ctx.color,
    );

    let out = output::render_single(ctx.format, &igroup, detail, |g| g.uuid.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn add_initiators(
    client: &OntapClient,
    args: IgroupAddInitiatorsArgs,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let igroup = client
        .igroup_add_initiators(&args.igroup_uuid, &args.initiator)
        .await?;
    output::print_status(
        &format!(
            "Added {} initiator(s) to igroup {}",
            args.initiator.len(),
            igroup.name
        ),
        ctx.quiet,
        ctx.color,
    );

    let out = output::render_single(ctx.format, &igroup, detail, |g| {
        g.initiators.iter().cloned().collect::<Vec<_>>().join("\n")
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn list(client: &OntapClient, args: IgroupListArgs, ctx: &Ctx) -> Result<(), CliError> {
    let query = match args.query_filter.as_deref() {
        None => None,
        Some([field, value]) => Some((field.clone(), value.clone())),
        Some(_) => {
            return Err(CliError::Usage {
                message: "--query-filter takes exactly a FIELD and a VALUE".into(),
            });
        }
    };

    let filter = IgroupFilter {
        query,
        fields: args.fields,
        max_records: args.max_records,
    };

    let igroups = client.igroup_list(&filter).await?;
    let out = output::render_list(
        ctx.format,
        &igroups,
        |g| IgroupRow::from(g),
        |g| g.uuid.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
