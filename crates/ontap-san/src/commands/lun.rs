//! LUN command handlers.

use tabled::Tabled;

use ontap_api::{Lun, LunFilter, LunSpec, OntapClient};

use crate::cli::{LunCreateArgs, LunDeleteArgs, LunListArgs};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LunRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "SVM")]
    svm: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "OS Type")]
    os_type: String,
}

fn row(l: &Lun, color: bool) -> LunRow {
    LunRow {
        name: l.name.clone(),
        uuid: l.uuid.clone(),
        state: output::paint_state(&output::or_dash(&l.state), color),
        svm: output::or_dash(&l.svm),
        volume: output::or_dash(&l.volume),
        size: output::human_size(l.size),
        os_type: l.os_type.to_string(),
    }
}

fn detail(l: &Lun) -> String {
    [
        format!("Name:    {}", l.name),
        format!("UUID:    {}", l.uuid),
        format!("SVM:     {}", output::or_dash(&l.svm)),
        format!("Volume:  {}", output::or_dash(&l.volume)),
        format!("Size:    {} ({} bytes)", output::human_size(l.size), l.size),
        format!("OS Type: {}", l.os_type),
        format!("State:   {}", output::or_dash(&l.state)),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn create(client: &OntapClient, args: LunCreateArgs, ctx: &Ctx) -> Result<(), CliError> {
    let spec = LunSpec {
        svm: args.svm,
        volume: args.volume,
        name: args.lun,
        size: args.size,
        os_type: args.os_type,
        space_reserve: args.space_reserve,
    };

    let lun = client.lun_create(&spec).await?;
    output::print_status(
        &format!("LUN {} created", lun.name),
        ctx.quiet,
        ctx.color,
    );

    let out = output::render_single(ctx.format, &lun, detail, |l| l.uuid.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn list(client: &OntapClient, args: LunListArgs, ctx: &Ctx) -> Result<(), CliError> {
    let filter = LunFilter {
        svm: args.svm,
        volume: args.volume,
        name: args.lun,
        fields: args.fields,
        max_records: args.max_records,
    };

    let luns = client.lun_list(&filter).await?;
    let out = output::render_list(
        ctx.format,
        &luns,
        |l| row(l, ctx.color),
        |l| l.uuid.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn delete(client: &OntapClient, args: LunDeleteArgs, ctx: &Ctx) -> Result<(), CliError> {
    let prompt = format!("Delete LUN {}? This is destructive.", args.uuid);
    if !util::confirm(&prompt, "lun-delete", ctx.yes)? {
        return Ok(());
    }

    client.lun_delete(&args.uuid).await?;
    output::print_status(
        &format!("LUN {} deleted", args.uuid),
        ctx.quiet,
        ctx.color,
    );
    Ok(())
}
