// Initiator group endpoints
//
// `POST/GET /api/protocols/san/igroups`,
// `POST /api/protocols/san/igroups/{uuid}/initiators`

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::models::{NamedRef, OsType, Protocol, fill_missing, push_max_records};
use crate::client::{ApiRequest, OntapClient, parse_record};
use crate::error::Error;

const IGROUPS_PATH: &str = "/protocols/san/igroups";
const DEFAULT_FIELDS: &str = "name,uuid,svm.name,os_type,protocol,initiators.name,igroups.name,\
     parent_igroups.name,lun_maps.lun.name,lun_maps.logical_unit_number";

/// An initiator group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Igroup {
    pub uuid: String,
    pub name: String,
    pub svm: String,
    pub os_type: OsType,
    pub protocol: Option<Protocol>,
    /// IQNs / WWPNs in server order, each at most once.
    pub initiators: IndexSet<String>,
    /// Nested child igroups.
    pub igroups: Vec<String>,
    /// Igroups this one is nested in.
    pub parent_igroups: Vec<String>,
    /// LUNs mapped to this igroup.
    pub lun_maps: Vec<IgroupLunMap>,
}

/// One LUN mapped to an igroup, as embedded in the igroup record.
///
/// Displays as `<lun id>:<path>`, or whichever half the cluster reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgroupLunMap {
    pub logical_unit_number: Option<u32>,
    pub lun: String,
}

impl fmt::Display for IgroupLunMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.logical_unit_number, self.lun.as_str()) {
            (Some(id), "") => write!(f, "{id}"),
            (Some(id), path) => write!(f, "{id}:{path}"),
            (None, path) => f.write_str(path),
        }
    }
}

/// Parameters for [`OntapClient::igroup_create`].
#[derive(Debug, Clone)]
pub struct IgroupSpec {
    pub svm: String,
    pub name: String,
    pub os_type: OsType,
    pub protocol: Protocol,
    pub initiators: Vec<String>,
    pub igroups: Vec<String>,
}

/// Filters for [`OntapClient::igroup_list`].
#[derive(Debug, Clone, Default)]
pub struct IgroupFilter {
    /// Arbitrary `field=value` query, e.g. `("os_type", "linux")`.
    pub query: Option<(String, String)>,
    pub fields: Option<String>,
    pub max_records: Option<u32>,
}

// ── Wire shape ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IgroupRecord {
    uuid: String,
    name: String,
    #[serde(default)]
    svm: NamedRef,
    #[serde(default)]
    os_type: OsType,
    #[serde(default)]
    protocol: Option<Protocol>,
    #[serde(default)]
    initiators: Vec<NamedRef>,
    #[serde(default)]
    igroups: Vec<NamedRef>,
    #[serde(default)]
    parent_igroups: Vec<NamedRef>,
    #[serde(default)]
    lun_maps: Vec<LunMapEntry>,
}

#[derive(Deserialize)]
struct LunMapEntry {
    #[serde(default)]
    lun: NamedRef,
    #[serde(default)]
    logical_unit_number: Option<u32>,
}

impl From<IgroupRecord> for Igroup {
    fn from(r: IgroupRecord) -> Self {
        Self {
            uuid: r.uuid,
            name: r.name,
            svm: r.svm.name_or_default(),
            os_type: r.os_type,
            protocol: r.protocol,
            initiators: r.initiators.into_iter().filter_map(|i| i.name).collect(),
            igroups: r.igroups.into_iter().filter_map(|g| g.name).collect(),
            parent_igroups: r.parent_igroups.into_iter().filter_map(|g| g.name).collect(),
            lun_maps: r
                .lun_maps
                .into_iter()
                .filter(|m| m.lun.name.is_some() || m.logical_unit_number.is_some())
                .map(|m| IgroupLunMap {
                    logical_unit_number: m.logical_unit_number,
                    lun: m.lun.name_or_default(),
                })
                .collect(),
        }
    }
}

fn name_records(names: &[String]) -> Value {
    names.iter().map(|name| json!({ "name": name })).collect()
}

impl OntapClient {
    /// Create an igroup, optionally seeded with initiators and child igroups.
    ///
    /// `POST /protocols/san/igroups?return_records=true`
    pub async fn igroup_create(&self, spec: &IgroupSpec) -> Result<Igroup, Error> {
        for (field, value) in [("svm", &spec.svm), ("name", &spec.name)] {
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
        }

        let mut body = json!({
            "name": spec.name,
            "svm": { "name": spec.svm },
            "os_type": spec.os_type,
            "protocol": spec.protocol,
        });
        if !spec.initiators.is_empty() {
            body["initiators"] = name_records(&spec.initiators);
        }
        if !spec.igroups.is_empty() {
            body["igroups"] = name_records(&spec.igroups);
        }

        debug!(name = %spec.name, svm = %spec.svm, "creating igroup");
        let resp = self
            .request(
                ApiRequest::post(IGROUPS_PATH)
                    .query("return_records", "true")
                    .json(&body)?,
            )
            .await?;

        let mut record = resp.into_created_record();
        fill_missing(&mut record, &body);
        Ok(parse_record::<IgroupRecord>(&record)?.into())
    }

    /// Fetch a single igroup by UUID.
    pub async fn igroup_get(&self, uuid: &str) -> Result<Igroup, Error> {
        let resp = self
            .request(
                ApiRequest::get(format!("{IGROUPS_PATH}/{uuid}")).query("fields", DEFAULT_FIELDS),
            )
            .await?;
        Ok(parse_record::<IgroupRecord>(&resp.body)?.into())
    }

    /// Add one or more initiators, then return the updated igroup.
    ///
    /// Duplicates are sent as given; the cluster decides how to treat them.
    /// `POST /protocols/san/igroups/{uuid}/initiators`
    pub async fn igroup_add_initiators(
        &self,
        uuid: &str,
        initiators: &[String],
    ) -> Result<Igroup, Error> {
        if uuid.trim().is_empty() {
            return Err(Error::Validation {
                field: "igroup uuid".into(),
                reason: "must not be empty".into(),
            });
        }
        if initiators.is_empty() {
            return Err(Error::Validation {
                field: "initiator".into(),
                reason: "at least one initiator is required".into(),
            });
        }

        debug!(uuid, count = initiators.len(), "adding initiators");
        let body = json!({ "records": name_records(initiators) });
        self.request(ApiRequest::post(format!("{IGROUPS_PATH}/{uuid}/initiators")).json(&body)?)
            .await?;

        self.igroup_get(uuid).await
    }

    /// List igroups across every page.
    pub async fn igroup_list(&self, filter: &IgroupFilter) -> Result<Vec<Igroup>, Error> {
        let mut query = Vec::new();
        if let Some((ref field, ref value)) = filter.query {
            query.push((field.clone(), value.clone()));
        }
        query.push((
            "fields".to_owned(),
            filter
                .fields
                .clone()
                .unwrap_or_else(|| DEFAULT_FIELDS.to_owned()),
        ));
        push_max_records(&mut query, filter.max_records);

        debug!("listing igroups");
        let records: Vec<IgroupRecord> = self.collect_records(IGROUPS_PATH, query).await?;
        Ok(records.into_iter().map(Igroup::from).collect())
    }
}
