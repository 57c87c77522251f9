// LUN map endpoints
//
// `POST/GET /api/protocols/san/lun-maps`,
// `DELETE /api/protocols/san/lun-maps/{lun.uuid}/{igroup.uuid}`
//
// A mapping has no identity of its own: it is addressed by the
// (LUN, igroup) pair.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::models::{NamedRef, OsType, Protocol, ResourceRef, fill_missing, push_max_records};
use crate::client::{ApiRequest, OntapClient, parse_record};
use crate::error::Error;

const LUN_MAPS_PATH: &str = "/protocols/san/lun-maps";
const DEFAULT_FIELDS: &str = "svm.name,lun.name,lun.uuid,lun.node.name,igroup.name,igroup.uuid,\
     igroup.os_type,igroup.protocol,logical_unit_number";

/// One end of a mapping as reported by the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapEndpoint {
    pub name: String,
    pub uuid: String,
}

/// A LUN-to-igroup mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LunMap {
    pub svm: String,
    pub lun: MapEndpoint,
    pub igroup: MapEndpoint,
    /// The LUN ID hosts see; assigned by the cluster unless requested.
    pub logical_unit_number: Option<u32>,
    /// Node currently hosting the LUN.
    pub node: Option<String>,
    pub igroup_os_type: Option<OsType>,
    pub igroup_protocol: Option<Protocol>,
}

/// Parameters for [`OntapClient::lun_map_create`].
#[derive(Debug, Clone)]
pub struct LunMapSpec {
    pub svm: String,
    pub igroup: ResourceRef,
    pub lun: ResourceRef,
    pub logical_unit_number: Option<u32>,
}

/// Filters for [`OntapClient::lun_map_list`].
#[derive(Debug, Clone, Default)]
pub struct LunMapFilter {
    pub svm: Option<String>,
    pub igroup: Option<ResourceRef>,
    pub lun: Option<ResourceRef>,
    pub max_records: Option<u32>,
}

// ── Wire shape ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LunMapRecord {
    #[serde(default)]
    svm: NamedRef,
    lun: MapLun,
    igroup: MapIgroup,
    #[serde(default)]
    logical_unit_number: Option<u32>,
}

#[derive(Deserialize)]
struct MapLun {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    node: NamedRef,
}

#[derive(Deserialize)]
struct MapIgroup {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    os_type: Option<OsType>,
    #[serde(default)]
    protocol: Option<Protocol>,
}

impl From<LunMapRecord> for LunMap {
    fn from(r: LunMapRecord) -> Self {
        Self {
            svm: r.svm.name_or_default(),
            lun: MapEndpoint {
                name: r.lun.name.unwrap_or_default(),
                uuid: r.lun.uuid.unwrap_or_default(),
            },
            igroup: MapEndpoint {
                name: r.igroup.name.unwrap_or_default(),
                uuid: r.igroup.uuid.unwrap_or_default(),
            },
            logical_unit_number: r.logical_unit_number,
            node: r.lun.node.name,
            igroup_os_type: r.igroup.os_type,
            igroup_protocol: r.igroup.protocol,
        }
    }
}

impl OntapClient {
    /// Map a LUN to an igroup. Either side may be given by name/path or UUID.
    ///
    /// `POST /protocols/san/lun-maps?return_records=true`
    pub async fn lun_map_create(&self, spec: &LunMapSpec) -> Result<LunMap, Error> {
        if spec.svm.trim().is_empty() {
            return Err(Error::Validation {
                field: "svm".into(),
                reason: "must not be empty".into(),
            });
        }
        check_ref("lun", &spec.lun)?;
        check_ref("igroup", &spec.igroup)?;

        let mut body = json!({
            "svm": { "name": spec.svm },
            "igroup": spec.igroup,
            "lun": spec.lun,
        });
        if let Some(id) = spec.logical_unit_number {
            body["logical_unit_number"] = json!(id);
        }

        debug!(lun = %spec.lun, igroup = %spec.igroup, "creating LUN map");
        let resp = self
            .request(
                ApiRequest::post(LUN_MAPS_PATH)
                    .query("return_records", "true")
                    .json(&body)?,
            )
            .await?;

        let mut record = resp.into_created_record();
        fill_missing(&mut record, &body);
        Ok(parse_record::<LunMapRecord>(&record)?.into())
    }

    /// List mappings across every page.
    pub async fn lun_map_list(&self, filter: &LunMapFilter) -> Result<Vec<LunMap>, Error> {
        let mut query = Vec::new();
        if let Some(ref svm) = filter.svm {
            query.push(("svm.name".to_owned(), svm.clone()));
        }
        if let Some(ref igroup) = filter.igroup {
            query.push(igroup.filter("igroup"));
        }
        if let Some(ref lun) = filter.lun {
            query.push(lun.filter("lun"));
        }
        query.push(("fields".to_owned(), DEFAULT_FIELDS.to_owned()));
        push_max_records(&mut query, filter.max_records);

        debug!("listing LUN maps");
        let records: Vec<LunMapRecord> = self.collect_records(LUN_MAPS_PATH, query).await?;
        Ok(records.into_iter().map(LunMap::from).collect())
    }

    /// Remove the mapping between `lun` and `igroup`.
    ///
    /// Names are resolved to UUIDs first; a pair that is not mapped yields
    /// [`Error::NotFound`] without issuing the DELETE.
    pub async fn lun_map_delete(&self, lun: &ResourceRef, igroup: &ResourceRef) -> Result<(), Error> {
        check_ref("lun", lun)?;
        check_ref("igroup", igroup)?;

        let (lun_uuid, igroup_uuid) = match (lun, igroup) {
            (ResourceRef::Uuid(l), ResourceRef::Uuid(i)) => (l.to_string(), i.to_string()),
            _ => self.resolve_lun_map(lun, igroup).await?,
        };

        debug!(%lun_uuid, %igroup_uuid, "deleting LUN map");
        self.request(ApiRequest::delete(format!(
            "{LUN_MAPS_PATH}/{lun_uuid}/{igroup_uuid}"
        )))
        .await?;
        Ok(())
    }

    /// Look up the UUID pair of an existing mapping.
    async fn resolve_lun_map(
        &self,
        lun: &ResourceRef,
        igroup: &ResourceRef,
    ) -> Result<(String, String), Error> {
        let query = vec![
            lun.filter("lun"),
            igroup.filter("igroup"),
            ("fields".to_owned(), "lun.uuid,igroup.uuid".to_owned()),
        ];
        let records: Vec<LunMapRecord> = self.collect_records(LUN_MAPS_PATH, query).await?;

        let record = records.into_iter().next().ok_or_else(|| Error::NotFound {
            message: format!("LUN '{lun}' is not mapped to igroup '{igroup}'"),
        })?;

        match (record.lun.uuid, record.igroup.uuid) {
            (Some(l), Some(i)) => Ok((l, i)),
            _ => Err(Error::Parse {
                message: "LUN map record is missing lun.uuid or igroup.uuid".into(),
                body: String::new(),
            }),
        }
    }
}

fn check_ref(field: &str, r: &ResourceRef) -> Result<(), Error> {
    if r.is_empty() {
        return Err(Error::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_flattens_nested_refs() {
        let record = json!({
            "svm": { "name": "svm1" },
            "lun": { "name": "/vol/vol1/lun1", "uuid": "l-1", "node": { "name": "node-01" } },
            "igroup": { "name": "ig1", "uuid": "i-1", "os_type": "linux", "protocol": "mixed" },
            "logical_unit_number": 3
        });
        let map: LunMap = parse_record::<LunMapRecord>(&record).unwrap().into();
        assert_eq!(map.lun.name, "/vol/vol1/lun1");
        assert_eq!(map.igroup.uuid, "i-1");
        assert_eq!(map.logical_unit_number, Some(3));
        assert_eq!(map.node.as_deref(), Some("node-01"));
        assert_eq!(map.igroup_os_type, Some(OsType::Linux));
        assert_eq!(map.igroup_protocol, Some(Protocol::Mixed));
    }

    #[test]
    fn record_without_endpoints_is_parse_error() {
        let record = json!({ "svm": { "name": "svm1" }, "logical_unit_number": 0 });
        assert!(matches!(
            parse_record::<LunMapRecord>(&record).err(),
            Some(Error::Parse { .. })
        ));
    }
}
