// LUN endpoints
//
// `POST/GET /api/storage/luns`, `DELETE /api/storage/luns/{uuid}`

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::models::{NamedRef, OsType, fill_missing, push_max_records};
use crate::client::{ApiRequest, OntapClient, parse_record};
use crate::error::Error;
use crate::size::parse_size;

const LUNS_PATH: &str = "/storage/luns";
const DEFAULT_FIELDS: &str =
    "name,uuid,svm.name,status.state,location.volume.name,space.size,os_type";

/// A LUN as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lun {
    pub uuid: String,
    /// Full path, `/vol/<volume>/<lun>`.
    pub name: String,
    pub svm: String,
    pub volume: String,
    /// Size in bytes.
    pub size: u64,
    pub os_type: OsType,
    pub state: String,
}

/// Parameters for [`OntapClient::lun_create`].
#[derive(Debug, Clone)]
pub struct LunSpec {
    pub svm: String,
    pub volume: String,
    pub name: String,
    /// Human size string, e.g. `100G`.
    pub size: String,
    pub os_type: OsType,
    pub space_reserve: bool,
}

/// Filters for [`OntapClient::lun_list`]. `None` means "don't filter".
#[derive(Debug, Clone, Default)]
pub struct LunFilter {
    pub svm: Option<String>,
    pub volume: Option<String>,
    pub name: Option<String>,
    /// Comma-separated ONTAP `fields=` override.
    pub fields: Option<String>,
    pub max_records: Option<u32>,
}

// ── Wire shape ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LunRecord {
    uuid: String,
    name: String,
    #[serde(default)]
    svm: NamedRef,
    #[serde(default)]
    location: LunLocation,
    #[serde(default)]
    space: LunSpace,
    #[serde(default)]
    status: LunStatus,
    #[serde(default)]
    os_type: OsType,
}

#[derive(Default, Deserialize)]
struct LunLocation {
    #[serde(default)]
    volume: NamedRef,
}

#[derive(Default, Deserialize)]
struct LunSpace {
    #[serde(default)]
    size: u64,
}

#[derive(Default, Deserialize)]
struct LunStatus {
    #[serde(default)]
    state: Option<String>,
}

impl From<LunRecord> for Lun {
    fn from(r: LunRecord) -> Self {
        // Fall back to the volume segment of `/vol/<volume>/<lun>`.
        let volume = r.location.volume.name.unwrap_or_else(|| {
            r.name
                .strip_prefix("/vol/")
                .and_then(|rest| rest.split('/').next())
                .unwrap_or_default()
                .to_owned()
        });

        Self {
            uuid: r.uuid,
            name: r.name,
            svm: r.svm.name_or_default(),
            volume,
            size: r.space.size,
            os_type: r.os_type,
            state: r.status.state.unwrap_or_default(),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

impl OntapClient {
    /// Create a LUN at `/vol/<volume>/<name>`.
    ///
    /// The size is validated and converted to bytes before any request is
    /// sent. `POST /storage/luns?return_records=true`
    pub async fn lun_create(&self, spec: &LunSpec) -> Result<Lun, Error> {
        require("svm", &spec.svm)?;
        require("volume", &spec.volume)?;
        require("lun", &spec.name)?;
        let size = parse_size(&spec.size)?;

        let mut body = json!({
            "name": format!("/vol/{}/{}", spec.volume, spec.name),
            "os_type": spec.os_type,
            "svm": { "name": spec.svm },
            "space": { "size": size },
        });
        if spec.space_reserve {
            body["space"]["guarantee"] = json!({ "requested": true });
        }

        debug!(path = %body["name"], size, "creating LUN");
        let resp = self
            .request(
                ApiRequest::post(LUNS_PATH)
                    .query("return_records", "true")
                    .json(&body)?,
            )
            .await?;

        let mut record = resp.into_created_record();
        fill_missing(&mut record, &body);
        Ok(parse_record::<LunRecord>(&record)?.into())
    }

    /// List LUNs across every page. A record without `uuid` or `name`
    /// fails the whole listing.
    pub async fn lun_list(&self, filter: &LunFilter) -> Result<Vec<Lun>, Error> {
        let mut query = Vec::new();
        if let Some(ref svm) = filter.svm {
            query.push(("svm.name".to_owned(), svm.clone()));
        }
        if let Some(ref volume) = filter.volume {
            query.push(("location.volume.name".to_owned(), volume.clone()));
        }
        if let Some(ref name) = filter.name {
            query.push(("name".to_owned(), name.clone()));
        }
        query.push((
            "fields".to_owned(),
            filter
                .fields
                .clone()
                .unwrap_or_else(|| DEFAULT_FIELDS.to_owned()),
        ));
        push_max_records(&mut query, filter.max_records);

        debug!("listing LUNs");
        let records: Vec<LunRecord> = self.collect_records(LUNS_PATH, query).await?;
        Ok(records.into_iter().map(Lun::from).collect())
    }

    /// Delete a LUN by UUID. An already-deleted LUN yields [`Error::NotFound`].
    pub async fn lun_delete(&self, uuid: &str) -> Result<(), Error> {
        require("uuid", uuid)?;
        debug!(uuid, "deleting LUN");
        self.request(ApiRequest::delete(format!("{LUNS_PATH}/{}", uuid.trim())))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_record_parses() {
        let record = json!({
            "uuid": "5c254d22-96a6-42ac-aad8-0cd9ebd126b6",
            "name": "/vol/vol1/lun1",
            "svm": { "name": "svm1", "uuid": "s-1" },
            "location": { "volume": { "name": "vol1" }, "logical_unit": "lun1" },
            "space": { "size": 107_374_182_400_u64 },
            "status": { "state": "online" },
            "os_type": "linux"
        });
        let lun: Lun = parse_record::<LunRecord>(&record).unwrap().into();
        assert_eq!(lun.uuid, "5c254d22-96a6-42ac-aad8-0cd9ebd126b6");
        assert_eq!(lun.svm, "svm1");
        assert_eq!(lun.volume, "vol1");
        assert_eq!(lun.size, 107_374_182_400);
        assert_eq!(lun.os_type, OsType::Linux);
        assert_eq!(lun.state, "online");
    }

    #[test]
    fn sparse_record_defaults_optional_fields() {
        let record = json!({ "uuid": "u-1", "name": "/vol/data/lun7" });
        let lun: Lun = parse_record::<LunRecord>(&record).unwrap().into();
        assert_eq!(lun.volume, "data");
        assert_eq!(lun.svm, "");
        assert_eq!(lun.size, 0);
        assert_eq!(lun.os_type, OsType::Unknown);
        assert_eq!(lun.state, "");
    }

    #[test]
    fn missing_uuid_is_parse_error() {
        let record = json!({ "name": "/vol/data/lun7" });
        let err = parse_record::<LunRecord>(&record).err().unwrap();
        assert!(matches!(err, Error::Parse { ref message, .. } if message.contains("uuid")));
    }
}
