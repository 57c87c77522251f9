// Shared SAN model types
//
// Enums and reference types used by more than one resource module, plus
// the small wire structs that appear nested in every ONTAP record.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, VariantNames};
use uuid::Uuid;

/// Host operating system of a LUN or igroup.
///
/// Values the client does not know deserialize as [`OsType::Unknown`]
/// so a newer cluster never fails a whole listing. `Unknown` is never
/// accepted from user input.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OsType {
    Aix,
    Hpux,
    #[serde(rename = "hyper_v", alias = "hyperv")]
    #[strum(to_string = "hyper_v")]
    HyperV,
    Linux,
    Netware,
    Openvms,
    Solaris,
    SolarisEfi,
    Vmware,
    Windows,
    #[serde(rename = "windows_2008")]
    #[strum(serialize = "windows_2008")]
    Windows2008,
    WindowsGpt,
    Xen,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FromStr for OsType {
    type Err = strum::ParseError;

    /// Case-insensitive ONTAP spelling (`hyperv` is accepted for `hyper_v`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("hyperv") {
            return Ok(Self::HyperV);
        }
        Self::iter()
            .filter(|os| *os != Self::Unknown)
            .find(|os| os.to_string().eq_ignore_ascii_case(s))
            .ok_or(strum::ParseError::VariantNotFound)
    }
}

/// SAN protocol an igroup's initiators speak.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Protocol {
    Iscsi,
    Fcp,
    Mixed,
}

/// A user-supplied reference to a LUN or igroup.
///
/// Anything that parses as a UUID is sent as `{"uuid": ...}`; everything
/// else is treated as a name (or LUN path) and sent as `{"name": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceRef {
    Uuid(Uuid),
    Name(String),
}

impl ResourceRef {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        Uuid::parse_str(raw).map_or_else(|_| Self::Name(raw.to_owned()), Self::Uuid)
    }

    /// The ONTAP query filter for this reference under `prefix`
    /// (e.g. `lun.name=/vol/v1/l1` or `igroup.uuid=...`).
    pub(crate) fn filter(&self, prefix: &str) -> (String, String) {
        match self {
            Self::Uuid(id) => (format!("{prefix}.uuid"), id.to_string()),
            Self::Name(name) => (format!("{prefix}.name"), name.clone()),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Self::Name(name) if name.is_empty())
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for ResourceRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ResourceRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

// ── Nested wire shapes ───────────────────────────────────────────────

/// `{ "name": ..., "uuid": ... }`, the shape ONTAP uses for every
/// embedded reference (svm, volume, igroup, lun, node).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl NamedRef {
    pub fn name_or_default(self) -> String {
        self.name.unwrap_or_default()
    }
}

/// Copy into `target` every field of `source` that `target` lacks,
/// recursing into nested objects.
///
/// Create calls use this to complete a sparse `return_records` response
/// with the values that were just sent.
pub(crate) fn fill_missing(target: &mut Value, source: &Value) {
    let (Value::Object(target), Value::Object(source)) = (target, source) else {
        return;
    };
    for (key, value) in source {
        match target.get_mut(key) {
            Some(existing) => fill_missing(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Append `max_records` to a query when a page size was requested.
pub(crate) fn push_max_records(query: &mut Vec<(String, String)>, max_records: Option<u32>) {
    if let Some(n) = max_records {
        query.push(("max_records".into(), n.to_string()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn os_type_round_trips_ontap_spelling() {
        assert_eq!("linux".parse::<OsType>().unwrap(), OsType::Linux);
        assert_eq!("hyperv".parse::<OsType>().unwrap(), OsType::HyperV);
        assert_eq!("VMware".parse::<OsType>().unwrap(), OsType::Vmware);
        assert_eq!(OsType::HyperV.to_string(), "hyper_v");
        assert_eq!(OsType::Windows2008.to_string(), "windows_2008");
        assert_eq!(json!(OsType::SolarisEfi), json!("solaris_efi"));
    }

    #[test]
    fn unknown_os_type_does_not_fail_parsing() {
        let os: OsType = serde_json::from_value(json!("plan9")).unwrap();
        assert_eq!(os, OsType::Unknown);
        assert!("plan9".parse::<OsType>().is_err());
    }

    #[test]
    fn unknown_is_not_accepted_from_input() {
        assert!("unknown".parse::<OsType>().is_err());
        assert!("Unknown".parse::<OsType>().is_err());
        assert_eq!(OsType::Unknown.to_string(), "unknown");
    }

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!("ISCSI".parse::<Protocol>().unwrap(), Protocol::Iscsi);
        assert_eq!(json!(Protocol::Fcp), json!("fcp"));
        assert!("nvme".parse::<Protocol>().is_err());
    }

    #[test]
    fn resource_ref_detects_uuid() {
        let id = "4ea7a442-86d1-11e0-ae1c-123478563412";
        assert_eq!(json!(ResourceRef::parse(id)), json!({"uuid": id}));
        assert_eq!(
            json!(ResourceRef::parse("/vol/vol1/lun1")),
            json!({"name": "/vol/vol1/lun1"})
        );
        assert_eq!(
            ResourceRef::parse("ig1").filter("igroup"),
            ("igroup.name".to_owned(), "ig1".to_owned())
        );
    }

    #[test]
    fn fill_missing_keeps_server_values() {
        let mut record = json!({"uuid": "u1", "svm": {"uuid": "s1"}, "os_type": "vmware"});
        let sent = json!({"name": "/vol/v/l", "svm": {"name": "svm1"}, "os_type": "linux"});
        fill_missing(&mut record, &sent);
        assert_eq!(
            record,
            json!({
                "uuid": "u1",
                "name": "/vol/v/l",
                "svm": {"uuid": "s1", "name": "svm1"},
                "os_type": "vmware"
            })
        );
    }
}
