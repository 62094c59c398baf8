use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A volume: a directory under the configured volumes root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<VolumeAttribute>,
}

impl Volume {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Value of the attribute called `name`, if the appliance reported one.
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

/// A single `?metadata` attribute of a namespace object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttribute {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Kind of quota domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotaType {
    Directory,
    User,
    Group,
    DefaultUser,
    DefaultGroup,
    #[serde(other)]
    Other,
}

/// Thresholds and their exceeded state as reported by the appliance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaThresholds {
    #[serde(default)]
    pub advisory: Option<i64>,
    #[serde(default)]
    pub advisory_exceeded: bool,
    #[serde(default)]
    pub soft: Option<i64>,
    #[serde(default)]
    pub soft_exceeded: bool,
    #[serde(default)]
    pub hard: Option<i64>,
    #[serde(default)]
    pub hard_exceeded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaUsage {
    #[serde(default)]
    pub inodes: i64,
    #[serde(default)]
    pub logical: i64,
    #[serde(default)]
    pub physical: i64,
}

/// A SmartQuotas quota on a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    pub id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub quota_type: QuotaType,
    #[serde(default)]
    pub enforced: bool,
    #[serde(default)]
    pub container: bool,
    #[serde(default)]
    pub include_snapshots: bool,
    #[serde(default)]
    pub thresholds_include_overhead: bool,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub thresholds: QuotaThresholds,
    #[serde(default)]
    pub usage: QuotaUsage,
}

/// A point-in-time snapshot of a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub name: String,
    pub path: String,
    /// Unix seconds.
    #[serde(default)]
    pub created: i64,
    /// Unix seconds, absent when the snapshot never expires.
    #[serde(default)]
    pub expires: Option<i64>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub has_locks: bool,
    #[serde(default)]
    pub pct_filesystem: f64,
    #[serde(default)]
    pub pct_reserve: f64,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub shadow_bytes: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub target_id: Option<i64>,
    #[serde(default)]
    pub target_name: Option<String>,
}

impl Snapshot {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires
            .filter(|&t| t > 0)
            .and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

/// How an ACL update is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Update,
    Replace,
}

/// Which permission model is authoritative for the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthoritativeType {
    Acl,
    Mode,
}

/// Prefix of a serialized persona id (`USER:alice`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaIdType {
    User,
    Group,
    Uid,
    Gid,
    Sid,
}

impl PersonaIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaIdType::User => "USER",
            PersonaIdType::Group => "GROUP",
            PersonaIdType::Uid => "UID",
            PersonaIdType::Gid => "GID",
            PersonaIdType::Sid => "SID",
        }
    }
}

impl FromStr for PersonaIdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(PersonaIdType::User),
            "GROUP" => Ok(PersonaIdType::Group),
            "UID" => Ok(PersonaIdType::Uid),
            "GID" => Ok(PersonaIdType::Gid),
            "SID" => Ok(PersonaIdType::Sid),
            other => Err(format!("unknown persona id type {other:?}")),
        }
    }
}

/// Persona identifier, carried on the wire as `"TYPE:id"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaId {
    pub id: String,
    pub id_type: PersonaIdType,
}

impl PersonaId {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            id: name.into(),
            id_type: PersonaIdType::User,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            id: name.into(),
            id_type: PersonaIdType::Group,
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id_type.as_str(), self.id)
    }
}

impl FromStr for PersonaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("persona id {s:?} has no type prefix"))?;
        Ok(Self {
            id: id.to_string(),
            id_type: kind.parse()?,
        })
    }
}

impl Serialize for PersonaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PersonaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaType {
    User,
    Group,
    Wellknown,
}

/// A user or group as referenced by an ACL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<PersonaId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub persona_type: Option<PersonaType>,
}

impl Persona {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            id: Some(PersonaId::user(name)),
            ..Default::default()
        }
    }
}

/// POSIX permission bits, carried on the wire as an octal string (`"0755"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileMode(pub u32);

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl FromStr for FileMode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s.trim(), 8).map(FileMode)
    }
}

impl Serialize for FileMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Owner, group and mode of a namespace object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub action: Option<AclAction>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authoritative: Option<AuthoritativeType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<Persona>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group: Option<Persona>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mode: Option<FileMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_id_wire_format() {
        let id = PersonaId::user("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""USER:alice""#);

        let parsed: PersonaId = serde_json::from_str(r#""UID:0""#).unwrap();
        assert_eq!(parsed.id_type, PersonaIdType::Uid);
        assert_eq!(parsed.id, "0");

        assert!(serde_json::from_str::<PersonaId>(r#""nobody""#).is_err());
    }

    #[test]
    fn test_file_mode_octal() {
        assert_eq!(FileMode(0o777).to_string(), "0777");
        assert_eq!(FileMode(0o55).to_string(), "0055");
        let mode: FileMode = serde_json::from_str(r#""0750""#).unwrap();
        assert_eq!(mode, FileMode(0o750));
        assert!("0799".parse::<FileMode>().is_err());
    }

    #[test]
    fn test_acl_serialization_skips_unset() {
        let acl = Acl {
            action: Some(AclAction::Replace),
            authoritative: Some(AuthoritativeType::Mode),
            mode: Some(FileMode(0o755)),
            ..Default::default()
        };
        let json = serde_json::to_value(&acl).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "replace", "authoritative": "mode", "mode": "0755"})
        );
    }

    #[test]
    fn test_quota_deserialization() {
        let quota: Quota = serde_json::from_str(
            r#"{"id":"AbC123","path":"/ifs/volumes/v1","type":"directory","enforced":true,
                "container":true,"thresholds":{"advisory":null,"hard":1024,"soft":null,"hard_exceeded":false},
                "usage":{"inodes":3,"logical":10,"physical":2048},"linked":null}"#,
        )
        .unwrap();
        assert_eq!(quota.quota_type, QuotaType::Directory);
        assert_eq!(quota.thresholds.hard, Some(1024));
        assert_eq!(quota.thresholds.soft, None);
        assert_eq!(quota.usage.physical, 2048);
    }

    #[test]
    fn test_unknown_quota_type() {
        let t: QuotaType = serde_json::from_str(r#""something-new""#).unwrap();
        assert_eq!(t, QuotaType::Other);
        let t: QuotaType = serde_json::from_str(r#""default-user""#).unwrap();
        assert_eq!(t, QuotaType::DefaultUser);
    }

    #[test]
    fn test_snapshot_timestamps() {
        let snap = Snapshot {
            id: 7,
            name: "nightly".to_string(),
            path: "/ifs/volumes/v1".to_string(),
            created: 1_700_000_000,
            expires: Some(0),
            ..Default::default()
        };
        assert_eq!(snap.created_at().unwrap().timestamp(), 1_700_000_000);
        assert!(snap.expires_at().is_none());
    }

    #[test]
    fn test_volume_attribute_lookup() {
        let volume = Volume {
            name: "v1".to_string(),
            attributes: vec![VolumeAttribute {
                name: "owner".to_string(),
                value: serde_json::json!("root"),
            }],
        };
        assert_eq!(volume.attribute("owner"), Some(&serde_json::json!("root")));
        assert!(volume.attribute("mode").is_none());
    }
}
