use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used when a province code has no known name.
pub const UNKNOWN_PROVINCE: &str = "Unknown";

/// Two-digit BPS province code restricted to the `11..=97` range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProvinceId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a two-digit BPS province code between 11 and 97")]
pub struct InvalidProvinceId(pub String);

impl ProvinceId {
    pub const MIN_CODE: u8 = 11;
    pub const MAX_CODE: u8 = 97;

    pub fn parse(raw: &str) -> Result<Self, InvalidProvinceId> {
        let invalid = || InvalidProvinceId(raw.to_string());

        if raw.len() != 2 || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let code: u8 = raw.parse().map_err(|_| invalid())?;
        if (Self::MIN_CODE..=Self::MAX_CODE).contains(&code) {
            Ok(Self(raw.to_string()))
        } else {
            Err(invalid())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProvinceId {
    type Err = InvalidProvinceId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for ProvinceId {
    type Error = InvalidProvinceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProvinceId> for String {
    fn from(value: ProvinceId) -> Self {
        value.0
    }
}

impl fmt::Display for ProvinceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display-name lookup for province codes. Never part of score computation.
#[async_trait]
pub trait ProvinceDirectory: Send + Sync {
    async fn resolve_name(&self, province_id: &str) -> Option<String>;
}

/// Official BPS province codes, including the 2022 Papua splits.
const BPS_PROVINCES: [(&str, &str); 38] = [
    ("11", "Aceh"),
    ("12", "Sumatera Utara"),
    ("13", "Sumatera Barat"),
    ("14", "Riau"),
    ("15", "Jambi"),
    ("16", "Sumatera Selatan"),
    ("17", "Bengkulu"),
    ("18", "Lampung"),
    ("19", "Kepulauan Bangka Belitung"),
    ("21", "Kepulauan Riau"),
    ("31", "DKI Jakarta"),
    ("32", "Jawa Barat"),
    ("33", "Jawa Tengah"),
    ("34", "DI Yogyakarta"),
    ("35", "Jawa Timur"),
    ("36", "Banten"),
    ("51", "Bali"),
    ("52", "Nusa Tenggara Barat"),
    ("53", "Nusa Tenggara Timur"),
    ("61", "Kalimantan Barat"),
    ("62", "Kalimantan Tengah"),
    ("63", "Kalimantan Selatan"),
    ("64", "Kalimantan Timur"),
    ("65", "Kalimantan Utara"),
    ("71", "Sulawesi Utara"),
    ("72", "Sulawesi Tengah"),
    ("73", "Sulawesi Selatan"),
    ("74", "Sulawesi Tenggara"),
    ("75", "Gorontalo"),
    ("76", "Sulawesi Barat"),
    ("81", "Maluku"),
    ("82", "Maluku Utara"),
    ("91", "Papua Barat"),
    ("92", "Papua Barat Daya"),
    ("94", "Papua"),
    ("95", "Papua Selatan"),
    ("96", "Papua Tengah"),
    ("97", "Papua Pegunungan"),
];

/// Static directory backed by the BPS coding table.
#[derive(Debug, Default, Clone, Copy)]
pub struct BpsProvinceDirectory;

impl BpsProvinceDirectory {
    pub fn lookup(province_id: &str) -> Option<&'static str> {
        BPS_PROVINCES
            .iter()
            .find(|(code, _)| *code == province_id)
            .map(|(_, name)| *name)
    }
}

#[async_trait]
impl ProvinceDirectory for BpsProvinceDirectory {
    async fn resolve_name(&self, province_id: &str) -> Option<String> {
        Self::lookup(province_id).map(str::to_string)
    }
}
