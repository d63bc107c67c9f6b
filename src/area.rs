//! Bidding zones, control areas and countries known to the platform.
//!
//! The registry is immutable and built once per process; every lookup is an
//! exact match on either the canonical name (`"DE_LU"`) or the EIC code
//! (`"10Y1001A1001A82H"`).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono_tz::Asia::Nicosia;
use chrono_tz::Europe::{
    Amsterdam, Athens, Belgrade, Berlin, Bratislava, Brussels, Bucharest, Budapest, Copenhagen,
    Dublin, Helsinki, Istanbul, Kiev, Lisbon, Ljubljana, London, Luxembourg, Madrid, Malta, Minsk,
    Moscow, Oslo, Paris, Podgorica, Prague, Riga, Rome, Sarajevo, Skopje, Sofia, Stockholm, Tallinn,
    Tirane, Vienna, Vilnius, Warsaw, Zagreb, Zurich,
};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A resolved area: canonical name, EIC code and local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Area {
    name: &'static str,
    code: &'static str,
    #[serde(serialize_with = "serialize_tz")]
    tz: Tz,
    meaning: &'static str,
}

impl Area {
    const fn new(name: &'static str, code: &'static str, tz: Tz, meaning: &'static str) -> Self {
        Self { name, code, tz, meaning }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// EIC code sent on the wire.
    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn meaning(&self) -> &'static str {
        self.meaning
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn serialize_tz<S: Serializer>(tz: &Tz, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(tz.name())
}

/// Either a raw identifier or an already-resolved [`Area`].
#[derive(Debug, Clone, Copy)]
pub enum AreaRef<'a> {
    Key(&'a str),
    Resolved(Area),
}

impl<'a> From<&'a str> for AreaRef<'a> {
    fn from(value: &'a str) -> Self {
        AreaRef::Key(value)
    }
}

impl<'a> From<&'a String> for AreaRef<'a> {
    fn from(value: &'a String) -> Self {
        AreaRef::Key(value.as_str())
    }
}

impl From<Area> for AreaRef<'_> {
    fn from(value: Area) -> Self {
        AreaRef::Resolved(value)
    }
}

impl From<&Area> for AreaRef<'_> {
    fn from(value: &Area) -> Self {
        AreaRef::Resolved(*value)
    }
}

static BUILTIN: OnceLock<Arc<AreaRegistry>> = OnceLock::new();

#[derive(Debug)]
pub struct AreaRegistry {
    areas: Vec<Area>,
    index: HashMap<&'static str, usize>,
    neighbours: HashMap<&'static str, Vec<&'static str>>,
}

impl AreaRegistry {
    fn from_tables(areas: &[Area], neighbours: &[(&'static str, &[&'static str])]) -> Self {
        let mut index = HashMap::with_capacity(areas.len() * 2);
        for (i, a) in areas.iter().enumerate() {
            index.insert(a.name, i);
            index.entry(a.code).or_insert(i);
        }
        let neighbours = neighbours
            .iter()
            .map(|(name, ns)| (*name, ns.to_vec()))
            .collect();
        Self {
            areas: areas.to_vec(),
            index,
            neighbours,
        }
    }

    /// The registry shipped with the crate.
    pub fn builtin() -> Arc<Self> {
        BUILTIN
            .get_or_init(|| Arc::new(Self::from_tables(AREAS, NEIGHBOURS)))
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<&Area> {
        self.index.get(key).map(|&i| &self.areas[i])
    }

    pub fn resolve<'a>(&self, area: impl Into<AreaRef<'a>>) -> Result<Area> {
        match area.into() {
            AreaRef::Resolved(a) => Ok(a),
            AreaRef::Key(key) => self
                .get(key)
                .copied()
                .ok_or_else(|| Error::UnknownArea(key.to_string())),
        }
    }

    /// Areas sharing a border with `area`, in registry order of the adjacency table.
    pub fn neighbours(&self, area: &Area) -> Vec<Area> {
        self.neighbours
            .get(area.name)
            .map(|ns| ns.iter().filter_map(|n| self.get(n).copied()).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

const AREAS: &[Area] = &[
    Area::new("DE_50HZ", "10YDE-VE-------2", Berlin, "50Hertz CA, DE(50HzT) BZA"),
    Area::new("AL", "10YAL-KESH-----5", Tirane, "Albania, OST BZ / CA / MBA"),
    Area::new("DE_AMPRION", "10YDE-RWENET---I", Berlin, "Amprion CA"),
    Area::new("AT", "10YAT-APG------L", Vienna, "Austria, APG BZ / CA / MBA"),
    Area::new("BY", "10Y1001A1001A51S", Minsk, "Belarus BZ / CA / MBA"),
    Area::new("BE", "10YBE----------2", Brussels, "Belgium, Elia BZ / CA / MBA"),
    Area::new("BA", "10YBA-JPCC-----D", Sarajevo, "Bosnia Herzegovina, NOS BiH BZ / CA / MBA"),
    Area::new("BG", "10YCA-BULGARIA-R", Sofia, "Bulgaria, ESO BZ / CA / MBA"),
    Area::new("HR", "10YHR-HEP------M", Zagreb, "Croatia, HOPS BZ / CA / MBA"),
    Area::new("CY", "10YCY-1001A0003J", Nicosia, "Cyprus, Cyprus TSO BZ / CA / MBA"),
    Area::new("CZ", "10YCZ-CEPS-----N", Prague, "Czech Republic, CEPS BZ / CA/ MBA"),
    Area::new("DE_AT_LU", "10Y1001A1001A63L", Berlin, "DE-AT-LU BZ"),
    Area::new("DE_LU", "10Y1001A1001A82H", Berlin, "DE-LU BZ / MBA"),
    Area::new("DK", "10Y1001A1001A65H", Copenhagen, "Denmark"),
    Area::new("DK_1", "10YDK-1--------W", Copenhagen, "DK1 BZ / MBA"),
    Area::new("DK_2", "10YDK-2--------M", Copenhagen, "DK2 BZ / MBA"),
    Area::new("EE", "10Y1001A1001A39I", Tallinn, "Estonia, Elering BZ / CA / MBA"),
    Area::new("FI", "10YFI-1--------U", Helsinki, "Finland, Fingrid BZ / CA / MBA"),
    Area::new("MK", "10YMK-MEPSO----8", Skopje, "Former Yugoslav Republic of Macedonia, MEPSO BZ / CA / MBA"),
    Area::new("FR", "10YFR-RTE------C", Paris, "France, RTE BZ / CA / MBA"),
    Area::new("DE", "10Y1001A1001A83F", Berlin, "Germany"),
    Area::new("GR", "10YGR-HTSO-----Y", Athens, "Greece, IPTO BZ / CA/ MBA"),
    Area::new("HU", "10YHU-MAVIR----U", Budapest, "Hungary, MAVIR CA / BZ / MBA"),
    Area::new("IE_SEM", "10Y1001A1001A59C", Dublin, "Ireland + Northern Ireland BZ / MBA"),
    Area::new("IE", "10YIE-1001A00010", Dublin, "Ireland, EirGrid CA"),
    Area::new("IT", "10YIT-GRTN-----B", Rome, "Italy, IT CA / MBA"),
    Area::new("IT_SARD", "10Y1001A1001A74G", Rome, "IT-Sardinia BZ"),
    Area::new("IT_SICI", "10Y1001A1001A75E", Rome, "IT-Sicily BZ"),
    Area::new("IT_CNOR", "10Y1001A1001A70O", Rome, "IT-Centre-North BZ"),
    Area::new("IT_CSUD", "10Y1001A1001A71M", Rome, "IT-Centre-South BZ"),
    Area::new("IT_NORD", "10Y1001A1001A73I", Rome, "IT-North BZ"),
    Area::new("IT_SUD", "10Y1001A1001A788", Rome, "IT-South BZ"),
    Area::new("LV", "10YLV-1001A00074", Riga, "Latvia, AST BZ / CA / MBA"),
    Area::new("LT", "10YLT-1001A0008Q", Vilnius, "Lithuania, Litgrid BZ / CA / MBA"),
    Area::new("LU", "10YLU-CEGEDEL-NQ", Luxembourg, "Luxembourg, CREOS CA"),
    Area::new("MT", "10Y1001A1001A93C", Malta, "Malta, Malta BZ / CA / MBA"),
    Area::new("ME", "10YCS-CG-TSO---S", Podgorica, "Montenegro, CGES BZ / CA / MBA"),
    Area::new("GB", "10YGB----------A", London, "National Grid BZ / CA/ MBA"),
    Area::new("NL", "10YNL----------L", Amsterdam, "Netherlands, TenneT NL BZ / CA/ MBA"),
    Area::new("NO_1", "10YNO-1--------2", Oslo, "NO1 BZ / MBA"),
    Area::new("NO_2", "10YNO-2--------T", Oslo, "NO2 BZ / MBA"),
    Area::new("NO_3", "10YNO-3--------J", Oslo, "NO3 BZ / MBA"),
    Area::new("NO_4", "10YNO-4--------9", Oslo, "NO4 BZ / MBA"),
    Area::new("NO_5", "10Y1001A1001A48H", Oslo, "NO5 BZ / MBA"),
    Area::new("NO", "10YNO-0--------C", Oslo, "Norway, Norway MBA, Stattnet CA"),
    Area::new("PL", "10YPL-AREA-----S", Warsaw, "Poland, PSE SA BZ / BZA / CA / MBA"),
    Area::new("PT", "10YPT-REN------W", Lisbon, "Portugal, REN BZ / CA / MBA"),
    Area::new("RO", "10YRO-TEL------P", Bucharest, "Romania, Transelectrica BZ / CA/ MBA"),
    Area::new("RU", "10Y1001A1001A49F", Moscow, "Russia BZ / CA / MBA"),
    Area::new("SE_1", "10Y1001A1001A44P", Stockholm, "SE1 BZ / MBA"),
    Area::new("SE_2", "10Y1001A1001A45N", Stockholm, "SE2 BZ / MBA"),
    Area::new("SE_3", "10Y1001A1001A46L", Stockholm, "SE3 BZ / MBA"),
    Area::new("SE_4", "10Y1001A1001A47J", Stockholm, "SE4 BZ / MBA"),
    Area::new("SE", "10YSE-1--------K", Stockholm, "Sweden, Sweden MBA, SvK CA"),
    Area::new("RS", "10YCS-SERBIATSOV", Belgrade, "Serbia, EMS BZ / CA / MBA"),
    Area::new("SK", "10YSK-SEPS-----K", Bratislava, "Slovakia, SEPS BZ / CA / MBA"),
    Area::new("SI", "10YSI-ELES-----O", Ljubljana, "Slovenia, ELES BZ / CA / MBA"),
    Area::new("ES", "10YES-REE------0", Madrid, "Spain, REE BZ / CA / MBA"),
    Area::new("CH", "10YCH-SWISSGRIDZ", Zurich, "Switzerland, Swissgrid BZ / CA / MBA"),
    Area::new("DE_TENNET", "10YDE-EON------1", Berlin, "TenneT GER CA"),
    Area::new("DE_TRANSNET", "10YDE-ENBW-----N", Berlin, "TransnetBW CA"),
    Area::new("TR", "10YTR-TEIAS----W", Istanbul, "Turkey BZ / CA / MBA"),
    Area::new("UA", "10Y1001C--00003F", Kiev, "Ukraine, Ukraine BZ, MBA"),
    Area::new("UA_IPS", "10Y1001C--000182", Kiev, "Ukraine IPS CTA"),
];

const NEIGHBOURS: &[(&str, &[&str])] = &[
    ("BE", &["FR", "DE_LU", "NL", "GB"]),
    ("NL", &["BE", "DE_LU", "GB", "NO_2", "DK_1"]),
    ("DE_LU", &["AT", "BE", "CH", "CZ", "DK_1", "DK_2", "FR", "NO_2", "NL", "PL", "SE_4"]),
    ("FR", &["BE", "CH", "DE_LU", "ES", "GB", "IT_NORD"]),
    ("CH", &["AT", "DE_LU", "FR", "IT_NORD"]),
    ("AT", &["CH", "CZ", "DE_LU", "HU", "IT_NORD", "SI"]),
    ("CZ", &["AT", "DE_LU", "PL", "SK"]),
    ("GB", &["BE", "FR", "IE_SEM", "NL", "NO_2"]),
    ("NO_2", &["DE_LU", "DK_1", "NL", "NO_1", "NO_5", "GB"]),
    ("HU", &["AT", "HR", "RO", "RS", "SK", "SI", "UA_IPS"]),
    ("IT_NORD", &["AT", "CH", "FR", "SI", "IT_CNOR"]),
    ("ES", &["FR", "PT"]),
    ("SI", &["AT", "HR", "HU", "IT_NORD"]),
    ("RS", &["AL", "BA", "BG", "HR", "HU", "ME", "MK", "RO"]),
    ("PL", &["CZ", "DE_LU", "LT", "SE_4", "SK"]),
    ("ME", &["AL", "BA", "RS"]),
    ("DK_1", &["DE_LU", "DK_2", "NO_2", "SE_3", "NL"]),
    ("RO", &["BG", "HU", "RS", "UA_IPS"]),
    ("LT", &["BY", "LV", "PL", "RU", "SE_4"]),
    ("BG", &["GR", "MK", "RO", "RS", "TR"]),
    ("SE_3", &["DK_1", "FI", "NO_1", "SE_2", "SE_4"]),
    ("LV", &["EE", "LT", "RU"]),
    ("IE_SEM", &["GB"]),
    ("BA", &["HR", "ME", "RS"]),
    ("NO_1", &["NO_2", "NO_3", "NO_5", "SE_3"]),
    ("SE_4", &["DE_LU", "DK_2", "LT", "PL", "SE_3"]),
    ("NO_5", &["NO_1", "NO_2", "NO_3"]),
    ("SK", &["CZ", "HU", "PL", "UA_IPS"]),
    ("EE", &["FI", "LV", "RU"]),
    ("DK_2", &["DE_LU", "DK_1", "SE_4"]),
    ("FI", &["EE", "NO_4", "RU", "SE_1"]),
    ("NO_4", &["SE_2", "FI", "NO_3", "SE_1"]),
    ("SE_1", &["FI", "NO_4", "SE_2"]),
    ("SE_2", &["NO_3", "NO_4", "SE_1", "SE_3"]),
    ("PT", &["ES"]),
    ("MK", &["BG", "GR", "RS"]),
    ("GR", &["AL", "BG", "IT_SUD", "MK", "TR"]),
    ("NO_3", &["NO_1", "NO_4", "NO_5", "SE_2"]),
    ("HR", &["BA", "HU", "RS", "SI"]),
    ("AL", &["GR", "ME", "RS"]),
    ("IT_CNOR", &["IT_NORD", "IT_CSUD", "IT_SARD"]),
    ("IT_CSUD", &["IT_CNOR", "IT_SARD", "IT_SUD"]),
    ("IT_SARD", &["IT_CNOR", "IT_CSUD"]),
    ("IT_SUD", &["GR", "IT_CSUD", "IT_SICI"]),
    ("IT_SICI", &["IT_SUD", "MT"]),
    ("MT", &["IT_SICI"]),
    ("TR", &["BG", "GR"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_name_and_code() {
        let reg = AreaRegistry::builtin();
        let by_name = reg.resolve("DE_LU").unwrap();
        let by_code = reg.resolve("10Y1001A1001A82H").unwrap();
        assert_eq!(by_name, by_code);
        assert_eq!(by_name.code(), "10Y1001A1001A82H");
        assert_eq!(by_name.tz(), Berlin);
    }

    #[test]
    fn lookup_is_exact() {
        let reg = AreaRegistry::builtin();
        assert!(matches!(reg.resolve("de_lu"), Err(Error::UnknownArea(k)) if k == "de_lu"));
        assert!(reg.resolve("XX").is_err());
    }

    #[test]
    fn resolved_area_passes_through() {
        let reg = AreaRegistry::builtin();
        let be = reg.resolve("BE").unwrap();
        assert_eq!(reg.resolve(&be).unwrap(), be);
    }

    #[test]
    fn neighbours_resolve_to_areas() {
        let reg = AreaRegistry::builtin();
        let be = reg.resolve("BE").unwrap();
        let names: Vec<_> = reg.neighbours(&be).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["FR", "DE_LU", "NL", "GB"]);
    }

    #[test]
    fn every_neighbour_is_registered() {
        let reg = AreaRegistry::builtin();
        for (name, ns) in NEIGHBOURS {
            assert!(reg.get(name).is_some(), "{name}");
            for n in *ns {
                assert!(reg.get(n).is_some(), "{name} -> {n}");
            }
        }
    }

    #[test]
    fn serializes_timezone_name() {
        let reg = AreaRegistry::builtin();
        let v = serde_json::to_value(reg.resolve("FR").unwrap()).unwrap();
        assert_eq!(v["tz"], "Europe/Paris");
        assert_eq!(v["code"], "10YFR-RTE------C");
    }
}
