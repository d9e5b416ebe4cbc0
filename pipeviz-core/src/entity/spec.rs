use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Genesis marker for data sets with no provenance
pub const ALPHA: &str = "α";

/// A container (host) and everything it holds
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerSpec {
    pub hostname: String,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub ipv4: Option<String>,
    /// Keyed by filesystem path
    #[serde(default)]
    pub logic_states: BTreeMap<String, LogicStateSpec>,
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
    /// Keyed by data space name
    #[serde(default)]
    pub data_spaces: BTreeMap<String, DataSpaceSpec>,
}

impl ContainerSpec {
    pub fn name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.hostname)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogicStateSpec {
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    /// Data this logic state consumes, keyed by dataset name
    #[serde(default)]
    pub datasets: BTreeMap<String, DataLinkSpec>,
}

impl LogicStateSpec {
    /// Nick if set, else the last segment of its path
    pub fn name<'a>(&'a self, path: &'a str) -> &'a str {
        if let Some(nick) = &self.nick {
            return nick;
        }
        path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataLinkSpec {
    pub loc: Loc,
    #[serde(default)]
    pub interaction: Option<String>,
    #[serde(default)]
    pub subset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessSpec {
    pub pid: u32,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    /// Paths of the logic states this process runs
    #[serde(default)]
    pub logic_states: Vec<String>,
    /// Names of the data spaces this process manages
    #[serde(default)]
    pub data_spaces: Vec<String>,
    #[serde(default)]
    pub listen: Vec<ListenSpec>,
}

impl ProcessSpec {
    pub fn name(&self) -> String {
        match &self.nick {
            Some(nick) => nick.clone(),
            None => format!("pid {}", self.pid),
        }
    }

    /// Whether this process listens where `loc` points
    pub fn serves(&self, loc: &Loc) -> bool {
        self.listen.iter().any(|listen| match listen.kind {
            ListenKind::Port => loc.port.is_some() && listen.port == loc.port,
            ListenKind::Unix => loc.path.is_some() && listen.path == loc.path,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenKind {
    Port,
    Unix,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenSpec {
    #[serde(rename = "type")]
    pub kind: ListenKind,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub proto: Vec<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSpaceSpec {
    #[serde(default)]
    pub datasets: BTreeMap<String, DataSetSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataSetSpec {
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub genesis: Genesis,
}

/// Where a data set came from
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "GenesisRepr")]
pub enum Genesis {
    /// Root data, no provenance
    #[default]
    Alpha,
    Origin(Loc),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenesisRepr {
    Marker(String),
    Origin(Loc),
}

impl TryFrom<GenesisRepr> for Genesis {
    type Error = String;

    fn try_from(repr: GenesisRepr) -> Result<Self, Self::Error> {
        match repr {
            GenesisRepr::Marker(marker) if marker == ALPHA => Ok(Genesis::Alpha),
            GenesisRepr::Marker(marker) => Err(format!("unknown genesis marker {marker:?}")),
            GenesisRepr::Origin(loc) => Ok(Genesis::Origin(loc)),
        }
    }
}

/// Location descriptor used by data links and genesis references.
///
/// `hostname` selects a container; without it lookups stay in the
/// referencing container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Loc {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub dataspace: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
}
