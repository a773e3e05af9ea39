//! Data types sent to the client over HTTP.
//! Keep this module minimal and stable: it defines the wire format, and the
//! key names match agents already deployed in the field.

use serde::{Deserialize, Deserializer, Serialize};

/// Wire keys, as listed in [`Snapshot::unavailable`].
pub mod keys {
    pub const UPTIME: &str = "uptime";
    pub const LOAD_AVG_ONE: &str = "loadAvgOne";
    pub const LOAD_AVG_FIVE: &str = "loadAvgFive";
    pub const LOAD_AVG_FIFTEEN: &str = "loadAvgFifteen";
    pub const MEM: &str = "mem";
    pub const SWAP: &str = "swap";
    pub const PROCS: &str = "procsTopFive";
    pub const FS: &str = "fsList";

    /// The three load figures are sampled together and fail together.
    pub const LOAD_AVG: [&str; 3] = [LOAD_AVG_ONE, LOAD_AVG_FIVE, LOAD_AVG_FIFTEEN];

    pub const ALL: [&str; 8] = [
        UPTIME,
        LOAD_AVG_ONE,
        LOAD_AVG_FIVE,
        LOAD_AVG_FIFTEEN,
        MEM,
        SWAP,
        PROCS,
        FS,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcStat {
    pub pid: u32,
    pub ppid: u32,
    /// Resident memory in bytes.
    pub mem: u64,
    /// Milliseconds since the Unix epoch.
    pub time_start: u64,
    /// Accumulated CPU time in milliseconds.
    pub time_total: u64,
    pub command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemStat {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub actual_used: u64,
    pub actual_free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapStat {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsStat {
    pub dev: String,
    /// Mount point.
    pub dir: String,
    pub total: u64,
    pub used: u64,
    pub avail: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// One point-in-time bundle of host vitals. Every field defaults to zero so
/// a partial or older payload still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub uptime: String,
    pub load_avg_one: f64,
    pub load_avg_five: f64,
    pub load_avg_fifteen: f64,
    #[serde(rename = "procsTopFive", deserialize_with = "null_as_default")]
    pub top_processes: Vec<ProcStat>,
    #[serde(rename = "mem")]
    pub memory: MemStat,
    pub swap: SwapStat,
    #[serde(rename = "fsList", deserialize_with = "null_as_default")]
    pub filesystems: Vec<FsStat>,
    /// Keys whose collection failed on the agent; their values are zero.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub unavailable: Vec<String>,
}

impl Snapshot {
    pub fn load_average(&self) -> LoadAverage {
        LoadAverage {
            one: self.load_avg_one,
            five: self.load_avg_five,
            fifteen: self.load_avg_fifteen,
        }
    }

    pub fn set_load_average(&mut self, avg: LoadAverage) {
        self.load_avg_one = avg.one;
        self.load_avg_five = avg.five;
        self.load_avg_fifteen = avg.fifteen;
    }

    /// Zero-valued snapshot with every key marked unavailable.
    pub fn unavailable() -> Self {
        Self {
            unavailable: keys::ALL.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }
}

// Agents that found no filesystems (or no processes) send `null` instead of `[]`.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}
