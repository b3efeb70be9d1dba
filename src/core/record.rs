// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record model of the data channel.
//!
//! Two record types flow through a channel:
//! - [`LRecord`] carries the measured/expected quantities of one instance.
//! - [`ORecord`] annotates which parameter, observation and instrument
//!   instances are active in an epoch.
//!
//! Records sharing one `time` tag form an epoch.

use serde::{Deserialize, Serialize};

/// A measurement/expectation record for one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LRecord {
    /// `false` marks the instance as removed from this epoch onwards
    pub active: bool,
    /// Entity identifier (non-empty)
    pub identifier: String,
    /// Instance identifier
    pub instance_id: i32,
    /// Epoch time tag
    pub time: f64,
    /// Tag values
    pub tags: Vec<i32>,
    /// Expectation values (non-empty)
    pub expectations: Vec<f64>,
    /// Packed upper triangle of the expectation covariance, empty if absent
    pub covariance: Vec<f64>,
}

impl LRecord {
    /// Create an active l-record with no tags, expectations or covariance.
    pub fn new(identifier: impl Into<String>, instance_id: i32, time: f64) -> Self {
        Self {
            active: true,
            identifier: identifier.into(),
            instance_id,
            time,
            tags: Vec::new(),
            expectations: Vec::new(),
            covariance: Vec::new(),
        }
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the tag values.
    pub fn with_tags(mut self, tags: Vec<i32>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the expectation values.
    pub fn with_expectations(mut self, expectations: Vec<f64>) -> Self {
        self.expectations = expectations;
        self
    }

    /// Set the packed covariance block.
    pub fn with_covariance(mut self, covariance: Vec<f64>) -> Self {
        self.covariance = covariance;
        self
    }

    /// Whether a covariance block is attached.
    pub fn has_covariance(&self) -> bool {
        !self.covariance.is_empty()
    }
}

/// An annotation record listing the instances active in an epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ORecord {
    /// `false` marks the annotation as removed; removed records skip ordering checks
    pub active: bool,
    /// Entity identifier (non-empty)
    pub identifier: String,
    /// Epoch time tag
    pub time: f64,
    /// Parameter instance identifiers (non-empty)
    pub parameter_iids: Vec<i32>,
    /// Observation instance identifiers (non-empty)
    pub observation_iids: Vec<i32>,
    /// Instrument instance identifiers (may be empty)
    pub instrument_iids: Vec<i32>,
}

impl ORecord {
    /// Create an active o-record.
    pub fn new(
        identifier: impl Into<String>,
        time: f64,
        parameter_iids: Vec<i32>,
        observation_iids: Vec<i32>,
    ) -> Self {
        Self {
            active: true,
            identifier: identifier.into(),
            time,
            parameter_iids,
            observation_iids,
            instrument_iids: Vec::new(),
        }
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the instrument instance identifiers.
    pub fn with_instruments(mut self, instrument_iids: Vec<i32>) -> Self {
        self.instrument_iids = instrument_iids;
        self
    }

    /// Total number of integer identifiers across the three lists.
    pub fn iid_count(&self) -> usize {
        self.parameter_iids.len() + self.observation_iids.len() + self.instrument_iids.len()
    }
}

/// Either record type, as decoded from a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// Measurement/expectation record
    L(LRecord),
    /// Epoch annotation record
    O(ORecord),
}

impl Record {
    /// Epoch time tag of the record.
    pub fn time(&self) -> f64 {
        match self {
            Record::L(r) => r.time,
            Record::O(r) => r.time,
        }
    }

    /// Identifier of the record.
    pub fn identifier(&self) -> &str {
        match self {
            Record::L(r) => &r.identifier,
            Record::O(r) => &r.identifier,
        }
    }

    /// Active flag of the record.
    pub fn is_active(&self) -> bool {
        match self {
            Record::L(r) => r.active,
            Record::O(r) => r.active,
        }
    }

    /// Short type name ("l" or "o").
    pub fn type_name(&self) -> &'static str {
        match self {
            Record::L(_) => "l",
            Record::O(_) => "o",
        }
    }
}

impl From<LRecord> for Record {
    fn from(record: LRecord) -> Self {
        Record::L(record)
    }
}

impl From<ORecord> for Record {
    fn from(record: ORecord) -> Self {
        Record::O(record)
    }
}

/// Number of covariance entries for `n` expectations (packed upper triangle).
pub fn packed_covariance_len(n: usize) -> usize {
    n * (n + 1) / 2
}
