//! Price-report book: one rate and one timestamp per reporting oracle.
//!
//! Rates are kept in a median-tracking registry so the median rate is
//! available at all times. Timestamps are kept in a second median registry,
//! newest first, which makes the oldest report the tail of that list.

use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::registry::{default_metrics, MedianSortedRegistry, RegistryOptions, Relation};
use crate::resolver::NeighborResolver;
use crate::types::{Address, Change, Fraction, Hints, RegistryKey};

/// Default lifetime of a report, in seconds.
pub const DEFAULT_REPORT_EXPIRY_SECONDS: u64 = 300;

/// One oracle's rate with its median relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleRate {
    /// Reporting oracle.
    pub oracle: Address,
    /// Reported rate.
    pub rate: Fraction,
    /// Position relative to the median rate.
    pub relation: Relation,
}

/// One oracle's report time with its median relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleTimestamp {
    /// Reporting oracle.
    pub oracle: Address,
    /// Report time in seconds.
    pub timestamp: u64,
    /// Position relative to the median timestamp.
    pub relation: Relation,
}

/// Sort value of the timestamp list. Within one second the later arrival
/// orders higher, so the newest report is always the head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ReportStamp {
    seconds: u64,
    sequence: u64,
}

/// Current reports for one currency pair.
pub struct ReportBook {
    oracles: Vec<Address>,
    max_oracles: usize,
    rates: MedianSortedRegistry<Address, Fraction>,
    timestamps: MedianSortedRegistry<Address, ReportStamp>,
    resolver: NeighborResolver,
    report_expiry_seconds: u64,
    sequence: u64,
}

impl ReportBook {
    /// Creates an empty book with no authorized oracles.
    ///
    /// `options.capacity` bounds the number of oracles. Mutations are
    /// counted once per report through `options.metrics`.
    pub fn new(options: RegistryOptions, report_expiry_seconds: u64) -> Self {
        let stamp_options = options.clone().metrics(default_metrics());
        Self {
            oracles: Vec::new(),
            max_oracles: options.capacity,
            rates: MedianSortedRegistry::new(options),
            timestamps: MedianSortedRegistry::new(stamp_options),
            resolver: NeighborResolver::default(),
            report_expiry_seconds,
            sequence: 0,
        }
    }

    /// Report lifetime in seconds.
    pub fn report_expiry_seconds(&self) -> u64 {
        self.report_expiry_seconds
    }

    /// Changes the report lifetime. Applies to reports already stored.
    pub fn set_report_expiry(&mut self, seconds: u64) {
        self.report_expiry_seconds = seconds;
        info!(seconds, "oracle.expiry_set");
    }

    /// Authorizes `oracle` to report.
    pub fn add_oracle(&mut self, oracle: Address) -> Result<()> {
        if oracle.is_null() {
            return Err(RegistryError::InvalidKey);
        }
        if self.is_oracle(&oracle) {
            return Err(RegistryError::DuplicateKey);
        }
        if self.oracles.len() >= self.max_oracles {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.max_oracles,
            });
        }
        self.oracles.push(oracle);
        info!(%oracle, oracles = self.oracles.len(), "oracle.added");
        Ok(())
    }

    /// Revokes `oracle` and drops its report, if any.
    pub fn remove_oracle(&mut self, oracle: Address) -> Result<()> {
        let index = self
            .oracles
            .iter()
            .position(|known| *known == oracle)
            .ok_or(RegistryError::NotFound)?;
        if self.rates.contains(&oracle) {
            self.remove_report(oracle)?;
        }
        self.oracles.remove(index);
        info!(%oracle, oracles = self.oracles.len(), "oracle.removed");
        Ok(())
    }

    /// Returns `true` when `oracle` may report.
    pub fn is_oracle(&self, oracle: &Address) -> bool {
        self.oracles.contains(oracle)
    }

    /// Authorized oracles in the order they were added.
    pub fn oracles(&self) -> &[Address] {
        &self.oracles
    }

    /// Records `rate` for `oracle` at time `now`.
    ///
    /// `hints` position the rate in the rate list and are validated like any
    /// registry mutation; they are typically produced by
    /// [`ReportBook::report_hints`]. The timestamp list is maintained
    /// internally and the report becomes its head. Nothing changes when the
    /// report is refused.
    pub fn report(
        &mut self,
        oracle: Address,
        rate: Fraction,
        now: u64,
        hints: Hints<Address>,
    ) -> Result<()> {
        if oracle.is_null() {
            return Err(RegistryError::InvalidKey);
        }
        if !self.is_oracle(&oracle) {
            return Err(RegistryError::Unauthorized { oracle });
        }
        if let Some(newest) = self.timestamps.value_of(&self.timestamps.head()) {
            if now < newest.seconds {
                return Err(RegistryError::StaleTimestamp {
                    timestamp: now,
                    newest: newest.seconds,
                });
            }
        }
        let stamp = ReportStamp {
            seconds: now,
            sequence: self.sequence + 1,
        };
        let existing = self.rates.contains(&oracle);
        let stamp_hints = self.stamp_hints(oracle, stamp, existing)?;
        if existing {
            self.rates.update(oracle, rate, hints.lesser, hints.greater)?;
            self.timestamps.update(oracle, stamp, stamp_hints.lesser, stamp_hints.greater)?;
        } else {
            self.rates.insert(oracle, rate, hints.lesser, hints.greater)?;
            self.timestamps.insert(oracle, stamp, stamp_hints.lesser, stamp_hints.greater)?;
        }
        self.sequence = stamp.sequence;
        debug!(%oracle, %rate, now, reports = self.rates.len(), "oracle.report");
        Ok(())
    }

    /// Hints for reporting `rate` from `oracle` against the current rates.
    pub fn report_hints(&self, oracle: Address, rate: Fraction) -> Result<Hints<Address>> {
        let snapshot = self.rates.elements();
        let resolution = if snapshot.contains(&oracle) {
            self.resolver.resolve(&snapshot, &Change::new(oracle, rate))?
        } else {
            self.resolver.resolve_insert(&snapshot, oracle, rate)?
        };
        Ok(resolution.hints)
    }

    /// Removes `oracle`'s report.
    pub fn remove_report(&mut self, oracle: Address) -> Result<()> {
        self.rates.remove(oracle)?;
        self.timestamps.remove(oracle)?;
        debug!(%oracle, reports = self.rates.len(), "oracle.remove");
        Ok(())
    }

    /// Median of the reported rates.
    pub fn median_rate(&self) -> Option<Fraction> {
        self.rates.median_value().copied()
    }

    /// Median of the report timestamps.
    pub fn median_timestamp(&self) -> Option<u64> {
        self.timestamps.median_value().map(|stamp| stamp.seconds)
    }

    /// Number of current reports.
    pub fn num_rates(&self) -> usize {
        self.rates.len()
    }

    /// Reported rates, largest first.
    pub fn rates(&self) -> Vec<OracleRate> {
        let (snapshot, relations) = self.rates.elements_with_relations();
        snapshot
            .into_entries()
            .into_iter()
            .zip(relations)
            .map(|(entry, relation)| OracleRate {
                oracle: entry.key,
                rate: entry.value,
                relation,
            })
            .collect()
    }

    /// Report timestamps, newest first.
    pub fn timestamps(&self) -> Vec<OracleTimestamp> {
        let (snapshot, relations) = self.timestamps.elements_with_relations();
        snapshot
            .into_entries()
            .into_iter()
            .zip(relations)
            .map(|(entry, relation)| OracleTimestamp {
                oracle: entry.key,
                timestamp: entry.value.seconds,
                relation,
            })
            .collect()
    }

    /// Whether the oldest report has expired at `now`, and whose it is.
    ///
    /// Returns `(false, NULL)` for an empty book.
    pub fn is_oldest_report_expired(&self, now: u64) -> (bool, Address) {
        let oldest = self.timestamps.tail();
        match self.timestamps.value_of(&oldest) {
            Some(stamp) => (
                now.saturating_sub(stamp.seconds) >= self.report_expiry_seconds,
                oldest,
            ),
            None => (false, Address::NULL),
        }
    }

    /// Removes up to `n` expired reports, oldest first.
    ///
    /// Fails with [`RegistryError::InsufficientElements`] unless `n` is
    /// smaller than the number of reports, so the last report always
    /// survives and an empty book refuses outright.
    pub fn remove_expired_reports(&mut self, now: u64, n: usize) -> Result<Vec<Address>> {
        if n >= self.num_rates() {
            return Err(RegistryError::InsufficientElements {
                requested: n,
                available: self.num_rates(),
            });
        }
        let mut removed = Vec::new();
        while removed.len() < n {
            let (expired, oldest) = self.is_oldest_report_expired(now);
            if !expired {
                break;
            }
            self.remove_report(oldest)?;
            removed.push(oldest);
        }
        if !removed.is_empty() {
            info!(count = removed.len(), now, "oracle.expired");
        }
        Ok(removed)
    }

    fn stamp_hints(
        &self,
        oracle: Address,
        stamp: ReportStamp,
        existing: bool,
    ) -> Result<Hints<Address>> {
        let snapshot = self.timestamps.elements();
        let resolution = if existing {
            self.resolver.resolve(&snapshot, &Change::new(oracle, stamp))?
        } else {
            self.resolver.resolve_insert(&snapshot, oracle, stamp)?
        };
        Ok(resolution.hints)
    }
}
