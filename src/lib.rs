//! Domain core for a tutoring-agency back office: teacher matching,
//! mediation-stage bookkeeping, contract/engagement lifecycle, and invoice
//! aggregation. Presentation, storage backends, and outbound transports are
//! collaborator traits; see [`storage::InMemoryBackOffice`] for the reference
//! store used by the test suites.

pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod workflows;
