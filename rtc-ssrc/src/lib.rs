//! RTC SSRC - per-call SSRC registry for media relays.
//!
//! This crate tracks, per RTP/RTCP synchronization source, the mutable state a
//! relay needs while forwarding a call: the SRTP index of each traffic
//! direction and the history of RTCP reports from which round-trip time,
//! jitter and loss figures are derived.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SsrcRegistry`] | Concurrent map from SSRC to entry, owned by one call |
//! | [`SsrcEntry`] | All state of one SSRC, behind its own lock |
//! | [`SsrcContextHandle`] | Access to one directional crypto context of an entry |
//! | [`on_sender_report`] / [`on_receiver_report`] / [`on_voip_metrics`] | Fold parsed RTCP reports into the registry |
//!
//! Parsing RTCP off the wire and the SRTP algorithms themselves live
//! elsewhere; the registry stores the replay index without interpreting it.
//!
//! # Lock Order
//!
//! The registry holds a structural lock over its map only while looking up
//! or inserting an entry. Each entry has its own lock for its fields. The
//! structural lock is always taken first:
//!
//! ```text
//! registry.get_or_create(a)   structural lock, released on return
//!   entry_a.with_context(..)  entry lock of a, released on return
//! registry.get_or_create(b)   fine, no entry lock held
//! ```
//!
//! Calling into the registry from inside [`SsrcEntry::with_context`] or
//! [`SsrcContextHandle::with`] breaks that order; debug builds panic when it
//! happens.
//!
//! # Quick Start
//!
//! ```ignore
//! use rtc_ssrc::{
//!     on_receiver_report, on_sender_report, ReceiverReport, SenderReport, SsrcDirection,
//!     SsrcRegistryBuilder,
//! };
//! use std::time::Instant;
//!
//! let registry = SsrcRegistryBuilder::new().with_call_id("call-42").build();
//!
//! // crypto layer
//! let ctx = registry.get_context(0x12345678, SsrcDirection::Input)?;
//! ctx.with(|ctx| ctx.srtp_index += 1);
//!
//! // RTCP parser
//! on_sender_report(&registry, &sender_report, Instant::now())?;
//! if let Some(rtt) = on_receiver_report(&registry, &receiver_report, Instant::now())? {
//!     println!("rtt {rtt:?}");
//! }
//!
//! // call teardown
//! registry.destroy()?;
//! ```

#![warn(rust_2018_idioms)]

mod context;
mod entry;
mod lock_order;
mod reconciler;
mod registry;

pub(crate) mod report;

pub use context::{SsrcContext, SsrcContextHandle, SsrcDirection};
pub use entry::SsrcEntry;
pub use reconciler::{on_receiver_report, on_sender_report, on_voip_metrics};
pub use registry::{
    DEFAULT_RECEIVER_REPORT_CAPACITY, DEFAULT_SENDER_REPORT_CAPACITY, DEFAULT_STATS_CAPACITY,
    SsrcRegistry, SsrcRegistryBuilder,
};
pub use report::{
    receiver_report::{ReceiverReport, ReceiverReportRecord},
    sender_report::{SenderReport, SenderReportRecord},
    stats::SsrcStatsBlock,
    voip_metrics::{VoipMetrics, VoipMetricsRecord},
};
