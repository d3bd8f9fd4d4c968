//! RTCP report records
//!
//! Semantic snapshots of parsed RTCP reports, each paired with its local
//! receipt time once stored in an [`SsrcEntry`](crate::SsrcEntry):
//!
//! - [`SenderReport`](crate::SenderReport) / [`SenderReportRecord`](crate::SenderReportRecord): RTCP SR, keyed for matching by
//!   the middle 32 bits of its NTP timestamp.
//! - [`ReceiverReport`](crate::ReceiverReport) / [`ReceiverReportRecord`](crate::ReceiverReportRecord): one RTCP RR report block.
//! - [`VoipMetrics`](crate::VoipMetrics) / [`VoipMetricsRecord`](crate::VoipMetricsRecord): RTCP XR VoIP metrics block.
//! - [`SsrcStatsBlock`](crate::SsrcStatsBlock): quality figures derived from a receiver report.

pub(crate) mod history;
pub(crate) mod receiver_report;
pub(crate) mod sender_report;
pub(crate) mod stats;
pub(crate) mod voip_metrics;
