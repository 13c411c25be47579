// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Vehicle data-model objects exposed to the management server.

pub mod headlights;
pub mod humidity;

pub use headlights::HeadlightsControl;
pub use humidity::HumiditySensor;

/// Wall-clock timestamp in asctime-like form, used by the per-object
/// "time of last change" resources.
pub(crate) fn current_timestamp() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}
