//! Currency pairs understood by the upstream quote provider.

use clap::ValueEnum;
use strum_macros::{Display, EnumString};

/// A `BASE-QUOTE` currency pair as it appears in the provider's URL path.
///
/// The provider answers `GET /json/last/USD-BRL` with an object keyed by the
/// pair without the dash (`USDBRL`), see [`CurrencyPair::payload_key`].
#[derive(Debug, Clone, Copy, Default, ValueEnum, Display, EnumString, Hash, Eq, PartialEq)]
#[clap(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum CurrencyPair {
    /// US dollar to Brazilian real.
    #[default]
    #[strum(serialize = "USD-BRL")]
    UsdBrl,
    /// Euro to Brazilian real.
    #[strum(serialize = "EUR-BRL")]
    EurBrl,
    /// British pound to Brazilian real.
    #[strum(serialize = "GBP-BRL")]
    GbpBrl,
    /// Bitcoin to Brazilian real.
    #[strum(serialize = "BTC-BRL")]
    BtcBrl,
    /// US dollar to euro.
    #[strum(serialize = "USD-EUR")]
    UsdEur,
}

impl CurrencyPair {
    /// Path segment used in the provider URL (`USD-BRL`).
    pub fn path_segment(&self) -> String {
        self.to_string()
    }

    /// Top-level key of the provider's JSON payload (`USDBRL`).
    pub fn payload_key(&self) -> String {
        self.to_string().replace('-', "")
    }
}
