//! Deriv WebSocket API messages
//!
//! Request builders for the three calls the trading loop makes
//! (authorize, buy, proposal_open_contract) and a classifier for what
//! comes back.

mod requests;
mod responses;

pub use requests::{AuthorizeRequest, BuyParameters, BuyRequest, OpenContractRequest};
pub use responses::{
    settlement_digit, ApiError, AuthorizeInfo, BuyReceipt, ContractUpdate, Inbound,
    ResponseParser,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default public endpoint, `app_id` is appended as a query parameter
pub const DERIV_WS_URL: &str = "wss://ws.derivws.com/websockets/v3";

/// Identifier of an accepted contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub u64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
