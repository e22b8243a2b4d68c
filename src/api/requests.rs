//! Outbound request shapes

use super::ContractId;
use crate::config::TradingConfig;
use rust_decimal::Decimal;
use serde::Serialize;

/// `{"authorize": "<token>"}`
#[derive(Debug, Serialize)]
pub struct AuthorizeRequest<'a> {
    pub authorize: &'a str,
}

/// Buy a contract priced by stake
#[derive(Debug, Clone, Serialize)]
pub struct BuyRequest {
    pub buy: u8,
    /// Maximum price we accept, equal to the stake
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub parameters: BuyParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyParameters {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub basis: &'static str,
    pub contract_type: String,
    pub currency: String,
    pub duration: u32,
    pub duration_unit: String,
    pub symbol: String,
    pub barrier: String,
}

impl BuyRequest {
    /// Build a digit-differs buy for `stake` with `digit` as the barrier
    pub fn digit_differs(trading: &TradingConfig, stake: Decimal, digit: u8) -> Self {
        Self {
            buy: 1,
            price: stake,
            parameters: BuyParameters {
                amount: stake,
                basis: "stake",
                contract_type: trading.contract_type.clone(),
                currency: trading.currency.clone(),
                duration: trading.duration,
                duration_unit: trading.duration_unit.clone(),
                symbol: trading.symbol.clone(),
                barrier: digit.to_string(),
            },
        }
    }
}

/// Status query for one open contract
#[derive(Debug, Clone, Serialize)]
pub struct OpenContractRequest {
    pub proposal_open_contract: u8,
    pub contract_id: ContractId,
}

impl OpenContractRequest {
    pub fn new(contract_id: ContractId) -> Self {
        Self {
            proposal_open_contract: 1,
            contract_id,
        }
    }
}
