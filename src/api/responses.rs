//! Inbound message classification
//!
//! The API does not correlate responses to requests, so the trading loop
//! matches them by shape: which top-level object is present, or the
//! `msg_type` carried alongside an `error`.

use super::ContractId;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Error object attached to a failed response
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Account details from a successful authorization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthorizeInfo {
    pub loginid: Option<String>,
    pub currency: Option<String>,
    pub balance: Option<Decimal>,
}

/// Acknowledgment of an accepted buy
#[derive(Debug, Clone, PartialEq)]
pub struct BuyReceipt {
    pub contract_id: ContractId,
    pub buy_price: Option<Decimal>,
}

/// One `proposal_open_contract` update
#[derive(Debug, Clone, PartialEq)]
pub struct ContractUpdate {
    pub contract_id: Option<ContractId>,
    pub is_sold: bool,
    pub profit: Decimal,
    /// Raw settlement value, as text
    pub settlement_value: Option<String>,
}

/// A classified inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Error {
        msg_type: Option<String>,
        error: ApiError,
    },
    Authorized(AuthorizeInfo),
    Bought(BuyReceipt),
    Contract(ContractUpdate),
    /// Anything else: pushes, or a response missing its payload
    Other { msg_type: Option<String> },
}

impl Inbound {
    pub fn msg_type(&self) -> Option<&str> {
        match self {
            Inbound::Error { msg_type, .. } | Inbound::Other { msg_type } => msg_type.as_deref(),
            Inbound::Authorized(_) => Some("authorize"),
            Inbound::Bought(_) => Some("buy"),
            Inbound::Contract(_) => Some("proposal_open_contract"),
        }
    }

    /// Whether this message is the response to a request of type `request`
    ///
    /// An error without `msg_type` is taken to answer whatever is pending.
    pub fn answers(&self, request: &str) -> bool {
        match self {
            Inbound::Error { msg_type, .. } => msg_type.as_deref().map_or(true, |t| t == request),
            _ => self.msg_type() == Some(request),
        }
    }
}

/// Classifies raw JSON messages
#[derive(Debug, Clone)]
pub struct ResponseParser {
    settlement_field: String,
}

impl ResponseParser {
    /// `settlement_field` names the exit value inside `proposal_open_contract`
    pub fn new(settlement_field: impl Into<String>) -> Self {
        Self {
            settlement_field: settlement_field.into(),
        }
    }

    pub fn settlement_field(&self) -> &str {
        &self.settlement_field
    }

    pub fn parse(&self, value: &Value) -> Inbound {
        let msg_type = value
            .get("msg_type")
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(error) = value.get("error") {
            let error = ApiError::deserialize(error).unwrap_or_else(|_| ApiError {
                code: String::new(),
                message: error.to_string(),
            });
            return Inbound::Error { msg_type, error };
        }

        if let Some(auth) = value.get("authorize").filter(|v| v.is_object()) {
            return Inbound::Authorized(AuthorizeInfo {
                loginid: auth.get("loginid").and_then(Value::as_str).map(str::to_string),
                currency: auth.get("currency").and_then(Value::as_str).map(str::to_string),
                balance: auth.get("balance").and_then(decimal_from_value),
            });
        }

        if let Some(buy) = value.get("buy").filter(|v| v.is_object()) {
            if let Some(contract_id) = buy.get("contract_id").and_then(contract_id_from_value) {
                return Inbound::Bought(BuyReceipt {
                    contract_id,
                    buy_price: buy.get("buy_price").and_then(decimal_from_value),
                });
            }
            return Inbound::Other {
                msg_type: msg_type.or_else(|| Some("buy".to_string())),
            };
        }

        if let Some(contract) = value.get("proposal_open_contract").filter(|v| v.is_object()) {
            return Inbound::Contract(ContractUpdate {
                contract_id: contract.get("contract_id").and_then(contract_id_from_value),
                is_sold: contract.get("is_sold").is_some_and(truthy),
                profit: contract
                    .get("profit")
                    .and_then(decimal_from_value)
                    .unwrap_or(Decimal::ZERO),
                settlement_value: contract
                    .get(&self.settlement_field)
                    .and_then(text_from_value),
            });
        }

        Inbound::Other { msg_type }
    }
}

/// Last character of the settlement value as a digit
pub fn settlement_digit(value: &str) -> Option<u8> {
    value
        .trim()
        .chars()
        .last()?
        .to_digit(10)
        .map(|d| d as u8)
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn contract_id_from_value(value: &Value) -> Option<ContractId> {
    match value {
        Value::Number(n) => n.as_u64().map(ContractId),
        Value::String(s) => s.trim().parse().ok().map(ContractId),
        _ => None,
    }
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
