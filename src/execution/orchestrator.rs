//! Sequential trading session
//!
//! Connects, authorizes, then runs a fixed number of trades one after
//! another: predict, buy, poll until the contract is sold, update the digit
//! history and stake, pause, repeat. Responses are matched to requests by
//! shape because the API interleaves unrelated pushes.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use super::{Outcome, RunSummary, TradeError, TradeRecord};
use crate::api::{
    settlement_digit, AuthorizeRequest, BuyRequest, ContractId, ContractUpdate, Inbound,
    OpenContractRequest, ResponseParser,
};
use crate::config::{Config, PredictionConfig, TimingConfig, TradingConfig};
use crate::prediction::{DigitHistory, DigitPredictor, FrequencyPredictor};
use crate::risk::StakeManager;
use crate::telemetry;
use crate::ws::{RouterExit, WsClient, WsError, WsSession};

/// Drives one trading session over a single connection
pub struct TradeOrchestrator<P = FrequencyPredictor> {
    client: WsClient,
    token: SecretString,
    trading: TradingConfig,
    timing: TimingConfig,
    parser: ResponseParser,
    predictor: P,
    history: DigitHistory,
    stake: StakeManager,
    records: Vec<TradeRecord>,
    skipped: Vec<u32>,
}

impl TradeOrchestrator<FrequencyPredictor> {
    /// Build a session from configuration with the frequency heuristic
    pub fn from_config(config: &Config, token: SecretString) -> Self {
        Self::new(
            WsClient::new(config.ws_config()),
            token,
            config.trading.clone(),
            config.timing.clone(),
            &config.prediction,
            FrequencyPredictor::new(config.prediction.min_observations),
        )
    }
}

impl<P: DigitPredictor> TradeOrchestrator<P> {
    pub fn new(
        client: WsClient,
        token: SecretString,
        trading: TradingConfig,
        timing: TimingConfig,
        prediction: &PredictionConfig,
        predictor: P,
    ) -> Self {
        Self {
            client,
            token,
            parser: ResponseParser::new(trading.settlement_field.clone()),
            stake: StakeManager::from_config(&trading),
            history: DigitHistory::new(prediction.history_capacity),
            trading,
            timing,
            predictor,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn history(&self) -> &DigitHistory {
        &self.history
    }

    pub fn stake(&self) -> &StakeManager {
        &self.stake
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Run every trade to completion
    pub async fn run(self) -> Result<RunSummary, TradeError> {
        self.run_until(std::future::pending()).await
    }

    /// Run until all trades finish or `shutdown` resolves
    ///
    /// The router is stopped and awaited before this returns, whether the
    /// session completed, failed, or was interrupted.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<RunSummary, TradeError>
    where
        F: Future<Output = ()>,
    {
        let run_id = Uuid::new_v4();
        tokio::pin!(shutdown);

        tracing::info!(
            %run_id,
            url = self.client.url(),
            trades = self.trading.num_trades,
            symbol = %self.trading.symbol,
            base_stake = %self.trading.base_stake,
            predictor = self.predictor.name(),
            "Starting trading session"
        );

        let connected = tokio::select! {
            result = self.client.connect() => Some(result),
            () = &mut shutdown => None,
        };
        let Some(connected) = connected else {
            tracing::warn!("Interrupted while connecting");
            return Ok(self.finish(run_id, true, None));
        };
        let mut session = connected?;

        let outcome = tokio::select! {
            result = self.drive(&mut session) => result.map(|()| false),
            () = &mut shutdown => {
                tracing::warn!("Interrupted, stopping trading session");
                Ok(true)
            }
        };

        let router_exit = session.shutdown().await;
        tracing::info!(?router_exit, "Message router stopped");

        match outcome {
            Ok(interrupted) => Ok(self.finish(run_id, interrupted, Some(router_exit))),
            Err(e) => {
                tracing::error!(error = %e, "Trading session aborted");
                self.finish(run_id, false, Some(router_exit));
                Err(e)
            }
        }
    }

    fn finish(
        &self,
        run_id: Uuid,
        interrupted: bool,
        router_exit: Option<RouterExit>,
    ) -> RunSummary {
        let summary = RunSummary {
            run_id,
            records: self.records.clone(),
            skipped: self.skipped.clone(),
            interrupted,
            final_stake: self.stake.current(),
            history: self.history.to_vec(),
            router_exit,
        };
        summary.log();
        summary
    }

    async fn drive(&mut self, session: &mut WsSession) -> Result<(), TradeError> {
        self.authorize(session).await?;

        let total = self.trading.num_trades;
        for index in 1..=total {
            self.trade(session, index).await?;
            if index < total {
                sleep(self.trading.inter_trade_delay()).await;
            }
        }
        Ok(())
    }

    async fn authorize(&self, session: &mut WsSession) -> Result<(), TradeError> {
        tracing::info!("Authorizing");
        session
            .send_json(&AuthorizeRequest {
                authorize: self.token.expose_secret(),
            })
            .await?;

        let wait = self.timing.auth_timeout();
        match self.await_response(session, "authorize", wait).await? {
            Some(Inbound::Authorized(info)) => {
                tracing::info!(
                    loginid = ?info.loginid,
                    currency = ?info.currency,
                    balance = ?info.balance,
                    "Authorization successful"
                );
                Ok(())
            }
            Some(Inbound::Error { error, .. }) => {
                tracing::error!(code = %error.code, message = %error.message, "Authorization failed");
                Err(TradeError::Unauthorized(error.message))
            }
            Some(_) => Err(TradeError::Unauthorized(
                "authorize response without account details".into(),
            )),
            None => Err(TradeError::Timeout {
                phase: "authorize",
                timeout: wait,
            }),
        }
    }

    /// One trade slot. Rejected or unacknowledged buys skip the slot.
    async fn trade(&mut self, session: &mut WsSession, index: u32) -> Result<(), TradeError> {
        self.stake.guard();
        let exclude = self.stake.last_losing_prediction();
        let prediction = self.predictor.predict(&self.history, exclude);
        let stake = self.stake.current();

        tracing::info!(trade = index, prediction, ?exclude, stake = %stake, "Placing trade");
        session
            .send_json(&BuyRequest::digit_differs(&self.trading, stake, prediction))
            .await?;

        let wait = self.timing.ack_timeout();
        let receipt = match self.await_response(session, "buy", wait).await? {
            Some(Inbound::Bought(receipt)) => receipt,
            Some(Inbound::Error { error, .. }) => {
                tracing::error!(
                    trade = index,
                    code = %error.code,
                    message = %error.message,
                    "Trade rejected, skipping"
                );
                self.skip(index);
                return Ok(());
            }
            Some(other) => {
                tracing::error!(
                    trade = index,
                    msg_type = ?other.msg_type(),
                    "Buy response has no contract, skipping"
                );
                self.skip(index);
                return Ok(());
            }
            None => {
                tracing::error!(trade = index, timeout = ?wait, "No buy acknowledgment, skipping");
                self.skip(index);
                return Ok(());
            }
        };

        tracing::info!(
            trade = index,
            contract_id = %receipt.contract_id,
            buy_price = ?receipt.buy_price,
            "Trade placed"
        );

        let update = self.await_settlement(session, receipt.contract_id).await?;
        self.settle(index, receipt.contract_id, prediction, stake, update);
        Ok(())
    }

    fn skip(&mut self, index: u32) {
        self.skipped.push(index);
        telemetry::record_skipped_trade();
    }

    /// Read the queue until a message answers `request` or `wait` elapses
    ///
    /// Unrelated messages are dropped. `Ok(None)` means timed out.
    async fn await_response(
        &self,
        session: &mut WsSession,
        request: &str,
        wait: Duration,
    ) -> Result<Option<Inbound>, TradeError> {
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            let value = match session.next_message(remaining).await {
                Ok(value) => value,
                Err(WsError::RecvTimeout(_)) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let inbound = self.parser.parse(&value);
            if inbound.answers(request) {
                return Ok(Some(inbound));
            }
            tracing::debug!(
                msg_type = ?inbound.msg_type(),
                expected = request,
                "Skipping unrelated message"
            );
        }
    }

    /// Poll until the contract is reported sold
    ///
    /// Timeouts and unrelated messages are retried indefinitely; only a
    /// closed channel ends the wait with an error.
    async fn await_settlement(
        &self,
        session: &mut WsSession,
        contract_id: ContractId,
    ) -> Result<ContractUpdate, TradeError> {
        let request = OpenContractRequest::new(contract_id);
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            session.send_json(&request).await?;
            telemetry::record_poll();

            match session.next_message(self.timing.poll_timeout()).await {
                Ok(value) => match self.parser.parse(&value) {
                    Inbound::Contract(update)
                        if update.is_sold && update.contract_id == Some(contract_id) =>
                    {
                        tracing::debug!(%contract_id, attempt, "Contract sold");
                        return Ok(update);
                    }
                    Inbound::Error { error, .. } => {
                        tracing::warn!(
                            %contract_id,
                            code = %error.code,
                            message = %error.message,
                            "Contract status error"
                        );
                    }
                    _ => {}
                },
                Err(WsError::RecvTimeout(wait)) => {
                    tracing::debug!(%contract_id, attempt, ?wait, "No contract update yet");
                }
                Err(e) => return Err(e.into()),
            }

            sleep(self.timing.poll_interval()).await;
        }
    }

    /// Record a sold contract and update history and stake
    fn settle(
        &mut self,
        index: u32,
        contract_id: ContractId,
        prediction: u8,
        stake: Decimal,
        update: ContractUpdate,
    ) {
        let outcome = Outcome::from_profit(update.profit);

        let actual_digit = match update.settlement_value.as_deref() {
            Some(value) => {
                let digit = settlement_digit(value);
                if digit.is_none() {
                    tracing::warn!(%contract_id, value, "Unparsable settlement digit");
                }
                digit
            }
            None => {
                tracing::warn!(
                    %contract_id,
                    field = self.parser.settlement_field(),
                    "Settlement value missing"
                );
                None
            }
        };
        if let Some(digit) = actual_digit {
            self.history.push(digit);
        }

        let next_stake = self.stake.record(outcome, prediction);

        let record = TradeRecord {
            index,
            contract_id,
            prediction,
            actual_digit,
            outcome,
            stake,
            profit: update.profit,
            settled_at: Utc::now(),
        };

        tracing::info!(
            trade = index,
            %contract_id,
            prediction,
            digit = record.actual_digit_code(),
            outcome = %outcome,
            profit = %record.profit,
            next_stake = %next_stake,
            "Trade settled"
        );
        telemetry::record_trade(outcome, record.profit);
        telemetry::set_stake(next_stake);

        self.records.push(record);
    }
}
