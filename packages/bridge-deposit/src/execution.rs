//! Execution Controller
//!
//! Submits one bridge-and-execute request and waits for the destination
//! receipt within a bounded time. A response without a transaction hash is
//! not trusted and yields a failed outcome. Failures are terminal for the
//! attempt; nothing is retried here.

use alloy::primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

use crate::builder::DepositParamsBuilder;
use crate::catalog::ChainDescriptor;
use crate::classify::{classify, ClassifiedError, ErrorKind};
use crate::engine::{BridgeEngine, EngineFailure, ExecuteOptions};
use crate::error::DepositError;
use crate::types::{DepositOutcome, Market};

/// Extra time granted past the engine's own receipt timeout
pub const RECEIPT_GRACE: Duration = Duration::from_secs(15);

const MISSING_HASH_MESSAGE: &str = "Deposit was not confirmed: no transaction hash returned";

pub struct ExecutionController {
    engine: Arc<dyn BridgeEngine>,
    builder: DepositParamsBuilder,
    receipt_timeout: Duration,
}

impl ExecutionController {
    pub fn new(
        engine: Arc<dyn BridgeEngine>,
        builder: DepositParamsBuilder,
        receipt_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            builder,
            receipt_timeout,
        }
    }

    /// Bridge and execute the deposit
    ///
    /// Builder/resolver failures are returned as errors before anything is
    /// submitted. Once submitted, every result is reported as an outcome.
    pub async fn execute(
        &self,
        amount: &str,
        asset: Address,
        market: &Market,
        wallet: Option<Address>,
    ) -> Result<DepositOutcome, DepositError> {
        let plan = self.builder.build(amount, asset, market, wallet)?;
        let params = plan.bridge_params();
        let options = ExecuteOptions {
            wait_for_receipt: true,
            receipt_timeout: self.receipt_timeout,
        };

        info!(
            amount = %amount,
            token = %params.token,
            to_chain_id = params.to_chain_id,
            market = %market.id,
            "Submitting deposit"
        );

        let deadline = self.receipt_timeout + RECEIPT_GRACE;
        let response = tokio::time::timeout(
            deadline,
            self.engine.bridge_and_execute(&params, &options),
        )
        .await
        .unwrap_or_else(|_| {
            Err(EngineFailure::Message(format!(
                "receipt timeout after {:?}",
                deadline
            )))
        });

        let result = match response {
            Ok(result) => result,
            Err(failure) => {
                let classified = classify(&failure);
                warn!(
                    kind = %classified.kind,
                    error = %failure,
                    "Deposit execution failed"
                );
                return Ok(DepositOutcome::failed(classified));
            }
        };

        let tx_hash = match result.transaction_hash() {
            Some(hash) => hash.to_string(),
            None => {
                error!(market = %market.id, "Engine completed without a transaction hash");
                return Ok(DepositOutcome::failed(ClassifiedError::new(
                    ErrorKind::General,
                    MISSING_HASH_MESSAGE,
                )));
            }
        };

        let explorer_url = result
            .execute_explorer_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| explorer_tx_url(&plan.location.chain, &tx_hash));

        info!(tx_hash = %tx_hash, market = %market.id, "Deposit confirmed");

        Ok(DepositOutcome::succeeded(tx_hash, explorer_url))
    }
}

/// `<explorer>/tx/<hash>` for chains that list an explorer
pub fn explorer_tx_url(chain: &ChainDescriptor, tx_hash: &str) -> Option<String> {
    let base = chain.explorer_url.as_deref()?;
    let base = if base.ends_with('/') {
        Url::parse(base)
    } else {
        Url::parse(&format!("{}/", base))
    }
    .ok()?;

    base.join(&format!("tx/{}", tx_hash)).ok().map(String::from)
}
