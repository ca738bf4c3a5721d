//! Deposit Parameter Builder
//!
//! Turns (amount, asset, market, wallet) into the destination-chain `supply`
//! call plus the approval the engine needs. Construction is pure; the result
//! is submitted by the controllers, never executed here.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use tracing::debug;

use crate::catalog::{TokenLocation, TokenResolver};
use crate::contracts::IPool;
use crate::engine::BridgeAndExecuteParams;
use crate::error::DepositError;
use crate::types::{ExecuteCallSpec, Market, TokenApproval};
use crate::units::to_base_units;

/// Everything needed to simulate or submit one deposit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositPlan {
    /// Where the deposited asset lives
    pub location: TokenLocation,
    /// Requested amount in base units
    pub base_amount: U256,
    /// Destination call and approval
    pub call: ExecuteCallSpec,
}

impl DepositPlan {
    /// Engine parameters for this plan
    pub fn bridge_params(&self) -> BridgeAndExecuteParams {
        BridgeAndExecuteParams {
            token: self.location.token.symbol.clone(),
            amount: self.base_amount,
            to_chain_id: self.location.chain.id,
            execute: self.call.clone(),
        }
    }
}

/// Builds [`DepositPlan`]s against the supported chains catalog
#[derive(Clone)]
pub struct DepositParamsBuilder {
    resolver: TokenResolver,
    referral_code: u16,
}

impl DepositParamsBuilder {
    pub fn new(resolver: TokenResolver, referral_code: u16) -> Self {
        Self {
            resolver,
            referral_code,
        }
    }

    /// Build the destination call for depositing `amount` of `asset` into `market`
    ///
    /// The position is supplied on behalf of the connected wallet.
    pub fn build(
        &self,
        amount: &str,
        asset: Address,
        market: &Market,
        wallet: Option<Address>,
    ) -> Result<DepositPlan, DepositError> {
        let wallet = wallet.ok_or(DepositError::WalletNotConnected)?;
        let location = self.resolver.resolve(asset)?;

        if location.chain.id != market.chain_id {
            return Err(DepositError::MarketChainMismatch {
                market: market.id.clone(),
                market_chain: market.chain_id,
                asset_chain: location.chain.id,
            });
        }

        let base_amount = to_base_units(amount, location.token.decimals)?;

        let encoded_call = IPool::supplyCall {
            asset,
            amount: base_amount,
            onBehalfOf: wallet,
            referralCode: self.referral_code,
        }
        .abi_encode();

        debug!(
            market = %market.id,
            token = %location.token.symbol,
            chain_id = location.chain.id,
            base_amount = %base_amount,
            "Built deposit call"
        );

        Ok(DepositPlan {
            call: ExecuteCallSpec {
                destination_contract: market.pool_address,
                encoded_call: encoded_call.into(),
                native_value: U256::ZERO,
                approval: TokenApproval {
                    token: location.token.symbol.clone(),
                    amount: base_amount,
                    spender: market.pool_address,
                },
            },
            location,
            base_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogHandle;
    use crate::testing::fixtures;

    fn builder() -> DepositParamsBuilder {
        DepositParamsBuilder::new(
            TokenResolver::new(CatalogHandle::loaded(fixtures::catalog())),
            0,
        )
    }

    #[test]
    fn test_build_supply_call() {
        let market = fixtures::arbitrum_market();
        let plan = builder()
            .build(
                "1.23",
                fixtures::usdc_arbitrum(),
                &market,
                Some(fixtures::wallet()),
            )
            .unwrap();

        assert_eq!(plan.base_amount, U256::from(1_230_000u64));
        assert_eq!(plan.call.destination_contract, market.pool_address);
        assert_eq!(plan.call.native_value, U256::ZERO);
        assert_eq!(plan.call.approval.token, "USDC");
        assert_eq!(plan.call.approval.amount, plan.base_amount);
        assert_eq!(plan.call.approval.spender, market.pool_address);

        let decoded = IPool::supplyCall::abi_decode(&plan.call.encoded_call, true).unwrap();
        assert_eq!(decoded.asset, fixtures::usdc_arbitrum());
        assert_eq!(decoded.amount, plan.base_amount);
        assert_eq!(decoded.onBehalfOf, fixtures::wallet());
        assert_eq!(decoded.referralCode, 0);
    }

    #[test]
    fn test_bridge_params() {
        let plan = builder()
            .build(
                "5",
                fixtures::usdc_arbitrum(),
                &fixtures::arbitrum_market(),
                Some(fixtures::wallet()),
            )
            .unwrap();

        let params = plan.bridge_params();
        assert_eq!(params.token, "USDC");
        assert_eq!(params.amount, U256::from(5_000_000u64));
        assert_eq!(params.to_chain_id, fixtures::ARBITRUM);
        assert_eq!(params.execute, plan.call);
    }

    #[test]
    fn test_build_truncates_amount() {
        let plan = builder()
            .build(
                "1.23456789",
                fixtures::usdc_arbitrum(),
                &fixtures::arbitrum_market(),
                Some(fixtures::wallet()),
            )
            .unwrap();
        assert_eq!(plan.base_amount, U256::from(1_234_567u64));
    }

    #[test]
    fn test_build_requires_wallet() {
        let result = builder().build(
            "1",
            fixtures::usdc_arbitrum(),
            &fixtures::arbitrum_market(),
            None,
        );
        assert_eq!(result, Err(DepositError::WalletNotConnected));
    }

    #[test]
    fn test_build_rejects_market_on_other_chain() {
        let result = builder().build(
            "1",
            fixtures::usdc_base(),
            &fixtures::arbitrum_market(),
            Some(fixtures::wallet()),
        );
        assert!(matches!(
            result,
            Err(DepositError::MarketChainMismatch { .. })
        ));
    }

    #[test]
    fn test_build_rejects_bad_amounts() {
        let b = builder();
        let market = fixtures::arbitrum_market();
        let wallet = Some(fixtures::wallet());

        assert!(matches!(
            b.build("0", fixtures::usdc_arbitrum(), &market, wallet),
            Err(DepositError::NonPositiveAmount { .. })
        ));
        assert!(matches!(
            b.build("ten", fixtures::usdc_arbitrum(), &market, wallet),
            Err(DepositError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_build_propagates_resolver_errors() {
        let unloaded = DepositParamsBuilder::new(TokenResolver::new(CatalogHandle::new()), 0);
        let result = unloaded.build(
            "1",
            fixtures::usdc_arbitrum(),
            &fixtures::arbitrum_market(),
            Some(fixtures::wallet()),
        );
        assert_eq!(result, Err(DepositError::CatalogUnavailable));
    }
}
