//! Fixture catalog and markets
//!
//! Real mainnet addresses so fixtures read like production data.

use alloy::primitives::{address, Address, U256};

use crate::catalog::{ChainDescriptor, NativeCurrency, SupportedChains, TokenDescriptor};
use crate::engine::{
    BridgeAndExecuteResult, BridgeFees, BridgeSimulation, ExecuteSimulation, MultiStepResult,
    SimulationResult, SourceLeg,
};
use crate::types::Market;

pub const ARBITRUM: u64 = 42161;
pub const BASE: u64 = 8453;

pub const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

pub fn usdc_arbitrum() -> Address {
    address!("af88d065e77c8cC2239327C5EDb3A432268e5831")
}

pub fn weth_arbitrum() -> Address {
    address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1")
}

pub fn usdc_base() -> Address {
    address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")
}

pub fn aave_pool_arbitrum() -> Address {
    address!("794a61358D6845594F94dc1DB02A252b5b4814aD")
}

pub fn wallet() -> Address {
    address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
}

fn ether() -> NativeCurrency {
    NativeCurrency {
        name: "Ether".to_string(),
        symbol: "ETH".to_string(),
        decimals: 18,
    }
}

fn usdc(address: Address) -> TokenDescriptor {
    TokenDescriptor {
        address,
        symbol: "USDC".to_string(),
        name: "USD Coin".to_string(),
        decimals: 6,
    }
}

/// Arbitrum One (USDC, WETH) and Base (USDC)
pub fn catalog() -> SupportedChains {
    SupportedChains::new(vec![
        ChainDescriptor {
            id: ARBITRUM,
            name: "Arbitrum One".to_string(),
            native_currency: ether(),
            explorer_url: Some("https://arbiscan.io".to_string()),
            tokens: vec![
                usdc(usdc_arbitrum()),
                TokenDescriptor {
                    address: weth_arbitrum(),
                    symbol: "WETH".to_string(),
                    name: "Wrapped Ether".to_string(),
                    decimals: 18,
                },
            ],
        },
        ChainDescriptor {
            id: BASE,
            name: "Base".to_string(),
            native_currency: ether(),
            explorer_url: Some("https://basescan.org".to_string()),
            tokens: vec![usdc(usdc_base())],
        },
    ])
}

/// Aave V3 pool on Arbitrum
pub fn arbitrum_market() -> Market {
    Market {
        id: "aave-v3-arbitrum".to_string(),
        name: "Aave V3 Arbitrum".to_string(),
        chain_id: ARBITRUM,
        pool_address: aave_pool_arbitrum(),
    }
}

/// Simulation that bridges from Base: 0.42 USDC fee, 150k gas at 0.1 gwei
pub fn bridged_simulation() -> SimulationResult {
    SimulationResult {
        bridge_simulation: Some(BridgeSimulation {
            fees: BridgeFees {
                total: "0.42".to_string(),
                protocol: Some("0.02".to_string()),
                solver: Some("0.4".to_string()),
                gas_supplied: None,
            },
            destination_amount: None,
        }),
        execute_simulation: ExecuteSimulation {
            gas_used: 150_000,
            gas_price: U256::from(100_000_000u64),
            gas_fee: None,
        },
        multi_step: MultiStepResult {
            requires_bridging: true,
            sources: vec![SourceLeg {
                chain_id: BASE,
                amount: "1.23".to_string(),
            }],
            destination_chain_id: ARBITRUM,
        },
    }
}

/// Simulation where funds already sit on the destination chain
pub fn local_simulation() -> SimulationResult {
    SimulationResult {
        bridge_simulation: None,
        execute_simulation: ExecuteSimulation {
            gas_used: 150_000,
            gas_price: U256::from(100_000_000u64),
            gas_fee: None,
        },
        multi_step: MultiStepResult {
            requires_bridging: false,
            sources: Vec::new(),
            destination_chain_id: ARBITRUM,
        },
    }
}

/// Execution response carrying only a transaction hash
pub fn executed() -> BridgeAndExecuteResult {
    BridgeAndExecuteResult {
        execute_transaction_hash: Some(TX_HASH.to_string()),
        execute_explorer_url: None,
    }
}
