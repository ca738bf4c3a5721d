//! Lending pool and ERC20 ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe call encoders for the
//! destination-chain calls a deposit needs.

use alloy::sol;

sol! {
    /// Lending pool interface (supply entry point)
    interface IPool {
        /// Supply `amount` of `asset`, crediting the position to `onBehalfOf`
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
    }

    /// Minimal ERC20 interface
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
