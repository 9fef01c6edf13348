//! Read-only interfaces of the Swan contracts.
//!
//! Only the view functions this reader calls are declared. `sol!` generates
//! one `<name>Call` struct per function, which `ContractCall::read` encodes
//! and whose `<name>Return` it decodes.

use alloy_primitives::U256;
use alloy_sol_types::sol;

use crate::error::{MemlaneError, MemlaneResult};

sol! {
    #![sol(all_derives)]

    /// Each agent deployed by the factory.
    #[sol(all_derives)]
    interface SwanAgent {
        function name() external view returns (string memory);
        function description() external view returns (string memory);
        function getRoundPhase() external view returns (uint256 round, uint8 phase, uint256 timestamp);
        function treasury() external view returns (uint256);
        function owner() external view returns (address);
        function createdAt() external view returns (uint256);
        /// Reverts past the end of the round's list.
        function inventory(uint256 round, uint256 index) external view returns (address);
        /// Zero when no state update was requested for the round.
        function oracleStateRequests(uint256 round) external view returns (uint256);
        function oracleResult(uint256 taskId) external view returns (bytes memory);
    }

    /// Each artifact token an agent bought.
    #[sol(all_derives)]
    interface SwanArtifact {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        /// UTF-8 text stored as `bytes`.
        function description() external view returns (bytes memory);
        function createdAt() external view returns (uint256);
    }

    /// The marketplace.
    #[sol(all_derives)]
    interface SwanMarketplace {
        struct ArtifactListing {
            uint256 createdAt;
            uint96 listingFee;
            uint256 price;
            address seller;
            address agent;
            uint256 round;
            uint8 status;
        }

        function getListing(address artifact) external view returns (ArtifactListing memory);
        function getListedArtifacts(address agent, uint256 round) external view returns (address[] memory);
    }

    #[sol(all_derives)]
    interface LLMOracleCoordinator {
        struct TaskResponse {
            address responder;
            uint256 nonce;
            uint256 score;
            bytes output;
            bytes metadata;
        }

        function getBestResponse(uint256 taskId) external view returns (TaskResponse memory);
    }
}

/// Narrow a `uint256` field; values above `u64::MAX` are a decode error.
pub fn to_u64(value: U256, field: &str) -> MemlaneResult<u64> {
    u64::try_from(value)
        .map_err(|_| MemlaneError::decode(format!("{field} {value} does not fit in u64")))
}
