//! `ContractReader` over any `RpcTransport` via `eth_call`.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use memlane_contracts::{
    error::{MemlaneError, MemlaneResult},
    Address, Bytes,
};
use memlane_core::traits::{ContractReader, RpcTransport};

pub struct RpcContractReader<T> {
    transport: T,
}

impl<T: RpcTransport> RpcContractReader<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: RpcTransport> ContractReader for RpcContractReader<T> {
    async fn eth_call(&self, address: Address, calldata: Bytes) -> MemlaneResult<Bytes> {
        let selector = calldata.get(..4).map(hex::encode).unwrap_or_default();
        let params = json!([
            { "to": address.to_string(), "data": format!("0x{}", hex::encode(&calldata)) },
            "latest"
        ]);

        debug!(contract = %address, selector = %selector, "eth_call");
        let result = self.transport.call("eth_call", params).await?;
        let raw = result.as_str().ok_or_else(|| {
            MemlaneError::decode(format!("eth_call to {address} returned a non-string result"))
        })?;

        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        let data = hex::decode(digits)
            .map_err(|e| MemlaneError::decode(format!("eth_call to {address} returned invalid hex: {e}")))?;
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use memlane_contracts::{
        swan::{SwanAgent, SwanMarketplace},
        SolCall, U256,
    };
    use memlane_core::traits::ContractCall;
    use serde_json::Value;

    /// Transport that answers every call with one canned result.
    struct CannedTransport {
        reply: MemlaneResult<Value>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl CannedTransport {
        fn ok(hex: &str) -> Self {
            Self {
                reply: Ok(Value::String(hex.to_string())),
                calls: Mutex::new(vec![]),
            }
        }

        fn reverting() -> Self {
            Self {
                reply: Err(MemlaneError::CallReverted {
                    reason: "execution reverted".into(),
                }),
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl RpcTransport for CannedTransport {
        async fn call(&self, method: &str, params: Value) -> MemlaneResult<Value> {
            self.calls.lock().unwrap().push((method.to_string(), params));
            match &self.reply {
                Ok(v) => Ok(v.clone()),
                Err(MemlaneError::CallReverted { reason }) => Err(MemlaneError::CallReverted {
                    reason: reason.clone(),
                }),
                Err(e) => Err(MemlaneError::Transport { reason: e.to_string() }),
            }
        }
    }

    #[tokio::test]
    async fn sends_eth_call_with_encoded_calldata() {
        let reader = RpcContractReader::new(CannedTransport::ok(&format!("0x{:064x}", 42)));
        let agent = Address::repeat_byte(0x0a);

        let task_id = reader
            .read(agent, SwanAgent::oracleStateRequestsCall { round: U256::from(3u64) })
            .await
            .unwrap()
            ._0;
        assert_eq!(task_id, U256::from(42u64));

        let calls = reader.transport().calls.lock().unwrap();
        let (method, params) = &calls[0];
        assert_eq!(method, "eth_call");
        assert_eq!(params[1], "latest");
        let data = params[0]["data"].as_str().unwrap();
        let selector = hex::encode(SwanAgent::oracleStateRequestsCall::SELECTOR);
        assert!(data.starts_with(&format!("0x{selector}")));
        assert!(data.ends_with(&format!("{:064x}", 3)));
        assert_eq!(
            params[0]["to"].as_str().unwrap().to_lowercase(),
            format!("0x{}", "0a".repeat(20))
        );
    }

    #[tokio::test]
    async fn decodes_dynamic_array_returns() {
        let listed = [Address::repeat_byte(1), Address::repeat_byte(2)];
        let encoded = SwanMarketplace::getListedArtifactsCall::abi_encode_returns(&(listed.to_vec(),));
        let reader = RpcContractReader::new(CannedTransport::ok(&format!("0x{}", hex::encode(encoded))));

        let addresses = reader
            .read(
                Address::ZERO,
                SwanMarketplace::getListedArtifactsCall {
                    agent: Address::repeat_byte(9),
                    round: U256::from(1u64),
                },
            )
            .await
            .unwrap()
            ._0;
        assert_eq!(addresses, listed.to_vec());
    }

    #[tokio::test]
    async fn empty_result_is_decode_error() {
        let reader = RpcContractReader::new(CannedTransport::ok("0x"));
        let err = reader
            .read(Address::ZERO, SwanAgent::treasuryCall {})
            .await
            .unwrap_err();
        assert!(matches!(err, MemlaneError::Decode { .. }));
        assert!(err.to_string().contains("treasury()"));
    }

    #[tokio::test]
    async fn non_hex_result_is_decode_error() {
        let reader = RpcContractReader::new(CannedTransport::ok("0xzz"));
        let err = reader
            .eth_call(Address::ZERO, Bytes::from(vec![0u8; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, MemlaneError::Decode { .. }));
    }

    #[tokio::test]
    async fn revert_passes_through() {
        let reader = RpcContractReader::new(CannedTransport::reverting());
        let err = reader
            .read(
                Address::ZERO,
                SwanAgent::inventoryCall {
                    round: U256::from(1u64),
                    index: U256::ZERO,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MemlaneError::CallReverted { .. }));
    }
}
