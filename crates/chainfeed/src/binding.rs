//! JSON-RPC binding of the aggregator contract.
//!
//! Each accessor is one `eth_call` against `latest`: a 4-byte keccak selector
//! followed by the contributor id as a single 32-byte word. Results are read
//! back as 32-byte ABI words.

use alloy_primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};

use chainfeed_core::contract::AggregatorContract;
use chainfeed_core::error::TransportError;
use chainfeed_core::transport::RpcTransport;
use chainfeed_core::types::ContributorId;

pub const OWNER_SIGNATURE: &str = "owner(bytes32)";
pub const LABEL_SIGNATURE: &str = "label(bytes32)";
pub const MINIMUM_VALID_SIGNATURE: &str = "minimumValid(bytes32)";
pub const TRY_GET_SIGNATURE: &str = "tryGet(bytes32)";

const WORD: usize = 32;

/// Function selector: first four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for a single-`bytes32` accessor.
pub fn encode_call(signature: &str, id: &ContributorId) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(id.as_word().as_slice());
    data
}

/// [`AggregatorContract`] over any [`RpcTransport`].
#[derive(Debug, Clone)]
pub struct RpcAggregatorBinding<T> {
    transport: T,
    address: Address,
    from: Option<Address>,
}

impl<T: RpcTransport> RpcAggregatorBinding<T> {
    pub fn new(transport: T, address: Address) -> Self {
        Self {
            transport,
            address,
            from: None,
        }
    }

    /// Send calls as `from` (the connection's acting account).
    pub fn with_from(mut self, from: Option<Address>) -> Self {
        self.from = from;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn read(
        &self,
        signature: &'static str,
        id: &ContributorId,
        words: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut call = json!({
            "to": self.address,
            "data": format!("0x{}", hex::encode(encode_call(signature, id))),
        });
        if let Some(from) = self.from {
            call["from"] = json!(from);
        }

        let raw: String = self
            .transport
            .call("eth_call", vec![call, Value::String("latest".into())])
            .await?;
        let data = hex::decode(raw.strip_prefix("0x").unwrap_or(&raw)).map_err(|e| {
            TransportError::InvalidResponse(format!("{signature} returned non-hex data: {e}"))
        })?;

        if data.len() < words * WORD {
            return Err(TransportError::InvalidResponse(format!(
                "{signature} returned {} bytes, expected at least {}",
                data.len(),
                words * WORD
            )));
        }
        Ok(data)
    }
}

fn word(data: &[u8], index: usize) -> &[u8] {
    &data[index * WORD..(index + 1) * WORD]
}

#[async_trait]
impl<T: RpcTransport> AggregatorContract for RpcAggregatorBinding<T> {
    fn address(&self) -> Address {
        self.address
    }

    async fn owner(&self, id: &ContributorId) -> Result<Address, TransportError> {
        let data = self.read(OWNER_SIGNATURE, id, 1).await?;
        Ok(Address::from_slice(&word(&data, 0)[12..]))
    }

    async fn label(&self, id: &ContributorId) -> Result<B256, TransportError> {
        let data = self.read(LABEL_SIGNATURE, id, 1).await?;
        Ok(B256::from_slice(word(&data, 0)))
    }

    async fn minimum_valid(&self, id: &ContributorId) -> Result<U256, TransportError> {
        let data = self.read(MINIMUM_VALID_SIGNATURE, id, 1).await?;
        Ok(U256::from_be_slice(word(&data, 0)))
    }

    async fn try_get(&self, id: &ContributorId) -> Result<(U256, bool), TransportError> {
        let data = self.read(TRY_GET_SIGNATURE, id, 2).await?;
        let value = U256::from_be_slice(word(&data, 0));
        let available = word(&data, 1).iter().any(|b| *b != 0);
        Ok((value, available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chainfeed_core::request::{JsonRpcRequest, JsonRpcResponse};

    #[test]
    fn selector_matches_known_erc20_selectors() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn calldata_is_selector_then_id_word() {
        let data = encode_call(OWNER_SIGNATURE, &ContributorId::from(7u64));
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &selector(OWNER_SIGNATURE));
        assert_eq!(data[35], 7);
    }

    fn padded(hex_word: &str) -> String {
        format!("{hex_word:0>64}")
    }

    /// Answers `eth_call` by selector and records the call objects it saw.
    #[derive(Clone, Default)]
    struct FakeContract {
        calls: Arc<Mutex<Vec<Value>>>,
    }

    #[async_trait]
    impl RpcTransport for FakeContract {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            assert_eq!(req.method, "eth_call");
            assert_eq!(req.params[1], "latest");
            let call = req.params[0].clone();
            self.calls.lock().unwrap().push(call.clone());

            let data = hex::decode(call["data"].as_str().unwrap().trim_start_matches("0x")).unwrap();
            let sel: [u8; 4] = data[..4].try_into().unwrap();
            let ret = if sel == selector(OWNER_SIGNATURE) {
                format!("0x{}", padded(&"ab".repeat(20)))
            } else if sel == selector(LABEL_SIGNATURE) {
                let mut label = hex::encode(b"ETHUSD");
                label.push_str(&"0".repeat(64 - label.len()));
                format!("0x{label}")
            } else if sel == selector(MINIMUM_VALID_SIGNATURE) {
                format!("0x{}", padded("3"))
            } else if sel == selector(TRY_GET_SIGNATURE) {
                format!("0x{}{}", padded("2a"), padded("1"))
            } else {
                "0x".to_string()
            };
            Ok(JsonRpcResponse::success(req.id, Value::String(ret)))
        }

        fn url(&self) -> &str {
            "fake://"
        }
    }

    #[tokio::test]
    async fn decodes_every_accessor() {
        let fake = FakeContract::default();
        let address = Address::repeat_byte(0xaa);
        let binding = RpcAggregatorBinding::new(fake.clone(), address);
        let id = ContributorId::from(1u64);

        assert_eq!(binding.address(), address);
        assert_eq!(binding.owner(&id).await.unwrap(), Address::repeat_byte(0xab));
        assert_eq!(&binding.label(&id).await.unwrap()[..6], b"ETHUSD");
        assert_eq!(binding.minimum_valid(&id).await.unwrap(), U256::from(3u64));
        assert_eq!(
            binding.try_get(&id).await.unwrap(),
            (U256::from(42u64), true)
        );

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|c| c.get("from").is_none()));
    }

    #[tokio::test]
    async fn sends_from_when_account_selected() {
        let fake = FakeContract::default();
        let from = Address::repeat_byte(0x0f);
        let binding =
            RpcAggregatorBinding::new(fake.clone(), Address::repeat_byte(0xaa)).with_from(Some(from));
        binding.minimum_valid(&ContributorId::from(1u64)).await.unwrap();

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls[0]["from"], json!(from));
        assert_eq!(calls[0]["to"], json!(Address::repeat_byte(0xaa)));
    }

    #[tokio::test]
    async fn short_return_data_is_invalid_response() {
        struct Empty;

        #[async_trait]
        impl RpcTransport for Empty {
            async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
                Ok(JsonRpcResponse::success(req.id, Value::String("0x".into())))
            }

            fn url(&self) -> &str {
                "empty://"
            }
        }

        let binding = RpcAggregatorBinding::new(Empty, Address::ZERO);
        let err = binding.try_get(&ContributorId::from(1u64)).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }
}
