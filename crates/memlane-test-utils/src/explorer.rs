//! A paginated explorer serving canned pages.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use memlane_contracts::{
    error::{MemlaneError, MemlaneResult},
    explorer::{ContractRef, InternalTx, InternalTxPage, PageParams},
    Address,
};
use memlane_core::traits::ExplorerApi;

#[derive(Default)]
struct ExplorerState {
    /// Remaining failures per page index.
    failures: HashMap<usize, u32>,
    requests: Vec<Option<PageParams>>,
}

/// Pages are linked by cursor: page `i` carries a cursor whose
/// `items_count` is `i + 1`, and the last page carries none.
#[derive(Default)]
pub struct MockExplorer {
    pages: Vec<Vec<InternalTx>>,
    state: Mutex<ExplorerState>,
}

impl MockExplorer {
    pub fn new(pages: Vec<Vec<InternalTx>>) -> Self {
        Self {
            pages,
            state: Mutex::default(),
        }
    }

    /// Make page `index` fail with `Transport` the next `times` requests.
    pub fn fail_page(&self, index: usize, times: u32) {
        self.state.lock().unwrap().failures.insert(index, times);
    }

    /// Cursors received, in order; `None` is a first-page request.
    pub fn requests(&self) -> Vec<Option<PageParams>> {
        self.state.lock().unwrap().requests.clone()
    }

    /// A contract-creation item for `created` in `block`.
    pub fn creation(created: Address, block: u64) -> InternalTx {
        InternalTx {
            kind: "create".into(),
            created_contract: Some(ContractRef {
                hash: created.to_string(),
            }),
            tx_hash: format!("0x{block:064x}"),
            block_number: block,
            timestamp: Some(format!("2024-11-{:02}T10:00:00.000000Z", (block % 28) + 1)),
        }
    }

    /// A plain value-transfer item.
    pub fn call(block: u64) -> InternalTx {
        InternalTx {
            kind: "call".into(),
            created_contract: None,
            tx_hash: format!("0x{block:064x}"),
            block_number: block,
            timestamp: None,
        }
    }

    fn cursor_for(index: usize) -> PageParams {
        PageParams {
            block_number: 1_000 - index as u64,
            index: 0,
            items_count: index as u64 + 1,
            transaction_index: 0,
        }
    }
}

#[async_trait]
impl ExplorerApi for MockExplorer {
    async fn internal_transactions(
        &self,
        _address: Address,
        _limit: u32,
        cursor: Option<&PageParams>,
    ) -> MemlaneResult<InternalTxPage> {
        let index = cursor.map_or(0, |c| c.items_count as usize);

        let mut state = self.state.lock().unwrap();
        state.requests.push(cursor.cloned());
        if let Some(remaining) = state.failures.get_mut(&index) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(MemlaneError::Transport {
                    reason: format!("page {index} unavailable"),
                });
            }
        }

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_params = (index + 1 < self.pages.len()).then(|| Self::cursor_for(index));
        Ok(InternalTxPage {
            items,
            next_page_params,
        })
    }
}
