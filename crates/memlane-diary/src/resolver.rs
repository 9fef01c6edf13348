//! Diary resolution for a single `(agent, round)`.
//!
//! ```text
//! oracleStateRequests(round) ──► task id (0 = no entry)
//!        │
//!        ▼
//! raw oracle output ──► text ──► {"arweave": id}? ──► fetched document
//!                                                          │
//!                                      sections ◄──────────┘
//!                                         │
//!                                         ▼
//!                                  sentiment + decisions
//! ```
//!
//! Where the raw output is read from depends on the deployment; see
//! [`DiarySource`]. A failed off-chain fetch still yields an entry whose body
//! is a placeholder naming the failure, marked `Unresolved` so that a later
//! successful fetch replaces it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use memlane_config::{ContractSettings, DiarySource};
use memlane_contracts::{
    diary::{ContentStatus, DiaryEntry},
    error::{MemlaneError, MemlaneResult},
    scan::SlotOutcome,
    swan::{LLMOracleCoordinator, SwanAgent},
    value::RawValue,
    Address, Bytes, U256,
};
use memlane_core::traits::{ContentStore, ContractCall, ContractReader, RoundProbe};

use crate::persona::key_decisions;
use crate::sections::extract_diary_text;
use crate::sentiment::SentimentTally;

/// JSON member that carries an Arweave transaction id.
const CONTENT_REF_FIELD: &str = "arweave";

/// Text an entry is built from, after any off-chain dereference.
struct WorkingText {
    text: String,
    status: ContentStatus,
    content_ref: Option<String>,
}

pub struct DiaryResolver {
    reader: Arc<dyn ContractReader>,
    content: Arc<dyn ContentStore>,
    source: DiarySource,
    coordinator: Address,
}

impl DiaryResolver {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        content: Arc<dyn ContentStore>,
        source: DiarySource,
        coordinator: Address,
    ) -> Self {
        Self {
            reader,
            content,
            source,
            coordinator,
        }
    }

    pub fn from_settings(
        reader: Arc<dyn ContractReader>,
        content: Arc<dyn ContentStore>,
        contracts: &ContractSettings,
    ) -> Self {
        Self::new(reader, content, contracts.diary_source, contracts.oracle_coordinator)
    }

    /// The entry for `round`, or `None` when the round has none or any read
    /// before sentiment failed. Failures are logged, never returned.
    pub async fn resolve(&self, agent: Address, round: u64) -> Option<DiaryEntry> {
        match self.try_resolve(agent, round).await {
            Ok(entry) => Some(entry),
            Err(e) if e.is_gap() => {
                debug!(agent = %agent, round, reason = %e, "no diary entry");
                None
            }
            Err(e) => {
                warn!(agent = %agent, round, error = %e, "diary resolution failed");
                None
            }
        }
    }

    /// Like `resolve`, surfacing errors. A round without an entry is a
    /// `ResolutionGap`.
    pub async fn try_resolve(&self, agent: Address, round: u64) -> MemlaneResult<DiaryEntry> {
        let call = SwanAgent::oracleStateRequestsCall {
            round: U256::from(round),
        };
        let task_id = self.reader.read(agent, call).await?._0;
        if task_id.is_zero() {
            return Err(MemlaneError::gap(format!("no oracle task for round {round}")));
        }

        let raw = self.read_raw_output(agent, task_id).await?;
        let text = RawValue::from_payload(&raw).decode_text()?;
        if text.trim().is_empty() {
            return Err(MemlaneError::gap(format!("oracle task {task_id} has empty output")));
        }

        let working = self.dereference(text).await;
        let content = match working.status {
            ContentStatus::Resolved => extract_diary_text(&working.text),
            ContentStatus::Unresolved => working.text.clone(),
        };
        if content.is_empty() {
            return Err(MemlaneError::gap(format!("diary for round {round} has no content after extraction")));
        }

        let tally = SentimentTally::of(&content);
        Ok(DiaryEntry {
            round,
            decisions: key_decisions(&content),
            sentiment: tally.label(),
            sentiment_score: tally.score(),
            content,
            status: working.status,
            timestamp: Utc::now(),
            content_ref: working.content_ref,
        })
    }

    /// Probe adapter for the round scanner.
    pub fn for_agent(&self, agent: Address) -> AgentDiary<'_> {
        AgentDiary {
            resolver: self,
            agent,
        }
    }

    async fn read_raw_output(&self, agent: Address, task_id: U256) -> MemlaneResult<Bytes> {
        match self.source {
            DiarySource::AgentOracleResult => {
                let call = SwanAgent::oracleResultCall { taskId: task_id };
                Ok(self.reader.read(agent, call).await?._0)
            }
            DiarySource::CoordinatorBestResponse => {
                let call = LLMOracleCoordinator::getBestResponseCall { taskId: task_id };
                Ok(self.reader.read(self.coordinator, call).await?._0.output)
            }
        }
    }

    async fn dereference(&self, text: String) -> WorkingText {
        let Some(id) = content_reference(&text) else {
            return WorkingText {
                text,
                status: ContentStatus::Resolved,
                content_ref: None,
            };
        };

        match self.content.fetch(&id).await {
            Ok(document) => WorkingText {
                text: document,
                status: ContentStatus::Resolved,
                content_ref: Some(id),
            },
            Err(e) => {
                warn!(content_ref = %id, error = %e, "off-chain diary fetch failed");
                WorkingText {
                    text: format!("[diary content unavailable: {e}]"),
                    status: ContentStatus::Unresolved,
                    content_ref: Some(id),
                }
            }
        }
    }
}

/// The `arweave` id in a JSON object, if `text` is one.
pub fn content_reference(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let id = value.get(CONTENT_REF_FIELD)?.as_str()?.trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// One agent's diary as a [`RoundProbe`]: one slot per round.
pub struct AgentDiary<'a> {
    resolver: &'a DiaryResolver,
    agent: Address,
}

#[async_trait]
impl RoundProbe for AgentDiary<'_> {
    type Item = DiaryEntry;

    async fn probe(&self, round: u64, _slot: u64) -> MemlaneResult<SlotOutcome<DiaryEntry>> {
        Ok(match self.resolver.resolve(self.agent, round).await {
            Some(entry) => SlotOutcome::Found(entry),
            None => SlotOutcome::Exhausted,
        })
    }

    fn slots_per_round(&self) -> Option<u64> {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memlane_contracts::{diary::Sentiment, scan::ScanOptions};
    use memlane_core::scan_rounds;
    use memlane_test_utils::{addr, MockChain, MockContent};

    const COORDINATOR: u8 = 0xc0;

    fn make_resolver(chain: &Arc<MockChain>, content: &Arc<MockContent>, source: DiarySource) -> DiaryResolver {
        DiaryResolver::new(chain.clone(), content.clone(), source, addr(COORDINATOR))
    }

    fn setup() -> (Arc<MockChain>, Arc<MockContent>) {
        (Arc::new(MockChain::new()), Arc::new(MockContent::new()))
    }

    // ── Inline text ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn resolves_inline_sections_with_sentiment() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(
            agent,
            1,
            7,
            Some("<observe>Prices went up.</observe>\n<journal>A great success.\nI decided to buy.</journal>"),
        );

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        let entry = resolver.resolve(agent, 1).await.unwrap();

        assert_eq!(entry.round, 1);
        assert_eq!(entry.content, "Prices went up.\n\nA great success.\nI decided to buy.");
        assert_eq!(entry.status, ContentStatus::Resolved);
        assert_eq!(entry.sentiment, Sentiment::Positive);
        assert!(entry.sentiment_score > 0.0);
        assert_eq!(entry.decisions, vec!["I decided to buy."]);
        assert!(entry.content_ref.is_none());
        assert!(content.fetches().is_empty());
    }

    #[tokio::test]
    async fn zero_task_id_is_absent_without_reading_output() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 2, 0, None);

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        assert!(resolver.resolve(agent, 2).await.is_none());
        assert!(resolver.try_resolve(agent, 2).await.unwrap_err().is_gap());
        assert_eq!(chain.call_count::<SwanAgent::oracleResultCall>(), 0);
    }

    #[tokio::test]
    async fn blank_output_is_a_gap() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 2, 6, Some("   "));

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        let err = resolver.try_resolve(agent, 2).await.unwrap_err();
        assert!(err.is_gap());
        assert!(err.to_string().contains("oracle task 6"));
    }

    #[tokio::test]
    async fn read_failure_is_absent() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 3, 9, None);

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        assert!(resolver.resolve(agent, 3).await.is_none());
        let err = resolver.try_resolve(agent, 3).await.unwrap_err();
        assert!(matches!(err, MemlaneError::CallReverted { .. }));
    }

    #[tokio::test]
    async fn hex_text_output_is_decoded() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 4, 11, None);
        // "bad day", hex-encoded before it was stored.
        chain.set_oracle_result(agent, 11, b"0x62616420646179");

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        let entry = resolver.resolve(agent, 4).await.unwrap();
        assert_eq!(entry.content, "bad day");
        assert_eq!(entry.sentiment, Sentiment::Negative);
    }

    // ── Off-chain content ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn arweave_reference_is_fetched() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 1, 5, Some(r#"{"arweave":"tx_abc-1"}"#));
        content.insert("tx_abc-1", "## JOURNAL ##\nAll good today.\n");

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        let entry = resolver.resolve(agent, 1).await.unwrap();

        assert_eq!(entry.content, "All good today.");
        assert_eq!(entry.status, ContentStatus::Resolved);
        assert_eq!(entry.content_ref.as_deref(), Some("tx_abc-1"));
        assert_eq!(content.fetches(), vec!["tx_abc-1"]);
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_placeholder() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 1, 5, Some(r#"{"arweave":"missing"}"#));

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        let entry = resolver.resolve(agent, 1).await.unwrap();

        assert_eq!(entry.status, ContentStatus::Unresolved);
        assert!(entry.content.starts_with("[diary content unavailable:"));
        assert!(entry.content.contains("HTTP 404"));
        assert_eq!(entry.content_ref.as_deref(), Some("missing"));
    }

    #[test]
    fn content_reference_requires_json_object_with_id() {
        assert_eq!(content_reference(r#" {"arweave": "abc"} "#).as_deref(), Some("abc"));
        assert_eq!(content_reference(r#"{"arweave": ""}"#), None);
        assert_eq!(content_reference(r#"{"other": "abc"}"#), None);
        assert_eq!(content_reference("plain diary text"), None);
    }

    // ── Coordinator source ────────────────────────────────────────────────────

    #[tokio::test]
    async fn coordinator_source_reads_best_response_output() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 1, 21, None);
        chain.set_best_response(addr(COORDINATOR), 21, b"<journal>Quiet round.</journal>");

        let resolver = make_resolver(&chain, &content, DiarySource::CoordinatorBestResponse);
        let entry = resolver.resolve(agent, 1).await.unwrap();

        assert_eq!(entry.content, "Quiet round.");
        assert_eq!(entry.sentiment, Sentiment::Neutral);
        assert_eq!(chain.call_count::<SwanAgent::oracleResultCall>(), 0);
    }

    // ── Scanning ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn scanning_skips_rounds_without_entries() {
        let (chain, content) = setup();
        let agent = addr(1);
        chain.set_diary(agent, 1, 1, Some("A great success"));
        chain.set_diary(agent, 2, 0, None);
        chain.set_diary(agent, 3, 3, Some("A terrible loss"));

        let resolver = make_resolver(&chain, &content, DiarySource::AgentOracleResult);
        let page = scan_rounds(&resolver.for_agent(agent), 1, 3, &ScanOptions::default()).await;

        let rounds: Vec<u64> = page.items.iter().map(|e| e.round).collect();
        assert_eq!(rounds, vec![1, 3]);
        assert_eq!(page.items[0].sentiment, Sentiment::Positive);
        assert_eq!(page.items[1].sentiment, Sentiment::Negative);
        assert_eq!(page.cursor.end_round, 3);

        let mut probed: Vec<u64> = chain
            .calls_to::<SwanAgent::oracleStateRequestsCall>()
            .iter()
            .map(|c| c.round.to::<u64>())
            .collect();
        probed.sort_unstable();
        assert_eq!(probed, vec![1, 2, 3]);
    }
}
