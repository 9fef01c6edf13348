//! # memlane-diary
//!
//! Turns a round's on-chain oracle output into a [`DiaryEntry`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use memlane_diary::DiaryResolver;
//!
//! let resolver = DiaryResolver::from_settings(reader, content, &config.contracts);
//! if let Some(entry) = resolver.resolve(agent, 3).await {
//!     println!("{:?}: {}", entry.sentiment, entry.content);
//! }
//! ```
//!
//! The text helpers ([`extract_diary_text`], [`classify`], [`parse_persona`])
//! are pure and usable on their own.
//!
//! [`DiaryEntry`]: memlane_contracts::diary::DiaryEntry

pub mod persona;
pub mod resolver;
pub mod sections;
pub mod sentiment;

pub use persona::{key_decisions, parse_persona, Persona};
pub use resolver::{content_reference, AgentDiary, DiaryResolver};
pub use sections::{extract_diary_text, scan_sections, strip_markup, Section, SectionKind};
pub use sentiment::{classify, SentimentTally};
