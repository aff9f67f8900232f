//! AI recipe engine — structured recipe generation, macro annotation, and
//! semantic search.
//!
//! Souschef turns free-form cooking requests ("a cozy vegetarian pasta for
//! two") into structured, nutritionally-annotated recipe records that support
//! semantic similarity search. A request flows through a fixed pipeline:
//!
//! ```text
//! intent → generation → parse/validate → macro calc → embedding → draft | recipe
//! ```
//!
//! # Architecture
//!
//! - **Generation**: an external text-generation provider (Anthropic messages
//!   API, or a deterministic fake for tests) returns structured recipe JSON
//! - **Macros**: calories/protein/carbs/fat computed from the ingredient list
//!   by a pure, total calculator
//! - **Embeddings**: 1536-dimension vectors from an OpenAI-compatible
//!   endpoint, stored in [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for nearest-neighbor retrieval
//! - **Storage**: SQLite for persisted recipes; an in-memory draft store for
//!   candidates awaiting promotion
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization and schema
//! - [`error`] — The pipeline error taxonomy
//! - [`generation`] — Text-generation client: prompt building, provider calls, strict parsing
//! - [`embedding`] — Recipe-to-vector embedding via an external model call
//! - [`recipe`] — Core engine: types, macro calculator, drafts, repository, and the pipeline orchestrator

pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod recipe;
