//! A content-addressed hypergraph knowledge base: typed atoms with
//! probabilistic truth values and economic attention values, a
//! unification-based pattern matcher, pluggable persistence, and a PLN/URE
//! style rule engine over it all.
//!
//! The three load-bearing subsystems are [`atomspace`] (the graph store),
//! [`matcher`] (pattern → grounding queries), and [`attention`] (ECAN's
//! bounded-resource importance allocation); [`rules`] and [`storage`] are
//! built as clients of the first two, exactly as the design separates them.

pub mod atom;
pub mod atomspace;
pub mod attention;
pub mod attention_value;
pub mod cancel;
pub mod config;
pub mod error;
pub mod handle;
pub mod matcher;
pub mod rules;
pub mod storage;
pub mod truth_value;
pub mod types;

pub use atom::{Atom, AtomContent, ContentKey};
pub use atomspace::observer::{AtomSpaceObserver, NullObserver};
pub use atomspace::AtomSpace;
pub use attention::{AllocationEngine, AttentionBank};
pub use attention_value::AttentionValue;
pub use cancel::CancellationToken;
pub use config::{Config, StorageBackendKind};
pub use error::{
    AtomSpaceError, AttentionError, Cancelled, Error, MatcherError, Result, RuleEngineError,
    StorageError,
};
pub use handle::Handle;
pub use matcher::{match_pattern, Grounding, Pattern, PatternTerm, VarDecl};
pub use rules::{backward_chain, forward_chain, BackwardReport, ForwardReport, Rule, Termination, TvFormula};
pub use storage::{AsyncPersistence, KvBackend, MemoryBackend, SqlBackend, StorageBackend, StorageStats};
pub use truth_value::TruthValue;
pub use types::AtomType;
