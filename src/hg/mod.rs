pub mod blame;
pub mod context;
pub mod parser;
pub mod process;
pub mod provider;
pub mod revision;

pub use blame::extract_blame;
pub use context::{EngineConfig, ExecutionContext};
pub use process::{Invocation, ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use provider::{MercurialProvider, ScmProvider};
pub use revision::current_revision;
