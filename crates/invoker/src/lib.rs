//! Driving the build tool from code.
//!
//! - [`args::translate`] turns raw tokens into a [`ParsedInvocation`]
//! - [`InvocationRequest`] renders a request back to a command line
//! - [`DistributionSelector`] decides which installation runs it, probing
//!   unknown launchers through [`ExecutableProbe`]
//! - [`BuildInvoker`] spawns the build and streams its output

pub mod args;
pub mod distribution;
pub mod invoker;
pub mod probe;
pub mod request;

pub use args::{InvocationFlags, ParsedInvocation, ReactorFailureBehavior, translate};
pub use distribution::{
    DistributionMode, DistributionSelection, DistributionSelector, ExecutionOptions, Platform,
};
pub use invoker::{BuildInvoker, OutputHandler, RunResult, TracingOutputHandler};
pub use probe::{ExecutableProbe, ProbeOutcome, ProcessProbe};
pub use request::InvocationRequest;
