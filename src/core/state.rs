//! Core State trait for signal states.
//!
//! A signal state names the overall mode of a controller (`Open`,
//! `Closed`, ...). The vocabulary is a closed enum known at compile time;
//! which of its members a particular controller supports is decided by
//! the patterns registered at construction.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for signal states.
///
/// All methods are pure. States are small immutable values that identify
/// the current mode of a controller.
///
/// # Required Traits
///
/// - `Copy` + `Eq` + `Hash`: states key the pattern set and transition table
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: notifications and history are serializable
///
/// # Example
///
/// ```rust
/// use signalbox::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Barrier {
///     Raised,
///     Lowering,
///     Lowered,
/// }
///
/// impl State for Barrier {
///     fn name(&self) -> &str {
///         match self {
///             Self::Raised => "Raised",
///             Self::Lowering => "Lowering",
///             Self::Lowered => "Lowered",
///         }
///     }
///
///     fn is_transient(&self) -> bool {
///         matches!(self, Self::Lowering)
///     }
/// }
///
/// assert!(Barrier::Lowering.is_transient());
/// assert!(!Barrier::Lowered.is_transient());
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a transient (intermediate) state.
    ///
    /// Transient states are shown while approaching another state but are
    /// never valid targets of a move request.
    ///
    /// Default implementation returns `false`.
    fn is_transient(&self) -> bool {
        false
    }
}
