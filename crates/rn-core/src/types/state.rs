//! Conversion run states.
//!
//! This module provides the [`ConversionState`] enum the orchestrator steps
//! through during one run.

use serde::{Deserialize, Serialize};

/// The state of a conversion run.
///
/// Runs move strictly forward:
/// `Idle -> Ingesting -> Analyzing -> Transforming -> RoutePlacement -> Validating`
/// and end in one of the three terminal states.
///
/// # Examples
///
/// ```
/// use rn_core::ConversionState;
///
/// let state = ConversionState::Idle;
/// assert_eq!(state.next(), Some(ConversionState::Ingesting));
/// assert!(ConversionState::Completed.is_terminal());
/// assert_eq!(ConversionState::Completed.next(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConversionState {
    /// No run in progress.
    #[default]
    Idle,

    /// Normalizing input paths.
    Ingesting,

    /// Running the project analyzer.
    Analyzing,

    /// Running rewrite passes over script files.
    Transforming,

    /// Mapping routes and sources to output paths.
    RoutePlacement,

    /// Checking the output tree for completeness.
    Validating,

    /// The run finished with no warnings or errors.
    Completed,

    /// The run finished, but something was logged at warning or error level.
    ///
    /// Aborted runs also end here.
    CompletedWithWarnings,

    /// An internal fault stopped the run; the output is a minimal project.
    Failed,
}

impl ConversionState {
    /// Returns `true` for the three terminal states.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithWarnings | Self::Failed
        )
    }

    /// Returns the next non-terminal stage, or `None` once `Validating` is
    /// reached (the terminal state depends on the outcome).
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Ingesting),
            Self::Ingesting => Some(Self::Analyzing),
            Self::Analyzing => Some(Self::Transforming),
            Self::Transforming => Some(Self::RoutePlacement),
            Self::RoutePlacement => Some(Self::Validating),
            Self::Validating | Self::Completed | Self::CompletedWithWarnings | Self::Failed => {
                None
            }
        }
    }

    /// Returns a human-readable label for this state.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Ingesting => "Ingesting",
            Self::Analyzing => "Analyzing",
            Self::Transforming => "Transforming",
            Self::RoutePlacement => "Route placement",
            Self::Validating => "Validating",
            Self::Completed => "Completed",
            Self::CompletedWithWarnings => "Completed with warnings",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for ConversionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
