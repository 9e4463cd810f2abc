use crate::error::FetchError;
use crate::tier::Selections;
use crate::tier::TierSpec;

/// A concrete selection chain: its tiers, its terminal result type, and the
/// user-facing message for every state the controller can land in.
///
/// The engine drives the chain; the flow only answers "what do we say" and
/// "what does the terminal payload look like". Message methods receive the
/// current [`Selections`] so prompts can embed upstream values
/// ("Please select a District in Bihar.").
pub trait Flow {
    /// Payload of the terminal fetch.
    type Results;

    fn tiers(&self) -> &'static [TierSpec];

    /// Prompt asking the user to pick a value for `tier`.
    fn prompt(&self, tier: usize, selections: &Selections) -> String;

    /// Informational message when an options fetch for `tier` succeeds with
    /// zero entries. Defaults to the plain prompt.
    fn empty_options_message(&self, tier: usize, selections: &Selections) -> String {
        self.prompt(tier, selections)
    }

    /// Error message when the options fetch for `tier` fails.
    fn options_error_message(
        &self,
        tier: usize,
        selections: &Selections,
        err: &FetchError,
    ) -> String;

    fn results_is_empty(&self, results: &Self::Results) -> bool;

    /// Informational message when the terminal fetch succeeds but matched
    /// nothing.
    fn empty_results_message(&self, selections: &Selections) -> String;

    /// Message shown alongside a non-empty result set.
    fn results_message(&self, results: &Self::Results, selections: &Selections) -> String;

    /// Error message when the terminal fetch fails.
    fn terminal_error_message(&self, selections: &Selections, err: &FetchError) -> String;
}
