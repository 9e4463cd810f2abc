use std::collections::BTreeSet;

use tracing::debug;
use tracing::warn;

use crate::error::FetchError;
use crate::flow::Flow;
use crate::tier::OptionItem;
use crate::tier::Selections;

/// What a [`FetchTicket`] asks the caller to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    /// Options for the given tier.
    Options(usize),
    /// The terminal data fetch (referral search / KPI rows).
    Terminal,
}

/// Descriptor of one fetch the caller must run.
///
/// The ticket is a pure function of the selection state at issue time: it
/// carries a snapshot of the selections (from which the request URL is
/// built) and the generation the outcome will be checked against. A ticket
/// must always be resolved by passing it back to
/// [`CascadeController::apply_options`] or
/// [`CascadeController::apply_terminal`], even if the fetch failed;
/// otherwise the loading indicator stays on.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub target: FetchTarget,
    pub selections: Selections,
    generation: u64,
}

/// User-facing status line of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing to say (typically: a fetch is in flight).
    Idle,
    Info(String),
    Error(String),
}

impl Status {
    pub fn message(&self) -> Option<&str> {
        match self {
            Status::Info(msg) => Some(msg),
            Status::Idle | Status::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Status::Error(msg) => Some(msg),
            Status::Idle | Status::Info(_) => None,
        }
    }
}

/// Result of feeding a fetch outcome back into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The outcome matched the current selection state and was applied.
    Applied,
    /// The triggering selection changed while the fetch was in flight; the
    /// outcome was discarded without touching any state.
    Stale,
}

/// The cascading-selection state machine.
///
/// One instance per page flow. All mutation goes through [`select`] and the
/// two `apply_*` methods; there is no other writer, and no fetch outcome is
/// ever applied against selections it was not issued for.
///
/// [`select`]: CascadeController::select
pub struct CascadeController<F: Flow> {
    flow: F,
    selections: Selections,
    options: Vec<Vec<OptionItem>>,
    /// Bumped for a tier whenever an upstream change invalidates whatever
    /// fetch may be in flight for it. Tickets echo the value at issue time.
    generations: Vec<u64>,
    terminal_generation: u64,
    results: Option<F::Results>,
    expanded: BTreeSet<String>,
    status: Status,
    in_flight: usize,
}

impl<F: Flow> CascadeController<F> {
    pub fn new(flow: F) -> Self {
        let tier_count = flow.tiers().len();
        Self {
            flow,
            selections: Selections::new(tier_count),
            options: vec![Vec::new(); tier_count],
            generations: vec![0; tier_count],
            terminal_generation: 0,
            results: None,
            expanded: BTreeSet::new(),
            status: Status::Idle,
            in_flight: 0,
        }
    }

    /// Issue the initial options fetch for the first tier. Runs once at
    /// startup; every later fetch is driven by a selection.
    pub fn bootstrap(&mut self) -> FetchTicket {
        self.in_flight += 1;
        self.status = Status::Idle;
        FetchTicket {
            target: FetchTarget::Options(0),
            selections: self.selections.clone(),
            generation: self.generations[0],
        }
    }

    /// Set `tier` to `value`, cascade-clearing everything downstream.
    ///
    /// Returns the fetch the caller must now run: the next tier's options,
    /// or the terminal fetch when `tier` is the last one. Returns `None`
    /// when `value` is empty (the status reverts to the tier's own prompt)
    /// or when the selection is rejected because an upstream tier is still
    /// unselected.
    pub fn select(&mut self, tier: usize, value: impl Into<String>) -> Option<FetchTicket> {
        let value = value.into();
        let tier_count = self.flow.tiers().len();
        if tier >= tier_count {
            warn!(tier, "selection for unknown tier ignored");
            return None;
        }
        if !value.is_empty() && !self.selections.upstream_set(tier) {
            warn!(
                tier = self.flow.tiers()[tier].key,
                "selection rejected: upstream tier is unselected"
            );
            return None;
        }

        self.selections.set(tier, value);
        self.selections.clear_from(tier + 1);
        for t in tier + 1..tier_count {
            self.options[t].clear();
            self.generations[t] += 1;
        }
        self.terminal_generation += 1;
        self.results = None;
        self.expanded.clear();

        if !self.selections.is_set(tier) {
            self.status = Status::Info(self.flow.prompt(tier, &self.selections));
            return None;
        }

        // Message and error are cleared for the duration of the fetch.
        self.status = Status::Idle;
        self.in_flight += 1;
        let (target, generation) = if tier + 1 == tier_count {
            (FetchTarget::Terminal, self.terminal_generation)
        } else {
            (FetchTarget::Options(tier + 1), self.generations[tier + 1])
        };
        debug!(
            tier = self.flow.tiers()[tier].key,
            ?target,
            "selection accepted, fetch issued"
        );
        Some(FetchTicket {
            target,
            selections: self.selections.clone(),
            generation,
        })
    }

    /// Apply the outcome of an options fetch issued by [`select`] or
    /// [`bootstrap`].
    ///
    /// [`select`]: CascadeController::select
    /// [`bootstrap`]: CascadeController::bootstrap
    pub fn apply_options(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<OptionItem>, FetchError>,
    ) -> ApplyOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let FetchTarget::Options(tier) = ticket.target else {
            warn!("terminal ticket passed to apply_options; discarding");
            return ApplyOutcome::Stale;
        };
        if ticket.generation != self.generations[tier] {
            debug!(
                tier = self.flow.tiers()[tier].key,
                "stale options response discarded"
            );
            return ApplyOutcome::Stale;
        }

        match outcome {
            Ok(options) => {
                self.status = if options.is_empty() {
                    Status::Info(self.flow.empty_options_message(tier, &self.selections))
                } else {
                    Status::Info(self.flow.prompt(tier, &self.selections))
                };
                self.options[tier] = options;
            }
            Err(err) => {
                self.options[tier].clear();
                self.status = Status::Error(self.flow.options_error_message(
                    tier,
                    &self.selections,
                    &err,
                ));
            }
        }
        ApplyOutcome::Applied
    }

    /// Apply the outcome of the terminal fetch.
    pub fn apply_terminal(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<F::Results, FetchError>,
    ) -> ApplyOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.target != FetchTarget::Terminal {
            warn!("options ticket passed to apply_terminal; discarding");
            return ApplyOutcome::Stale;
        }
        if ticket.generation != self.terminal_generation {
            debug!("stale terminal response discarded");
            return ApplyOutcome::Stale;
        }

        match outcome {
            Ok(results) => {
                self.status = if self.flow.results_is_empty(&results) {
                    Status::Info(self.flow.empty_results_message(&self.selections))
                } else {
                    Status::Info(self.flow.results_message(&results, &self.selections))
                };
                self.results = Some(results);
            }
            Err(err) => {
                self.results = None;
                self.status =
                    Status::Error(self.flow.terminal_error_message(&self.selections, &err));
            }
        }
        ApplyOutcome::Applied
    }

    /// Toggle the expanded/collapsed state of a result category.
    ///
    /// Purely presentational; cleared by any cascade reset.
    pub fn toggle_category(&mut self, category: &str) {
        if !self.expanded.remove(category) {
            self.expanded.insert(category.to_string());
        }
    }

    pub fn is_expanded(&self, category: &str) -> bool {
        self.expanded.contains(category)
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Options currently available for `tier` (empty until fetched).
    pub fn options(&self, tier: usize) -> &[OptionItem] {
        self.options.get(tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn results(&self) -> Option<&F::Results> {
        self.results.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// True while any fetch belonging to this controller is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// State-machine position: index of the deepest selected tier.
    pub fn highest_selected_tier(&self) -> Option<usize> {
        self.selections.highest_set()
    }
}
