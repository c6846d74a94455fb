//! Code runner collaborator
//!
//! The coordinator does not run code itself. A [`CodeRunner`] turns cell
//! source into a [`CellRun`]: a lazy, finite sequence of produced values
//! that the coordinator pulls one at a time. Stopping a run means no longer
//! pulling from it, after giving the runner a chance to unwind through
//! [`CellRun::cancel`].

use crate::error::RunFailure;
use nb_model::Produced;

/// One item yielded by a run
pub type RunItem = Result<Produced, RunFailure>;

/// In-progress run of one cell
///
/// Yielding `Err` ends the run; the coordinator does not pull again.
pub trait CellRun: Iterator<Item = RunItem> {
    /// Ask the run to unwind at its next checkpoint
    ///
    /// Returns true once the run has acknowledged the stop. The coordinator
    /// keeps asking, once per tick, until it does.
    fn cancel(&mut self) -> bool {
        true
    }
}

/// Starts runs for cell source text
pub trait CodeRunner {
    /// Run type produced by this runner
    type Run: CellRun;

    /// Start running `source`
    fn start(&mut self, source: &str) -> Self::Run;
}

impl<F, R> CodeRunner for F
where
    F: FnMut(&str) -> R,
    R: CellRun,
{
    type Run = R;

    fn start(&mut self, source: &str) -> R {
        self(source)
    }
}

/// [`CellRun`] over any iterator of run items, acknowledging stops at once
#[derive(Debug, Clone)]
pub struct IterRun<I> {
    inner: I,
}

impl<I> IterRun<I> {
    /// Wrap an iterator
    #[inline]
    #[must_use]
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I: Iterator<Item = RunItem>> Iterator for IterRun<I> {
    type Item = RunItem;

    #[inline]
    fn next(&mut self) -> Option<RunItem> {
        self.inner.next()
    }
}

impl<I: Iterator<Item = RunItem>> CellRun for IterRun<I> {}

/// Wrap an iterator of run items as a [`CellRun`]
#[inline]
pub fn iter_run<I>(items: I) -> IterRun<I::IntoIter>
where
    I: IntoIterator<Item = RunItem>,
{
    IterRun::new(items.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_model::StreamName;

    #[test]
    fn closures_are_runners() {
        let mut runner = |source: &str| {
            iter_run(vec![Ok(Produced::Stream {
                name: StreamName::Stdout,
                text: format!("ran {source}"),
            })])
        };
        let mut run = runner.start("x");
        assert!(matches!(run.next(), Some(Ok(Produced::Stream { .. }))));
        assert!(run.next().is_none());
        assert!(run.cancel());
    }
}
