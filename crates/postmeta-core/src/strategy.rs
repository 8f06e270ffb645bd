//! Ordered fallback strategies: try each source in turn, first value wins

/// A named way of obtaining a value.
///
/// `Ok(None)` means "no answer from this source", `Err` means it failed;
/// both fall through to the next strategy.
pub struct Strategy<'a, T> {
    name: &'static str,
    run: Box<dyn FnOnce() -> anyhow::Result<Option<T>> + 'a>,
}

impl<'a, T> Strategy<'a, T> {
    pub fn new(
        name: &'static str,
        run: impl FnOnce() -> anyhow::Result<Option<T>> + 'a,
    ) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Value produced by [`first_success`] together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub strategy: &'static str,
    pub value: T,
}

/// Run strategies in order and return the first value produced.
///
/// Later strategies are not run once one succeeds.
pub fn first_success<T>(strategies: Vec<Strategy<'_, T>>) -> Option<Resolved<T>> {
    for strategy in strategies {
        let name = strategy.name;
        match (strategy.run)() {
            Ok(Some(value)) => {
                log::debug!("strategy '{name}' produced a value");
                return Some(Resolved {
                    strategy: name,
                    value,
                });
            }
            Ok(None) => log::debug!("strategy '{name}' had no value"),
            Err(e) => log::warn!("strategy '{name}' failed: {e:#}"),
        }
    }
    None
}
