//! Per-container disable and read-only coordination.
//!
//! Each container gets at most one [`Disabler`]. It is attached the first
//! time the container is referenced and mutated in place afterwards.

use std::collections::BTreeMap;

use crate::collaborators::{Disabler, DisablerFactory, DisablerFlag, DisablerSetting};
use crate::config::DisablerOptions;
use crate::selector::Selector;

#[derive(Default)]
pub struct DisableCoordinator {
    attachments: BTreeMap<Selector, Box<dyn Disabler>>,
}

impl DisableCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `flag` on the container's disabler and return the value the
    /// disabler reports afterwards.
    pub fn apply(
        &mut self,
        factory: &mut dyn DisablerFactory,
        target: &Selector,
        options: &DisablerOptions,
        flag: DisablerFlag,
        value: bool,
    ) -> bool {
        let setting = match flag {
            DisablerFlag::Disable => DisablerSetting::Disable(value),
            DisablerFlag::Readonly => DisablerSetting::Readonly(value),
        };
        match self.attachments.get_mut(target) {
            Some(disabler) => {
                disabler.set(setting);
                disabler.set(DisablerSetting::DisabledClass(options.disabled_class.clone()));
                disabler.set(DisablerSetting::Expression(options.expression.clone()));
            }
            None => {
                let mut initial = options.clone();
                initial.disable = flag == DisablerFlag::Disable && value;
                initial.readonly = flag == DisablerFlag::Readonly && value;
                tracing::debug!(target = %target, "attaching disabler");
                self.attachments
                    .insert(target.clone(), factory.attach(target, &initial));
            }
        }
        self.get(target).is_some_and(|d| d.get(flag))
    }

    pub fn get(&self, target: &Selector) -> Option<&dyn Disabler> {
        self.attachments.get(target).map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Drop every attachment.
    pub fn release(&mut self) {
        self.attachments.clear();
    }
}

impl std::fmt::Debug for DisableCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.attachments.keys().map(ToString::to_string))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::MemoryDisablers;

    #[test]
    fn first_reference_attaches_and_later_ones_reuse() {
        let mut factory = MemoryDisablers::new();
        let mut coord = DisableCoordinator::new();
        let pane = Selector::pane("p1");
        let options = DisablerOptions::default();

        assert!(coord.apply(&mut factory, &pane, &options, DisablerFlag::Disable, true));
        assert!(!coord.apply(&mut factory, &pane, &options, DisablerFlag::Readonly, false));
        assert!(coord.apply(&mut factory, &pane, &options, DisablerFlag::Readonly, true));
        assert_eq!(coord.len(), 1);
        assert_eq!(factory.attached(), 1);

        let d = coord.get(&pane).unwrap();
        assert!(d.get(DisablerFlag::Disable));
        assert!(d.get(DisablerFlag::Readonly));
    }

    #[test]
    fn reapplication_propagates_current_options() {
        let mut factory = MemoryDisablers::new();
        let mut coord = DisableCoordinator::new();
        let target = Selector::scoped("p1", Some("form"));
        let mut options = DisablerOptions::default();
        coord.apply(&mut factory, &target, &options, DisablerFlag::Disable, false);

        options.disabled_class = "greyed".into();
        options.expression = "input".into();
        coord.apply(&mut factory, &target, &options, DisablerFlag::Disable, true);

        let d = coord.get(&target).unwrap();
        assert_eq!(d.disabled_class(), "greyed");
        assert_eq!(d.expression(), "input");
    }

    #[test]
    fn containers_get_independent_attachments() {
        let mut factory = MemoryDisablers::new();
        let mut coord = DisableCoordinator::new();
        let options = DisablerOptions::default();
        coord.apply(&mut factory, &Selector::pane("p1"), &options, DisablerFlag::Disable, true);
        coord.apply(
            &mut factory,
            &Selector::scoped("p1", Some("a")),
            &options,
            DisablerFlag::Readonly,
            true,
        );
        assert_eq!(coord.len(), 2);
        coord.release();
        assert!(coord.is_empty());
    }
}
