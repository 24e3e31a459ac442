use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::collaborators::{Disabler, DisablerFactory, DisablerFlag, DisablerSetting};
use crate::config::DisablerOptions;
use crate::selector::Selector;

type Registry = Rc<RefCell<BTreeMap<Selector, DisablerOptions>>>;

/// Records the settings of every attached disabler so a host can render them.
#[derive(Debug, Clone, Default)]
pub struct MemoryDisablers {
    registry: Registry,
}

impl MemoryDisablers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of containers a disabler has been attached to.
    pub fn attached(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Current settings of the disabler attached to `target`.
    pub fn settings(&self, target: &Selector) -> Option<DisablerOptions> {
        self.registry.borrow().get(target).cloned()
    }
}

impl DisablerFactory for MemoryDisablers {
    fn attach(&mut self, target: &Selector, options: &DisablerOptions) -> Box<dyn Disabler> {
        self.registry
            .borrow_mut()
            .insert(target.clone(), options.clone());
        Box::new(MemoryDisabler {
            registry: Rc::clone(&self.registry),
            target: target.clone(),
            options: options.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MemoryDisabler {
    registry: Registry,
    target: Selector,
    options: DisablerOptions,
}

impl Disabler for MemoryDisabler {
    fn set(&mut self, setting: DisablerSetting) {
        match setting {
            DisablerSetting::Disable(v) => self.options.disable = v,
            DisablerSetting::Readonly(v) => self.options.readonly = v,
            DisablerSetting::DisabledClass(v) => self.options.disabled_class = v,
            DisablerSetting::Expression(v) => self.options.expression = v,
        }
        self.registry
            .borrow_mut()
            .insert(self.target.clone(), self.options.clone());
    }

    fn get(&self, flag: DisablerFlag) -> bool {
        match flag {
            DisablerFlag::Disable => self.options.disable,
            DisablerFlag::Readonly => self.options.readonly,
        }
    }

    fn disabled_class(&self) -> &str {
        &self.options.disabled_class
    }

    fn expression(&self) -> &str {
        &self.options.expression
    }
}
