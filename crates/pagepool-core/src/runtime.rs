//! Engine module lifecycle.
//!
//! Subsystems that participate in the engine lifecycle implement
//! [`RuntimeModule`]; a [`ModuleHost`] owns them and drives initialization
//! in registration order, per-frame ticks, and finalization in reverse
//! order.

/// A subsystem driven by the engine lifecycle.
pub trait RuntimeModule {
    /// Brings the module to its ready state. Must be idempotent.
    fn initialize(&mut self);

    /// Releases everything the module owns.
    fn finalize(&mut self);

    /// Per-frame bookkeeping hook.
    fn tick(&mut self);
}

/// Ordered collection of engine modules.
pub struct ModuleHost {
    modules: Vec<Box<dyn RuntimeModule>>,
}

impl ModuleHost {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Adds a module. Initialization order follows registration order.
    pub fn register(&mut self, module: Box<dyn RuntimeModule>) {
        self.modules.push(module);
    }

    /// Initializes every module in registration order.
    pub fn initialize_all(&mut self) {
        for module in &mut self.modules {
            module.initialize();
        }
    }

    /// Ticks every module in registration order.
    pub fn tick_all(&mut self) {
        for module in &mut self.modules {
            module.tick();
        }
    }

    /// Finalizes every module in reverse registration order, so later
    /// modules release their resources before the modules they depend on.
    pub fn finalize_all(&mut self) {
        for module in self.modules.iter_mut().rev() {
            module.finalize();
        }
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when no module is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleHost {
    fn default() -> Self {
        Self::new()
    }
}
