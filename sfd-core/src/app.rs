//! Component lifecycle registry
//!
//! Generated wiring code registers every configured component here. The
//! registry then drives `setup` in priority order, `loop_once` on every
//! main-loop pass and `dump_config` on request.

use core::cell::RefCell;

use heapless::Vec;
use log::{debug, info, warn};

use crate::config::SetupPriority;
use crate::traits::{Component, ComponentError, UartDevice};

/// Errors from registering or binding components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    /// Registry capacity exhausted
    TooManyComponents,
    /// Component is borrowed elsewhere
    Busy,
    /// Device already has a UART bus attached
    UartAlreadyBound,
}

/// Lifecycle state of a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComponentState {
    /// Registered, setup not yet run
    Construction,
    /// Setup succeeded, driven by the main loop
    Loop,
    /// A hook returned an error; no longer driven
    Failed(ComponentError),
}

impl ComponentState {
    /// Check if the component is still being driven
    pub fn is_active(&self) -> bool {
        !matches!(self, ComponentState::Failed(_))
    }

    /// State after a hook returned `result`
    fn after(self, result: Result<(), ComponentError>) -> Self {
        match result {
            Ok(()) => ComponentState::Loop,
            Err(e) => ComponentState::Failed(e),
        }
    }
}

struct Entry<'a> {
    id: &'a str,
    component: &'a RefCell<dyn Component + 'a>,
    priority: SetupPriority,
    state: ComponentState,
}

/// Registry of up to `N` components
pub struct App<'a, const N: usize> {
    entries: Vec<Entry<'a>, N>,
}

impl<'a, const N: usize> Default for App<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> App<'a, N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a component
    ///
    /// `priority` overrides the component's own
    /// [`Component::setup_priority`]. Components with equal priority are set
    /// up in registration order.
    pub fn register_component(
        &mut self,
        id: &'a str,
        component: &'a RefCell<dyn Component + 'a>,
        priority: Option<SetupPriority>,
    ) -> Result<(), AppError> {
        let priority = match priority {
            Some(p) => p,
            None => component.try_borrow().map_err(|_| AppError::Busy)?.setup_priority(),
        };

        // Keep entries sorted by descending priority, stable for ties
        let index = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());

        let entry = Entry {
            id,
            component,
            priority,
            state: ComponentState::Construction,
        };
        self.entries
            .insert(index, entry)
            .map_err(|_| AppError::TooManyComponents)?;

        debug!("Registered component '{}' (priority {})", id, priority);
        Ok(())
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lifecycle state of the component registered as `id`
    pub fn state_of(&self, id: &str) -> Option<ComponentState> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.state)
    }

    /// Registered ids in setup order
    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Run `setup` on every component not yet set up
    ///
    /// Returns the number of components that failed.
    pub fn setup(&mut self) -> usize {
        let mut failed = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.state == ComponentState::Construction)
        {
            debug!("Setting up '{}'", entry.id);
            let result = match entry.component.try_borrow_mut() {
                Ok(mut component) => component.setup(),
                Err(_) => {
                    warn!("Component '{}' busy during setup", entry.id);
                    continue;
                }
            };
            entry.state = entry.state.after(result);
            if let ComponentState::Failed(e) = entry.state {
                warn!("Component '{}' failed setup: {:?}", entry.id, e);
                failed += 1;
            }
        }
        failed
    }

    /// Run one main-loop pass over all set-up components
    pub fn loop_once(&mut self) {
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.state == ComponentState::Loop)
        {
            let Ok(mut component) = entry.component.try_borrow_mut() else {
                continue;
            };
            let result = component.loop_once();
            entry.state = entry.state.after(result);
            if let ComponentState::Failed(e) = entry.state {
                warn!("Component '{}' failed: {:?}", entry.id, e);
            }
        }
    }

    /// Log the configuration of every component
    pub fn dump_config(&self) {
        for entry in &self.entries {
            info!("{} (priority {}):", entry.id, entry.priority);
            if let ComponentState::Failed(e) = entry.state {
                warn!("  marked failed: {:?}", e);
            }
            if let Ok(component) = entry.component.try_borrow() {
                component.dump_config();
            }
        }
    }
}

/// Attach `bus` to a UART device
pub fn register_uart_device<D: UartDevice>(device: &RefCell<D>, bus: D::Bus) -> Result<(), AppError> {
    let mut device = device.try_borrow_mut().map_err(|_| AppError::Busy)?;
    if device.has_uart_parent() {
        return Err(AppError::UartAlreadyBound);
    }
    device.set_uart_parent(bus);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use sfd_hal::uart::{ErrorType, UartRx, UartTx};

    /// Records the order in which hooks run
    struct Journal {
        log: RefCell<std::vec::Vec<&'static str>>,
    }

    struct Probe<'j> {
        name: &'static str,
        journal: &'j Journal,
        priority: SetupPriority,
        fail_setup: bool,
        fail_loop_after: Option<u32>,
        loops: Cell<u32>,
    }

    impl<'j> Probe<'j> {
        fn new(name: &'static str, journal: &'j Journal, priority: SetupPriority) -> Self {
            Self {
                name,
                journal,
                priority,
                fail_setup: false,
                fail_loop_after: None,
                loops: Cell::new(0),
            }
        }
    }

    impl Component for Probe<'_> {
        fn setup(&mut self) -> Result<(), ComponentError> {
            self.journal.log.borrow_mut().push(self.name);
            if self.fail_setup {
                Err(ComponentError::Communication)
            } else {
                Ok(())
            }
        }

        fn loop_once(&mut self) -> Result<(), ComponentError> {
            let n = self.loops.get() + 1;
            self.loops.set(n);
            match self.fail_loop_after {
                Some(limit) if n > limit => Err(ComponentError::Communication),
                _ => Ok(()),
            }
        }

        fn setup_priority(&self) -> SetupPriority {
            self.priority
        }
    }

    #[test]
    fn test_setup_runs_in_priority_order() {
        let journal = Journal {
            log: RefCell::new(std::vec::Vec::new()),
        };
        let late = RefCell::new(Probe::new("late", &journal, SetupPriority::LATE));
        let data_a = RefCell::new(Probe::new("data_a", &journal, SetupPriority::DATA));
        let bus = RefCell::new(Probe::new("bus", &journal, SetupPriority::BUS));
        let data_b = RefCell::new(Probe::new("data_b", &journal, SetupPriority::DATA));

        let mut app: App<'_, 4> = App::new();
        app.register_component("late", &late, None).unwrap();
        app.register_component("data_a", &data_a, None).unwrap();
        app.register_component("bus", &bus, None).unwrap();
        app.register_component("data_b", &data_b, None).unwrap();

        assert_eq!(app.setup(), 0);
        assert_eq!(
            *journal.log.borrow(),
            ["bus", "data_a", "data_b", "late"]
        );
        assert_eq!(app.state_of("bus"), Some(ComponentState::Loop));
    }

    #[test]
    fn test_priority_override() {
        let journal = Journal {
            log: RefCell::new(std::vec::Vec::new()),
        };
        let first = RefCell::new(Probe::new("first", &journal, SetupPriority::DATA));
        let second = RefCell::new(Probe::new("second", &journal, SetupPriority::DATA));

        let mut app: App<'_, 2> = App::new();
        app.register_component("first", &first, None).unwrap();
        app.register_component("second", &second, Some(SetupPriority::HARDWARE))
            .unwrap();

        let order: std::vec::Vec<&str> = app.ids().collect();
        assert_eq!(order, ["second", "first"]);
    }

    #[test]
    fn test_failed_component_is_skipped() {
        let journal = Journal {
            log: RefCell::new(std::vec::Vec::new()),
        };
        let mut broken = Probe::new("broken", &journal, SetupPriority::DATA);
        broken.fail_setup = true;
        let broken = RefCell::new(broken);
        let mut flaky = Probe::new("flaky", &journal, SetupPriority::DATA);
        flaky.fail_loop_after = Some(2);
        let flaky = RefCell::new(flaky);

        let mut app: App<'_, 2> = App::new();
        app.register_component("broken", &broken, None).unwrap();
        app.register_component("flaky", &flaky, None).unwrap();

        assert_eq!(app.setup(), 1);
        assert_eq!(
            app.state_of("broken"),
            Some(ComponentState::Failed(ComponentError::Communication))
        );

        for _ in 0..5 {
            app.loop_once();
        }
        assert_eq!(broken.borrow().loops.get(), 0);
        assert_eq!(flaky.borrow().loops.get(), 3);
        assert!(!app.state_of("flaky").unwrap().is_active());
    }

    #[test]
    fn test_capacity() {
        let journal = Journal {
            log: RefCell::new(std::vec::Vec::new()),
        };
        let a = RefCell::new(Probe::new("a", &journal, SetupPriority::DATA));
        let b = RefCell::new(Probe::new("b", &journal, SetupPriority::DATA));

        let mut app: App<'_, 1> = App::new();
        app.register_component("a", &a, None).unwrap();
        assert_eq!(
            app.register_component("b", &b, None),
            Err(AppError::TooManyComponents)
        );
        assert_eq!(app.len(), 1);
    }

    struct NullUart;

    impl ErrorType for NullUart {
        type Error = ();
    }

    impl UartTx for NullUart {
        fn write_blocking(&mut self, _data: &[u8]) -> Result<(), ()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for NullUart {
        fn read_blocking(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
            Ok(0)
        }

        fn read_ready(&mut self) -> Result<bool, ()> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct Device {
        bus: Option<NullUart>,
    }

    impl UartDevice for Device {
        type Bus = NullUart;

        fn set_uart_parent(&mut self, bus: NullUart) {
            self.bus = Some(bus);
        }

        fn uart_parent(&mut self) -> Option<&mut NullUart> {
            self.bus.as_mut()
        }

        fn has_uart_parent(&self) -> bool {
            self.bus.is_some()
        }
    }

    #[test]
    fn test_register_uart_device() {
        let device = RefCell::new(Device::default());
        assert!(register_uart_device(&device, NullUart).is_ok());
        assert!(device.borrow().has_uart_parent());
        assert_eq!(
            register_uart_device(&device, NullUart),
            Err(AppError::UartAlreadyBound)
        );

        let _guard = device.borrow();
        assert_eq!(register_uart_device(&device, NullUart), Err(AppError::Busy));
    }
}
