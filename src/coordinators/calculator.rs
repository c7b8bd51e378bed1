//! Savings calculator coordinator

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::{CoordinatorContext, Debouncer, MountToken};
use crate::models::{
    calculate_savings, CalculationInputs, CalculationResult, CalculatorField, CoordinatorKind,
    RawCalculatorInputs,
};
use crate::site::RenderSurface;

/// Keeps the calculator's inputs and result in sync while the calculator
/// page is shown.
pub struct CalculatorCoordinator {
    ctx: CoordinatorContext,
    token: MountToken,
    inputs: Arc<Mutex<RawCalculatorInputs>>,
    debouncer: Debouncer,
}

impl CalculatorCoordinator {
    /// Bind to a freshly rendered calculator page and show the result for
    /// the default inputs
    pub fn mount(ctx: CoordinatorContext, token: MountToken) -> Self {
        ctx.surface
            .attach_coordinator(CoordinatorKind::SavingsCalculator);
        let debouncer = Debouncer::new(ctx.config.calculator.debounce());
        let coordinator = Self {
            ctx,
            token,
            inputs: Arc::new(Mutex::new(RawCalculatorInputs::default())),
            debouncer,
        };
        coordinator.recalculate();
        debug!("Savings calculator mounted");
        coordinator
    }

    /// Record a changed field; the result follows once typing pauses
    pub fn input(&self, field: CalculatorField, value: &str) {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(field, value);
        self.ctx.analytics.calculator_input(field, value);

        let inputs = Arc::clone(&self.inputs);
        let surface = Arc::clone(&self.ctx.surface);
        let token = self.token.clone();
        self.debouncer.schedule(move || {
            let snapshot = snapshot(&inputs);
            render(&snapshot, surface.as_ref(), &token);
        });
    }

    /// Recompute and show the result now
    pub fn recalculate(&self) -> Option<CalculationResult> {
        self.debouncer.cancel();
        render(&snapshot(&self.inputs), self.ctx.surface.as_ref(), &self.token)
    }

    /// Inputs as currently typed
    pub fn inputs(&self) -> RawCalculatorInputs {
        snapshot(&self.inputs)
    }

    pub fn deactivate(self) {
        let dropped_input = self.debouncer.is_pending();
        self.debouncer.cancel();
        self.ctx
            .surface
            .detach_coordinator(CoordinatorKind::SavingsCalculator);
        debug!(dropped_input, "Savings calculator unmounted");
    }
}

fn snapshot(inputs: &Mutex<RawCalculatorInputs>) -> RawCalculatorInputs {
    inputs.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn render(
    raw: &RawCalculatorInputs,
    surface: &dyn RenderSurface,
    token: &MountToken,
) -> Option<CalculationResult> {
    token
        .while_current(|| show(raw, surface))
        .flatten()
}

fn show(raw: &RawCalculatorInputs, surface: &dyn RenderSurface) -> Option<CalculationResult> {
    surface.clear_field_errors();
    match CalculationInputs::from_raw(raw) {
        Ok(inputs) => {
            let result = calculate_savings(&inputs);
            surface.show_calculation(Some(&result));
            Some(result)
        },
        Err(errors) => {
            for error in errors.errors() {
                surface.set_field_error(&error.field, &error.inline_message());
            }
            debug!(invalid_fields = errors.len(), "Calculator inputs rejected");
            surface.show_calculation(None);
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinators::MountEpoch;
    use crate::test_utils::{test_context, SurfaceEvent};
    use std::time::Duration;

    #[test]
    fn test_mount_shows_default_result() {
        let harness = test_context();
        let epoch = MountEpoch::new();
        let _calculator = CalculatorCoordinator::mount(harness.context.clone(), epoch.mount());

        let shown = harness.surface.calculation().unwrap();
        assert_eq!(shown.monthly_savings, 130_000);
        assert_eq!(shown.annual_savings, 1_560_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_is_debounced() {
        let harness = test_context();
        let epoch = MountEpoch::new();
        let calculator = CalculatorCoordinator::mount(harness.context.clone(), epoch.mount());
        harness.surface.reset();

        calculator.input(CalculatorField::VehicleCount, "2");
        calculator.input(CalculatorField::VehicleCount, "3");
        assert!(harness.surface.calculation().is_none());

        tokio::time::sleep(Duration::from_millis(350)).await;

        let shown = harness.surface.calculation().unwrap();
        assert_eq!(shown.current_monthly_cost, 750_000);
        assert_eq!(shown.new_monthly_cost, 360_000);
        assert_eq!(harness.surface.calculation_count(), 1);
        assert_eq!(
            harness.sink.kinds(),
            vec!["calculator_input", "calculator_input"]
        );
    }

    #[test]
    fn test_invalid_input_shows_field_error() {
        let harness = test_context();
        let epoch = MountEpoch::new();
        let calculator = CalculatorCoordinator::mount(harness.context.clone(), epoch.mount());

        // No runtime here, so input renders immediately
        calculator.input(CalculatorField::DieselCost, "10");

        assert!(harness.surface.calculation().is_none());
        let errors = harness.surface.field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["diesel_cost"], "Must be between 50000 and 1000000");
        assert_eq!(calculator.recalculate(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_input_dropped_on_unmount() {
        let harness = test_context();
        let epoch = MountEpoch::new();
        let calculator = CalculatorCoordinator::mount(harness.context.clone(), epoch.mount());
        harness.surface.reset();

        calculator.input(CalculatorField::MonthlyKm, "5000");
        calculator.deactivate();
        epoch.unmount();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(
            harness.surface.events(),
            vec![SurfaceEvent::Detach(CoordinatorKind::SavingsCalculator)]
        );
    }

    #[test]
    fn test_recalculate_uses_latest_inputs() {
        let harness = test_context();
        let epoch = MountEpoch::new();
        let calculator = CalculatorCoordinator::mount(harness.context.clone(), epoch.mount());

        calculator.input(CalculatorField::Model, "lease");
        let result = calculator.recalculate().unwrap();
        assert!(!calculator.debouncer.is_pending());
        assert_eq!(result.new_monthly_cost, 175_000);
        assert_eq!(calculator.inputs().model, "lease");
    }
}
