//! ``src/validation/engine.rs``
//! ============================================================================
//! # `ValidationEngine`: Form-Wide and Per-Picker Limit Checks
//!
//! Check order is fixed: aggregate size, aggregate count, then each picker in
//! registration order (size before count). Every comparison is strict, so a
//! selection exactly at a limit passes.

use crate::config::{FormLimits, LanguageConfig};
use crate::model::picker::PickerInstance;
use crate::model::picker_registry::{AggregateInfo, PickerRegistry};
use crate::util::humanize::format_bytes;
use crate::validation::messages::{render_message, template_for};
use crate::validation::violation::{ValidationViolation, ViolationKind, ViolationScope};

#[derive(Debug, Clone)]
pub struct ValidationEngine {
    limits: FormLimits,
    language: LanguageConfig,
}

impl ValidationEngine {
    #[must_use]
    pub const fn new(limits: FormLimits, language: LanguageConfig) -> Self {
        Self { limits, language }
    }

    #[must_use]
    pub const fn limits(&self) -> &FormLimits {
        &self.limits
    }

    /// First violation in check order, if any.
    pub fn check(&self, registry: &PickerRegistry) -> Result<(), ValidationViolation> {
        match self.violations(registry).next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// Every violation in check order.
    #[must_use]
    pub fn check_all(&self, registry: &PickerRegistry) -> Vec<ValidationViolation> {
        self.violations(registry).collect()
    }

    // Lazy so that `check` stops at the first breach.
    fn violations<'a>(
        &'a self,
        registry: &'a PickerRegistry,
    ) -> impl Iterator<Item = ValidationViolation> + 'a {
        let aggregate: AggregateInfo = registry.aggregate();

        let form_size = (aggregate.total_size > self.limits.max_bytes.as_u64()).then(|| {
            self.size_violation(
                ViolationScope::Aggregate,
                self.limits.max_bytes.as_u64(),
                aggregate.total_size,
                None,
            )
        });

        let form_count = (aggregate.total_count > u64::from(self.limits.max_files)).then(|| {
            self.count_violation(
                ViolationScope::Aggregate,
                u64::from(self.limits.max_files),
                aggregate.total_count,
                None,
            )
        });

        form_size
            .into_iter()
            .chain(form_count)
            .chain(registry.iter().flat_map(move |picker| self.picker_violations(picker)))
    }

    fn picker_violations(&self, picker: &PickerInstance) -> Vec<ValidationViolation> {
        let mut found: Vec<ValidationViolation> = Vec::new();
        let size: u64 = picker.size();
        let count: u32 = picker.count();

        if size > picker.config().max_bytes() {
            found.push(self.size_violation(
                ViolationScope::PerPicker,
                picker.config().max_bytes(),
                size,
                Some(picker),
            ));
        }

        if count > picker.config().max_files {
            found.push(self.count_violation(
                ViolationScope::PerPicker,
                u64::from(picker.config().max_files),
                u64::from(count),
                Some(picker),
            ));
        }

        found
    }

    fn size_violation(
        &self,
        scope: ViolationScope,
        limit: u64,
        actual: u64,
        picker: Option<&PickerInstance>,
    ) -> ValidationViolation {
        let limit_display: String = format_bytes(limit);
        let actual_display: String = format_bytes(actual);

        self.violation(
            ViolationKind::SizeExceeded,
            scope,
            (limit, limit_display),
            (actual, actual_display),
            picker,
        )
    }

    fn count_violation(
        &self,
        scope: ViolationScope,
        limit: u64,
        actual: u64,
        picker: Option<&PickerInstance>,
    ) -> ValidationViolation {
        self.violation(
            ViolationKind::CountExceeded,
            scope,
            (limit, limit.to_string()),
            (actual, actual.to_string()),
            picker,
        )
    }

    fn violation(
        &self,
        kind: ViolationKind,
        scope: ViolationScope,
        (limit, limit_display): (u64, String),
        (actual, actual_display): (u64, String),
        picker: Option<&PickerInstance>,
    ) -> ValidationViolation {
        let message: String = render_message(
            template_for(&self.language, kind),
            &[&limit_display, &actual_display],
        );

        ValidationViolation::new(
            kind,
            scope,
            limit,
            actual,
            limit_display,
            picker.map(PickerInstance::id),
            message,
        )
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(FormLimits::default(), LanguageConfig::default())
    }
}
