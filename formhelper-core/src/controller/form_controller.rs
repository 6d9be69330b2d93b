//! ``src/controller/form_controller.rs``
//! ============================================================================
//! # `FormController`: Check-Then-Submit Orchestration
//!
//! Owns the picker registry of one form, the validation engine built from the
//! form config, the failure handler and the transport. `check` turns a
//! violation into a handler call; `submit` only reaches the transport when the
//! check passes, so a failing form never produces network activity.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{info, instrument, warn};

use crate::config::{FormConfig, PickerOverrides, ValidationPolicy};
use crate::controller::multipart::{ExtraFields, MultipartBody};
use crate::controller::transport::{ReqwestTransport, Transport};
use crate::error::{FormError, FormResult};
use crate::model::picker::{PickerCallbacks, PickerId, PickerInstance};
use crate::model::picker_registry::{AggregateInfo, PickerRegistry};
use crate::validation::engine::ValidationEngine;
use crate::validation::violation::ValidationViolation;
use crate::view::template::{PickerView, Templates};

pub type FailureCallback = Arc<dyn Fn(&ValidationViolation) + Send + Sync>;

/// What happens to a violation found by `check` or `submit`.
#[derive(Clone, Default)]
pub enum FailureHandler {
    /// Log `[code]message` at WARN
    #[default]
    Default,

    /// Hand the violation to the host
    Custom(FailureCallback),

    /// Return it as [`FormError::Validation`]
    Reraise,
}

impl FailureHandler {
    pub fn custom(f: impl Fn(&ValidationViolation) + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl std::fmt::Debug for FailureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Reraise => f.write_str("Reraise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The transport answered; its parsed response
    Submitted(serde_json::Value),

    /// Validation failed and nothing was sent
    NotSubmitted(ValidationViolation),
}

impl SubmitOutcome {
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

pub struct FormController {
    config: FormConfig,
    registry: PickerRegistry,
    engine: ValidationEngine,
    fields: IndexMap<String, String>,
    failure_handler: FailureHandler,
    templates: Templates,
    transport: Arc<dyn Transport>,
}

impl FormController {
    /// Controller with the default handler and a `reqwest` transport.
    #[must_use]
    pub fn new(config: FormConfig) -> Self {
        Self {
            registry: PickerRegistry::new(config.picker.clone()),
            engine: ValidationEngine::new(config.limits, config.language.clone()),
            config,
            fields: IndexMap::new(),
            failure_handler: FailureHandler::Default,
            templates: Templates::default(),
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_failure_handler(mut self, handler: FailureHandler) -> Self {
        self.failure_handler = handler;
        self
    }

    /// Shorthand for a custom failure handler.
    #[must_use]
    pub fn on_fail(self, f: impl Fn(&ValidationViolation) + Send + Sync + 'static) -> Self {
        self.with_failure_handler(FailureHandler::custom(f))
    }

    #[must_use]
    pub fn with_templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &FormConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &PickerRegistry {
        &self.registry
    }

    // ------------------------------------------------------------
    // Pickers
    // ------------------------------------------------------------

    pub fn add_picker(
        &mut self,
        overrides: &PickerOverrides,
        callbacks: PickerCallbacks,
    ) -> PickerId {
        self.registry.add_picker(overrides, callbacks).id()
    }

    /// Unregister a picker together with its view.
    pub fn remove_picker(&mut self, id: PickerId) -> FormResult<PickerInstance> {
        self.registry.remove_picker(id)
    }

    pub fn picker(&self, id: PickerId) -> FormResult<&PickerInstance> {
        self.registry.picker(id)
    }

    pub fn picker_mut(&mut self, id: PickerId) -> FormResult<&mut PickerInstance> {
        self.registry.picker_mut(id)
    }

    /// Set a host form field, submitted ahead of the files.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    #[must_use]
    pub fn info(&self) -> AggregateInfo {
        self.registry.aggregate()
    }

    /// Every current violation, in check order.
    #[must_use]
    pub fn violations(&self) -> Vec<ValidationViolation> {
        self.engine.check_all(&self.registry)
    }

    pub fn picker_view(&self, id: PickerId) -> FormResult<PickerView> {
        Ok(PickerView::from_picker(self.picker(id)?, &self.config.language))
    }

    /// Markup for one picker, through the template hooks.
    pub fn render_picker(&self, id: PickerId) -> FormResult<String> {
        Ok(self.templates.render_picker(&self.picker_view(id)?))
    }

    // ------------------------------------------------------------
    // Check & submit
    // ------------------------------------------------------------

    /// `Ok(true)` when the form passes, `Ok(false)` when a handler absorbed
    /// the violation, `Err` when the handler re-raises.
    pub fn check(&self) -> FormResult<bool> {
        match self.evaluate() {
            Ok(()) => Ok(true),
            Err(violation) => self.fail(violation).map(|()| false),
        }
    }

    /// Check, then POST the form with `extra` fields appended.
    #[instrument(skip(self, extra))]
    pub async fn submit(&self, url: &str, extra: &ExtraFields) -> FormResult<SubmitOutcome> {
        if let Err(violation) = self.evaluate() {
            self.fail(violation.clone())?;
            return Ok(SubmitOutcome::NotSubmitted(violation));
        }

        let body: MultipartBody = self.build_body(extra);
        info!(url, parts = body.len(), "submitting form");

        let response: serde_json::Value = self.transport.post(url, body).await?;

        Ok(SubmitOutcome::Submitted(response))
    }

    /// Multipart body of the live form: host fields, then each picker's
    /// records in registration order, then `extra`.
    #[must_use]
    pub fn build_body(&self, extra: &ExtraFields) -> MultipartBody {
        let mut body: MultipartBody = MultipartBody::new();

        for (name, value) in &self.fields {
            body.text(name.as_str(), value.as_str());
        }

        for picker in self.registry.iter() {
            let input_name: &str = &picker.config().file_input.name;
            for record in picker.files() {
                body.record(input_name, record);
            }
        }

        for (name, value) in extra {
            body.field(name, value);
        }

        body
    }

    fn evaluate(&self) -> Result<(), ValidationViolation> {
        match self.config.validation {
            ValidationPolicy::FailFast => self.engine.check(&self.registry),
            ValidationPolicy::CollectAll => {
                let mut all = self.engine.check_all(&self.registry).into_iter();
                let first = all.next();

                for rest in all {
                    rest.trace_ref();
                }

                first.map_or(Ok(()), Err)
            }
        }
    }

    fn fail(&self, violation: ValidationViolation) -> FormResult<()> {
        let violation: ValidationViolation = violation.trace();

        match &self.failure_handler {
            FailureHandler::Default => {
                warn!("[{}]{}", violation.code(), violation.message);
                Ok(())
            }
            FailureHandler::Custom(handler) => {
                handler(&violation);
                Ok(())
            }
            FailureHandler::Reraise => Err(FormError::Validation(violation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormLimits;
    use crate::fs::file_record::FileHandle;
    use crate::validation::violation::{ViolationKind, ViolationScope};
    use async_trait::async_trait;
    use bytesize::ByteSize;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, MultipartBody)>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post(&self, url: &str, body: MultipartBody) -> FormResult<serde_json::Value> {
            self.calls.lock().push((url.to_string(), body));
            Ok(serde_json::json!({ "ok": true }))
        }
    }

    fn controller(transport: Arc<RecordingTransport>) -> FormController {
        FormController::new(FormConfig::default()).with_transport(transport)
    }

    #[test]
    fn test_check_passes_and_fails() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut form = FormController::new(FormConfig::default()).on_fail({
            let seen = seen.clone();
            move |violation| seen.lock().push(violation.to_string())
        });
        let id = form.add_picker(&PickerOverrides::default(), PickerCallbacks::default());

        assert!(form.check().unwrap());

        form.picker_mut(id)
            .unwrap()
            .add_files((0..11).map(|i| FileHandle::metadata_only(format!("{i}.txt"), 1)));

        assert!(!form.check().unwrap());
        assert_eq!(
            seen.lock().as_slice(),
            ["[fileCountOverload]File count overload! The limit is 10 files."]
        );
    }

    #[test]
    fn test_default_handler_absorbs() {
        let mut form = FormController::new(FormConfig::default());
        let id = form.add_picker(
            &PickerOverrides {
                max_bytes: Some(ByteSize::b(1)),
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );
        form.picker_mut(id)
            .unwrap()
            .add_files([FileHandle::metadata_only("a", 2)]);

        assert!(!form.check().unwrap());
    }

    #[test]
    fn test_reraise_surfaces_violation() {
        let mut form = FormController::new(FormConfig::default())
            .with_failure_handler(FailureHandler::Reraise);
        let id = form.add_picker(&PickerOverrides::default(), PickerCallbacks::default());
        form.picker_mut(id)
            .unwrap()
            .add_files([FileHandle::metadata_only("big.bin", 11 * 1024 * 1024)]);

        match form.check() {
            Err(FormError::Validation(violation)) => {
                assert_eq!(violation.kind, ViolationKind::SizeExceeded);
                assert_eq!(violation.scope, ViolationScope::Aggregate);
            }
            other => panic!("expected a re-raised violation, got {other:?}"),
        }
    }

    #[test]
    fn test_collect_all_reports_first_and_lists_all() {
        let first: Arc<Mutex<Option<ValidationViolation>>> = Arc::default();
        let config = FormConfig {
            validation: ValidationPolicy::CollectAll,
            ..FormConfig::default()
        };
        let mut form = FormController::new(config).on_fail({
            let first = first.clone();
            move |violation| *first.lock() = Some(violation.clone())
        });
        let id = form.add_picker(
            &PickerOverrides {
                max_files: Some(1),
                max_bytes: Some(ByteSize::b(1)),
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );
        form.picker_mut(id).unwrap().add_files([
            FileHandle::metadata_only("a", 5),
            FileHandle::metadata_only("b", 5),
        ]);

        assert!(!form.check().unwrap());
        assert_eq!(
            first.lock().as_ref().map(|v| v.kind),
            Some(ViolationKind::SizeExceeded)
        );
        assert_eq!(form.violations().len(), 2);
    }

    /// Counts events that carry a violation marker.
    struct ViolationEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ViolationEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
            if event.metadata().fields().field("marker").is_some() {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_collect_all_traces_every_violation() {
        let traced: Arc<AtomicUsize> = Arc::default();
        let subscriber = tracing_subscriber::registry().with(ViolationEvents(traced.clone()));
        let config = FormConfig {
            validation: ValidationPolicy::CollectAll,
            limits: FormLimits {
                max_files: 1,
                ..FormLimits::default()
            },
            ..FormConfig::default()
        };
        let mut form = FormController::new(config).on_fail(|_| {});
        let id = form.add_picker(
            &PickerOverrides {
                max_files: Some(1),
                max_bytes: Some(ByteSize::b(1)),
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );
        form.picker_mut(id).unwrap().add_files([
            FileHandle::metadata_only("a", 5),
            FileHandle::metadata_only("b", 5),
        ]);

        tracing::subscriber::with_default(subscriber, || {
            assert!(!form.check().unwrap());
        });

        // aggregate count, picker size, picker count
        assert_eq!(traced.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_submit_skips_transport_on_failure() {
        let transport = Arc::new(RecordingTransport::default());
        let mut form = controller(transport.clone());
        let id = form.add_picker(&PickerOverrides::default(), PickerCallbacks::default());
        form.picker_mut(id)
            .unwrap()
            .add_files((0..11).map(|i| FileHandle::metadata_only(format!("{i}.txt"), 1)));

        let outcome = form.submit("/upload", &ExtraFields::new()).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::NotSubmitted(_)));
        assert!(transport.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_submit_body_order() {
        let transport = Arc::new(RecordingTransport::default());
        let mut form = controller(transport.clone());
        form.set_field("title", "report");
        let a = form.add_picker(&PickerOverrides::default(), PickerCallbacks::default());
        let b = form.add_picker(
            &PickerOverrides {
                file_input: crate::config::FileInputOverrides {
                    name: Some("attachments[]".to_string()),
                    ..Default::default()
                },
                ..PickerOverrides::default()
            },
            PickerCallbacks::default(),
        );
        form.picker_mut(b)
            .unwrap()
            .add_files([FileHandle::from_bytes("b.txt", &b"bb"[..])]);
        form.picker_mut(a)
            .unwrap()
            .add_files([FileHandle::from_bytes("a.txt", &b"a"[..])]);

        let mut extra = ExtraFields::new();
        extra.insert("tags".to_string(), ["x", "y"].into());

        let outcome = form.submit("/upload", &extra).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted(serde_json::json!({ "ok": true })));

        let calls = transport.calls.lock();
        assert_eq!(calls.len(), 1);
        let names: Vec<&str> = calls[0]
            .1
            .parts()
            .iter()
            .map(crate::controller::multipart::Part::name)
            .collect();
        assert_eq!(names, ["title", "files[]", "attachments[]", "tags[]", "tags[]"]);
    }

    #[test]
    fn test_render_picker_uses_language() {
        let mut config = FormConfig::default();
        config.language.select_file = "Choose".to_string();
        let mut form = FormController::new(config);
        let id = form.add_picker(&PickerOverrides::default(), PickerCallbacks::default());

        assert!(form.render_picker(id).unwrap().contains("Choose"));

        form.remove_picker(id).unwrap();
        assert!(matches!(
            form.render_picker(id),
            Err(FormError::PickerNotFound(_))
        ));
    }
}
