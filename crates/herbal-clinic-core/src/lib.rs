//! Herbal Clinic Core Library
//!
//! Client core for the herbal clinic: every business rule the clinic and
//! logistics screens depend on, behind a host-embeddable API.
//!
//! # Architecture
//!
//! ```text
//!   host UI (forms, tables, canvas widget)          host HTTP stack
//!        │                                                ▲
//!        ▼                                                │ HostTransport
//!   ClinicCore ──► workflows ──► ClinicClient ──► ApiRequest / ApiResponse
//!        │             │
//!        │             ├─ AdvanceCoordinator   (status pipeline, one PATCH per click)
//!        │             ├─ AnnotationSaver      (upload annotated copy, then delete original)
//!        │             └─ NotificationInbox    (15 s polling)
//!        │
//!        ├─ SessionStore (SQLite)
//!        └─ AnnotationViewer ──► herbal-clinic-canvas (zoom, strokes, composite)
//! ```
//!
//! # Core Principle
//!
//! **Orders only move forward.** The next status is looked up, never
//! computed from user input, and a terminal order offers no action.
//!
//! # Modules
//!
//! - [`pipeline`]: production-order statuses, transitions and button presentation
//! - [`models`]: backend records (patients, visits, orders, notifications)
//! - [`api`]: endpoint mapping over a host transport
//! - [`session`]: signed-in session and its SQLite store
//! - [`workflow`]: advance, stage action, annotation save and inbox workflows
//! - [`dashboard`]: logistics dashboard data and filters
//! - [`previews`]: preview URL lifecycle for picked files
//! - [`config`]: environment configuration

pub mod api;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod pipeline;
pub mod previews;
pub mod session;
pub mod workflow;

// Re-export commonly used types
pub use api::{ApiError, ApiRequest, ApiResponse, ClinicClient, Transport, TransportError};
pub use config::ClinicConfig;
pub use dashboard::{LogisticsDashboard, OrderFilter};
pub use models::{
    Notification, NotificationFeed, NotificationKind, Patient, PrescribedMedicine,
    ProductionOrder, Stage, StageImage, Visit,
};
pub use pipeline::{
    is_stage_action_disabled, latest_order, next_status, status_button_descriptor,
    LatestOrder, ProductionOrderStatus, StageAction, StatusButtonDescriptor,
};
pub use previews::{MemoryObjectUrls, ObjectUrls, Preview, PreviewList};
pub use session::{Session, SessionStore, UserType};
pub use workflow::{
    AdvanceCoordinator, AdvanceOutcome, AnnotationSaver, Notice, NotificationInbox,
    SaveOutcome, StageActionOutcome, WorkflowError,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};
use std::time::Instant;

use herbal_clinic_canvas::brush::parse_hex_color;
use herbal_clinic_canvas::{
    CanvasError, CloseDecision, CloseOutcome, DisplayRect, DrawableImage, ImageViewer,
    PointerMapper, Surface, ViewerMode,
};

use api::{FormPart, RequestBody};
use models::{DirectAction, NewVisit, PatientForm, Upload, VisitUpdate};
use workflow::{DirectActionOutcome, RefreshTarget, Refreshed, Severity, WorkflowResult};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ApiError> for ClinicError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized => ClinicError::SessionExpired,
            ApiError::Transport(e) => ClinicError::Network(e.to_string()),
            other => ClinicError::Backend(other.to_string()),
        }
    }
}

impl From<WorkflowError> for ClinicError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::SessionExpired => ClinicError::SessionExpired,
            WorkflowError::Api(e) => e.into(),
            WorkflowError::Canvas(e) => e.into(),
            WorkflowError::InvalidInput(msg) => ClinicError::InvalidInput(msg),
        }
    }
}

impl From<session::SessionError> for ClinicError {
    fn from(e: session::SessionError) -> Self {
        ClinicError::Storage(e.to_string())
    }
}

impl From<CanvasError> for ClinicError {
    fn from(e: CanvasError) -> Self {
        ClinicError::Image(e.to_string())
    }
}

impl From<pipeline::PipelineError> for ClinicError {
    fn from(e: pipeline::PipelineError) -> Self {
        ClinicError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(e: serde_json::Error) -> Self {
        ClinicError::Backend(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::Storage(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Host Transport
// =========================================================================

/// Failure reported by the host's HTTP stack.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HostTransportError {
    #[error("{reason}")]
    Failed { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for HostTransportError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        HostTransportError::Failed { reason: e.reason }
    }
}

/// HTTP implemented by the embedding app.
#[uniffi::export(with_foreign)]
pub trait HostTransport: Send + Sync {
    fn send(&self, request: FfiRequest) -> Result<FfiResponse, HostTransportError>;
}

/// Bridges a foreign [`HostTransport`] to [`Transport`].
pub struct HostTransportAdapter {
    host: Arc<dyn HostTransport>,
}

impl HostTransportAdapter {
    pub fn new(host: Arc<dyn HostTransport>) -> Self {
        Self { host }
    }
}

impl Transport for HostTransportAdapter {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let response = self
            .host
            .send(FfiRequest::from(request))
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(ApiResponse {
            status: response.status,
            body: response.body,
        })
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the core with a session database at `session_db_path`.
#[uniffi::export]
pub fn open_clinic_core(
    transport: Arc<dyn HostTransport>,
    api_base_url: String,
    session_db_path: String,
) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = ClinicConfig {
        api_base_url,
        session_db_path,
        ..ClinicConfig::default()
    };
    let store = SessionStore::open(&config.session_db_path)?;
    ClinicCore::build(config, store, transport)
}

/// Open the core configured from the environment (and `.env`).
#[uniffi::export]
pub fn open_clinic_core_from_env(
    transport: Arc<dyn HostTransport>,
) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = ClinicConfig::from_env();
    let store = SessionStore::open(&config.session_db_path)?;
    ClinicCore::build(config, store, transport)
}

/// Open the core with an in-memory session store (for testing).
#[uniffi::export]
pub fn open_clinic_core_in_memory(
    transport: Arc<dyn HostTransport>,
    api_base_url: String,
) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = ClinicConfig {
        api_base_url,
        ..ClinicConfig::default()
    };
    ClinicCore::build(config, SessionStore::open_in_memory()?, transport)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe client core for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    config: ClinicConfig,
    client: Arc<ClinicClient<HostTransportAdapter>>,
    store: Mutex<SessionStore>,
    session: Mutex<Option<Session>>,
    advance: AdvanceCoordinator<HostTransportAdapter>,
    saver: AnnotationSaver<HostTransportAdapter>,
    inbox: Mutex<NotificationInbox<HostTransportAdapter>>,
}

impl ClinicCore {
    fn build(
        config: ClinicConfig,
        store: SessionStore,
        transport: Arc<dyn HostTransport>,
    ) -> Result<Arc<Self>, ClinicError> {
        let client = Arc::new(ClinicClient::new(
            config.api_base_url.clone(),
            HostTransportAdapter::new(transport),
        ));
        let session = store.load()?;
        if let Some(s) = &session {
            log::info!("Restored session for {}", s.username);
        }
        Ok(Arc::new(Self {
            advance: AdvanceCoordinator::new(client.clone()),
            saver: AnnotationSaver::new(client.clone()),
            inbox: Mutex::new(NotificationInbox::new(
                client.clone(),
                config.notification_poll_interval,
            )),
            client,
            store: Mutex::new(store),
            session: Mutex::new(session),
            config,
        }))
    }

    fn session(&self) -> Result<Session, ClinicError> {
        self.session.lock()?.clone().ok_or(ClinicError::NotSignedIn)
    }

    /// Drop the session when the backend says it is no longer valid.
    fn checked<T>(&self, result: WorkflowResult<T>) -> Result<T, ClinicError> {
        match result {
            Err(WorkflowError::SessionExpired) => {
                log::warn!("Session expired, signing out");
                self.forget_session()?;
                Err(ClinicError::SessionExpired)
            }
            other => Ok(other?),
        }
    }

    fn forget_session(&self) -> Result<(), ClinicError> {
        *self.session.lock()? = None;
        self.store.lock()?.clear()?;
        Ok(())
    }

    fn notice(&self, notice: Notice) -> FfiNotice {
        notice.with_duration(self.config.notice_duration).into()
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Session Operations
    // =========================================================================

    pub fn api_base_url(&self) -> String {
        self.config.api_base_url.clone()
    }

    /// Sign in and persist the session.
    pub fn login(&self, username: String, password: String) -> Result<FfiSession, ClinicError> {
        let pair = self
            .client
            .login(&username, &password)
            .map_err(|e| match e {
                ApiError::Unauthorized | ApiError::Status { .. } => ClinicError::InvalidCredentials,
                other => other.into(),
            })?;
        let session = pair.into_session(username);
        self.store.lock()?.save(&session)?;
        *self.session.lock()? = Some(session.clone());
        log::info!("Signed in as {}", session.username);
        Ok(session.into())
    }

    pub fn logout(&self) -> Result<(), ClinicError> {
        log::info!("Signing out");
        self.forget_session()
    }

    pub fn current_session(&self) -> Result<Option<FfiSession>, ClinicError> {
        Ok(self.session.lock()?.clone().map(Into::into))
    }

    // =========================================================================
    // Patient and Visit Operations
    // =========================================================================

    /// Patients matching `query` (all when empty).
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiPatient>, ClinicError> {
        let session = self.session()?;
        let patients = self.checked(
            self.client
                .list_patients(&session)
                .map_err(WorkflowError::from),
        )?;
        Ok(models::search_patients(&patients, &query)
            .into_iter()
            .map(FfiPatient::from)
            .collect())
    }

    /// Visit with stages, images, medicines and orders as JSON.
    pub fn fetch_visit_json(&self, visit_id: u64) -> Result<String, ClinicError> {
        let session = self.session()?;
        let visit = self.checked(
            self.client
                .get_visit(&session, visit_id)
                .map_err(WorkflowError::from),
        )?;
        Ok(serde_json::to_string(&visit)?)
    }

    /// Patient with their visit summaries as JSON.
    pub fn fetch_patient_json(&self, patient_id: u64) -> Result<String, ClinicError> {
        let session = self.session()?;
        let patient = self.checked(
            self.client
                .get_patient(&session, patient_id)
                .map_err(WorkflowError::from),
        )?;
        Ok(serde_json::to_string(&patient)?)
    }

    pub fn create_patient(&self, form: FfiPatientForm) -> Result<FfiPatient, ClinicError> {
        let session = self.session()?;
        let form = PatientForm::from(form);
        if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
            return Err(ClinicError::InvalidInput("first and last name are required".into()));
        }
        let patient = self.checked(
            self.client
                .create_patient(&session, &form)
                .map_err(WorkflowError::from),
        )?;
        log::info!("Created patient {}", patient.id);
        Ok(FfiPatient::from(&patient))
    }

    pub fn update_patient(
        &self,
        patient_id: u64,
        form: FfiPatientForm,
    ) -> Result<FfiPatient, ClinicError> {
        let session = self.session()?;
        let patient = self.checked(
            self.client
                .update_patient(&session, patient_id, &form.into())
                .map_err(WorkflowError::from),
        )?;
        Ok(FfiPatient::from(&patient))
    }

    /// Open a visit for a patient; returns the new visit as JSON.
    pub fn create_visit(
        &self,
        patient_id: u64,
        visit_date: String,
        diagnosis: String,
        notes: String,
    ) -> Result<String, ClinicError> {
        let session = self.session()?;
        let request = NewVisit {
            patient: patient_id,
            visit_date,
            diagnosis,
            notes,
        };
        let visit = self.checked(
            self.client
                .create_visit(&session, &request)
                .map_err(WorkflowError::from),
        )?;
        Ok(serde_json::to_string(&visit)?)
    }

    /// Edit diagnosis and notes, optionally attaching a document.
    pub fn update_visit(
        &self,
        visit_id: u64,
        diagnosis: String,
        notes: String,
        document: Option<FfiUpload>,
    ) -> Result<String, ClinicError> {
        let session = self.session()?;
        let update = VisitUpdate {
            diagnosis,
            notes,
            document: document.map(Into::into),
        };
        let visit = self.checked(
            self.client
                .update_visit(&session, visit_id, update)
                .map_err(WorkflowError::from),
        )?;
        Ok(serde_json::to_string(&visit)?)
    }

    pub fn delete_visit(&self, visit_id: u64) -> Result<(), ClinicError> {
        let session = self.session()?;
        self.checked(
            self.client
                .delete_visit(&session, visit_id)
                .map_err(WorkflowError::from),
        )?;
        log::info!("Deleted visit {}", visit_id);
        Ok(())
    }

    // =========================================================================
    // Pipeline Operations
    // =========================================================================

    /// Advance an order one status. `refresh_visit_id` selects the visit to
    /// re-fetch; without it the logistics dashboard is re-fetched.
    pub fn advance_order(
        &self,
        order_id: u64,
        status: String,
        refresh_visit_id: Option<u64>,
    ) -> Result<FfiAdvanceResult, ClinicError> {
        let session = self.session()?;
        let order = ProductionOrder {
            id: order_id,
            medicine: None,
            medicine_name: String::new(),
            status,
            status_display: String::new(),
            patient_name: String::new(),
            created_at: String::new(),
            updated_at: None,
        };
        let target = refresh_visit_id
            .map(RefreshTarget::Visit)
            .unwrap_or(RefreshTarget::Dashboard);
        let outcome = self.checked(self.advance.advance(&session, &order, target))?;
        let notice = Notice::for_advance(&outcome).map(|n| self.notice(n));

        Ok(match outcome {
            AdvanceOutcome::NoAction => FfiAdvanceResult::empty(FfiAdvanceKind::NoAction),
            AdvanceOutcome::AlreadyInFlight => {
                FfiAdvanceResult::empty(FfiAdvanceKind::AlreadyInFlight)
            }
            AdvanceOutcome::Advanced {
                from, to, refreshed, ..
            } => FfiAdvanceResult {
                kind: FfiAdvanceKind::Advanced,
                from_status: Some(from.as_str().to_string()),
                to_status: Some(to.as_str().to_string()),
                refreshed_json: refreshed.map(refreshed_json).transpose()?,
                notice,
            },
        })
    }

    /// Start a pipeline stage for a prescribed medicine of a visit.
    pub fn trigger_stage_action(
        &self,
        visit_id: u64,
        medicine_id: u64,
        action: String,
    ) -> Result<FfiStageActionResult, ClinicError> {
        let action: StageAction = action.parse()?;
        let session = self.session()?;
        let visit = self.checked(
            self.client
                .get_visit(&session, visit_id)
                .map_err(WorkflowError::from),
        )?;
        let medicine = visit
            .medicine(medicine_id)
            .ok_or_else(|| ClinicError::NotFound(format!("medicine {}", medicine_id)))?;

        let outcome = self.checked(
            self.advance
                .trigger_stage_action(&session, medicine, action, visit_id),
        )?;
        let notice = Notice::for_stage_action(&outcome).map(|n| self.notice(n));

        Ok(match outcome {
            StageActionOutcome::Disabled => FfiStageActionResult {
                created_order_id: None,
                disabled: true,
                visit_json: None,
                notice,
            },
            StageActionOutcome::AlreadyInFlight => FfiStageActionResult {
                created_order_id: None,
                disabled: false,
                visit_json: None,
                notice,
            },
            StageActionOutcome::Created { order, visit } => FfiStageActionResult {
                created_order_id: Some(order.id),
                disabled: false,
                visit_json: visit.map(|v| serde_json::to_string(&v)).transpose()?,
                notice,
            },
        })
    }

    /// Dashboard orders after the stat-card filter and optional
    /// `YYYY-MM-DD` date.
    pub fn dashboard_orders(
        &self,
        filter: Option<FfiOrderFilter>,
        date: Option<String>,
    ) -> Result<Vec<FfiOrderRow>, ClinicError> {
        let date = date
            .filter(|d| !d.trim().is_empty())
            .map(|d| chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d"))
            .transpose()
            .map_err(|e| ClinicError::InvalidInput(e.to_string()))?;
        let session = self.session()?;
        let dashboard = self.checked(
            self.client
                .logistic_stats(&session)
                .map_err(WorkflowError::from),
        )?;
        let today = chrono::Utc::now().date_naive();
        Ok(dashboard
            .filter_orders(filter.map(Into::into), date, today)
            .into_iter()
            .map(FfiOrderRow::from)
            .collect())
    }

    /// Production order sheet as `(file name, bytes)`.
    pub fn download_order_pdf(&self, order_id: u64) -> Result<FfiDownload, ClinicError> {
        let session = self.session()?;
        let bytes = self.checked(
            self.client
                .download_order_pdf(&session, order_id)
                .map_err(WorkflowError::from),
        )?;
        Ok(FfiDownload {
            file_name: dashboard::pdf_file_name(order_id),
            bytes,
        })
    }

    // =========================================================================
    // Notification Operations
    // =========================================================================

    /// Poll the inbox if the interval elapsed (or always with `force`) and
    /// return the current feed.
    pub fn poll_notifications(&self, force: bool) -> Result<FfiNotificationFeed, ClinicError> {
        let session = self.session()?;
        let mut inbox = self.inbox.lock()?;
        let now = Instant::now();
        if force {
            inbox.poll(&session, now);
        } else {
            inbox.poll_if_due(&session, now);
        }
        Ok(FfiNotificationFeed::from_feed(inbox.feed(), chrono::Utc::now()))
    }

    pub fn mark_notification_read(&self, notification_id: u64) -> Result<(), ClinicError> {
        let session = self.session()?;
        let mut inbox = self.inbox.lock()?;
        self.checked(inbox.mark_read(&session, notification_id))
    }

    pub fn mark_all_notifications_read(&self) -> Result<(), ClinicError> {
        let session = self.session()?;
        let mut inbox = self.inbox.lock()?;
        self.checked(inbox.mark_all_read(&session))
    }

    /// Run the shortcut a notification offers on its order.
    pub fn run_notification_action(
        &self,
        notification_id: u64,
    ) -> Result<FfiDirectActionResult, ClinicError> {
        let session = self.session()?;
        let (order_id, action): (u64, DirectAction) = {
            let inbox = self.inbox.lock()?;
            let notification = inbox
                .feed()
                .notifications
                .iter()
                .find(|n| n.id == notification_id)
                .ok_or_else(|| ClinicError::NotFound(format!("notification {}", notification_id)))?;
            notification.direct_action().ok_or_else(|| {
                ClinicError::InvalidInput("notification offers no action".into())
            })?
        };

        let outcome = self.checked(self.advance.run_direct_action(&session, order_id, action))?;
        Ok(match outcome {
            DirectActionOutcome::AlreadyInFlight => FfiDirectActionResult {
                performed: false,
                status: None,
                pdf: None,
                refreshed_json: None,
                notice: None,
            },
            DirectActionOutcome::NoAction { current } => FfiDirectActionResult {
                performed: false,
                status: current.map(|s| s.as_str().to_string()),
                pdf: None,
                refreshed_json: None,
                notice: Some(self.notice(Notice::new(
                    Severity::Info,
                    "Sipariş bu aşamayı zaten geçti.",
                ))),
            },
            DirectActionOutcome::Done {
                status,
                pdf,
                refreshed,
                ..
            } => FfiDirectActionResult {
                performed: true,
                status: Some(status.as_str().to_string()),
                pdf: pdf.map(|(file_name, bytes)| FfiDownload { file_name, bytes }),
                refreshed_json: refreshed
                    .map(|d| serde_json::to_string(&d))
                    .transpose()?,
                notice: Some(self.notice(Notice::success(format!(
                    "Durum güncellendi: {}",
                    pipeline::status_display_text(Some(status))
                )))),
            },
        })
    }

    // =========================================================================
    // Annotation Operations
    // =========================================================================

    /// Flatten the viewer's drawing onto `base_image` and replace the stored
    /// image. The viewer closes only when the upload succeeded.
    ///
    /// The viewer stays usable while the upload runs.
    pub fn save_annotation(
        &self,
        visit_id: u64,
        viewer: Arc<AnnotationViewer>,
        base_image: Vec<u8>,
    ) -> Result<FfiSaveResult, ClinicError> {
        let session = self.session()?;
        let base = herbal_clinic_canvas::decode_image(&base_image)?;
        let export = viewer
            .inner
            .lock()?
            .resolve_close(CloseDecision::Save, &base)?
            .ok_or_else(|| ClinicError::InvalidInput("nothing to save".into()))?;

        let outcome = self.checked(self.saver.save(&session, &export, visit_id))?;
        let notice = Notice::for_save(&outcome).map(|n| self.notice(n));
        let visit_json = outcome
            .visit()
            .map(serde_json::to_string)
            .transpose()?;

        let (new_image_id, leftover_image_id) = match &outcome {
            SaveOutcome::AlreadyInFlight => (None, None),
            SaveOutcome::Saved { image, .. } => (Some(image.id), None),
            SaveOutcome::SavedWithLeftover {
                image,
                leftover_image_id,
                ..
            } => (Some(image.id), Some(*leftover_image_id)),
        };
        if new_image_id.is_some() {
            let mut inner = viewer.inner.lock()?;
            // The host may have opened another photo meanwhile
            let same_photo = inner
                .image()
                .map(|i| (i.image_id, i.stage_id) == (export.image_id, export.stage_id))
                .unwrap_or(false);
            if same_photo {
                inner.finish_save();
            }
        }

        Ok(FfiSaveResult {
            saved: new_image_id.is_some(),
            new_image_id,
            leftover_image_id,
            visit_json,
            notice,
        })
    }
}

fn refreshed_json(refreshed: Refreshed) -> Result<String, ClinicError> {
    Ok(match refreshed {
        Refreshed::Visit(visit) => serde_json::to_string(&visit)?,
        Refreshed::Dashboard(dashboard) => serde_json::to_string(&dashboard)?,
    })
}

// =========================================================================
// Annotation Viewer Object
// =========================================================================

/// One photo viewer/annotator session, driven by host input events.
#[derive(uniffi::Object, Default)]
pub struct AnnotationViewer {
    inner: Mutex<ImageViewer>,
    rect: Mutex<Option<DisplayRect>>,
}

impl AnnotationViewer {
    /// Pointer position in the viewer's coordinate space: client
    /// coordinates while viewing, surface pixels while drawing.
    fn position(&self, viewer: &ImageViewer, x: f32, y: f32) -> Result<Option<(f32, f32)>, ClinicError> {
        if viewer.mode() != Some(ViewerMode::Drawing) {
            return Ok(Some((x, y)));
        }
        let rect = *self.rect.lock()?;
        Ok(match rect {
            Some(rect) => {
                let surface = viewer.layer().surface();
                PointerMapper::new(rect, surface.width(), surface.height()).map(x, y)
            }
            None => Some((x, y)),
        })
    }
}

#[uniffi::export]
impl AnnotationViewer {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self, url: String, image_id: Option<u64>, stage_id: Option<u64>) -> Result<(), ClinicError> {
        self.inner.lock()?.open(DrawableImage {
            url,
            image_id,
            stage_id,
        });
        Ok(())
    }

    pub fn image_loaded(&self, width: u32, height: u32) -> Result<(), ClinicError> {
        self.inner.lock()?.image_loaded(width, height);
        Ok(())
    }

    /// Where the photo currently sits on screen.
    pub fn set_display_rect(&self, left: f32, top: f32, width: f32, height: f32) -> Result<(), ClinicError> {
        *self.rect.lock()? = Some(DisplayRect {
            left,
            top,
            width,
            height,
        });
        Ok(())
    }

    pub fn enter_drawing(&self, width: u32, height: u32) -> Result<(), ClinicError> {
        Ok(self.inner.lock()?.enter_drawing(width, height)?)
    }

    pub fn wheel(&self, delta_y: f32) -> Result<(), ClinicError> {
        self.inner.lock()?.wheel(delta_y);
        Ok(())
    }

    pub fn reset_view(&self) -> Result<(), ClinicError> {
        self.inner.lock()?.reset_view();
        Ok(())
    }

    pub fn pointer_down(&self, x: f32, y: f32) -> Result<(), ClinicError> {
        let mut viewer = self.inner.lock()?;
        if let Some(pos) = self.position(&viewer, x, y)? {
            viewer.pointer_down(pos);
        }
        Ok(())
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> Result<(), ClinicError> {
        let mut viewer = self.inner.lock()?;
        if let Some(pos) = self.position(&viewer, x, y)? {
            viewer.pointer_move(pos);
        }
        Ok(())
    }

    pub fn pointer_up(&self) -> Result<(), ClinicError> {
        self.inner.lock()?.pointer_up();
        Ok(())
    }

    /// Brush color as `#rrggbb`.
    pub fn set_brush_color(&self, hex: String) -> Result<(), ClinicError> {
        let color = parse_hex_color(&hex)
            .ok_or_else(|| ClinicError::InvalidInput(format!("bad color {:?}", hex)))?;
        self.inner.lock()?.set_brush_color(color);
        Ok(())
    }

    pub fn set_brush_width(&self, width: u32) -> Result<(), ClinicError> {
        self.inner.lock()?.set_brush_width(width);
        Ok(())
    }

    pub fn clear_canvas(&self) -> Result<(), ClinicError> {
        self.inner.lock()?.clear_canvas();
        Ok(())
    }

    /// Close, or ask for confirmation if there is unsaved ink.
    pub fn request_close(&self) -> Result<FfiCloseOutcome, ClinicError> {
        Ok(match self.inner.lock()?.request_close() {
            CloseOutcome::Closed => FfiCloseOutcome::Closed,
            CloseOutcome::ConfirmRequired => FfiCloseOutcome::ConfirmRequired,
        })
    }

    /// Answer the close confirmation with "discard".
    pub fn discard(&self) -> Result<(), ClinicError> {
        let mut viewer = self.inner.lock()?;
        viewer.resolve_close(CloseDecision::Discard, &image::RgbaImage::new(0, 0))?;
        Ok(())
    }

    pub fn state(&self) -> Result<FfiViewerState, ClinicError> {
        let viewer = self.inner.lock()?;
        let transform = viewer.transform();
        let brush = viewer.brush();
        let [r, g, b] = brush.color();
        Ok(FfiViewerState {
            mode: viewer.mode().map(Into::into),
            scale: transform.scale,
            offset_x: transform.offset_x,
            offset_y: transform.offset_y,
            brush_color: format!("#{:02x}{:02x}{:02x}", r, g, b),
            brush_width: brush.width(),
            has_unsaved_strokes: viewer.has_unsaved_strokes(),
        })
    }
}

// =========================================================================
// Preview Tray Object
// =========================================================================

/// Files picked for upload, each with a host preview URL that is revoked
/// when the file leaves the tray.
#[derive(uniffi::Object)]
pub struct PreviewTray {
    list: Mutex<PreviewList<Arc<dyn ObjectUrls>>>,
}

#[uniffi::export]
impl PreviewTray {
    #[uniffi::constructor]
    pub fn new(urls: Arc<dyn ObjectUrls>) -> Arc<Self> {
        Arc::new(Self {
            list: Mutex::new(PreviewList::new(urls)),
        })
    }

    pub fn add(
        &self,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    ) -> Result<FfiPreview, ClinicError> {
        let mut list = self.list.lock()?;
        Ok(list.add(file_name, mime, bytes).into())
    }

    /// The removed preview, `None` if `index` is out of range.
    pub fn remove(&self, index: u32) -> Result<Option<FfiPreview>, ClinicError> {
        Ok(self.list.lock()?.remove(index as usize).map(|p| FfiPreview::from(&p)))
    }

    pub fn replace(
        &self,
        index: u32,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    ) -> Result<bool, ClinicError> {
        Ok(self
            .list
            .lock()?
            .replace(index as usize, file_name, mime, bytes))
    }

    pub fn clear(&self) -> Result<(), ClinicError> {
        self.list.lock()?.clear();
        Ok(())
    }

    pub fn items(&self) -> Result<Vec<FfiPreview>, ClinicError> {
        Ok(self.list.lock()?.items().iter().map(Into::into).collect())
    }
}

// =========================================================================
// Pipeline Lookups (exported to FFI)
// =========================================================================

/// Next status of a raw status value; `None` for terminal or unknown.
#[uniffi::export]
pub fn production_status_next(status: String) -> Option<String> {
    pipeline::next_status_raw(&status).map(|s| s.as_str().to_string())
}

/// Advance-button presentation for a raw status value.
#[uniffi::export]
pub fn production_status_button(status: String) -> FfiStatusButton {
    pipeline::status_button_descriptor_raw(&status).into()
}

/// Status phrase of a medicine's latest order; empty without one.
#[uniffi::export]
pub fn production_status_text(latest: Option<String>) -> String {
    pipeline::status_display_text_raw(latest.as_deref()).to_string()
}

#[uniffi::export]
pub fn production_status_chip_color(status: String) -> String {
    pipeline::status_chip_color(&status).as_str().to_string()
}

/// Whether a stage button is disabled given the latest order's status.
#[uniffi::export]
pub fn stage_action_disabled(latest: Option<String>, action: String) -> Result<bool, ClinicError> {
    let action: StageAction = action.parse()?;
    Ok(pipeline::is_stage_action_disabled_raw(latest.as_deref(), action))
}

/// "5 dakika önce" style age of an RFC 3339 timestamp.
#[uniffi::export]
pub fn relative_time_label(created_at: String) -> String {
    models::relative_time(&created_at, chrono::Utc::now())
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe HTTP request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRequest {
    pub method: String,
    pub url: String,
    pub bearer: Option<String>,
    /// JSON body, sent with `Content-Type: application/json`
    pub json_body: Option<String>,
    /// Multipart fields; empty unless the body is multipart
    pub form_parts: Vec<FfiFormPart>,
}

impl From<&ApiRequest> for FfiRequest {
    fn from(request: &ApiRequest) -> Self {
        let (json_body, form_parts) = match &request.body {
            RequestBody::Empty => (None, Vec::new()),
            RequestBody::Json(value) => (Some(value.to_string()), Vec::new()),
            RequestBody::Multipart(parts) => {
                (None, parts.iter().map(FfiFormPart::from).collect())
            }
        };
        Self {
            method: request.method.as_str().to_string(),
            url: request.url.clone(),
            bearer: request.bearer.clone(),
            json_body,
            form_parts,
        }
    }
}

/// FFI-safe multipart field. Text fields carry `text`; file fields carry
/// `file_name`, `content_type` and `bytes`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFormPart {
    pub name: String,
    pub text: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Option<Vec<u8>>,
}

impl From<&FormPart> for FfiFormPart {
    fn from(part: &FormPart) -> Self {
        match part {
            FormPart::Text { name, value } => Self {
                name: name.clone(),
                text: Some(value.clone()),
                file_name: None,
                content_type: None,
                bytes: None,
            },
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => Self {
                name: name.clone(),
                text: None,
                file_name: Some(file_name.clone()),
                content_type: Some(content_type.clone()),
                bytes: Some(bytes.clone()),
            },
        }
    }
}

/// FFI-safe HTTP response.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiLanding {
    LogisticsDashboard,
    Patients,
}

/// FFI-safe session (tokens stay inside the core).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub username: String,
    pub user_type: String,
    pub landing: FfiLanding,
}

impl From<Session> for FfiSession {
    fn from(session: Session) -> Self {
        Self {
            landing: match session.landing() {
                session::Landing::LogisticsDashboard => FfiLanding::LogisticsDashboard,
                session::Landing::Patients => FfiLanding::Patients,
            },
            user_type: session.user_type.as_str().to_string(),
            username: session.username,
        }
    }
}

/// FFI-safe patient row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: u64,
    pub patient_code: String,
    pub full_name: String,
    pub phone: String,
    pub birth_date: Option<String>,
}

impl From<&Patient> for FfiPatient {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            patient_code: patient.patient_code.clone(),
            full_name: patient.full_name(),
            phone: patient.phone.clone(),
            birth_date: patient.birth_date.clone(),
        }
    }
}

/// FFI-safe patient fields for create and update.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientForm {
    pub patient_code: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`, empty when unknown
    pub birth_date: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub tc_no: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub blood_type: String,
    pub allergies: String,
    pub notes: String,
}

impl From<FfiPatientForm> for PatientForm {
    fn from(f: FfiPatientForm) -> Self {
        Self {
            patient_code: f.patient_code,
            first_name: f.first_name,
            last_name: f.last_name,
            birth_date: f.birth_date,
            gender: f.gender,
            phone: f.phone,
            email: f.email,
            tc_no: f.tc_no,
            city: f.city,
            district: f.district,
            address: f.address,
            blood_type: f.blood_type,
            allergies: f.allergies,
            notes: f.notes,
        }
    }
}

/// FFI-safe file chosen for upload.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl From<FfiUpload> for Upload {
    fn from(u: FfiUpload) -> Self {
        Self {
            file_name: u.file_name,
            content_type: u.content_type,
            bytes: u.bytes,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPreview {
    pub file_name: String,
    pub mime: String,
    pub url: String,
}

impl From<&Preview> for FfiPreview {
    fn from(p: &Preview) -> Self {
        Self {
            file_name: p.file_name.clone(),
            mime: p.mime.clone(),
            url: p.url.clone(),
        }
    }
}

/// FFI-safe advance-button presentation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStatusButton {
    pub label: String,
    pub icon: String,
    pub color: String,
}

impl From<StatusButtonDescriptor> for FfiStatusButton {
    fn from(d: StatusButtonDescriptor) -> Self {
        Self {
            label: d.label.to_string(),
            icon: d.icon.as_str().to_string(),
            color: d.color.as_str().to_string(),
        }
    }
}

/// FFI-safe transient notice.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotice {
    /// `success`, `info`, `warning` or `error`
    pub severity: String,
    pub message: String,
    pub duration_ms: u64,
}

impl From<Notice> for FfiNotice {
    fn from(notice: Notice) -> Self {
        Self {
            severity: notice.severity.as_str().to_string(),
            message: notice.message,
            duration_ms: notice.duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiAdvanceKind {
    NoAction,
    AlreadyInFlight,
    Advanced,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdvanceResult {
    pub kind: FfiAdvanceKind,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    /// Re-fetched visit or dashboard
    pub refreshed_json: Option<String>,
    pub notice: Option<FfiNotice>,
}

impl FfiAdvanceResult {
    fn empty(kind: FfiAdvanceKind) -> Self {
        Self {
            kind,
            from_status: None,
            to_status: None,
            refreshed_json: None,
            notice: None,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStageActionResult {
    pub created_order_id: Option<u64>,
    pub disabled: bool,
    pub visit_json: Option<String>,
    pub notice: Option<FfiNotice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiOrderFilter {
    Total,
    Pending,
    Completed,
    Today,
}

impl From<FfiOrderFilter> for OrderFilter {
    fn from(filter: FfiOrderFilter) -> Self {
        match filter {
            FfiOrderFilter::Total => OrderFilter::Total,
            FfiOrderFilter::Pending => OrderFilter::Pending,
            FfiOrderFilter::Completed => OrderFilter::Completed,
            FfiOrderFilter::Today => OrderFilter::Today,
        }
    }
}

/// FFI-safe dashboard order row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOrderRow {
    pub id: u64,
    pub medicine_name: String,
    pub patient_name: String,
    pub status: String,
    pub status_display: String,
    pub chip_color: String,
    pub created_at: String,
    pub button: Option<FfiStatusButton>,
}

impl From<&ProductionOrder> for FfiOrderRow {
    fn from(order: &ProductionOrder) -> Self {
        let button = order
            .status()
            .filter(|s| s.next().is_some())
            .map(|s| status_button_descriptor(s).into());
        Self {
            id: order.id,
            medicine_name: order.medicine_name.clone(),
            patient_name: order.patient_name.clone(),
            status: order.status.clone(),
            status_display: order.status_display.clone(),
            chip_color: pipeline::status_chip_color(&order.status).as_str().to_string(),
            created_at: order.created_at.clone(),
            button,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// FFI-safe notification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub kind_label: String,
    pub production_order_id: Option<u64>,
    pub has_direct_action: bool,
    pub is_read: bool,
    pub age: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotificationFeed {
    pub notifications: Vec<FfiNotification>,
    pub unread_count: u32,
}

impl FfiNotificationFeed {
    fn from_feed(feed: &NotificationFeed, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            notifications: feed
                .notifications
                .iter()
                .map(|n| FfiNotification {
                    id: n.id,
                    title: n.title.clone(),
                    message: n.message.clone(),
                    kind_label: n.notification_type.label().to_string(),
                    production_order_id: n.production_order_id,
                    has_direct_action: n.direct_action().is_some(),
                    is_read: n.is_read,
                    age: models::relative_time(&n.created_at, now),
                })
                .collect(),
            unread_count: feed.unread_count,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDirectActionResult {
    pub performed: bool,
    /// New status when performed, otherwise the order's current status
    pub status: Option<String>,
    pub pdf: Option<FfiDownload>,
    /// Re-fetched logistics dashboard as JSON
    pub refreshed_json: Option<String>,
    pub notice: Option<FfiNotice>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaveResult {
    /// False when a save of the same image was already running
    pub saved: bool,
    pub new_image_id: Option<u64>,
    /// Original image that could not be deleted
    pub leftover_image_id: Option<u64>,
    pub visit_json: Option<String>,
    pub notice: Option<FfiNotice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCloseOutcome {
    Closed,
    ConfirmRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiViewerMode {
    Viewing,
    Drawing,
    ConfirmClose,
}

impl From<ViewerMode> for FfiViewerMode {
    fn from(mode: ViewerMode) -> Self {
        match mode {
            ViewerMode::Viewing => FfiViewerMode::Viewing,
            ViewerMode::Drawing => FfiViewerMode::Drawing,
            ViewerMode::ConfirmClose => FfiViewerMode::ConfirmClose,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiViewerState {
    /// `None` when the viewer is closed
    pub mode: Option<FfiViewerMode>,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub brush_color: String,
    pub brush_width: u32,
    pub has_unsaved_strokes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_request_from_multipart() {
        let request = ApiRequest::new(api::Method::Post, "http://x/api/stage-images/")
            .bearer("tok")
            .multipart(vec![
                FormPart::text("stage", "4"),
                FormPart::File {
                    name: "image".into(),
                    file_name: "a.png".into(),
                    content_type: "image/png".into(),
                    bytes: vec![9],
                },
            ]);
        let ffi = FfiRequest::from(&request);
        assert_eq!(ffi.method, "POST");
        assert!(ffi.json_body.is_none());
        assert_eq!(ffi.form_parts.len(), 2);
        assert_eq!(ffi.form_parts[0].text.as_deref(), Some("4"));
        assert_eq!(ffi.form_parts[1].bytes.as_deref(), Some(&[9u8][..]));
    }

    #[test]
    fn test_severity_strings() {
        let notice: FfiNotice = Notice::new(Severity::Warning, "x").into();
        assert_eq!(notice.severity, "warning");
        assert_eq!(notice.duration_ms, 4000);
    }

    #[test]
    fn test_pipeline_lookups() {
        assert_eq!(
            production_status_next("package_requested".into()).as_deref(),
            Some("package_preparing")
        );
        assert!(production_status_next("completed".into()).is_none());
        assert_eq!(production_status_button("nonsense".into()).label, "İlerle");
        assert_eq!(production_status_text(None), "");
        assert!(stage_action_disabled(Some("cargo_ready".into()), "prepare_cargo".into()).unwrap());
        assert!(stage_action_disabled(None, "fly".into()).is_err());
    }

    #[test]
    fn test_viewer_maps_pointer_while_drawing() {
        let viewer = AnnotationViewer::new();
        viewer.open("/media/a.jpg".into(), Some(1), Some(2)).unwrap();
        viewer.set_display_rect(100.0, 50.0, 200.0, 100.0).unwrap();
        viewer.enter_drawing(200, 100).unwrap();
        viewer.pointer_down(110.0, 60.0).unwrap();
        viewer.pointer_move(150.0, 60.0).unwrap();
        viewer.pointer_up().unwrap();

        let state = viewer.state().unwrap();
        assert_eq!(state.mode, Some(FfiViewerMode::Drawing));
        assert!(state.has_unsaved_strokes);
        assert_eq!(viewer.request_close().unwrap(), FfiCloseOutcome::ConfirmRequired);
        viewer.discard().unwrap();
        assert!(viewer.state().unwrap().mode.is_none());
    }
}
