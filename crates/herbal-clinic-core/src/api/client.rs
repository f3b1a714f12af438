//! Endpoint mapping for the clinic backend.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiError, ApiRequest, ApiResponse, ApiResult, FormPart, Method, Transport};
use crate::dashboard::LogisticsDashboard;
use crate::models::{
    NewProductionOrder, NewVisit, NotificationFeed, Patient, PatientForm, ProductionOrder,
    StageImage, StatusUpdate, Upload, Visit, VisitUpdate,
};
use crate::pipeline::ProductionOrderStatus;
use crate::session::{Session, TokenPair};

/// Typed access to the backend over a host transport.
pub struct ClinicClient<T: Transport> {
    transport: T,
    base_url: String,
}

impl<T: Transport> ClinicClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str, session: &Session) -> ApiRequest {
        ApiRequest::new(method, self.url(path)).bearer(session.access_token.as_str())
    }

    /// Send and map the status code.
    fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        log::debug!("{} {}", request.method, request.url);
        let response = self.transport.send(&request)?;
        match response.status {
            200..=299 => Ok(response),
            401 => {
                log::warn!("{} {} rejected: unauthorized", request.method, request.url);
                Err(ApiError::Unauthorized)
            }
            status => {
                log::warn!("{} {} failed with HTTP {}", request.method, request.url, status);
                Err(ApiError::Status {
                    status,
                    body: response.text(),
                })
            }
        }
    }

    fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<R> {
        let response = self.execute(request)?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    fn json_body<B: Serialize>(body: &B) -> ApiResult<serde_json::Value> {
        Ok(serde_json::to_value(body)?)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /api/token/`
    pub fn login(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        let request = ApiRequest::new(Method::Post, self.url("/api/token/")).json(
            serde_json::json!({ "username": username, "password": password }),
        );
        self.fetch(request)
    }

    // =========================================================================
    // Patients
    // =========================================================================

    pub fn list_patients(&self, session: &Session) -> ApiResult<Vec<Patient>> {
        self.fetch(self.authed(Method::Get, "/api/patients/", session))
    }

    pub fn get_patient(&self, session: &Session, id: u64) -> ApiResult<Patient> {
        self.fetch(self.authed(Method::Get, &format!("/api/patients/{}/", id), session))
    }

    pub fn create_patient(&self, session: &Session, form: &PatientForm) -> ApiResult<Patient> {
        let request = self
            .authed(Method::Post, "/api/patients/", session)
            .json(Self::json_body(form)?);
        self.fetch(request)
    }

    pub fn update_patient(&self, session: &Session, id: u64, form: &PatientForm) -> ApiResult<Patient> {
        let request = self
            .authed(Method::Put, &format!("/api/patients/{}/", id), session)
            .json(Self::json_body(form)?);
        self.fetch(request)
    }

    // =========================================================================
    // Visits
    // =========================================================================

    pub fn create_visit(&self, session: &Session, visit: &NewVisit) -> ApiResult<Visit> {
        let request = self
            .authed(Method::Post, "/api/visits/", session)
            .json(Self::json_body(visit)?);
        self.fetch(request)
    }

    pub fn get_visit(&self, session: &Session, id: u64) -> ApiResult<Visit> {
        self.fetch(self.authed(Method::Get, &format!("/api/visits/{}/", id), session))
    }

    /// `PATCH /api/visits/{id}/` as multipart so a document can ride along.
    pub fn update_visit(&self, session: &Session, id: u64, update: VisitUpdate) -> ApiResult<Visit> {
        let mut parts = vec![
            FormPart::text("diagnosis", update.diagnosis),
            FormPart::text("notes", update.notes),
        ];
        if let Some(document) = update.document {
            parts.push(file_part("document", document));
        }
        let request = self
            .authed(Method::Patch, &format!("/api/visits/{}/", id), session)
            .multipart(parts);
        self.fetch(request)
    }

    pub fn delete_visit(&self, session: &Session, id: u64) -> ApiResult<()> {
        self.execute(self.authed(Method::Delete, &format!("/api/visits/{}/", id), session))?;
        Ok(())
    }

    // =========================================================================
    // Production orders
    // =========================================================================

    pub fn create_production_order(
        &self,
        session: &Session,
        order: &NewProductionOrder,
    ) -> ApiResult<ProductionOrder> {
        let request = self
            .authed(Method::Post, "/api/production-orders/", session)
            .json(Self::json_body(order)?);
        self.fetch(request)
    }

    /// `PATCH /api/production-orders/{id}/update_status/`. The response
    /// body is ignored; callers re-fetch.
    pub fn update_order_status(
        &self,
        session: &Session,
        order_id: u64,
        status: ProductionOrderStatus,
    ) -> ApiResult<()> {
        let request = self
            .authed(
                Method::Patch,
                &format!("/api/production-orders/{}/update_status/", order_id),
                session,
            )
            .json(Self::json_body(&StatusUpdate { status })?);
        self.execute(request)?;
        Ok(())
    }

    /// Raw PDF bytes of a production order.
    pub fn download_order_pdf(&self, session: &Session, order_id: u64) -> ApiResult<Vec<u8>> {
        let path = format!("/api/production-orders/{}/download_pdf/", order_id);
        Ok(self.execute(self.authed(Method::Get, &path, session))?.body)
    }

    // =========================================================================
    // Stage images
    // =========================================================================

    pub fn upload_stage_image(
        &self,
        session: &Session,
        stage_id: u64,
        image: Upload,
    ) -> ApiResult<StageImage> {
        let request = self
            .authed(Method::Post, "/api/stage-images/", session)
            .multipart(vec![
                FormPart::text("stage", stage_id.to_string()),
                file_part("image", image),
            ]);
        self.fetch(request)
    }

    pub fn delete_stage_image(&self, session: &Session, image_id: u64) -> ApiResult<()> {
        let path = format!("/api/stage-images/{}/", image_id);
        self.execute(self.authed(Method::Delete, &path, session))?;
        Ok(())
    }

    // =========================================================================
    // Logistics and notifications
    // =========================================================================

    pub fn logistic_stats(&self, session: &Session) -> ApiResult<LogisticsDashboard> {
        self.fetch(self.authed(Method::Get, "/api/logistic-stats/", session))
    }

    pub fn notifications(&self, session: &Session) -> ApiResult<NotificationFeed> {
        self.fetch(self.authed(Method::Get, "/api/notifications/", session))
    }

    pub fn mark_notification_read(&self, session: &Session, id: u64) -> ApiResult<()> {
        let path = format!("/api/notifications/{}/read/", id);
        self.execute(self.authed(Method::Post, &path, session))?;
        Ok(())
    }

    pub fn mark_all_notifications_read(&self, session: &Session) -> ApiResult<()> {
        self.execute(self.authed(Method::Post, "/api/notifications/read-all/", session))?;
        Ok(())
    }
}

fn file_part(name: &str, upload: Upload) -> FormPart {
    FormPart::File {
        name: name.to_string(),
        file_name: upload.file_name,
        content_type: upload.content_type,
        bytes: upload.bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RequestBody, TransportError};
    use crate::session::UserType;
    use std::sync::Mutex;

    /// Replies with a fixed response and records requests.
    struct Canned {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(ApiResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    struct Offline;

    impl Transport for Offline {
        fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            Err(TransportError("network unreachable".into()))
        }
    }

    fn session() -> Session {
        Session {
            access_token: "tok".into(),
            refresh_token: "ref".into(),
            username: "dr".into(),
            user_type: UserType::Clinic,
        }
    }

    #[test]
    fn test_status_update_request_shape() {
        let client = ClinicClient::new("http://localhost:8000/", Canned::new(200, "{}"));
        client
            .update_order_status(&session(), 12, ProductionOrderStatus::PackagePreparing)
            .unwrap();

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::Patch);
        assert_eq!(
            seen[0].url,
            "http://localhost:8000/api/production-orders/12/update_status/"
        );
        assert_eq!(seen[0].bearer.as_deref(), Some("tok"));
        assert_eq!(
            seen[0].body,
            RequestBody::Json(serde_json::json!({"status": "package_preparing"}))
        );
    }

    #[test]
    fn test_patient_update_request_shape() {
        let client = ClinicClient::new(
            "http://x",
            Canned::new(200, r#"{"id": 4, "first_name": "Ayşe", "last_name": "Kaya"}"#),
        );
        let form = PatientForm {
            first_name: "Ayşe".into(),
            last_name: "Kaya".into(),
            city: "İzmir".into(),
            ..PatientForm::default()
        };
        let patient = client.update_patient(&session(), 4, &form).unwrap();
        assert_eq!(patient.id, 4);

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Put);
        assert_eq!(seen[0].url, "http://x/api/patients/4/");
        match &seen[0].body {
            RequestBody::Json(body) => {
                assert_eq!(body["first_name"], "Ayşe");
                assert_eq!(body["city"], "İzmir");
                assert_eq!(body["allergies"], "");
            }
            other => panic!("expected json, got {:?}", other),
        }
    }

    #[test]
    fn test_visit_create_request_shape() {
        let client = ClinicClient::new(
            "http://x",
            Canned::new(201, r#"{"id": 30, "patient": 4, "visit_date": "2024-05-02T09:00:00Z"}"#),
        );
        let visit = NewVisit {
            patient: 4,
            visit_date: "2024-05-02T09:00:00Z".into(),
            diagnosis: "kuru göz".into(),
            notes: String::new(),
        };
        assert_eq!(client.create_visit(&session(), &visit).unwrap().id, 30);

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].url, "http://x/api/visits/");
        assert_eq!(
            seen[0].body,
            RequestBody::Json(serde_json::json!({
                "patient": 4,
                "visit_date": "2024-05-02T09:00:00Z",
                "diagnosis": "kuru göz",
                "notes": ""
            }))
        );
    }

    #[test]
    fn test_visit_update_sends_document_part() {
        let client = ClinicClient::new(
            "http://x",
            Canned::new(200, r#"{"id": 30, "patient": 4, "visit_date": "2024-05-02T09:00:00Z"}"#),
        );
        let update = VisitUpdate {
            diagnosis: "kuru göz".into(),
            notes: "damla".into(),
            document: Some(Upload {
                file_name: "rapor.pdf".into(),
                content_type: "application/pdf".into(),
                bytes: b"%PDF".to_vec(),
            }),
        };
        client.update_visit(&session(), 30, update).unwrap();

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Patch);
        assert_eq!(seen[0].url, "http://x/api/visits/30/");
        assert_eq!(
            seen[0].body,
            RequestBody::Multipart(vec![
                FormPart::text("diagnosis", "kuru göz"),
                FormPart::text("notes", "damla"),
                FormPart::File {
                    name: "document".into(),
                    file_name: "rapor.pdf".into(),
                    content_type: "application/pdf".into(),
                    bytes: b"%PDF".to_vec(),
                },
            ])
        );
    }

    #[test]
    fn test_visit_delete_request_shape() {
        let client = ClinicClient::new("http://x", Canned::new(204, ""));
        client.delete_visit(&session(), 30).unwrap();

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Delete);
        assert_eq!(seen[0].url, "http://x/api/visits/30/");
        assert_eq!(seen[0].bearer.as_deref(), Some("tok"));
        assert_eq!(seen[0].body, RequestBody::Empty);
    }

    #[test]
    fn test_login_has_no_bearer() {
        let client = ClinicClient::new("http://x", Canned::new(200, r#"{"access":"a","refresh":"r"}"#));
        let pair = client.login("dr", "pw").unwrap();
        assert_eq!(pair.access, "a");
        assert!(client.transport().seen.lock().unwrap()[0].bearer.is_none());
    }

    #[test]
    fn test_status_mapping() {
        let client = ClinicClient::new("http://x", Canned::new(401, ""));
        assert!(client.get_visit(&session(), 1).unwrap_err().is_unauthorized());

        let client = ClinicClient::new("http://x", Canned::new(400, "bad status"));
        match client.delete_stage_image(&session(), 3) {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad status");
            }
            other => panic!("unexpected {:?}", other),
        }

        let client = ClinicClient::new("http://x", Canned::new(200, "not json"));
        assert!(matches!(client.get_visit(&session(), 1), Err(ApiError::Decode(_))));

        let client = ClinicClient::new("http://x", Offline);
        assert!(matches!(client.notifications(&session()), Err(ApiError::Transport(_))));
    }

    #[test]
    fn test_stage_image_multipart_fields() {
        let client = ClinicClient::new(
            "http://x",
            Canned::new(201, r#"{"id": 5, "image": "/media/a.png"}"#),
        );
        let upload = Upload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let image = client.upload_stage_image(&session(), 21, upload).unwrap();
        assert_eq!(image.id, 5);

        let seen = client.transport().seen.lock().unwrap();
        match &seen[0].body {
            RequestBody::Multipart(parts) => {
                let names: Vec<&str> = parts.iter().map(FormPart::name).collect();
                assert_eq!(names, vec!["stage", "image"]);
                assert_eq!(parts[0], FormPart::text("stage", "21"));
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }
}
