//! API server lifecycle: bind, spawn, graceful shutdown.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind the listener, spawn the axum server in a background task, and
/// return a handle with the bound address and a shutdown channel.
pub async fn start_server(ctx: ApiContext, bind: &str) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| format!("Failed to bind API server on {bind}: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::MockAuth;
    use crate::generator::MockGeneration;
    use crate::models::{Patient, TherapyPlan};
    use crate::store::{Collection, LocalStore, MockRemote, RemoteStore};

    fn test_context(auth: MockAuth) -> ApiContext {
        let remote: Arc<dyn RemoteStore> = Arc::new(MockRemote::new());
        let local = Arc::new(LocalStore::open_in_memory().unwrap());
        let patients: Collection<Patient> = Collection::new(remote.clone(), local.clone());
        let plans: Collection<TherapyPlan> = Collection::new(remote, local);
        ApiContext::new(
            patients,
            plans,
            Arc::new(auth),
            Arc::new(MockGeneration::fixed()),
        )
    }

    async fn spawn_server(auth: MockAuth) -> (ApiServer, String) {
        let server = start_server(test_context(auth), "127.0.0.1:0")
            .await
            .expect("server should start");
        let base = format!("http://{}/api", server.addr);
        (server, base)
    }

    fn patient_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Jane Doe",
            "age": 72,
            "diagnosis": "Stroke",
            "functionalLevel": "moderate-assistance",
            "interests": "Gardening",
            "limitations": ""
        })
    }

    fn intake_body() -> serde_json::Value {
        serde_json::json!({
            "patientName": "Jane Doe",
            "age": 72,
            "diagnosis": "Stroke",
            "functionalLevel": "moderate-assistance",
            "primaryGoal": "Improve fine motor skills"
        })
    }

    #[tokio::test]
    async fn health_check_requires_no_auth() {
        let (mut server, base) = spawn_server(MockAuth::signed_out()).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        server.shutdown();
    }

    #[tokio::test]
    async fn signed_out_requests_get_structured_401() {
        let (mut server, base) = spawn_server(MockAuth::signed_out()).await;

        let resp = reqwest::get(format!("{base}/patients")).await.unwrap();
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

        server.shutdown();
    }

    #[tokio::test]
    async fn patient_crud_round_trip() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let created: serde_json::Value = client
            .post(format!("{base}/patients"))
            .json(&patient_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created["name"], "Jane Doe");
        assert_eq!(created["provenance"], "remote");
        let id = created["id"].as_str().unwrap().to_string();

        let listed: serde_json::Value = client
            .get(format!("{base}/patients"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["activePlans"], 0);

        let mut updated_body = patient_body();
        updated_body["diagnosis"] = "TBI".into();
        let updated: serde_json::Value = client
            .put(format!("{base}/patients/{id}"))
            .json(&updated_body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(updated["diagnosis"], "TBI");
        assert_eq!(updated["id"].as_str().unwrap(), id);

        let resp = client
            .delete(format!("{base}/patients/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let listed: serde_json::Value = client
            .get(format!("{base}/patients"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(listed.as_array().unwrap().is_empty());

        server.shutdown();
    }

    #[tokio::test]
    async fn invalid_patient_input_is_rejected() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let mut body = patient_body();
        body["name"] = "  ".into();
        let resp = client
            .post(format!("{base}/patients"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        server.shutdown();
    }

    #[tokio::test]
    async fn generate_then_save_then_library_flow() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let generated: serde_json::Value = client
            .post(format!("{base}/generate"))
            .json(&intake_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(generated["plan"]["planTitle"], "Fine Motor Recovery Program");
        assert_eq!(generated["request"]["sessionMinutes"], 60);

        let saved: serde_json::Value = client
            .post(format!("{base}/plans"))
            .json(&generated)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(saved["plan"]["status"], "active");
        // Save-time patient upsert kicked in for the unknown name.
        assert!(saved["createdPatient"].is_object());
        let plan_id = saved["plan"]["id"].as_str().unwrap().to_string();

        let listed: serde_json::Value = client
            .get(format!("{base}/plans?tab=active"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["planTitle"], "Fine Motor Recovery Program");

        let detail: serde_json::Value = client
            .get(format!("{base}/plans/{plan_id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(detail["data"]["planTitle"], "Fine Motor Recovery Program");

        server.shutdown();
    }

    #[tokio::test]
    async fn incomplete_intake_is_rejected_without_generation() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let mut body = intake_body();
        body["primaryGoal"] = "".into();
        let resp = client
            .post(format!("{base}/generate"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let error: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(error["error"]["code"], "BAD_REQUEST");

        server.shutdown();
    }

    #[tokio::test]
    async fn saving_a_plan_with_blank_patient_fields_is_rejected() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let mut body = serde_json::json!({
            "request": {
                "patientName": "",
                "age": 0,
                "diagnosis": "Stroke",
                "functionalLevel": "moderate-assistance",
                "primaryGoal": "Mobility",
                "secondaryGoals": "",
                "interests": "",
                "limitations": "",
                "sessionMinutes": 60,
                "frequency": "weekly",
                "programWeeks": 8
            },
            "plan": { "planTitle": "P" }
        });
        let resp = client
            .post(format!("{base}/plans"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        // Nothing persisted on either collection.
        let patients: serde_json::Value = client
            .get(format!("{base}/patients"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(patients.as_array().unwrap().is_empty());
        let plans: serde_json::Value = client
            .get(format!("{base}/plans"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(plans.as_array().unwrap().is_empty());

        // The same payload with valid patient fields goes through.
        body["request"]["patientName"] = "Jane Doe".into();
        body["request"]["age"] = 72.into();
        let resp = client
            .post(format!("{base}/plans"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        server.shutdown();
    }

    #[tokio::test]
    async fn duplicate_lands_in_draft_tab() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let generated: serde_json::Value = client
            .post(format!("{base}/generate"))
            .json(&intake_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let saved: serde_json::Value = client
            .post(format!("{base}/plans"))
            .json(&generated)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let plan_id = saved["plan"]["id"].as_str().unwrap().to_string();

        let copy: serde_json::Value = client
            .post(format!("{base}/plans/{plan_id}/duplicate"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(copy["status"], "draft");
        assert_eq!(copy["patientName"], "Jane Doe (Copy)");

        let drafts: serde_json::Value = client
            .get(format!("{base}/plans?tab=draft"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(drafts.as_array().unwrap().len(), 1);
        assert_eq!(drafts[0]["id"], copy["id"]);

        server.shutdown();
    }

    #[tokio::test]
    async fn export_returns_pdf_bytes() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;
        let client = reqwest::Client::new();

        let generated: serde_json::Value = client
            .post(format!("{base}/generate"))
            .json(&intake_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let saved: serde_json::Value = client
            .post(format!("{base}/plans"))
            .json(&generated)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let plan_id = saved["plan"]["id"].as_str().unwrap().to_string();

        let resp = client
            .get(format!("{base}/plans/{plan_id}/export"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()[reqwest::header::CONTENT_TYPE],
            "application/pdf"
        );
        let bytes = resp.bytes().await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        server.shutdown();
    }

    #[tokio::test]
    async fn unknown_plan_is_structured_404() {
        let (mut server, base) = spawn_server(MockAuth::signed_in("u1")).await;

        let url = format!("{base}/plans/{}", uuid::Uuid::new_v4());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        server.shutdown();
    }

    #[tokio::test]
    async fn login_opens_the_session_gate() {
        let (mut server, base) = spawn_server(MockAuth::signed_out()).await;
        let client = reqwest::Client::new();

        let state: serde_json::Value = client
            .get(format!("{base}/session"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["session"]["state"], "signedOut");

        let state: serde_json::Value = client
            .post(format!("{base}/session/login"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["session"]["state"], "signedIn");
        assert_eq!(state["view"], "dashboard");

        let state: serde_json::Value = client
            .post(format!("{base}/view"))
            .json(&serde_json::json!({ "view": "library" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["view"], "library");

        let state: serde_json::Value = client
            .post(format!("{base}/session/logout"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["session"]["state"], "signedOut");
        assert_eq!(state["view"], "dashboard");

        server.shutdown();
    }
}
