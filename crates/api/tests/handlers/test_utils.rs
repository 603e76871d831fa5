use std::sync::Arc;

use axum::http::HeaderValue;
use axum_test::{TestRequest, TestServer};
use counselbook_api::{app, middleware::auth, ApiState};
use counselbook_core::{
    availability::CancelledSlotPolicy,
    models::{
        actor::Actor,
        directory::{Counselor, User},
    },
};
use counselbook_db::{BookingStore, InMemoryStore};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Fake,
};
use uuid::Uuid;

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub server: TestServer,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(CancelledSlotPolicy::default())
    }

    pub fn with_policy(policy: CancelledSlotPolicy) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let server = server_for(store.clone(), policy);
        Self { store, server }
    }

    pub async fn seed_student(&self) -> User {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        self.store
            .create_user(name, email)
            .await
            .expect("seed student")
    }

    pub async fn seed_counselor(&self, name: &str) -> Counselor {
        self.store
            .create_counselor(name.to_string(), Some("Career guidance".to_string()))
            .await
            .expect("seed counselor")
    }
}

/// Builds a server over any store implementation.
pub fn server_for(store: Arc<dyn BookingStore>, policy: CancelledSlotPolicy) -> TestServer {
    let state = Arc::new(ApiState::new(store, policy));
    TestServer::new(app(state)).expect("build test server")
}

/// Attaches the forwarded identity headers for `actor`.
pub fn as_actor(request: TestRequest, actor: Actor) -> TestRequest {
    request
        .add_header(
            auth::USER_ID_HEADER,
            HeaderValue::from_str(&actor.id.to_string()).expect("uuid header"),
        )
        .add_header(
            auth::USER_ROLE_HEADER,
            HeaderValue::from_str(&actor.role.to_string()).expect("role header"),
        )
}

pub fn admin() -> Actor {
    Actor::admin(Uuid::new_v4())
}
