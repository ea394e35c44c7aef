use crate::{api::leave_request, auth::handlers, config::Config};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::web;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Public routes
    cfg.service(
        web::resource("/signup")
            .wrap(build_limiter(config.rate_signup_per_min))
            .route(web::post().to(handlers::signup)),
    )
    .service(
        web::resource("/login")
            .wrap(build_limiter(config.rate_login_per_min))
            .route(web::post().to(handlers::login)),
    );

    // Bearer-guarded routes; the AuthUser extractor is the gate
    cfg.service(
        web::resource("/requests")
            .wrap(build_limiter(config.rate_api_per_min))
            .route(web::post().to(leave_request::create_leave))
            .route(web::get().to(leave_request::my_requests)),
    )
    .service(
        web::resource("/admin/requests")
            .wrap(build_limiter(config.rate_api_per_min))
            .route(web::get().to(leave_request::pending_requests))
            .route(web::post().to(leave_request::resolve_request)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use actix_web::{test, web::Data, App};
    use serde_json::{json, Value};

    fn test_config() -> Config {
        Config {
            database_url: None,
            sqlite_path: String::new(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            token_ttl: 3600,
            rate_signup_per_min: 1000,
            rate_login_per_min: 1000,
            rate_api_per_min: 1000,
        }
    }

    macro_rules! init_app {
        () => {{
            let store = Store::memory().await;
            let config = test_config();
            let config_for_routes = config.clone();
            test::init_service(
                App::new()
                    .app_data(Data::new(store))
                    .app_data(Data::new(config))
                    .configure(move |cfg| configure(cfg, config_for_routes.clone())),
            )
            .await
        }};
    }

    // the peer address feeds the rate limiter's key extractor
    fn post(path: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri(path)
            .peer_addr("127.0.0.1:12345".parse().unwrap())
            .set_json(body)
    }

    fn get(path: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri(path)
            .peer_addr("127.0.0.1:12345".parse().unwrap())
    }

    fn bearer(req: test::TestRequest, token: &str) -> test::TestRequest {
        req.insert_header(("Authorization", format!("Bearer {token}")))
    }

    async fn signup_and_login<S>(app: &S, email: &str, password: &str, role: &str) -> String
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    {
        let resp = test::call_service(
            app,
            post(
                "/signup",
                json!({ "email": email, "password": password, "role": role }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);

        let resp = test::call_service(
            app,
            post("/login", json!({ "email": email, "password": password })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_owned()
    }

    #[actix_web::test]
    async fn signup_validates_and_falls_back_to_employee_role() {
        let app = init_app!();

        let resp = test::call_service(
            &app,
            post("/signup", json!({ "email": "", "password": "" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);

        let resp = test::call_service(
            &app,
            post(
                "/signup",
                json!({ "email": "x@example.com", "password": "pw", "role": "superuser" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["role"], "employee");
        assert!(body["id"].as_i64().unwrap() > 0);

        let resp = test::call_service(
            &app,
            post(
                "/signup",
                json!({ "email": "a@example.com", "password": "pw", "role": "admin" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["role"], "admin");
    }

    #[actix_web::test]
    async fn duplicate_email_conflicts() {
        let app = init_app!();

        let req = json!({ "email": "dup@example.com", "password": "pw" });
        let resp = test::call_service(&app, post("/signup", req.clone()).to_request()).await;
        assert_eq!(resp.status(), 201);

        let resp = test::call_service(&app, post("/signup", req).to_request()).await;
        assert_eq!(resp.status(), 409);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn login_rejects_bad_credentials() {
        let app = init_app!();
        signup_and_login(&app, "e1@example.com", "pw", "employee").await;

        let resp = test::call_service(
            &app,
            post("/login", json!({ "email": "e1@example.com", "password": "wrong" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 401);

        let resp = test::call_service(
            &app,
            post("/login", json!({ "email": "ghost@example.com", "password": "pw" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 401);

        let resp = test::call_service(
            &app,
            post("/login", json!({ "email": "", "password": "" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn authenticated_routes_reject_missing_or_bad_tokens() {
        let app = init_app!();

        for req in [
            get("/requests").to_request(),
            get("/admin/requests").to_request(),
            post("/requests", json!({})).to_request(),
            post("/admin/requests", json!({})).to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 401, "no Authorization header");
        }

        let resp = test::call_service(
            &app,
            get("/requests")
                .insert_header(("Authorization", "Basic abc"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 401, "not a bearer header");

        let resp = test::call_service(
            &app,
            bearer(get("/requests"), "not-a-jwt").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 401, "garbage token");
    }

    #[actix_web::test]
    async fn admin_routes_forbid_employees() {
        let app = init_app!();
        let token = signup_and_login(&app, "e1@example.com", "pw", "employee").await;

        let resp = test::call_service(&app, bearer(get("/admin/requests"), &token).to_request())
            .await;
        assert_eq!(resp.status(), 403);

        let resp = test::call_service(
            &app,
            bearer(
                post("/admin/requests", json!({ "id": 1, "action": "approve" })),
                &token,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn create_validates_reason_and_date_order() {
        let app = init_app!();
        let token = signup_and_login(&app, "e1@example.com", "pw", "employee").await;

        let resp = test::call_service(
            &app,
            bearer(
                post(
                    "/requests",
                    json!({ "start_date": "2026-03-01", "end_date": "2026-03-03", "reason": "  " }),
                ),
                &token,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);

        let resp = test::call_service(
            &app,
            bearer(
                post(
                    "/requests",
                    json!({ "start_date": "2026-03-03", "end_date": "2026-03-01", "reason": "x" }),
                ),
                &token,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn own_lists_are_scoped_per_user() {
        let app = init_app!();
        let t1 = signup_and_login(&app, "a@example.com", "pw", "employee").await;
        let t2 = signup_and_login(&app, "b@example.com", "pw", "employee").await;

        let resp = test::call_service(
            &app,
            bearer(
                post(
                    "/requests",
                    json!({ "start_date": "2026-03-01", "end_date": "2026-03-03", "reason": "Test leave" }),
                ),
                &t1,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);

        let resp = test::call_service(&app, bearer(get("/requests"), &t1).to_request()).await;
        assert_eq!(resp.status(), 200);
        let own: Value = test::read_body_json(resp).await;
        assert_eq!(own.as_array().unwrap().len(), 1);

        let resp = test::call_service(&app, bearer(get("/requests"), &t2).to_request()).await;
        let other: Value = test::read_body_json(resp).await;
        assert!(other.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn full_leave_lifecycle() {
        let app = init_app!();
        let employee = signup_and_login(&app, "e1@example.com", "pw", "employee").await;
        let admin = signup_and_login(&app, "a1@example.com", "pw", "admin").await;

        // employee files a request
        let resp = test::call_service(
            &app,
            bearer(
                post(
                    "/requests",
                    json!({ "start_date": "2026-03-01", "end_date": "2026-03-03", "reason": "Test leave" }),
                ),
                &employee,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_i64().unwrap();

        // it shows up once, pending, in the owner's list
        let resp =
            test::call_service(&app, bearer(get("/requests"), &employee).to_request()).await;
        let own: Value = test::read_body_json(resp).await;
        let own = own.as_array().unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0]["status"], "pending");
        assert_eq!(own[0]["reason"], "Test leave");

        // admin sees it in the pending list, joined with the owner email
        let resp =
            test::call_service(&app, bearer(get("/admin/requests"), &admin).to_request()).await;
        assert_eq!(resp.status(), 200);
        let pending: Value = test::read_body_json(resp).await;
        let pending = pending.as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["id"].as_i64().unwrap(), id);
        assert_eq!(pending[0]["email"], "e1@example.com");
        assert_eq!(pending[0]["status"], "pending");

        // approve it
        let resp = test::call_service(
            &app,
            bearer(
                post("/admin/requests", json!({ "id": id, "action": "approve" })),
                &admin,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let resolved: Value = test::read_body_json(resp).await;
        assert_eq!(resolved["status"], "approved");

        // gone from the pending list
        let resp =
            test::call_service(&app, bearer(get("/admin/requests"), &admin).to_request()).await;
        let pending: Value = test::read_body_json(resp).await;
        assert!(pending.as_array().unwrap().is_empty());

        // still visible to the owner with its terminal status
        let resp =
            test::call_service(&app, bearer(get("/requests"), &employee).to_request()).await;
        let own: Value = test::read_body_json(resp).await;
        assert_eq!(own.as_array().unwrap()[0]["status"], "approved");

        // re-resolving conflicts; so does an unknown id
        let resp = test::call_service(
            &app,
            bearer(
                post("/admin/requests", json!({ "id": id, "action": "reject" })),
                &admin,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 409);

        let resp = test::call_service(
            &app,
            bearer(
                post("/admin/requests", json!({ "id": 9999, "action": "approve" })),
                &admin,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 409);
    }
}
