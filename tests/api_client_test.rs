use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use manos_amigas::domain::model::{AccountStatus, NewServiceRequest, Role};
use manos_amigas::domain::ports::{ListingSource, MarketplaceApi};
use manos_amigas::{ApiClient, MarketError};
use serde_json::json;

fn person(status: &str, role: &str) -> serde_json::Value {
    json!({
        "persona_id": "15",
        "nombres": "Laura",
        "apellidos": "Hernández",
        "tipo_identificacion": "CC",
        "numero_identificacion": "1020304050",
        "email": "laura@correo.com",
        "telefono": "3001234567",
        "fecha_nacimiento": "1992-03-04",
        "rol": role,
        "estado_cuenta": status,
        "aceptar_terminos": true,
        "aceptar_datos": true,
        "recibir_notificaciones": false
    })
}

fn api_message(err: MarketError) -> (Option<u16>, String) {
    match err {
        MarketError::ApiError { status, message } => (status, message),
        other => panic!("expected an API error, got {:?}", other),
    }
}

/// Login stores the token and every later call carries it as a bearer header.
#[tokio::test]
async fn test_login_token_is_attached_to_later_requests() -> Result<()> {
    let server = MockServer::start_async().await;

    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(json!({"email": "laura@correo.com", "password": "Segura123"}));
            then.status(200)
                .json_body(json!({"token": "tok-123", "user": person("V", "0")}));
        })
        .await;

    let accounts = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/Person")
                .header("Authorization", "Bearer tok-123");
            then.status(200).json_body(json!([person("U", "1")]));
        })
        .await;

    let api = ApiClient::new(&server.base_url())?;
    let user = api.login("laura@correo.com", "Segura123").await?;
    assert_eq!(user.role, Role::Admin);
    assert_eq!(api.token().await.as_deref(), Some("tok-123"));

    let listed = api.fetch_accounts(None).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].account_status, AccountStatus::Unverified);

    login.assert_async().await;
    accounts.assert_async().await;

    api.logout().await;
    assert!(api.token().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_login_failure_uses_backend_message() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(401)
                .json_body(json!({"message": "Credenciales inválidas"}));
        })
        .await;

    let api = ApiClient::new(&server.base_url())?;
    let err = api.login("x@y.co", "bad").await.unwrap_err();
    assert_eq!(api_message(err), (Some(401), "Credenciales inválidas".to_string()));
    assert!(api.token().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_error_field_and_fallback_messages() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ServiceRequest");
            then.status(400)
                .json_body(json!({"error": "Prestador no disponible"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/Person");
            then.status(503).body("Service Unavailable");
        })
        .await;

    let api = ApiClient::new(&server.base_url())?;
    let request = NewServiceRequest {
        provider_id: "p1".to_string(),
        title: "Cambio de grifo".to_string(),
        description: "Grifo de cocina con fuga".to_string(),
        category: "reparaciones".to_string(),
        price_min: 40_000,
        price_max: 90_000,
    };

    let err = api.create_service_request(&request).await.unwrap_err();
    assert_eq!(api_message(err), (Some(400), "Prestador no disponible".to_string()));

    let err = api.fetch_accounts(None).await.unwrap_err();
    assert_eq!(api_message(err), (Some(503), "Error al obtener usuarios".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_reports_fallback() -> Result<()> {
    let api = ApiClient::new("http://127.0.0.1:9")?;
    let err = api.fetch_listings().await.unwrap_err();
    assert_eq!(api_message(err), (None, "Error al cargar servicios".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_status_update_sends_wire_code() -> Result<()> {
    let server = MockServer::start_async().await;
    let patch = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/Person/15")
                .json_body(json!({"accountStatus": "S"}));
            then.status(204);
        })
        .await;

    let api = ApiClient::new(&server.base_url())?;
    api.update_account_status("15", AccountStatus::Suspended).await?;
    patch.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_create_service_request_returns_id_and_title() -> Result<()> {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ServiceRequest").json_body(json!({
                "prestadorId": "p3",
                "titulo": "Acompañamiento a cita",
                "descripcion": "Cita en la clínica",
                "categoria": "tramites",
                "precioMin": 35000,
                "precioMax": 80000
            }));
            then.status(201)
                .json_body(json!({"serviceId": "s-77", "titulo": "Acompañamiento a cita"}));
        })
        .await;

    let api = ApiClient::new(&server.base_url())?;
    let created = api
        .create_service_request(&NewServiceRequest {
            provider_id: "p3".to_string(),
            title: "Acompañamiento a cita".to_string(),
            description: "Cita en la clínica".to_string(),
            category: "tramites".to_string(),
            price_min: 35_000,
            price_max: 80_000,
        })
        .await?;

    create.assert_async().await;
    assert_eq!(created.id, "s-77");
    Ok(())
}

#[tokio::test]
async fn test_remote_listings_decode() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/ServiceListing");
            then.status(200).json_body(json!([{
                "service_id": "42",
                "titulo": "Paseo de perros",
                "descripcion": "Paseos diarios",
                "categoria": "hogar",
                "ciudad": "Medellín",
                "precio_min": 20000,
                "precio_max": 40000,
                "prestador_id": "p9",
                "fecha_creacion": "2025-12-03"
            }]));
        })
        .await;

    let api = ApiClient::new(&server.base_url())?;
    let listings = api.fetch_listings().await?;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].rating, None);
    assert_eq!(listings[0].price_max, 40_000);
    Ok(())
}
