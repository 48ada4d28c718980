//! Contract binding demonstration.
//!
//! This example walks through the lifecycle of an API's authentication setup:
//! 1. Read the security section of an OpenAPI contract
//! 2. Register handlers per security scheme
//! 3. Bind every operation to a route with a composed handler
//! 4. Authenticate a few requests against the bound routes
//!
//! Run with: `cargo run --example contract_binding`
//! Set `RUST_LOG=authn_resolver=debug` to see resolution decisions.

use std::sync::Arc;

use authn_resolver::web::{authenticate_route, RequestContext};
use authn_resolver::{
    ApiKeyHandler, Contract, Principal, RegistrationSet, ResolverConfig, Router, SchemeHandler,
    SecurityRequirementResolver, SimpleAuthenticationHandler,
};
use tracing_subscriber::EnvFilter;

const CONTRACT: &str = r#"{
    "openapi": "3.0.3",
    "security": [{ "api_key": [] }],
    "paths": {
        "/orders": {
            "get": { "operationId": "listOrders", "security": [{}, { "api_key": [] }] },
            "post": { "operationId": "createOrder", "security": [{ "api_key": ["orders:write"] }] }
        },
        "/orders/{id}": {
            "delete": { "operationId": "cancelOrder", "security": [{ "api_key": [], "session": [] }] }
        },
        "/ping": { "get": { "operationId": "ping", "security": [] } }
    },
    "components": {
        "securitySchemes": {
            "api_key": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
            "session": { "type": "apiKey", "in": "cookie", "name": "session" }
        }
    }
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Contract Binding Example ===\n");

    // Step 1: Read the contract
    println!("--- Step 1: Read Contract ---");
    let contract = Contract::from_json(CONTRACT)?;
    for operation in contract.operations() {
        println!(
            "  {} {} ({})",
            operation.method(),
            operation.path(),
            operation.operation_id()
        );
    }

    // Step 2: Register handlers
    println!("\n--- Step 2: Register Handlers ---");
    let api_key = ApiKeyHandler::new()
        .with_key(
            "k-clerk",
            Principal::new("clerk", "Order Clerk").with_scopes(["orders:write"]),
        )
        .with_key("k-viewer", Principal::new("viewer", "Viewer"));

    let session = SimpleAuthenticationHandler::new().authenticate_with(|ctx| {
        match ctx.header("cookie").and_then(|c| c.strip_prefix("session=")) {
            Some(id) => Ok(Some(Principal::new(id, "Session User"))),
            None => Err("no session cookie".into()),
        }
    });

    let mut set = RegistrationSet::new();
    set.register("api_key", SchemeHandler::scoped(Arc::new(api_key)), None)?;
    set.register("session", SchemeHandler::new(Arc::new(session)), None)?;
    println!("✓ Registered api_key (scoped) and session");

    // Step 3: Bind the contract
    println!("\n--- Step 3: Bind Routes ---");
    let config = ResolverConfig::from_env()?;
    let resolver = SecurityRequirementResolver::new(set.build(), config);
    let mut router = Router::new();
    resolver.bind_contract(&contract, &mut router)?;

    for route in router.routes() {
        let shape = route
            .authentication()
            .map(|h| h.shape())
            .unwrap_or_else(|| "none".to_string());
        println!("  {} {} => {}", route.method(), route.path(), shape);
    }

    // Step 4: Authenticate requests
    println!("\n--- Step 4: Authenticate Requests ---");
    let requests = vec![
        RequestContext::new("req-001", "GET", "/orders"),
        RequestContext::new("req-002", "POST", "/orders").with_header("X-API-Key", "k-clerk"),
        RequestContext::new("req-003", "POST", "/orders").with_header("X-API-Key", "k-viewer"),
        RequestContext::new("req-004", "DELETE", "/orders/{id}")
            .with_header("X-API-Key", "k-viewer")
            .with_header("Cookie", "session=s-77"),
        RequestContext::new("req-005", "DELETE", "/orders/{id}").with_header("X-API-Key", "k-viewer"),
    ];

    for ctx in requests {
        let label = format!("{} {} {}", ctx.request_id(), ctx.method(), ctx.path());
        let Some(route) = router.find(ctx.method(), ctx.path()) else {
            println!("✗ {}: no route", label);
            continue;
        };

        match authenticate_route(route, ctx).await {
            Ok(authenticated) => match authenticated.principal {
                Some(p) => println!("✓ {}: authenticated as {}", label, p.id),
                None => println!("✓ {}: anonymous", label),
            },
            Err(failure) => println!(
                "✗ {}: {} {}",
                label,
                failure.status_code(),
                failure.message
            ),
        }
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
